use crate::charts::render_svg;
use crate::config::Config;
use crate::error::StatsError;
use crate::source::ReadingSource;
use crate::stats::{self, NodeStats, StatsOutcome};
use chrono::NaiveDateTime;

/// Dashboard state: settings plus the injected reading source.
///
/// Holds no mutable state, so a shared reference can serve concurrent
/// requests whenever the source allows it.
pub struct Dashboard<S> {
    config: Config,
    source: S,
}

impl<S: ReadingSource> Dashboard<S> {
    pub fn new(config: Config, source: S) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Index summary over the configured window
    pub fn index_stats(&self, now: NaiveDateTime) -> StatsOutcome {
        self.index_stats_for(self.config.stats.interval_hours, now)
    }

    /// Index summary over an explicitly requested window
    pub fn index_stats_for(&self, interval_hours: u32, now: NaiveDateTime) -> StatsOutcome {
        stats::index_stats(&self.source, interval_hours, &self.config, now)
    }

    pub fn node_stats(&self, node_id: &str, now: NaiveDateTime) -> Result<NodeStats, StatsError> {
        stats::node_stats(&self.source, node_id, &self.config.chart, now)
    }

    /// Index trend as a standalone `<svg>` element
    pub fn index_svg(&self, now: NaiveDateTime) -> String {
        let outcome = self.index_stats(now);
        render_svg(
            &outcome.stats().aqi_trend_path,
            self.config.chart.width,
            self.config.chart.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn dashboard() -> Dashboard<MemorySource> {
        let mut source = MemorySource::new();
        source.add_node("1", "Pune");
        source.record_aqi("1", now() - Duration::hours(2), 40.0).unwrap();
        source.record_aqi("1", now() - Duration::hours(1), 70.0).unwrap();
        Dashboard::new(Config::default(), source)
    }

    #[test]
    fn test_index_stats_uses_configured_interval() {
        let mut config = Config::default();
        config.stats.interval_hours = 720;
        let dashboard = Dashboard::new(config, MemorySource::new());

        assert_eq!(dashboard.index_stats(now()).stats().hours, 720);
        assert_eq!(dashboard.index_stats_for(168, now()).stats().hours, 168);
    }

    #[test]
    fn test_node_stats_through_dashboard() {
        let dashboard = dashboard();
        let stats = dashboard.node_stats("1", now()).unwrap();
        assert_eq!(stats.measurements[0].value, Some(70.0));
        assert!(dashboard.node_stats("2", now()).is_err());
    }

    #[test]
    fn test_borrowed_source() {
        let source = MemorySource::new();
        let dashboard = Dashboard::new(Config::default(), &source);
        assert!(dashboard.index_stats(now()).is_empty());
    }

    #[test]
    fn test_index_svg() {
        let dashboard = dashboard();
        let svg = dashboard.index_svg(now());
        let stats = dashboard.index_stats(now());

        assert!(svg.contains(r#"viewBox="0 0 472 150""#));
        assert!(svg.contains(&stats.stats().aqi_trend_path.line));
    }
}
