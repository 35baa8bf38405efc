//! # Dashboard Statistics Module
//!
//! Aggregates readings from every registered node into the numbers the
//! dashboard pages render.
//!
//! ## Outputs
//! - `IndexStats`: network-wide summary (average AQI, alerts, severity bands,
//!   worst nodes, trend sparkline)
//! - `NodeStats`: one node's latest measurements and 24 hour AQI sparkline
//!
//! ## Failure Model
//! Index statistics always come back fully shaped. Query failures for a
//! single node are logged and that node is skipped; a registry failure or an
//! empty registry yields `StatsOutcome::Empty` holding the zeroed summary.
//! Templates therefore never need to check top-level fields, only the
//! optional values inside each `NodeRank`.

use crate::charts::{generate_smooth_path, PathPair};
use crate::config::{ChartConfig, Config};
use crate::error::{SourceError, StatsError};
use crate::source::{ChannelKey, Node, ReadingSource};
use crate::timeseries::{Sample, SampleSliceExt};
use crate::trend::{self, Interval, DEFAULT_FILL_SEED, HOURS_PER_DAY};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Number of ranked slots in the worst-nodes list
pub const WORST_COUNT: usize = 5;

/// AQI severity band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AqiBand {
    /// Below 50
    Good,
    /// 50 to 100 inclusive
    Moderate,
    /// Above 100 up to 200 inclusive
    Unhealthy,
    /// Above 200
    Hazardous,
}

impl AqiBand {
    pub fn classify(value: f64) -> Self {
        if value < 50.0 {
            AqiBand::Good
        } else if value <= 100.0 {
            AqiBand::Moderate
        } else if value <= 200.0 {
            AqiBand::Unhealthy
        } else {
            AqiBand::Hazardous
        }
    }
}

/// Share of samples per severity band, in percent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BandShares {
    pub good: f64,
    pub moderate: f64,
    pub unhealthy: f64,
    pub hazardous: f64,
}

impl BandShares {
    /// Percentages rounded to two decimals; all zero for an empty slice
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let mut counts = [0usize; 4];
        for &value in values {
            let idx = match AqiBand::classify(value) {
                AqiBand::Good => 0,
                AqiBand::Moderate => 1,
                AqiBand::Unhealthy => 2,
                AqiBand::Hazardous => 3,
            };
            counts[idx] += 1;
        }

        let total = values.len() as f64;
        let share = |count: usize| round2(count as f64 * 100.0 / total);
        Self {
            good: share(counts[0]),
            moderate: share(counts[1]),
            unhealthy: share(counts[2]),
            hazardous: share(counts[3]),
        }
    }
}

/// One slot of the worst-nodes list; all `None` when unfilled
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NodeRank {
    pub name: Option<String>,
    pub aqi: Option<f64>,
    pub location: Option<String>,
}

/// Network-wide dashboard summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStats {
    pub avg_aqi: Option<f64>,
    pub active_nodes: usize,
    pub alerts: usize,
    pub most_common_pollutant: String,
    pub aqi_trend_path: PathPair,
    pub aqi_time: Vec<String>,
    #[serde(flatten)]
    pub bands: BandShares,
    pub worst: [NodeRank; WORST_COUNT],
    pub hours: u32,
}

impl IndexStats {
    /// Zeroed summary: no average, no nodes, flat baseline trend
    pub fn empty(interval: Interval, config: &Config) -> Self {
        Self {
            avg_aqi: None,
            active_nodes: 0,
            alerts: 0,
            most_common_pollutant: config.stats.pollutant.clone(),
            aqi_trend_path: flat_path(&config.chart),
            aqi_time: trend::hourly_labels(),
            bands: BandShares::default(),
            worst: Default::default(),
            hours: interval.hours(),
        }
    }
}

/// Index statistics tagged with whether any node was registered
#[derive(Debug, Clone, PartialEq)]
pub enum StatsOutcome {
    Ok(IndexStats),
    /// No registered nodes, or the registry could not be read
    Empty(IndexStats),
}

impl StatsOutcome {
    pub fn stats(&self) -> &IndexStats {
        match self {
            StatsOutcome::Ok(stats) | StatsOutcome::Empty(stats) => stats,
        }
    }

    pub fn into_stats(self) -> IndexStats {
        match self {
            StatsOutcome::Ok(stats) | StatsOutcome::Empty(stats) => stats,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, StatsOutcome::Empty(_))
    }
}

/// Latest value of one measurement stream
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementReading {
    pub name: String,
    pub unit: String,
    pub value: Option<f64>,
}

/// Per-node dashboard summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStats {
    pub node: Node,
    pub measurements: Vec<MeasurementReading>,
    pub aqi_time: Vec<String>,
    pub aqi_trend_path: PathPair,
}

/// Two decimals, ties to even
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

fn flat_path(chart: &ChartConfig) -> PathPair {
    generate_smooth_path([DEFAULT_FILL_SEED; HOURS_PER_DAY], chart.width, chart.height)
        .unwrap_or_default()
}

/// Top `WORST_COUNT` nodes by latest AQI, highest first; ties keep registry order
pub fn rank_worst(latest: &[(Node, f64)]) -> [NodeRank; WORST_COUNT] {
    let mut ranked: Vec<&(Node, f64)> = latest.iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut worst: [NodeRank; WORST_COUNT] = Default::default();
    for (slot, (node, aqi)) in worst.iter_mut().zip(ranked) {
        *slot = NodeRank {
            name: Some(node.id.clone()),
            aqi: Some(*aqi),
            location: Some(node.location.clone()),
        };
    }
    worst
}

/// Mean of the latest values rounded to two decimals
pub fn average_aqi(latest: &[(Node, f64)]) -> Option<f64> {
    if latest.is_empty() {
        return None;
    }
    let sum: f64 = latest.iter().map(|(_, v)| v).sum();
    Some(round2(sum / latest.len() as f64))
}

/// Build the network-wide summary for the window `interval_hours` ending at `now`.
///
/// Unsupported windows fall back to 24 hours.
pub fn index_stats<S: ReadingSource>(
    source: &S,
    interval_hours: u32,
    config: &Config,
    now: NaiveDateTime,
) -> StatsOutcome {
    let interval = Interval::from_hours(interval_hours);
    let mut stats = IndexStats::empty(interval, config);

    let nodes = match source.nodes() {
        Ok(nodes) => nodes,
        Err(e) => {
            log::warn!("Could not list nodes: {}", e);
            return StatsOutcome::Empty(stats);
        }
    };
    if nodes.is_empty() {
        log::debug!("No registered nodes");
        return StatsOutcome::Empty(stats);
    }
    stats.active_nodes = nodes.len();

    let cutoff = interval.cutoff(now);
    let mut latest: Vec<(Node, f64)> = Vec::new();
    let mut history: Vec<Sample> = Vec::new();

    for node in nodes {
        match collect_node(source, &node, cutoff) {
            Ok((last, samples)) => {
                history.extend(samples);
                if let Some(value) = last {
                    latest.push((node, value));
                }
            }
            Err(e) => {
                log::warn!("Skipping node {}: {}", node.id, e);
            }
        }
    }

    stats.avg_aqi = average_aqi(&latest);

    if !history.is_empty() {
        let values = interval.bucket(&history, now);
        match generate_smooth_path(values, config.chart.width, config.chart.height) {
            Ok(paths) => {
                stats.aqi_trend_path = paths;
                stats.aqi_time = interval.labels();
            }
            Err(e) => log::warn!("Keeping flat trend: {}", e),
        }
    }

    stats.bands = BandShares::from_values(&history.values());
    stats.worst = rank_worst(&latest);
    stats.alerts = latest
        .iter()
        .filter(|(_, v)| *v > config.stats.alert_threshold)
        .count();

    log::debug!(
        "Index stats: {} nodes, avg {:?}, {} alerts, {} samples",
        stats.active_nodes,
        stats.avg_aqi,
        stats.alerts,
        history.len()
    );

    StatsOutcome::Ok(stats)
}

/// Latest AQI value and in-window AQI samples for one node
fn collect_node<S: ReadingSource>(
    source: &S,
    node: &Node,
    cutoff: NaiveDateTime,
) -> Result<(Option<f64>, Vec<Sample>), SourceError> {
    let last = source
        .latest(&node.id, ChannelKey::AQI)?
        .and_then(|s| s.value);
    let samples = source
        .since(&node.id, ChannelKey::AQI, cutoff)?
        .into_iter()
        .filter(|s| s.value.is_some())
        .collect();
    Ok((last, samples))
}

/// Build one node's summary: latest value of every stream and a 24 hour AQI trend.
///
/// ## Errors
/// `StatsError::Source` when the node is unknown or a query fails.
pub fn node_stats<S: ReadingSource>(
    source: &S,
    node_id: &str,
    chart: &ChartConfig,
    now: NaiveDateTime,
) -> Result<NodeStats, StatsError> {
    let node = source
        .nodes()?
        .into_iter()
        .find(|n| n.id == node_id)
        .ok_or_else(|| SourceError::UnknownNode(node_id.to_string()))?;

    let measurements = source
        .channels(node_id)?
        .into_iter()
        .map(|channel| -> Result<MeasurementReading, SourceError> {
            let value = source
                .latest(node_id, channel.key())?
                .and_then(|s| s.value);
            Ok(MeasurementReading {
                name: channel.name,
                unit: channel.unit,
                value,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let samples = source.since(node_id, ChannelKey::AQI, Interval::Day.cutoff(now))?;
    let hourly = trend::forward_fill(&trend::hourly_means(&samples), DEFAULT_FILL_SEED);
    let aqi_trend_path = generate_smooth_path(hourly, chart.width, chart.height)?;
    let aqi_time = trend::hourly_labels_from(samples.first_hour().unwrap_or(0));

    Ok(NodeStats {
        node,
        measurements,
        aqi_time,
        aqi_trend_path,
    })
}
