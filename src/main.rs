use aqi_dashboard::charts::render_svg;
use aqi_dashboard::{Config, Dashboard, MemorySource};
use clap::{Parser, ValueHint};
use std::path::PathBuf;
use std::process::ExitCode;

/// Print air-quality dashboard summaries from a readings snapshot
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML snapshot of nodes and readings (defaults to the configured one)
    #[arg(value_hint = ValueHint::FilePath)]
    snapshot: Option<PathBuf>,

    /// Show one node's measurements and 24 hour trend instead of the index
    #[arg(long)]
    node: Option<String>,

    /// Trend window in hours (24, 168 or 720)
    #[arg(long)]
    hours: Option<u32>,
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Using default config: {}", e);
        Config::default()
    });

    let source = match args.snapshot.as_ref().or(config.source.snapshot_path.as_ref()) {
        Some(path) => match MemorySource::load(path) {
            Ok(source) => source,
            Err(e) => {
                log::error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => {
            log::warn!("No snapshot given, starting with an empty source");
            MemorySource::new()
        }
    };

    let dashboard = Dashboard::new(config, source);
    let now = chrono::Local::now().naive_local();
    let chart = &dashboard.config().chart;

    if let Some(node_id) = args.node {
        let stats = match dashboard.node_stats(&node_id, now) {
            Ok(stats) => stats,
            Err(e) => {
                log::error!("{}", e);
                return ExitCode::FAILURE;
            }
        };

        println!("Node {} ({})", stats.node.id, stats.node.location);
        for m in &stats.measurements {
            match m.value {
                Some(v) => println!("  {}: {} {}", m.name, v, m.unit),
                None => println!("  {}: -", m.name),
            }
        }
        println!("  Hours: {}", stats.aqi_time.join(" "));
        println!("{}", render_svg(&stats.aqi_trend_path, chart.width, chart.height));
        return ExitCode::SUCCESS;
    }

    let hours = args.hours.unwrap_or(dashboard.config().stats.interval_hours);
    let outcome = dashboard.index_stats_for(hours, now);
    if outcome.is_empty() {
        log::warn!("No registered nodes");
    }
    let stats = outcome.stats();

    println!("Window: {}h", stats.hours);
    println!("Active nodes: {}", stats.active_nodes);
    match stats.avg_aqi {
        Some(avg) => println!("Average AQI: {:.2}", avg),
        None => println!("Average AQI: -"),
    }
    println!("Alerts: {}", stats.alerts);
    println!("Most common pollutant: {}", stats.most_common_pollutant);
    println!(
        "Bands: good {}% | moderate {}% | unhealthy {}% | hazardous {}%",
        stats.bands.good, stats.bands.moderate, stats.bands.unhealthy, stats.bands.hazardous
    );
    for (i, rank) in stats.worst.iter().enumerate() {
        if let (Some(name), Some(aqi)) = (&rank.name, rank.aqi) {
            println!(
                "  #{} {} ({}): {}",
                i + 1,
                name,
                rank.location.as_deref().unwrap_or("Unknown"),
                aqi
            );
        }
    }
    println!("Labels: {}", stats.aqi_time.join(" "));
    println!("{}", render_svg(&stats.aqi_trend_path, chart.width, chart.height));

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_node_and_hours() {
        let args = Args::try_parse_from(["aqi-dashboard", "snap.toml", "--node", "101", "--hours", "168"])
            .unwrap();
        assert_eq!(args.snapshot, Some(PathBuf::from("snap.toml")));
        assert_eq!(args.node.as_deref(), Some("101"));
        assert_eq!(args.hours, Some(168));
    }

    #[test]
    fn test_parse_defaults() {
        let args = Args::try_parse_from(["aqi-dashboard"]).unwrap();
        assert!(args.snapshot.is_none());
        assert!(args.node.is_none());
        assert!(args.hours.is_none());
    }

    #[test]
    fn test_invalid_hours_rejected() {
        assert!(Args::try_parse_from(["aqi-dashboard", "--hours", "day"]).is_err());
    }
}
