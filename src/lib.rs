//! Computational core of an air-quality dashboard.
//!
//! Readings come in through a [`ReadingSource`]; out come the summaries and
//! SVG sparkline paths the dashboard pages render.

pub mod app;
pub mod charts;
pub mod config;
pub mod error;
pub mod source;
pub mod stats;
pub mod timeseries;
pub mod trend;

pub use app::Dashboard;
pub use charts::{generate_smooth_path, PathPair};
pub use config::Config;
pub use error::{ConfigError, PathError, SourceError, StatsError};
pub use source::{Channel, ChannelKey, MemorySource, Node, ReadingSource};
pub use stats::{IndexStats, NodeRank, NodeStats, StatsOutcome};
pub use timeseries::Sample;
pub use trend::Interval;
