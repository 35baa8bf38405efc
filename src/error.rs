//! # Error Types Module
//!
//! Centralized error handling for the dashboard core.
//! Each layer gets its own error type with enough context to report
//! what went wrong without leaking the source's internals.
//!
//! ## Error Types
//! - `PathError`: Invalid input to the sparkline path generator
//! - `ConfigError`: Configuration file I/O and parsing errors
//! - `SourceError`: Reading source lookups and snapshot loading
//! - `StatsError`: Failures surfaced by per-node statistics
//!
//! ## Usage Examples
//! ```rust,ignore
//! // Charts module uses PathError
//! pub fn generate_smooth_path(...) -> Result<PathPair, PathError> { ... }
//!
//! // Config module uses ConfigError
//! pub fn load() -> Result<Config, ConfigError> { ... }
//!
//! // Stats module wraps both source and path failures
//! pub fn node_stats(...) -> Result<NodeStats, StatsError> { ... }
//! ```
//!
//! Index statistics never return an error: source failures are logged and
//! degrade to a fully populated empty result instead.

use std::fmt;

/// Errors raised by the trend path generator
#[derive(Debug, Clone, PartialEq)]
pub enum PathError {
    /// Fewer than two samples were supplied
    InvalidInput { len: usize },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::InvalidInput { len } => {
                write!(f, "Need at least 2 points to build a path, got {}", len)
            }
        }
    }
}

impl std::error::Error for PathError {}

/// Errors that can occur during configuration operations
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read config file
    ReadFailed(std::io::Error),
    /// Failed to write config file
    WriteFailed(std::io::Error),
    /// Failed to parse config file
    ParseFailed(toml::de::Error),
    /// Failed to serialize config
    SerializeFailed(toml::ser::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ReadFailed(e) => {
                write!(f, "Failed to read config file: {}", e)
            }
            ConfigError::WriteFailed(e) => {
                write!(f, "Failed to write config file: {}", e)
            }
            ConfigError::ParseFailed(e) => {
                write!(f, "Failed to parse config file: {}", e)
            }
            ConfigError::SerializeFailed(e) => {
                write!(f, "Failed to serialize config: {}", e)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadFailed(e) => Some(e),
            ConfigError::WriteFailed(e) => Some(e),
            ConfigError::ParseFailed(e) => Some(e),
            ConfigError::SerializeFailed(e) => Some(e),
        }
    }
}

/// Errors reported by a reading source
#[derive(Debug)]
pub enum SourceError {
    /// Failed to read a snapshot file
    ReadFailed(std::io::Error),
    /// Snapshot file is not valid TOML or has the wrong shape
    ParseFailed(toml::de::Error),
    /// No node registered under this id
    UnknownNode(String),
    /// The backing store rejected or failed a query
    Query(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::ReadFailed(e) => {
                write!(f, "Failed to read snapshot file: {}", e)
            }
            SourceError::ParseFailed(e) => {
                write!(f, "Failed to parse snapshot file: {}", e)
            }
            SourceError::UnknownNode(id) => {
                write!(f, "Unknown node: {}", id)
            }
            SourceError::Query(msg) => {
                write!(f, "Query failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::ReadFailed(e) => Some(e),
            SourceError::ParseFailed(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors surfaced while assembling per-node statistics
#[derive(Debug)]
pub enum StatsError {
    Source(SourceError),
    Path(PathError),
}

impl fmt::Display for StatsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsError::Source(e) => write!(f, "Reading source error: {}", e),
            StatsError::Path(e) => write!(f, "Trend path error: {}", e),
        }
    }
}

impl std::error::Error for StatsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StatsError::Source(e) => Some(e),
            StatsError::Path(e) => Some(e),
        }
    }
}

impl From<SourceError> for StatsError {
    fn from(e: SourceError) -> Self {
        StatsError::Source(e)
    }
}

impl From<PathError> for StatsError {
    fn from(e: PathError) -> Self {
        StatsError::Path(e)
    }
}
