//! # Reading Source Module
//!
//! The seam between the dashboard core and whatever stores the readings.
//! Statistics only ever see data through `ReadingSource`, so a database
//! client, an HTTP client or a fixture can be injected without touching them.
//!
//! ## Key Types
//! - `Node`: A registered sensor node and its location
//! - `Channel`: One measurement stream on a node (sensor id + measurement id)
//! - `ReadingSource`: Node registry plus time-series queries
//! - `MemorySource`: In-memory implementation, loadable from a TOML snapshot
//!
//! ## Snapshot Format
//! ```toml
//! [[nodes]]
//! id = "101"
//! location = "Pune"
//!
//! [[nodes.channels]]
//! sensor_id = 1
//! measurement_id = 1
//! name = "AQI"
//! unit = ""
//! readings = [
//!     { timestamp = "2024-05-01T10:00:00", value = 42.0 },
//! ]
//! ```

use crate::error::SourceError;
use crate::timeseries::{Sample, TimeSeries};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Identifies a measurement stream within a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelKey {
    pub sensor_id: u32,
    pub measurement_id: u32,
}

impl ChannelKey {
    /// The AQI stream every node reports on
    pub const AQI: ChannelKey = ChannelKey {
        sensor_id: 1,
        measurement_id: 1,
    };

    pub fn new(sensor_id: u32, measurement_id: u32) -> Self {
        Self {
            sensor_id,
            measurement_id,
        }
    }
}

/// A registered sensor node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub location: String,
}

/// Metadata for one measurement stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub sensor_id: u32,
    pub measurement_id: u32,
    pub name: String,
    #[serde(default)]
    pub unit: String,
}

impl Channel {
    pub fn new(key: ChannelKey, name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            sensor_id: key.sensor_id,
            measurement_id: key.measurement_id,
            name: name.into(),
            unit: unit.into(),
        }
    }

    pub fn key(&self) -> ChannelKey {
        ChannelKey::new(self.sensor_id, self.measurement_id)
    }
}

/// Node registry plus time-series queries.
///
/// Implementations report their own failures; the statistics layer decides
/// whether a failure is fatal.
pub trait ReadingSource {
    /// All registered nodes, in registry order
    fn nodes(&self) -> Result<Vec<Node>, SourceError>;

    /// Measurement streams of `node_id`
    fn channels(&self, node_id: &str) -> Result<Vec<Channel>, SourceError>;

    /// Newest reading, returned even when its value is missing
    fn latest(&self, node_id: &str, channel: ChannelKey) -> Result<Option<Sample>, SourceError>;

    /// Readings at or after `cutoff`, oldest first
    fn since(
        &self,
        node_id: &str,
        channel: ChannelKey,
        cutoff: NaiveDateTime,
    ) -> Result<Vec<Sample>, SourceError>;
}

impl<S: ReadingSource + ?Sized> ReadingSource for &S {
    fn nodes(&self) -> Result<Vec<Node>, SourceError> {
        (**self).nodes()
    }

    fn channels(&self, node_id: &str) -> Result<Vec<Channel>, SourceError> {
        (**self).channels(node_id)
    }

    fn latest(&self, node_id: &str, channel: ChannelKey) -> Result<Option<Sample>, SourceError> {
        (**self).latest(node_id, channel)
    }

    fn since(
        &self,
        node_id: &str,
        channel: ChannelKey,
        cutoff: NaiveDateTime,
    ) -> Result<Vec<Sample>, SourceError> {
        (**self).since(node_id, channel, cutoff)
    }
}

struct StoredChannel {
    meta: Channel,
    series: TimeSeries,
}

struct StoredNode {
    node: Node,
    channels: Vec<StoredChannel>,
}

impl StoredNode {
    fn channel(&self, key: ChannelKey) -> Option<&StoredChannel> {
        self.channels.iter().find(|c| c.meta.key() == key)
    }
}

/// In-memory reading source
#[derive(Default)]
pub struct MemorySource {
    nodes: Vec<StoredNode>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node; re-registering an id updates its location
    pub fn add_node(&mut self, id: impl Into<String>, location: impl Into<String>) {
        let id = id.into();
        let location = location.into();
        match self.nodes.iter_mut().find(|n| n.node.id == id) {
            Some(stored) => stored.node.location = location,
            None => self.nodes.push(StoredNode {
                node: Node { id, location },
                channels: Vec::new(),
            }),
        }
    }

    /// Declare a measurement stream on an already registered node
    pub fn add_channel(&mut self, node_id: &str, channel: Channel) -> Result<(), SourceError> {
        let stored = self.node_mut(node_id)?;
        if stored.channel(channel.key()).is_none() {
            stored.channels.push(StoredChannel {
                meta: channel,
                series: TimeSeries::new(),
            });
        }
        Ok(())
    }

    /// Append a reading, creating the channel with a generic name if needed
    pub fn record(&mut self, node_id: &str, key: ChannelKey, sample: Sample) -> Result<(), SourceError> {
        let stored = self.node_mut(node_id)?;
        let idx = match stored.channels.iter().position(|c| c.meta.key() == key) {
            Some(idx) => idx,
            None => {
                stored.channels.push(StoredChannel {
                    meta: Channel::new(
                        key,
                        format!("{}_{}", key.sensor_id, key.measurement_id),
                        "",
                    ),
                    series: TimeSeries::new(),
                });
                stored.channels.len() - 1
            }
        };
        stored.channels[idx].series.add_sample(sample);
        Ok(())
    }

    /// Append an AQI reading
    pub fn record_aqi(&mut self, node_id: &str, timestamp: NaiveDateTime, value: f64) -> Result<(), SourceError> {
        self.record(node_id, ChannelKey::AQI, Sample::new(timestamp, value))
    }

    /// Load a snapshot file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let contents = fs::read_to_string(path.as_ref()).map_err(SourceError::ReadFailed)?;
        let source = Self::from_toml_str(&contents)?;
        log::info!(
            "Loaded {} nodes from {}",
            source.nodes.len(),
            path.as_ref().display()
        );
        Ok(source)
    }

    /// Parse a snapshot from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, SourceError> {
        let snapshot: Snapshot = toml::from_str(contents).map_err(SourceError::ParseFailed)?;

        let mut source = Self::new();
        for node in snapshot.nodes {
            source.add_node(node.id.clone(), node.location);
            for channel in node.channels {
                let key = ChannelKey::new(channel.sensor_id, channel.measurement_id);
                source.add_channel(&node.id, Channel::new(key, channel.name, channel.unit))?;
                for reading in channel.readings {
                    source.record(&node.id, key, reading)?;
                }
            }
        }
        Ok(source)
    }

    fn node(&self, node_id: &str) -> Result<&StoredNode, SourceError> {
        self.nodes
            .iter()
            .find(|n| n.node.id == node_id)
            .ok_or_else(|| SourceError::UnknownNode(node_id.to_string()))
    }

    fn node_mut(&mut self, node_id: &str) -> Result<&mut StoredNode, SourceError> {
        self.nodes
            .iter_mut()
            .find(|n| n.node.id == node_id)
            .ok_or_else(|| SourceError::UnknownNode(node_id.to_string()))
    }
}

impl ReadingSource for MemorySource {
    fn nodes(&self) -> Result<Vec<Node>, SourceError> {
        Ok(self.nodes.iter().map(|n| n.node.clone()).collect())
    }

    fn channels(&self, node_id: &str) -> Result<Vec<Channel>, SourceError> {
        Ok(self.node(node_id)?.channels.iter().map(|c| c.meta.clone()).collect())
    }

    fn latest(&self, node_id: &str, channel: ChannelKey) -> Result<Option<Sample>, SourceError> {
        Ok(self
            .node(node_id)?
            .channel(channel)
            .and_then(|c| c.series.latest())
            .cloned())
    }

    fn since(
        &self,
        node_id: &str,
        channel: ChannelKey,
        cutoff: NaiveDateTime,
    ) -> Result<Vec<Sample>, SourceError> {
        Ok(self
            .node(node_id)?
            .channel(channel)
            .map(|c| c.series.since(cutoff).to_vec())
            .unwrap_or_default())
    }
}

#[derive(Deserialize)]
struct Snapshot {
    #[serde(default)]
    nodes: Vec<SnapshotNode>,
}

#[derive(Deserialize)]
struct SnapshotNode {
    id: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    channels: Vec<SnapshotChannel>,
}

#[derive(Deserialize)]
struct SnapshotChannel {
    sensor_id: u32,
    measurement_id: u32,
    name: String,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    readings: Vec<Sample>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    const SNAPSHOT: &str = r#"
        [[nodes]]
        id = "101"
        location = "Pune"

        [[nodes.channels]]
        sensor_id = 1
        measurement_id = 1
        name = "AQI"
        readings = [
            { timestamp = "2024-05-01T10:00:00", value = 42.0 },
            { timestamp = "2024-05-01T08:00:00", value = 30.0 },
        ]

        [[nodes.channels]]
        sensor_id = 2
        measurement_id = 1
        name = "Temperature"
        unit = "C"

        [[nodes]]
        id = "102"
        location = "Mumbai"
    "#;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_snapshot() {
        let source = MemorySource::from_toml_str(SNAPSHOT).expect("Failed to parse snapshot");

        let nodes = source.nodes().unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].id, "101");
        assert_eq!(nodes[1].location, "Mumbai");

        let channels = source.channels("101").unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[1].name, "Temperature");
        assert_eq!(channels[1].unit, "C");

        let latest = source.latest("101", ChannelKey::AQI).unwrap().unwrap();
        assert_eq!(latest.timestamp, at(10));
        assert_eq!(latest.value, Some(42.0));
    }

    #[test]
    fn test_since_filters_and_orders() {
        let source = MemorySource::from_toml_str(SNAPSHOT).unwrap();

        let recent = source.since("101", ChannelKey::AQI, at(9)).unwrap();
        assert_eq!(recent.len(), 1);

        let all = source.since("101", ChannelKey::AQI, at(0)).unwrap();
        assert_eq!(all[0].timestamp, at(8));
    }

    #[test]
    fn test_missing_channel_is_empty() {
        let source = MemorySource::from_toml_str(SNAPSHOT).unwrap();

        assert_eq!(source.latest("102", ChannelKey::AQI).unwrap(), None);
        assert!(source.since("102", ChannelKey::AQI, at(0)).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_node() {
        let source = MemorySource::new();
        assert!(matches!(source.channels("9"), Err(SourceError::UnknownNode(id)) if id == "9"));

        let mut source = MemorySource::new();
        assert!(source.record_aqi("9", at(1), 1.0).is_err());
    }

    #[test]
    fn test_record_creates_channel() {
        let mut source = MemorySource::new();
        source.add_node("7", "Delhi");
        source.record_aqi("7", at(1), 80.0).unwrap();
        source.record_aqi("7", at(2), 90.0).unwrap();

        let channels = source.channels("7").unwrap();
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].key(), ChannelKey::AQI);
        assert_eq!(source.latest("7", ChannelKey::AQI).unwrap().unwrap().value, Some(90.0));
    }

    #[test]
    fn test_latest_returns_null_newest_reading() {
        let mut source = MemorySource::new();
        source.add_node("7", "Delhi");
        source.record_aqi("7", at(1), 80.0).unwrap();
        source
            .record("7", ChannelKey::AQI, Sample { timestamp: at(2), value: None })
            .unwrap();

        let latest = source.latest("7", ChannelKey::AQI).unwrap().unwrap();
        assert_eq!(latest.timestamp, at(2));
        assert_eq!(latest.value, None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snapshot.toml");
        fs::write(&path, SNAPSHOT).unwrap();

        let source = MemorySource::load(&path).unwrap();
        assert_eq!(source.nodes().unwrap().len(), 2);

        assert!(matches!(
            MemorySource::load(dir.path().join("missing.toml")),
            Err(SourceError::ReadFailed(_))
        ));
    }

    #[test]
    fn test_invalid_snapshot() {
        let result = MemorySource::from_toml_str("[[nodes]]\nlocation = \"nowhere\"");
        assert!(matches!(result, Err(SourceError::ParseFailed(_))));
    }
}
