use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// A single timestamped reading; `value` is `None` when the row carried no number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

impl Sample {
    pub fn new(timestamp: NaiveDateTime, value: f64) -> Self {
        Self {
            timestamp,
            value: Some(value),
        }
    }
}

pub trait SampleSliceExt {
    fn values(&self) -> Vec<f64>;
    fn first_hour(&self) -> Option<u32>;
}

impl SampleSliceExt for [Sample] {
    /// Present values only, in slice order
    fn values(&self) -> Vec<f64> {
        self.iter().filter_map(|s| s.value).collect()
    }

    /// Smallest hour-of-day among samples that carry a value
    fn first_hour(&self) -> Option<u32> {
        self.iter()
            .filter(|s| s.value.is_some())
            .map(|s| s.timestamp.hour())
            .min()
    }
}

/// Ordered readings of one channel
#[derive(Debug, Clone, Default)]
pub struct TimeSeries {
    data: Vec<Sample>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Insert keeping timestamp order; equal timestamps keep arrival order
    pub fn add_sample(&mut self, sample: Sample) {
        let idx = self.data.partition_point(|s| s.timestamp <= sample.timestamp);
        self.data.insert(idx, sample);
    }

    pub fn samples(&self) -> &[Sample] {
        &self.data
    }

    /// Newest sample, even when its value is missing
    pub fn latest(&self) -> Option<&Sample> {
        self.data.last()
    }

    /// Samples at or after `cutoff`, oldest first
    pub fn since(&self, cutoff: NaiveDateTime) -> &[Sample] {
        let start = self.data.partition_point(|s| s.timestamp < cutoff);
        &self.data[start..]
    }
}

impl FromIterator<Sample> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        let mut series = TimeSeries::new();
        for sample in iter {
            series.add_sample(sample);
        }
        series
    }
}
