//! # Trend Bucketing Module
//!
//! Groups raw readings into the fixed-length bucket series the sparkline is
//! drawn from, and produces the matching axis labels.
//!
//! ## Bucket Layouts
//! - `Interval::Day`: 24 buckets, one per hour of day (`00`..`23`)
//! - `Interval::Week` / `Interval::Month`: one bucket per calendar day,
//!   ending on the day of the reference time
//!
//! Each bucket holds the mean of its samples. Empty buckets are forward-filled
//! from the previous bucket; buckets before the first value get the seed.

use crate::timeseries::Sample;
use chrono::{Duration, NaiveDateTime, Timelike};
use serde::Serialize;

pub const HOURS_PER_DAY: usize = 24;

/// Seed for buckets preceding the first known value
pub const DEFAULT_FILL_SEED: f64 = 0.0;

/// Trend window shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Interval {
    /// 24 hours, hourly buckets
    #[default]
    Day,
    /// 7 days, daily buckets
    Week,
    /// 30 days, daily buckets
    Month,
}

impl Interval {
    /// Map a requested window onto a supported one; unknown values fall back to a day
    pub fn from_hours(hours: u32) -> Self {
        match hours {
            168 => Interval::Week,
            720 => Interval::Month,
            _ => Interval::Day,
        }
    }

    pub fn hours(&self) -> u32 {
        match self {
            Interval::Day => 24,
            Interval::Week => 168,
            Interval::Month => 720,
        }
    }

    /// Earliest timestamp inside the window ending at `now`
    pub fn cutoff(&self, now: NaiveDateTime) -> NaiveDateTime {
        now - Duration::hours(self.hours() as i64)
    }

    /// Number of daily buckets for multi-day windows
    pub fn num_days(&self) -> usize {
        (self.hours() as usize / HOURS_PER_DAY).min(30)
    }

    /// Bucket `samples` for this window and forward-fill the gaps
    pub fn bucket(&self, samples: &[Sample], now: NaiveDateTime) -> Vec<f64> {
        let sparse = match self {
            Interval::Day => hourly_means(samples),
            Interval::Week | Interval::Month => daily_means(samples, now, self.num_days()),
        };
        forward_fill(&sparse, DEFAULT_FILL_SEED)
    }

    /// X-axis labels for this window
    pub fn labels(&self) -> Vec<String> {
        match self {
            Interval::Day => hourly_labels(),
            Interval::Week | Interval::Month => day_labels(self.num_days()),
        }
    }
}

/// Running sum and count for one bucket
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Mean value per hour of day; hours without samples are `None`
pub fn hourly_means(samples: &[Sample]) -> Vec<Option<f64>> {
    let mut buckets = [Accumulator::default(); HOURS_PER_DAY];
    for sample in samples {
        if let Some(value) = sample.value {
            buckets[sample.timestamp.hour() as usize].push(value);
        }
    }
    buckets.iter().map(Accumulator::mean).collect()
}

/// Mean value per calendar day for the `num_days` days ending on `now`'s date
pub fn daily_means(samples: &[Sample], now: NaiveDateTime, num_days: usize) -> Vec<Option<f64>> {
    let mut buckets = vec![Accumulator::default(); num_days];
    let end_date = now.date();

    for sample in samples {
        let Some(value) = sample.value else { continue };
        let days_back = (end_date - sample.timestamp.date()).num_days();
        if days_back < 0 || days_back >= num_days as i64 {
            continue;
        }
        buckets[num_days - 1 - days_back as usize].push(value);
    }

    buckets.iter().map(Accumulator::mean).collect()
}

/// Replace each missing bucket with the most recent known value before it.
///
/// Buckets ahead of the first known value take `seed`.
pub fn forward_fill(buckets: &[Option<f64>], seed: f64) -> Vec<f64> {
    let mut last = seed;
    buckets
        .iter()
        .map(|bucket| {
            if let Some(value) = bucket {
                last = *value;
            }
            last
        })
        .collect()
}

/// `00`, `04`, ... `24`
pub fn hourly_labels() -> Vec<String> {
    (0..=24).step_by(4).map(|h| format!("{:02}", h)).collect()
}

/// Six labels four hours apart, starting from `first_hour`
pub fn hourly_labels_from(first_hour: u32) -> Vec<String> {
    (0..6).map(|i| format!("{:02}", (first_hour + 4 * i) % 24)).collect()
}

/// `Day 1`, ... stepping so roughly six labels cover `num_days`
pub fn day_labels(num_days: usize) -> Vec<String> {
    let step = (num_days / 6).max(1);
    (0..num_days).step_by(step).map(|i| format!("Day {}", i + 1)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_interval_from_hours() {
        assert_eq!(Interval::from_hours(24), Interval::Day);
        assert_eq!(Interval::from_hours(168), Interval::Week);
        assert_eq!(Interval::from_hours(720), Interval::Month);
        assert_eq!(Interval::from_hours(48), Interval::Day);
        assert_eq!(Interval::from_hours(0), Interval::Day);
    }

    #[test]
    fn test_num_days() {
        assert_eq!(Interval::Week.num_days(), 7);
        assert_eq!(Interval::Month.num_days(), 30);
    }

    #[test]
    fn test_forward_fill() {
        let filled = forward_fill(&[None, Some(3.0), None, None, Some(5.0), None], 0.0);
        assert_eq!(filled, vec![0.0, 3.0, 3.0, 3.0, 5.0, 5.0]);
    }

    #[test]
    fn test_forward_fill_all_missing_uses_seed() {
        assert_eq!(forward_fill(&[None; 4], DEFAULT_FILL_SEED), vec![0.0; 4]);
        assert_eq!(forward_fill(&[None; 3], 7.5), vec![7.5; 3]);
    }

    #[test]
    fn test_hourly_means() {
        let samples = vec![
            Sample::new(at(1, 2), 10.0),
            Sample::new(at(1, 2), 20.0),
            Sample::new(at(2, 2), 30.0),
            Sample { timestamp: at(1, 5), value: None },
            Sample::new(at(1, 23), 4.0),
        ];
        let means = hourly_means(&samples);

        assert_eq!(means.len(), 24);
        assert_eq!(means[2], Some(20.0));
        assert_eq!(means[5], None);
        assert_eq!(means[23], Some(4.0));
    }

    #[test]
    fn test_daily_means_window() {
        let now = at(10, 12);
        let samples = vec![
            Sample::new(at(3, 1), 99.0), // outside a 7 day window
            Sample::new(at(4, 1), 10.0),
            Sample::new(at(4, 20), 20.0),
            Sample::new(at(10, 8), 40.0),
        ];
        let means = daily_means(&samples, now, 7);

        assert_eq!(means.len(), 7);
        assert_eq!(means[0], Some(15.0));
        assert_eq!(means[6], Some(40.0));
        assert!(means[1..6].iter().all(Option::is_none));
    }

    #[test]
    fn test_week_bucket_fills_forward() {
        let now = at(10, 12);
        let samples = vec![Sample::new(at(6, 1), 50.0)];
        let values = Interval::Week.bucket(&samples, now);

        assert_eq!(values, vec![0.0, 0.0, 50.0, 50.0, 50.0, 50.0, 50.0]);
    }

    #[test]
    fn test_labels() {
        assert_eq!(hourly_labels(), vec!["00", "04", "08", "12", "16", "20", "24"]);
        assert_eq!(hourly_labels_from(22), vec!["22", "02", "06", "10", "14", "18"]);
        assert_eq!(Interval::Week.labels(), vec!["Day 1", "Day 2", "Day 3", "Day 4", "Day 5", "Day 6", "Day 7"]);
        assert_eq!(
            Interval::Month.labels(),
            vec!["Day 1", "Day 6", "Day 11", "Day 16", "Day 21", "Day 26"]
        );
    }

    #[test]
    fn test_cutoff() {
        assert_eq!(Interval::Day.cutoff(at(10, 12)), at(9, 12));
        assert_eq!(Interval::Week.cutoff(at(10, 12)), at(3, 12));
    }
}
