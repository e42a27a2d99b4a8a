//! Reconstruction of a hospital's recent bed availability from sparse
//! per-minute observations.
//!
//! Every function here is pure and expects its input sorted by ascending
//! timestamp. Out-of-order input is not detected in release builds and yields
//! meaningless figures.

use crate::beds::observation::{ONE_MINUTE, Observation, same_minute};
use serde::Serialize;
use time::Duration;
use tracing::debug;

/// Length of the trailing window in minutes.
pub const WINDOW_MINUTES: u32 = 120;
/// Number of 15-minute buckets covering the window.
pub const BUCKET_COUNT: usize = 8;
pub const BUCKET_INTERVAL: Duration = Duration::minutes(15);

/// Availability summary for one hospital over the trailing window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BedHistory {
    pub available_time: String,
    pub available_percent: f64,
    pub unavailable_percent: f64,
    pub buckets: Vec<i32>,
}

impl BedHistory {
    /// Build the full summary from observations in ascending order.
    pub fn reconstruct(observations: &[Observation]) -> Self {
        let minutes = available_minutes(observations).min(WINDOW_MINUTES);
        let available_percent = availability_percent(minutes);

        Self {
            available_time: available_time_label(minutes),
            available_percent,
            unavailable_percent: complement_percent(available_percent),
            buckets: padded_buckets(observations),
        }
    }

    /// The reading appended after the eight interval buckets, if any.
    pub fn latest_bucket(&self) -> Option<i32> {
        self.buckets.get(BUCKET_COUNT).copied()
    }
}

/// Count the minutes in which at least one bed was available.
///
/// A reading one minute after its predecessor counts once when it has a free
/// bed. Any other reading from the third onwards credits one minute for the
/// previous reading and one for itself, each only if that reading had a free
/// bed, approximating availability across the gap.
pub fn available_minutes(observations: &[Observation]) -> u32 {
    debug_assert!(is_ascending(observations));

    let Some(first) = observations.first() else {
        return 0;
    };

    let mut total = 0;
    let mut previous_time = first.timestamp - ONE_MINUTE;
    for (index, observation) in observations.iter().enumerate() {
        if same_minute(observation.timestamp, previous_time + ONE_MINUTE)
            && observation.has_available_bed()
        {
            total += 1;
        } else if index >= 2 {
            if observations[index - 1].has_available_bed() {
                total += 1;
            }
            if observation.has_available_bed() {
                total += 1;
            }
        }
        previous_time = observation.timestamp;
    }

    total
}

/// Render a minute count as "`{hours} hours {minutes} minutes`".
pub fn available_time_label(total_minutes: u32) -> String {
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    format!("{hours} hours {minutes} minutes")
}

/// Share of the window with a free bed, rounded to one decimal.
pub fn availability_percent(total_minutes: u32) -> f64 {
    let percent = f64::from(total_minutes) / f64::from(WINDOW_MINUTES) * 100.0;
    round_one_decimal(percent)
}

/// `100 - percent`, rounded to one decimal. Takes the already rounded value.
pub fn complement_percent(percent: f64) -> f64 {
    round_one_decimal(100.0 - percent)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Sample bed counts at 15-minute marks starting from the first observation.
///
/// When the reading for a mark is missing but the one right after it exists,
/// the mark takes the reading from the minute before it, or 0 if that one is
/// missing too. Counts are clamped at 0.
pub fn interval_buckets(observations: &[Observation]) -> Vec<i32> {
    debug_assert!(is_ascending(observations));

    let Some(first) = observations.first() else {
        return Vec::new();
    };

    let mut buckets = Vec::with_capacity(BUCKET_COUNT + 1);
    let mut boundary = first.timestamp;
    for (index, observation) in observations.iter().enumerate() {
        let one_minute_before = observation.timestamp - ONE_MINUTE;

        if same_minute(one_minute_before, boundary) {
            let carried = index
                .checked_sub(1)
                .map(|previous| &observations[previous])
                .filter(|previous| {
                    same_minute(previous.timestamp, one_minute_before - ONE_MINUTE)
                })
                .map_or(0, |previous| previous.bed_count.max(0));
            buckets.push(carried);
            boundary += BUCKET_INTERVAL;
        }

        if same_minute(observation.timestamp, boundary) {
            buckets.push(observation.bed_count.max(0));
            boundary += BUCKET_INTERVAL;
        }
    }

    buckets
}

/// Interval buckets completed to the charted length.
///
/// Fewer than eight buckets means the tracker was not running for part of the
/// window; the series is topped up with `9 - len` zeros, so it always ends up
/// with nine entries. Exactly eight buckets gets the latest reading appended.
/// Longer series are cut back to nine.
pub fn padded_buckets(observations: &[Observation]) -> Vec<i32> {
    let mut buckets = interval_buckets(observations);

    match buckets.len() {
        len if len < BUCKET_COUNT => {
            buckets.extend(std::iter::repeat_n(0, BUCKET_COUNT - len + 1));
        }
        BUCKET_COUNT => {
            let latest = observations.last().map_or(0, |last| last.bed_count.max(0));
            buckets.push(latest);
        }
        len if len > BUCKET_COUNT + 1 => {
            debug!(buckets = len, "Truncating bucket series overflow");
            buckets.truncate(BUCKET_COUNT + 1);
        }
        _ => {}
    }

    buckets
}

fn is_ascending(observations: &[Observation]) -> bool {
    observations.is_sorted_by_key(|observation| observation.timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use time::macros::datetime;

    const START: OffsetDateTime = datetime!(2026-01-11 10:00:00 UTC);

    fn at(minute: i64, bed_count: i32) -> Observation {
        Observation::new("Seoul General", START + Duration::minutes(minute), bed_count)
    }

    fn every_minute(from: i64, to: i64, bed_count: i32) -> Vec<Observation> {
        (from..=to).map(|minute| at(minute, bed_count)).collect()
    }

    #[test]
    fn empty_window_yields_defaults() {
        let history = BedHistory::reconstruct(&[]);

        assert_eq!(history.available_time, "0 hours 0 minutes");
        assert_eq!(history.available_percent, 0.0);
        assert_eq!(history.unavailable_percent, 100.0);
        assert_eq!(history.buckets, vec![0; 9]);
        assert!(interval_buckets(&[]).is_empty());
        assert_eq!(available_minutes(&[]), 0);
    }

    #[test]
    fn contiguous_readings_count_one_minute_each() {
        let observations = every_minute(0, 9, 3);

        assert_eq!(available_minutes(&observations), 10);
    }

    #[test]
    fn contiguous_readings_without_beds_count_nothing_early() {
        let observations = vec![at(0, 0), at(1, 0)];

        assert_eq!(available_minutes(&observations), 0);
    }

    #[test]
    fn gap_credits_previous_and_current_reading() {
        // 10:00 empty, 10:01 free, 10:04 free after a gap
        let observations = vec![at(0, 0), at(1, 3), at(4, 2)];

        assert_eq!(available_minutes(&observations), 3);
    }

    #[test]
    fn gap_on_second_reading_is_not_credited() {
        let observations = vec![at(0, 2), at(5, 2)];

        assert_eq!(available_minutes(&observations), 1);
    }

    #[test]
    fn contiguous_empty_reading_still_credits_previous_minute() {
        // 10:02 has no bed, so the contiguous branch fails and the gap branch
        // credits the free reading at 10:01.
        let observations = vec![at(0, 1), at(1, 1), at(2, 0)];

        assert_eq!(available_minutes(&observations), 3);
    }

    #[test]
    fn label_splits_hours_and_minutes() {
        assert_eq!(available_time_label(0), "0 hours 0 minutes");
        assert_eq!(available_time_label(59), "0 hours 59 minutes");
        assert_eq!(available_time_label(95), "1 hours 35 minutes");
        assert_eq!(available_time_label(120), "2 hours 0 minutes");
    }

    #[test]
    fn percent_is_rounded_to_one_decimal() {
        assert_eq!(availability_percent(0), 0.0);
        assert_eq!(availability_percent(1), 0.8);
        assert_eq!(availability_percent(7), 5.8);
        assert_eq!(availability_percent(60), 50.0);
        assert_eq!(availability_percent(120), 100.0);
    }

    #[test]
    fn complement_uses_rounded_percent() {
        for minutes in 0..=WINDOW_MINUTES {
            let percent = availability_percent(minutes);
            let complement = complement_percent(percent);
            assert_eq!(complement, ((100.0 - percent) * 10.0).round() / 10.0);
            assert!((percent + complement - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn minutes_are_capped_at_window_length() {
        let observations = every_minute(0, 120, 5);
        assert_eq!(available_minutes(&observations), 121);

        let history = BedHistory::reconstruct(&observations);

        assert_eq!(history.available_time, "2 hours 0 minutes");
        assert_eq!(history.available_percent, 100.0);
        assert_eq!(history.unavailable_percent, 0.0);
    }

    #[test]
    fn buckets_sample_every_fifteen_minutes() {
        let observations: Vec<Observation> =
            (0..=105).map(|minute| at(minute, minute as i32)).collect();

        assert_eq!(
            interval_buckets(&observations),
            vec![0, 15, 30, 45, 60, 75, 90, 105]
        );
    }

    #[test]
    fn missing_boundary_carries_previous_minute() {
        // 10:15 is missing; 10:14 is carried when 10:16 arrives.
        let mut observations = every_minute(0, 14, 4);
        observations.push(at(16, 9));

        assert_eq!(interval_buckets(&observations), vec![4, 4]);
    }

    #[test]
    fn missing_boundary_without_previous_minute_emits_zero() {
        let observations = vec![at(0, 4), at(10, 6), at(16, 9)];

        assert_eq!(interval_buckets(&observations), vec![4, 0]);
    }

    #[test]
    fn negative_counts_are_clamped_in_buckets() {
        let mut observations = every_minute(0, 14, -2);
        observations.push(at(15, -1));
        observations.push(at(30, -7));

        let buckets = interval_buckets(&observations);

        assert_eq!(buckets, vec![0, 0, 0]);
        assert!(padded_buckets(&observations).iter().all(|count| *count >= 0));
    }

    #[test]
    fn under_filled_series_is_padded_to_nine() {
        let observations = vec![at(0, 2), at(7, 3), at(15, 5)];
        assert_eq!(interval_buckets(&observations).len(), 2);

        let buckets = padded_buckets(&observations);

        assert_eq!(buckets, vec![2, 5, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn exactly_eight_buckets_appends_latest_reading() {
        let mut observations = every_minute(0, 110, 6);
        observations.push(at(111, -3));
        observations.push(at(112, 8));

        let buckets = padded_buckets(&observations);

        assert_eq!(buckets.len(), 9);
        assert_eq!(&buckets[..8], &[6; 8]);
        assert_eq!(buckets[8], 8);
    }

    #[test]
    fn exactly_eight_buckets_clamps_negative_latest_reading() {
        let mut observations = every_minute(0, 110, 6);
        observations.push(at(111, -3));

        let buckets = padded_buckets(&observations);

        assert_eq!(buckets[8], 0);
    }

    #[test]
    fn full_window_yields_nine_boundary_buckets() {
        let observations: Vec<Observation> =
            (0..=120).map(|minute| at(minute, (minute / 15) as i32)).collect();

        let history = BedHistory::reconstruct(&observations);

        assert_eq!(history.buckets, vec![0, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(history.latest_bucket(), Some(8));
    }

    #[test]
    fn overflowing_series_is_truncated_to_nine() {
        let observations: Vec<Observation> = (0..=180).map(|minute| at(minute, 1)).collect();
        assert_eq!(interval_buckets(&observations).len(), 13);

        assert_eq!(padded_buckets(&observations), vec![1; 9]);
    }

    #[test]
    fn tracker_started_late_leaves_trailing_zeros() {
        // tracker only ran for the last 40 minutes of the window
        let observations = every_minute(80, 120, 2);

        let history = BedHistory::reconstruct(&observations);

        assert_eq!(history.buckets, vec![2, 2, 2, 0, 0, 0, 0, 0, 0]);
        assert_eq!(history.available_time, "0 hours 41 minutes");
        assert_eq!(history.available_percent, 34.2);
        assert_eq!(history.unavailable_percent, 65.8);
    }

    #[test]
    fn history_serializes_snake_case() -> Result<(), Box<dyn std::error::Error>> {
        let history = BedHistory::reconstruct(&[at(0, 1), at(1, 1)]);

        let value = serde_json::to_value(&history)?;

        assert_eq!(
            value,
            serde_json::json!({
                "available_time": "0 hours 2 minutes",
                "available_percent": 1.7,
                "unavailable_percent": 98.3,
                "buckets": [1, 0, 0, 0, 0, 0, 0, 0, 0]
            })
        );
        Ok(())
    }
}
