use hospital_finder::beds::BedService;
use hospital_finder::beds::history::BedHistory;
use hospital_finder::beds::observation::Observation;
use hospital_finder::beds::store::{InMemoryObservationStore, ObservationStore};
use hospital_finder::error::AppError;
use std::sync::Arc;
use time::macros::{datetime, offset};
use time::{Duration, OffsetDateTime};

const NOW: OffsetDateTime = datetime!(2026-01-11 21:00:20 +09:00);

fn reading(minutes_ago: i64, bed_count: i32) -> Observation {
    Observation::new("Seoul General", NOW - Duration::minutes(minutes_ago), bed_count)
}

fn service_with(store: InMemoryObservationStore) -> BedService {
    BedService::new(Arc::new(store), offset!(+9))
}

#[test]
fn tracker_running_the_whole_window() -> Result<(), AppError> {
    let store = InMemoryObservationStore::new();
    for minutes_ago in (1..=121).rev() {
        store.record(reading(minutes_ago, if minutes_ago > 60 { 0 } else { 5 }))?;
    }
    let service = service_with(store);

    let current = service.current_count_at("Seoul General", NOW)?;
    let history = service.recent_history_at("Seoul General", NOW)?;

    assert_eq!(current, 5);
    // only the last hour had free beds
    assert_eq!(history.available_time, "1 hours 0 minutes");
    assert_eq!(history.available_percent, 50.0);
    assert_eq!(history.unavailable_percent, 50.0);
    assert_eq!(history.buckets, vec![0, 0, 0, 0, 0, 5, 5, 5, 5]);
    Ok(())
}

#[test]
fn tracker_dropping_samples() -> Result<(), AppError> {
    // 10 minutes ago empty, 9 minutes ago free, then a gap until 6 minutes ago
    let store = InMemoryObservationStore::with_observations(vec![
        reading(6, 2),
        reading(10, 0),
        reading(9, 3),
    ]);
    let service = service_with(store);

    let current = service.current_count_at("Seoul General", NOW)?;
    let history = service.recent_history_at("Seoul General", NOW)?;

    assert_eq!(current, 0);
    assert_eq!(history.available_time, "0 hours 3 minutes");
    assert_eq!(history.available_percent, 2.5);
    assert_eq!(history.unavailable_percent, 97.5);
    assert_eq!(history.buckets, vec![0; 9]);
    Ok(())
}

#[test]
fn tracker_stopped_two_minutes_ago() -> Result<(), AppError> {
    let store = InMemoryObservationStore::with_observations(vec![reading(2, 7), reading(3, 1)]);
    let service = service_with(store);

    assert_eq!(service.current_count_at("Seoul General", NOW)?, 7);
    Ok(())
}

#[test]
fn store_lookup_is_minute_granular() -> Result<(), AppError> {
    let store = InMemoryObservationStore::with_observations(vec![reading(1, 4)]);

    let found = store.find_at("Seoul General", datetime!(2026-01-11 11:59:59 UTC))?;

    assert_eq!(found.map(|observation| observation.bed_count), Some(4));
    Ok(())
}

#[test]
fn reconstruction_does_not_touch_input() {
    let observations = vec![reading(3, -1), reading(2, 2), reading(1, 3)];
    let snapshot = observations.clone();

    let history = BedHistory::reconstruct(&observations);

    assert_eq!(observations, snapshot);
    assert!(history.buckets.iter().all(|count| *count >= 0));
    assert_eq!(history.buckets.len(), 9);
}
