use crate::error::AppError;
use std::sync::Arc;
use time::{Duration, OffsetDateTime, UtcOffset};
use tracing::debug;

pub mod history;
pub mod observation;
pub mod store;

use history::{BedHistory, WINDOW_MINUTES};
use observation::{ONE_MINUTE, Observation};
use store::ObservationStore;

/// Bed availability queries backed by an observation store.
#[derive(Debug, Clone)]
pub struct BedService {
    store: Arc<dyn ObservationStore>,
    offset: UtcOffset,
}

impl BedService {
    pub fn new(store: Arc<dyn ObservationStore>, offset: UtcOffset) -> Self {
        Self { store, offset }
    }

    pub fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }

    /// Store a reading pushed by the tracker.
    pub fn record(&self, observation: Observation) -> Result<(), AppError> {
        debug!(
            hospital = %observation.hospital_name,
            bed_count = observation.bed_count,
            timestamp = %observation.timestamp,
            "Recording bed observation"
        );
        self.store.record(observation)
    }

    /// Latest known bed count, or 0 when the tracker has nothing recent.
    pub fn current_count(&self, hospital_name: &str) -> Result<i32, AppError> {
        self.current_count_at(hospital_name, self.now())
    }

    pub fn current_count_at(
        &self,
        hospital_name: &str,
        now: OffsetDateTime,
    ) -> Result<i32, AppError> {
        let one_minute_ago = now - ONE_MINUTE;
        let observation = match self.store.find_at(hospital_name, one_minute_ago)? {
            Some(observation) => Some(observation),
            None => self.store.find_at(hospital_name, one_minute_ago - ONE_MINUTE)?,
        };

        match observation {
            Some(observation) => Ok(observation.bed_count),
            None => {
                debug!(hospital = hospital_name, "No bed observation in the last two minutes");
                Ok(0)
            }
        }
    }

    /// Availability over the two hours ending one minute before now.
    pub fn recent_history(&self, hospital_name: &str) -> Result<BedHistory, AppError> {
        self.recent_history_at(hospital_name, self.now())
    }

    pub fn recent_history_at(
        &self,
        hospital_name: &str,
        now: OffsetDateTime,
    ) -> Result<BedHistory, AppError> {
        let end = now - ONE_MINUTE;
        let start = end - Duration::minutes(i64::from(WINDOW_MINUTES));

        let mut observations = self.store.find_between(hospital_name, start, end)?;
        if observations.is_empty() {
            debug!(hospital = hospital_name, "No bed observations in the trailing window");
        }
        observations.sort_by_key(|observation| observation.timestamp);

        Ok(BedHistory::reconstruct(&observations))
    }
}
