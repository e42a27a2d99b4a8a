use crate::beds::observation::{Observation, truncate_to_minute};
use crate::error::AppError;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::RwLock;
use thiserror::Error;
use time::OffsetDateTime;

/// Storage for bed observations reported by the tracker.
pub trait ObservationStore: Send + Sync + fmt::Debug {
    fn record(&self, observation: Observation) -> Result<(), AppError>;

    /// The observation recorded during the same minute as `time`, if any.
    fn find_at(
        &self,
        hospital_name: &str,
        time: OffsetDateTime,
    ) -> Result<Option<Observation>, AppError>;

    /// All observations with `start <= timestamp <= end`, in no particular order.
    fn find_between(
        &self,
        hospital_name: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<Observation>, AppError>;
}

/// Append-only observation log kept in memory, keyed by hospital name.
#[derive(Debug, Default)]
pub struct InMemoryObservationStore {
    observations: RwLock<HashMap<String, Vec<Observation>>>,
}

impl InMemoryObservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observations(observations: impl IntoIterator<Item = Observation>) -> Self {
        let mut by_hospital: HashMap<String, Vec<Observation>> = HashMap::new();
        for observation in observations {
            by_hospital
                .entry(observation.hospital_name.clone())
                .or_default()
                .push(observation);
        }
        Self {
            observations: RwLock::new(by_hospital),
        }
    }

    pub fn len(&self) -> Result<usize, AppError> {
        let guard = self.observations.read().map_err(|_| AppError::StoreLock)?;
        Ok(guard.values().map(Vec::len).sum())
    }

    pub fn is_empty(&self) -> Result<bool, AppError> {
        Ok(self.len()? == 0)
    }
}

impl ObservationStore for InMemoryObservationStore {
    fn record(&self, observation: Observation) -> Result<(), AppError> {
        let mut guard = self.observations.write().map_err(|_| AppError::StoreLock)?;
        guard
            .entry(observation.hospital_name.clone())
            .or_default()
            .push(observation);
        Ok(())
    }

    fn find_at(
        &self,
        hospital_name: &str,
        time: OffsetDateTime,
    ) -> Result<Option<Observation>, AppError> {
        let minute = truncate_to_minute(time);
        let guard = self.observations.read().map_err(|_| AppError::StoreLock)?;
        let found = guard.get(hospital_name).and_then(|observations| {
            observations
                .iter()
                .find(|observation| truncate_to_minute(observation.timestamp) == minute)
                .cloned()
        });
        Ok(found)
    }

    fn find_between(
        &self,
        hospital_name: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<Observation>, AppError> {
        let guard = self.observations.read().map_err(|_| AppError::StoreLock)?;
        let found = guard
            .get(hospital_name)
            .map(|observations| {
                observations
                    .iter()
                    .filter(|observation| {
                        observation.timestamp >= start && observation.timestamp <= end
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(found)
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read observation snapshot: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse observation snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Seed a store from a JSON array of observations.
pub fn load_snapshot_from_path(
    path: impl AsRef<Path>,
) -> Result<InMemoryObservationStore, SnapshotError> {
    let contents = std::fs::read_to_string(path)?;
    let observations: Vec<Observation> = serde_json::from_str(&contents)?;
    Ok(InMemoryObservationStore::with_observations(observations))
}
