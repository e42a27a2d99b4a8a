use crate::hospital::HospitalId;
use crate::routing::RoutingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("hospital not found: {0}")]
    HospitalNotFound(HospitalId),
    #[error("hospital {0} has no coordinates")]
    MissingLocation(HospitalId),
    #[error("routing error: {0}")]
    Routing(#[from] RoutingError),
    #[error("observation store lock poisoned")]
    StoreLock,
}
