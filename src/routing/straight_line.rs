use crate::hospital::geo::Coordinates;
use crate::routing::{RouteEstimate, RouteEstimator, RoutingError};
use async_trait::async_trait;

pub const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Haversine distance driven at a constant average speed.
#[derive(Debug, Clone)]
pub struct StraightLineEstimator {
    speed_kmh: f64,
}

impl StraightLineEstimator {
    pub fn new(speed_kmh: f64) -> Self {
        let speed_kmh = if speed_kmh.is_finite() && speed_kmh > 0.0 {
            speed_kmh
        } else {
            DEFAULT_SPEED_KMH
        };
        Self { speed_kmh }
    }

    pub fn estimate_now(&self, origin: Coordinates, destination: Coordinates) -> RouteEstimate {
        let distance_m = origin.distance_m(&destination);
        let metres_per_sec = self.speed_kmh * 1000.0 / 3600.0;
        RouteEstimate {
            distance_m,
            duration_secs: (distance_m / metres_per_sec).round() as u64,
        }
    }
}

impl Default for StraightLineEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED_KMH)
    }
}

#[async_trait]
impl RouteEstimator for StraightLineEstimator {
    async fn estimate(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RouteEstimate, RoutingError> {
        Ok(self.estimate_now(origin, destination))
    }
}
