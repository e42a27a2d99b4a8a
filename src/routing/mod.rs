//! Travel distance and arrival-time estimates between two coordinates.

use crate::hospital::geo::Coordinates;
use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

pub mod remote;
pub mod straight_line;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteEstimate {
    pub distance_m: f64,
    pub duration_secs: u64,
}

impl RouteEstimate {
    /// Distance in kilometres, rounded to one decimal.
    pub fn distance_km(&self) -> f64 {
        (self.distance_m / 1000.0 * 10.0).round() / 10.0
    }

    /// Wall-clock arrival label such as "PM 3:07" when leaving at `now`.
    pub fn arrival_label(&self, now: OffsetDateTime) -> String {
        let travel_minutes = u32::try_from(self.duration_secs / 60).unwrap_or(u32::MAX);
        let mut hour = u32::from(now.hour());
        let mut minute = u32::from(now.minute()).saturating_add(travel_minutes);

        if minute >= 60 {
            hour += minute / 60;
            minute %= 60;
        }

        if hour >= 24 {
            hour -= 24;
            format!("AM {hour}:{minute:02}")
        } else if hour >= 12 {
            let hour = if hour == 12 { hour } else { hour - 12 };
            format!("PM {hour}:{minute:02}")
        } else {
            format!("AM {hour}:{minute:02}")
        }
    }
}

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("http status {0} ({1})")]
    Status(u16, String),
    #[error("invalid directions response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("directions response contained no routes")]
    EmptyRoutes,
    #[error("no route found (result code {0})")]
    NoRoute(i32),
}

#[async_trait]
pub trait RouteEstimator: Send + Sync + std::fmt::Debug {
    async fn estimate(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RouteEstimate, RoutingError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn minutes(minutes: u64) -> RouteEstimate {
        RouteEstimate {
            distance_m: 0.0,
            duration_secs: minutes * 60,
        }
    }

    #[test]
    fn distance_is_rounded_to_one_decimal_km() {
        let estimate = RouteEstimate {
            distance_m: 3_449.0,
            duration_secs: 0,
        };
        assert_eq!(estimate.distance_km(), 3.4);

        let estimate = RouteEstimate {
            distance_m: 3_460.0,
            duration_secs: 0,
        };
        assert_eq!(estimate.distance_km(), 3.5);
    }

    #[test]
    fn arrival_label_in_the_morning() {
        let label = minutes(12).arrival_label(datetime!(2026-01-11 09:30:00 UTC));
        assert_eq!(label, "AM 9:42");
    }

    #[test]
    fn arrival_label_rolls_minutes_into_hours() {
        let label = minutes(45).arrival_label(datetime!(2026-01-11 11:30:00 UTC));
        assert_eq!(label, "PM 12:15");
    }

    #[test]
    fn arrival_label_in_the_afternoon() {
        let label = minutes(5).arrival_label(datetime!(2026-01-11 15:02:00 UTC));
        assert_eq!(label, "PM 3:07");
    }

    #[test]
    fn arrival_label_past_midnight() {
        let label = minutes(20).arrival_label(datetime!(2026-01-11 23:50:00 UTC));
        assert_eq!(label, "AM 0:10");
    }

    #[test]
    fn partial_minutes_are_dropped() {
        let estimate = RouteEstimate {
            distance_m: 0.0,
            duration_secs: 119,
        };
        let label = estimate.arrival_label(datetime!(2026-01-11 10:00:00 UTC));
        assert_eq!(label, "AM 10:01");
    }
}
