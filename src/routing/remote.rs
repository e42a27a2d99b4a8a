use crate::hospital::geo::Coordinates;
use crate::routing::{RouteEstimate, RouteEstimator, RoutingError};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Car directions API client (Kakao Mobility request/response shape).
pub struct RemoteRouteEstimator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    fallback: Option<Box<dyn RouteEstimator>>,
}

impl RemoteRouteEstimator {
    pub fn new(
        endpoint: String,
        api_key: String,
        timeout: Duration,
        fallback: Option<Box<dyn RouteEstimator>>,
    ) -> Result<Self, RoutingError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            fallback,
        })
    }

    async fn call_remote(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RouteEstimate, RoutingError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("KakaoAK {}", self.api_key))
            .query(&[
                ("origin", lon_lat(origin)),
                ("destination", lon_lat(destination)),
                ("priority", "RECOMMEND".to_string()),
                ("car_fuel", "GASOLINE".to_string()),
                ("car_hipass", "false".to_string()),
                ("alternatives", "false".to_string()),
                ("road_details", "false".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        route_from_response(status, &body)
    }
}

impl fmt::Debug for RemoteRouteEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteRouteEstimator")
            .field("endpoint", &self.endpoint)
            .field("has_api_key", &!self.api_key.is_empty())
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

#[async_trait]
impl RouteEstimator for RemoteRouteEstimator {
    async fn estimate(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RouteEstimate, RoutingError> {
        match self.call_remote(origin, destination).await {
            Ok(estimate) => Ok(estimate),
            Err(err) => {
                warn!(error = %err, "Directions API call failed");
                match self.fallback.as_ref() {
                    Some(fallback) => {
                        warn!("Falling back to local route estimate");
                        fallback.estimate(origin, destination).await
                    }
                    None => Err(err),
                }
            }
        }
    }
}

fn lon_lat(point: Coordinates) -> String {
    format!("{},{}", point.longitude, point.latitude)
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    #[serde(default)]
    result_code: i32,
    summary: Option<RouteSummary>,
}

#[derive(Debug, Deserialize)]
struct RouteSummary {
    distance: u64,
    duration: u64,
}

/// Turn a directions API reply into an estimate. Non-2xx replies keep their body
/// for the error message.
fn route_from_response(status: StatusCode, body: &str) -> Result<RouteEstimate, RoutingError> {
    if !status.is_success() {
        return Err(RoutingError::Status(status.as_u16(), body.trim().to_string()));
    }
    let directions: DirectionsResponse = serde_json::from_str(body)?;
    route_from_directions(directions)
}

fn route_from_directions(directions: DirectionsResponse) -> Result<RouteEstimate, RoutingError> {
    let route = directions
        .routes
        .into_iter()
        .next()
        .ok_or(RoutingError::EmptyRoutes)?;
    let summary = route.summary.ok_or(RoutingError::NoRoute(route.result_code))?;

    Ok(RouteEstimate {
        distance_m: summary.distance as f64,
        duration_secs: summary.duration,
    })
}
