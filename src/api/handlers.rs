use crate::api::responses::{BedsResponse, ErrorCode, ErrorResponse, HealthResponse, HealthStatus};
use crate::beds::observation::Observation;
use crate::error::AppError;
use crate::hospital::HospitalId;
use crate::hospital::geo::{Bounds, Coordinates};
use crate::hospital::service::{HospitalDetail, HospitalPreview, MapMarker};
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{error, warn};

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
enum TimestampError {
    Format(time::error::Format),
}

impl fmt::Display for TimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampError::Format(err) => write!(f, "timestamp format error: {err}"),
        }
    }
}

/// User position sent with preview, list and detail requests.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OriginQuery {
    pub lat: f64,
    pub lon: f64,
}

impl From<OriginQuery> for Coordinates {
    fn from(query: OriginQuery) -> Self {
        Coordinates::new(query.lat, query.lon)
    }
}

pub enum ApiResponse<T> {
    Success(T),
    Created(T),
    Error {
        status: StatusCode,
        body: ErrorResponse,
    },
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            ApiResponse::Success(body) => (StatusCode::OK, Json(body)).into_response(),
            ApiResponse::Created(body) => (StatusCode::CREATED, Json(body)).into_response(),
            ApiResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

pub async fn get_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    build_health_response(&state, OffsetDateTime::now_utc())
}

pub async fn get_beds(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let now = state.hospitals().beds().now();
    build_beds_response(&state, &name, now)
}

/// Ingestion endpoint for the bed tracker.
pub async fn post_beds(
    State(state): State<Arc<AppState>>,
    observation: Result<Json<Observation>, JsonRejection>,
) -> impl IntoResponse {
    let Json(observation) = match observation {
        Ok(json) => json,
        Err(rejection) => {
            return invalid_request(rejection.status(), &rejection.body_text(), "/api/beds");
        }
    };
    record_observation(&state, observation)
}

pub async fn get_map(
    State(state): State<Arc<AppState>>,
    bounds: Result<Query<Bounds>, QueryRejection>,
) -> impl IntoResponse {
    match bounds {
        Ok(Query(bounds)) => ApiResponse::<Vec<MapMarker>>::Success(state.hospitals().map(&bounds)),
        Err(rejection) => query_rejected(&rejection, "/api/hospitals/map"),
    }
}

pub async fn get_list(
    State(state): State<Arc<AppState>>,
    origin: Result<Query<OriginQuery>, QueryRejection>,
) -> impl IntoResponse {
    let route = "/api/hospitals/list";
    let Query(origin) = match origin {
        Ok(query) => query,
        Err(rejection) => return query_rejected(&rejection, route),
    };
    let result = state.hospitals().list(origin.into()).await;
    into_api_response::<Vec<HospitalPreview>>(result, route)
}

pub async fn get_preview(
    State(state): State<Arc<AppState>>,
    id: Result<Path<HospitalId>, PathRejection>,
    origin: Result<Query<OriginQuery>, QueryRejection>,
) -> impl IntoResponse {
    let route = "/api/hospitals/preview";
    let (id, origin) = match id_and_origin(id, origin) {
        Ok(values) => values,
        Err(message) => return invalid_request(StatusCode::BAD_REQUEST, &message, route),
    };
    let result = state.hospitals().preview(id, origin.into()).await;
    into_api_response::<HospitalPreview>(result, route)
}

pub async fn get_details(
    State(state): State<Arc<AppState>>,
    id: Result<Path<HospitalId>, PathRejection>,
    origin: Result<Query<OriginQuery>, QueryRejection>,
) -> impl IntoResponse {
    let route = "/api/hospitals/details";
    let (id, origin) = match id_and_origin(id, origin) {
        Ok(values) => values,
        Err(message) => return invalid_request(StatusCode::BAD_REQUEST, &message, route),
    };
    let result = state.hospitals().detail(id, origin.into()).await;
    into_api_response::<HospitalDetail>(result, route)
}

fn id_and_origin(
    id: Result<Path<HospitalId>, PathRejection>,
    origin: Result<Query<OriginQuery>, QueryRejection>,
) -> Result<(HospitalId, OriginQuery), String> {
    let Path(id) = id.map_err(|rejection| rejection.body_text())?;
    let Query(origin) = origin.map_err(|rejection| rejection.body_text())?;
    Ok((id, origin))
}

fn record_observation(state: &AppState, observation: Observation) -> ApiResponse<Observation> {
    match state.hospitals().beds().record(observation.clone()) {
        Ok(()) => ApiResponse::Created(observation),
        Err(err) => error_response(&err, "/api/beds"),
    }
}

fn build_health_response(state: &AppState, now: OffsetDateTime) -> ApiResponse<HealthResponse> {
    let formatted = format_timestamp(state.started_at())
        .and_then(|started_at| Ok((started_at, format_timestamp(now)?)));
    let (started_at, timestamp) = match formatted {
        Ok(pair) => pair,
        Err(_err) => return internal_error("timestamp formatting failure", "/api/health"),
    };

    ApiResponse::Success(HealthResponse {
        status: HealthStatus::Ok,
        started_at,
        timestamp,
    })
}

fn build_beds_response(
    state: &AppState,
    hospital_name: &str,
    now: OffsetDateTime,
) -> ApiResponse<BedsResponse> {
    let beds = state.hospitals().beds();
    let result = beds.current_count_at(hospital_name, now).and_then(|current_count| {
        let history = beds.recent_history_at(hospital_name, now)?;
        Ok((current_count.max(0), history))
    });

    let (current_count, history) = match result {
        Ok(values) => values,
        Err(err) => return error_response(&err, "/api/beds"),
    };

    match format_timestamp(now) {
        Ok(timestamp) => ApiResponse::Success(BedsResponse {
            hospital_name: hospital_name.to_string(),
            current_count,
            history,
            timestamp,
        }),
        Err(_err) => internal_error("timestamp formatting failure", "/api/beds"),
    }
}

fn into_api_response<T>(result: Result<T, AppError>, route: &str) -> ApiResponse<T> {
    match result {
        Ok(body) => ApiResponse::Success(body),
        Err(err) => error_response(&err, route),
    }
}

fn error_response<T>(err: &AppError, route: &str) -> ApiResponse<T> {
    let (status, error_code) = match err {
        AppError::HospitalNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::HospitalNotFound),
        AppError::MissingLocation(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::MissingLocation)
        }
        AppError::Routing(_) => (StatusCode::BAD_GATEWAY, ErrorCode::RoutingUnavailable),
        AppError::StoreLock => return internal_error(&err.to_string(), route),
    };
    warn!(route = route, error = %err, "Request failed");

    let timestamp = now_timestamp();
    ApiResponse::Error {
        status,
        body: ErrorResponse {
            error_code,
            error_message: err.to_string(),
            timestamp,
        },
    }
}

fn query_rejected<T>(rejection: &QueryRejection, route: &str) -> ApiResponse<T> {
    invalid_request(StatusCode::BAD_REQUEST, &rejection.body_text(), route)
}

fn invalid_request<T>(status: StatusCode, message: &str, route: &str) -> ApiResponse<T> {
    warn!(route = route, status = status.as_u16(), message = message, "Rejected request");
    ApiResponse::Error {
        status,
        body: ErrorResponse {
            error_code: ErrorCode::InvalidRequest,
            error_message: message.to_string(),
            timestamp: now_timestamp(),
        },
    }
}

fn internal_error<T>(message: &str, route: &str) -> ApiResponse<T> {
    error!(message = message, route = route, "Internal error while handling request");
    ApiResponse::Error {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: ErrorResponse {
            error_code: ErrorCode::InternalError,
            error_message: INTERNAL_ERROR_MESSAGE.to_string(),
            timestamp: now_timestamp(),
        },
    }
}

fn now_timestamp() -> String {
    format_timestamp(OffsetDateTime::now_utc()).unwrap_or_else(|err| {
        error!(error = %err, "Failed to format error timestamp");
        "1970-01-01T00:00:00Z".to_string()
    })
}

fn format_timestamp(timestamp: OffsetDateTime) -> Result<String, TimestampError> {
    timestamp.format(&Rfc3339).map_err(TimestampError::Format)
}
