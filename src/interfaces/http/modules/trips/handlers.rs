//! Trip HTTP handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Extension;

use super::dto::*;
use crate::application::services::TripFilter;
use crate::application::TripService;
use crate::domain::principal::Principal;
use crate::domain::trip::TripStatus;
use crate::interfaces::http::common::{
    respond, respond_list, ApiResponse, ApiResult, ValidatedJson,
};
use crate::shared::errors::DomainError;

#[derive(Clone)]
pub struct TripAppState {
    pub trips: Arc<TripService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/trips",
    tag = "Trips",
    security(("bearer_auth" = [])),
    request_body = OpenTripRequest,
    responses(
        (status = 200, description = "Scheduled trip", body = ApiResponse<TripDto>),
        (status = 403, description = "Host or admin role required"),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Reservation not confirmed, or trip already exists")
    )
)]
pub async fn open_trip(
    State(state): State<TripAppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(request): ValidatedJson<OpenTripRequest>,
) -> ApiResult<TripDto> {
    respond(state.trips.open(&principal, &request.booking_id).await)
}

#[utoipa::path(
    get,
    path = "/api/v1/trips",
    tag = "Trips",
    security(("bearer_auth" = [])),
    params(TripListParams),
    responses(
        (status = 200, description = "Trips visible to the caller", body = ApiResponse<Vec<TripDto>>)
    )
)]
pub async fn list_trips(
    State(state): State<TripAppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<TripListParams>,
) -> ApiResult<Vec<TripDto>> {
    let status = match params.status.as_deref() {
        Some(raw) => Some(TripStatus::parse(raw).ok_or_else(|| {
            DomainError::Validation(format!("unknown trip status '{}'", raw))
        })?),
        None => None,
    };
    let filter = TripFilter {
        driver_id: params.driver_id,
        host_id: params.host_id,
        status,
    };
    respond_list(state.trips.list(&principal, filter).await)
}

#[utoipa::path(
    get,
    path = "/api/v1/trips/active",
    tag = "Trips",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Trips currently on the road", body = ApiResponse<Vec<TripDto>>)
    )
)]
pub async fn list_active_trips(
    State(state): State<TripAppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Vec<TripDto>> {
    respond_list(state.trips.get_active(&principal).await)
}

#[utoipa::path(
    get,
    path = "/api/v1/trips/{id}",
    tag = "Trips",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Trip ID")),
    responses(
        (status = 200, description = "Trip", body = ApiResponse<TripDto>),
        (status = 403, description = "Not a party to this trip"),
        (status = 404, description = "Trip not found")
    )
)]
pub async fn get_trip(
    State(state): State<TripAppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<TripDto> {
    respond(state.trips.get(&principal, &id).await)
}

#[utoipa::path(
    post,
    path = "/api/v1/trips/{id}/start",
    tag = "Trips",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Trip ID")),
    request_body = StartTripRequest,
    responses(
        (status = 200, description = "Trip started", body = ApiResponse<TripDto>),
        (status = 409, description = "Trip is not scheduled")
    )
)]
pub async fn start_trip(
    State(state): State<TripAppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<StartTripRequest>,
) -> ApiResult<TripDto> {
    respond(state.trips.start(&principal, &id, request.into()).await)
}

#[utoipa::path(
    post,
    path = "/api/v1/trips/{id}/complete",
    tag = "Trips",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Trip ID")),
    request_body = CompleteTripRequest,
    responses(
        (status = 200, description = "Trip completed", body = ApiResponse<TripDto>),
        (status = 409, description = "Trip is not active"),
        (status = 422, description = "Return mileage below pickup mileage")
    )
)]
pub async fn complete_trip(
    State(state): State<TripAppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<CompleteTripRequest>,
) -> ApiResult<TripDto> {
    respond(state.trips.complete(&principal, &id, request.into()).await)
}

#[utoipa::path(
    post,
    path = "/api/v1/trips/{id}/cancel",
    tag = "Trips",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Trip ID")),
    responses(
        (status = 200, description = "Trip cancelled", body = ApiResponse<TripDto>),
        (status = 409, description = "Trip already started")
    )
)]
pub async fn cancel_trip(
    State(state): State<TripAppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<TripDto> {
    respond(state.trips.cancel(&principal, &id).await)
}

#[utoipa::path(
    post,
    path = "/api/v1/trips/{id}/issues",
    tag = "Trips",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Trip ID")),
    request_body = ReportIssueRequest,
    responses(
        (status = 200, description = "Issue recorded", body = ApiResponse<TripDto>),
        (status = 422, description = "Trip is not active or description is empty")
    )
)]
pub async fn report_issue(
    State(state): State<TripAppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<ReportIssueRequest>,
) -> ApiResult<TripDto> {
    respond(
        state
            .trips
            .report_issue(&principal, &id, request.description)
            .await,
    )
}
