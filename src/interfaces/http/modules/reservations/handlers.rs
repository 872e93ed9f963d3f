//! Reservation HTTP handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};

use super::dto::*;
use crate::application::services::ReservationFilter;
use crate::application::ReservationService;
use crate::domain::principal::Principal;
use crate::domain::reservation::{Reservation, ReservationStatus};
use crate::interfaces::http::common::{
    respond, respond_list, ApiResponse, ApiResult, ValidatedJson,
};
use crate::shared::errors::{DomainError, DomainResult};

/// Application state for reservation handlers.
#[derive(Clone)]
pub struct ReservationAppState {
    pub reservations: Arc<ReservationService>,
}

fn parse_status(raw: &str) -> DomainResult<ReservationStatus> {
    ReservationStatus::parse(raw)
        .ok_or_else(|| DomainError::Validation(format!("unknown reservation status '{}'", raw)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(ReservationListParams),
    responses(
        (status = 200, description = "Reservations visible to the caller", body = ApiResponse<Vec<ReservationDto>>),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_reservations(
    State(state): State<ReservationAppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<ReservationListParams>,
) -> ApiResult<Vec<ReservationDto>> {
    let status = params.status.as_deref().map(parse_status).transpose()?;
    let filter = ReservationFilter {
        vehicle_id: params.vehicle_id,
        status,
        ..Default::default()
    };
    respond_list(state.reservations.list(&principal, filter).await)
}

#[utoipa::path(
    post,
    path = "/api/v1/reservations",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    request_body = CreateReservationRequest,
    responses(
        (status = 200, description = "Reservation created", body = ApiResponse<ReservationDto>),
        (status = 400, description = "Invalid date range"),
        (status = 403, description = "Caller is not a driver"),
        (status = 404, description = "Vehicle not found"),
        (status = 409, description = "Vehicle unavailable for the range"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_reservation(
    State(state): State<ReservationAppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(request): ValidatedJson<CreateReservationRequest>,
) -> ApiResult<ReservationDto> {
    respond(state.reservations.create(&principal, request.into()).await)
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/{id}",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation", body = ApiResponse<ReservationDto>),
        (status = 403, description = "Not a party to this reservation"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn get_reservation(
    State(state): State<ReservationAppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<ReservationDto> {
    respond(state.reservations.get(&principal, &id).await)
}

async fn apply_update(
    reservations: &ReservationService,
    principal: &Principal,
    id: &str,
    request: UpdateReservationRequest,
) -> DomainResult<Reservation> {
    let target = request.status.as_deref().map(parse_status).transpose()?;
    reservations
        .update(principal, id, request.details(), target)
        .await
}

#[utoipa::path(
    put,
    path = "/api/v1/reservations/{id}",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Reservation ID")),
    request_body = UpdateReservationRequest,
    responses(
        (status = 200, description = "Updated reservation", body = ApiResponse<ReservationDto>),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Status move not allowed"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_reservation(
    State(state): State<ReservationAppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateReservationRequest>,
) -> ApiResult<ReservationDto> {
    respond(apply_update(&state.reservations, &principal, &id, request).await)
}

#[utoipa::path(
    delete,
    path = "/api/v1/reservations/{id}",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Cancelled reservation", body = ApiResponse<ReservationDto>),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Reservation can no longer be cancelled")
    )
)]
pub async fn cancel_reservation(
    State(state): State<ReservationAppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<ReservationDto> {
    respond(state.reservations.cancel(&principal, &id).await)
}

#[utoipa::path(
    post,
    path = "/api/v1/reservations/{id}/payment",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Reservation ID")),
    request_body = RecordPaymentRequest,
    responses(
        (status = 200, description = "Payment status recorded", body = ApiResponse<ReservationDto>),
        (status = 403, description = "Host or admin role required"),
        (status = 409, description = "Payment status move not allowed")
    )
)]
pub async fn record_payment(
    State(state): State<ReservationAppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(request): Json<RecordPaymentRequest>,
) -> ApiResult<ReservationDto> {
    respond(
        state
            .reservations
            .record_payment(&principal, &id, request.payment_status)
            .await,
    )
}
