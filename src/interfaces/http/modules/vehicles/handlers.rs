//! Vehicle HTTP handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};

use super::dto::*;
use crate::application::VehicleService;
use crate::domain::principal::Principal;
use crate::domain::vehicle::VehicleStatus;
use crate::interfaces::http::common::{
    respond, respond_list, ApiResponse, ApiResult, ValidatedJson,
};
use crate::shared::errors::DomainError;

#[derive(Clone)]
pub struct VehicleAppState {
    pub vehicles: Arc<VehicleService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    params(VehicleListParams),
    responses(
        (status = 200, description = "Own vehicles (hosts) or all vehicles (admins)", body = ApiResponse<Vec<VehicleDto>>),
        (status = 403, description = "Host or admin role required")
    )
)]
pub async fn list_vehicles(
    State(state): State<VehicleAppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<VehicleListParams>,
) -> ApiResult<Vec<VehicleDto>> {
    respond_list(
        state
            .vehicles
            .list(&principal, params.host_id.as_deref())
            .await,
    )
}

#[utoipa::path(
    post,
    path = "/api/v1/vehicles",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    request_body = RegisterVehicleRequest,
    responses(
        (status = 200, description = "Vehicle registered", body = ApiResponse<VehicleDto>),
        (status = 403, description = "Only hosts register vehicles"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn register_vehicle(
    State(state): State<VehicleAppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(request): ValidatedJson<RegisterVehicleRequest>,
) -> ApiResult<VehicleDto> {
    respond(state.vehicles.register(&principal, request.into()).await)
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles/{id}",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle", body = ApiResponse<VehicleDto>),
        (status = 403, description = "Vehicle belongs to another host"),
        (status = 404, description = "Vehicle not found")
    )
)]
pub async fn get_vehicle(
    State(state): State<VehicleAppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<VehicleDto> {
    respond(state.vehicles.get(&principal, &id).await)
}

#[utoipa::path(
    put,
    path = "/api/v1/vehicles/{id}/status",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Vehicle ID")),
    request_body = SetVehicleStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<VehicleDto>),
        (status = 409, description = "Vehicle is out on a rental"),
        (status = 422, description = "Status cannot be set directly")
    )
)]
pub async fn set_vehicle_status(
    State(state): State<VehicleAppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(request): Json<SetVehicleStatusRequest>,
) -> ApiResult<VehicleDto> {
    let status = VehicleStatus::parse(&request.status).ok_or_else(|| {
        DomainError::Validation(format!("unknown vehicle status '{}'", request.status))
    })?;
    respond(state.vehicles.set_status(&principal, &id, status).await)
}

#[utoipa::path(
    put,
    path = "/api/v1/vehicles/{id}/rate",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Vehicle ID")),
    request_body = UpdateRateRequest,
    responses(
        (status = 200, description = "Rate updated; existing reservations keep their price", body = ApiResponse<VehicleDto>),
        (status = 422, description = "Rate must be positive")
    )
)]
pub async fn update_vehicle_rate(
    State(state): State<VehicleAppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(request): Json<UpdateRateRequest>,
) -> ApiResult<VehicleDto> {
    respond(
        state
            .vehicles
            .update_rate(&principal, &id, request.daily_rate)
            .await,
    )
}
