//! Profile HTTP handlers
//!
//! Updates take a partial JSON object; fields the caller may not change are
//! rejected by the service.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde_json::Value;

use super::dto::*;
use crate::application::ProfileService;
use crate::domain::principal::Principal;
use crate::interfaces::http::common::{
    respond, respond_list, ApiResponse, ApiResult, ValidatedJson,
};

#[derive(Clone)]
pub struct ProfileAppState {
    pub profiles: Arc<ProfileService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/hosts",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Visible host profiles", body = ApiResponse<Vec<HostDto>>))
)]
pub async fn list_hosts(
    State(state): State<ProfileAppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Vec<HostDto>> {
    respond_list(state.profiles.list_hosts(&principal).await)
}

#[utoipa::path(
    post,
    path = "/api/v1/hosts",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    request_body = CreateHostRequest,
    responses(
        (status = 200, description = "Host profile created", body = ApiResponse<HostDto>),
        (status = 409, description = "Caller already has a host profile")
    )
)]
pub async fn create_host(
    State(state): State<ProfileAppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(request): ValidatedJson<CreateHostRequest>,
) -> ApiResult<HostDto> {
    respond(state.profiles.create_host(&principal, request.into()).await)
}

#[utoipa::path(
    get,
    path = "/api/v1/hosts/{id}",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Host ID")),
    responses(
        (status = 200, description = "Host profile", body = ApiResponse<HostDto>),
        (status = 404, description = "Host not found")
    )
)]
pub async fn get_host(
    State(state): State<ProfileAppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<HostDto> {
    respond(state.profiles.get_host(&principal, &id).await)
}

#[utoipa::path(
    put,
    path = "/api/v1/hosts/{id}",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Host ID")),
    request_body(content = Object, description = "Partial host fields"),
    responses(
        (status = 200, description = "Updated host profile", body = ApiResponse<HostDto>),
        (status = 422, description = "Patch touches a locked field")
    )
)]
pub async fn update_host(
    State(state): State<ProfileAppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> ApiResult<HostDto> {
    respond(state.profiles.update_host(&principal, &id, patch).await)
}

#[utoipa::path(
    get,
    path = "/api/v1/drivers",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Visible driver profiles", body = ApiResponse<Vec<DriverDto>>))
)]
pub async fn list_drivers(
    State(state): State<ProfileAppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Vec<DriverDto>> {
    respond_list(state.profiles.list_drivers(&principal).await)
}

#[utoipa::path(
    post,
    path = "/api/v1/drivers",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    request_body = CreateDriverRequest,
    responses(
        (status = 200, description = "Driver profile created", body = ApiResponse<DriverDto>),
        (status = 409, description = "Caller already has a driver profile")
    )
)]
pub async fn create_driver(
    State(state): State<ProfileAppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(request): ValidatedJson<CreateDriverRequest>,
) -> ApiResult<DriverDto> {
    respond(state.profiles.create_driver(&principal, request.into()).await)
}

#[utoipa::path(
    get,
    path = "/api/v1/drivers/{id}",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Driver ID")),
    responses(
        (status = 200, description = "Driver profile", body = ApiResponse<DriverDto>),
        (status = 404, description = "Driver not found")
    )
)]
pub async fn get_driver(
    State(state): State<ProfileAppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<DriverDto> {
    respond(state.profiles.get_driver(&principal, &id).await)
}

#[utoipa::path(
    put,
    path = "/api/v1/drivers/{id}",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Driver ID")),
    request_body(content = Object, description = "Partial driver fields"),
    responses(
        (status = 200, description = "Updated driver profile", body = ApiResponse<DriverDto>),
        (status = 422, description = "Patch touches a locked or admin-only field")
    )
)]
pub async fn update_driver(
    State(state): State<ProfileAppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> ApiResult<DriverDto> {
    respond(state.profiles.update_driver(&principal, &id, patch).await)
}
