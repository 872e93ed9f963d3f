//! Revenue HTTP handler

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Extension;

use super::dto::{RevenueParams, RevenueSummaryDto};
use crate::application::RevenueService;
use crate::domain::principal::Principal;
use crate::interfaces::http::common::{respond, ApiResponse, ApiResult};

#[derive(Clone)]
pub struct RevenueAppState {
    pub revenue: Arc<RevenueService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/revenue/summary",
    tag = "Revenue",
    security(("bearer_auth" = [])),
    params(RevenueParams),
    responses(
        (status = 200, description = "Revenue rollup for one host", body = ApiResponse<RevenueSummaryDto>),
        (status = 400, description = "from is after to"),
        (status = 403, description = "Revenue of another host"),
        (status = 422, description = "Admins must name a host")
    )
)]
pub async fn revenue_summary(
    State(state): State<RevenueAppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<RevenueParams>,
) -> ApiResult<RevenueSummaryDto> {
    respond(
        state
            .revenue
            .host_summary(
                &principal,
                params.host_id.as_deref(),
                params.from.as_deref(),
                params.to.as_deref(),
            )
            .await,
    )
}
