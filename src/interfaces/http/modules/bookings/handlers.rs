//! Availability handler

use axum::extract::{Query, State};

use super::dto::{AvailabilityParams, VehicleListingDto};
use crate::application::AvailabilityService;
use crate::interfaces::http::common::{respond_list, ApiResponse, ApiResult};

#[derive(Clone)]
pub struct BookingAppState {
    pub availability: AvailabilityService,
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/available",
    tag = "Bookings",
    params(AvailabilityParams),
    responses(
        (status = 200, description = "Vehicles free for the whole range", body = ApiResponse<Vec<VehicleListingDto>>),
        (status = 400, description = "Malformed or inverted date range")
    )
)]
pub async fn find_available(
    State(state): State<BookingAppState>,
    Query(params): Query<AvailabilityParams>,
) -> ApiResult<Vec<VehicleListingDto>> {
    respond_list(
        state
            .availability
            .find_available(
                &params.start_date,
                &params.end_date,
                params.location.as_deref(),
            )
            .await,
    )
}
