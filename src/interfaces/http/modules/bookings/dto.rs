//! Availability DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::vehicle::{VehicleListing, VehicleStatus};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityParams {
    /// First day of the rental (YYYY-MM-DD or RFC 3339)
    pub start_date: String,
    /// Return day (YYYY-MM-DD or RFC 3339)
    pub end_date: String,
    /// Case-insensitive location substring
    pub location: Option<String>,
}

/// Vehicle as shown to anonymous searchers
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleListingDto {
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: u16,
    #[schema(value_type = String, example = "45.00")]
    pub daily_rate: Decimal,
    pub location: String,
    #[schema(value_type = String, example = "available")]
    pub status: VehicleStatus,
}

impl From<VehicleListing> for VehicleListingDto {
    fn from(v: VehicleListing) -> Self {
        Self {
            id: v.id,
            make: v.make,
            model: v.model,
            year: v.year,
            daily_rate: v.daily_rate,
            location: v.location,
            status: v.status,
        }
    }
}
