//! Vehicle DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::services::NewVehicle;
use crate::domain::vehicle::{Vehicle, VehicleStatus};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterVehicleRequest {
    #[validate(length(min = 1, max = 100))]
    pub make: String,
    #[validate(length(min = 1, max = 100))]
    pub model: String,
    #[validate(range(min = 1900, max = 2100))]
    pub year: u16,
    #[validate(length(min = 1, max = 17, message = "vin must be at most 17 characters"))]
    pub vin: String,
    #[schema(value_type = String, example = "45.00")]
    pub daily_rate: Decimal,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    /// Register as `pending` instead of immediately `available`
    #[serde(default)]
    pub pending: bool,
}

impl From<RegisterVehicleRequest> for NewVehicle {
    fn from(r: RegisterVehicleRequest) -> Self {
        Self {
            make: r.make,
            model: r.model,
            year: r.year,
            vin: r.vin,
            daily_rate: r.daily_rate,
            location: r.location,
            pending: r.pending,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetVehicleStatusRequest {
    /// available, maintenance or inactive
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRateRequest {
    #[schema(value_type = String, example = "60.00")]
    pub daily_rate: Decimal,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct VehicleListParams {
    /// Admins only: restrict to one host
    pub host_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDto {
    pub id: String,
    pub host_id: String,
    pub make: String,
    pub model: String,
    pub year: u16,
    pub vin: String,
    #[schema(value_type = String, example = "45.00")]
    pub daily_rate: Decimal,
    pub location: String,
    #[schema(value_type = String, example = "available")]
    pub status: VehicleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleDto {
    fn from(v: Vehicle) -> Self {
        Self {
            id: v.id,
            host_id: v.host_id,
            make: v.make,
            model: v.model,
            year: v.year,
            vin: v.vin,
            daily_rate: v.daily_rate,
            location: v.location,
            status: v.status,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}
