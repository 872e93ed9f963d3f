//! Trip DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::trip::{PickupReport, ReturnReport, Trip, TripIssue, TripStatus};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenTripRequest {
    /// Reservation the trip executes
    #[validate(length(min = 1, message = "bookingId is required"))]
    pub booking_id: String,
}

/// Readings taken when the driver collects the vehicle
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartTripRequest {
    pub mileage: Option<u32>,
    #[validate(range(max = 100, message = "fuelLevel must be between 0 and 100"))]
    pub fuel_level: Option<u8>,
    #[validate(length(max = 2000))]
    pub condition: Option<String>,
}

impl From<StartTripRequest> for PickupReport {
    fn from(r: StartTripRequest) -> Self {
        Self {
            mileage: r.mileage,
            fuel_level: r.fuel_level,
            condition: r.condition,
        }
    }
}

/// Readings taken when the vehicle comes back
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTripRequest {
    pub mileage: Option<u32>,
    #[validate(range(max = 100, message = "fuelLevel must be between 0 and 100"))]
    pub fuel_level: Option<u8>,
    #[validate(length(max = 2000))]
    pub condition: Option<String>,
    #[serde(default)]
    pub issues: Vec<String>,
}

impl From<CompleteTripRequest> for ReturnReport {
    fn from(r: CompleteTripRequest) -> Self {
        Self {
            mileage: r.mileage,
            fuel_level: r.fuel_level,
            condition: r.condition,
            issues: r.issues,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReportIssueRequest {
    #[validate(length(min = 1, max = 2000, message = "description is required"))]
    pub description: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TripListParams {
    pub driver_id: Option<String>,
    pub host_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TripIssueDto {
    pub description: String,
    pub reported_at: DateTime<Utc>,
}

impl From<TripIssue> for TripIssueDto {
    fn from(i: TripIssue) -> Self {
        Self {
            description: i.description,
            reported_at: i.reported_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TripDto {
    pub id: String,
    pub booking_id: String,
    pub driver_id: String,
    pub vehicle_id: String,
    pub host_id: String,
    #[schema(value_type = String, example = "scheduled")]
    pub status: TripStatus,
    pub pickup_time: Option<DateTime<Utc>>,
    pub return_time: Option<DateTime<Utc>>,
    pub mileage_start: Option<u32>,
    pub mileage_end: Option<u32>,
    /// Present when both odometer readings exist and are consistent
    pub distance: Option<u32>,
    pub fuel_level_start: Option<u8>,
    pub fuel_level_end: Option<u8>,
    pub condition_start: Option<String>,
    pub condition_end: Option<String>,
    pub issues: Vec<TripIssueDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Trip> for TripDto {
    fn from(t: Trip) -> Self {
        Self {
            distance: t.distance(),
            id: t.id,
            booking_id: t.booking_id,
            driver_id: t.driver_id,
            vehicle_id: t.vehicle_id,
            host_id: t.host_id,
            status: t.status,
            pickup_time: t.pickup_time,
            return_time: t.return_time,
            mileage_start: t.mileage_start,
            mileage_end: t.mileage_end,
            fuel_level_start: t.fuel_level_start,
            fuel_level_end: t.fuel_level_end,
            condition_start: t.condition_start,
            condition_end: t.condition_end,
            issues: t.issues.into_iter().map(Into::into).collect(),
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}
