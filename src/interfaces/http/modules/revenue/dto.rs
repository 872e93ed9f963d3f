//! Revenue DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::revenue::{RevenueSummary, StatusCounts, VehicleRevenue};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RevenueParams {
    /// Required for admins; hosts may omit it
    pub host_id: Option<String>,
    /// Inclusive lower bound on pickup date
    pub from: Option<String>,
    /// Inclusive upper bound on pickup date
    pub to: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCountsDto {
    pub pending: usize,
    pub confirmed: usize,
    pub active: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub total: usize,
}

impl From<StatusCounts> for StatusCountsDto {
    fn from(c: StatusCounts) -> Self {
        Self {
            total: c.total(),
            pending: c.pending,
            confirmed: c.confirmed,
            active: c.active,
            completed: c.completed,
            cancelled: c.cancelled,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRevenueDto {
    pub vehicle_id: String,
    pub bookings: usize,
    #[schema(value_type = String)]
    pub revenue: Decimal,
    pub days_booked: i64,
}

impl From<VehicleRevenue> for VehicleRevenueDto {
    fn from(v: VehicleRevenue) -> Self {
        Self {
            vehicle_id: v.vehicle_id,
            bookings: v.bookings,
            revenue: v.revenue,
            days_booked: v.days_booked,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummaryDto {
    pub host_id: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub reservations: StatusCountsDto,
    /// Completed reservations
    #[schema(value_type = String, example = "1250.00")]
    pub gross_revenue: Decimal,
    /// Pending, confirmed and active reservations
    #[schema(value_type = String)]
    pub pipeline_revenue: Decimal,
    /// Reservations with settled payment
    #[schema(value_type = String)]
    pub paid_revenue: Decimal,
    pub completed_trips: usize,
    pub total_distance: u64,
    pub issues_reported: usize,
    pub vehicles: Vec<VehicleRevenueDto>,
}

impl From<RevenueSummary> for RevenueSummaryDto {
    fn from(s: RevenueSummary) -> Self {
        Self {
            host_id: s.host_id,
            from: s.from,
            to: s.to,
            reservations: s.reservations.into(),
            gross_revenue: s.gross_revenue,
            pipeline_revenue: s.pipeline_revenue,
            paid_revenue: s.paid_revenue,
            completed_trips: s.completed_trips,
            total_distance: s.total_distance,
            issues_reported: s.issues_reported,
            vehicles: s.vehicles.into_iter().map(Into::into).collect(),
        }
    }
}
