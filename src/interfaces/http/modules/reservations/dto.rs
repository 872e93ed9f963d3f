//! Reservation DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::services::{NewReservation, ReservationDetails};
use crate::domain::reservation::{
    ContactInfo, PaymentStatus, Reservation, ReservationStatus, StatusChange,
};

/// Request to book a vehicle
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    #[validate(length(min = 1, message = "vehicleId is required"))]
    pub vehicle_id: String,
    /// YYYY-MM-DD or RFC 3339
    #[validate(length(min = 1, message = "pickupDate is required"))]
    pub pickup_date: String,
    /// YYYY-MM-DD or RFC 3339
    #[validate(length(min = 1, message = "returnDate is required"))]
    pub return_date: String,
    #[validate(length(min = 1, max = 200, message = "driverName is required"))]
    pub driver_name: String,
    #[validate(email(message = "driverEmail must be an email address"))]
    pub driver_email: String,
    #[validate(length(max = 40))]
    pub driver_phone: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl From<CreateReservationRequest> for NewReservation {
    fn from(r: CreateReservationRequest) -> Self {
        Self {
            vehicle_id: r.vehicle_id,
            pickup_date: r.pickup_date,
            return_date: r.return_date,
            contact: ContactInfo {
                driver_name: r.driver_name,
                driver_email: r.driver_email,
                driver_phone: r.driver_phone,
            },
            notes: r.notes.filter(|n| !n.trim().is_empty()),
        }
    }
}

/// Detail edits and/or a status move. Omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationRequest {
    /// Target status: confirmed, active, completed or cancelled
    pub status: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub driver_name: Option<String>,
    #[validate(email)]
    pub driver_email: Option<String>,
    #[validate(length(max = 40))]
    pub driver_phone: Option<String>,
}

impl UpdateReservationRequest {
    pub fn details(&self) -> ReservationDetails {
        ReservationDetails {
            notes: self.notes.clone(),
            driver_name: self.driver_name.clone(),
            driver_email: self.driver_email.clone(),
            driver_phone: self.driver_phone.clone(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    #[schema(value_type = String, example = "paid")]
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ReservationListParams {
    pub status: Option<String>,
    pub vehicle_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeDto {
    #[schema(value_type = String)]
    pub from: ReservationStatus,
    #[schema(value_type = String)]
    pub to: ReservationStatus,
    pub at: DateTime<Utc>,
}

impl From<StatusChange> for StatusChangeDto {
    fn from(c: StatusChange) -> Self {
        Self {
            from: c.from,
            to: c.to,
            at: c.at,
        }
    }
}

/// Reservation details in API responses
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDto {
    pub id: String,
    pub vehicle_id: String,
    pub driver_id: String,
    pub host_id: String,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    #[schema(value_type = String, example = "50.00")]
    pub daily_rate: Decimal,
    pub number_of_days: i64,
    #[schema(value_type = String, example = "100.00")]
    pub total_amount: Decimal,
    #[schema(value_type = String, example = "pending")]
    pub status: ReservationStatus,
    #[schema(value_type = String, example = "pending")]
    pub payment_status: PaymentStatus,
    pub driver_name: String,
    pub driver_email: String,
    pub driver_phone: Option<String>,
    pub notes: Option<String>,
    pub status_history: Vec<StatusChangeDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationDto {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            vehicle_id: r.vehicle_id,
            driver_id: r.driver_id,
            host_id: r.host_id,
            pickup_date: r.pickup_date,
            return_date: r.return_date,
            daily_rate: r.daily_rate,
            number_of_days: r.number_of_days,
            total_amount: r.total_amount,
            status: r.status,
            payment_status: r.payment_status,
            driver_name: r.contact.driver_name,
            driver_email: r.contact.driver_email,
            driver_phone: r.contact.driver_phone,
            notes: r.notes,
            status_history: r.status_history.into_iter().map(Into::into).collect(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
