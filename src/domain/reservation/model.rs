//! Reservation domain entity

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::period::BookingPeriod;
use crate::domain::record::impl_record;
use crate::shared::errors::{DomainError, DomainResult};

/// Reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Requested by the driver, awaiting host confirmation
    Pending,
    /// Accepted by the host; a trip gets opened
    Confirmed,
    /// Vehicle picked up
    Active,
    /// Vehicle returned
    Completed,
    /// Withdrawn before pickup
    Cancelled,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 5] = [
        Self::Pending,
        Self::Confirmed,
        Self::Active,
        Self::Completed,
        Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn can_transition_to(&self, target: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, target),
            (Pending, Confirmed)
                | (Confirmed, Active)
                | (Active, Completed)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether a reservation in this status holds its calendar slot
    pub fn blocks_calendar(&self) -> bool {
        *self != Self::Cancelled
    }

    /// Confirmed or later, excluding cancellation
    pub fn is_confirmed_or_later(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Active | Self::Completed)
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
        }
    }

    pub fn can_transition_to(&self, target: PaymentStatus) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Paid) | (Self::Paid, Self::Refunded)
        )
    }
}

/// One recorded status move
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub from: ReservationStatus,
    pub to: ReservationStatus,
    pub at: DateTime<Utc>,
}

/// Driver contact details captured with the booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub driver_name: String,
    pub driver_email: String,
    #[serde(default)]
    pub driver_phone: Option<String>,
}

/// A driver's claim on a vehicle for a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub vehicle_id: String,
    pub driver_id: String,
    pub host_id: String,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    /// Vehicle rate at booking time
    pub daily_rate: Decimal,
    pub number_of_days: i64,
    pub total_amount: Decimal,
    pub status: ReservationStatus,
    pub payment_status: PaymentStatus,
    #[serde(flatten)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status_history: Vec<StatusChange>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_record!(Reservation, "reservations", "res");

impl Reservation {
    /// Build a pending reservation priced from the given rate snapshot.
    pub fn new(
        vehicle_id: impl Into<String>,
        driver_id: impl Into<String>,
        host_id: impl Into<String>,
        period: BookingPeriod,
        daily_rate: Decimal,
        contact: ContactInfo,
    ) -> Self {
        let now = Utc::now();
        let number_of_days = period.days();
        Self {
            id: String::new(),
            vehicle_id: vehicle_id.into(),
            driver_id: driver_id.into(),
            host_id: host_id.into(),
            pickup_date: period.start,
            return_date: period.end,
            daily_rate,
            number_of_days,
            total_amount: daily_rate * Decimal::from(number_of_days),
            status: ReservationStatus::Pending,
            payment_status: PaymentStatus::Pending,
            contact,
            notes: None,
            status_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn period(&self) -> BookingPeriod {
        BookingPeriod {
            start: self.pickup_date,
            end: self.return_date,
        }
    }

    /// Whether this reservation holds a slot that collides with `period`
    pub fn conflicts_with(&self, period: &BookingPeriod) -> bool {
        self.status.blocks_calendar() && self.period().overlaps(period)
    }

    /// Move to `target`, recording the change. Fails without mutating on an
    /// illegal move.
    pub fn transition(&mut self, target: ReservationStatus, at: DateTime<Utc>) -> DomainResult<()> {
        if !self.status.can_transition_to(target) {
            return Err(DomainError::InvalidTransition {
                entity: "Reservation",
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }
        self.status_history.push(StatusChange {
            from: self.status,
            to: target,
            at,
        });
        self.status = target;
        if target == ReservationStatus::Cancelled && self.payment_status == PaymentStatus::Paid {
            self.payment_status = PaymentStatus::Refunded;
        }
        Ok(())
    }

    pub fn set_payment_status(&mut self, target: PaymentStatus) -> DomainResult<()> {
        if !self.payment_status.can_transition_to(target) {
            return Err(DomainError::InvalidTransition {
                entity: "Payment",
                from: self.payment_status.as_str().to_string(),
                to: target.as_str().to_string(),
            });
        }
        self.payment_status = target;
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn period(a: &str, b: &str) -> BookingPeriod {
        BookingPeriod::parse(a, b).unwrap()
    }

    fn contact() -> ContactInfo {
        ContactInfo {
            driver_name: "Dana".into(),
            driver_email: "dana@example.com".into(),
            driver_phone: None,
        }
    }

    fn sample() -> Reservation {
        Reservation::new(
            "veh_1",
            "drv_1",
            "hst_1",
            period("2025-01-10", "2025-01-12"),
            Decimal::from(50),
            contact(),
        )
    }

    #[test]
    fn new_reservation_is_priced_and_pending() {
        let r = sample();
        assert_eq!(r.number_of_days, 2);
        assert_eq!(r.total_amount, Decimal::from(100));
        assert_eq!(r.status, ReservationStatus::Pending);
        assert_eq!(r.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn same_day_reservation_bills_one_day() {
        let r = Reservation::new(
            "veh_1",
            "drv_1",
            "hst_1",
            period("2025-01-10", "2025-01-10"),
            Decimal::new(4250, 2),
            contact(),
        );
        assert_eq!(r.total_amount, Decimal::new(4250, 2));
    }

    #[test]
    fn full_lifecycle_is_recorded() {
        let mut r = sample();
        let now = Utc::now();
        r.transition(ReservationStatus::Confirmed, now).unwrap();
        r.transition(ReservationStatus::Active, now).unwrap();
        r.transition(ReservationStatus::Completed, now).unwrap();

        let path: Vec<_> = r.status_history.iter().map(|c| (c.from, c.to)).collect();
        assert_eq!(
            path,
            vec![
                (ReservationStatus::Pending, ReservationStatus::Confirmed),
                (ReservationStatus::Confirmed, ReservationStatus::Active),
                (ReservationStatus::Active, ReservationStatus::Completed),
            ]
        );
    }

    #[test]
    fn illegal_transitions_leave_state_untouched() {
        let mut r = sample();
        for target in [
            ReservationStatus::Active,
            ReservationStatus::Completed,
            ReservationStatus::Pending,
        ] {
            let err = r.transition(target, Utc::now()).unwrap_err();
            assert!(matches!(err, DomainError::InvalidTransition { .. }));
        }
        assert_eq!(r.status, ReservationStatus::Pending);
        assert!(r.status_history.is_empty());
    }

    #[test]
    fn active_reservation_cannot_be_cancelled() {
        let mut r = sample();
        r.transition(ReservationStatus::Confirmed, Utc::now()).unwrap();
        r.transition(ReservationStatus::Active, Utc::now()).unwrap();
        assert!(r.transition(ReservationStatus::Cancelled, Utc::now()).is_err());
    }

    #[test]
    fn cancelling_a_paid_reservation_refunds_it() {
        let mut r = sample();
        r.set_payment_status(PaymentStatus::Paid).unwrap();
        r.transition(ReservationStatus::Cancelled, Utc::now()).unwrap();
        assert_eq!(r.payment_status, PaymentStatus::Refunded);
    }

    #[test]
    fn payment_cannot_go_backwards() {
        let mut r = sample();
        assert!(r.set_payment_status(PaymentStatus::Refunded).is_err());
        r.set_payment_status(PaymentStatus::Paid).unwrap();
        assert!(r.set_payment_status(PaymentStatus::Pending).is_err());
    }

    #[test]
    fn cancelled_reservation_does_not_conflict() {
        let mut r = sample();
        let same = period("2025-01-10", "2025-01-12");
        assert!(r.conflicts_with(&same));
        r.transition(ReservationStatus::Cancelled, Utc::now()).unwrap();
        assert!(!r.conflicts_with(&same));
    }

    #[test]
    fn serializes_with_camel_case_and_flat_contact() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["pickupDate"], "2025-01-10");
        assert_eq!(json["driverEmail"], "dana@example.com");
        assert_eq!(json["status"], "pending");
        assert!(json.get("totalAmount").is_some());
    }

    #[test]
    fn status_parse_accepts_any_case() {
        assert_eq!(ReservationStatus::parse("Confirmed"), Some(ReservationStatus::Confirmed));
        assert_eq!(ReservationStatus::parse("expired"), None);
    }
}
