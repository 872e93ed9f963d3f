//! Trip domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::record::impl_record;
use crate::domain::reservation::Reservation;
use crate::shared::errors::{DomainError, DomainResult};

/// Trip status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Scheduled,
    Active,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Some(Self::Scheduled),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Scheduled or active
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Scheduled | Self::Active)
    }
}

impl std::fmt::Display for TripStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A problem reported during pickup, the trip or return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripIssue {
    pub description: String,
    pub reported_at: DateTime<Utc>,
}

/// Readings captured at pickup
#[derive(Debug, Clone, Default)]
pub struct PickupReport {
    pub mileage: Option<u32>,
    pub fuel_level: Option<u8>,
    pub condition: Option<String>,
}

/// Readings captured at return
#[derive(Debug, Clone, Default)]
pub struct ReturnReport {
    pub mileage: Option<u32>,
    pub fuel_level: Option<u8>,
    pub condition: Option<String>,
    pub issues: Vec<String>,
}

/// Physical execution of a confirmed reservation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    /// Reservation this trip executes (1:1)
    pub booking_id: String,
    pub driver_id: String,
    pub vehicle_id: String,
    pub host_id: String,
    pub status: TripStatus,
    pub pickup_time: Option<DateTime<Utc>>,
    pub return_time: Option<DateTime<Utc>>,
    pub mileage_start: Option<u32>,
    pub mileage_end: Option<u32>,
    pub fuel_level_start: Option<u8>,
    pub fuel_level_end: Option<u8>,
    pub condition_start: Option<String>,
    pub condition_end: Option<String>,
    #[serde(default)]
    pub issues: Vec<TripIssue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_record!(Trip, "trips", "trp");

fn check_fuel(level: Option<u8>, field: &str) -> DomainResult<()> {
    match level {
        Some(l) if l > 100 => Err(DomainError::Validation(format!(
            "{} must be between 0 and 100, got {}",
            field, l
        ))),
        _ => Ok(()),
    }
}

impl Trip {
    /// Scheduled trip for a reservation
    pub fn for_reservation(reservation: &Reservation) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            booking_id: reservation.id.clone(),
            driver_id: reservation.driver_id.clone(),
            vehicle_id: reservation.vehicle_id.clone(),
            host_id: reservation.host_id.clone(),
            status: TripStatus::Scheduled,
            pickup_time: None,
            return_time: None,
            mileage_start: None,
            mileage_end: None,
            fuel_level_start: None,
            fuel_level_end: None,
            condition_start: None,
            condition_end: None,
            issues: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn invalid(&self, to: TripStatus) -> DomainError {
        DomainError::InvalidTransition {
            entity: "Trip",
            from: self.status.to_string(),
            to: to.to_string(),
        }
    }

    /// Record the pickup. Requires `scheduled`.
    pub fn start(&mut self, report: PickupReport, at: DateTime<Utc>) -> DomainResult<()> {
        if self.status != TripStatus::Scheduled {
            return Err(self.invalid(TripStatus::Active));
        }
        check_fuel(report.fuel_level, "fuelLevelStart")?;

        self.status = TripStatus::Active;
        self.pickup_time = Some(at);
        self.mileage_start = report.mileage;
        self.fuel_level_start = report.fuel_level;
        self.condition_start = report.condition;
        Ok(())
    }

    /// Record the return. Requires `active`. With `enforce_mileage`, a
    /// return odometer below the pickup reading is rejected.
    pub fn complete(
        &mut self,
        report: ReturnReport,
        enforce_mileage: bool,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.status != TripStatus::Active {
            return Err(self.invalid(TripStatus::Completed));
        }
        check_fuel(report.fuel_level, "fuelLevelEnd")?;
        if enforce_mileage {
            if let (Some(start), Some(end)) = (self.mileage_start, report.mileage) {
                if end < start {
                    return Err(DomainError::InvalidMileage { start, end });
                }
            }
        }

        self.status = TripStatus::Completed;
        self.return_time = Some(at);
        self.mileage_end = report.mileage;
        self.fuel_level_end = report.fuel_level;
        self.condition_end = report.condition;
        self.issues.extend(
            report
                .issues
                .into_iter()
                .filter(|d| !d.trim().is_empty())
                .map(|description| TripIssue {
                    description,
                    reported_at: at,
                }),
        );
        Ok(())
    }

    /// Cancel before pickup
    pub fn cancel(&mut self) -> DomainResult<()> {
        if self.status != TripStatus::Scheduled {
            return Err(self.invalid(TripStatus::Cancelled));
        }
        self.status = TripStatus::Cancelled;
        Ok(())
    }

    /// Report a problem while the vehicle is out
    pub fn report_issue(&mut self, description: String, at: DateTime<Utc>) -> DomainResult<()> {
        if self.status != TripStatus::Active {
            return Err(DomainError::Validation(format!(
                "issues can only be reported on an active trip (status: {})",
                self.status
            )));
        }
        if description.trim().is_empty() {
            return Err(DomainError::Validation("issue description is empty".into()));
        }
        self.issues.push(TripIssue {
            description,
            reported_at: at,
        });
        Ok(())
    }

    /// Distance covered, when both odometer readings exist and are consistent
    pub fn distance(&self) -> Option<u32> {
        match (self.mileage_start, self.mileage_end) {
            (Some(start), Some(end)) if end >= start => Some(end - start),
            _ => None,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
