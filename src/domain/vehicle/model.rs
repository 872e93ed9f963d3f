//! Vehicle domain entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::record::impl_record;

/// Vehicle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    /// Registered, awaiting host activation
    Pending,
    /// Bookable
    Available,
    /// Currently out with a driver
    Rented,
    /// Withdrawn by the host for servicing
    Maintenance,
    /// Retired or suspended
    Inactive,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Available => "available",
            Self::Rented => "rented",
            Self::Maintenance => "maintenance",
            Self::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "available" => Some(Self::Available),
            "rented" => Some(Self::Rented),
            "maintenance" => Some(Self::Maintenance),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }

    /// Statuses a host may set directly. `rented` is driven by reservations.
    pub fn is_host_settable(&self) -> bool {
        matches!(self, Self::Available | Self::Maintenance | Self::Inactive)
    }
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rentable vehicle owned by one host
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    pub host_id: String,
    pub make: String,
    pub model: String,
    pub year: u16,
    pub vin: String,
    /// Current daily rate; reservations snapshot it at creation
    pub daily_rate: Decimal,
    #[serde(default)]
    pub location: String,
    pub status: VehicleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_record!(Vehicle, "vehicles", "veh");

impl Vehicle {
    pub fn new(
        host_id: impl Into<String>,
        make: impl Into<String>,
        model: impl Into<String>,
        year: u16,
        vin: impl Into<String>,
        daily_rate: Decimal,
        location: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            host_id: host_id.into(),
            make: make.into(),
            model: model.into(),
            year,
            vin: vin.into(),
            daily_rate,
            location: location.into(),
            status: VehicleStatus::Available,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_bookable(&self) -> bool {
        self.status == VehicleStatus::Available
    }

    /// Case-insensitive substring match on the location field
    pub fn matches_location(&self, filter: &str) -> bool {
        self.location
            .to_lowercase()
            .contains(&filter.trim().to_lowercase())
    }

    pub fn listing(&self) -> VehicleListing {
        VehicleListing {
            id: self.id.clone(),
            make: self.make.clone(),
            model: self.model.clone(),
            year: self.year,
            daily_rate: self.daily_rate,
            location: self.location.clone(),
            status: self.status,
        }
    }
}

/// Public-safe projection of a vehicle: no VIN, no owner details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleListing {
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: u16,
    pub daily_rate: Decimal,
    pub location: String,
    pub status: VehicleStatus,
}

// ── Tests ──────────────────────────────────────────────────────
