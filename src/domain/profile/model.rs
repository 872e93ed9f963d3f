//! Host and driver profiles
//!
//! Plain store-and-filter records. Billing state is owned elsewhere and only
//! mirrored here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::record::impl_record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceTier {
    #[default]
    Basic,
    Professional,
    Enterprise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    PastDue,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    Unverified,
    Pending,
    Verified,
    Rejected,
}

/// Fleet owner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    pub id: String,
    /// Identity-provider subject the profile belongs to
    pub user_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub service_tier: ServiceTier,
    #[serde(default)]
    pub subscription_status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_record!(Host, "hosts", "hst");

impl Host {
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        service_tier: ServiceTier,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            user_id: user_id.into(),
            name: name.into(),
            email: email.into(),
            service_tier,
            subscription_status: SubscriptionStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Renter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub verification_status: VerificationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_record!(Driver, "drivers", "drv");

impl Driver {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            user_id: user_id.into(),
            name: name.into(),
            email: email.into(),
            license_number: None,
            verification_status: VerificationStatus::Unverified,
            created_at: now,
            updated_at: now,
        }
    }
}
