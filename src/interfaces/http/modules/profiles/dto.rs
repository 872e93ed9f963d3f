//! Profile DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::services::{NewDriver, NewHost};
use crate::domain::profile::{
    Driver, Host, ServiceTier, SubscriptionStatus, VerificationStatus,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateHostRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[schema(value_type = String, example = "basic")]
    pub service_tier: ServiceTier,
}

impl From<CreateHostRequest> for NewHost {
    fn from(r: CreateHostRequest) -> Self {
        Self {
            name: r.name,
            email: r.email,
            service_tier: r.service_tier,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDriverRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 64))]
    pub license_number: Option<String>,
}

impl From<CreateDriverRequest> for NewDriver {
    fn from(r: CreateDriverRequest) -> Self {
        Self {
            name: r.name,
            email: r.email,
            license_number: r.license_number,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HostDto {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    #[schema(value_type = String, example = "basic")]
    pub service_tier: ServiceTier,
    #[schema(value_type = String, example = "active")]
    pub subscription_status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Host> for HostDto {
    fn from(h: Host) -> Self {
        Self {
            id: h.id,
            user_id: h.user_id,
            name: h.name,
            email: h.email,
            service_tier: h.service_tier,
            subscription_status: h.subscription_status,
            created_at: h.created_at,
            updated_at: h.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DriverDto {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub license_number: Option<String>,
    #[schema(value_type = String, example = "unverified")]
    pub verification_status: VerificationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Driver> for DriverDto {
    fn from(d: Driver) -> Self {
        Self {
            id: d.id,
            user_id: d.user_id,
            name: d.name,
            email: d.email,
            license_number: d.license_number,
            verification_status: d.verification_status,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}
