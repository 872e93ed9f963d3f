//! Authenticated caller identity
//!
//! Built from verified token claims by the HTTP middleware and passed into
//! every service call that needs an ownership decision.

use serde::{Deserialize, Serialize};

use super::reservation::Reservation;
use super::trip::Trip;
use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Host,
    Driver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Host => "host",
            Role::Driver => "driver",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub role: Role,
    /// Host profile id, present for host principals
    pub host_id: Option<String>,
    /// Driver profile id, present for driver principals
    pub driver_id: Option<String>,
}

impl Principal {
    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Admin,
            host_id: None,
            driver_id: None,
        }
    }

    pub fn host(user_id: impl Into<String>, host_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Host,
            host_id: Some(host_id.into()),
            driver_id: None,
        }
    }

    pub fn driver(user_id: impl Into<String>, driver_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Driver,
            host_id: None,
            driver_id: Some(driver_id.into()),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Driver profile id, or `AccessDenied` for any other role
    pub fn require_driver(&self) -> DomainResult<&str> {
        match (self.role, self.driver_id.as_deref()) {
            (Role::Driver, Some(id)) => Ok(id),
            _ => Err(DomainError::AccessDenied(
                "only drivers can perform this action".to_string(),
            )),
        }
    }

    /// Host profile id, or `AccessDenied` for any other role
    pub fn require_host(&self) -> DomainResult<&str> {
        match (self.role, self.host_id.as_deref()) {
            (Role::Host, Some(id)) => Ok(id),
            _ => Err(DomainError::AccessDenied(
                "only hosts can perform this action".to_string(),
            )),
        }
    }

    pub fn require_host_or_admin(&self) -> DomainResult<()> {
        if self.is_admin() || self.role == Role::Host {
            Ok(())
        } else {
            Err(DomainError::AccessDenied(
                "host or admin role required".to_string(),
            ))
        }
    }

    pub fn is_host(&self, host_id: &str) -> bool {
        self.role == Role::Host && self.host_id.as_deref() == Some(host_id)
    }

    pub fn is_driver(&self, driver_id: &str) -> bool {
        self.role == Role::Driver && self.driver_id.as_deref() == Some(driver_id)
    }

    fn may_see(&self, driver_id: &str, host_id: &str) -> bool {
        self.is_admin() || self.is_driver(driver_id) || self.is_host(host_id)
    }

    pub fn can_access_reservation(&self, reservation: &Reservation) -> bool {
        self.may_see(&reservation.driver_id, &reservation.host_id)
    }

    pub fn can_access_trip(&self, trip: &Trip) -> bool {
        self.may_see(&trip.driver_id, &trip.host_id)
    }

    pub fn ensure_reservation_access(&self, reservation: &Reservation) -> DomainResult<()> {
        if self.can_access_reservation(reservation) {
            Ok(())
        } else {
            Err(DomainError::AccessDenied(format!(
                "reservation {} belongs to another account",
                reservation.id
            )))
        }
    }

    pub fn ensure_trip_access(&self, trip: &Trip) -> DomainResult<()> {
        if self.can_access_trip(trip) {
            Ok(())
        } else {
            Err(DomainError::AccessDenied(format!(
                "trip {} belongs to another account",
                trip.id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_checks() {
        let driver = Principal::driver("usr_1", "drv_1");
        assert_eq!(driver.require_driver().unwrap(), "drv_1");
        assert!(driver.require_host().is_err());
        assert!(driver.require_host_or_admin().is_err());

        let host = Principal::host("usr_2", "hst_1");
        assert_eq!(host.require_host().unwrap(), "hst_1");
        assert!(host.require_driver().is_err());
        assert!(host.is_host("hst_1"));
        assert!(!host.is_host("hst_2"));

        assert!(Principal::admin("root").require_host_or_admin().is_ok());
    }

    #[test]
    fn driver_without_profile_id_is_denied() {
        let p = Principal {
            user_id: "usr_1".into(),
            role: Role::Driver,
            host_id: None,
            driver_id: None,
        };
        assert!(matches!(p.require_driver(), Err(DomainError::AccessDenied(_))));
    }
}
