//! Vehicle registry
//!
//! Hosts register vehicles and take them in and out of service. The
//! `rented` status is only ever set by the booking reactor.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use crate::application::events::{Event, SharedEventBus, VehicleStatusChangedEvent};
use crate::domain::principal::Principal;
use crate::domain::repositories::{Repository, RepositoryProvider};
use crate::domain::vehicle::{Vehicle, VehicleStatus};
use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub make: String,
    pub model: String,
    pub year: u16,
    pub vin: String,
    pub daily_rate: Decimal,
    pub location: String,
    /// Register as `pending` instead of immediately bookable
    pub pending: bool,
}

pub struct VehicleService {
    repos: Arc<dyn RepositoryProvider>,
    events: SharedEventBus,
}

impl VehicleService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, events: SharedEventBus) -> Self {
        Self { repos, events }
    }

    pub async fn register(&self, principal: &Principal, details: NewVehicle) -> DomainResult<Vehicle> {
        let host_id = principal.require_host()?;
        if details.daily_rate <= Decimal::ZERO {
            return Err(DomainError::Validation("dailyRate must be positive".into()));
        }

        let mut vehicle = Vehicle::new(
            host_id,
            details.make,
            details.model,
            details.year,
            details.vin,
            details.daily_rate,
            details.location,
        );
        if details.pending {
            vehicle.status = VehicleStatus::Pending;
        }

        let vehicle = self.repos.vehicles().insert(vehicle).await?;
        info!(vehicle_id = %vehicle.id, host_id = %vehicle.host_id, "Vehicle registered");
        Ok(vehicle)
    }

    async fn load(&self, id: &str) -> DomainResult<Vehicle> {
        self.repos
            .vehicles()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::VehicleNotFound(id.to_string()))
    }

    async fn load_owned(&self, principal: &Principal, id: &str) -> DomainResult<Vehicle> {
        let vehicle = self.load(id).await?;
        if principal.is_admin() || principal.is_host(&vehicle.host_id) {
            Ok(vehicle)
        } else {
            Err(DomainError::AccessDenied(format!(
                "vehicle {} belongs to another host",
                id
            )))
        }
    }

    pub async fn get(&self, principal: &Principal, id: &str) -> DomainResult<Vehicle> {
        self.load_owned(principal, id).await
    }

    /// Admins see every vehicle (optionally one host's); hosts see their own.
    pub async fn list(&self, principal: &Principal, host_id: Option<&str>) -> DomainResult<Vec<Vehicle>> {
        let scope = if principal.is_admin() {
            host_id.map(str::to_string)
        } else {
            Some(principal.require_host()?.to_string())
        };
        Ok(self
            .repos
            .vehicles()
            .list()
            .await?
            .into_iter()
            .filter(|v| scope.as_ref().map_or(true, |h| &v.host_id == h))
            .collect())
    }

    /// Host maintenance action: `available`, `maintenance` or `inactive`
    pub async fn set_status(
        &self,
        principal: &Principal,
        id: &str,
        status: VehicleStatus,
    ) -> DomainResult<Vehicle> {
        if !status.is_host_settable() {
            return Err(DomainError::Validation(format!(
                "status {} cannot be set directly",
                status
            )));
        }
        let vehicle = self.load_owned(principal, id).await?;
        if vehicle.status == VehicleStatus::Rented {
            return Err(DomainError::Conflict(format!(
                "vehicle {} is out on a rental",
                id
            )));
        }
        self.apply_status(vehicle, status).await
    }

    /// New rate for future bookings. Existing reservations keep their snapshot.
    pub async fn update_rate(
        &self,
        principal: &Principal,
        id: &str,
        daily_rate: Decimal,
    ) -> DomainResult<Vehicle> {
        if daily_rate <= Decimal::ZERO {
            return Err(DomainError::Validation("dailyRate must be positive".into()));
        }
        let mut vehicle = self.load_owned(principal, id).await?;
        vehicle.daily_rate = daily_rate;
        let vehicle = self.repos.vehicles().save(vehicle).await?;
        info!(vehicle_id = %vehicle.id, rate = %daily_rate, "Vehicle re-rated");
        Ok(vehicle)
    }

    pub(crate) async fn mark_rented(&self, id: &str) -> DomainResult<Vehicle> {
        let vehicle = self.load(id).await?;
        self.apply_status(vehicle, VehicleStatus::Rented).await
    }

    /// Return a rented vehicle to service. Any other status is left alone.
    pub(crate) async fn mark_available(&self, id: &str) -> DomainResult<Option<Vehicle>> {
        let vehicle = self.load(id).await?;
        if vehicle.status != VehicleStatus::Rented {
            return Ok(None);
        }
        self.apply_status(vehicle, VehicleStatus::Available)
            .await
            .map(Some)
    }

    async fn apply_status(&self, mut vehicle: Vehicle, status: VehicleStatus) -> DomainResult<Vehicle> {
        let old_status = vehicle.status;
        if old_status == status {
            return Ok(vehicle);
        }
        vehicle.status = status;
        let vehicle = self.repos.vehicles().save(vehicle).await?;

        info!(vehicle_id = %vehicle.id, from = %old_status, to = %status, "Vehicle status changed");
        self.events
            .publish(Event::VehicleStatusChanged(VehicleStatusChangedEvent {
                vehicle_id: vehicle.id.clone(),
                old_status,
                new_status: status,
                timestamp: Utc::now(),
            }));
        Ok(vehicle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::{fixture, host};

    fn details() -> NewVehicle {
        NewVehicle {
            make: "Ford".into(),
            model: "Focus".into(),
            year: 2020,
            vin: "1FADP3F2XEL000000".into(),
            daily_rate: Decimal::new(3999, 2),
            location: "Seattle".into(),
            pending: false,
        }
    }

    #[tokio::test]
    async fn host_registers_and_lists_own_vehicles() {
        let fx = fixture();
        let v = fx.vehicles.register(&host(), details()).await.unwrap();
        assert!(v.id.starts_with("veh_"));
        assert_eq!(v.status, VehicleStatus::Available);

        let other = Principal::host("usr_o", "hst_other");
        fx.vehicles.register(&other, details()).await.unwrap();

        assert_eq!(fx.vehicles.list(&host(), None).await.unwrap().len(), 1);
        assert_eq!(
            fx.vehicles
                .list(&Principal::admin("root"), None)
                .await
                .unwrap()
                .len(),
            2
        );
        assert!(matches!(
            fx.vehicles.get(&other, &v.id).await,
            Err(DomainError::AccessDenied(_))
        ));
    }

    #[tokio::test]
    async fn pending_registration_is_not_bookable() {
        let fx = fixture();
        let v = fx
            .vehicles
            .register(
                &host(),
                NewVehicle {
                    pending: true,
                    ..details()
                },
            )
            .await
            .unwrap();
        assert_eq!(v.status, VehicleStatus::Pending);
        assert!(!v.is_bookable());
    }

    #[tokio::test]
    async fn rented_is_not_host_settable() {
        let fx = fixture();
        let v = fx.vehicles.register(&host(), details()).await.unwrap();
        let err = fx
            .vehicles
            .set_status(&host(), &v.id, VehicleStatus::Rented)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let v = fx
            .vehicles
            .set_status(&host(), &v.id, VehicleStatus::Maintenance)
            .await
            .unwrap();
        assert_eq!(v.status, VehicleStatus::Maintenance);
    }

    #[tokio::test]
    async fn rented_vehicle_cannot_be_pulled_from_service() {
        let fx = fixture();
        let v = fx.vehicles.register(&host(), details()).await.unwrap();
        fx.vehicles.mark_rented(&v.id).await.unwrap();
        let err = fx
            .vehicles
            .set_status(&host(), &v.id, VehicleStatus::Inactive)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let back = fx.vehicles.mark_available(&v.id).await.unwrap().unwrap();
        assert_eq!(back.status, VehicleStatus::Available);
        assert!(fx.vehicles.mark_available(&v.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn non_positive_rate_is_rejected() {
        let fx = fixture();
        let err = fx
            .vehicles
            .register(
                &host(),
                NewVehicle {
                    daily_rate: Decimal::ZERO,
                    ..details()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
