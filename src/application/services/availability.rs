//! Availability resolver
//!
//! Answers "which vehicles are free for this window" and "does this window
//! collide with an existing booking on this vehicle".

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::domain::repositories::{Repository, RepositoryProvider};
use crate::domain::reservation::{BookingPeriod, Reservation};
use crate::domain::vehicle::{VehicleListing, VehicleStatus};
use crate::shared::errors::DomainResult;

#[derive(Clone)]
pub struct AvailabilityService {
    repos: Arc<dyn RepositoryProvider>,
}

impl AvailabilityService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Vehicles with status `available` and no non-cancelled reservation
    /// overlapping `[start_date, end_date)`, optionally narrowed by a
    /// case-insensitive location substring.
    pub async fn find_available(
        &self,
        start_date: &str,
        end_date: &str,
        location: Option<&str>,
    ) -> DomainResult<Vec<VehicleListing>> {
        let period = BookingPeriod::parse(start_date, end_date)?;
        let location = location.map(str::trim).filter(|l| !l.is_empty());

        let booked: HashSet<String> = self
            .repos
            .reservations()
            .list()
            .await?
            .into_iter()
            .filter(|r| r.conflicts_with(&period))
            .map(|r| r.vehicle_id)
            .collect();

        let listings: Vec<VehicleListing> = self
            .repos
            .vehicles()
            .list()
            .await?
            .into_iter()
            .filter(|v| v.status == VehicleStatus::Available)
            .filter(|v| !booked.contains(&v.id))
            .filter(|v| location.map_or(true, |l| v.matches_location(l)))
            .map(|v| v.listing())
            .collect();

        debug!(
            start = %period.start,
            end = %period.end,
            ?location,
            booked = booked.len(),
            available = listings.len(),
            "Availability resolved"
        );
        Ok(listings)
    }

    /// First non-cancelled reservation on `vehicle_id` that overlaps `period`
    pub async fn find_conflict(
        &self,
        vehicle_id: &str,
        period: &BookingPeriod,
    ) -> DomainResult<Option<Reservation>> {
        Ok(self
            .repos
            .reservations()
            .list()
            .await?
            .into_iter()
            .find(|r| r.vehicle_id == vehicle_id && r.conflicts_with(period)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::{book, fixture, vehicle};
    use crate::domain::reservation::ReservationStatus;
    use crate::shared::errors::DomainError;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn empty_calendar_returns_every_available_vehicle() {
        let fx = fixture();
        let a = vehicle(&fx, "hst_1", "Austin", 50).await;
        let b = vehicle(&fx, "hst_2", "Denver", 60).await;
        let mut c = vehicle(&fx, "hst_1", "Austin", 70).await;
        c.status = VehicleStatus::Maintenance;
        fx.repos.vehicles().save(c).await.unwrap();

        let found = fx
            .availability
            .find_available("2025-01-10", "2025-01-12", None)
            .await
            .unwrap();
        let ids: HashSet<_> = found.iter().map(|l| l.id.clone()).collect();
        assert_eq!(ids, HashSet::from([a.id, b.id]));
    }

    #[tokio::test]
    async fn booked_vehicle_is_excluded_until_cancelled() {
        let fx = fixture();
        let v = vehicle(&fx, "hst_1", "Austin", 50).await;
        let r = book(&fx, &v.id, "2025-01-10", "2025-01-12").await;

        let found = fx
            .availability
            .find_available("2025-01-11", "2025-01-13", None)
            .await
            .unwrap();
        assert!(found.is_empty());

        let back_to_back = fx
            .availability
            .find_available("2025-01-12", "2025-01-14", None)
            .await
            .unwrap();
        assert_eq!(back_to_back.len(), 1);

        fx.reservations
            .move_to(&r.id, ReservationStatus::Cancelled)
            .await
            .unwrap();
        let freed = fx
            .availability
            .find_available("2025-01-11", "2025-01-13", None)
            .await
            .unwrap();
        assert_eq!(freed.len(), 1);
        assert_eq!(freed[0].daily_rate, Decimal::from(50));
    }

    #[tokio::test]
    async fn location_filter_is_case_insensitive() {
        let fx = fixture();
        vehicle(&fx, "hst_1", "Austin, TX", 50).await;
        vehicle(&fx, "hst_1", "Denver, CO", 50).await;

        let found = fx
            .availability
            .find_available("2025-01-10", "2025-01-12", Some("austin"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].location, "Austin, TX");

        let blank = fx
            .availability
            .find_available("2025-01-10", "2025-01-12", Some("  "))
            .await
            .unwrap();
        assert_eq!(blank.len(), 2);
    }

    #[tokio::test]
    async fn inverted_window_is_invalid_range() {
        let fx = fixture();
        let err = fx
            .availability
            .find_available("2025-01-12", "2025-01-10", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidRange(_)));
    }
}
