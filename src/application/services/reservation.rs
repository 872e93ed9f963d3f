//! Reservation lifecycle
//!
//! Creation runs the availability check and the insert under a per-vehicle
//! lock so two overlapping requests for one vehicle cannot both commit.
//! Status moves publish events; cascades happen in the reactor.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::availability::AvailabilityService;
use super::keyed_locks::KeyedLocks;
use crate::application::events::{
    Event, ReservationCreatedEvent, ReservationStatusChangedEvent, SharedEventBus,
};
use crate::domain::principal::Principal;
use crate::domain::repositories::{Repository, RepositoryProvider};
use crate::domain::reservation::{
    BookingPeriod, ContactInfo, PaymentStatus, Reservation, ReservationStatus,
};
use crate::shared::errors::{DomainError, DomainResult};

/// Lock entries kept before idle ones are pruned
const LOCK_PRUNE_THRESHOLD: usize = 1024;

/// Booking request from a driver
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub vehicle_id: String,
    pub pickup_date: String,
    pub return_date: String,
    pub contact: ContactInfo,
    pub notes: Option<String>,
}

/// Editable fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ReservationDetails {
    pub notes: Option<String>,
    pub driver_name: Option<String>,
    pub driver_email: Option<String>,
    pub driver_phone: Option<String>,
}

impl ReservationDetails {
    pub fn is_empty(&self) -> bool {
        self.notes.is_none()
            && self.driver_name.is_none()
            && self.driver_email.is_none()
            && self.driver_phone.is_none()
    }

    fn apply_to(self, reservation: &mut Reservation) {
        if let Some(notes) = self.notes {
            reservation.notes = Some(notes).filter(|n| !n.trim().is_empty());
        }
        if let Some(name) = self.driver_name {
            reservation.contact.driver_name = name;
        }
        if let Some(email) = self.driver_email {
            reservation.contact.driver_email = email;
        }
        if let Some(phone) = self.driver_phone {
            reservation.contact.driver_phone = Some(phone).filter(|p| !p.trim().is_empty());
        }
    }
}

fn ensure_editable(reservation: &Reservation) -> DomainResult<()> {
    if reservation.status.is_terminal() {
        return Err(DomainError::Validation(format!(
            "reservation {} is {} and can no longer be edited",
            reservation.id, reservation.status
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub driver_id: Option<String>,
    pub host_id: Option<String>,
    pub vehicle_id: Option<String>,
    pub status: Option<ReservationStatus>,
}

impl ReservationFilter {
    fn matches(&self, r: &Reservation) -> bool {
        self.driver_id.as_ref().map_or(true, |d| &r.driver_id == d)
            && self.host_id.as_ref().map_or(true, |h| &r.host_id == h)
            && self.vehicle_id.as_ref().map_or(true, |v| &r.vehicle_id == v)
            && self.status.map_or(true, |s| r.status == s)
    }
}

pub struct ReservationService {
    repos: Arc<dyn RepositoryProvider>,
    events: SharedEventBus,
    availability: AvailabilityService,
    vehicle_locks: KeyedLocks,
}

impl ReservationService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, events: SharedEventBus) -> Self {
        Self {
            availability: AvailabilityService::new(repos.clone()),
            repos,
            events,
            vehicle_locks: KeyedLocks::new(),
        }
    }

    /// Book a vehicle for the calling driver
    pub async fn create(
        &self,
        principal: &Principal,
        request: NewReservation,
    ) -> DomainResult<Reservation> {
        let result = self.create_inner(principal, request).await;
        match &result {
            Ok(reservation) => {
                metrics::counter!("reservations_created_total").increment(1);
                info!(
                    reservation_id = %reservation.id,
                    vehicle_id = %reservation.vehicle_id,
                    driver_id = %reservation.driver_id,
                    total = %reservation.total_amount,
                    "Reservation created"
                );
            }
            Err(e) => {
                metrics::counter!("reservations_rejected_total", "reason" => e.code())
                    .increment(1);
                warn!(error = %e, "Reservation rejected");
            }
        }
        result
    }

    async fn create_inner(
        &self,
        principal: &Principal,
        request: NewReservation,
    ) -> DomainResult<Reservation> {
        let driver_id = principal.require_driver()?.to_string();
        let period = BookingPeriod::parse(&request.pickup_date, &request.return_date)?;

        let reservation = {
            let _guard = self.vehicle_locks.acquire(&request.vehicle_id).await;

            let vehicle = self
                .repos
                .vehicles()
                .find_by_id(&request.vehicle_id)
                .await?
                .ok_or_else(|| DomainError::VehicleNotFound(request.vehicle_id.clone()))?;

            if !vehicle.is_bookable() {
                return Err(DomainError::VehicleUnavailable {
                    vehicle_id: vehicle.id,
                    reason: format!("vehicle status is {}", vehicle.status),
                });
            }

            if let Some(existing) = self.availability.find_conflict(&vehicle.id, &period).await? {
                return Err(DomainError::VehicleUnavailable {
                    vehicle_id: vehicle.id,
                    reason: format!(
                        "overlaps reservation {} ({} to {})",
                        existing.id, existing.pickup_date, existing.return_date
                    ),
                });
            }

            let mut reservation = Reservation::new(
                vehicle.id.clone(),
                driver_id,
                vehicle.host_id.clone(),
                period,
                vehicle.daily_rate,
                request.contact,
            );
            reservation.notes = request.notes.filter(|n| !n.trim().is_empty());
            self.repos.reservations().insert(reservation).await?
        };

        if self.vehicle_locks.len() > LOCK_PRUNE_THRESHOLD {
            self.vehicle_locks.prune();
        }

        self.events
            .publish(Event::ReservationCreated(ReservationCreatedEvent {
                reservation_id: reservation.id.clone(),
                vehicle_id: reservation.vehicle_id.clone(),
                driver_id: reservation.driver_id.clone(),
                host_id: reservation.host_id.clone(),
                total_amount: reservation.total_amount,
                timestamp: reservation.created_at,
            }));

        Ok(reservation)
    }

    async fn load(&self, id: &str) -> DomainResult<Reservation> {
        self.repos
            .reservations()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", id))
    }

    pub async fn get(&self, principal: &Principal, id: &str) -> DomainResult<Reservation> {
        let reservation = self.load(id).await?;
        principal.ensure_reservation_access(&reservation)?;
        Ok(reservation)
    }

    /// Reservations matching `filter` that the caller may see
    pub async fn list(
        &self,
        principal: &Principal,
        filter: ReservationFilter,
    ) -> DomainResult<Vec<Reservation>> {
        Ok(self
            .repos
            .reservations()
            .list()
            .await?
            .into_iter()
            .filter(|r| filter.matches(r) && principal.can_access_reservation(r))
            .collect())
    }

    pub async fn transition(
        &self,
        principal: &Principal,
        id: &str,
        target: ReservationStatus,
    ) -> DomainResult<Reservation> {
        let reservation = self.load(id).await?;
        principal.ensure_reservation_access(&reservation)?;
        self.move_to(id, target).await
    }

    pub async fn cancel(&self, principal: &Principal, id: &str) -> DomainResult<Reservation> {
        self.transition(principal, id, ReservationStatus::Cancelled)
            .await
    }

    /// Apply a status move without an ownership check. Used by the event
    /// reactor and by callers that already authorized the request.
    pub(crate) async fn move_to(
        &self,
        id: &str,
        target: ReservationStatus,
    ) -> DomainResult<Reservation> {
        self.commit_move(id, ReservationDetails::default(), target)
            .await
    }

    /// Edit details and move status in one write. The move is checked on
    /// the loaded record first; a rejected move leaves the stored record untouched.
    pub async fn update(
        &self,
        principal: &Principal,
        id: &str,
        details: ReservationDetails,
        target: Option<ReservationStatus>,
    ) -> DomainResult<Reservation> {
        let reservation = self.load(id).await?;
        principal.ensure_reservation_access(&reservation)?;

        match target {
            Some(target) => self.commit_move(id, details, target).await,
            None if details.is_empty() => Ok(reservation),
            None => self.update_details(principal, id, details).await,
        }
    }

    async fn commit_move(
        &self,
        id: &str,
        details: ReservationDetails,
        target: ReservationStatus,
    ) -> DomainResult<Reservation> {
        let vehicle_id = self.load(id).await?.vehicle_id;
        let _guard = self.vehicle_locks.acquire(&vehicle_id).await;

        let mut reservation = self.load(id).await?;
        if !details.is_empty() {
            ensure_editable(&reservation)?;
        }
        let from = reservation.status;
        let now = Utc::now();
        reservation.transition(target, now)?;
        details.apply_to(&mut reservation);
        let reservation = self.repos.reservations().save(reservation).await?;

        metrics::counter!("reservation_transitions_total", "to" => target.as_str()).increment(1);
        info!(
            reservation_id = %reservation.id,
            %from,
            to = %target,
            "Reservation status changed"
        );

        self.events
            .publish(Event::ReservationStatusChanged(ReservationStatusChangedEvent {
                reservation_id: reservation.id.clone(),
                vehicle_id: reservation.vehicle_id.clone(),
                from,
                to: target,
                timestamp: now,
            }));

        Ok(reservation)
    }

    /// Edit contact details and notes on a non-terminal reservation
    pub async fn update_details(
        &self,
        principal: &Principal,
        id: &str,
        details: ReservationDetails,
    ) -> DomainResult<Reservation> {
        let mut reservation = self.load(id).await?;
        principal.ensure_reservation_access(&reservation)?;

        ensure_editable(&reservation)?;
        if details.is_empty() {
            return Ok(reservation);
        }

        details.apply_to(&mut reservation);
        self.repos.reservations().save(reservation).await
    }

    /// Record a payment outcome reported by billing
    pub async fn record_payment(
        &self,
        principal: &Principal,
        id: &str,
        status: PaymentStatus,
    ) -> DomainResult<Reservation> {
        principal.require_host_or_admin()?;
        let mut reservation = self.load(id).await?;
        principal.ensure_reservation_access(&reservation)?;

        reservation.set_payment_status(status)?;
        let reservation = self.repos.reservations().save(reservation).await?;
        info!(
            reservation_id = %reservation.id,
            payment_status = status.as_str(),
            "Payment status recorded"
        );
        Ok(reservation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::{book, driver, fixture, vehicle, DRIVER_ID};
    use futures_util::future::join_all;
    use rust_decimal::Decimal;

    fn request(vehicle_id: &str, start: &str, end: &str) -> NewReservation {
        NewReservation {
            vehicle_id: vehicle_id.to_string(),
            pickup_date: start.to_string(),
            return_date: end.to_string(),
            contact: ContactInfo {
                driver_name: "Dana".into(),
                driver_email: "dana@example.com".into(),
                driver_phone: Some("555-0100".into()),
            },
            notes: None,
        }
    }

    #[tokio::test]
    async fn booking_is_priced_from_vehicle_rate() {
        let fx = fixture();
        let v = vehicle(&fx, "hst_1", "Austin", 50).await;
        let r = book(&fx, &v.id, "2025-01-10", "2025-01-12").await;

        assert!(r.id.starts_with("res_"));
        assert_eq!(r.total_amount, Decimal::from(100));
        assert_eq!(r.number_of_days, 2);
        assert_eq!(r.status, ReservationStatus::Pending);
        assert_eq!(r.payment_status, PaymentStatus::Pending);
        assert_eq!(r.host_id, "hst_1");
        assert_eq!(r.driver_id, DRIVER_ID);
    }

    #[tokio::test]
    async fn overlapping_booking_is_rejected_on_confirmed_slot() {
        let fx = fixture();
        let v = vehicle(&fx, "hst_1", "Austin", 50).await;
        let r = book(&fx, &v.id, "2025-01-10", "2025-01-12").await;
        fx.reservations
            .move_to(&r.id, ReservationStatus::Confirmed)
            .await
            .unwrap();

        let err = fx
            .reservations
            .create(&driver(), request(&v.id, "2025-01-11", "2025-01-13"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::VehicleUnavailable { .. }));
    }

    #[tokio::test]
    async fn cancellation_frees_the_slot() {
        let fx = fixture();
        let v = vehicle(&fx, "hst_1", "Austin", 50).await;
        let r = book(&fx, &v.id, "2025-01-10", "2025-01-12").await;
        fx.reservations.cancel(&driver(), &r.id).await.unwrap();

        let again = fx
            .reservations
            .create(&driver(), request(&v.id, "2025-01-11", "2025-01-13"))
            .await
            .unwrap();
        assert_eq!(again.status, ReservationStatus::Pending);
    }

    #[tokio::test]
    async fn back_to_back_bookings_are_allowed() {
        let fx = fixture();
        let v = vehicle(&fx, "hst_1", "Austin", 50).await;
        book(&fx, &v.id, "2025-01-10", "2025-01-12").await;
        book(&fx, &v.id, "2025-01-12", "2025-01-14").await;
    }

    #[tokio::test]
    async fn unknown_vehicle_and_bad_dates_are_rejected() {
        let fx = fixture();
        let err = fx
            .reservations
            .create(&driver(), request("veh_missing", "2025-01-10", "2025-01-12"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::VehicleNotFound(_)));

        let v = vehicle(&fx, "hst_1", "Austin", 50).await;
        let err = fx
            .reservations
            .create(&driver(), request(&v.id, "2025-01-12", "2025-01-10"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidRange(_)));
    }

    #[tokio::test]
    async fn only_drivers_can_book() {
        let fx = fixture();
        let v = vehicle(&fx, "hst_1", "Austin", 50).await;
        let err = fx
            .reservations
            .create(
                &Principal::host("usr_h", "hst_1"),
                request(&v.id, "2025-01-10", "2025-01-12"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AccessDenied(_)));
    }

    #[tokio::test]
    async fn vehicle_under_maintenance_cannot_be_booked() {
        let fx = fixture();
        let mut v = vehicle(&fx, "hst_1", "Austin", 50).await;
        v.status = crate::domain::vehicle::VehicleStatus::Maintenance;
        fx.repos.vehicles().save(v.clone()).await.unwrap();

        let err = fx
            .reservations
            .create(&driver(), request(&v.id, "2025-01-10", "2025-01-12"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::VehicleUnavailable { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_overlapping_creates_commit_once() {
        let fx = fixture();
        let v = vehicle(&fx, "hst_1", "Austin", 50).await;
        let principal = driver();

        let attempts = (0..16).map(|i| {
            let start = format!("2025-03-{:02}", 10 + (i % 3));
            let end = format!("2025-03-{:02}", 14 + (i % 3));
            fx.reservations
                .create(&principal, request(&v.id, &start, &end))
        });
        let results = join_all(attempts).await;

        let committed = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(committed, 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, DomainError::VehicleUnavailable { .. })));

        let stored = fx.repos.reservations().list().await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn rate_change_does_not_reprice_existing_booking() {
        let fx = fixture();
        let v = vehicle(&fx, "hst_1", "Austin", 50).await;
        let r = book(&fx, &v.id, "2025-01-10", "2025-01-12").await;

        fx.vehicles
            .update_rate(&Principal::host("usr_h", "hst_1"), &v.id, Decimal::from(80))
            .await
            .unwrap();

        let stored = fx.reservations.get(&driver(), &r.id).await.unwrap();
        assert_eq!(stored.total_amount, Decimal::from(100));
        assert_eq!(stored.daily_rate, Decimal::from(50));
    }

    #[tokio::test]
    async fn illegal_transition_writes_nothing() {
        let fx = fixture();
        let v = vehicle(&fx, "hst_1", "Austin", 50).await;
        let r = book(&fx, &v.id, "2025-01-10", "2025-01-12").await;

        let err = fx
            .reservations
            .transition(&driver(), &r.id, ReservationStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));

        let stored = fx.reservations.get(&driver(), &r.id).await.unwrap();
        assert_eq!(stored.status, ReservationStatus::Pending);
        assert!(stored.status_history.is_empty());
        assert_eq!(stored.updated_at, r.updated_at);
    }

    #[tokio::test]
    async fn rejected_move_discards_details_in_same_update() {
        let fx = fixture();
        let v = vehicle(&fx, "hst_1", "Austin", 50).await;
        let r = book(&fx, &v.id, "2025-01-10", "2025-01-12").await;

        let err = fx
            .reservations
            .update(
                &driver(),
                &r.id,
                ReservationDetails {
                    notes: Some("x".into()),
                    ..Default::default()
                },
                Some(ReservationStatus::Completed),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));

        let stored = fx.reservations.get(&driver(), &r.id).await.unwrap();
        assert_eq!(stored.notes, None);
        assert_eq!(stored.status, ReservationStatus::Pending);
        assert_eq!(stored.updated_at, r.updated_at);
    }

    #[tokio::test]
    async fn details_and_move_commit_together() {
        let fx = fixture();
        let v = vehicle(&fx, "hst_1", "Austin", 50).await;
        let r = book(&fx, &v.id, "2025-01-10", "2025-01-12").await;

        let updated = fx
            .reservations
            .update(
                &driver(),
                &r.id,
                ReservationDetails {
                    notes: Some("changed plans".into()),
                    ..Default::default()
                },
                Some(ReservationStatus::Cancelled),
            )
            .await
            .unwrap();
        assert_eq!(updated.status, ReservationStatus::Cancelled);
        assert_eq!(updated.notes.as_deref(), Some("changed plans"));
        assert_eq!(updated.status_history.len(), 1);
    }

    #[tokio::test]
    async fn other_accounts_are_denied() {
        let fx = fixture();
        let v = vehicle(&fx, "hst_1", "Austin", 50).await;
        let r = book(&fx, &v.id, "2025-01-10", "2025-01-12").await;

        let stranger = Principal::driver("usr_x", "drv_other");
        assert!(matches!(
            fx.reservations.get(&stranger, &r.id).await,
            Err(DomainError::AccessDenied(_))
        ));
        assert!(fx.reservations.get(&Principal::host("usr_h", "hst_1"), &r.id).await.is_ok());
        assert!(fx.reservations.get(&Principal::admin("root"), &r.id).await.is_ok());

        let visible = fx
            .reservations
            .list(&stranger, ReservationFilter::default())
            .await
            .unwrap();
        assert!(visible.is_empty());
    }

    #[tokio::test]
    async fn details_update_is_limited_to_open_reservations() {
        let fx = fixture();
        let v = vehicle(&fx, "hst_1", "Austin", 50).await;
        let r = book(&fx, &v.id, "2025-01-10", "2025-01-12").await;

        let updated = fx
            .reservations
            .update_details(
                &driver(),
                &r.id,
                ReservationDetails {
                    notes: Some("late pickup".into()),
                    driver_phone: Some("555-0199".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.notes.as_deref(), Some("late pickup"));
        assert_eq!(updated.contact.driver_phone.as_deref(), Some("555-0199"));
        assert_eq!(updated.total_amount, r.total_amount);

        fx.reservations.cancel(&driver(), &r.id).await.unwrap();
        let err = fx
            .reservations
            .update_details(
                &driver(),
                &r.id,
                ReservationDetails {
                    notes: Some("too late".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn payment_is_recorded_by_host_and_refunded_on_cancel() {
        let fx = fixture();
        let v = vehicle(&fx, "hst_1", "Austin", 50).await;
        let r = book(&fx, &v.id, "2025-01-10", "2025-01-12").await;

        assert!(matches!(
            fx.reservations
                .record_payment(&driver(), &r.id, PaymentStatus::Paid)
                .await,
            Err(DomainError::AccessDenied(_))
        ));

        let host = Principal::host("usr_h", "hst_1");
        let paid = fx
            .reservations
            .record_payment(&host, &r.id, PaymentStatus::Paid)
            .await
            .unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);

        let cancelled = fx.reservations.cancel(&host, &r.id).await.unwrap();
        assert_eq!(cancelled.payment_status, PaymentStatus::Refunded);
    }

    #[tokio::test]
    async fn list_filters_by_status_and_vehicle() {
        let fx = fixture();
        let v1 = vehicle(&fx, "hst_1", "Austin", 50).await;
        let v2 = vehicle(&fx, "hst_1", "Austin", 50).await;
        let a = book(&fx, &v1.id, "2025-01-10", "2025-01-12").await;
        book(&fx, &v2.id, "2025-01-10", "2025-01-12").await;
        fx.reservations.cancel(&driver(), &a.id).await.unwrap();

        let cancelled = fx
            .reservations
            .list(
                &driver(),
                ReservationFilter {
                    status: Some(ReservationStatus::Cancelled),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cancelled.len(), 1);
        assert_eq!(cancelled[0].id, a.id);

        let on_v2 = fx
            .reservations
            .list(
                &Principal::admin("root"),
                ReservationFilter {
                    vehicle_id: Some(v2.id.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(on_v2.len(), 1);
    }
}
