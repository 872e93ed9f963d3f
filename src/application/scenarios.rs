//! End-to-end booking scenarios over the in-memory store

use rust_decimal::Decimal;

use crate::application::services::testing::{book, driver, drain, fixture, host, vehicle};
use crate::application::services::NewReservation;
use crate::domain::repositories::{Repository, RepositoryProvider};
use crate::domain::reservation::{ContactInfo, ReservationStatus};
use crate::domain::trip::{PickupReport, ReturnReport};
use crate::domain::vehicle::VehicleStatus;
use crate::shared::errors::DomainError;

fn request(vehicle_id: &str, start: &str, end: &str) -> NewReservation {
    NewReservation {
        vehicle_id: vehicle_id.to_string(),
        pickup_date: start.to_string(),
        return_date: end.to_string(),
        contact: ContactInfo {
            driver_name: "Sam".into(),
            driver_email: "sam@example.com".into(),
            driver_phone: None,
        },
        notes: None,
    }
}

#[tokio::test]
async fn scenario_a_two_day_booking_costs_two_days() {
    let fx = fixture();
    let v = vehicle(&fx, "hst_1", "Austin", 50).await;
    let r = book(&fx, &v.id, "2025-01-10", "2025-01-12").await;
    assert_eq!(r.total_amount, Decimal::from(100));
    assert_eq!(r.status, ReservationStatus::Pending);
}

#[tokio::test]
async fn scenario_b_confirmed_slot_blocks_overlap() {
    let fx = fixture();
    let v = vehicle(&fx, "hst_1", "Austin", 50).await;
    let r = book(&fx, &v.id, "2025-01-10", "2025-01-12").await;
    fx.reservations
        .transition(&host(), &r.id, ReservationStatus::Confirmed)
        .await
        .unwrap();
    drain(&fx).await;

    let err = fx
        .reservations
        .create(&driver(), request(&v.id, "2025-01-11", "2025-01-13"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::VehicleUnavailable { .. }));
}

#[tokio::test]
async fn scenario_c_cancel_then_rebook() {
    let fx = fixture();
    let v = vehicle(&fx, "hst_1", "Austin", 50).await;
    let r = book(&fx, &v.id, "2025-01-10", "2025-01-12").await;
    fx.reservations.cancel(&driver(), &r.id).await.unwrap();
    drain(&fx).await;

    let again = fx
        .reservations
        .create(&driver(), request(&v.id, "2025-01-11", "2025-01-13"))
        .await
        .unwrap();
    assert_eq!(again.total_amount, Decimal::from(100));
}

#[tokio::test]
async fn scenario_d_trip_guards() {
    let fx = fixture();
    let v = vehicle(&fx, "hst_1", "Austin", 50).await;
    let r = book(&fx, &v.id, "2025-01-10", "2025-01-12").await;
    fx.reservations
        .transition(&host(), &r.id, ReservationStatus::Confirmed)
        .await
        .unwrap();
    drain(&fx).await;

    let trip = fx
        .trips
        .list(&host(), Default::default())
        .await
        .unwrap()
        .pop()
        .unwrap();
    let pickup = || PickupReport {
        mileage: Some(1000),
        ..Default::default()
    };
    fx.trips.start(&driver(), &trip.id, pickup()).await.unwrap();
    assert!(matches!(
        fx.trips.start(&driver(), &trip.id, pickup()).await,
        Err(DomainError::InvalidTransition { .. })
    ));
    assert!(matches!(
        fx.trips
            .complete(
                &driver(),
                &trip.id,
                ReturnReport {
                    mileage: Some(950),
                    ..Default::default()
                }
            )
            .await,
        Err(DomainError::InvalidMileage { .. })
    ));
}

#[tokio::test]
async fn scenario_e_open_window_lists_all_available() {
    let fx = fixture();
    vehicle(&fx, "hst_1", "Austin", 50).await;
    vehicle(&fx, "hst_2", "Boston", 65).await;
    let mut parked = vehicle(&fx, "hst_2", "Boston", 65).await;
    parked.status = VehicleStatus::Inactive;
    fx.repos.vehicles().save(parked).await.unwrap();

    let found = fx
        .availability
        .find_available("2025-06-01", "2025-06-05", None)
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|l| l.status == VehicleStatus::Available));
}
