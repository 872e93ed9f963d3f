//! Host revenue rollup
//!
//! Pure aggregation over reservations and trips. The caller supplies records
//! already scoped to one host.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::reservation::{PaymentStatus, Reservation, ReservationStatus};
use crate::domain::trip::{Trip, TripStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: usize,
    pub confirmed: usize,
    pub active: usize,
    pub completed: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    fn bump(&mut self, status: ReservationStatus) {
        match status {
            ReservationStatus::Pending => self.pending += 1,
            ReservationStatus::Confirmed => self.confirmed += 1,
            ReservationStatus::Active => self.active += 1,
            ReservationStatus::Completed => self.completed += 1,
            ReservationStatus::Cancelled => self.cancelled += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.confirmed + self.active + self.completed + self.cancelled
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRevenue {
    pub vehicle_id: String,
    /// Non-cancelled reservations
    pub bookings: usize,
    /// Completed reservation totals
    pub revenue: Decimal,
    pub days_booked: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub host_id: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub reservations: StatusCounts,
    /// Sum over completed reservations
    pub gross_revenue: Decimal,
    /// Sum over pending, confirmed and active reservations
    pub pipeline_revenue: Decimal,
    /// Sum over reservations whose payment is settled
    pub paid_revenue: Decimal,
    pub completed_trips: usize,
    pub total_distance: u64,
    pub issues_reported: usize,
    pub vehicles: Vec<VehicleRevenue>,
}

fn in_window(date: NaiveDate, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t)
}

/// Roll up `reservations` and `trips` for `host_id`. The window, when given,
/// applies inclusively to each reservation's pickup date; trips follow their
/// reservation.
pub fn summarize(
    host_id: &str,
    reservations: &[Reservation],
    trips: &[Trip],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> RevenueSummary {
    let mut counts = StatusCounts::default();
    let mut gross = Decimal::ZERO;
    let mut pipeline = Decimal::ZERO;
    let mut paid = Decimal::ZERO;
    let mut per_vehicle: BTreeMap<&str, VehicleRevenue> = BTreeMap::new();
    let mut booking_ids: HashSet<&str> = HashSet::new();

    for r in reservations
        .iter()
        .filter(|r| r.host_id == host_id && in_window(r.pickup_date, from, to))
    {
        booking_ids.insert(&r.id);
        counts.bump(r.status);

        let entry = per_vehicle
            .entry(r.vehicle_id.as_str())
            .or_insert_with(|| VehicleRevenue {
                vehicle_id: r.vehicle_id.clone(),
                bookings: 0,
                revenue: Decimal::ZERO,
                days_booked: 0,
            });

        match r.status {
            ReservationStatus::Completed => {
                gross += r.total_amount;
                entry.revenue += r.total_amount;
            }
            ReservationStatus::Pending | ReservationStatus::Confirmed | ReservationStatus::Active => {
                pipeline += r.total_amount;
            }
            ReservationStatus::Cancelled => {}
        }
        if r.status != ReservationStatus::Cancelled {
            entry.bookings += 1;
            entry.days_booked += r.number_of_days;
        }
        if r.payment_status == PaymentStatus::Paid {
            paid += r.total_amount;
        }
    }

    let mut completed_trips = 0;
    let mut total_distance = 0u64;
    let mut issues_reported = 0;
    for t in trips
        .iter()
        .filter(|t| t.host_id == host_id && booking_ids.contains(t.booking_id.as_str()))
    {
        if t.status == TripStatus::Completed {
            completed_trips += 1;
        }
        total_distance += t.distance().map(u64::from).unwrap_or(0);
        issues_reported += t.issues.len();
    }

    let mut vehicles: Vec<VehicleRevenue> = per_vehicle.into_values().collect();
    vehicles.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| a.vehicle_id.cmp(&b.vehicle_id))
    });

    RevenueSummary {
        host_id: host_id.to_string(),
        from,
        to,
        reservations: counts,
        gross_revenue: gross,
        pipeline_revenue: pipeline,
        paid_revenue: paid,
        completed_trips,
        total_distance,
        issues_reported,
        vehicles,
    }
}
