//! Application services

mod availability;
mod keyed_locks;
mod profile;
mod reservation;
mod revenue;
mod trip;
mod vehicle;

#[cfg(test)]
pub(crate) mod testing;

pub use availability::AvailabilityService;
pub use keyed_locks::{KeyGuard, KeyedLocks};
pub use profile::{NewDriver, NewHost, ProfileService};
pub use reservation::{NewReservation, ReservationDetails, ReservationFilter, ReservationService};
pub use revenue::RevenueService;
pub use trip::{TripFilter, TripService};
pub use vehicle::{NewVehicle, VehicleService};
