//! Domain layer
//!
//! Entities, their state machines, the booking events they publish and the
//! repository contracts. Nothing in here performs I/O.

pub mod events;
pub mod principal;
pub mod profile;
pub mod record;
pub mod repositories;
pub mod reservation;
pub mod revenue;
pub mod trip;
pub mod vehicle;

pub use principal::{Principal, Role};
pub use profile::{Driver, Host, ServiceTier, SubscriptionStatus, VerificationStatus};
pub use record::Record;
pub use repositories::{Repository, RepositoryProvider};
pub use reservation::{
    BookingPeriod, ContactInfo, PaymentStatus, Reservation, ReservationStatus, StatusChange,
};
pub use revenue::{RevenueSummary, VehicleRevenue};
pub use trip::{Trip, TripIssue, TripStatus};
pub use vehicle::{Vehicle, VehicleListing, VehicleStatus};

pub use crate::shared::errors::{DomainError, DomainResult};
