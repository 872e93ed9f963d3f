//! Host and driver profile records

pub mod model;

pub use model::{Driver, Host, ServiceTier, SubscriptionStatus, VerificationStatus};
