pub mod bookings;
pub mod health;
pub mod metrics;
pub mod profiles;
pub mod request_id;
pub mod reservations;
pub mod revenue;
pub mod trips;
pub mod vehicles;
