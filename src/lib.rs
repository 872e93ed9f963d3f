//! # Fleet Booking Core
//!
//! Availability, reservation and trip management for a peer-to-peer
//! vehicle rental marketplace.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Vehicles, reservations, trips and profiles with their state machines
//! - **application**: Booking services, the event bus and the cascade reactor
//! - **infrastructure**: Storage backends (SeaORM/SQLite, in-memory) and JWT
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: Process lifecycle, tracing and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use application::{create_event_bus, BookingCore, BookingOptions, Event, EventBus, SharedEventBus};

// Re-export storage backends for easy access
pub use infrastructure::{init_database, DatabaseConfig, InMemoryRepositoryProvider, SeaOrmRepositoryProvider};

// Re-export API router
pub use interfaces::{create_api_router, ApiContext};
