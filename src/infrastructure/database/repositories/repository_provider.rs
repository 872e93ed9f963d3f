//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::profile::{Driver, Host};
use crate::domain::repositories::{Repository, RepositoryProvider};
use crate::domain::reservation::Reservation;
use crate::domain::trip::Trip;
use crate::domain::vehicle::Vehicle;

use super::document_repository::SeaOrmDocumentRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-collection repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let vehicle = repos.vehicles().find_by_id("veh_1736500000000_k3v9q0xa").await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    vehicles: SeaOrmDocumentRepository<Vehicle>,
    reservations: SeaOrmDocumentRepository<Reservation>,
    trips: SeaOrmDocumentRepository<Trip>,
    hosts: SeaOrmDocumentRepository<Host>,
    drivers: SeaOrmDocumentRepository<Driver>,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            vehicles: SeaOrmDocumentRepository::new(db.clone()),
            reservations: SeaOrmDocumentRepository::new(db.clone()),
            trips: SeaOrmDocumentRepository::new(db.clone()),
            hosts: SeaOrmDocumentRepository::new(db.clone()),
            drivers: SeaOrmDocumentRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn vehicles(&self) -> &dyn Repository<Vehicle> {
        &self.vehicles
    }

    fn reservations(&self) -> &dyn Repository<Reservation> {
        &self.reservations
    }

    fn trips(&self) -> &dyn Repository<Trip> {
        &self.trips
    }

    fn hosts(&self) -> &dyn Repository<Host> {
        &self.hosts
    }

    fn drivers(&self) -> &dyn Repository<Driver> {
        &self.drivers
    }
}
