//! In-memory storage implementation

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::Value;

use crate::domain::profile::{Driver, Host};
use crate::domain::record::Record;
use crate::domain::repositories::{apply_patch, prepare_insert, Repository, RepositoryProvider};
use crate::domain::reservation::Reservation;
use crate::domain::trip::Trip;
use crate::domain::vehicle::Vehicle;
use crate::shared::errors::{DomainError, DomainResult};

/// One collection held in a concurrent map, for development and testing
pub struct InMemoryRepository<T: Record> {
    records: DashMap<String, T>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            _marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T: Record> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> Repository<T> for InMemoryRepository<T> {
    async fn list(&self) -> DomainResult<Vec<T>> {
        let mut all: Vec<T> = self.records.iter().map(|r| r.value().clone()).collect();
        all.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(all)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<T>> {
        Ok(self.records.get(id).map(|r| r.value().clone()))
    }

    async fn insert(&self, record: T) -> DomainResult<T> {
        let record = prepare_insert(record);
        match self.records.entry(record.id().to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(DomainError::Conflict(format!(
                "{} {} already exists",
                T::COLLECTION,
                record.id()
            ))),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn update(&self, id: &str, patch: Value) -> DomainResult<Option<T>> {
        let Some(mut entry) = self.records.get_mut(id) else {
            return Ok(None);
        };
        let mut merged = apply_patch(entry.value(), patch)?;
        merged.stamp_updated(Utc::now());
        *entry = merged.clone();
        Ok(Some(merged))
    }

    async fn save(&self, mut record: T) -> DomainResult<T> {
        let Some(mut entry) = self.records.get_mut(record.id()) else {
            return Err(DomainError::not_found(T::COLLECTION, record.id()));
        };
        record.stamp_updated(Utc::now());
        *entry = record.clone();
        Ok(record)
    }

    async fn delete(&self, id: &str) -> DomainResult<bool> {
        Ok(self.records.remove(id).is_some())
    }
}

/// All collections in memory
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    vehicles: InMemoryRepository<Vehicle>,
    reservations: InMemoryRepository<Reservation>,
    trips: InMemoryRepository<Trip>,
    hosts: InMemoryRepository<Host>,
    drivers: InMemoryRepository<Driver>,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
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
