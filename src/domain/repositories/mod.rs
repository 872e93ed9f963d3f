//! Repository traits for the domain layer
//!
//! Contains:
//! - `Repository<T>`: generic persistence contract shared by every collection
//! - `RepositoryProvider`: unified access to the per-collection repositories
//! - `apply_patch`: the partial-update merge used by all implementations

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use super::profile::{Driver, Host};
use super::record::Record;
use super::reservation::Reservation;
use super::trip::Trip;
use super::vehicle::Vehicle;
use crate::shared::errors::{DomainError, DomainResult};
use crate::shared::id::new_id;

/// Fields a partial update may never overwrite
const IMMUTABLE_FIELDS: &[&str] = &["id", "createdAt"];

#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    /// All records in the collection, oldest first
    async fn list(&self) -> DomainResult<Vec<T>>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<T>>;

    /// Persist a new record; stamps `createdAt` and `updatedAt`.
    /// An empty id is replaced with a generated one; an existing id is a `Conflict`.
    async fn insert(&self, record: T) -> DomainResult<T>;

    /// Shallow-merge `patch` into the stored record; stamps `updatedAt`.
    /// Returns `None` when the record does not exist.
    async fn update(&self, id: &str, patch: Value) -> DomainResult<Option<T>>;

    /// Replace a stored record wholesale; stamps `updatedAt`.
    async fn save(&self, record: T) -> DomainResult<T>;

    /// Returns `true` when a record was removed.
    async fn delete(&self, id: &str) -> DomainResult<bool>;
}

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let vehicle = repos.vehicles().find_by_id("veh_1").await?;
///     let bookings = repos.reservations().list().await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn vehicles(&self) -> &dyn Repository<Vehicle>;
    fn reservations(&self) -> &dyn Repository<Reservation>;
    fn trips(&self) -> &dyn Repository<Trip>;
    fn hosts(&self) -> &dyn Repository<Host>;
    fn drivers(&self) -> &dyn Repository<Driver>;
}

/// Assign an id and creation stamps to a record about to be inserted.
pub fn prepare_insert<T: Record>(mut record: T) -> T {
    if record.id().is_empty() {
        record.set_id(new_id(T::ID_PREFIX));
    }
    record.stamp_created(Utc::now());
    record
}

/// Merge a JSON object patch into a record.
///
/// Keys in `IMMUTABLE_FIELDS` are ignored; `null` values clear optional fields.
pub fn apply_patch<T: Record>(record: &T, patch: Value) -> DomainResult<T> {
    let Value::Object(changes) = patch else {
        return Err(DomainError::Validation(
            "update payload must be a JSON object".to_string(),
        ));
    };

    let mut current = serde_json::to_value(record)
        .map_err(|e| DomainError::Storage(format!("encode {}: {}", T::COLLECTION, e)))?;
    let Some(fields) = current.as_object_mut() else {
        return Err(DomainError::Storage(format!(
            "{} record is not a JSON object",
            T::COLLECTION
        )));
    };

    for (key, value) in changes {
        if IMMUTABLE_FIELDS.contains(&key.as_str()) {
            continue;
        }
        fields.insert(key, value);
    }

    serde_json::from_value(current)
        .map_err(|e| DomainError::Validation(format!("invalid {} update: {}", T::COLLECTION, e)))
}
