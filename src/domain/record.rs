//! Stored record contract
//!
//! Every persisted entity is a JSON document living in a named collection.
//! The generic repositories only need to know the collection, the id and
//! how to stamp the timestamps.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection (table partition) name
    const COLLECTION: &'static str;
    /// Prefix used when generating identifiers
    const ID_PREFIX: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    fn created_at(&self) -> DateTime<Utc>;

    fn stamp_created(&mut self, at: DateTime<Utc>);

    fn stamp_updated(&mut self, at: DateTime<Utc>);
}

/// Implements [`Record`] for a struct with `id`, `created_at` and `updated_at` fields.
macro_rules! impl_record {
    ($ty:ty, $collection:literal, $prefix:literal) => {
        impl $crate::domain::record::Record for $ty {
            const COLLECTION: &'static str = $collection;
            const ID_PREFIX: &'static str = $prefix;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }

            fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
                self.created_at
            }

            fn stamp_created(&mut self, at: chrono::DateTime<chrono::Utc>) {
                self.created_at = at;
                self.updated_at = at;
            }

            fn stamp_updated(&mut self, at: chrono::DateTime<chrono::Utc>) {
                self.updated_at = at;
            }
        }
    };
}

pub(crate) use impl_record;
