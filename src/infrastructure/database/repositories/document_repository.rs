//! SeaORM implementation of the generic Repository over the documents table

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::Value;

use crate::domain::record::Record;
use crate::domain::repositories::{apply_patch, prepare_insert, Repository};
use crate::infrastructure::database::entities::document;
use crate::shared::errors::{DomainError, DomainResult, InfraError};

pub struct SeaOrmDocumentRepository<T: Record> {
    db: DatabaseConnection,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> SeaOrmDocumentRepository<T> {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _marker: PhantomData,
        }
    }

    async fn find_model(&self, id: &str) -> DomainResult<Option<document::Model>> {
        document::Entity::find_by_id((T::COLLECTION.to_string(), id.to_string()))
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    async fn write_data(&self, record: &T) -> DomainResult<()> {
        let model = document::ActiveModel {
            collection: Set(T::COLLECTION.to_string()),
            id: Set(record.id().to_string()),
            data: Set(encode(record)?),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        model.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn db_err(e: sea_orm::DbErr) -> DomainError {
    InfraError::Database(e).into()
}

fn encode<T: Record>(record: &T) -> DomainResult<String> {
    serde_json::to_string(record).map_err(|e| InfraError::Serialization(e).into())
}

fn decode<T: Record>(m: &document::Model) -> Result<T, serde_json::Error> {
    serde_json::from_str(&m.data)
}

// ── Repository impl ─────────────────────────────────────────────

#[async_trait]
impl<T: Record> Repository<T> for SeaOrmDocumentRepository<T> {
    async fn list(&self) -> DomainResult<Vec<T>> {
        let models = document::Entity::find()
            .filter(document::Column::Collection.eq(T::COLLECTION))
            .order_by_asc(document::Column::CreatedAt)
            .order_by_asc(document::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models
            .iter()
            .filter_map(|m| match decode::<T>(m) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(
                        "Skipping undecodable {} document {}: {}",
                        T::COLLECTION,
                        m.id,
                        e
                    );
                    None
                }
            })
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<T>> {
        match self.find_model(id).await? {
            Some(m) => decode(&m)
                .map(Some)
                .map_err(|e| InfraError::Serialization(e).into()),
            None => Ok(None),
        }
    }

    async fn insert(&self, record: T) -> DomainResult<T> {
        let record = prepare_insert(record);
        debug!("Inserting {} {}", T::COLLECTION, record.id());

        if self.find_model(record.id()).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "{} {} already exists",
                T::COLLECTION,
                record.id()
            )));
        }

        let model = document::ActiveModel {
            collection: Set(T::COLLECTION.to_string()),
            id: Set(record.id().to_string()),
            data: Set(encode(&record)?),
            created_at: Set(record.created_at()),
            updated_at: Set(record.created_at()),
        };
        model.insert(&self.db).await.map_err(db_err)?;
        Ok(record)
    }

    async fn update(&self, id: &str, patch: Value) -> DomainResult<Option<T>> {
        let Some(current) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        debug!("Patching {} {}", T::COLLECTION, id);

        let mut merged = apply_patch(&current, patch)?;
        merged.stamp_updated(Utc::now());
        self.write_data(&merged).await?;
        Ok(Some(merged))
    }

    async fn save(&self, mut record: T) -> DomainResult<T> {
        if self.find_model(record.id()).await?.is_none() {
            return Err(DomainError::not_found(T::COLLECTION, record.id()));
        }
        debug!("Saving {} {}", T::COLLECTION, record.id());

        record.stamp_updated(Utc::now());
        self.write_data(&record).await?;
        Ok(record)
    }

    async fn delete(&self, id: &str) -> DomainResult<bool> {
        let result = document::Entity::delete_by_id((T::COLLECTION.to_string(), id.to_string()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }
}
