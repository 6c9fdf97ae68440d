use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::{Entity, Record, RecordId};
use crate::store::{RemoteStore, Row, StoreError};

/// Typed facade over one entity's collection. Translates store failures into
/// the messages the user sees.
pub struct Gateway<T: Entity> {
    store: Arc<dyn RemoteStore>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for Gateway<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> Gateway<T> {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub async fn list(&self) -> Result<Vec<Record<T>>, AppError> {
        let d = T::descriptor();
        let rows = self
            .store
            .list(d.table, d.order_by)
            .await
            .map_err(|e| self.translate(e))?;
        rows.into_iter().map(decode).collect()
    }

    /// Empty or blank terms list everything.
    pub async fn search(&self, term: &str) -> Result<Vec<Record<T>>, AppError> {
        let term = term.trim();
        if term.is_empty() {
            return self.list().await;
        }

        let d = T::descriptor();
        let rows = self
            .store
            .search(d.table, d.search_columns, term, d.order_by)
            .await
            .map_err(|e| self.translate(e))?;
        rows.into_iter().map(decode).collect()
    }

    pub async fn create(&self, entity: &T) -> Result<Record<T>, AppError> {
        let d = T::descriptor();
        let row = self
            .store
            .insert(d.table, &encode(entity)?)
            .await
            .map_err(|e| self.translate(e))?;
        let record = decode(row)?;
        info!("created {} {}", d.lower_singular(), record.id);
        Ok(record)
    }

    pub async fn update(&self, id: RecordId, entity: &T) -> Result<Record<T>, AppError> {
        let d = T::descriptor();
        let row = self
            .store
            .update(d.table, id, &encode(entity)?)
            .await
            .map_err(|e| self.translate(e))?;
        info!("updated {} {}", d.lower_singular(), id);
        decode(row)
    }

    pub async fn delete(&self, id: RecordId) -> Result<(), AppError> {
        let d = T::descriptor();
        self.store
            .delete(d.table, id)
            .await
            .map_err(|e| self.translate(e))?;
        info!("deleted {} {}", d.lower_singular(), id);
        Ok(())
    }

    pub async fn get(&self, id: RecordId) -> Result<Record<T>, AppError> {
        let d = T::descriptor();
        let row = self
            .store
            .get(d.table, id)
            .await
            .map_err(|e| self.translate(e))?;
        decode(row)
    }

    fn translate(&self, err: StoreError) -> AppError {
        let d = T::descriptor();
        warn!("{} store call failed: {}", d.table, err);

        match err {
            StoreError::NotFound => AppError::NotFound,
            StoreError::UniqueViolation { .. } => {
                let known = err
                    .unique_field(d.table)
                    .filter(|field| d.unique_fields.contains(field))
                    .and_then(|field| d.field(field));
                match known {
                    Some(field) => AppError::Conflict(format!(
                        "Ya existe un {} con este {}",
                        d.lower_singular(),
                        field.label
                    )),
                    None => AppError::Store(err.to_string()),
                }
            }
            other => AppError::Store(other.to_string()),
        }
    }
}

fn encode<T: Entity>(entity: &T) -> Result<Row, AppError> {
    match serde_json::to_value(entity) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(_) => Err(AppError::Store(format!(
            "{} did not serialize to an object",
            T::descriptor().singular
        ))),
        Err(e) => Err(AppError::Store(e.to_string())),
    }
}

fn decode<T: Entity>(row: Row) -> Result<Record<T>, AppError> {
    serde_json::from_value(Value::Object(row)).map_err(|e| {
        AppError::Store(format!(
            "Respuesta inválida para {}: {}",
            T::descriptor().plural,
            e
        ))
    })
}
