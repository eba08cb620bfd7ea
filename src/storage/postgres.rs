//! Postgres-backed store.
//!
//! Factories and deliverables are kept as JSONB documents alongside the
//! columns the dashboard filters on; transitions follow the usual audit layout
//! with a per-entity `sort_key` and a `most_recent` flag. Schema lives in
//! `migrations/`.

use async_trait::async_trait;
use futures::TryStreamExt;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{DeliverableStore, FactoryStore, StorageResult};
use crate::models::{Deliverable, Factory, TransitionRecord};
use crate::state_machine::errors::{PersistenceError, PersistenceResult};
use crate::state_machine::TransitionPersistence;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl FactoryStore for PgStore {
    async fn save_factory(&self, factory: &Factory) -> StorageResult<Factory> {
        let row = sqlx::query(
            r#"
            INSERT INTO bundlr_factories
            (id, contract_id, template_id, status, document, started_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                document = EXCLUDED.document,
                updated_at = EXCLUDED.updated_at
            RETURNING document
            "#,
        )
        .bind(factory.id)
        .bind(&factory.contract_id)
        .bind(&factory.template_id)
        .bind(factory.status.as_str())
        .bind(Json(factory))
        .bind(factory.started_at)
        .bind(factory.last_updated)
        .fetch_one(&self.pool)
        .await?;

        let Json(saved): Json<Factory> = row.try_get("document")?;
        Ok(saved)
    }

    async fn load_factory(&self, factory_id: Uuid) -> StorageResult<Option<Factory>> {
        let row = sqlx::query("SELECT document FROM bundlr_factories WHERE id = $1")
            .bind(factory_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let Json(factory): Json<Factory> = row.try_get("document")?;
                Ok(Some(factory))
            }
            None => Ok(None),
        }
    }

    async fn list_factories(&self) -> StorageResult<Vec<Factory>> {
        let mut rows =
            sqlx::query("SELECT document FROM bundlr_factories ORDER BY updated_at DESC")
                .fetch(&self.pool);

        let mut factories = Vec::new();
        while let Some(row) = rows.try_next().await? {
            let Json(factory): Json<Factory> = row.try_get("document")?;
            factories.push(factory);
        }
        Ok(factories)
    }
}

#[async_trait]
impl DeliverableStore for PgStore {
    async fn save_deliverable(&self, deliverable: &Deliverable) -> StorageResult<Deliverable> {
        let row = sqlx::query(
            r#"
            INSERT INTO bundlr_deliverables
            (id, factory_id, client_id, status, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                document = EXCLUDED.document,
                updated_at = EXCLUDED.updated_at
            RETURNING document
            "#,
        )
        .bind(deliverable.id)
        .bind(deliverable.factory_id)
        .bind(deliverable.client_id)
        .bind(deliverable.status.as_str())
        .bind(Json(deliverable))
        .bind(deliverable.created_at)
        .bind(deliverable.updated_at)
        .fetch_one(&self.pool)
        .await?;

        let Json(saved): Json<Deliverable> = row.try_get("document")?;
        Ok(saved)
    }

    async fn load_deliverable(&self, deliverable_id: Uuid) -> StorageResult<Option<Deliverable>> {
        let row = sqlx::query("SELECT document FROM bundlr_deliverables WHERE id = $1")
            .bind(deliverable_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let Json(deliverable): Json<Deliverable> = row.try_get("document")?;
                Ok(Some(deliverable))
            }
            None => Ok(None),
        }
    }

    async fn delete_deliverable(&self, deliverable_id: Uuid) -> StorageResult<()> {
        sqlx::query("DELETE FROM bundlr_deliverables WHERE id = $1")
            .bind(deliverable_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_deliverables_for_factory(
        &self,
        factory_id: Uuid,
    ) -> StorageResult<Vec<Deliverable>> {
        let rows = sqlx::query(
            "SELECT document FROM bundlr_deliverables WHERE factory_id = $1 ORDER BY created_at",
        )
        .bind(factory_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let Json(deliverable): Json<Deliverable> = row.try_get("document")?;
                Ok(deliverable)
            })
            .collect()
    }
}

#[async_trait]
impl TransitionPersistence for PgStore {
    async fn persist_transition(
        &self,
        entity_type: &str,
        entity_id: &str,
        from_state: Option<String>,
        to_state: String,
        metadata: Option<Value>,
    ) -> PersistenceResult<TransitionRecord> {
        let save_failed = |e: sqlx::Error| PersistenceError::TransitionSaveFailed {
            reason: e.to_string(),
        };

        // Sort key and most_recent flags must move together
        let mut tx = self.pool.begin().await.map_err(save_failed)?;

        let row = sqlx::query(
            r#"
            SELECT COALESCE(MAX(sort_key), 0) + 1 AS next_sort_key
            FROM bundlr_transitions
            WHERE entity_type = $1 AND entity_id = $2
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(save_failed)?;
        let sort_key: i32 = row.try_get("next_sort_key").map_err(save_failed)?;

        let record = TransitionRecord::new(
            entity_type,
            entity_id,
            from_state,
            to_state,
            sort_key,
            metadata,
        );

        sqlx::query(
            r#"
            UPDATE bundlr_transitions
            SET most_recent = false
            WHERE entity_type = $1 AND entity_id = $2 AND most_recent = true
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .execute(&mut *tx)
        .await
        .map_err(save_failed)?;

        sqlx::query(
            r#"
            INSERT INTO bundlr_transitions
            (id, entity_type, entity_id, from_state, to_state, sort_key, most_recent, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, true, $7, $8)
            "#,
        )
        .bind(record.id)
        .bind(&record.entity_type)
        .bind(&record.entity_id)
        .bind(&record.from_state)
        .bind(&record.to_state)
        .bind(record.sort_key)
        .bind(&record.metadata)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        .map_err(save_failed)?;

        tx.commit().await.map_err(save_failed)?;
        Ok(record)
    }

    async fn transition_history(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> PersistenceResult<Vec<TransitionRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, entity_type, entity_id, from_state, to_state, sort_key, metadata, created_at
            FROM bundlr_transitions
            WHERE entity_type = $1 AND entity_id = $2
            ORDER BY sort_key
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PersistenceError::Storage(e.into()))?;

        rows.into_iter()
            .map(|row| -> Result<TransitionRecord, sqlx::Error> {
                Ok(TransitionRecord {
                    id: row.try_get("id")?,
                    entity_type: row.try_get("entity_type")?,
                    entity_id: row.try_get("entity_id")?,
                    from_state: row.try_get("from_state")?,
                    to_state: row.try_get("to_state")?,
                    sort_key: row.try_get("sort_key")?,
                    metadata: row.try_get("metadata")?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PersistenceError::Storage(e.into()))
    }
}
