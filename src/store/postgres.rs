use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use crate::model::{CustomField, CustomFieldOption, CustomFieldValue, Id, Resource};
use crate::store::traits::{CustomFieldStore, ResourceStore};

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS resources (
        kind TEXT NOT NULL,
        id TEXT NOT NULL,
        attributes JSONB NOT NULL DEFAULT '{}'::jsonb,
        relationships JSONB NOT NULL DEFAULT '{}'::jsonb,
        synced_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        PRIMARY KEY (kind, id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS custom_fields (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        data_type TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS custom_field_options (
        id TEXT PRIMARY KEY,
        custom_field_id TEXT,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS custom_field_values (
        entity_id TEXT NOT NULL,
        entity_type TEXT NOT NULL,
        custom_field_id TEXT NOT NULL,
        custom_field_option_id TEXT,
        custom_field_name TEXT NOT NULL,
        custom_field_value TEXT NOT NULL,
        raw_value TEXT NOT NULL,
        resolved_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_custom_field_values_entity
        ON custom_field_values (entity_type, entity_id)
    "#,
];

/// PostgreSQL-backed mirror store.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store with the given database URL.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Create the mirror tables if they do not exist. Inline DDL so the
    /// binary never needs compile-time database access.
    pub async fn migrate(&self) -> Result<()> {
        for statement in MIGRATIONS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to run schema migration")?;
        }
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl ResourceStore for PostgresStore {
    async fn upsert_resources(&self, kind: &str, resources: &[Resource]) -> Result<u64> {
        let mut written = 0u64;
        for resource in resources {
            let attributes = serde_json::Value::Object(resource.attributes.clone());
            let relationships = serde_json::to_value(&resource.relationships)
                .context("Failed to serialize relationships")?;

            sqlx::query(
                r#"
                INSERT INTO resources (kind, id, attributes, relationships, synced_at)
                VALUES ($1, $2, $3, $4, NOW())
                ON CONFLICT (kind, id) DO UPDATE SET
                    attributes = EXCLUDED.attributes,
                    relationships = EXCLUDED.relationships,
                    synced_at = NOW()
                "#,
            )
            .bind(kind)
            .bind(&resource.id)
            .bind(attributes)
            .bind(relationships)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to upsert {} {}", kind, resource.id))?;

            written += 1;
        }

        Ok(written)
    }

    async fn count_resources(&self, kind: &str) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM resources WHERE kind = $1")
            .bind(kind)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count resources")?;

        Ok(row.get("count"))
    }
}

#[async_trait::async_trait]
impl CustomFieldStore for PostgresStore {
    async fn upsert_custom_fields(&self, fields: &[CustomField]) -> Result<()> {
        for field in fields {
            sqlx::query(
                r#"
                INSERT INTO custom_fields (id, name, data_type)
                VALUES ($1, $2, $3)
                ON CONFLICT (id) DO UPDATE SET
                    name = EXCLUDED.name,
                    data_type = EXCLUDED.data_type
                "#,
            )
            .bind(&field.id)
            .bind(&field.name)
            .bind(&field.data_type)
            .execute(&self.pool)
            .await
            .context("Failed to upsert custom field")?;
        }
        Ok(())
    }

    async fn upsert_custom_field_options(&self, options: &[CustomFieldOption]) -> Result<()> {
        for option in options {
            sqlx::query(
                r#"
                INSERT INTO custom_field_options (id, custom_field_id, name)
                VALUES ($1, $2, $3)
                ON CONFLICT (id) DO UPDATE SET
                    custom_field_id = EXCLUDED.custom_field_id,
                    name = EXCLUDED.name
                "#,
            )
            .bind(&option.id)
            .bind(&option.custom_field_id)
            .bind(&option.name)
            .execute(&self.pool)
            .await
            .context("Failed to upsert custom field option")?;
        }
        Ok(())
    }

    async fn get_custom_field(&self, id: &Id) -> Result<Option<CustomField>> {
        let row = sqlx::query("SELECT id, name, data_type FROM custom_fields WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch custom field")?;

        Ok(row.map(|row| CustomField {
            id: row.get("id"),
            name: row.get("name"),
            data_type: row.get("data_type"),
        }))
    }

    async fn get_custom_field_option(&self, id: &Id) -> Result<Option<CustomFieldOption>> {
        let row = sqlx::query(
            "SELECT id, custom_field_id, name FROM custom_field_options WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch custom field option")?;

        Ok(row.map(|row| CustomFieldOption {
            id: row.get("id"),
            custom_field_id: row.get("custom_field_id"),
            name: row.get("name"),
        }))
    }

    async fn replace_custom_field_values(
        &self,
        entity_id: &Id,
        entity_type: &str,
        rows: Vec<CustomFieldValue>,
    ) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query("DELETE FROM custom_field_values WHERE entity_type = $1 AND entity_id = $2")
            .bind(entity_type)
            .bind(entity_id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete previous custom field values")?;

        for row in &rows {
            sqlx::query(
                r#"
                INSERT INTO custom_field_values
                    (entity_id, entity_type, custom_field_id, custom_field_option_id,
                     custom_field_name, custom_field_value, raw_value, resolved_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(&row.entity_id)
            .bind(&row.entity_type)
            .bind(&row.custom_field_id)
            .bind(&row.custom_field_option_id)
            .bind(&row.custom_field_name)
            .bind(&row.custom_field_value)
            .bind(&row.raw_value)
            .bind(row.resolved_at)
            .execute(&mut *tx)
            .await
            .context("Failed to insert custom field value")?;
        }

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(())
    }

    async fn list_custom_field_values(
        &self,
        entity_id: &Id,
        entity_type: &str,
    ) -> Result<Vec<CustomFieldValue>> {
        let rows = sqlx::query(
            r#"
            SELECT entity_id, entity_type, custom_field_id, custom_field_option_id,
                   custom_field_name, custom_field_value, raw_value, resolved_at
            FROM custom_field_values
            WHERE entity_type = $1 AND entity_id = $2
            ORDER BY custom_field_id
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list custom field values")?;

        Ok(rows
            .into_iter()
            .map(|row| CustomFieldValue {
                entity_id: row.get("entity_id"),
                entity_type: row.get("entity_type"),
                custom_field_id: row.get("custom_field_id"),
                custom_field_option_id: row.get("custom_field_option_id"),
                custom_field_name: row.get("custom_field_name"),
                custom_field_value: row.get("custom_field_value"),
                raw_value: row.get("raw_value"),
                resolved_at: row.get("resolved_at"),
            })
            .collect())
    }
}
