use crate::model::{CustomField, CustomFieldOption, CustomFieldValue, Id, Resource};
use anyhow::Result;

/// Generic mirror table for fetched resources, upserted by (kind, id).
#[async_trait::async_trait]
pub trait ResourceStore: Send + Sync {
    /// Upsert fetched resources. Returns the number of rows written.
    async fn upsert_resources(&self, kind: &str, resources: &[Resource]) -> Result<u64>;
    async fn count_resources(&self, kind: &str) -> Result<i64>;
}

/// Typed custom-field catalog plus the resolved value rows.
#[async_trait::async_trait]
pub trait CustomFieldStore: Send + Sync {
    async fn upsert_custom_fields(&self, fields: &[CustomField]) -> Result<()>;
    async fn upsert_custom_field_options(&self, options: &[CustomFieldOption]) -> Result<()>;
    async fn get_custom_field(&self, id: &Id) -> Result<Option<CustomField>>;
    async fn get_custom_field_option(&self, id: &Id) -> Result<Option<CustomFieldOption>>;
    /// Atomically delete and reinsert the resolved rows for one entity; on
    /// failure the prior rows survive.
    async fn replace_custom_field_values(
        &self,
        entity_id: &Id,
        entity_type: &str,
        rows: Vec<CustomFieldValue>,
    ) -> Result<()>;
    async fn list_custom_field_values(
        &self,
        entity_id: &Id,
        entity_type: &str,
    ) -> Result<Vec<CustomFieldValue>>;
}

pub trait MirrorStore: ResourceStore + CustomFieldStore + Send + Sync {}
impl<T: ResourceStore + CustomFieldStore + Send + Sync> MirrorStore for T {}
