use anyhow::Result;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::model::{CustomField, CustomFieldOption, CustomFieldValue, Id, Resource};
use crate::store::traits::{CustomFieldStore, ResourceStore};

/// In-memory mirror store, used by tests and `--dry-run` sync runs.
#[derive(Default)]
pub struct MemoryStore {
    resources: RwLock<HashMap<(String, Id), Resource>>,
    custom_fields: RwLock<HashMap<Id, CustomField>>,
    custom_field_options: RwLock<HashMap<Id, CustomFieldOption>>,
    custom_field_values: RwLock<Vec<CustomFieldValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_custom_field(&self, field: CustomField) {
        self.custom_fields.write().insert(field.id.clone(), field);
    }

    pub fn insert_custom_field_option(&self, option: CustomFieldOption) {
        self.custom_field_options
            .write()
            .insert(option.id.clone(), option);
    }
}

#[async_trait::async_trait]
impl ResourceStore for MemoryStore {
    async fn upsert_resources(&self, kind: &str, resources: &[Resource]) -> Result<u64> {
        let mut table = self.resources.write();
        for resource in resources {
            table.insert((kind.to_string(), resource.id.clone()), resource.clone());
        }
        Ok(resources.len() as u64)
    }

    async fn count_resources(&self, kind: &str) -> Result<i64> {
        let table = self.resources.read();
        Ok(table.keys().filter(|(k, _)| k == kind).count() as i64)
    }
}

#[async_trait::async_trait]
impl CustomFieldStore for MemoryStore {
    async fn upsert_custom_fields(&self, fields: &[CustomField]) -> Result<()> {
        let mut table = self.custom_fields.write();
        for field in fields {
            table.insert(field.id.clone(), field.clone());
        }
        Ok(())
    }

    async fn upsert_custom_field_options(&self, options: &[CustomFieldOption]) -> Result<()> {
        let mut table = self.custom_field_options.write();
        for option in options {
            table.insert(option.id.clone(), option.clone());
        }
        Ok(())
    }

    async fn get_custom_field(&self, id: &Id) -> Result<Option<CustomField>> {
        Ok(self.custom_fields.read().get(id).cloned())
    }

    async fn get_custom_field_option(&self, id: &Id) -> Result<Option<CustomFieldOption>> {
        Ok(self.custom_field_options.read().get(id).cloned())
    }

    async fn replace_custom_field_values(
        &self,
        entity_id: &Id,
        entity_type: &str,
        rows: Vec<CustomFieldValue>,
    ) -> Result<()> {
        let mut table = self.custom_field_values.write();
        table.retain(|row| !(row.entity_type == entity_type && &row.entity_id == entity_id));
        table.extend(rows);
        Ok(())
    }

    async fn list_custom_field_values(
        &self,
        entity_id: &Id,
        entity_type: &str,
    ) -> Result<Vec<CustomFieldValue>> {
        let mut rows: Vec<CustomFieldValue> = self
            .custom_field_values
            .read()
            .iter()
            .filter(|row| row.entity_type == entity_type && &row.entity_id == entity_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.custom_field_id.cmp(&b.custom_field_id));
        Ok(rows)
    }
}
