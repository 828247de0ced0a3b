use crate::model::{CustomFieldValue, Id};
use crate::store::CustomFieldStore;
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;

/// Resolves one entity's raw custom-field map into denormalized value rows,
/// replacing any previous resolution for that entity in one store
/// transaction. A failure anywhere leaves the prior rows intact and
/// propagates to the caller; callers iterate entities independently.
pub struct CustomFieldResolver;

impl CustomFieldResolver {
    /// Returns the number of rows written. An empty map is a no-op that
    /// leaves existing rows untouched.
    pub async fn resolve_entity<S: CustomFieldStore + ?Sized>(
        store: &S,
        entity_id: &Id,
        entity_type: &str,
        custom_fields: &serde_json::Map<String, Value>,
    ) -> Result<usize> {
        if custom_fields.is_empty() {
            return Ok(0);
        }

        let mut rows = Vec::with_capacity(custom_fields.len());
        for (field_id, raw) in custom_fields {
            if raw.is_null() {
                continue;
            }

            let Some(field) = store.get_custom_field(field_id).await? else {
                log::warn!(
                    "custom field {} not found, skipping value on {} {}",
                    field_id,
                    entity_type,
                    entity_id
                );
                continue;
            };

            let raw_value = raw_to_string(raw);
            let (custom_field_value, custom_field_option_id) = match option_id_candidate(raw) {
                Some(candidate) => match store.get_custom_field_option(&candidate).await? {
                    Some(option) => (option.name, Some(option.id)),
                    None => {
                        log::warn!(
                            "no option {} for custom field {} on {} {}, keeping raw value",
                            candidate,
                            field_id,
                            entity_type,
                            entity_id
                        );
                        (raw_value.clone(), None)
                    }
                },
                // Non-numeric values are stored as-is, no lookup attempted
                None => (raw_value.clone(), None),
            };

            rows.push(CustomFieldValue {
                entity_id: entity_id.clone(),
                entity_type: entity_type.to_string(),
                custom_field_id: field_id.clone(),
                custom_field_option_id,
                custom_field_name: field.name,
                custom_field_value,
                raw_value,
                resolved_at: Utc::now(),
            });
        }

        let count = rows.len();
        store
            .replace_custom_field_values(entity_id, entity_type, rows)
            .await
            .with_context(|| {
                format!(
                    "Failed to replace custom field values for {} {}",
                    entity_type, entity_id
                )
            })?;

        Ok(count)
    }
}

/// A raw value is an option-id candidate only when it is purely numeric:
/// a JSON integer, or a string of ASCII digits.
fn option_id_candidate(raw: &Value) -> Option<String> {
    match raw {
        Value::Number(number) if number.is_u64() || number.is_i64() => Some(number.to_string()),
        Value::String(text) if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => {
            Some(text.clone())
        }
        _ => None,
    }
}

/// Composite values (lists, maps) are stored as their JSON serialization;
/// scalars as plain text.
fn raw_to_string(raw: &Value) -> String {
    match raw {
        Value::String(text) => text.clone(),
        Value::Array(_) | Value::Object(_) => raw.to_string(),
        other => other.to_string(),
    }
}
