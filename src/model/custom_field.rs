use crate::model::{Id, RelationshipData, Resource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A custom field definition owned by a project, survey, section or similar
/// container upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: Id,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

impl CustomField {
    /// Build from a fetched `custom_fields` resource. Fields without a name
    /// attribute are not usable for resolution and yield None.
    pub fn from_resource(resource: &Resource) -> Option<Self> {
        Some(Self {
            id: resource.id.clone(),
            name: resource.attribute_str("name")?.to_string(),
            data_type: resource.attribute_str("data_type").map(str::to_string),
        })
    }
}

/// An enumerated choice belonging to a custom field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldOption {
    pub id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_field_id: Option<Id>,
    pub name: String,
}

impl CustomFieldOption {
    /// Build from a fetched `custom_field_options` resource. The owning
    /// field arrives as a relationship ref when it was included.
    pub fn from_resource(resource: &Resource) -> Option<Self> {
        let custom_field_id = resource
            .relationships
            .get("custom_field")
            .and_then(|relationship| match &relationship.data {
                Some(RelationshipData::One(reference)) => Some(reference.id.clone()),
                _ => None,
            });

        Some(Self {
            id: resource.id.clone(),
            custom_field_id,
            name: resource.attribute_str("name")?.to_string(),
        })
    }
}

/// One resolved (entity, field) row. The full set of rows for an entity is
/// deleted and regenerated every time that entity is reprocessed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldValue {
    pub entity_id: Id,
    pub entity_type: String,
    pub custom_field_id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_field_option_id: Option<Id>,
    /// Field name denormalized onto the row.
    pub custom_field_name: String,
    /// The resolved value: an option name when the raw value matched an
    /// option id, otherwise the raw value itself.
    pub custom_field_value: String,
    pub raw_value: String,
    pub resolved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn custom_field_from_resource_requires_name() {
        let resource: Resource = serde_json::from_value(json!({
            "id": "5",
            "type": "custom_fields",
            "attributes": {"name": "Priority", "data_type": "dropdown"}
        }))
        .unwrap();

        let field = CustomField::from_resource(&resource).unwrap();
        assert_eq!(field.name, "Priority");
        assert_eq!(field.data_type.as_deref(), Some("dropdown"));

        let nameless: Resource = serde_json::from_value(json!({
            "id": "6",
            "type": "custom_fields",
            "attributes": {}
        }))
        .unwrap();
        assert!(CustomField::from_resource(&nameless).is_none());
    }

    #[test]
    fn option_from_resource_reads_owning_field_ref() {
        let resource: Resource = serde_json::from_value(json!({
            "id": "7",
            "type": "custom_field_options",
            "attributes": {"name": "High Priority"},
            "relationships": {
                "custom_field": {"data": {"type": "custom_fields", "id": "5"}}
            }
        }))
        .unwrap();

        let option = CustomFieldOption::from_resource(&resource).unwrap();
        assert_eq!(option.name, "High Priority");
        assert_eq!(option.custom_field_id.as_deref(), Some("5"));
    }
}
