use crate::model::Id;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// One JSON:API resource as returned by the upstream API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: Id,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub relationships: HashMap<String, Relationship>,
}

impl Resource {
    /// The raw custom-field map (field id -> raw value), when the resource
    /// carries one.
    pub fn custom_fields(&self) -> Option<&Map<String, Value>> {
        self.attributes.get("custom_fields").and_then(Value::as_object)
    }

    /// String attribute accessor; missing and non-string both yield None.
    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }
}

/// A named relationship entry. `data` is None for both an explicit JSON null
/// and a missing `data` key, which the API treats the same way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<RelationshipData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationshipData {
    One(RelationshipRef),
    Many(Vec<RelationshipRef>),
}

/// Reference to another resource. `attributes` is populated by the
/// included-data merger when the referenced record arrived in the page's
/// `included` side-table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRef {
    pub id: Id,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
}

impl RelationshipRef {
    pub fn new(kind: impl Into<String>, id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            attributes: None,
        }
    }
}

/// One page of a resource collection: the primary `data` sequence plus the
/// optional `included` side-table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourcePage {
    pub data: Vec<Resource>,
    pub included: Vec<Resource>,
}

impl ResourcePage {
    /// Parse a raw response body. Returns None when the body is not an
    /// object, the `data` key is missing or not a sequence, or a primary
    /// record is malformed; callers treat all of those as a hard
    /// invalid-format error. Malformed `included` entries are dropped.
    pub fn from_body(body: Value) -> Option<ResourcePage> {
        let mut object = match body {
            Value::Object(object) => object,
            _ => return None,
        };

        let data = match object.remove("data") {
            Some(Value::Array(items)) => items,
            _ => return None,
        };
        let data = data
            .into_iter()
            .map(|item| serde_json::from_value::<Resource>(item).ok())
            .collect::<Option<Vec<_>>>()?;

        let included = match object.remove("included") {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value::<Resource>(item).ok())
                .collect(),
            _ => Vec::new(),
        };

        Some(ResourcePage { data, included })
    }
}
