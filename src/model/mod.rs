pub mod catalog;
pub mod common;
pub mod custom_field;
pub mod include;
pub mod resource;

pub use catalog::{catalog, find, ResourceConfig};
pub use common::{generate_run_id, Id};
pub use custom_field::{CustomField, CustomFieldOption, CustomFieldValue};
pub use include::IncludeSpec;
pub use resource::{Relationship, RelationshipData, RelationshipRef, Resource, ResourcePage};
