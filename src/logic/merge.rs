use crate::model::{RelationshipData, RelationshipRef, Resource};
use std::collections::HashMap;

/// Fold a page's `included` side-table into the primary resources: every
/// relationship ref that matches an included record by (type, id) gets that
/// record's attributes attached. Unmatched refs pass through unchanged.
pub fn merge_included(resources: &mut [Resource], included: &[Resource]) {
    if included.is_empty() {
        return;
    }

    let index: HashMap<(&str, &str), &Resource> = included
        .iter()
        .map(|resource| ((resource.kind.as_str(), resource.id.as_str()), resource))
        .collect();

    for resource in resources.iter_mut() {
        for relationship in resource.relationships.values_mut() {
            match &mut relationship.data {
                Some(RelationshipData::One(reference)) => attach(reference, &index),
                Some(RelationshipData::Many(references)) => {
                    for reference in references.iter_mut() {
                        attach(reference, &index);
                    }
                }
                None => {}
            }
        }
    }
}

fn attach(reference: &mut RelationshipRef, index: &HashMap<(&str, &str), &Resource>) {
    if let Some(resource) = index.get(&(reference.kind.as_str(), reference.id.as_str())) {
        reference.attributes = Some(resource.attributes.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resources_from(value: serde_json::Value) -> Vec<Resource> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn attaches_included_attributes_to_single_and_array_refs() {
        let mut data = resources_from(json!([
            {
                "id": "1",
                "type": "tasks",
                "attributes": {"title": "Fix login"},
                "relationships": {
                    "assignee": {"data": {"type": "people", "id": "9"}},
                    "watchers": {"data": [
                        {"type": "people", "id": "9"},
                        {"type": "people", "id": "12"}
                    ]}
                }
            }
        ]));
        let included = resources_from(json!([
            {"id": "9", "type": "people", "attributes": {"name": "Ada"}}
        ]));

        merge_included(&mut data, &included);

        let assignee = match &data[0].relationships["assignee"].data {
            Some(RelationshipData::One(reference)) => reference,
            other => panic!("unexpected assignee shape: {:?}", other),
        };
        assert_eq!(
            assignee.attributes.as_ref().unwrap()["name"],
            json!("Ada")
        );

        let watchers = match &data[0].relationships["watchers"].data {
            Some(RelationshipData::Many(references)) => references,
            other => panic!("unexpected watchers shape: {:?}", other),
        };
        assert!(watchers[0].attributes.is_some());
        // Person 12 was not included, its ref stays bare
        assert!(watchers[1].attributes.is_none());
    }

    #[test]
    fn type_must_match_not_just_id() {
        let mut data = resources_from(json!([
            {
                "id": "1",
                "type": "tasks",
                "relationships": {
                    "assignee": {"data": {"type": "people", "id": "9"}}
                }
            }
        ]));
        let included = resources_from(json!([
            {"id": "9", "type": "companies", "attributes": {"name": "Acme"}}
        ]));

        merge_included(&mut data, &included);

        match &data[0].relationships["assignee"].data {
            Some(RelationshipData::One(reference)) => assert!(reference.attributes.is_none()),
            other => panic!("unexpected assignee shape: {:?}", other),
        }
    }
}
