use crate::logic::report::SyncReporter;
use crate::model::{RelationshipData, Resource};
use std::collections::BTreeMap;

/// Count, per declared relationship name, how many resources carry that
/// relationship populated: a ref with an id, or an array (empty arrays
/// count, explicit null does not). Diagnostic only.
pub fn relationship_stats(
    resources: &[Resource],
    relationship_names: &[String],
) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for name in relationship_names {
        let count = resources
            .iter()
            .filter(|resource| is_populated(resource, name))
            .count();
        counts.insert(name.clone(), count);
    }
    counts
}

fn is_populated(resource: &Resource, name: &str) -> bool {
    match resource.relationships.get(name).and_then(|r| r.data.as_ref()) {
        Some(RelationshipData::One(reference)) => !reference.id.is_empty(),
        Some(RelationshipData::Many(_)) => true,
        None => false,
    }
}

/// Percentage of `count` over `total` rounded to two decimals; None when
/// there is nothing to report against.
pub fn coverage_percentage(count: usize, total: usize) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some((count as f64 / total as f64 * 10_000.0).round() / 100.0)
}

/// Emit per-relationship coverage through the reporter. Skipped entirely
/// when the resource set is empty.
pub fn report_relationship_coverage(
    reporter: &dyn SyncReporter,
    resource_name: &str,
    resources: &[Resource],
    relationship_names: &[String],
) {
    let total = resources.len();
    for (name, count) in relationship_stats(resources, relationship_names) {
        if let Some(percentage) = coverage_percentage(count, total) {
            reporter.relationship_coverage(resource_name, &name, count, total, percentage);
        }
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
    fn counts_refs_and_arrays_but_not_null() {
        let resources = resources_from(json!([
            {"id": "1", "type": "tasks", "relationships": {
                "assignee": {"data": {"type": "people", "id": "9"}},
                "watchers": {"data": []}
            }},
            {"id": "2", "type": "tasks", "relationships": {
                "assignee": {"data": null}
            }},
            {"id": "3", "type": "tasks"}
        ]));
        let names = vec!["assignee".to_string(), "watchers".to_string()];

        let stats = relationship_stats(&resources, &names);
        assert_eq!(stats["assignee"], 1);
        // An empty array is still a populated relationship
        assert_eq!(stats["watchers"], 1);
    }

    #[test]
    fn counts_stay_within_bounds() {
        let resources = resources_from(json!([
            {"id": "1", "type": "deals", "relationships": {
                "company": {"data": {"type": "companies", "id": "4"}}
            }},
            {"id": "2", "type": "deals", "relationships": {
                "company": {"data": {"type": "companies", "id": "4"}}
            }}
        ]));
        let names = vec!["company".to_string(), "responsible".to_string()];

        let stats = relationship_stats(&resources, &names);
        for count in stats.values() {
            assert!(*count <= resources.len());
        }
        assert_eq!(stats["company"], 2);
        assert_eq!(stats["responsible"], 0);
    }

    #[test]
    fn percentage_rounds_to_two_decimals_and_guards_zero() {
        assert_eq!(coverage_percentage(1, 3), Some(33.33));
        assert_eq!(coverage_percentage(2, 3), Some(66.67));
        assert_eq!(coverage_percentage(0, 5), Some(0.0));
        assert_eq!(coverage_percentage(5, 5), Some(100.0));
        assert_eq!(coverage_percentage(0, 0), None);
    }
}
