/// Record, match and outcome types shared by the walker, the sources and the scheduler.
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

/// One matchable item: an ordered mapping from field name to value.
pub type Record = Map<String, Value>;

/// A named category of records, in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    /// Group name (e.g., "Users").
    pub name: String,
    /// Records of this group.
    pub records: Vec<Record>,
}

/// Groups keyed by name, in the order the source defined them.
pub type GroupedRecords = Vec<Group>;

/// Build groups from a JSON object of `name -> [record, ...]`.
///
/// Values that are not arrays become empty groups; array elements that are not
/// objects are dropped.
#[must_use]
pub fn groups_from_object(object: &Map<String, Value>) -> GroupedRecords {
    object
        .iter()
        .map(|(name, value)| Group {
            name: name.clone(),
            records: records_from_value(value),
        })
        .collect()
}

/// Collect the object elements of an array value.
#[must_use]
pub fn records_from_value(value: &Value) -> Vec<Record> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_object().cloned())
            .collect(),
        _ => Vec::new(),
    }
}

/// A record that matched the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchEntry {
    /// Field whose value matched.
    pub field: String,
    /// The full record the field belongs to.
    pub row: Record,
    /// Top-level group the record was found in.
    pub group: String,
}

/// Result of one search invocation.
///
/// Created fresh for every search; nothing is carried over from earlier queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    /// The query the matches were computed against.
    pub query: String,
    /// Matches in source order.
    pub matches: Vec<MatchEntry>,
    /// The raw groups the matches were drawn from.
    pub groups: Arc<GroupedRecords>,
}

impl SearchOutcome {
    /// Matches regrouped by group name, groups in order of first appearance.
    #[must_use]
    pub fn by_group(&self) -> Vec<(&str, Vec<&MatchEntry>)> {
        let mut grouped: Vec<(&str, Vec<&MatchEntry>)> = Vec::new();
        for entry in &self.matches {
            match grouped.iter_mut().find(|(name, _)| *name == entry.group) {
                Some((_, entries)) => entries.push(entry),
                None => grouped.push((entry.group.as_str(), vec![entry])),
            }
        }
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(group: &str, field: &str) -> MatchEntry {
        MatchEntry {
            field: field.to_owned(),
            row: Record::new(),
            group: group.to_owned(),
        }
    }

    #[test]
    fn test_groups_keep_definition_order() {
        let value = json!({"Zebras": [{"name": "z"}], "Apples": [{"name": "a"}]});
        let groups = groups_from_object(value.as_object().unwrap());
        assert_eq!(groups[0].name, "Zebras");
        assert_eq!(groups[1].name, "Apples");
    }

    #[test]
    fn test_non_array_group_is_empty() {
        let value = json!({"Users": "oops", "Tags": [{"t": "x"}, 5, "y"]});
        let groups = groups_from_object(value.as_object().unwrap());
        assert!(groups[0].records.is_empty());
        assert_eq!(groups[1].records.len(), 1);
    }

    #[test]
    fn test_by_group_first_appearance_order() {
        let outcome = SearchOutcome {
            query: "x".to_owned(),
            matches: vec![entry("B", "f"), entry("A", "f"), entry("B", "g")],
            groups: Arc::default(),
        };
        let grouped = outcome.by_group();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, "B");
        assert_eq!(grouped[0].1.len(), 2);
        assert_eq!(grouped[1].0, "A");
    }
}
