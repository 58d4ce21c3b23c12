/// Recursive matching of nested records, emitting one entry per matching record.
use serde_json::Value;

use super::matcher::matches;
use super::record::{MatchEntry, Record};

/// Walk `records` in order and append a `MatchEntry` to `out` for every record
/// with a string field containing `query`.
///
/// Per record, fields are scanned in definition order:
/// - string: matched; the first hit emits an entry and ends the record.
/// - number: ends the record without a match, even if later fields would match.
/// - nested object or list of objects: walked with the same `group`; nested hits
///   are emitted for the nested record and scanning of the outer record continues.
/// - bool / null: skipped.
pub fn walk_into(
    records: &[Record],
    group: &str,
    query: &str,
    case_sensitive: bool,
    out: &mut Vec<MatchEntry>,
) {
    for record in records {
        walk_record(record, group, query, case_sensitive, out);
    }
}

fn walk_record(
    record: &Record,
    group: &str,
    query: &str,
    case_sensitive: bool,
    out: &mut Vec<MatchEntry>,
) {
    for (field, value) in record {
        match value {
            // Numbers are never searched and abandon the rest of the record.
            Value::Number(_) => return,
            Value::Object(nested) => walk_record(nested, group, query, case_sensitive, out),
            Value::Array(items) => {
                for nested in items.iter().filter_map(Value::as_object) {
                    walk_record(nested, group, query, case_sensitive, out);
                }
            }
            Value::String(text) => {
                if matches(text, query, case_sensitive) {
                    out.push(MatchEntry {
                        field: field.clone(),
                        row: record.clone(),
                        group: group.to_owned(),
                    });
                    return;
                }
            }
            Value::Bool(_) | Value::Null => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn walk(records: &[Record], group: &str, query: &str, case_sensitive: bool) -> Vec<MatchEntry> {
        let mut out = Vec::new();
        walk_into(records, group, query, case_sensitive, &mut out);
        out
    }

    #[test]
    fn test_single_field_match() {
        let rows = vec![record(json!({"name": "banana bread"}))];
        let found = walk(&rows, "Recipes", "bread", false);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].field, "name");
        assert_eq!(found[0].group, "Recipes");
        assert_eq!(found[0].row, rows[0]);
    }

    #[test]
    fn test_numeric_field_short_circuits_record() {
        let rows = vec![record(json!({"a": 5, "b": "apple pie"}))];
        assert!(walk(&rows, "Desserts", "apple", false).is_empty());
    }

    #[test]
    fn test_numeric_field_after_match_is_irrelevant() {
        let rows = vec![record(json!({"b": "apple pie", "a": 5}))];
        assert_eq!(walk(&rows, "Desserts", "apple", false).len(), 1);
    }

    #[test]
    fn test_first_match_wins_per_record() {
        let rows = vec![record(json!({"title": "apple", "subtitle": "apple tart"}))];
        let found = walk(&rows, "g", "apple", false);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].field, "title");
    }

    #[test]
    fn test_nested_matches_use_outer_group() {
        let rows = vec![record(json!({
            "owner": {"name": "Ada Lovelace"},
            "tags": [{"label": "lovely"}, {"label": "other"}],
            "title": "nothing here"
        }))];
        let found = walk(&rows, "Projects", "love", false);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|m| m.group == "Projects"));
        assert_eq!(found[0].field, "name");
        assert_eq!(found[0].row, record(json!({"name": "Ada Lovelace"})));
        assert_eq!(found[1].field, "label");
    }

    #[test]
    fn test_nested_number_only_ends_nested_record() {
        let rows = vec![record(json!({"meta": {"count": 3}, "name": "kiwi"}))];
        let found = walk(&rows, "Fruit", "kiwi", false);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].field, "name");
    }

    #[test]
    fn test_case_sensitive_mode() {
        let rows = vec![record(json!({"name": "Banana"}))];
        assert!(walk(&rows, "g", "banana", true).is_empty());
        assert_eq!(walk(&rows, "g", "Banana", true).len(), 1);
    }

    #[test]
    fn test_output_follows_source_order() {
        let rows = vec![
            record(json!({"name": "cherry pie"})),
            record(json!({"name": "plain"})),
            record(json!({"name": "apple pie"})),
        ];
        let found = walk(&rows, "g", "pie", false);
        let names: Vec<_> = found.iter().map(|m| m.row["name"].as_str().unwrap()).collect();
        assert_eq!(names, ["cherry pie", "apple pie"]);
    }

    #[test]
    fn test_bool_and_null_are_skipped() {
        let rows = vec![record(json!({"active": true, "note": null, "name": "pear"}))];
        assert_eq!(walk(&rows, "g", "pear", false).len(), 1);
    }
}
