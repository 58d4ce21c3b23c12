/// Result panel rendering: groups of matches laid out as a markup tree.
use serde_json::Value;

use super::highlight::highlight;
use super::markup::{Element, Node};
use crate::engine::{Record, SearchOutcome};

/// Class of the panel root.
pub const PANEL_CLASS: &str = "panel-results";
/// Class of the single "no results" indicator.
pub const NO_RESULTS_CLASS: &str = "panel-no-results";
/// Text of the "no results" indicator.
pub const NO_RESULTS_TEXT: &str = "No results found";
/// Class of the container holding all groups.
pub const RESULTS_CLASS: &str = "results";

/// Renders the content of one result row.
pub trait ResultTemplate {
    /// Nodes to place inside the `result` element for a matched row.
    fn render(&self, row: &Record, group: &str, field: &str) -> Vec<Node>;
}

impl<F> ResultTemplate for F
where
    F: Fn(&Record, &str, &str) -> Vec<Node>,
{
    fn render(&self, row: &Record, group: &str, field: &str) -> Vec<Node> {
        self(row, group, field)
    }
}

/// Default template: the value of the field that matched.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchedFieldTemplate;

impl ResultTemplate for MatchedFieldTemplate {
    fn render(&self, row: &Record, _group: &str, field: &str) -> Vec<Node> {
        vec![Node::text(display_value(row.get(field)))]
    }
}

/// Template listing selected fields of the row, separated by " · ".
#[derive(Debug, Clone)]
pub struct FieldsTemplate {
    fields: Vec<String>,
}

impl FieldsTemplate {
    /// Show `fields` in order; missing fields are left out.
    #[must_use]
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }
}

impl ResultTemplate for FieldsTemplate {
    fn render(&self, row: &Record, _group: &str, _field: &str) -> Vec<Node> {
        let parts: Vec<String> = self
            .fields
            .iter()
            .filter_map(|f| row.get(f))
            .map(|v| display_value(Some(v)))
            .collect();
        vec![Node::text(parts.join(" · "))]
    }
}

/// Plain-text rendering of a field value.
#[must_use]
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Build the results panel for `outcome`.
///
/// With no matches the panel holds exactly one "no results" indicator.
/// Otherwise it holds one `group` per group name, in order of first
/// appearance, each with a title and one `result` per match. When
/// `highlight_results` is set the results are highlighted with the
/// upper-cased query.
#[must_use]
pub fn render_panel(
    outcome: &SearchOutcome,
    template: &dyn ResultTemplate,
    highlight_results: bool,
) -> Element {
    let panel = Element::new("div").with_class(PANEL_CLASS);

    if outcome.matches.is_empty() {
        return panel.with_child(
            Element::new("div")
                .with_class(NO_RESULTS_CLASS)
                .with_child(Node::text(NO_RESULTS_TEXT)),
        );
    }

    let mut results = Element::new("div").with_class(RESULTS_CLASS);
    for (name, entries) in outcome.by_group() {
        let mut items = Element::new("div").with_class("group-items");
        for entry in entries {
            let mut result = Element::new("div").with_class("result");
            for node in template.render(&entry.row, &entry.group, &entry.field) {
                result.push(node);
            }
            items.push(result);
        }
        results.push(
            Element::new("div")
                .with_class("group")
                .with_class(name)
                .with_child(
                    Element::new("div")
                        .with_class("group-title")
                        .with_child(Node::text(name)),
                )
                .with_child(items),
        );
    }

    if highlight_results {
        highlight(&mut results, &outcome.query.to_uppercase());
    }

    panel.with_child(results)
}
