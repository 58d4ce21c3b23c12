/// Presentation layer: markup tree, result panel rendering and highlighting.
pub mod highlight;
pub mod markup;
pub mod render;

pub use render::{FieldsTemplate, MatchedFieldTemplate, ResultTemplate, render_panel};
