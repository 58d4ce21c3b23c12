/// A minimal text-bearing tree for rendered result panels.
use std::borrow::Cow;
use std::fmt::Write as _;

/// A node in the rendered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A text leaf.
    Text(String),
    /// A container with a tag, classes and children.
    Element(Element),
}

impl Node {
    /// Build a text leaf.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(&escape_html(text)),
            Self::Element(element) => element.write_html(out),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// A container node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name (e.g., "div", "span").
    pub tag: String,
    /// CSS classes, in order.
    pub classes: Vec<String>,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Element {
    /// An empty element with no classes.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            classes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add a class (builder style).
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Append a child (builder style).
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append a child.
    pub fn push(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    /// Serialize as HTML, escaping text and attribute values.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        if !self.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape_html(&self.classes.join(" ")));
        }
        out.push('>');
        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// Escape `&`, `<`, `>` and `"`. Returns the input unchanged when nothing needs escaping.
#[must_use]
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

// Tree queries used by the rendering and highlighting tests.
#[cfg(test)]
impl Node {
    /// Concatenated text of this node and its descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(text),
            Self::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

#[cfg(test)]
impl Element {
    /// Whether the element carries `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Concatenated text of all descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.children.iter().map(Node::text_content).collect()
    }

    /// First descendant (or self) carrying `class`, depth-first.
    #[must_use]
    pub fn find_by_class(&self, class: &str) -> Option<&Element> {
        if self.has_class(class) {
            return Some(self);
        }
        self.children.iter().find_map(|child| match child {
            Node::Element(element) => element.find_by_class(class),
            Node::Text(_) => None,
        })
    }

    /// All descendants (and self) carrying `class`, depth-first.
    #[must_use]
    pub fn find_all_by_class<'a>(&'a self, class: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_by_class(class, &mut found);
        found
    }

    fn collect_by_class<'a>(&'a self, class: &str, out: &mut Vec<&'a Element>) {
        if self.has_class(class) {
            out.push(self);
        }
        for child in &self.children {
            if let Node::Element(element) = child {
                element.collect_by_class(class, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_html_nested() {
        let el = Element::new("div")
            .with_class("group")
            .with_class("Users")
            .with_child(Element::new("span").with_child(Node::text("Ann")));
        assert_eq!(
            el.to_html(),
            "<div class=\"group Users\"><span>Ann</span></div>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let el = Element::new("p").with_child(Node::text("a < b & \"c\""));
        assert_eq!(el.to_html(), "<p>a &lt; b &amp; &quot;c&quot;</p>");
    }

    #[test]
    fn test_find_by_class() {
        let root = Element::new("div")
            .with_child(
                Element::new("div")
                    .with_class("results")
                    .with_child(Node::text("y")),
            )
            .with_child(Node::text("x"));
        assert_eq!(root.find_by_class("results").unwrap().text_content(), "y");
        assert!(root.find_by_class("missing").is_none());
        assert_eq!(root.text_content(), "yx");
    }
}
