/// In-place highlighting of matched substrings inside a rendered tree.
///
/// Text leaves are split around the first occurrence of the pattern and the
/// matched slice is wrapped in a `span.highlight` marker. The traversal walks
/// each child list once; the skip count returned for a split leaf tells the
/// caller how many of the freshly inserted siblings to step over, so no piece
/// of a split leaf is ever rescanned.
use std::ops::Range;

use super::markup::{Element, Node};

/// Class of the marker element wrapping a highlighted slice.
pub const HIGHLIGHT_CLASS: &str = "highlight";

/// Highlight `pattern` in every text leaf below `root`.
///
/// `pattern` must already be upper-cased; leaf text is upper-cased for the
/// comparison only, so the marked slice keeps its original case. Only the
/// first occurrence per leaf is marked. `script`/`style` subtrees are left
/// alone. Running this on an already highlighted tree marks again; re-render
/// before re-highlighting.
///
/// Returns the skip count for the caller's traversal, which is always 0 for a
/// container.
pub fn highlight(root: &mut Element, pattern: &str) -> usize {
    if pattern.is_empty() || is_excluded(&root.tag) {
        return 0;
    }
    let mut index = 0;
    while index < root.children.len() {
        index += highlight_child(&mut root.children, index, pattern) + 1;
    }
    0
}

/// Highlight the child at `index`, splitting it in place if it is a matching
/// text leaf. Returns how many following siblings were inserted by the split.
fn highlight_child(siblings: &mut Vec<Node>, index: usize, pattern: &str) -> usize {
    let pieces = match &mut siblings[index] {
        Node::Element(element) => return highlight(element, pattern),
        Node::Text(text) => match locate(text, pattern) {
            Some(range) => split_leaf(text, range),
            None => return 0,
        },
    };
    let skip = pieces.len() - 1;
    siblings.splice(index..=index, pieces);
    skip
}

fn is_excluded(tag: &str) -> bool {
    let tag = tag.to_ascii_lowercase();
    tag.contains("script") || tag.contains("style")
}

/// Byte range in `text` of the first occurrence of the upper-cased `pattern`.
///
/// Upper-casing can change byte lengths (`ß` becomes `SS`), so every byte of
/// the upper-cased text is mapped back to the start of the character it came
/// from. A match that ends inside an expanded character covers that whole
/// character.
fn locate(text: &str, pattern: &str) -> Option<Range<usize>> {
    let mut upper = String::with_capacity(text.len());
    let mut origin = Vec::with_capacity(text.len());
    for (offset, c) in text.char_indices() {
        let before = upper.len();
        upper.extend(c.to_uppercase());
        origin.extend(std::iter::repeat_n(offset, upper.len() - before));
    }

    let pos = upper.find(pattern)?;
    let start = origin[pos];
    let last = origin[pos + pattern.len() - 1];
    let end = last + text[last..].chars().next().map_or(0, char::len_utf8);
    Some(start..end)
}

fn split_leaf(text: &str, range: Range<usize>) -> Vec<Node> {
    let mut pieces = Vec::with_capacity(3);
    if range.start > 0 {
        pieces.push(Node::text(&text[..range.start]));
    }
    pieces.push(
        Element::new("span")
            .with_class(HIGHLIGHT_CLASS)
            .with_child(Node::text(&text[range.clone()]))
            .into(),
    );
    if range.end < text.len() {
        pieces.push(Node::text(&text[range.end..]));
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(text: &str) -> Element {
        Element::new("p").with_child(Node::text(text))
    }

    fn marker(text: &str) -> Node {
        Element::new("span")
            .with_class(HIGHLIGHT_CLASS)
            .with_child(Node::text(text))
            .into()
    }

    fn marked_texts(root: &Element) -> Vec<String> {
        root.find_all_by_class(HIGHLIGHT_CLASS)
            .iter()
            .map(|e| e.text_content())
            .collect()
    }

    #[test]
    fn test_splits_into_three_segments() {
        let mut p = paragraph("the apple pie");
        assert_eq!(highlight(&mut p, "APPLE"), 0);
        assert_eq!(
            p.children,
            vec![Node::text("the "), marker("apple"), Node::text(" pie")]
        );
    }

    #[test]
    fn test_preserves_original_case() {
        let mut p = paragraph("An ApPlE a day");
        highlight(&mut p, "APPLE");
        assert_eq!(marked_texts(&p), ["ApPlE"]);
        assert_eq!(p.text_content(), "An ApPlE a day");
    }

    #[test]
    fn test_only_first_occurrence_per_leaf() {
        let mut p = paragraph("apple and apple");
        highlight(&mut p, "APPLE");
        assert_eq!(marked_texts(&p), ["apple"]);
        assert_eq!(p.children.len(), 2);
    }

    #[test]
    fn test_each_leaf_highlighted_independently() {
        let mut root = Element::new("div")
            .with_child(paragraph("green apple"))
            .with_child(Node::text("apple tart"))
            .with_child(paragraph("pear"));
        highlight(&mut root, "APPLE");
        assert_eq!(marked_texts(&root), ["apple", "apple"]);
    }

    #[test]
    fn test_skip_count_covers_inserted_siblings() {
        let mut middle = vec![Node::text("the apple pie")];
        assert_eq!(highlight_child(&mut middle, 0, "APPLE"), 2);

        let mut leading = vec![Node::text("apple pie")];
        assert_eq!(highlight_child(&mut leading, 0, "APPLE"), 1);

        let mut whole = vec![Node::text("apple")];
        assert_eq!(highlight_child(&mut whole, 0, "APPLE"), 0);
        assert_eq!(whole, vec![marker("apple")]);
    }

    #[test]
    fn test_script_and_style_are_skipped() {
        let mut root = Element::new("div")
            .with_child(Element::new("script").with_child(Node::text("apple()")))
            .with_child(Element::new("STYLE").with_child(Node::text(".apple {}")))
            .with_child(Node::text("apple"));
        highlight(&mut root, "APPLE");
        assert_eq!(marked_texts(&root), ["apple"]);
    }

    #[test]
    fn test_no_match_leaves_tree_untouched() {
        let mut p = paragraph("banana");
        let before = p.clone();
        highlight(&mut p, "APPLE");
        assert_eq!(p, before);
    }

    #[test]
    fn test_empty_pattern_is_a_no_op() {
        let mut p = paragraph("banana");
        highlight(&mut p, "");
        assert_eq!(p, paragraph("banana"));
    }

    #[test]
    fn test_expanding_uppercase_keeps_char_boundaries() {
        let mut p = paragraph("straße");
        highlight(&mut p, "SS");
        assert_eq!(marked_texts(&p), ["ß"]);
        assert_eq!(p.text_content(), "straße");
    }

    #[test]
    fn test_multibyte_text_before_match() {
        let mut p = paragraph("café crème brûlée");
        highlight(&mut p, "CRÈME");
        assert_eq!(marked_texts(&p), ["crème"]);
    }
}
