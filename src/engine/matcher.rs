/// Substring matching of candidate strings against the current query.
use std::borrow::Cow;

/// Test whether `query` occurs in `candidate`.
///
/// Case-insensitive mode lowercases both operands before the substring test.
/// No accent or locale folding is applied. An empty query matches everything.
#[must_use]
pub fn matches(candidate: &str, query: &str, case_sensitive: bool) -> bool {
    fold(candidate, case_sensitive).contains(&*fold(query, case_sensitive))
}

fn fold(text: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.to_lowercase())
    }
}
