//! Wildcard patterns over edges.
//!
//! Patterns are ordinary edges in which the atom `*` matches any single
//! element. Strict matching requires the same arity and identical atom text.
//! Non-strict matching additionally lets a pattern atom without a `/` match
//! any atom with the same root, and a trailing `...` absorb zero or more
//! remaining elements.

use crate::edge::Edge;

/// Matches any single element.
pub const WILDCARD: &str = "*";

/// Matches any remaining elements (non-strict mode only, last position).
pub const ELLIPSIS: &str = "...";

/// Returns true if `edge` matches `pattern`.
///
/// # Examples
///
/// ```
/// use hgcoref::{pattern::matches, Edge};
///
/// let edge = Edge::parse("(main-coref/J/. abc (of/B city/C paris/C))").unwrap();
/// assert!(matches(&Edge::parse("(main-coref/J/. abc *)").unwrap(), &edge, true));
/// assert!(!matches(&Edge::parse("(main-coref/J/. *)").unwrap(), &edge, true));
/// assert!(matches(&Edge::parse("(main-coref/J/. ...)").unwrap(), &edge, false));
/// ```
#[must_use]
pub fn matches(pattern: &Edge, edge: &Edge, strict: bool) -> bool {
    match pattern {
        Edge::Atom(text) if text == WILDCARD => true,
        Edge::Atom(text) => match edge {
            Edge::Atom(other) if strict || text.contains('/') => text == other,
            Edge::Atom(_) => edge.root() == Some(text.as_str()),
            Edge::Hyper(_) => false,
        },
        Edge::Hyper(pattern_elements) => {
            let Edge::Hyper(elements) = edge else {
                return false;
            };
            matches_elements(pattern_elements, elements, strict)
        }
    }
}

fn matches_elements(pattern: &[Edge], elements: &[Edge], strict: bool) -> bool {
    let open_ended = !strict && pattern.last().and_then(Edge::as_atom) == Some(ELLIPSIS);
    let fixed = if open_ended {
        &pattern[..pattern.len() - 1]
    } else {
        pattern
    };

    if open_ended {
        if elements.len() < fixed.len() {
            return false;
        }
    } else if elements.len() != fixed.len() {
        return false;
    }

    fixed
        .iter()
        .zip(elements)
        .all(|(p, e)| matches(p, e, strict))
}
