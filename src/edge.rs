//! Hyperedge value type.
//!
//! An [`Edge`] is the opaque, content-addressed handle for anything stored in
//! the hypergraph: an atom such as `paris/C` or a hyperedge such as
//! `(of/B city/C paris/C)`. Edges compare by value, so two parses of the same
//! text are the same entity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// An atom or a hyperedge.
///
/// # Examples
///
/// ```
/// use hgcoref::Edge;
///
/// let edge: Edge = "(of/B city/C paris/C)".parse().unwrap();
/// assert_eq!(edge.len(), 3);
/// assert!(edge.contains(&Edge::atom("paris/C")));
/// assert_eq!(edge.to_string(), "(of/B city/C paris/C)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Edge {
    /// A single token.
    Atom(String),
    /// An ordered list of edges.
    Hyper(Vec<Edge>),
}

impl Edge {
    /// Creates an atom.
    #[must_use]
    pub fn atom(text: impl Into<String>) -> Self {
        Self::Atom(text.into())
    }

    /// Creates a hyperedge from its elements.
    #[must_use]
    pub fn hyper(elements: impl IntoIterator<Item = Edge>) -> Self {
        Self::Hyper(elements.into_iter().collect())
    }

    /// Parses the textual notation.
    ///
    /// # Errors
    /// Returns `ValidationError::EdgeParse` on malformed input.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Err(parse_err(text, "empty input"));
        }

        let mut pos = 0;
        let edge = parse_tokens(text, &tokens, &mut pos)?;
        if pos != tokens.len() {
            return Err(parse_err(text, "trailing tokens after edge"));
        }
        Ok(edge)
    }

    /// Returns true for atoms.
    #[must_use]
    pub const fn is_atom(&self) -> bool {
        matches!(self, Self::Atom(_))
    }

    /// Arity of the edge; atoms count as 1.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Atom(_) => 1,
            Self::Hyper(elements) => elements.len(),
        }
    }

    /// Edges are never empty; provided for clippy symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Direct elements of a hyperedge (empty for atoms).
    #[must_use]
    pub fn elements(&self) -> &[Edge] {
        match self {
            Self::Atom(_) => &[],
            Self::Hyper(elements) => elements,
        }
    }

    /// Atom text, if this is an atom.
    #[must_use]
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Self::Atom(text) => Some(text),
            Self::Hyper(_) => None,
        }
    }

    /// Atom text before the first `/`. `None` for hyperedges.
    #[must_use]
    pub fn root(&self) -> Option<&str> {
        self.as_atom()
            .map(|text| text.split_once('/').map_or(text, |(root, _)| root))
    }

    /// Returns true if `other` is a direct element of this hyperedge.
    #[must_use]
    pub fn contains(&self, other: &Edge) -> bool {
        self.elements().contains(other)
    }
}

fn parse_err(input: &str, reason: &str) -> ValidationError {
    ValidationError::EdgeParse {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Open,
    Close,
    Word(&'a str),
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (i, ch) in text.char_indices() {
        if ch == '(' || ch == ')' || ch.is_whitespace() {
            if let Some(s) = start.take() {
                tokens.push(Token::Word(&text[s..i]));
            }
            match ch {
                '(' => tokens.push(Token::Open),
                ')' => tokens.push(Token::Close),
                _ => {}
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(Token::Word(&text[s..]));
    }
    tokens
}

// Iterative so deeply nested input cannot exhaust the call stack.
fn parse_tokens(input: &str, tokens: &[Token<'_>], pos: &mut usize) -> Result<Edge, ValidationError> {
    let mut stack: Vec<Vec<Edge>> = Vec::new();

    while *pos < tokens.len() {
        let token = &tokens[*pos];
        *pos += 1;

        let finished = match token {
            Token::Word(word) => Edge::Atom((*word).to_string()),
            Token::Open => {
                stack.push(Vec::new());
                continue;
            }
            Token::Close => {
                let elements = stack
                    .pop()
                    .ok_or_else(|| parse_err(input, "unbalanced ')'"))?;
                if elements.is_empty() {
                    return Err(parse_err(input, "empty hyperedge"));
                }
                Edge::Hyper(elements)
            }
        };

        match stack.last_mut() {
            Some(parent) => parent.push(finished),
            None => return Ok(finished),
        }
    }

    Err(parse_err(input, "unbalanced '('"))
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(text) => write!(f, "{text}"),
            Self::Hyper(elements) => {
                write!(f, "(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl FromStr for Edge {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Edge {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Edge {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
