#![forbid(unsafe_code)]

//! Concrete path addressing within a [`Value`](crate::Value) tree.
//!
//! A [`Path`] is a fully resolved address: a sequence of map keys and list
//! indices with no wildcards. The textual syntax mirrors the pattern
//! language used for declarations, minus the wildcard forms:
//!
//! ```text
//! state.items[3].name
//! ```
//!
//! parses to `[Key("state"), Key("items"), Index(3), Key("name")]` and
//! displays back to the same string.
//!
//! # Invariants
//!
//! 1. `Path::parse(s)` succeeds exactly when `s` is non-empty, every dotted
//!    segment has a non-empty key, and every bracket holds a decimal index.
//! 2. `Path::parse(p.to_string()) == Ok(p)` for every `Path` whose keys
//!    contain none of `.`, `[`, `]`.
//! 3. `Path` is `Eq + Hash + Ord`, so it can key bound-entry maps directly.

use core::fmt;
use std::str::FromStr;

use thiserror::Error;

/// One step of a concrete path: a map key or a list index.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// A map key, e.g. `name` in `user.name`.
    Key(String),
    /// A list index, e.g. `3` in `items[3]`.
    Index(usize),
}

impl Segment {
    /// Borrow the key if this segment addresses a map child.
    #[must_use]
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Segment::Key(k) => Some(k),
            Segment::Index(_) => None,
        }
    }

    /// The index if this segment addresses a list child.
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Segment::Key(_) => None,
            Segment::Index(i) => Some(*i),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_owned())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// Error parsing a concrete path string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The input was empty.
    #[error("empty path")]
    Empty,
    /// A dotted segment had no key characters, as in `a..b` or `a.`.
    #[error("empty segment at byte {0}")]
    EmptySegment(usize),
    /// A `[` without a matching `]`.
    #[error("unclosed bracket at byte {0}")]
    UnclosedBracket(usize),
    /// Bracket contents were not a decimal index.
    #[error("invalid index {0:?}")]
    InvalidIndex(String),
    /// A `]` with no opening bracket, or text glued after a bracket.
    #[error("unexpected character {ch:?} at byte {at}")]
    Unexpected { ch: char, at: usize },
}

/// A fully resolved address within a tree. See the module docs for syntax.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// The empty path, addressing the tree root.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a path from its textual form, e.g. `"state.items[3].name"`.
    ///
    /// # Errors
    ///
    /// Returns a [`PathError`] describing the first malformed piece of the
    /// input.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        if input.is_empty() {
            return Err(PathError::Empty);
        }
        let mut segments = Vec::new();
        let mut chars = input.char_indices().peekable();
        // Each iteration consumes one dotted segment: a key followed by any
        // number of bracketed indices.
        loop {
            let start = chars.peek().map_or(input.len(), |&(i, _)| i);
            let mut key_end = start;
            while let Some(&(i, c)) = chars.peek() {
                if c == '.' || c == '[' || c == ']' {
                    break;
                }
                chars.next();
                key_end = i + c.len_utf8();
            }
            if key_end == start {
                match chars.peek() {
                    Some(&(i, ']')) => return Err(PathError::Unexpected { ch: ']', at: i }),
                    Some(&(_, '[')) if !segments.is_empty() => {}
                    _ => return Err(PathError::EmptySegment(start)),
                }
            } else {
                segments.push(Segment::Key(input[start..key_end].to_owned()));
            }
            // Bracketed indices, e.g. `items[3][0]`.
            while let Some(&(open, '[')) = chars.peek() {
                chars.next();
                let idx_start = open + 1;
                let mut idx_end = idx_start;
                let mut closed = false;
                for (i, c) in chars.by_ref() {
                    if c == ']' {
                        idx_end = i;
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(PathError::UnclosedBracket(open));
                }
                let digits = &input[idx_start..idx_end];
                let index: usize = digits
                    .parse()
                    .map_err(|_| PathError::InvalidIndex(digits.to_owned()))?;
                segments.push(Segment::Index(index));
            }
            match chars.next() {
                None => break,
                Some((_, '.')) => {
                    if chars.peek().is_none() {
                        return Err(PathError::EmptySegment(input.len()));
                    }
                }
                Some((i, c)) => return Err(PathError::Unexpected { ch: c, at: i }),
            }
        }
        Ok(Self { segments })
    }

    /// The segments of this path, root-first.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether this is the root path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a segment, returning the extended path.
    #[must_use]
    pub fn child(&self, segment: impl Into<Segment>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Append a segment in place.
    pub fn push(&mut self, segment: impl Into<Segment>) {
        self.segments.push(segment.into());
    }

    /// Remove and return the last segment.
    pub fn pop(&mut self) -> Option<Segment> {
        self.segments.pop()
    }
}

impl FromIterator<Segment> for Path {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(k) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(k)?;
                }
                Segment::Index(n) => write!(f, "[{n}]")?,
            }
        }
        Ok(())
    }
}
