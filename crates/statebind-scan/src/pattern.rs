#![forbid(unsafe_code)]

//! The declaration pattern language.
//!
//! A [`Pattern`] is a concrete [`Path`](statebind_tree::Path) syntax with
//! wildcard forms added:
//!
//! | form   | matches                                      |
//! |--------|----------------------------------------------|
//! | `name` | exactly that map key                         |
//! | `*`    | any single map key                           |
//! | `[n]`  | list index `n`                               |
//! | `[*]`  | any single list index                        |
//! | `**`   | one or more segments of any kind             |
//!
//! So `state.items[*].name` matches `state.items[0].name`,
//! `state.items[1].name`, … and `state.**` matches every path strictly
//! below `state`.
//!
//! # Invariants
//!
//! 1. A `*` or `**` atom stands alone: `a*`, `*a` and `***` are parse
//!    errors, never partial-wildcard matches.
//! 2. `Pattern::matches` is exact (the whole path), `could_match_deeper`
//!    is the traversal-pruning relaxation: it never returns `false` for a
//!    path that has a matching extension.

use core::fmt;
use std::str::FromStr;

use statebind_tree::Segment;
use thiserror::Error;

/// Error parsing a pattern string. Surfaces from the engine at apply time
/// as a configuration error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The pattern was empty.
    #[error("empty pattern")]
    Empty,
    /// A dotted segment had no atom, as in `a..b` or a trailing dot.
    #[error("empty segment at byte {0}")]
    EmptySegment(usize),
    /// A `[` without a matching `]`.
    #[error("unclosed bracket at byte {0}")]
    UnclosedBracket(usize),
    /// Bracket contents were neither a decimal index nor `*`.
    #[error("invalid bracket contents {0:?}")]
    InvalidBracket(String),
    /// A wildcard glued to other characters (`a*`, `***`), or a stray `]`.
    #[error("unexpected character {ch:?} at byte {at}")]
    Unexpected { ch: char, at: usize },
}

/// One step of a pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Literal map key.
    Key(String),
    /// `*`: any single map key.
    AnyKey,
    /// `[n]`: literal list index.
    Index(usize),
    /// `[*]`: any single list index.
    AnyIndex,
    /// `**`: one or more segments of any kind.
    Descend,
}

impl Step {
    /// Whether this step (other than [`Step::Descend`]) accepts one
    /// concrete segment.
    fn accepts(&self, segment: &Segment) -> bool {
        match (self, segment) {
            (Step::Key(k), Segment::Key(s)) => k == s,
            (Step::AnyKey, Segment::Key(_)) => true,
            (Step::Index(n), Segment::Index(i)) => n == i,
            (Step::AnyIndex, Segment::Index(_)) => true,
            (Step::Descend, _) => true,
            _ => false,
        }
    }
}

/// A parsed declaration pattern. See the module docs for syntax.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    text: String,
    steps: Vec<Step>,
}

impl Pattern {
    /// Parse a pattern from its textual form.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] describing the first malformed piece.
    pub fn parse(input: &str) -> Result<Self, PatternError> {
        if input.is_empty() {
            return Err(PatternError::Empty);
        }
        let mut steps = Vec::new();
        let mut chars = input.char_indices().peekable();
        loop {
            let start = chars.peek().map_or(input.len(), |&(i, _)| i);
            let mut atom_end = start;
            while let Some(&(i, c)) = chars.peek() {
                if c == '.' || c == '[' || c == ']' {
                    break;
                }
                chars.next();
                atom_end = i + c.len_utf8();
            }
            let atom = &input[start..atom_end];
            match atom {
                "" => match chars.peek() {
                    Some(&(i, ']')) => return Err(PatternError::Unexpected { ch: ']', at: i }),
                    Some(&(_, '[')) if !steps.is_empty() => {}
                    _ => return Err(PatternError::EmptySegment(start)),
                },
                "*" => steps.push(Step::AnyKey),
                "**" => steps.push(Step::Descend),
                _ => {
                    if let Some(off) = atom.find('*') {
                        return Err(PatternError::Unexpected {
                            ch: '*',
                            at: start + off,
                        });
                    }
                    steps.push(Step::Key(atom.to_owned()));
                }
            }
            // Bracket suffixes: `[3]`, `[*]`, possibly chained.
            while let Some(&(open, '[')) = chars.peek() {
                chars.next();
                let inner_start = open + 1;
                let mut inner_end = inner_start;
                let mut closed = false;
                for (i, c) in chars.by_ref() {
                    if c == ']' {
                        inner_end = i;
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(PatternError::UnclosedBracket(open));
                }
                let inner = &input[inner_start..inner_end];
                if inner == "*" {
                    steps.push(Step::AnyIndex);
                } else {
                    let index: usize = inner
                        .parse()
                        .map_err(|_| PatternError::InvalidBracket(inner.to_owned()))?;
                    steps.push(Step::Index(index));
                }
            }
            match chars.next() {
                None => break,
                Some((_, '.')) => {
                    if chars.peek().is_none() {
                        return Err(PatternError::EmptySegment(input.len()));
                    }
                }
                Some((i, c)) => return Err(PatternError::Unexpected { ch: c, at: i }),
            }
        }
        Ok(Self {
            text: input.to_owned(),
            steps,
        })
    }

    /// The original pattern text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The parsed steps.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Whether this pattern matches the whole concrete path.
    #[must_use]
    pub fn matches(&self, path: &[Segment]) -> bool {
        Self::matches_at(&self.steps, path)
    }

    fn matches_at(steps: &[Step], path: &[Segment]) -> bool {
        let Some(step) = steps.first() else {
            return path.is_empty();
        };
        match step {
            Step::Descend => {
                // Swallow one or more segments, then match the rest.
                (1..=path.len()).any(|k| Self::matches_at(&steps[1..], &path[k..]))
            }
            _ => path
                .first()
                .is_some_and(|seg| step.accepts(seg) && Self::matches_at(&steps[1..], &path[1..])),
        }
    }

    /// Whether some strict or non-strict extension of `path` could match.
    /// Used to prune tree traversal; may over-approximate below a `**`.
    #[must_use]
    pub fn could_match_deeper(&self, path: &[Segment]) -> bool {
        let mut steps: &[Step] = &self.steps;
        let mut path = path;
        loop {
            if path.is_empty() {
                return true;
            }
            let Some(step) = steps.first() else {
                return false;
            };
            if matches!(step, Step::Descend) {
                // Unbounded: any future suffix could satisfy the rest.
                return true;
            }
            if !step.accepts(&path[0]) {
                return false;
            }
            steps = &steps[1..];
            path = &path[1..];
        }
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statebind_tree::Path;

    fn segs(p: &str) -> Vec<Segment> {
        Path::parse(p).unwrap().segments().to_vec()
    }

    #[test]
    fn literal_match() {
        let p = Pattern::parse("state.foo").unwrap();
        assert!(p.matches(&segs("state.foo")));
        assert!(!p.matches(&segs("state.foo.bar")));
        assert!(!p.matches(&segs("state")));
        assert!(!p.matches(&segs("state.bar")));
    }

    #[test]
    fn key_wildcard() {
        let p = Pattern::parse("state.*").unwrap();
        assert!(p.matches(&segs("state.foo")));
        assert!(p.matches(&segs("state.bar")));
        assert!(!p.matches(&segs("state.foo.deep")));
        // `*` does not match list indices.
        assert!(!p.matches(&segs("state[0]")));
    }

    #[test]
    fn mid_path_wildcard() {
        let p = Pattern::parse("state.*.test").unwrap();
        assert!(p.matches(&segs("state.foo.test")));
        assert!(p.matches(&segs("state.bar.test")));
        assert!(!p.matches(&segs("state.foo.other")));
    }

    #[test]
    fn index_wildcards() {
        let p = Pattern::parse("state.foo[*]").unwrap();
        assert!(p.matches(&segs("state.foo[0]")));
        assert!(p.matches(&segs("state.foo[12]")));
        assert!(!p.matches(&segs("state.foo")));
        assert!(!p.matches(&segs("state.foo.k")));

        let p = Pattern::parse("grid[0][*]").unwrap();
        assert!(p.matches(&segs("grid[0][3]")));
        assert!(!p.matches(&segs("grid[1][3]")));
    }

    #[test]
    fn descend_matches_any_depth() {
        let p = Pattern::parse("state.**").unwrap();
        assert!(p.matches(&segs("state.a")));
        assert!(p.matches(&segs("state.a.b[2].c")));
        assert!(!p.matches(&segs("state")));
        assert!(!p.matches(&segs("other.a")));

        let p = Pattern::parse("**.name").unwrap();
        assert!(p.matches(&segs("a.name")));
        assert!(p.matches(&segs("a.b[0].name")));
        assert!(!p.matches(&segs("name")));
    }

    #[test]
    fn could_match_deeper_is_sound() {
        let p = Pattern::parse("state.items[*].name").unwrap();
        assert!(p.could_match_deeper(&segs("state")));
        assert!(p.could_match_deeper(&segs("state.items")));
        assert!(p.could_match_deeper(&segs("state.items[4]")));
        assert!(!p.could_match_deeper(&segs("other")));
        assert!(!p.could_match_deeper(&segs("state.meta")));
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(Pattern::parse(""), Err(PatternError::Empty));
        assert!(matches!(
            Pattern::parse("a..b"),
            Err(PatternError::EmptySegment(_))
        ));
        assert!(matches!(
            Pattern::parse("a*"),
            Err(PatternError::Unexpected { ch: '*', .. })
        ));
        assert!(matches!(
            Pattern::parse("***"),
            Err(PatternError::Unexpected { ch: '*', .. })
        ));
        assert!(matches!(
            Pattern::parse("a[b]"),
            Err(PatternError::InvalidBracket(_))
        ));
        assert!(matches!(
            Pattern::parse("a[1"),
            Err(PatternError::UnclosedBracket(_))
        ));
        assert!(matches!(
            Pattern::parse("a]"),
            Err(PatternError::Unexpected { ch: ']', .. })
        ));
    }
}
