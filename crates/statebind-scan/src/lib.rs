#![forbid(unsafe_code)]

//! Path-pattern matching over `statebind-tree` values.
//!
//! This crate is the pattern-matcher half of `statebind`: declarations like
//! `state.items[*].name` parse into [`Pattern`]s, and [`scan`] enumerates
//! the concrete paths of a snapshot that match any of them, in a
//! deterministic order the engine's lifecycle contract builds on.
//!
//! ```
//! use statebind_scan::{Pattern, scan};
//! use statebind_tree::tree;
//!
//! let patterns = vec![Pattern::parse("state.items[*]").unwrap()];
//! let snapshot = tree!({ "state": { "items": [1, 2, 3] } });
//!
//! let records = scan(&patterns, &snapshot);
//! let hits: Vec<String> = records.iter().map(|r| r.path.to_string()).collect();
//! assert_eq!(hits, ["state.items[0]", "state.items[1]", "state.items[2]"]);
//! ```

mod matcher;
mod pattern;

pub use matcher::{MatchRecord, scan};
pub use pattern::{Pattern, PatternError, Step};
