#![forbid(unsafe_code)]

//! Immutable state tree with copy-on-write structural sharing.
//!
//! This crate is the snapshot half of `statebind`: a cheap-to-clone tree
//! value ([`Value`]), concrete path addressing ([`Path`]), and the snapshot
//! producer ([`advance`]) that turns a mutation closure into a fresh
//! snapshot while leaving every untouched subtree reference-identical to
//! the previous one.
//!
//! That sharing guarantee is what makes reconciliation O(1) per watched
//! path: the engine decides "changed or not" with [`Value::same`] — a
//! pointer comparison for containers — instead of deep equality.
//!
//! ```
//! use statebind_tree::{advance, tree};
//!
//! let old = tree!({ "a": { "n": 1 }, "b": { "n": 2 } });
//! let new = advance(&old, |draft| draft.set_at("b.n", 3).unwrap());
//!
//! assert!(old.at("a").unwrap().same(new.at("a").unwrap()));   // shared
//! assert!(!old.at("b").unwrap().same(new.at("b").unwrap()));  // copied spine
//! ```
//!
//! Single-threaded by design: nodes are `Rc`, matching the cooperative
//! execution model of the engine crate.

mod macros;
mod path;
mod value;

#[cfg(feature = "json")]
mod json;

pub use path::{Path, PathError, Segment};
pub use value::{Map, TreeError, Value, advance};
