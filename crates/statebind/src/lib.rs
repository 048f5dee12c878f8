#![forbid(unsafe_code)]

//! One-way data binding over immutable state snapshots.
//!
//! `statebind` watches successive snapshots of an application's state tree
//! and fires lifecycle callbacks for the paths the application declared
//! interest in — `create` when a declared pattern first matches a concrete
//! path, `update` when the value reference at a matched path changes, and
//! `delete` when the path stops matching — without the application ever
//! diffing trees by hand.
//!
//! ```
//! use statebind::{Binding, Engine};
//! use statebind_tree::tree;
//!
//! let mut engine = Engine::builder()
//!     .bind("state.user", || {
//!         Binding::new()
//!             .on_create(|v, _| println!("user appeared: {v:?}"))
//!             .on_update(|v, _| println!("user changed: {v:?}"))
//!             .on_delete(|_| println!("user gone"))
//!     })
//!     .build();
//!
//! engine
//!     .apply(|d| *d = tree!({ "state": { "user": { "name": "ada" } } }))?  // create
//!     .apply(|d| d.set_at("state.user.name", "grace").unwrap())?          // update
//!     .apply(|d| *d = tree!({ "state": {} }))?;                           // delete
//! # Ok::<(), statebind::ApplyError>(())
//! ```
//!
//! # How it works
//!
//! Snapshots are [`statebind_tree::Value`]s: cheap-to-clone trees whose
//! unchanged subtrees stay reference-identical across
//! [`advance`](statebind_tree::advance) (structural sharing). The engine
//! therefore detects change with a pointer comparison per watched path —
//! never deep equality. Patterns (`state.items[*].name`, `config.**`) are
//! matched by [`statebind_scan`] in a deterministic order, which the
//! lifecycle contract inherits: list creates fire in ascending index
//! order, deletions replay in original binding order.
//!
//! Single-threaded and synchronous: one `apply` runs to completion before
//! returning, nested engines included. See [`engine`] for the re-entrancy
//! and failure contracts.

pub mod engine;
pub mod error;
pub mod lifecycle;

pub use engine::{Engine, EngineBuilder};
pub use error::ApplyError;
pub use lifecycle::{Binding, Lifecycle};

// Value appears in every Lifecycle signature; spare downstream crates the
// extra dependency line.
pub use statebind_tree::Value;

// The collaborator crates are part of the public contract.
pub use statebind_scan as scan;
pub use statebind_tree as tree;
