#![forbid(unsafe_code)]

//! The reconciliation engine.
//!
//! An [`Engine`] owns the current snapshot plus one live binding instance
//! per currently matched (path, declaration) key. Each [`Engine::apply`]
//! cycle advances the snapshot through the mutator, re-enumerates matches,
//! and drives lifecycle transitions:
//!
//! - a key matching for the first time instantiates the declaration's
//!   factory and fires `create`;
//! - a key whose value reference changed fires `update`;
//! - a key that stopped matching fires `delete` and drops its instance.
//!
//! Change detection is [`Value::same`] — reference identity — made
//! meaningful by the snapshot producer's structural-sharing guarantee:
//! untouched subtrees keep their allocation across [`advance`], so a
//! pointer comparison per path is both necessary and sufficient.
//!
//! # Invariants
//!
//! 1. At most one live instance per (path, declaration) key; the instance
//!    is never replaced while the key stays matched.
//! 2. `create` and `delete` fire exactly once per match episode; `update`
//!    never fires on the create cycle.
//! 3. Transitions run in scan order (maps in insertion order, lists in
//!    ascending index order, matched declarations in declaration order);
//!    deletions run after all matches, in original binding order.
//! 4. The bound map is rebuilt into a fresh container each cycle and
//!    swapped in at commit, never edited in place mid-cycle.
//!
//! # Failure modes
//!
//! Fail-fast, no partial-cycle rollback: a malformed pattern aborts the
//! cycle with [`ApplyError::Pattern`] before any callback runs; a panic in
//! a callback unwinds through `apply`, leaving the engine in whatever
//! state the cycle had committed at that point. Callers that catch such a
//! panic must discard the engine rather than keep applying.
//!
//! # Re-entrancy
//!
//! `apply` takes `&mut self`, so a callback cannot re-enter its own
//! engine; that is rejected at compile time (and an `Rc<RefCell<Engine>>`
//! wrapper turns it into a borrow panic). The supported pattern for
//! scoped bindings is a *nested* engine owned by the binding instance —
//! engines share nothing, so nested cycles cannot corrupt the outer one.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use statebind_scan::{Pattern, scan};
use statebind_tree::{Path, Value, advance};
use tracing::{debug, trace};

use crate::error::ApplyError;
use crate::lifecycle::Lifecycle;

/// A (concrete path, declaration index) binding key. A path matched by two
/// declarations is tracked as two independent keys, each with its own
/// instance and lifecycle.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct BindKey {
    path: Path,
    declaration: usize,
}

struct BoundEntry {
    instance: Box<dyn Lifecycle>,
    /// Last value reference seen at the path; the comparand for `update`.
    last: Value,
}

/// Insertion-ordered so deletions replay in original binding order.
type BoundMap = IndexMap<BindKey, BoundEntry, FxBuildHasher>;

struct Declaration {
    text: String,
    factory: Box<dyn Fn() -> Box<dyn Lifecycle>>,
}

/// Builder for an [`Engine`]. Declarations are immutable once built.
#[derive(Default)]
pub struct EngineBuilder {
    declarations: Vec<Declaration>,
}

impl EngineBuilder {
    /// Declare interest in a pattern. `factory` is called once per concrete
    /// path the pattern matches, the cycle that path first matches.
    ///
    /// Pattern syntax is validated on the first `apply`, not here.
    #[must_use]
    pub fn bind<B, F>(mut self, pattern: impl Into<String>, factory: F) -> Self
    where
        B: Lifecycle + 'static,
        F: Fn() -> B + 'static,
    {
        self.declarations.push(Declaration {
            text: pattern.into(),
            factory: Box::new(move || -> Box<dyn Lifecycle> { Box::new(factory()) }),
        });
        self
    }

    /// Finish, producing an engine with an empty-map initial snapshot.
    #[must_use]
    pub fn build(self) -> Engine {
        Engine {
            declarations: self.declarations,
            patterns: None,
            state: Value::empty_map(),
            bound: BoundMap::default(),
        }
    }
}

impl std::fmt::Debug for EngineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineBuilder")
            .field(
                "patterns",
                &self
                    .declarations
                    .iter()
                    .map(|d| d.text.as_str())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// The reconciler. See the module docs for the lifecycle contract.
///
/// ```
/// use statebind::{Binding, Engine};
/// use statebind_tree::tree;
///
/// let mut engine = Engine::builder()
///     .bind("state.items[*]", || {
///         Binding::new().on_create(|value, _state| {
///             println!("new item: {:?}", value.as_int());
///         })
///     })
///     .build();
///
/// engine
///     .apply(|draft| *draft = tree!({ "state": { "items": [1, 2, 3] } }))?
///     .apply(|draft| draft.push_at("state.items", 4).unwrap())?;
/// # Ok::<(), statebind::ApplyError>(())
/// ```
pub struct Engine {
    declarations: Vec<Declaration>,
    /// Parsed on first `apply`; kept in declaration order.
    patterns: Option<Vec<Pattern>>,
    state: Value,
    bound: BoundMap,
}

impl Engine {
    /// Start declaring bindings.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The committed snapshot. Before the first `apply` this is an empty
    /// map — the value the first mutator's draft starts from.
    #[must_use]
    pub fn state(&self) -> &Value {
        &self.state
    }

    /// Number of live bound (path, declaration) keys.
    #[must_use]
    pub fn active_bindings(&self) -> usize {
        self.bound.len()
    }

    /// Run one reconciliation cycle: advance the snapshot through
    /// `mutate`, re-match, fire lifecycle transitions, commit.
    ///
    /// Returns `&mut Self`, so cycles chain:
    ///
    /// ```
    /// # use statebind::Engine;
    /// # use statebind_tree::tree;
    /// # let mut engine = Engine::builder().build();
    /// engine
    ///     .apply(|d| *d = tree!({ "n": 0 }))?
    ///     .apply(|d| d.set_at("n", 1).unwrap())?;
    /// # Ok::<(), statebind::ApplyError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// [`ApplyError::Pattern`] if a declared pattern is malformed
    /// (detected on the first cycle, before any callback runs).
    pub fn apply(&mut self, mutate: impl FnOnce(&mut Value)) -> Result<&mut Self, ApplyError> {
        if self.patterns.is_none() {
            let mut parsed = Vec::with_capacity(self.declarations.len());
            for declaration in &self.declarations {
                parsed.push(Pattern::parse(&declaration.text).map_err(|source| {
                    ApplyError::Pattern {
                        pattern: declaration.text.clone(),
                        source,
                    }
                })?);
            }
            self.patterns = Some(parsed);
        }
        let patterns = self.patterns.as_deref().unwrap_or_default();

        let next_state = advance(&self.state, mutate);
        let records = scan(patterns, &next_state);

        let mut next_bound = BoundMap::default();
        for record in records {
            trace!(path = %record.path, declarations = record.matched.len(), "matched");
            for &declaration in &record.matched {
                let key = BindKey {
                    path: record.path.clone(),
                    declaration,
                };
                // shift_remove keeps the leftovers (the keys that will be
                // deleted below) in original binding order.
                match self.bound.shift_remove(&key) {
                    None => {
                        let mut instance = (self.declarations[declaration].factory)();
                        instance.create(&record.value, &next_state);
                        next_bound.insert(
                            key,
                            BoundEntry {
                                instance,
                                last: record.value.clone(),
                            },
                        );
                    }
                    Some(mut entry) => {
                        if !entry.last.same(&record.value) {
                            entry.instance.update(&record.value, &next_state);
                        }
                        entry.last = record.value.clone();
                        next_bound.insert(key, entry);
                    }
                }
            }
        }

        // Everything still in the old map stopped matching this cycle.
        for (key, mut entry) in self.bound.drain(..) {
            debug!(path = %key.path, "unbound");
            entry.instance.delete(&next_state);
        }

        self.bound = next_bound;
        self.state = next_state;
        Ok(self)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field(
                "patterns",
                &self
                    .declarations
                    .iter()
                    .map(|d| d.text.as_str())
                    .collect::<Vec<_>>(),
            )
            .field("active_bindings", &self.bound.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Binding;
    use statebind_tree::tree;

    #[test]
    fn malformed_pattern_fails_the_first_apply() {
        let mut engine = Engine::builder().bind("state..foo", Binding::new).build();
        let err = engine.apply(|_| {}).err().expect("must fail");
        let ApplyError::Pattern { pattern, .. } = err;
        assert_eq!(pattern, "state..foo");
        // And keeps failing; nothing was committed.
        assert!(engine.apply(|_| {}).is_err());
        assert_eq!(engine.active_bindings(), 0);
    }

    #[test]
    fn initial_snapshot_is_an_empty_map() {
        let engine = Engine::builder().build();
        assert!(engine.state().as_map().is_some());
        assert!(engine.state().is_empty());
    }

    #[test]
    fn apply_chains() {
        let mut engine = Engine::builder().build();
        engine
            .apply(|d| *d = tree!({ "n": 0 }))
            .unwrap()
            .apply(|d| d.set_at("n", 1).unwrap())
            .unwrap();
        assert_eq!(engine.state().at("n").unwrap().as_int(), Some(1));
    }

    #[test]
    fn active_bindings_tracks_matches() {
        let mut engine = Engine::builder().bind("xs[*]", Binding::new).build();
        engine
            .apply(|d| *d = tree!({ "xs": [1, 2, 3] }))
            .unwrap();
        assert_eq!(engine.active_bindings(), 3);
        engine.apply(|d| *d = tree!({})).unwrap();
        assert_eq!(engine.active_bindings(), 0);
    }

    #[test]
    fn factory_runs_once_per_matched_path() {
        use std::cell::Cell;
        use std::rc::Rc;

        let made = Rc::new(Cell::new(0));
        let m = Rc::clone(&made);
        let mut engine = Engine::builder()
            .bind("xs[*]", move || {
                m.set(m.get() + 1);
                Binding::new()
            })
            .build();
        engine
            .apply(|d| *d = tree!({ "xs": [1, 2] }))
            .unwrap()
            .apply(|d| d.set_at("xs[0]", 9).unwrap())
            .unwrap();
        assert_eq!(made.get(), 2);
    }
}
