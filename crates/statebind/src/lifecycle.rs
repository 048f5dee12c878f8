#![forbid(unsafe_code)]

//! Lifecycle capabilities of a binding instance.
//!
//! A binding instance is whatever a declaration's factory returns: any type
//! implementing [`Lifecycle`]. All three methods default to no-ops, so an
//! implementor opts into exactly the capabilities it cares about — the
//! duck-typed `{create?, update?, delete?}` object of the dynamic-language
//! original, expressed as a trait with defaults.
//!
//! Two ways to get one:
//!
//! - implement [`Lifecycle`] on your own type (good for instances that
//!   carry state, e.g. a nested [`Engine`](crate::Engine));
//! - build a [`Binding`] from closures with `on_create` / `on_update` /
//!   `on_delete`.
//!
//! # Call contract (per bound (path, declaration) key)
//!
//! 1. `create(value, state)` — once, the cycle the key first matches.
//! 2. `update(value, state)` — any later cycle where the value reference
//!    at the path differs from the previously recorded one; never on the
//!    create cycle.
//! 3. `delete(state)` — once, the cycle the key stops matching; `state` is
//!    the snapshot the key is absent from.

use statebind_tree::Value;

/// Callbacks a binding instance may implement. All default to no-ops.
pub trait Lifecycle {
    /// The bound path matched for the first time. `value` is the matched
    /// value, `state` the full new snapshot.
    fn create(&mut self, value: &Value, state: &Value) {
        let _ = (value, state);
    }

    /// The value reference at the bound path changed since last cycle.
    fn update(&mut self, value: &Value, state: &Value) {
        let _ = (value, state);
    }

    /// The bound path stopped matching. `state` is the new snapshot (the
    /// one the path is absent from).
    fn delete(&mut self, state: &Value) {
        let _ = state;
    }
}

type ValueFn = Box<dyn FnMut(&Value, &Value)>;
type StateFn = Box<dyn FnMut(&Value)>;

/// Closure-built [`Lifecycle`] instance.
///
/// ```
/// use statebind::Binding;
///
/// let binding = Binding::new()
///     .on_create(|value, _state| println!("created: {value:?}"))
///     .on_delete(|_state| println!("gone"));
/// ```
///
/// Capabilities left unset stay no-ops.
#[derive(Default)]
pub struct Binding {
    create: Option<ValueFn>,
    update: Option<ValueFn>,
    delete: Option<StateFn>,
}

impl Binding {
    /// An instance with no capabilities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the create capability.
    #[must_use]
    pub fn on_create(mut self, f: impl FnMut(&Value, &Value) + 'static) -> Self {
        self.create = Some(Box::new(f));
        self
    }

    /// Set the update capability.
    #[must_use]
    pub fn on_update(mut self, f: impl FnMut(&Value, &Value) + 'static) -> Self {
        self.update = Some(Box::new(f));
        self
    }

    /// Set the delete capability.
    #[must_use]
    pub fn on_delete(mut self, f: impl FnMut(&Value) + 'static) -> Self {
        self.delete = Some(Box::new(f));
        self
    }
}

impl Lifecycle for Binding {
    fn create(&mut self, value: &Value, state: &Value) {
        if let Some(f) = &mut self.create {
            f(value, state);
        }
    }

    fn update(&mut self, value: &Value, state: &Value) {
        if let Some(f) = &mut self.update {
            f(value, state);
        }
    }

    fn delete(&mut self, state: &Value) {
        if let Some(f) = &mut self.delete {
            f(state);
        }
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("create", &self.create.is_some())
            .field("update", &self.update.is_some())
            .field("delete", &self.delete.is_some())
            .finish()
    }
}
