#![forbid(unsafe_code)]

//! The immutable state tree.
//!
//! [`Value`] is a JSON-shaped tree whose container nodes (`Str`, `List`,
//! `Map`) are reference counted. Cloning a `Value` copies pointers, never
//! subtrees, so a snapshot clone is O(1) and two snapshots share every node
//! that neither has touched.
//!
//! Mutation goes through [`Rc::make_mut`]: writing to a node whose `Rc` is
//! shared clones that node (and only that node), so an edit re-allocates the
//! spine from the root to the edited child and nothing else. [`advance`]
//! builds on this to give the snapshot-producer contract: every subtree the
//! mutator does not touch is reference-identical between the old and new
//! snapshot.
//!
//! # Identity
//!
//! [`Value::same`] is the change-detection predicate: containers compare by
//! pointer ([`Rc::ptr_eq`]), scalars by value, `Float` via `==` so NaN is
//! never `same` as anything including itself. `PartialEq` on `Value` is deep
//! structural equality and is *not* what reconciliation uses.
//!
//! # Invariants
//!
//! 1. `a.clone().same(&a)` holds for every `a` (pointer copy).
//! 2. After `let new = advance(&old, m)`, `old.at(p).same(new.at(p))` holds
//!    for every path `p` the mutator `m` did not write through.
//! 3. Map children enumerate in insertion order; list children in index
//!    order.

use std::rc::Rc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::path::{Path, PathError, Segment};

/// Insertion-ordered map node. Exposed for construction; prefer [`tree!`]
/// (crate::tree!) in most code.
pub type Map = IndexMap<String, Value>;

/// Error from a write operation on a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The textual path did not parse.
    #[error(transparent)]
    Path(#[from] PathError),
    /// A parent named by the path does not exist.
    #[error("no value at {0}")]
    Missing(Path),
    /// The node at the path cannot take this operation (e.g. indexing a
    /// map, pushing onto a scalar).
    #[error("wrong node kind at {at}: expected {expected}")]
    Kind {
        /// Path of the offending node.
        at: Path,
        /// What the operation needed there.
        expected: &'static str,
    },
    /// A list write past the end of the list.
    #[error("index {index} out of bounds at {at} (len {len})")]
    OutOfBounds {
        /// Path of the list node.
        at: Path,
        /// The requested index.
        index: usize,
        /// Current list length.
        len: usize,
    },
}

/// A node in the state tree. See the module docs.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absent / explicit null.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Floating-point scalar.
    Float(f64),
    /// Shared string.
    Str(Rc<str>),
    /// Ordered sequence of child values.
    List(Rc<Vec<Value>>),
    /// Insertion-ordered mapping from keys to child values.
    Map(Rc<Map>),
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl Value {
    /// An empty map node — the shape every engine snapshot starts from.
    #[must_use]
    pub fn empty_map() -> Self {
        Value::Map(Rc::new(Map::new()))
    }

    /// An empty list node.
    #[must_use]
    pub fn empty_list() -> Self {
        Value::List(Rc::new(Vec::new()))
    }

    // -----------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------

    /// Reference-identity comparison, the reconciliation change predicate.
    ///
    /// Containers are `same` only when they are the *same allocation*;
    /// scalars compare by value. `Float` uses `==`, so a NaN value reads as
    /// changed on every cycle (mirrors JS `!==`).
    #[must_use]
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b) || a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    /// The child under one segment, if present.
    #[must_use]
    pub fn child(&self, segment: &Segment) -> Option<&Value> {
        match (self, segment) {
            (Value::Map(map), Segment::Key(k)) => map.get(k.as_str()),
            (Value::List(list), Segment::Index(i)) => list.get(*i),
            _ => None,
        }
    }

    /// The value at a concrete path, if every step exists.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&Value> {
        let mut node = self;
        for segment in path.segments() {
            node = node.child(segment)?;
        }
        Some(node)
    }

    /// Convenience read through a textual path; `None` covers both a
    /// malformed path and a missing value.
    #[must_use]
    pub fn at(&self, path: &str) -> Option<&Value> {
        self.get(&Path::parse(path).ok()?)
    }

    /// Boolean payload, if this is a `Bool`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload, if this is an `Int`.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Float payload; `Int` widens losslessly enough for display math.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            #[allow(clippy::cast_precision_loss)]
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// String payload, if this is a `Str`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// List children, if this is a `List`.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Map node, if this is a `Map`.
    #[must_use]
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Whether this is `Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Child count of a container; 0 for scalars.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Value::List(list) => list.len(),
            Value::Map(map) => map.len(),
            _ => 0,
        }
    }

    /// Whether a container has no children (scalars read as empty).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -----------------------------------------------------------------
    // Writes (copy-on-write)
    // -----------------------------------------------------------------

    /// Mutable access to the child under one segment, copying shared nodes
    /// on the way.
    pub fn child_mut(&mut self, segment: &Segment) -> Option<&mut Value> {
        match (self, segment) {
            (Value::Map(map), Segment::Key(k)) => Rc::make_mut(map).get_mut(k.as_str()),
            (Value::List(list), Segment::Index(i)) => Rc::make_mut(list).get_mut(*i),
            _ => None,
        }
    }

    /// Mutable access to the value at a concrete path. The whole spine from
    /// this node down to the target is made uniquely owned.
    pub fn get_mut(&mut self, path: &Path) -> Option<&mut Value> {
        let mut node = self;
        for segment in path.segments() {
            node = node.child_mut(segment)?;
        }
        Some(node)
    }

    /// Convenience write-access through a textual path.
    pub fn at_mut(&mut self, path: &str) -> Option<&mut Value> {
        self.get_mut(&Path::parse(path).ok()?)
    }

    /// Insert or replace a map child on this node.
    ///
    /// # Errors
    ///
    /// [`TreeError::Kind`] if this node is not a map.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<(), TreeError> {
        match self {
            Value::Map(map) => {
                Rc::make_mut(map).insert(key.into(), value.into());
                Ok(())
            }
            _ => Err(TreeError::Kind {
                at: Path::root(),
                expected: "map",
            }),
        }
    }

    /// Remove a map child from this node, returning it if it was present.
    pub fn remove_key(&mut self, key: &str) -> Option<Value> {
        match self {
            Value::Map(map) => Rc::make_mut(map).shift_remove(key),
            _ => None,
        }
    }

    /// Append to a list node.
    ///
    /// # Errors
    ///
    /// [`TreeError::Kind`] if this node is not a list.
    pub fn push_item(&mut self, value: impl Into<Value>) -> Result<(), TreeError> {
        match self {
            Value::List(list) => {
                Rc::make_mut(list).push(value.into());
                Ok(())
            }
            _ => Err(TreeError::Kind {
                at: Path::root(),
                expected: "list",
            }),
        }
    }

    /// Remove and return the last element of a list node.
    pub fn pop_item(&mut self) -> Option<Value> {
        match self {
            Value::List(list) => Rc::make_mut(list).pop(),
            _ => None,
        }
    }

    /// Set the value at `path`, creating the final map key if absent. All
    /// intermediate nodes must already exist; a list index must be in
    /// bounds or exactly one past the end (append).
    ///
    /// # Errors
    ///
    /// [`TreeError`] when the path is malformed, a parent is missing or of
    /// the wrong kind, or a list index is out of range.
    pub fn set_at(&mut self, path: &str, value: impl Into<Value>) -> Result<(), TreeError> {
        let parsed = Path::parse(path)?;
        let Some(last) = parsed.segments().last() else {
            return Err(PathError::Empty.into());
        };
        let mut parent_path = parsed.clone();
        parent_path.pop();
        let parent = self
            .get_mut(&parent_path)
            .ok_or_else(|| TreeError::Missing(parent_path.clone()))?;
        match (parent, last) {
            (Value::Map(map), Segment::Key(k)) => {
                Rc::make_mut(map).insert(k.clone(), value.into());
                Ok(())
            }
            (Value::List(list), Segment::Index(i)) => {
                let list = Rc::make_mut(list);
                match (*i).cmp(&list.len()) {
                    std::cmp::Ordering::Less => {
                        list[*i] = value.into();
                        Ok(())
                    }
                    std::cmp::Ordering::Equal => {
                        list.push(value.into());
                        Ok(())
                    }
                    std::cmp::Ordering::Greater => Err(TreeError::OutOfBounds {
                        at: parent_path,
                        index: *i,
                        len: list.len(),
                    }),
                }
            }
            (_, Segment::Key(_)) => Err(TreeError::Kind {
                at: parent_path,
                expected: "map",
            }),
            (_, Segment::Index(_)) => Err(TreeError::Kind {
                at: parent_path,
                expected: "list",
            }),
        }
    }

    /// Remove the value at `path`, returning it if it was present.
    ///
    /// Removing from a list shifts later elements down. Missing paths are a
    /// no-op returning `None` (removal is idempotent).
    ///
    /// # Errors
    ///
    /// [`TreeError::Path`] when the path is malformed.
    pub fn remove_at(&mut self, path: &str) -> Result<Option<Value>, TreeError> {
        let parsed = Path::parse(path)?;
        let Some(last) = parsed.segments().last() else {
            return Err(PathError::Empty.into());
        };
        let mut parent_path = parsed.clone();
        parent_path.pop();
        let Some(parent) = self.get_mut(&parent_path) else {
            return Ok(None);
        };
        Ok(match (parent, last) {
            (Value::Map(map), Segment::Key(k)) => Rc::make_mut(map).shift_remove(k.as_str()),
            (Value::List(list), Segment::Index(i)) => {
                let list = Rc::make_mut(list);
                if *i < list.len() {
                    Some(list.remove(*i))
                } else {
                    None
                }
            }
            _ => None,
        })
    }

    /// Append to the list at `path`.
    ///
    /// # Errors
    ///
    /// [`TreeError`] when the path is malformed or missing, or the node is
    /// not a list.
    pub fn push_at(&mut self, path: &str, value: impl Into<Value>) -> Result<(), TreeError> {
        let parsed = Path::parse(path)?;
        let node = self
            .get_mut(&parsed)
            .ok_or_else(|| TreeError::Missing(parsed.clone()))?;
        match node {
            Value::List(list) => {
                Rc::make_mut(list).push(value.into());
                Ok(())
            }
            _ => Err(TreeError::Kind {
                at: parsed,
                expected: "list",
            }),
        }
    }

    /// Pop the last element off the list at `path`.
    ///
    /// # Errors
    ///
    /// [`TreeError`] when the path is malformed or missing, or the node is
    /// not a list.
    pub fn pop_at(&mut self, path: &str) -> Result<Option<Value>, TreeError> {
        let parsed = Path::parse(path)?;
        let node = self
            .get_mut(&parsed)
            .ok_or_else(|| TreeError::Missing(parsed.clone()))?;
        match node {
            Value::List(list) => Ok(Rc::make_mut(list).pop()),
            _ => Err(TreeError::Kind {
                at: parsed,
                expected: "list",
            }),
        }
    }
}

// ---------------------------------------------------------------------
// Snapshot producer
// ---------------------------------------------------------------------

/// Produce the next snapshot from `snapshot` by running `mutate` on a draft.
///
/// The draft starts as a pointer copy of `snapshot`; because `snapshot`'s
/// own `Rc`s stay alive for the duration, every write inside `mutate` copies
/// the nodes it goes through and leaves the rest shared. The previous
/// snapshot is never modified.
#[must_use]
pub fn advance(snapshot: &Value, mutate: impl FnOnce(&mut Value)) -> Value {
    let mut draft = snapshot.clone();
    mutate(&mut draft);
    draft
}

// ---------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        // Indices and counts; saturate rather than wrap on 32-bit targets.
        Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s.as_str()))
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(Rc::new(map))
    }
}

impl From<Vec<Value>> for Value {
    fn from(list: Vec<Value>) -> Self {
        Value::List(Rc::new(list))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::List(Rc::new(iter.into_iter().collect()))
    }
}

impl FromIterator<(String, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Value::Map(Rc::new(iter.into_iter().collect()))
    }
}
