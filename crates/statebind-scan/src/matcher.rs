#![forbid(unsafe_code)]

//! Tree traversal producing the per-cycle match set.
//!
//! [`scan`] walks a [`Value`] tree depth-first, pre-order — map children in
//! insertion order, list children in ascending index order — and emits one
//! [`MatchRecord`] per concrete path that satisfies at least one pattern.
//! Records therefore arrive in a deterministic order, and list-wildcard
//! matches arrive in ascending index order, which is what gives the engine
//! its "creates fire in list order" contract.
//!
//! Subtrees no pattern could possibly reach are not entered
//! ([`Pattern::could_match_deeper`]), so a scan costs traversal of the
//! *reachable* region, not the whole tree.

use smallvec::SmallVec;
use statebind_tree::{Path, Segment, Value};

use crate::pattern::Pattern;

/// One matched concrete path, produced fresh each cycle.
#[derive(Clone, Debug)]
pub struct MatchRecord {
    /// The concrete path, wildcards resolved.
    pub path: Path,
    /// The value at that path (pointer copy into the snapshot).
    pub value: Value,
    /// Indices into the scanned pattern slice, in declaration order.
    /// Non-empty by construction.
    pub matched: SmallVec<[usize; 2]>,
}

/// Enumerate every concrete path in `tree` matching at least one of
/// `patterns`. See the module docs for the ordering contract.
#[must_use]
pub fn scan(patterns: &[Pattern], tree: &Value) -> Vec<MatchRecord> {
    let mut records = Vec::new();
    let mut path = Path::root();
    visit(patterns, tree, &mut path, &mut records);
    records
}

fn visit(patterns: &[Pattern], node: &Value, path: &mut Path, records: &mut Vec<MatchRecord>) {
    if !path.is_empty() {
        let matched: SmallVec<[usize; 2]> = patterns
            .iter()
            .enumerate()
            .filter(|(_, p)| p.matches(path.segments()))
            .map(|(i, _)| i)
            .collect();
        if !matched.is_empty() {
            records.push(MatchRecord {
                path: path.clone(),
                value: node.clone(),
                matched,
            });
        }
    }
    match node {
        Value::Map(map) => {
            for (key, child) in map.iter() {
                path.push(Segment::Key(key.clone()));
                if reachable(patterns, path) {
                    visit(patterns, child, path, records);
                }
                let _ = path.pop();
            }
        }
        Value::List(list) => {
            for (index, child) in list.iter().enumerate() {
                path.push(Segment::Index(index));
                if reachable(patterns, path) {
                    visit(patterns, child, path, records);
                }
                let _ = path.pop();
            }
        }
        _ => {}
    }
}

fn reachable(patterns: &[Pattern], path: &Path) -> bool {
    patterns.iter().any(|p| p.could_match_deeper(path.segments()))
}
