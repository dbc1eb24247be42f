//! Canonical ordering of a flat edge list
//!
//! Edges chain by id equality: the `child` of an edge is the key under which
//! the next level's edges are looked up as `parent`. The walk starts from the
//! edges whose parent is `None` and visits each level sorted by name, so the
//! output reads top to bottom like an indented outline.

use crate::collate::compare_optional_names;
use crate::model::{EdgeRecord, NodeKey};
use log::debug;
use std::collections::{HashMap, HashSet};

type Groups<'a> = HashMap<Option<&'a NodeKey>, Vec<&'a EdgeRecord>>;

/// Sort `edges` depth-first with siblings in name order, recomputing `level`
///
/// Returns a fresh vector and never fails. Edges whose parent cannot be
/// reached from a root are dropped. Each parent key is expanded once, so
/// cyclic input terminates and a node listed under two parents only has its
/// children emitted under the first one visited.
pub fn sort_structure(edges: &[EdgeRecord]) -> Vec<EdgeRecord> {
    if edges.is_empty() {
        return Vec::new();
    }

    let mut groups: Groups<'_> = HashMap::new();
    for edge in edges {
        groups.entry(edge.parent.as_ref()).or_default().push(edge);
    }
    for siblings in groups.values_mut() {
        siblings.sort_by(|a, b| compare_optional_names(a.name.as_deref(), b.name.as_deref()));
    }

    let sorted = walk(&groups, edges.len());
    if sorted.len() < edges.len() {
        debug!(
            "Dropped {} edge(s) not reachable from a root",
            edges.len() - sorted.len()
        );
    }

    sorted
}

/// Depth-first from the roots, one stack frame per open sibling group
fn walk(groups: &Groups<'_>, capacity: usize) -> Vec<EdgeRecord> {
    let mut sorted = Vec::with_capacity(capacity);
    let mut expanded = HashSet::from([None]);
    let mut stack = Vec::new();
    if let Some(roots) = groups.get(&None) {
        stack.push((roots.iter(), 0u32));
    }

    while let Some((siblings, level)) = stack.last_mut() {
        let level = *level;
        let Some(&edge) = siblings.next() else {
            stack.pop();
            continue;
        };

        let mut placed = edge.clone();
        placed.level = level;
        sorted.push(placed);

        let key = Some(&edge.child);
        if expanded.insert(key) {
            if let Some(children) = groups.get(&key) {
                stack.push((children.iter(), level.saturating_add(1)));
            }
        }
    }

    sorted
}
