//! Keyed before/after comparison shared by every analyzer.

use super::membership::Keyed;
use crate::model::Context;
use crate::report::Report;
use crate::snapshot::Registry;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Partition of the union of two key sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDiff<K> {
    pub added: BTreeSet<K>,
    pub removed: BTreeSet<K>,
    pub common: BTreeSet<K>,
}

impl<K> Default for KeyDiff<K> {
    fn default() -> Self {
        Self {
            added: BTreeSet::new(),
            removed: BTreeSet::new(),
            common: BTreeSet::new(),
        }
    }
}

impl<K: Ord> KeyDiff<K> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

pub fn diff_keys<K: Ord + Clone, B, A>(
    before: &BTreeMap<K, B>,
    after: &BTreeMap<K, A>,
) -> KeyDiff<K> {
    let mut diff = KeyDiff::default();
    for key in after.keys() {
        if before.contains_key(key) {
            diff.common.insert(key.clone());
        } else {
            diff.added.insert(key.clone());
        }
    }
    for key in before.keys() {
        if !after.contains_key(key) {
            diff.removed.insert(key.clone());
        }
    }
    diff
}

/// Per-node-type emission rules. `changed` is called for every common key and
/// decides by explicit field comparison whether anything changed.
pub trait NodeRules {
    type Node;

    fn added(&self, key: &str, node: &Self::Node, location: &Path, report: &mut Report);

    fn removed(&self, key: &str, node: &Self::Node, location: &Path, report: &mut Report);

    fn changed(
        &self,
        key: &str,
        before: &Self::Node,
        after: &Self::Node,
        location: &Path,
        report: &mut Report,
    );
}

/// Diff one context of two registries. Added and changed operations point at
/// the "after" file, removed ones at the "before" file.
pub fn diff_registry<R: NodeRules>(
    rules: &R,
    context: &Context,
    before: &Registry<R::Node>,
    after: &Registry<R::Node>,
) -> Report {
    let before_entries = before.entries(context);
    let after_entries = after.entries(context);
    let keys = diff_keys(&before_entries, &after_entries);

    tracing::debug!(
        %context,
        added = keys.added.len(),
        removed = keys.removed.len(),
        common = keys.common.len(),
        "Diffing registry"
    );

    let mut report = Report::new();
    for key in &keys.added {
        let location = after.location(context, key).unwrap_or(Path::new(""));
        rules.added(key, after_entries[key], location, &mut report);
    }
    for key in &keys.removed {
        let location = before.location(context, key).unwrap_or(Path::new(""));
        rules.removed(key, before_entries[key], location, &mut report);
    }
    for key in &keys.common {
        let location = after.location(context, key).unwrap_or(Path::new(""));
        rules.changed(
            key,
            before_entries[key],
            after_entries[key],
            location,
            &mut report,
        );
    }
    report
}

/// Diff nested nodes that all live in one file on each side.
pub fn diff_map<R: NodeRules>(
    rules: &R,
    before: &BTreeMap<String, &R::Node>,
    after: &BTreeMap<String, &R::Node>,
    location: &Path,
    report: &mut Report,
) {
    let keys = diff_keys(before, after);
    for key in &keys.added {
        rules.added(key, after[key], location, report);
    }
    for key in &keys.removed {
        rules.removed(key, before[key], location, report);
    }
    for key in &keys.common {
        rules.changed(key, before[key], after[key], location, report);
    }
}

/// Diff nested nodes that may come from different files, each carrying its
/// own declaration site.
pub fn diff_located<R: NodeRules>(
    rules: &R,
    before: &Keyed<'_, R::Node>,
    after: &Keyed<'_, R::Node>,
    report: &mut Report,
) {
    let keys = diff_keys(before, after);
    for key in &keys.added {
        let node = after[key];
        rules.added(key, node.node, node.location, report);
    }
    for key in &keys.removed {
        let node = before[key];
        rules.removed(key, node.node, node.location, report);
    }
    for key in &keys.common {
        let (old, new) = (before[key], after[key]);
        rules.changed(key, old.node, new.node, new.location, report);
    }
}
