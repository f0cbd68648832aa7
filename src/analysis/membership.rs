//! Splits differences into ordinary changes and changes of published-API
//! membership, from four keyed views of the same declarations:
//! API-only and full, before and after.

use super::AnalysisError;
use crate::report::Report;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// A node together with the file it was declared in.
#[derive(Debug)]
pub struct Located<'a, T> {
    pub node: &'a T,
    pub location: &'a Path,
}

impl<T> Clone for Located<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Located<'_, T> {}

pub type Keyed<'a, T> = BTreeMap<String, Located<'a, T>>;

#[derive(Debug)]
pub struct MembershipSets<'a, T> {
    pub api_before: Keyed<'a, T>,
    pub api_after: Keyed<'a, T>,
    pub full_before: Keyed<'a, T>,
    pub full_after: Keyed<'a, T>,
}

impl<T> Default for MembershipSets<'_, T> {
    fn default() -> Self {
        Self {
            api_before: BTreeMap::new(),
            api_after: BTreeMap::new(),
            full_before: BTreeMap::new(),
            full_after: BTreeMap::new(),
        }
    }
}

impl<'a, T> MembershipSets<'a, T> {
    /// Sets for an analysis that ignores API status: the API views are the
    /// full views, so no membership changes can arise.
    pub fn unpublished(before: Keyed<'a, T>, after: Keyed<'a, T>) -> Self {
        Self {
            api_before: before.clone(),
            api_after: after.clone(),
            full_before: before,
            full_after: after,
        }
    }
}

/// Key sets derived from the four views. With API views being subsets of
/// the full views on each side:
/// `api_after − api_before = fully_added ⊎ membership_added`, and the mirror
/// for removals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipPartition {
    pub fully_added: BTreeSet<String>,
    pub membership_added: BTreeSet<String>,
    pub fully_removed: BTreeSet<String>,
    pub membership_removed: BTreeSet<String>,
    pub to_verify: BTreeSet<String>,
}

impl MembershipPartition {
    pub fn compute<A, B, C, D>(
        api_before: &BTreeMap<String, A>,
        api_after: &BTreeMap<String, B>,
        full_before: &BTreeMap<String, C>,
        full_after: &BTreeMap<String, D>,
    ) -> Self {
        let mut partition = MembershipPartition::default();

        for key in api_after.keys() {
            if api_before.contains_key(key) {
                partition.to_verify.insert(key.clone());
            } else if full_before.contains_key(key) {
                partition.membership_added.insert(key.clone());
            } else {
                partition.fully_added.insert(key.clone());
            }
        }
        for key in api_before.keys() {
            if api_after.contains_key(key) {
                continue;
            }
            if full_after.contains_key(key) {
                partition.membership_removed.insert(key.clone());
            } else {
                partition.fully_removed.insert(key.clone());
            }
        }

        partition
    }

    pub fn api_added(&self) -> BTreeSet<String> {
        self.fully_added
            .union(&self.membership_added)
            .cloned()
            .collect()
    }

    pub fn api_removed(&self) -> BTreeSet<String> {
        self.fully_removed
            .union(&self.membership_removed)
            .cloned()
            .collect()
    }
}

/// The two reports one divided analysis produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DividedReports {
    pub changes: Report,
    pub membership: Report,
}

impl DividedReports {
    pub fn merge_from(&mut self, other: DividedReports) {
        self.changes.merge_from(other.changes);
        self.membership.merge_from(other.membership);
    }
}

/// Emission rules of one declaration family under division.
pub trait MembershipRules {
    type Node;

    /// New to the whole codebase and published.
    fn added(
        &self,
        key: &str,
        after: Located<'_, Self::Node>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError>;

    /// Gone from the whole codebase, previously published.
    fn removed(
        &self,
        key: &str,
        before: Located<'_, Self::Node>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError>;

    /// Existed before without being published, published now.
    fn membership_added(
        &self,
        key: &str,
        before: Located<'_, Self::Node>,
        after: Located<'_, Self::Node>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError>;

    /// Still exists, no longer published.
    fn membership_removed(
        &self,
        key: &str,
        before: Located<'_, Self::Node>,
        after: Located<'_, Self::Node>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError>;

    /// Published on both sides.
    fn changed(
        &self,
        key: &str,
        before: Located<'_, Self::Node>,
        after: Located<'_, Self::Node>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError>;
}

pub fn divide<R: MembershipRules>(
    rules: &R,
    sets: &MembershipSets<'_, R::Node>,
) -> Result<DividedReports, AnalysisError> {
    let partition = MembershipPartition::compute(
        &sets.api_before,
        &sets.api_after,
        &sets.full_before,
        &sets.full_after,
    );
    let mut out = DividedReports::default();

    for key in &partition.fully_added {
        rules.added(key, sets.api_after[key], &mut out)?;
    }
    for key in &partition.fully_removed {
        rules.removed(key, sets.api_before[key], &mut out)?;
    }
    for key in &partition.membership_added {
        rules.membership_added(key, sets.full_before[key], sets.api_after[key], &mut out)?;
    }
    for key in &partition.membership_removed {
        rules.membership_removed(key, sets.api_before[key], sets.full_after[key], &mut out)?;
    }
    for key in &partition.to_verify {
        rules.changed(key, sets.api_before[key], sets.api_after[key], &mut out)?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn keys(names: &[&str]) -> BTreeMap<String, ()> {
        names.iter().map(|n| (n.to_string(), ())).collect()
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_partition() {
        let api_before = keys(&["kept", "dropped", "unpublished"]);
        let api_after = keys(&["kept", "brand_new", "published"]);
        let full_before = keys(&["kept", "dropped", "unpublished", "published"]);
        let full_after = keys(&["kept", "brand_new", "published", "unpublished"]);

        let partition =
            MembershipPartition::compute(&api_before, &api_after, &full_before, &full_after);

        assert_eq!(partition.fully_added, set(&["brand_new"]));
        assert_eq!(partition.membership_added, set(&["published"]));
        assert_eq!(partition.fully_removed, set(&["dropped"]));
        assert_eq!(partition.membership_removed, set(&["unpublished"]));
        assert_eq!(partition.to_verify, set(&["kept"]));
    }

    #[test]
    fn test_unpublished_sets_have_no_membership_changes() {
        let path = Path::new("a.php");
        let value = 1;
        let before: Keyed<'_, i32> = BTreeMap::from([(
            "a".to_string(),
            Located {
                node: &value,
                location: path,
            },
        )]);
        let sets = MembershipSets::unpublished(before, BTreeMap::new());
        let partition = MembershipPartition::compute(
            &sets.api_before,
            &sets.api_after,
            &sets.full_before,
            &sets.full_after,
        );
        assert!(partition.membership_removed.is_empty());
        assert_eq!(partition.fully_removed, set(&["a"]));
    }

    fn views() -> impl Strategy<Value = (BTreeSet<u8>, BTreeSet<u8>, BTreeSet<u8>, BTreeSet<u8>)> {
        (
            prop::collection::btree_set(0u8..16, 0..10),
            prop::collection::btree_set(0u8..16, 0..10),
            prop::collection::btree_set(0u8..16, 0..10),
            prop::collection::btree_set(0u8..16, 0..10),
        )
            .prop_map(|(api_b, extra_b, api_a, extra_a)| {
                let full_b = api_b.union(&extra_b).copied().collect();
                let full_a = api_a.union(&extra_a).copied().collect();
                (api_b, full_b, api_a, full_a)
            })
    }

    fn as_map(set: &BTreeSet<u8>) -> BTreeMap<String, ()> {
        set.iter().map(|n| (format!("k{}", n), ())).collect()
    }

    proptest! {
        #[test]
        fn prop_api_added_is_disjoint_union((api_b, full_b, api_a, full_a) in views()) {
            let api_before = as_map(&api_b);
            let api_after = as_map(&api_a);
            let full_before = as_map(&full_b);
            let full_after = as_map(&full_a);
            let partition =
                MembershipPartition::compute(&api_before, &api_after, &full_before, &full_after);

            let expected_added: BTreeSet<String> = api_after
                .keys()
                .filter(|k| !api_before.contains_key(*k))
                .cloned()
                .collect();
            let expected_fully_added: BTreeSet<String> = api_after
                .keys()
                .filter(|k| !full_before.contains_key(*k))
                .cloned()
                .collect();

            prop_assert!(partition.fully_added.is_disjoint(&partition.membership_added));
            prop_assert_eq!(partition.api_added(), expected_added);
            prop_assert_eq!(&partition.fully_added, &expected_fully_added);

            prop_assert!(partition.fully_removed.is_disjoint(&partition.membership_removed));
            let expected_removed: BTreeSet<String> = api_before
                .keys()
                .filter(|k| !api_after.contains_key(*k))
                .cloned()
                .collect();
            prop_assert_eq!(partition.api_removed(), expected_removed);
        }
    }
}
