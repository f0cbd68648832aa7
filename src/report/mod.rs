//! Aggregation of classified operations, bucketed by context and level.

use crate::model::{Context, Level, Operation};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    differences: BTreeMap<Context, BTreeMap<Level, Vec<Operation>>>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// File an operation under its own context and level.
    pub fn add(&mut self, operation: Operation) {
        self.differences
            .entry(operation.context.clone())
            .or_default()
            .entry(operation.level)
            .or_default()
            .push(operation);
    }

    pub fn extend(&mut self, operations: impl IntoIterator<Item = Operation>) {
        for operation in operations {
            self.add(operation);
        }
    }

    /// Per-cell union, creating contexts this report has not seen.
    pub fn merge(mut self, other: Report) -> Self {
        self.merge_from(other);
        self
    }

    pub fn merge_from(&mut self, other: Report) {
        for (context, levels) in other.differences {
            let cells = self.differences.entry(context).or_default();
            for (level, operations) in levels {
                cells.entry(level).or_default().extend(operations);
            }
        }
    }

    pub fn has_differences(&self, context: &Context) -> bool {
        self.differences
            .get(context)
            .is_some_and(|levels| levels.values().any(|ops| !ops.is_empty()))
    }

    /// Highest level with a non-empty bucket in `context`, or `Level::None`.
    pub fn level_for_context(&self, context: &Context) -> Level {
        self.differences
            .get(context)
            .and_then(|levels| {
                levels
                    .iter()
                    .rev()
                    .find(|(_, ops)| !ops.is_empty())
                    .map(|(level, _)| *level)
            })
            .unwrap_or_default()
    }

    pub fn level(&self) -> Level {
        self.differences
            .keys()
            .map(|context| self.level_for_context(context))
            .max()
            .unwrap_or_default()
    }

    /// Move every MAJOR and MINOR operation to PATCH, keeping code and reason.
    pub fn dampen(&mut self) {
        for levels in self.differences.values_mut() {
            let mut moved = Vec::new();
            for level in [Level::Major, Level::Minor] {
                if let Some(operations) = levels.remove(&level) {
                    moved.extend(operations);
                }
            }
            if moved.is_empty() {
                continue;
            }
            for operation in &mut moved {
                operation.level = Level::Patch;
            }
            levels.entry(Level::Patch).or_default().extend(moved);
        }
    }

    pub fn dampened(mut self) -> Self {
        self.dampen();
        self
    }

    /// Keep one operation per (location, target, code): the most severe, first
    /// seen among equals.
    pub fn deduplicated(&self) -> Report {
        let mut highest: HashMap<_, Level> = HashMap::new();
        for (_, _, operation) in self.iter() {
            let level = highest.entry(operation.dedup_key()).or_default();
            *level = (*level).max(operation.level);
        }

        let mut report = Report::new();
        for (_, _, operation) in self.iter() {
            let key = operation.dedup_key();
            if highest.get(&key) == Some(&operation.level) {
                highest.remove(&key);
                report.add(operation.clone());
            }
        }
        report
    }

    pub fn contexts(&self) -> impl Iterator<Item = &Context> {
        self.differences
            .iter()
            .filter(|(_, levels)| levels.values().any(|ops| !ops.is_empty()))
            .map(|(context, _)| context)
    }

    pub fn operations(&self, context: &Context, level: Level) -> &[Operation] {
        self.differences
            .get(context)
            .and_then(|levels| levels.get(&level))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Operations by context, most severe level first within each context.
    pub fn iter(&self) -> impl Iterator<Item = (&Context, Level, &Operation)> {
        self.differences.iter().flat_map(|(context, levels)| {
            levels.iter().rev().flat_map(move |(level, operations)| {
                operations.iter().map(move |op| (context, *level, op))
            })
        })
    }

    pub fn len(&self) -> usize {
        self.differences
            .values()
            .flat_map(|levels| levels.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Operation> for Report {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        let mut report = Report::new();
        report.extend(iter);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChangeKind, DbChange, PhpChange};
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn op(context: Context, level: Level, target: &str, code: &str) -> Operation {
        Operation {
            kind: ChangeKind::Php(PhpChange::MethodAdded),
            code: code.to_string(),
            level,
            context,
            target: target.to_string(),
            location: PathBuf::from("Foo.php"),
            reason: "Method was added".to_string(),
        }
    }

    #[test]
    fn test_levels() {
        let mut report = Report::new();
        assert_eq!(report.level(), Level::None);
        assert!(!report.has_differences(&Context::Class));

        report.add(op(Context::Class, Level::Minor, "Foo::a", "C020"));
        report.add(op(Context::Database, Level::Major, "t/c", "DB107"));

        assert!(report.has_differences(&Context::Class));
        assert_eq!(report.level_for_context(&Context::Class), Level::Minor);
        assert_eq!(report.level_for_context(&Context::Trait), Level::None);
        assert_eq!(report.level(), Level::Major);
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_merge_creates_unknown_contexts() {
        let mftf = Context::Custom("mftf".to_string());
        let mut left = Report::new();
        left.add(op(Context::Class, Level::Patch, "Foo::a", "C022"));
        let mut right = Report::new();
        right.add(op(mftf.clone(), Level::Major, "ActionGroup", "M101"));

        let merged = left.merge(right);
        assert!(merged.has_differences(&mftf));
        assert_eq!(merged.level_for_context(&mftf), Level::Major);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_dampen_keeps_code_and_reason() {
        let mut report = Report::new();
        report.add(op(Context::Class, Level::Major, "Foo::a", "C021"));
        report.add(op(Context::Class, Level::Minor, "Foo::b", "C020"));
        report.add(op(Context::Class, Level::Patch, "Foo::c", "C022"));

        report.dampen();

        assert_eq!(report.level(), Level::Patch);
        let patch = report.operations(&Context::Class, Level::Patch);
        assert_eq!(patch.len(), 3);
        assert!(patch.iter().all(|op| op.level == Level::Patch));
        assert!(patch.iter().any(|op| op.code == "C021"));
        assert!(report.operations(&Context::Class, Level::Major).is_empty());
    }

    #[test]
    fn test_deduplicated_keeps_highest_severity() {
        let mut report = Report::new();
        report.add(op(Context::Database, Level::Minor, "t/c", "DB110"));
        report.add(op(Context::Database, Level::Major, "t/c", "DB110"));
        report.add(op(Context::Database, Level::Major, "t/c", "DB110"));
        report.add(op(Context::Database, Level::Minor, "t/d", "DB110"));

        let deduplicated = report.deduplicated();
        assert_eq!(deduplicated.len(), 2);
        assert_eq!(deduplicated.operations(&Context::Database, Level::Major).len(), 1);
        assert_eq!(deduplicated.operations(&Context::Database, Level::Minor).len(), 1);
    }

    fn level_strategy() -> impl Strategy<Value = Level> {
        (0u8..4).prop_map(|n| Level::from_u8(n).unwrap_or_default())
    }

    fn report_strategy() -> impl Strategy<Value = Report> {
        prop::collection::vec((0usize..3, level_strategy(), 0usize..5), 0..20).prop_map(
            |entries| {
                let contexts = [Context::Class, Context::Database, Context::Less];
                entries
                    .into_iter()
                    .map(|(c, level, t)| {
                        let mut operation =
                            op(contexts[c].clone(), level, &format!("T{}", t), "X");
                        operation.kind = ChangeKind::Database(DbChange::ColumnAdd);
                        operation
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn prop_dampen_is_idempotent(report in report_strategy()) {
            let once = report.clone().dampened();
            let twice = once.clone().dampened();
            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(once.len(), report.len());
            prop_assert!(once.level() <= Level::Patch);
            for context in once.contexts() {
                prop_assert!(once.operations(context, Level::Major).is_empty());
                prop_assert!(once.operations(context, Level::Minor).is_empty());
            }
        }

        #[test]
        fn prop_merge_level_is_max(a in report_strategy(), b in report_strategy()) {
            let expected = a.level().max(b.level());
            let ab = a.clone().merge(b.clone());
            let ba = b.merge(a);
            prop_assert_eq!(ab.level(), expected);
            prop_assert_eq!(ba.level(), expected);
            prop_assert_eq!(ab.len(), ba.len());
        }

        #[test]
        fn prop_deduplicated_never_lowers_level(report in report_strategy()) {
            let deduplicated = report.deduplicated();
            prop_assert_eq!(deduplicated.level(), report.level());
            prop_assert!(deduplicated.len() <= report.len());
        }
    }
}
