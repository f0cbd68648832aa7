use super::differ::{NodeRules, diff_map, diff_registry};
use super::{AnalysisError, Analyzer, SeverityTable};
use crate::model::{ChangeKind, Context, LessChange, LessFile, LessRule, LessRuleKind};
use crate::report::Report;
use crate::snapshot::Registry;
use std::collections::BTreeMap;
use std::path::Path;

/// Stylesheets compared by their variables, mixins and imports.
pub struct LessAnalyzer<'a> {
    table: &'a SeverityTable,
}

impl<'a> LessAnalyzer<'a> {
    pub fn new(table: &'a SeverityTable) -> Self {
        Self { table }
    }

    fn op(&self, report: &mut Report, kind: LessChange, target: String, location: &Path) {
        report.add(
            self.table
                .operation(Context::Less, ChangeKind::Less(kind), target, location),
        );
    }
}

impl NodeRules for LessAnalyzer<'_> {
    type Node = LessFile;

    fn added(&self, key: &str, _: &LessFile, location: &Path, report: &mut Report) {
        self.op(report, LessChange::FileAdded, key.to_string(), location);
    }

    fn removed(&self, key: &str, _: &LessFile, location: &Path, report: &mut Report) {
        self.op(report, LessChange::FileRemoved, key.to_string(), location);
    }

    fn changed(
        &self,
        key: &str,
        before: &LessFile,
        after: &LessFile,
        location: &Path,
        report: &mut Report,
    ) {
        let rules = RuleChanges {
            analyzer: self,
            file: key,
        };
        diff_map(&rules, &by_rule(before), &by_rule(after), location, report);
    }
}

/// A variable and a mixin may share a name, so the kind is part of the key.
fn by_rule(file: &LessFile) -> BTreeMap<String, &LessRule> {
    file.rules
        .iter()
        .map(|rule| (format!("{:?}:{}", rule.kind, rule.name), rule))
        .collect()
}

struct RuleChanges<'a> {
    analyzer: &'a LessAnalyzer<'a>,
    file: &'a str,
}

impl RuleChanges<'_> {
    fn target(&self, rule: &LessRule) -> String {
        format!("{}#{}", self.file, rule.name)
    }
}

impl NodeRules for RuleChanges<'_> {
    type Node = LessRule;

    fn added(&self, _key: &str, rule: &LessRule, location: &Path, report: &mut Report) {
        let kind = match rule.kind {
            LessRuleKind::Variable => LessChange::VariableAdded,
            LessRuleKind::Mixin => LessChange::MixinAdded,
            LessRuleKind::Import => LessChange::ImportAdded,
        };
        self.analyzer.op(report, kind, self.target(rule), location);
    }

    fn removed(&self, _key: &str, rule: &LessRule, location: &Path, report: &mut Report) {
        let kind = match rule.kind {
            LessRuleKind::Variable => LessChange::VariableRemoved,
            LessRuleKind::Mixin => LessChange::MixinRemoved,
            LessRuleKind::Import => LessChange::ImportRemoved,
        };
        self.analyzer.op(report, kind, self.target(rule), location);
    }

    fn changed(
        &self,
        _key: &str,
        before: &LessRule,
        after: &LessRule,
        location: &Path,
        report: &mut Report,
    ) {
        if after.kind == LessRuleKind::Variable && before.value != after.value {
            report.add(self.analyzer.table.value_change(
                Context::Less,
                ChangeKind::Less(LessChange::VariableValueChanged),
                self.target(after),
                location,
                before.value.as_deref().unwrap_or(""),
                after.value.as_deref().unwrap_or(""),
            ));
        }
    }
}

impl Analyzer for LessAnalyzer<'_> {
    type Node = LessFile;

    fn analyze(
        &self,
        before: &Registry<LessFile>,
        after: &Registry<LessFile>,
    ) -> Result<Report, AnalysisError> {
        Ok(diff_registry(self, &Context::Less, before, after))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Level;

    const FILE: &str = "web/css/source/_variables.less";

    fn rule(kind: LessRuleKind, name: &str, value: Option<&str>) -> LessRule {
        LessRule {
            kind,
            name: name.to_string(),
            value: value.map(str::to_string),
        }
    }

    fn analyze(before: Vec<LessRule>, after: Vec<LessRule>) -> Report {
        let table = SeverityTable::new();
        let mut old = Registry::new();
        old.insert(Context::Less, FILE, LessFile { rules: before }, format!("{}.json", FILE));
        let mut new = Registry::new();
        new.insert(Context::Less, FILE, LessFile { rules: after }, format!("{}.json", FILE));
        LessAnalyzer::new(&table).analyze(&old, &new).unwrap()
    }

    #[test]
    fn test_removed_mixin_is_major() {
        let report = analyze(
            vec![
                rule(LessRuleKind::Mixin, ".lib-button", None),
                rule(LessRuleKind::Variable, "@button__color", Some("#333")),
            ],
            vec![rule(LessRuleKind::Variable, "@button__color", Some("#333"))],
        );

        assert_eq!(report.len(), 1);
        let op = &report.operations(&Context::Less, Level::Major)[0];
        assert_eq!(op.code, "L107");
        assert_eq!(op.target, format!("{}#.lib-button", FILE));
    }

    #[test]
    fn test_value_change_is_patch() {
        let report = analyze(
            vec![rule(LessRuleKind::Variable, "@button__color", Some("#333"))],
            vec![rule(LessRuleKind::Variable, "@button__color", Some("#000"))],
        );

        assert_eq!(report.level(), Level::Patch);
        assert_eq!(
            report.operations(&Context::Less, Level::Patch)[0].reason,
            "Variable value was changed: `#333` -> `#000`"
        );
    }

    #[test]
    fn test_same_name_different_kind() {
        let report = analyze(
            vec![rule(LessRuleKind::Variable, "grid", Some("12"))],
            vec![
                rule(LessRuleKind::Variable, "grid", Some("12")),
                rule(LessRuleKind::Import, "grid", None),
            ],
        );

        assert_eq!(report.len(), 1);
        assert_eq!(report.operations(&Context::Less, Level::Patch)[0].code, "L108");
    }
}
