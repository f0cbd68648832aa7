use super::differ::{NodeRules, diff_map, diff_registry};
use super::{AnalysisError, Analyzer, SeverityTable};
use crate::model::{ChangeKind, Context, SystemChange, SystemConfig, SystemNode, SystemNodeKind};
use crate::report::Report;
use crate::snapshot::Registry;
use std::collections::BTreeMap;
use std::path::Path;

/// Admin configuration per module: sections, groups and fields.
pub struct SystemAnalyzer<'a> {
    table: &'a SeverityTable,
}

impl<'a> SystemAnalyzer<'a> {
    pub fn new(table: &'a SeverityTable) -> Self {
        Self { table }
    }

    fn op(&self, report: &mut Report, kind: SystemChange, target: &str, location: &Path) {
        report.add(
            self.table
                .operation(Context::System, ChangeKind::System(kind), target, location),
        );
    }
}

impl NodeRules for SystemAnalyzer<'_> {
    type Node = SystemConfig;

    fn added(&self, key: &str, _: &SystemConfig, location: &Path, report: &mut Report) {
        self.op(report, SystemChange::FileAdded, key, location);
    }

    fn removed(&self, key: &str, _: &SystemConfig, location: &Path, report: &mut Report) {
        self.op(report, SystemChange::FileRemoved, key, location);
    }

    fn changed(
        &self,
        _key: &str,
        before: &SystemConfig,
        after: &SystemConfig,
        location: &Path,
        report: &mut Report,
    ) {
        let before_nodes = before.nodes();
        let after_nodes = after.nodes();
        diff_map(
            &NodeChanges(self),
            &by_path(&before_nodes),
            &by_path(&after_nodes),
            location,
            report,
        );
    }
}

fn by_path(nodes: &[SystemNode]) -> BTreeMap<String, &SystemNode> {
    nodes.iter().map(|node| (node.path.clone(), node)).collect()
}

struct NodeChanges<'a>(&'a SystemAnalyzer<'a>);

impl NodeRules for NodeChanges<'_> {
    type Node = SystemNode;

    fn added(&self, key: &str, node: &SystemNode, location: &Path, report: &mut Report) {
        let kind = match node.kind {
            SystemNodeKind::Section => SystemChange::SectionAdded,
            SystemNodeKind::Group => SystemChange::GroupAdded,
            SystemNodeKind::Field => SystemChange::FieldAdded,
        };
        self.0.op(report, kind, key, location);
    }

    fn removed(&self, key: &str, node: &SystemNode, location: &Path, report: &mut Report) {
        let kind = match node.kind {
            SystemNodeKind::Section => SystemChange::SectionRemoved,
            SystemNodeKind::Group => SystemChange::GroupRemoved,
            SystemNodeKind::Field => SystemChange::FieldRemoved,
        };
        self.0.op(report, kind, key, location);
    }

    fn changed(
        &self,
        key: &str,
        before: &SystemNode,
        after: &SystemNode,
        location: &Path,
        report: &mut Report,
    ) {
        if after.kind != SystemNodeKind::Field {
            return;
        }
        if before.field_type != after.field_type {
            report.add(self.0.table.value_change(
                Context::System,
                ChangeKind::System(SystemChange::FieldTypeChanged),
                key,
                location,
                before.field_type.as_deref().unwrap_or("text"),
                after.field_type.as_deref().unwrap_or("text"),
            ));
        }

        let scopes = before.scopes.iter().zip(after.scopes.iter());
        if scopes.clone().any(|(&old, &new)| old && !new) {
            self.0.op(report, SystemChange::FieldScopeReduced, key, location);
        } else if scopes.into_iter().any(|(&old, &new)| !old && new) {
            self.0.op(report, SystemChange::FieldScopeExtended, key, location);
        }
    }
}

impl Analyzer for SystemAnalyzer<'_> {
    type Node = SystemConfig;

    fn analyze(
        &self,
        before: &Registry<SystemConfig>,
        after: &Registry<SystemConfig>,
    ) -> Result<Report, AnalysisError> {
        Ok(diff_registry(self, &Context::System, before, after))
    }
}
