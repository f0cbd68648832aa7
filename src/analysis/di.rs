use super::differ::{NodeRules, diff_registry};
use super::{AnalysisError, Analyzer, SeverityTable};
use crate::model::{ChangeKind, Context, DiChange, VirtualType};
use crate::report::Report;
use crate::snapshot::Registry;
use std::path::Path;

/// Virtual types declared in DI configuration, keyed by name.
pub struct DiAnalyzer<'a> {
    table: &'a SeverityTable,
}

impl<'a> DiAnalyzer<'a> {
    pub fn new(table: &'a SeverityTable) -> Self {
        Self { table }
    }

    fn op(&self, report: &mut Report, kind: DiChange, target: &str, location: &Path) {
        report.add(
            self.table
                .operation(Context::Di, ChangeKind::Di(kind), target, location),
        );
    }
}

impl NodeRules for DiAnalyzer<'_> {
    type Node = VirtualType;

    fn added(&self, key: &str, node: &VirtualType, location: &Path, report: &mut Report) {
        let kind = if node.is_global() {
            DiChange::VirtualTypeAdded
        } else {
            DiChange::VirtualTypeAddedInScope
        };
        self.op(report, kind, key, location);
    }

    fn removed(&self, key: &str, _: &VirtualType, location: &Path, report: &mut Report) {
        self.op(report, DiChange::VirtualTypeRemoved, key, location);
    }

    fn changed(
        &self,
        key: &str,
        before: &VirtualType,
        after: &VirtualType,
        location: &Path,
        report: &mut Report,
    ) {
        if before.scope != after.scope {
            let kind = if after.is_global() {
                DiChange::VirtualTypeScopeChangedToGlobal
            } else {
                DiChange::VirtualTypeScopeChanged
            };
            report.add(self.table.value_change(
                Context::Di,
                ChangeKind::Di(kind),
                key,
                location,
                &before.scope,
                &after.scope,
            ));
        }
        if before.type_name != after.type_name {
            report.add(self.table.value_change(
                Context::Di,
                ChangeKind::Di(DiChange::VirtualTypeTypeChanged),
                key,
                location,
                &before.type_name,
                &after.type_name,
            ));
        }
        if before.shared != after.shared {
            self.op(report, DiChange::VirtualTypeSharedChanged, key, location);
        }
    }
}

impl Analyzer for DiAnalyzer<'_> {
    type Node = VirtualType;

    fn analyze(
        &self,
        before: &Registry<VirtualType>,
        after: &Registry<VirtualType>,
    ) -> Result<Report, AnalysisError> {
        Ok(diff_registry(self, &Context::Di, before, after))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GLOBAL_SCOPE, Level};

    fn virtual_type(name: &str, type_name: &str, scope: &str) -> VirtualType {
        VirtualType {
            name: name.to_string(),
            type_name: type_name.to_string(),
            shared: true,
            scope: scope.to_string(),
            module: "Magento_Catalog".to_string(),
        }
    }

    fn registry(types: Vec<VirtualType>) -> Registry<VirtualType> {
        let mut registry = Registry::new();
        for virtual_type in types {
            let location = format!("Magento_Catalog/etc/{}/di.json", virtual_type.scope);
            let name = virtual_type.name.clone();
            registry.insert(Context::Di, name, virtual_type, location);
        }
        registry
    }

    fn codes(report: &Report) -> Vec<String> {
        report.iter().map(|(_, _, op)| op.code.clone()).collect()
    }

    #[test]
    fn test_added_depends_on_scope() {
        let table = SeverityTable::new();
        let before = registry(vec![]);
        let after = registry(vec![
            virtual_type("CatalogSearch", "Search", GLOBAL_SCOPE),
            virtual_type("AdminGrid", "Grid", "adminhtml"),
        ]);

        let report = DiAnalyzer::new(&table).analyze(&before, &after).unwrap();

        assert_eq!(report.level(), Level::Minor);
        assert_eq!(codes(&report), vec!["DI101", "DI102"]);
    }

    #[test]
    fn test_scope_narrowed_is_major() {
        let table = SeverityTable::new();
        let before = registry(vec![virtual_type("CatalogSearch", "Search", GLOBAL_SCOPE)]);
        let after = registry(vec![virtual_type("CatalogSearch", "Search", "frontend")]);

        let report = DiAnalyzer::new(&table).analyze(&before, &after).unwrap();

        let op = &report.operations(&Context::Di, Level::Major)[0];
        assert_eq!(op.code, "DI105");
        assert_eq!(
            op.reason,
            "Virtual type scope was changed: `global` -> `frontend`"
        );
        assert_eq!(op.location, Path::new("Magento_Catalog/etc/frontend/di.json"));
    }

    #[test]
    fn test_removed_and_shared() {
        let table = SeverityTable::new();
        let mut unshared = virtual_type("Cache", "Storage", GLOBAL_SCOPE);
        unshared.shared = false;
        let before = registry(vec![
            virtual_type("Cache", "Storage", GLOBAL_SCOPE),
            virtual_type("Legacy", "Old", GLOBAL_SCOPE),
        ]);
        let after = registry(vec![unshared]);

        let report = DiAnalyzer::new(&table).analyze(&before, &after).unwrap();

        assert_eq!(codes(&report), vec!["DI103", "DI107"]);
    }
}
