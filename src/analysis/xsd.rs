use super::differ::{NodeRules, diff_map, diff_registry};
use super::{AnalysisError, Analyzer, SeverityTable};
use crate::model::{ChangeKind, Context, XsdChange, XsdNode, XsdNodeKind, XsdSchema};
use crate::report::Report;
use crate::snapshot::Registry;
use std::collections::BTreeMap;
use std::path::Path;

/// XML schema files, keyed by file and compared node by node.
pub struct XsdAnalyzer<'a> {
    table: &'a SeverityTable,
}

impl<'a> XsdAnalyzer<'a> {
    pub fn new(table: &'a SeverityTable) -> Self {
        Self { table }
    }

    fn op(&self, report: &mut Report, kind: XsdChange, target: String, location: &Path) {
        report.add(
            self.table
                .operation(Context::Xsd, ChangeKind::Xsd(kind), target, location),
        );
    }
}

impl NodeRules for XsdAnalyzer<'_> {
    type Node = XsdSchema;

    fn added(&self, key: &str, _: &XsdSchema, location: &Path, report: &mut Report) {
        self.op(report, XsdChange::SchemaFileAdded, key.to_string(), location);
    }

    fn removed(&self, key: &str, _: &XsdSchema, location: &Path, report: &mut Report) {
        self.op(report, XsdChange::SchemaFileRemoved, key.to_string(), location);
    }

    fn changed(
        &self,
        key: &str,
        before: &XsdSchema,
        after: &XsdSchema,
        location: &Path,
        report: &mut Report,
    ) {
        let rules = NodeRulesForFile {
            analyzer: self,
            file: key,
        };
        diff_map(&rules, &by_path(before), &by_path(after), location, report);
    }
}

fn by_path(schema: &XsdSchema) -> BTreeMap<String, &XsdNode> {
    schema
        .nodes
        .iter()
        .map(|node| (node.path.clone(), node))
        .collect()
}

struct NodeRulesForFile<'a> {
    analyzer: &'a XsdAnalyzer<'a>,
    file: &'a str,
}

impl NodeRulesForFile<'_> {
    fn target(&self, path: &str) -> String {
        format!("{}#{}", self.file, path)
    }
}

impl NodeRules for NodeRulesForFile<'_> {
    type Node = XsdNode;

    fn added(&self, key: &str, node: &XsdNode, location: &Path, report: &mut Report) {
        let kind = match (node.kind, node.required) {
            (XsdNodeKind::Element, true) => XsdChange::RequiredNodeAdded,
            (XsdNodeKind::Element, false) => XsdChange::OptionalNodeAdded,
            (XsdNodeKind::Attribute, true) => XsdChange::RequiredAttributeAdded,
            (XsdNodeKind::Attribute, false) => XsdChange::OptionalAttributeAdded,
        };
        self.analyzer.op(report, kind, self.target(key), location);
    }

    fn removed(&self, key: &str, node: &XsdNode, location: &Path, report: &mut Report) {
        let kind = match node.kind {
            XsdNodeKind::Element => XsdChange::NodeRemoved,
            XsdNodeKind::Attribute => XsdChange::AttributeRemoved,
        };
        self.analyzer.op(report, kind, self.target(key), location);
    }

    fn changed(
        &self,
        key: &str,
        before: &XsdNode,
        after: &XsdNode,
        location: &Path,
        report: &mut Report,
    ) {
        match (before.required, after.required) {
            (false, true) => self
                .analyzer
                .op(report, XsdChange::BecameRequired, self.target(key), location),
            (true, false) => self
                .analyzer
                .op(report, XsdChange::BecameOptional, self.target(key), location),
            _ => {}
        }
        if before.type_name != after.type_name {
            report.add(self.analyzer.table.value_change(
                Context::Xsd,
                ChangeKind::Xsd(XsdChange::TypeChanged),
                self.target(key),
                location,
                before.type_name.as_deref().unwrap_or("anyType"),
                after.type_name.as_deref().unwrap_or("anyType"),
            ));
        }
    }
}

impl Analyzer for XsdAnalyzer<'_> {
    type Node = XsdSchema;

    fn analyze(
        &self,
        before: &Registry<XsdSchema>,
        after: &Registry<XsdSchema>,
    ) -> Result<Report, AnalysisError> {
        Ok(diff_registry(self, &Context::Xsd, before, after))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Level;

    const FILE: &str = "Magento_Catalog/etc/catalog_attributes.xsd";

    fn node(path: &str, kind: XsdNodeKind, required: bool) -> XsdNode {
        XsdNode {
            path: path.to_string(),
            kind,
            required,
            type_name: None,
        }
    }

    fn registry(nodes: Option<Vec<XsdNode>>) -> Registry<XsdSchema> {
        let mut registry = Registry::new();
        if let Some(nodes) = nodes {
            registry.insert(
                Context::Xsd,
                FILE,
                XsdSchema { nodes },
                format!("{}.json", FILE),
            );
        }
        registry
    }

    fn analyze(before: Option<Vec<XsdNode>>, after: Option<Vec<XsdNode>>) -> Report {
        let table = SeverityTable::new();
        XsdAnalyzer::new(&table)
            .analyze(&registry(before), &registry(after))
            .unwrap()
    }

    #[test]
    fn test_file_added_skips_nodes() {
        let report = analyze(None, Some(vec![node("config", XsdNodeKind::Element, true)]));
        assert_eq!(report.len(), 1);
        assert_eq!(report.operations(&Context::Xsd, Level::Minor)[0].code, "X101");
    }

    #[test]
    fn test_required_attribute_added_is_major() {
        let before = vec![node("config/group", XsdNodeKind::Element, false)];
        let mut after = before.clone();
        after.push(node("config/group/@name", XsdNodeKind::Attribute, true));
        after.push(node("config/extra", XsdNodeKind::Element, false));

        let report = analyze(Some(before), Some(after));

        let major = report.operations(&Context::Xsd, Level::Major);
        assert_eq!(major[0].code, "X107");
        assert_eq!(major[0].target, format!("{}#config/group/@name", FILE));
        assert_eq!(report.operations(&Context::Xsd, Level::Minor)[0].code, "X103");
    }

    #[test]
    fn test_node_changes() {
        let mut typed = node("config/item", XsdNodeKind::Element, false);
        typed.type_name = Some("xs:string".to_string());
        let mut retyped = node("config/item", XsdNodeKind::Element, true);
        retyped.type_name = Some("xs:int".to_string());

        let report = analyze(
            Some(vec![typed, node("config/old", XsdNodeKind::Element, false)]),
            Some(vec![retyped]),
        );

        let codes: Vec<_> = report.iter().map(|(_, _, op)| op.code.as_str()).collect();
        assert_eq!(codes, vec!["X105", "X109", "X111"]);
    }
}
