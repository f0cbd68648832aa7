//! Declarative schema comparison. Modules may extend tables declared by other
//! modules, so tables are merged across module files before diffing and
//! every column, index and constraint remembers the file that declared it.

use super::differ::{NodeRules, diff_keys, diff_located};
use super::membership::{Keyed, Located};
use super::{AnalysisError, Analyzer, SeverityTable};
use crate::model::{ChangeKind, Column, Constraint, Context, DbChange, Index, ModuleSchema};
use crate::report::Report;
use crate::snapshot::Registry;
use std::collections::BTreeMap;
use std::path::Path;

pub struct DatabaseAnalyzer<'a> {
    table: &'a SeverityTable,
}

impl<'a> DatabaseAnalyzer<'a> {
    pub fn new(table: &'a SeverityTable) -> Self {
        Self { table }
    }

    fn op(&self, report: &mut Report, kind: DbChange, target: String, location: &Path) {
        report.add(
            self.table
                .operation(Context::Database, ChangeKind::Database(kind), target, location),
        );
    }

    fn value_op(
        &self,
        report: &mut Report,
        kind: DbChange,
        target: String,
        location: &Path,
        before: &str,
        after: &str,
    ) {
        report.add(self.table.value_change(
            Context::Database,
            ChangeKind::Database(kind),
            target,
            location,
            before,
            after,
        ));
    }
}

/// A table as seen across all modules that declare or extend it.
#[derive(Debug, Default)]
struct MergedTable<'a> {
    resource: Option<&'a str>,
    engine: Option<&'a str>,
    comment: Option<&'a str>,
    columns: Keyed<'a, Column>,
    indexes: Keyed<'a, Index>,
    constraints: Keyed<'a, Constraint>,
}

fn merge_tables(registry: &Registry<ModuleSchema>) -> BTreeMap<String, (MergedTable<'_>, &Path)> {
    let mut tables: BTreeMap<String, (MergedTable<'_>, &Path)> = BTreeMap::new();

    for (context, module, schema) in registry.iter() {
        let location = registry.location(context, module).unwrap_or(Path::new(""));
        for table in &schema.tables {
            let (merged, _) = tables
                .entry(table.name.clone())
                .or_insert_with(|| (MergedTable::default(), location));

            if let Some(resource) = &table.resource {
                merged.resource = Some(resource.as_str());
            }
            if let Some(engine) = &table.engine {
                merged.engine = Some(engine.as_str());
            }
            if let Some(comment) = &table.comment {
                merged.comment = Some(comment.as_str());
            }
            for column in &table.columns {
                merged
                    .columns
                    .insert(column.name.clone(), Located { node: column, location });
            }
            for index in &table.indexes {
                merged
                    .indexes
                    .insert(index.reference_id.clone(), Located { node: index, location });
            }
            for constraint in &table.constraints {
                merged.constraints.insert(
                    constraint.reference_id().to_string(),
                    Located { node: constraint, location },
                );
            }
        }
    }

    tables
}

impl Analyzer for DatabaseAnalyzer<'_> {
    type Node = ModuleSchema;

    fn analyze(
        &self,
        before: &Registry<ModuleSchema>,
        after: &Registry<ModuleSchema>,
    ) -> Result<Report, AnalysisError> {
        let before_tables = merge_tables(before);
        let after_tables = merge_tables(after);
        let tables = diff_keys(&before_tables, &after_tables);
        tracing::debug!(
            added = tables.added.len(),
            removed = tables.removed.len(),
            common = tables.common.len(),
            "Diffing merged tables"
        );
        let mut report = Report::new();

        for name in &tables.added {
            let (_, location) = &after_tables[name];
            self.op(&mut report, DbChange::TableAdded, name.clone(), location);
        }
        for name in &tables.removed {
            let (_, location) = &before_tables[name];
            self.op(&mut report, DbChange::TableDropped, name.clone(), location);
        }
        for name in &tables.common {
            let (old, _) = &before_tables[name];
            let (new, location) = &after_tables[name];
            self.compare_tables(name, old, new, location, &mut report);
        }

        Ok(report)
    }
}

impl DatabaseAnalyzer<'_> {
    fn compare_tables(
        &self,
        name: &str,
        before: &MergedTable<'_>,
        after: &MergedTable<'_>,
        location: &Path,
        report: &mut Report,
    ) {
        let attributes = [
            (DbChange::TableResourceChange, before.resource, after.resource),
            (DbChange::TableEngineChange, before.engine, after.engine),
            (DbChange::TableCommentChange, before.comment, after.comment),
        ];
        for (kind, old, new) in attributes {
            if old != new {
                self.value_op(
                    report,
                    kind,
                    name.to_string(),
                    location,
                    old.unwrap_or(""),
                    new.unwrap_or(""),
                );
            }
        }

        let rules = TableRules {
            analyzer: self,
            table: name,
        };
        diff_located(&ColumnRules(&rules), &before.columns, &after.columns, report);
        diff_located(&IndexRules(&rules), &before.indexes, &after.indexes, report);
        diff_located(
            &ConstraintRules(&rules),
            &before.constraints,
            &after.constraints,
            report,
        );
    }
}

struct TableRules<'a> {
    analyzer: &'a DatabaseAnalyzer<'a>,
    table: &'a str,
}

impl TableRules<'_> {
    fn target(&self, key: &str) -> String {
        format!("{}/{}", self.table, key)
    }
}

struct ColumnRules<'a>(&'a TableRules<'a>);

impl NodeRules for ColumnRules<'_> {
    type Node = Column;

    fn added(&self, key: &str, _: &Column, location: &Path, report: &mut Report) {
        self.0
            .analyzer
            .op(report, DbChange::ColumnAdd, self.0.target(key), location);
    }

    fn removed(&self, key: &str, _: &Column, location: &Path, report: &mut Report) {
        self.0
            .analyzer
            .op(report, DbChange::ColumnRemove, self.0.target(key), location);
    }

    fn changed(
        &self,
        key: &str,
        before: &Column,
        after: &Column,
        location: &Path,
        report: &mut Report,
    ) {
        let analyzer = self.0.analyzer;
        let target = self.0.target(key);

        if !before.column_type.eq_ignore_ascii_case(&after.column_type) {
            analyzer.value_op(
                report,
                DbChange::ColumnTypeChange,
                target.clone(),
                location,
                &before.column_type,
                &after.column_type,
            );
        }
        match (before.nullable, after.nullable) {
            (true, false) => {
                analyzer.op(report, DbChange::ColumnBecameNotNull, target.clone(), location)
            }
            (false, true) => {
                analyzer.op(report, DbChange::ColumnBecameNullable, target.clone(), location)
            }
            _ => {}
        }
        if before.default != after.default {
            analyzer.value_op(
                report,
                DbChange::ColumnDefaultChange,
                target.clone(),
                location,
                before.default.as_deref().unwrap_or("NULL"),
                after.default.as_deref().unwrap_or("NULL"),
            );
        }
        if !before.same_definition(after) {
            analyzer.op(report, DbChange::ColumnDefinitionChange, target, location);
        }
    }
}

struct IndexRules<'a>(&'a TableRules<'a>);

impl NodeRules for IndexRules<'_> {
    type Node = Index;

    fn added(&self, key: &str, _: &Index, location: &Path, report: &mut Report) {
        self.0
            .analyzer
            .op(report, DbChange::IndexAdd, self.0.target(key), location);
    }

    fn removed(&self, key: &str, _: &Index, location: &Path, report: &mut Report) {
        self.0
            .analyzer
            .op(report, DbChange::IndexRemove, self.0.target(key), location);
    }

    fn changed(
        &self,
        key: &str,
        before: &Index,
        after: &Index,
        location: &Path,
        report: &mut Report,
    ) {
        if before.columns != after.columns
            || !before.index_type.eq_ignore_ascii_case(&after.index_type)
        {
            self.0.analyzer.value_op(
                report,
                DbChange::IndexChange,
                self.0.target(key),
                location,
                &format!("{} ({})", before.index_type, before.columns.join(", ")),
                &format!("{} ({})", after.index_type, after.columns.join(", ")),
            );
        }
    }
}

struct ConstraintRules<'a>(&'a TableRules<'a>);

#[derive(Clone, Copy)]
enum Event {
    Add,
    Remove,
    Change,
}

fn constraint_change(constraint: &Constraint, event: Event) -> DbChange {
    use DbChange::*;
    match (constraint, event) {
        (Constraint::Primary { .. }, Event::Add) => PrimaryKeyAdd,
        (Constraint::Primary { .. }, Event::Remove) => PrimaryKeyRemove,
        (Constraint::Primary { .. }, Event::Change) => PrimaryKeyChange,
        (Constraint::Unique { .. }, Event::Add) => UniqueKeyAdd,
        (Constraint::Unique { .. }, Event::Remove) => UniqueKeyRemove,
        (Constraint::Unique { .. }, Event::Change) => UniqueKeyChange,
        (Constraint::Foreign { .. }, Event::Add) => ForeignKeyAdd,
        (Constraint::Foreign { .. }, Event::Remove) => ForeignKeyRemove,
        (Constraint::Foreign { .. }, Event::Change) => ForeignKeyChange,
    }
}

impl NodeRules for ConstraintRules<'_> {
    type Node = Constraint;

    fn added(&self, key: &str, node: &Constraint, location: &Path, report: &mut Report) {
        let kind = constraint_change(node, Event::Add);
        self.0.analyzer.op(report, kind, self.0.target(key), location);
    }

    fn removed(&self, key: &str, node: &Constraint, location: &Path, report: &mut Report) {
        let kind = constraint_change(node, Event::Remove);
        self.0.analyzer.op(report, kind, self.0.target(key), location);
    }

    fn changed(
        &self,
        key: &str,
        before: &Constraint,
        after: &Constraint,
        location: &Path,
        report: &mut Report,
    ) {
        if before != after {
            let kind = constraint_change(after, Event::Change);
            self.0.analyzer.op(report, kind, self.0.target(key), location);
        }
    }
}
