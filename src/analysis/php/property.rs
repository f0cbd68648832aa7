use super::class::ClassPair;
use super::{resolve_inherited, type_move};
use crate::analysis::AnalysisError;
use crate::analysis::membership::{DividedReports, Located, MembershipRules};
use crate::model::{ChangeKind, Member, PhpChange, Property, TypeSlot, Visibility};
use crate::report::Report;
use std::path::Path;

pub(super) struct PropertyRules<'a> {
    pub pair: &'a ClassPair<'a>,
}

impl PropertyRules<'_> {
    fn target(&self, property: &Property) -> String {
        self.pair.target(&format!("${}", property.key()))
    }

    fn inherited(&self, before_side: bool, property: &Property) -> Option<&Property> {
        let (registry, class) = if before_side {
            (self.pair.rules.full_before, self.pair.before.node)
        } else {
            (self.pair.rules.full_after, self.pair.after.node)
        };
        let name = property.key();
        resolve_inherited(registry, class, |source| {
            source
                .property(&name)
                .filter(|p| p.visibility != Visibility::Private)
        })
    }

    fn compare(&self, before: &Property, after: &Property, location: &Path, report: &mut Report) {
        let table = self.pair.rules.analyzer.table;
        let context = self.pair.context();
        let target = self.target(after);

        if after.visibility != before.visibility {
            let kind = if after.visibility < before.visibility {
                PhpChange::PropertyVisibilityDecreased
            } else {
                PhpChange::PropertyVisibilityIncreased
            };
            report.add(table.value_change(
                context.clone(),
                ChangeKind::Php(kind),
                target.clone(),
                location,
                &before.visibility.to_string(),
                &after.visibility.to_string(),
            ));
        }

        let staticness = match (before.is_static, after.is_static) {
            (false, true) => Some(PhpChange::PropertyBecameStatic),
            (true, false) => Some(PhpChange::PropertyBecameNonStatic),
            _ => None,
        };
        if let Some(kind) = staticness {
            self.pair.report_op(report, kind, target.clone(), location);
        }

        let old = before.type_decl.as_ref();
        let new = after.type_decl.as_ref();
        match (old, new) {
            (Some(old), Some(new)) if old.same_type(new) => {
                if let Some(direction) = type_move(old.source, new.source) {
                    report.add(table.operation(
                        context,
                        ChangeKind::DocType(TypeSlot::Property, direction),
                        target,
                        location,
                    ));
                }
            }
            (None, None) => {}
            _ => report.add(table.value_change(
                context,
                ChangeKind::Php(PhpChange::PropertyTypeChanged),
                target,
                location,
                old.map(|t| t.name.as_str()).unwrap_or("mixed"),
                new.map(|t| t.name.as_str()).unwrap_or("mixed"),
            )),
        }
    }
}

impl MembershipRules for PropertyRules<'_> {
    type Node = Property;

    fn added(
        &self,
        _key: &str,
        after: Located<'_, Property>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError> {
        let property = after.node;
        match self.inherited(true, property) {
            Some(inherited) => {
                self.pair.report_op(
                    &mut out.changes,
                    PhpChange::PropertyMovedFromParent,
                    self.target(property),
                    after.location,
                );
                self.compare(inherited, property, after.location, &mut out.changes);
            }
            None => self.pair.report_op(
                &mut out.changes,
                PhpChange::PropertyAdded,
                self.target(property),
                after.location,
            ),
        }
        Ok(())
    }

    fn removed(
        &self,
        _key: &str,
        before: Located<'_, Property>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError> {
        let property = before.node;
        match self.inherited(false, property) {
            Some(inherited) => {
                let location = self.pair.after.location;
                self.pair.report_op(
                    &mut out.changes,
                    PhpChange::PropertyMovedToParent,
                    self.target(property),
                    location,
                );
                self.compare(property, inherited, location, &mut out.changes);
            }
            None => self.pair.report_op(
                &mut out.changes,
                PhpChange::PropertyRemoved,
                self.target(property),
                before.location,
            ),
        }
        Ok(())
    }

    fn membership_added(
        &self,
        _key: &str,
        _before: Located<'_, Property>,
        after: Located<'_, Property>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError> {
        self.pair.report_op(
            &mut out.membership,
            PhpChange::MembershipAdded(Member::Property),
            self.target(after.node),
            after.location,
        );
        Ok(())
    }

    fn membership_removed(
        &self,
        _key: &str,
        before: Located<'_, Property>,
        after: Located<'_, Property>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError> {
        self.pair.report_op(
            &mut out.membership,
            PhpChange::MembershipRemoved(Member::Property),
            self.target(before.node),
            after.location,
        );
        Ok(())
    }

    fn changed(
        &self,
        _key: &str,
        before: Located<'_, Property>,
        after: Located<'_, Property>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError> {
        self.compare(before.node, after.node, after.location, &mut out.changes);
        Ok(())
    }
}
