use super::class::ClassPair;
use super::resolve_inherited;
use crate::analysis::AnalysisError;
use crate::analysis::membership::{DividedReports, Located, MembershipRules};
use crate::model::{ChangeKind, Constant, Member, PhpChange, Visibility};
use crate::report::Report;
use std::path::Path;

pub(super) struct ConstantRules<'a> {
    pub pair: &'a ClassPair<'a>,
}

impl ConstantRules<'_> {
    fn inherited_after(&self, name: &str) -> Option<&Constant> {
        resolve_inherited(self.pair.rules.full_after, self.pair.after.node, |source| {
            source
                .constant(name)
                .filter(|c| c.visibility != Visibility::Private)
        })
    }

    fn inherited_before(&self, name: &str) -> Option<&Constant> {
        resolve_inherited(self.pair.rules.full_before, self.pair.before.node, |source| {
            source
                .constant(name)
                .filter(|c| c.visibility != Visibility::Private)
        })
    }

    /// Constant values are not part of the contract; only visibility is.
    fn compare(&self, before: &Constant, after: &Constant, location: &Path, report: &mut Report) {
        if before.visibility == after.visibility {
            return;
        }
        let kind = if after.visibility < before.visibility {
            PhpChange::ConstantVisibilityDecreased
        } else {
            PhpChange::ConstantVisibilityIncreased
        };
        report.add(self.pair.rules.analyzer.table.value_change(
            self.pair.context(),
            ChangeKind::Php(kind),
            self.pair.target(&after.name),
            location,
            &before.visibility.to_string(),
            &after.visibility.to_string(),
        ));
    }
}

impl MembershipRules for ConstantRules<'_> {
    type Node = Constant;

    fn added(
        &self,
        _key: &str,
        after: Located<'_, Constant>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError> {
        let constant = after.node;
        let target = self.pair.target(&constant.name);
        match self.inherited_before(&constant.name) {
            Some(inherited) => {
                self.pair.report_op(
                    &mut out.changes,
                    PhpChange::ConstantMovedFromParent,
                    target,
                    after.location,
                );
                self.compare(inherited, constant, after.location, &mut out.changes);
            }
            None => self.pair.report_op(
                &mut out.changes,
                PhpChange::ConstantAdded,
                target,
                after.location,
            ),
        }
        Ok(())
    }

    fn removed(
        &self,
        _key: &str,
        before: Located<'_, Constant>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError> {
        let constant = before.node;
        let target = self.pair.target(&constant.name);
        match self.inherited_after(&constant.name) {
            Some(inherited) => {
                let location = self.pair.after.location;
                self.pair.report_op(
                    &mut out.changes,
                    PhpChange::ConstantMovedToParent,
                    target,
                    location,
                );
                self.compare(constant, inherited, location, &mut out.changes);
            }
            None => self.pair.report_op(
                &mut out.changes,
                PhpChange::ConstantRemoved,
                target,
                before.location,
            ),
        }
        Ok(())
    }

    fn membership_added(
        &self,
        _key: &str,
        _before: Located<'_, Constant>,
        after: Located<'_, Constant>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError> {
        self.pair.report_op(
            &mut out.membership,
            PhpChange::MembershipAdded(Member::Constant),
            self.pair.target(&after.node.name),
            after.location,
        );
        Ok(())
    }

    fn membership_removed(
        &self,
        _key: &str,
        before: Located<'_, Constant>,
        after: Located<'_, Constant>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError> {
        self.pair.report_op(
            &mut out.membership,
            PhpChange::MembershipRemoved(Member::Constant),
            self.pair.target(&before.node.name),
            after.location,
        );
        Ok(())
    }

    fn changed(
        &self,
        _key: &str,
        before: Located<'_, Constant>,
        after: Located<'_, Constant>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError> {
        self.compare(before.node, after.node, after.location, &mut out.changes);
        Ok(())
    }
}
