use super::constant::ConstantRules;
use super::method::MethodRules;
use super::property::PropertyRules;
use super::{PhpAnalyzer, Scope};
use crate::analysis::AnalysisError;
use crate::analysis::membership::{
    DividedReports, Keyed, Located, MembershipRules, MembershipSets, divide,
};
use crate::model::{ChangeKind, ClassLike, Context, Member, PhpChange, Visibility, name_set};
use crate::report::Report;
use crate::snapshot::Registry;
use std::path::Path;

pub(super) struct ClassRules<'a> {
    pub analyzer: &'a PhpAnalyzer<'a>,
    pub context: Context,
    pub full_before: &'a Registry<ClassLike>,
    pub full_after: &'a Registry<ClassLike>,
}

/// One class-like pair whose members are being divided.
pub(super) struct ClassPair<'a> {
    pub rules: &'a ClassRules<'a>,
    pub before: Located<'a, ClassLike>,
    pub after: Located<'a, ClassLike>,
}

impl ClassPair<'_> {
    pub fn context(&self) -> Context {
        self.rules.context.clone()
    }

    pub fn target(&self, member: &str) -> String {
        format!("{}::{}", self.after.node.fqn(), member)
    }

    pub fn report_op(&self, report: &mut Report, kind: PhpChange, target: String, location: &Path) {
        report.add(
            self.rules
                .analyzer
                .table
                .operation(self.context(), ChangeKind::Php(kind), target, location),
        );
    }
}

impl<'a> ClassRules<'a> {
    fn op(&self, report: &mut Report, kind: PhpChange, target: impl Into<String>, location: &Path) {
        report.add(self.analyzer.table.operation(
            self.context.clone(),
            ChangeKind::Php(kind),
            target,
            location,
        ));
    }

    fn full_class(
        &self,
        registry: &'a Registry<ClassLike>,
        key: &str,
    ) -> Option<Located<'a, ClassLike>> {
        let node = registry.get(&self.context, key)?;
        let location = registry.location(&self.context, key)?;
        Some(Located { node, location })
    }

    /// Divide methods, properties and constants of one class-like. `api_*`
    /// are the published projections, `None` on a side where the class-like
    /// was not published.
    fn divide_members(
        &self,
        api_before: Option<&ClassLike>,
        api_after: Option<&ClassLike>,
        full_before: Located<'_, ClassLike>,
        full_after: Located<'_, ClassLike>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError> {
        let pair = ClassPair {
            rules: self,
            before: full_before,
            after: full_after,
        };

        let method_sets = member_sets(
            api_before,
            api_after,
            &pair,
            |class| class.methods.iter().map(|m| (m.key(), m, m.visibility)).collect(),
        );
        out.merge_from(divide(&MethodRules { pair: &pair }, &method_sets)?);

        let property_sets = member_sets(
            api_before,
            api_after,
            &pair,
            |class| class.properties.iter().map(|p| (p.key(), p, p.visibility)).collect(),
        );
        out.merge_from(divide(&PropertyRules { pair: &pair }, &property_sets)?);

        let constant_sets = member_sets(
            api_before,
            api_after,
            &pair,
            |class| class.constants.iter().map(|c| (c.key(), c, c.visibility)).collect(),
        );
        out.merge_from(divide(&ConstantRules { pair: &pair }, &constant_sets)?);

        Ok(())
    }

    /// Hierarchy and modifier changes of a class-like published on both sides.
    fn compare_declarations(
        &self,
        before: &ClassLike,
        after: &ClassLike,
        location: &Path,
        report: &mut Report,
    ) {
        let name = after.fqn();
        let relations = [
            (
                &before.extends,
                &after.extends,
                "extends",
                PhpChange::ParentAdded,
                PhpChange::ParentRemoved,
            ),
            (
                &before.implements,
                &after.implements,
                "implements",
                PhpChange::InterfaceAdded,
                PhpChange::InterfaceRemoved,
            ),
            (
                &before.uses,
                &after.uses,
                "uses",
                PhpChange::TraitAdded,
                PhpChange::TraitRemoved,
            ),
        ];

        for (old, new, relation, added, removed) in relations {
            let (old, new) = (name_set(old), name_set(new));
            for (key, related) in &new {
                if !old.contains_key(key) {
                    let target = format!("{}::{} {}", name, relation, related);
                    self.op(report, added, target, location);
                }
            }
            for (key, related) in &old {
                if !new.contains_key(key) {
                    let target = format!("{}::{} {}", name, relation, related);
                    self.op(report, removed, target, location);
                }
            }
        }

        match (before.is_final, after.is_final) {
            (false, true) => self.op(report, PhpChange::BecameFinal, &name, location),
            (true, false) => self.op(report, PhpChange::BecameNonFinal, &name, location),
            _ => {}
        }
        match (before.is_abstract, after.is_abstract) {
            (false, true) => self.op(report, PhpChange::BecameAbstract, &name, location),
            (true, false) => self.op(report, PhpChange::BecameNonAbstract, &name, location),
            _ => {}
        }
    }
}

/// Member views of one class-like pair. Private members are never part of
/// the compared surface.
fn member_sets<'p, T>(
    api_before: Option<&'p ClassLike>,
    api_after: Option<&'p ClassLike>,
    pair: &ClassPair<'p>,
    members: impl Fn(&'p ClassLike) -> Vec<(String, &'p T, Visibility)>,
) -> MembershipSets<'p, T> {
    let view = |class: Option<&'p ClassLike>, location: &'p Path| -> Keyed<'p, T> {
        class
            .map(|class| {
                members(class)
                    .into_iter()
                    .filter(|(_, _, visibility)| *visibility != Visibility::Private)
                    .map(|(key, node, _)| (key, Located { node, location }))
                    .collect()
            })
            .unwrap_or_default()
    };

    MembershipSets {
        api_before: view(api_before, pair.before.location),
        api_after: view(api_after, pair.after.location),
        full_before: view(Some(pair.before.node), pair.before.location),
        full_after: view(Some(pair.after.node), pair.after.location),
    }
}

impl MembershipRules for ClassRules<'_> {
    type Node = ClassLike;

    fn added(
        &self,
        _key: &str,
        after: Located<'_, ClassLike>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError> {
        self.op(&mut out.changes, PhpChange::Added, after.node.fqn(), after.location);
        Ok(())
    }

    fn removed(
        &self,
        _key: &str,
        before: Located<'_, ClassLike>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError> {
        self.op(&mut out.changes, PhpChange::Removed, before.node.fqn(), before.location);
        Ok(())
    }

    fn membership_added(
        &self,
        key: &str,
        before: Located<'_, ClassLike>,
        after: Located<'_, ClassLike>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError> {
        let Some(full_after) = self.full_class(self.full_after, key) else {
            return Ok(());
        };
        if !before.node.is_api && after.node.is_api {
            self.op(
                &mut out.membership,
                PhpChange::MembershipAdded(Member::Declaration),
                after.node.fqn(),
                after.location,
            );
        }
        self.divide_members(None, Some(after.node), before, full_after, out)
    }

    fn membership_removed(
        &self,
        key: &str,
        before: Located<'_, ClassLike>,
        after: Located<'_, ClassLike>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError> {
        let Some(full_before) = self.full_class(self.full_before, key) else {
            return Ok(());
        };
        if before.node.is_api && !after.node.is_api {
            self.op(
                &mut out.membership,
                PhpChange::MembershipRemoved(Member::Declaration),
                after.node.fqn(),
                after.location,
            );
        }
        self.divide_members(Some(before.node), None, full_before, after, out)
    }

    fn changed(
        &self,
        key: &str,
        before: Located<'_, ClassLike>,
        after: Located<'_, ClassLike>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError> {
        let full_before = self.full_class(self.full_before, key).unwrap_or(before);
        let full_after = self.full_class(self.full_after, key).unwrap_or(after);

        let published_both = match self.analyzer.scope {
            Scope::All => true,
            Scope::Published => before.node.is_api && after.node.is_api,
        };
        if published_both {
            self.compare_declarations(
                full_before.node,
                full_after.node,
                after.location,
                &mut out.changes,
            );
        } else if !before.node.is_api && after.node.is_api {
            self.op(
                &mut out.membership,
                PhpChange::MembershipAdded(Member::Declaration),
                after.node.fqn(),
                after.location,
            );
        } else if before.node.is_api && !after.node.is_api {
            self.op(
                &mut out.membership,
                PhpChange::MembershipRemoved(Member::Declaration),
                after.node.fqn(),
                after.location,
            );
        }

        self.divide_members(
            Some(before.node),
            Some(after.node),
            full_before,
            full_after,
            out,
        )
    }
}
