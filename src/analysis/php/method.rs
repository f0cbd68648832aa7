use super::class::ClassPair;
use super::{resolve_inherited, type_move};
use crate::analysis::AnalysisError;
use crate::analysis::membership::{DividedReports, Located, MembershipRules};
use crate::model::{
    ChangeKind, Member, Method, Param, PhpChange, TypeDecl, TypeSlot, Visibility, name_set,
};
use crate::report::Report;
use std::collections::BTreeSet;
use std::path::Path;

pub(super) struct MethodRules<'a> {
    pub pair: &'a ClassPair<'a>,
}

impl MethodRules<'_> {
    fn op(&self, report: &mut Report, kind: PhpChange, target: String, location: &Path) {
        self.pair.report_op(report, kind, target, location);
    }

    fn value_op(
        &self,
        report: &mut Report,
        kind: ChangeKind,
        target: String,
        location: &Path,
        before: &str,
        after: &str,
    ) {
        let table = self.pair.rules.analyzer.table;
        report.add(table.value_change(self.pair.context(), kind, target, location, before, after));
    }

    fn inherited_before(&self, name: &str) -> Option<&Method> {
        resolve_inherited(self.pair.rules.full_before, self.pair.before.node, |class| {
            class
                .method(name)
                .filter(|m| m.visibility != Visibility::Private)
        })
    }

    fn inherited_after(&self, name: &str) -> Option<&Method> {
        resolve_inherited(self.pair.rules.full_after, self.pair.after.node, |class| {
            class
                .method(name)
                .filter(|m| m.visibility != Visibility::Private)
        })
    }

    /// Signature differences between two versions of one method.
    fn compare(
        &self,
        before: &Method,
        after: &Method,
        location: &Path,
        report: &mut Report,
    ) -> Result<(), AnalysisError> {
        let target = self.pair.target(&after.name);

        if after.visibility < before.visibility {
            self.value_op(
                report,
                ChangeKind::Php(PhpChange::MethodVisibilityDecreased),
                target.clone(),
                location,
                &before.visibility.to_string(),
                &after.visibility.to_string(),
            );
        } else if after.visibility > before.visibility {
            self.value_op(
                report,
                ChangeKind::Php(PhpChange::MethodVisibilityIncreased),
                target.clone(),
                location,
                &before.visibility.to_string(),
                &after.visibility.to_string(),
            );
        }

        match (before.is_static, after.is_static) {
            (false, true) => {
                self.op(report, PhpChange::MethodBecameStatic, target.clone(), location)
            }
            (true, false) => {
                self.op(report, PhpChange::MethodBecameNonStatic, target.clone(), location)
            }
            _ => {}
        }
        if !before.is_final && after.is_final {
            self.op(report, PhpChange::MethodBecameFinal, target.clone(), location);
        }
        if !before.is_abstract && after.is_abstract {
            self.op(report, PhpChange::MethodBecameAbstract, target.clone(), location);
        }

        self.compare_params(&before.params, &after.params, &after.name, location, report);
        self.compare_return(&before.return_type, &after.return_type, &target, location, report);
        self.compare_throws(&before.throws, &after.throws, &target, location, report)
    }

    fn compare_params(
        &self,
        before: &[Param],
        after: &[Param],
        method: &str,
        location: &Path,
        report: &mut Report,
    ) {
        let class = self.pair.after.node;
        let param_target =
            |param: &Param| self.pair.target(&format!("{}(${})", method, param.name));

        for index in 0..before.len().max(after.len()) {
            match (before.get(index), after.get(index)) {
                (Some(old), Some(new)) => {
                    let target = param_target(new);
                    self.compare_type(
                        &old.type_decl,
                        &new.type_decl,
                        TypeSlot::Parameter,
                        PhpChange::ParameterTypeChanged,
                        &target,
                        location,
                        report,
                    );
                    let optionality = match (old.is_optional(), new.is_optional()) {
                        (true, false) => Some(PhpChange::ParameterBecameRequired),
                        (false, true) => Some(PhpChange::ParameterBecameOptional),
                        _ => None,
                    };
                    if let Some(kind) = optionality {
                        self.op(report, kind, target.clone(), location);
                    }
                    if let (Some(old_default), Some(new_default)) = (&old.default, &new.default) {
                        if old_default != new_default {
                            self.value_op(
                                report,
                                ChangeKind::Php(PhpChange::ParameterDefaultChanged),
                                target,
                                location,
                                old_default,
                                new_default,
                            );
                        }
                    }
                }
                (None, Some(new)) => {
                    let kind = if !new.is_optional() {
                        PhpChange::RequiredParameterAdded
                    } else if class.is_api && class.is_extendable() {
                        PhpChange::OptionalParameterAddedToExtendable
                    } else {
                        PhpChange::OptionalParameterAdded
                    };
                    self.op(report, kind, param_target(new), location);
                }
                (Some(old), None) => {
                    self.op(report, PhpChange::ParameterRemoved, param_target(old), location);
                }
                (None, None) => {}
            }
        }
    }

    fn compare_return(
        &self,
        before: &Option<TypeDecl>,
        after: &Option<TypeDecl>,
        target: &str,
        location: &Path,
        report: &mut Report,
    ) {
        match (before, after) {
            (None, Some(_)) => {
                self.op(report, PhpChange::ReturnTypeAdded, target.to_string(), location)
            }
            (Some(_), None) => {
                self.op(report, PhpChange::ReturnTypeRemoved, target.to_string(), location)
            }
            _ => self.compare_type(
                before,
                after,
                TypeSlot::Return,
                PhpChange::ReturnTypeChanged,
                target,
                location,
                report,
            ),
        }
    }

    /// Type changes of a parameter or return value, including pure moves
    /// between the docblock and the inline declaration.
    #[allow(clippy::too_many_arguments)]
    fn compare_type(
        &self,
        before: &Option<TypeDecl>,
        after: &Option<TypeDecl>,
        slot: TypeSlot,
        changed: PhpChange,
        target: &str,
        location: &Path,
        report: &mut Report,
    ) {
        match (before, after) {
            (Some(old), Some(new)) if !old.same_type(new) => self.value_op(
                report,
                ChangeKind::Php(changed),
                target.to_string(),
                location,
                &old.name,
                &new.name,
            ),
            (Some(old), Some(new)) => {
                if let Some(direction) = type_move(old.source, new.source) {
                    report.add(self.pair.rules.analyzer.table.operation(
                        self.pair.context(),
                        ChangeKind::DocType(slot, direction),
                        target,
                        location,
                    ));
                }
            }
            (Some(old), None) => self.value_op(
                report,
                ChangeKind::Php(changed),
                target.to_string(),
                location,
                &old.name,
                "mixed",
            ),
            (None, Some(new)) => self.value_op(
                report,
                ChangeKind::Php(changed),
                target.to_string(),
                location,
                "mixed",
                &new.name,
            ),
            (None, None) => {}
        }
    }

    /// New thrown types are judged against the previously thrown ones using
    /// the "after" class hierarchy.
    fn compare_throws(
        &self,
        before: &[String],
        after: &[String],
        target: &str,
        location: &Path,
        report: &mut Report,
    ) -> Result<(), AnalysisError> {
        let graph = self.pair.rules.analyzer.graph_after;
        let (old, new) = (name_set(before), name_set(after));

        let mut replaced = BTreeSet::new();
        for (key, thrown) in &new {
            if old.contains_key(key) {
                continue;
            }
            let mut kind = PhpChange::ExceptionAdded;
            for (previous_key, previous) in &old {
                if graph.inherits_from(thrown, previous)? {
                    kind = PhpChange::ExceptionSubclassed;
                    replaced.insert(previous_key);
                    break;
                }
                if graph.inherits_from(previous, thrown)? {
                    kind = PhpChange::ExceptionSuperclassed;
                    replaced.insert(previous_key);
                    break;
                }
            }
            self.op(report, kind, format!("{} throws {}", target, thrown), location);
        }

        for (key, thrown) in &old {
            if !new.contains_key(key) && !replaced.contains(key) {
                self.op(
                    report,
                    PhpChange::ExceptionRemoved,
                    format!("{} throws {}", target, thrown),
                    location,
                );
            }
        }

        Ok(())
    }
}

impl MembershipRules for MethodRules<'_> {
    type Node = Method;

    fn added(
        &self,
        _key: &str,
        after: Located<'_, Method>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError> {
        let method = after.node;
        let target = self.pair.target(&method.name);

        let Some(inherited) = self.inherited_before(&method.name) else {
            self.op(&mut out.changes, PhpChange::MethodAdded, target, after.location);
            return Ok(());
        };

        let kind = if self.inherited_after(&method.name).is_some() {
            PhpChange::MethodOverwriteAdded
        } else {
            PhpChange::MethodMovedFromParent
        };
        self.op(&mut out.changes, kind, target, after.location);
        self.compare(inherited, method, after.location, &mut out.changes)
    }

    fn removed(
        &self,
        _key: &str,
        before: Located<'_, Method>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError> {
        let method = before.node;
        let target = self.pair.target(&method.name);
        let location = self.pair.after.location;

        match self.inherited_after(&method.name) {
            Some(inherited) => {
                self.op(&mut out.changes, PhpChange::MethodMovedToParent, target, location);
                self.compare(method, inherited, location, &mut out.changes)
            }
            None => {
                self.op(&mut out.changes, PhpChange::MethodRemoved, target, before.location);
                Ok(())
            }
        }
    }

    fn membership_added(
        &self,
        _key: &str,
        _before: Located<'_, Method>,
        after: Located<'_, Method>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError> {
        self.op(
            &mut out.membership,
            PhpChange::MembershipAdded(Member::Method),
            self.pair.target(&after.node.name),
            after.location,
        );
        Ok(())
    }

    fn membership_removed(
        &self,
        _key: &str,
        before: Located<'_, Method>,
        after: Located<'_, Method>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError> {
        self.op(
            &mut out.membership,
            PhpChange::MembershipRemoved(Member::Method),
            self.pair.target(&before.node.name),
            after.location,
        );
        Ok(())
    }

    fn changed(
        &self,
        _key: &str,
        before: Located<'_, Method>,
        after: Located<'_, Method>,
        out: &mut DividedReports,
    ) -> Result<(), AnalysisError> {
        self.compare(before.node, after.node, after.location, &mut out.changes)
    }
}
