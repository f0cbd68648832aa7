//! PHP declaration analysis: class-likes divided by API membership, with
//! recursive descent into methods, properties and constants.

mod class;
mod constant;
mod method;
mod property;

use super::membership::{DividedReports, Keyed, Located, MembershipSets, divide};
use super::{AnalysisError, Analyzer, SeverityTable};
use crate::graph::EntityGraph;
use crate::model::{ClassLike, Context, MoveDirection, TypeSource, Visibility};
use crate::report::Report;
use crate::snapshot::{Registry, find_class};
use class::ClassRules;
use std::collections::HashSet;

pub const PHP_CONTEXTS: [Context; 3] = [Context::Class, Context::Interface, Context::Trait];

/// Which declarations an analysis compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// API projections against full registries, producing membership changes.
    Published,
    /// Every non-private declaration; API status is ignored.
    All,
}

pub struct PhpAnalyzer<'a> {
    table: &'a SeverityTable,
    /// Hierarchy used to relate thrown exception types.
    graph_after: &'a EntityGraph,
    scope: Scope,
}

impl<'a> PhpAnalyzer<'a> {
    pub fn new(table: &'a SeverityTable, graph_after: &'a EntityGraph, scope: Scope) -> Self {
        Self {
            table,
            graph_after,
            scope,
        }
    }

    /// Published-surface analysis over the four registries.
    pub fn analyze_published(
        &self,
        api_before: &Registry<ClassLike>,
        api_after: &Registry<ClassLike>,
        full_before: &Registry<ClassLike>,
        full_after: &Registry<ClassLike>,
    ) -> Result<DividedReports, AnalysisError> {
        let mut reports = DividedReports::default();

        for context in &PHP_CONTEXTS {
            let rules = ClassRules {
                analyzer: self,
                context: context.clone(),
                full_before,
                full_after,
            };
            let sets = MembershipSets {
                api_before: keyed(api_before, context),
                api_after: keyed(api_after, context),
                full_before: keyed(full_before, context),
                full_after: keyed(full_after, context),
            };
            reports.merge_from(divide(&rules, &sets)?);
        }

        tracing::debug!(
            changes = reports.changes.len(),
            membership = reports.membership.len(),
            "Analyzed published PHP declarations"
        );

        Ok(reports)
    }

    fn analyze_all(
        &self,
        before: &Registry<ClassLike>,
        after: &Registry<ClassLike>,
    ) -> Result<Report, AnalysisError> {
        let mut report = Report::new();

        for context in &PHP_CONTEXTS {
            let rules = ClassRules {
                analyzer: self,
                context: context.clone(),
                full_before: before,
                full_after: after,
            };
            let sets = MembershipSets::unpublished(keyed(before, context), keyed(after, context));
            report.merge_from(divide(&rules, &sets)?.changes);
        }

        tracing::debug!(changes = report.len(), "Analyzed all PHP declarations");

        Ok(report)
    }
}

impl Analyzer for PhpAnalyzer<'_> {
    type Node = ClassLike;

    fn analyze(
        &self,
        before: &Registry<ClassLike>,
        after: &Registry<ClassLike>,
    ) -> Result<Report, AnalysisError> {
        match self.scope {
            Scope::Published => Err(AnalysisError::DualRegistryRequired),
            Scope::All => self.analyze_all(before, after),
        }
    }
}

pub(crate) fn keyed<'r, T>(registry: &'r Registry<T>, context: &Context) -> Keyed<'r, T> {
    registry
        .entries(context)
        .into_iter()
        .map(|(key, node)| {
            let location = registry
                .location(context, key)
                .unwrap_or(std::path::Path::new(""));
            (key.to_string(), Located { node, location })
        })
        .collect()
}

/// The published projection of a registry: class-likes that are API or carry
/// an API member, with only their published non-private members.
pub fn api_projection(registry: &Registry<ClassLike>) -> Registry<ClassLike> {
    registry.filter_map(project_api)
}

fn project_api(class: &ClassLike) -> Option<ClassLike> {
    let published = |is_api: bool, visibility: Visibility| {
        visibility != Visibility::Private && (is_api || class.is_api)
    };

    let mut projected = class.clone();
    projected
        .methods
        .retain(|m| published(m.is_api, m.visibility));
    projected
        .properties
        .retain(|p| published(p.is_api, p.visibility));
    projected
        .constants
        .retain(|c| published(c.is_api, c.visibility));

    let has_api_member = !projected.methods.is_empty()
        || !projected.properties.is_empty()
        || !projected.constants.is_empty();

    (class.is_api || has_api_member).then_some(projected)
}

/// First member `find` yields along the parents and traits of `class`,
/// searched depth-first in declaration order.
pub(crate) fn resolve_inherited<'r, T: ?Sized>(
    registry: &'r Registry<ClassLike>,
    class: &ClassLike,
    find: impl Fn(&'r ClassLike) -> Option<&'r T>,
) -> Option<&'r T> {
    let mut visited = HashSet::new();
    let mut stack: Vec<&str> = class
        .inheritance_sources()
        .rev()
        .map(String::as_str)
        .collect();

    while let Some(name) = stack.pop() {
        if !visited.insert(crate::model::name_key(name)) {
            continue;
        }
        let Some(source) = find_class(registry, name) else {
            continue;
        };
        if let Some(found) = find(source) {
            return Some(found);
        }
        stack.extend(source.inheritance_sources().rev().map(String::as_str));
    }

    None
}

/// Direction of a type annotation moving between docblock and declaration.
pub(crate) fn type_move(before: TypeSource, after: TypeSource) -> Option<MoveDirection> {
    match (before, after) {
        (TypeSource::DocBlock, TypeSource::Inline) => Some(MoveDirection::DocToInline),
        (TypeSource::Inline, TypeSource::DocBlock) => Some(MoveDirection::InlineToDoc),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CyclePolicy;
    use crate::model::{ClassKind, Constant, Level, Method, Param, Property, TypeDecl};

    fn class(name: &str, is_api: bool) -> ClassLike {
        let mut class = ClassLike::new(name, ClassKind::Class);
        class.is_api = is_api;
        class
    }

    fn method(name: &str, params: Vec<Param>) -> Method {
        Method {
            name: name.to_string(),
            visibility: Visibility::Public,
            is_static: false,
            is_final: false,
            is_abstract: false,
            is_api: false,
            params,
            return_type: None,
            throws: Vec::new(),
        }
    }

    fn param(name: &str, ty: &str, default: Option<&str>) -> Param {
        Param {
            name: name.to_string(),
            type_decl: Some(TypeDecl::inline(ty)),
            default: default.map(str::to_string),
            variadic: false,
        }
    }

    fn registry(classes: Vec<ClassLike>) -> Registry<ClassLike> {
        let mut registry = Registry::new();
        for class in classes {
            let location = format!("{}.php", class.name.replace('\\', "/"));
            registry.insert(class.kind.context(), class.key(), class, location);
        }
        registry
    }

    struct Run {
        changes: Report,
        membership: Report,
        all: Report,
    }

    fn run(before: Vec<ClassLike>, after: Vec<ClassLike>) -> Run {
        let table = SeverityTable::new();
        let graph = EntityGraph::build(&after, CyclePolicy::Ignore);
        let full_before = registry(before);
        let full_after = registry(after);

        let published = PhpAnalyzer::new(&table, &graph, Scope::Published)
            .analyze_published(
                &api_projection(&full_before),
                &api_projection(&full_after),
                &full_before,
                &full_after,
            )
            .unwrap();
        let all = PhpAnalyzer::new(&table, &graph, Scope::All)
            .analyze(&full_before, &full_after)
            .unwrap();

        Run {
            changes: published.changes,
            membership: published.membership,
            all,
        }
    }

    fn codes(report: &Report) -> Vec<String> {
        report.iter().map(|(_, _, op)| op.code.clone()).collect()
    }

    #[test]
    fn test_published_analysis_requires_four_registries() {
        let table = SeverityTable::new();
        let graph = EntityGraph::default();
        let analyzer = PhpAnalyzer::new(&table, &graph, Scope::Published);
        let result = analyzer.analyze(&Registry::new(), &Registry::new());
        assert!(matches!(result, Err(AnalysisError::DualRegistryRequired)));
    }

    #[test]
    fn test_api_projection() {
        let mut internal = class("Vendor\\Internal", false);
        internal.methods.push(method("run", vec![]));
        let mut partial = class("Vendor\\Partial", false);
        let mut published = method("published", vec![]);
        published.is_api = true;
        partial.methods.push(published);
        partial.methods.push(method("hidden", vec![]));
        let mut api = class("Vendor\\Api", true);
        let mut private = method("secret", vec![]);
        private.visibility = Visibility::Private;
        api.methods.push(private);
        api.methods.push(method("run", vec![]));

        let projected = api_projection(&registry(vec![internal, partial, api]));

        assert_eq!(projected.len(), 2);
        assert!(projected.get(&Context::Class, "vendor\\internal").is_none());
        let partial = projected.get(&Context::Class, "vendor\\partial").unwrap();
        assert_eq!(partial.methods.len(), 1);
        let api = projected.get(&Context::Class, "vendor\\api").unwrap();
        assert_eq!(api.methods.len(), 1);
        assert_eq!(api.methods[0].name, "run");
    }

    #[test]
    fn test_new_api_class_is_added() {
        let run = run(vec![], vec![class("Vendor\\Service", true)]);
        assert_eq!(codes(&run.changes), vec!["C001"]);
        assert!(run.membership.is_empty());
    }

    #[test]
    fn test_class_becoming_api_is_membership_change() {
        let run = run(
            vec![class("Vendor\\Service", false)],
            vec![class("Vendor\\Service", true)],
        );
        assert!(run.changes.is_empty());
        assert_eq!(codes(&run.membership), vec!["C900"]);
        assert_eq!(run.membership.level(), Level::Minor);
    }

    #[test]
    fn test_non_api_class_gains_public_method() {
        let before = class("Vendor\\Internal", false);
        let mut after = before.clone();
        after.methods.push(method("execute", vec![]));

        let run = run(vec![before], vec![after]);

        assert!(run.changes.is_empty());
        assert!(run.membership.is_empty());
        assert_eq!(codes(&run.all), vec!["C020"]);
        assert_eq!(run.all.level(), Level::Minor);
    }

    #[test]
    fn test_required_parameter_added() {
        let mut before = class("Vendor\\Api", true);
        before.methods.push(method("run", vec![param("a", "int", None)]));
        let mut after = class("Vendor\\Api", true);
        after.methods.push(method(
            "run",
            vec![param("a", "int", None), param("b", "string", None)],
        ));

        let run = run(vec![before], vec![after]);

        assert_eq!(run.changes.level(), Level::Major);
        let op = &run.changes.operations(&Context::Class, Level::Major)[0];
        assert_eq!(op.code, "C040");
        assert_eq!(op.target, "Vendor\\Api::run($b)");
    }

    #[test]
    fn test_optional_parameter_added() {
        let build = |is_api: bool, is_final: bool| {
            let mut before = class("Vendor\\Service", is_api);
            before.is_final = is_final;
            before.methods.push(method("run", vec![param("a", "int", None)]));
            let mut after = before.clone();
            after.methods[0].params.push(param("b", "string", Some("'x'")));
            (before, after)
        };

        // Extendable API class: subclasses overriding `run` must follow.
        let (before, after) = build(true, false);
        assert_eq!(run(vec![before], vec![after]).changes.level(), Level::Minor);

        let (before, after) = build(true, true);
        assert_eq!(run(vec![before], vec![after]).changes.level(), Level::Patch);

        let (before, after) = build(false, false);
        assert_eq!(run(vec![before], vec![after]).all.level(), Level::Patch);
    }

    #[test]
    fn test_method_membership_added() {
        let mut before = class("Vendor\\Service", false);
        before.methods.push(method("run", vec![]));
        let mut after = before.clone();
        after.methods[0].is_api = true;

        let run = run(vec![before], vec![after]);

        assert!(run.changes.is_empty());
        assert_eq!(codes(&run.membership), vec!["C902"]);
        let op = &run.membership.operations(&Context::Class, Level::Minor)[0];
        assert_eq!(op.target, "Vendor\\Service::run");
    }

    #[test]
    fn test_method_moved_to_parent() {
        let base = class("Vendor\\Base", false);
        let mut child = class("Vendor\\Child", true);
        child.extends.push("Vendor\\Base".to_string());
        child.methods.push(method("run", vec![]));

        let mut base_after = base.clone();
        base_after.methods.push(method("run", vec![]));
        let mut child_after = child.clone();
        child_after.methods.clear();

        let run = run(vec![base, child], vec![base_after, child_after]);

        assert_eq!(codes(&run.changes), vec!["C022"]);
        assert_eq!(run.changes.level(), Level::Patch);
    }

    #[test]
    fn test_method_overwrite_added() {
        let mut base = class("Vendor\\Base", false);
        base.methods.push(method("run", vec![]));
        let mut child = class("Vendor\\Child", true);
        child.extends.push("Vendor\\Base".to_string());
        let mut child_after = child.clone();
        child_after.methods.push(method("run", vec![]));

        let run = run(vec![base.clone(), child], vec![base, child_after]);

        assert_eq!(codes(&run.changes), vec!["C024"]);
    }

    #[test]
    fn test_thrown_exceptions_use_hierarchy() {
        let exception = class("Exception", false);
        let mut local = class("LocalizedException", false);
        local.extends.push("Exception".to_string());

        let mut before = class("Vendor\\Api", true);
        let mut run_method = method("run", vec![]);
        run_method.throws.push("Exception".to_string());
        before.methods.push(run_method);

        let mut narrowed = before.clone();
        narrowed.methods[0].throws = vec!["LocalizedException".to_string()];
        let subclassed = run(
            vec![exception.clone(), local.clone(), before.clone()],
            vec![exception.clone(), local.clone(), narrowed],
        );
        assert_eq!(codes(&subclassed.changes), vec!["C060"]);

        let mut widened = before.clone();
        widened.methods[0].throws.push("RuntimeException".to_string());
        let added = run(
            vec![exception.clone(), before.clone()],
            vec![exception, widened],
        );
        assert_eq!(codes(&added.changes), vec!["C062"]);
        assert_eq!(added.changes.level(), Level::Major);
    }

    #[test]
    fn test_exception_widened_to_superclass_is_major() {
        let exception = class("Exception", false);
        let mut local = class("LocalizedException", false);
        local.extends.push("Exception".to_string());

        let mut before = class("Vendor\\Api", true);
        let mut run_method = method("run", vec![]);
        run_method.throws.push("LocalizedException".to_string());
        before.methods.push(run_method);
        let mut after = before.clone();
        after.methods[0].throws = vec!["\\Exception".to_string()];

        let run = run(
            vec![exception.clone(), local.clone(), before],
            vec![exception, local, after],
        );

        assert_eq!(codes(&run.changes), vec!["C061"]);
        let op = &run.changes.operations(&Context::Class, Level::Major)[0];
        assert_eq!(op.target, "Vendor\\Api::run throws Exception");
    }

    #[test]
    fn test_name_case_does_not_count_as_change() {
        let exception = class("Vendor\\Exception", false);
        let mut before = class("Vendor\\Api", true);
        before.implements.push("Vendor\\Contract".to_string());
        let mut run_method = method("run", vec![]);
        run_method.throws.push("Vendor\\Exception".to_string());
        before.methods.push(run_method);

        let mut after = before.clone();
        after.name = "\\vendor\\API".to_string();
        after.implements = vec!["\\vendor\\contract".to_string()];
        after.methods[0].throws = vec!["vendor\\exception".to_string()];

        let run = run(vec![exception.clone(), before], vec![exception, after]);

        assert!(run.changes.is_empty());
        assert!(run.membership.is_empty());
        assert!(run.all.is_empty());
    }

    #[test]
    fn test_method_visibility_changes() {
        let mut before = class("Vendor\\Api", true);
        before.methods.push(method("narrowed", vec![]));
        let mut widened = method("widened", vec![]);
        widened.visibility = Visibility::Protected;
        before.methods.push(widened);

        let mut after = before.clone();
        after.methods[0].visibility = Visibility::Protected;
        after.methods[1].visibility = Visibility::Public;

        let run = run(vec![before], vec![after]);

        let decreased = &run.changes.operations(&Context::Class, Level::Major)[0];
        assert_eq!(decreased.code, "C025");
        assert_eq!(decreased.target, "Vendor\\Api::narrowed");
        assert_eq!(
            decreased.reason,
            "Method visibility was decreased: `public` -> `protected`"
        );
        let increased = &run.changes.operations(&Context::Class, Level::Minor)[0];
        assert_eq!(increased.code, "C026");
        assert_eq!(increased.target, "Vendor\\Api::widened");
        assert_eq!(run.changes.len(), 2);
    }

    #[test]
    fn test_type_move_direction() {
        use TypeSource::*;
        assert_eq!(type_move(DocBlock, Inline), Some(MoveDirection::DocToInline));
        assert_eq!(type_move(Inline, DocBlock), Some(MoveDirection::InlineToDoc));
        assert_eq!(type_move(Inline, Inline), None);
    }

    #[test]
    fn test_doc_type_moves() {
        let mut before = class("Vendor\\Api", true);
        let mut run_method = method("run", vec![]);
        run_method.return_type = Some(TypeDecl::doc("string"));
        before.methods.push(run_method);
        before.properties.push(Property {
            name: "$name".to_string(),
            visibility: Visibility::Public,
            is_static: false,
            is_api: false,
            type_decl: Some(TypeDecl::doc("string")),
            default: None,
        });

        let mut after = before.clone();
        after.methods[0].return_type = Some(TypeDecl::inline("string"));
        after.properties[0].type_decl = Some(TypeDecl::inline("string"));

        let run = run(vec![before], vec![after]);
        let mut found = codes(&run.changes);
        found.sort();
        assert_eq!(found, vec!["D107", "D113"]);
    }

    #[test]
    fn test_constant_visibility_and_hierarchy() {
        let mut before = class("Vendor\\Api", true);
        before.constants.push(Constant {
            name: "LIMIT".to_string(),
            visibility: Visibility::Public,
            is_api: false,
            value: Some("10".to_string()),
        });
        let mut after = before.clone();
        after.constants[0].visibility = Visibility::Protected;
        after.constants[0].value = Some("20".to_string());
        after.implements.push("Vendor\\Contract".to_string());

        let run = run(vec![before], vec![after]);
        let mut found = codes(&run.changes);
        found.sort();
        assert_eq!(found, vec!["C005", "C084"]);
    }
}
