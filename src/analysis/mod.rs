mod classify;
mod database;
mod di;
mod differ;
mod less;
mod membership;
mod php;
mod suggest;
mod system;
mod xsd;

pub use classify::{Rule, SeverityTable, all_rules, classify};
pub use database::DatabaseAnalyzer;
pub use di::DiAnalyzer;
pub use differ::{KeyDiff, NodeRules, diff_keys, diff_located, diff_map, diff_registry};
pub use less::LessAnalyzer;
pub use membership::{
    DividedReports, Keyed, Located, MembershipPartition, MembershipRules, MembershipSets, divide,
};
pub use php::{PHP_CONTEXTS, PhpAnalyzer, Scope, api_projection};
pub use suggest::suggest_level;
pub use system::SystemAnalyzer;
pub use xsd::XsdAnalyzer;

use crate::graph::GraphError;
use crate::model::Level;
use crate::report::Report;
use crate::snapshot::{ChangedFiles, Registry, Snapshot};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// The membership analysis compares API and full views of both sides and
    /// cannot run from a single before/after pair.
    #[error("Published API analysis needs API and full registries for both snapshots")]
    DualRegistryRequired,
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Compares one family of declarations between two snapshots.
pub trait Analyzer {
    type Node;

    fn analyze(
        &self,
        before: &Registry<Self::Node>,
        after: &Registry<Self::Node>,
    ) -> Result<Report, AnalysisError>;
}

/// Everything one comparison produced.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// Structural changes, API membership changes excluded.
    pub changes: Report,
    /// Declarations and members entering or leaving the published API.
    pub membership: Report,
    /// Both reports merged and deduplicated.
    pub report: Report,
    pub changed_files: ChangedFiles,
    pub level: Level,
}

/// Run every analyzer over two loaded snapshots.
pub fn analyze(
    before: &Snapshot,
    after: &Snapshot,
    table: &SeverityTable,
) -> Result<Analysis, AnalysisError> {
    let api_before = api_projection(&before.php);
    let api_after = api_projection(&after.php);
    tracing::debug!(
        before = api_before.len(),
        after = api_after.len(),
        "Projected published declarations"
    );

    let published = PhpAnalyzer::new(table, &after.graph, Scope::Published).analyze_published(
        &api_before,
        &api_after,
        &before.php,
        &after.php,
    )?;

    // Published surfaces, inherited ones included, are judged by the pass
    // above; everything the full pass finds is at most a patch.
    let unpublished = PhpAnalyzer::new(table, &after.graph, Scope::All)
        .analyze(&before.php, &after.php)?
        .dampened();
    tracing::debug!(operations = unpublished.len(), "Dampened unpublished changes");

    let mut changes = published.changes.merge(unpublished);
    changes.merge_from(DatabaseAnalyzer::new(table).analyze(&before.database, &after.database)?);
    changes.merge_from(DiAnalyzer::new(table).analyze(&before.di, &after.di)?);
    changes.merge_from(XsdAnalyzer::new(table).analyze(&before.xsd, &after.xsd)?);
    changes.merge_from(SystemAnalyzer::new(table).analyze(&before.system, &after.system)?);
    changes.merge_from(LessAnalyzer::new(table).analyze(&before.less, &after.less)?);

    let report = changes.clone().merge(published.membership.clone()).deduplicated();
    let changed_files = ChangedFiles::between(before, after);
    let level = suggest_level(&[&report], &changed_files);

    tracing::info!(
        operations = report.len(),
        changed_files = changed_files.len(),
        %level,
        "Analysis complete"
    );

    Ok(Analysis {
        changes,
        membership: published.membership,
        report,
        changed_files,
        level,
    })
}
