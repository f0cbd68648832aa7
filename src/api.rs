//! Library API for semvercheck.
//!
//! Unlike the CLI commands, which print output and return exit codes, these
//! functions return `Result` types for calling code to handle.
//!
//! # Example
//!
//! ```no_run
//! use semvercheck::{check, CheckOptions};
//! use std::path::Path;
//!
//! let result = check(Path::new("release-1.0"), Path::new("release-1.1"), CheckOptions::default())?;
//! println!("Suggested bump: {}", result.level());
//! for (context, level, operation) in result.report().iter() {
//!     println!("{} {} {} {}", context, level, operation.code, operation.target);
//! }
//! # Ok::<(), semvercheck::SemverError>(())
//! ```

use crate::analysis::{self, Analysis, AnalysisError};
use crate::config::{Config, ConfigError};
use crate::fs::{FileSystem, default_fs};
use crate::graph::CyclePolicy;
use crate::model::Level;
use crate::output::{JsonOutput, MarkdownOutput, OutputFormatter};
use crate::report::Report;
use crate::snapshot::{ScanError, ScannerRegistry, Snapshot};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while checking two snapshots.
#[derive(Debug, Error)]
pub enum SemverError {
    /// A snapshot root could not be found or resolved.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A manifest could not be read or parsed.
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    /// The comparison itself failed, e.g. on an inheritance cycle under the
    /// `error` cycle policy.
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Options for `check`. Unset fields fall back to the `.semvercheck.toml`
/// found in the "after" root.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Highest acceptable bump.
    pub allowed_level: Option<Level>,

    /// Manifest families to scan (empty means the configured ones).
    pub contexts: Vec<String>,

    pub cycle_policy: Option<CyclePolicy>,

    /// Per-code level overrides, applied on top of configured ones.
    pub level_overrides: BTreeMap<String, Level>,
}

/// Result of comparing two snapshots.
#[derive(Debug, Clone)]
pub struct CheckResult {
    analysis: Analysis,
    allowed_level: Level,
}

impl CheckResult {
    /// Suggested version bump.
    pub fn level(&self) -> Level {
        self.analysis.level
    }

    pub fn allowed_level(&self) -> Level {
        self.allowed_level
    }

    /// Whether the suggested bump fits within the allowed level.
    pub fn is_allowed(&self) -> bool {
        self.analysis.level.allows(self.allowed_level)
    }

    /// Merged, deduplicated operations.
    pub fn report(&self) -> &Report {
        &self.analysis.report
    }

    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    /// Format the result as markdown.
    pub fn to_markdown(&self) -> Result<String, SemverError> {
        self.render(&MarkdownOutput::new(Some(self.allowed_level)))
    }

    /// Format the result as JSON.
    pub fn to_json(&self) -> Result<String, SemverError> {
        self.render(&JsonOutput::new(Some(self.allowed_level)))
    }

    fn render(&self, formatter: &impl OutputFormatter) -> Result<String, SemverError> {
        let mut buffer = Vec::new();
        formatter.format(&self.analysis, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

/// Compare two snapshot directories and suggest a version bump.
///
/// # Arguments
///
/// * `before` - Root of the previous release's manifests.
/// * `after` - Root of the candidate release's manifests.
/// * `options` - Overrides for the configuration found in `after`.
///
/// # Example
///
/// ```no_run
/// use semvercheck::{check, CheckOptions, Level};
/// use std::path::Path;
///
/// let result = check(Path::new("old"), Path::new("new"), CheckOptions {
///     allowed_level: Some(Level::Minor),
///     ..Default::default()
/// })?;
/// if !result.is_allowed() {
///     eprintln!("{}", result.to_markdown()?);
/// }
/// # Ok::<(), semvercheck::SemverError>(())
/// ```
pub fn check(
    before: &Path,
    after: &Path,
    options: CheckOptions,
) -> Result<CheckResult, SemverError> {
    check_with_fs(before, after, options, default_fs())
}

pub fn check_with_fs(
    before: &Path,
    after: &Path,
    options: CheckOptions,
    fs: &dyn FileSystem,
) -> Result<CheckResult, SemverError> {
    let before = resolve(before)?;
    let after = resolve(after)?;

    let mut config = Config::load(&after, fs)?;
    if let Some(level) = options.allowed_level {
        config.allowed_level = level;
    }
    if let Some(policy) = options.cycle_policy {
        config.cycle_policy = policy;
    }
    if !options.contexts.is_empty() {
        config.contexts = options.contexts;
    }
    if !options.level_overrides.is_empty() {
        let mut overrides = config.severity.overrides().clone();
        overrides.extend(options.level_overrides);
        config.severity = analysis::SeverityTable::with_overrides(overrides);
    }

    let scanners = if config.contexts.is_empty() {
        ScannerRegistry::new()
    } else {
        ScannerRegistry::with_contexts(&config.contexts)
    };
    tracing::debug!(scanners = ?scanners.names(), "Scanning snapshots");

    let (old, new) = rayon::join(
        || Snapshot::load(&before, &scanners, config.cycle_policy, fs),
        || Snapshot::load(&after, &scanners, config.cycle_policy, fs),
    );
    let analysis = analysis::analyze(&old?, &new?, &config.severity)?;

    Ok(CheckResult {
        analysis,
        allowed_level: config.allowed_level,
    })
}

fn resolve(path: &Path) -> Result<PathBuf, SemverError> {
    path.canonicalize()
        .map_err(|_| SemverError::PathNotFound(path.to_path_buf()))
}
