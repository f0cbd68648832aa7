use crate::analysis::SeverityTable;
use crate::fs::FileSystem;
use crate::graph::CyclePolicy;
use crate::model::Level;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = ".semvercheck.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid level for {key}: {value}")]
    InvalidLevel { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Highest bump `compare` accepts before failing.
    pub allowed_level: Level,
    pub cycle_policy: CyclePolicy,
    pub severity: SeverityTable,
    /// Scanner names to enable; empty means all.
    pub contexts: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    allowed_level: Option<String>,
    graph: Option<RawGraph>,
    levels: Option<BTreeMap<String, String>>,
    scan: Option<RawScan>,
}

#[derive(Debug, Deserialize)]
struct RawGraph {
    cycle_policy: Option<CyclePolicy>,
}

#[derive(Debug, Deserialize)]
struct RawScan {
    contexts: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allowed_level: Level::Major,
            cycle_policy: CyclePolicy::default(),
            severity: SeverityTable::default(),
            contexts: Vec::new(),
        }
    }
}

impl Config {
    /// Read `.semvercheck.toml` from `root`, falling back to defaults when absent.
    pub fn load(root: &Path, fs: &dyn FileSystem) -> Result<Self, ConfigError> {
        let config_path = root.join(CONFIG_FILE);

        if !fs.exists(&config_path) {
            return Ok(Self::default());
        }

        let content = fs.read_to_string(&config_path)?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %config_path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;

        let allowed_level = match raw.allowed_level {
            Some(value) => parse_level("allowed_level", &value)?,
            None => Level::Major,
        };

        let cycle_policy = raw
            .graph
            .and_then(|g| g.cycle_policy)
            .unwrap_or_default();

        let mut overrides = BTreeMap::new();
        for (code, value) in raw.levels.unwrap_or_default() {
            let level = parse_level(&code, &value)?;
            overrides.insert(code.to_uppercase(), level);
        }

        Ok(Self {
            allowed_level,
            cycle_policy,
            severity: SeverityTable::with_overrides(overrides),
            contexts: raw.scan.and_then(|s| s.contexts).unwrap_or_default(),
        })
    }
}

fn parse_level(key: &str, value: &str) -> Result<Level, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidLevel {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Starter configuration written by `semvercheck init`.
pub fn generate_config_template() -> String {
    r#"# semvercheck configuration

# Highest version bump `semvercheck compare` accepts (none, patch, minor, major).
allowed_level = "major"

[graph]
# What ancestor/descendant queries do on an inheritance cycle: "ignore" or "error".
cycle_policy = "ignore"

[levels]
# Per-code severity overrides, e.g.:
# C006 = "patch"

[scan]
# Restrict scanned manifest families; all are enabled when omitted.
# contexts = ["php", "database", "di", "xsd", "system", "less"]
"#
    .to_string()
}
