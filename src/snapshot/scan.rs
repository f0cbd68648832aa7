//! Manifest scanners. Each recognizes one declaration family by file name and
//! deserializes it into typed nodes.

use crate::model::{ClassLike, DiConfig, LessFile, ModuleSchema, SystemConfig, XsdSchema};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Snapshot root not found: {0}")]
    MissingRoot(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The typed content of one manifest.
#[derive(Debug, Clone, PartialEq)]
pub enum Scanned {
    Php(Vec<ClassLike>),
    Database(ModuleSchema),
    Di(DiConfig),
    Xsd(XsdSchema),
    System(SystemConfig),
    Less(LessFile),
}

pub trait Scanner: Send + Sync {
    fn name(&self) -> &'static str;
    fn accepts(&self, path: &Path) -> bool;
    fn scan(&self, path: &Path, source: &str) -> Result<Scanned, ScanError>;
}

fn parse_manifest<T: DeserializeOwned>(path: &Path, source: &str) -> Result<T, ScanError> {
    serde_json::from_str(source).map_err(|source| ScanError::Manifest {
        path: path.to_path_buf(),
        source,
    })
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

/// A PHP manifest holds either one declaration or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum PhpManifest {
    One(ClassLike),
    Many(Vec<ClassLike>),
}

pub struct PhpScanner;

impl Scanner for PhpScanner {
    fn name(&self) -> &'static str {
        "php"
    }

    fn accepts(&self, path: &Path) -> bool {
        file_name(path).ends_with(".php.json")
    }

    fn scan(&self, path: &Path, source: &str) -> Result<Scanned, ScanError> {
        let declarations = match parse_manifest::<PhpManifest>(path, source)? {
            PhpManifest::One(class) => vec![class],
            PhpManifest::Many(classes) => classes,
        };
        Ok(Scanned::Php(declarations))
    }
}

pub struct DbSchemaScanner;

impl Scanner for DbSchemaScanner {
    fn name(&self) -> &'static str {
        "database"
    }

    fn accepts(&self, path: &Path) -> bool {
        file_name(path) == "db_schema.json"
    }

    fn scan(&self, path: &Path, source: &str) -> Result<Scanned, ScanError> {
        parse_manifest(path, source).map(Scanned::Database)
    }
}

pub struct DiScanner;

impl Scanner for DiScanner {
    fn name(&self) -> &'static str {
        "di"
    }

    fn accepts(&self, path: &Path) -> bool {
        file_name(path) == "di.json"
    }

    fn scan(&self, path: &Path, source: &str) -> Result<Scanned, ScanError> {
        parse_manifest(path, source).map(Scanned::Di)
    }
}

pub struct XsdScanner;

impl Scanner for XsdScanner {
    fn name(&self) -> &'static str {
        "xsd"
    }

    fn accepts(&self, path: &Path) -> bool {
        file_name(path).ends_with(".xsd.json")
    }

    fn scan(&self, path: &Path, source: &str) -> Result<Scanned, ScanError> {
        parse_manifest(path, source).map(Scanned::Xsd)
    }
}

pub struct SystemScanner;

impl Scanner for SystemScanner {
    fn name(&self) -> &'static str {
        "system"
    }

    fn accepts(&self, path: &Path) -> bool {
        file_name(path) == "system.json"
    }

    fn scan(&self, path: &Path, source: &str) -> Result<Scanned, ScanError> {
        parse_manifest(path, source).map(Scanned::System)
    }
}

pub struct LessScanner;

impl Scanner for LessScanner {
    fn name(&self) -> &'static str {
        "less"
    }

    fn accepts(&self, path: &Path) -> bool {
        file_name(path).ends_with(".less.json")
    }

    fn scan(&self, path: &Path, source: &str) -> Result<Scanned, ScanError> {
        parse_manifest(path, source).map(Scanned::Less)
    }
}

pub struct ScannerRegistry {
    scanners: Vec<Box<dyn Scanner>>,
}

impl Default for ScannerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ScannerRegistry {
    pub fn new() -> Self {
        Self {
            scanners: vec![
                Box::new(PhpScanner),
                Box::new(DbSchemaScanner),
                Box::new(DiScanner),
                Box::new(XsdScanner),
                Box::new(SystemScanner),
                Box::new(LessScanner),
            ],
        }
    }

    /// Only the named scanners; unknown names are ignored and an empty
    /// selection falls back to every scanner.
    pub fn with_contexts(contexts: &[String]) -> Self {
        let mut scanners: Vec<Box<dyn Scanner>> = Vec::new();

        for context in contexts {
            match context.to_lowercase().as_str() {
                "php" => scanners.push(Box::new(PhpScanner)),
                "database" | "db" | "db_schema" => scanners.push(Box::new(DbSchemaScanner)),
                "di" => scanners.push(Box::new(DiScanner)),
                "xsd" => scanners.push(Box::new(XsdScanner)),
                "system" => scanners.push(Box::new(SystemScanner)),
                "less" => scanners.push(Box::new(LessScanner)),
                other => tracing::warn!(context = other, "Unknown scanner context"),
            }
        }

        if scanners.is_empty() {
            return Self::new();
        }

        Self { scanners }
    }

    pub fn find_scanner(&self, path: &Path) -> Option<&dyn Scanner> {
        self.scanners
            .iter()
            .find(|s| s.accepts(path))
            .map(|s| s.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.scanners.iter().map(|s| s.name()).collect()
    }
}
