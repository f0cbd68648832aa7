//! One side ("before" or "after") of a comparison: every manifest under a
//! root directory scanned into per-family registries, plus the inheritance
//! graph and content hashes of all files.

mod files;
mod registry;
mod scan;

pub use files::ChangedFiles;
pub use registry::Registry;
pub use scan::{
    DbSchemaScanner, DiScanner, LessScanner, PhpScanner, ScanError, Scanned, Scanner,
    ScannerRegistry, SystemScanner, XsdScanner,
};

use crate::fs::FileSystem;
use crate::graph::{CyclePolicy, EntityGraph};
use crate::model::{
    ClassLike, Context, LessFile, ModuleSchema, SystemConfig, VirtualType, XsdSchema,
};
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct Snapshot {
    pub root: PathBuf,
    pub php: Registry<ClassLike>,
    pub database: Registry<ModuleSchema>,
    pub di: Registry<VirtualType>,
    pub xsd: Registry<XsdSchema>,
    pub system: Registry<SystemConfig>,
    pub less: Registry<LessFile>,
    pub graph: EntityGraph,
    /// Content hash of every file, keyed by root-relative path.
    pub files: BTreeMap<String, String>,
}

impl Snapshot {
    /// Walk `root` and scan every manifest a scanner accepts.
    pub fn load(
        root: &Path,
        scanners: &ScannerRegistry,
        cycle_policy: CyclePolicy,
        fs: &dyn FileSystem,
    ) -> Result<Self, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::MissingRoot(root.to_path_buf()));
        }

        let walker = WalkBuilder::new(root).hidden(true).git_ignore(true).build();
        let mut paths: Vec<PathBuf> = walker
            .flatten()
            .map(|entry| entry.into_path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        Self::load_files(root, &paths, scanners, cycle_policy, fs)
    }

    /// Scan an explicit file list. Reading, hashing and parsing run in
    /// parallel; registration follows path order so later files win.
    pub fn load_files(
        root: &Path,
        paths: &[PathBuf],
        scanners: &ScannerRegistry,
        cycle_policy: CyclePolicy,
        fs: &dyn FileSystem,
    ) -> Result<Self, ScanError> {
        let scanned: Vec<(String, String, Option<Scanned>)> = paths
            .par_iter()
            .map(|path| -> Result<(String, String, Option<Scanned>), ScanError> {
                let bytes = fs.read(path).map_err(|source| ScanError::Io {
                    path: path.clone(),
                    source,
                })?;
                let relative = relative_key(root, path);
                let hash = content_hash(&bytes);

                let Some(scanner) = scanners.find_scanner(path) else {
                    return Ok((relative, hash, None));
                };
                let source = String::from_utf8_lossy(&bytes);
                let value = scanner.scan(path, &source)?;
                Ok((relative, hash, Some(value)))
            })
            .collect::<Result<_, ScanError>>()?;

        let mut snapshot = Snapshot {
            root: root.to_path_buf(),
            ..Default::default()
        };
        let mut manifests = 0;
        for (relative, hash, value) in scanned {
            if let Some(value) = value {
                snapshot.register(&relative, value);
                manifests += 1;
            }
            snapshot.files.insert(relative, hash);
        }

        snapshot.graph = EntityGraph::build(snapshot.php.values(), cycle_policy);

        tracing::info!(
            root = %root.display(),
            files = snapshot.files.len(),
            manifests,
            declarations = snapshot.php.len(),
            "Loaded snapshot"
        );

        Ok(snapshot)
    }

    /// Register one scanned manifest found at the root-relative `location`.
    pub fn register(&mut self, location: &str, scanned: Scanned) {
        match scanned {
            Scanned::Php(declarations) => {
                for decl in declarations {
                    let context = decl.kind.context();
                    let key = decl.key();
                    if self.php.get(&context, &key).is_some() {
                        tracing::debug!(%key, location, "Declaration registered twice");
                    }
                    self.php.insert(context, key, decl, location);
                }
            }
            Scanned::Database(schema) => {
                let module = schema.module.clone();
                self.database
                    .insert(Context::Database, module, schema, location);
            }
            Scanned::Di(config) => {
                for decl in config.virtual_types {
                    let virtual_type = VirtualType {
                        name: decl.name,
                        type_name: decl.type_name,
                        shared: decl.shared,
                        scope: config.scope.clone(),
                        module: config.module.clone(),
                    };
                    // A global declaration is authoritative over area-scoped ones.
                    if self
                        .di
                        .get(&Context::Di, &virtual_type.name)
                        .is_some_and(|existing| existing.is_global() && !virtual_type.is_global())
                    {
                        continue;
                    }
                    let name = virtual_type.name.clone();
                    self.di.insert(Context::Di, name, virtual_type, location);
                }
            }
            Scanned::Xsd(schema) => {
                self.xsd
                    .insert(Context::Xsd, manifest_key(location), schema, location);
            }
            Scanned::System(config) => {
                let module = config.module.clone();
                self.system.insert(Context::System, module, config, location);
            }
            Scanned::Less(file) => {
                self.less
                    .insert(Context::Less, manifest_key(location), file, location);
            }
        }
    }
}

/// Look a class-like declaration up by name regardless of its kind.
pub fn find_class<'a>(registry: &'a Registry<ClassLike>, name: &str) -> Option<&'a ClassLike> {
    let key = crate::model::name_key(name);
    [Context::Class, Context::Interface, Context::Trait]
        .iter()
        .find_map(|context| registry.get(context, &key))
}

fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Manifest path without its `.json` suffix, i.e. the source file it describes.
fn manifest_key(location: &str) -> String {
    location
        .strip_suffix(".json")
        .unwrap_or(location)
        .to_string()
}

fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}
