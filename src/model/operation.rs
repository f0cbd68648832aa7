use super::{ChangeKind, Context, Level};
use std::path::{Path, PathBuf};

/// One detected, classified difference.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub kind: ChangeKind,
    /// Stable identifier, used for deduplication and documentation lookup.
    pub code: String,
    pub level: Level,
    pub context: Context,
    /// Fully-qualified name or structural path of the affected declaration.
    pub target: String,
    pub location: PathBuf,
    pub reason: String,
}

impl Operation {
    /// Identity of the underlying change independent of its severity.
    pub fn dedup_key(&self) -> (&Path, &str, &str) {
        (&self.location, &self.target, &self.code)
    }
}
