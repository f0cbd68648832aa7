use crate::model::Level;
use crate::report::Report;
use crate::snapshot::ChangedFiles;

/// Highest level across all reports. A release that touched files without
/// any classified difference is still a PATCH.
pub fn suggest_level(reports: &[&Report], changed: &ChangedFiles) -> Level {
    let level = reports
        .iter()
        .map(|report| report.level())
        .max()
        .unwrap_or(Level::None);

    if level == Level::None && !changed.is_empty() {
        Level::Patch
    } else {
        level
    }
}
