use super::{CodeEntry, OutputFormatter};
use crate::analysis::Analysis;
use crate::model::Level;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Write;

pub struct JsonOutput {
    pub allowed_level: Option<Level>,
}

impl JsonOutput {
    pub fn new(allowed_level: Option<Level>) -> Self {
        Self { allowed_level }
    }
}

#[derive(Serialize)]
struct JsonResult<'a> {
    level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    within_allowed: Option<bool>,
    contexts: Vec<JsonContext<'a>>,
    changed_files: JsonChangedFiles<'a>,
}

#[derive(Serialize)]
struct JsonContext<'a> {
    context: String,
    level: String,
    operations: Vec<JsonOperation<'a>>,
}

#[derive(Serialize)]
struct JsonOperation<'a> {
    code: &'a str,
    level: String,
    target: &'a str,
    location: String,
    reason: &'a str,
}

#[derive(Serialize)]
struct JsonChangedFiles<'a> {
    added: &'a BTreeSet<String>,
    removed: &'a BTreeSet<String>,
    modified: &'a BTreeSet<String>,
}

#[derive(Serialize)]
struct JsonCode<'a> {
    code: &'a str,
    context: String,
    kind: String,
    level: String,
    reason: &'a str,
}

fn write_json<W: Write, T: Serialize>(value: &T, writer: &mut W) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    writeln!(writer, "{}", json)
}

impl OutputFormatter for JsonOutput {
    fn format<W: Write>(&self, analysis: &Analysis, writer: &mut W) -> std::io::Result<()> {
        let report = &analysis.report;
        let contexts = report
            .contexts()
            .map(|context| JsonContext {
                context: context.to_string(),
                level: report.level_for_context(context).to_string(),
                operations: report
                    .iter()
                    .filter(|(c, _, _)| *c == context)
                    .map(|(_, level, op)| JsonOperation {
                        code: &op.code,
                        level: level.to_string(),
                        target: &op.target,
                        location: op.location.display().to_string(),
                        reason: &op.reason,
                    })
                    .collect(),
            })
            .collect();

        let result = JsonResult {
            level: analysis.level.to_string(),
            allowed_level: self.allowed_level.map(|l| l.to_string()),
            within_allowed: self.allowed_level.map(|l| analysis.level.allows(l)),
            contexts,
            changed_files: JsonChangedFiles {
                added: &analysis.changed_files.added,
                removed: &analysis.changed_files.removed,
                modified: &analysis.changed_files.modified,
            },
        };

        write_json(&result, writer)
    }

    fn format_codes<W: Write>(&self, codes: &[CodeEntry], writer: &mut W) -> std::io::Result<()> {
        let entries: Vec<JsonCode<'_>> = codes
            .iter()
            .map(|(context, kind, rule)| JsonCode {
                code: &rule.code,
                context: context.to_string(),
                kind: kind.to_string(),
                level: rule.level.to_string(),
                reason: rule.reason,
            })
            .collect();

        write_json(&entries, writer)
    }
}
