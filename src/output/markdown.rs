use super::{CodeEntry, OutputFormatter};
use crate::analysis::Analysis;
use crate::model::{Level, Operation};
use std::io::Write;

pub struct MarkdownOutput {
    pub allowed_level: Option<Level>,
}

impl MarkdownOutput {
    pub fn new(allowed_level: Option<Level>) -> Self {
        Self { allowed_level }
    }

    fn write_operation<W: Write>(&self, op: &Operation, writer: &mut W) -> std::io::Result<()> {
        writeln!(
            writer,
            "- **{}** `{}` `{}`: {} (*{}*)",
            op.level,
            op.code,
            op.target,
            op.reason,
            op.location.display()
        )
    }
}

impl OutputFormatter for MarkdownOutput {
    fn format<W: Write>(&self, analysis: &Analysis, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "# Semantic Version Check\n")?;
        writeln!(writer, "**Suggested bump:** {}\n", analysis.level)?;

        if let Some(allowed) = self.allowed_level {
            if analysis.level.allows(allowed) {
                writeln!(writer, "Within the allowed level ({}).\n", allowed)?;
            } else {
                writeln!(writer, "**Exceeds the allowed level ({}).**\n", allowed)?;
            }
        }

        let report = &analysis.report;
        if report.is_empty() {
            writeln!(writer, "## No Differences Found\n")?;
            writeln!(writer, "No structural differences detected.")?;
        }

        for context in report.contexts() {
            writeln!(
                writer,
                "## {} ({})\n",
                context,
                report.level_for_context(context)
            )?;
            for level in Level::ALL.iter().rev() {
                for op in report.operations(context, *level) {
                    self.write_operation(op, writer)?;
                }
            }
            writeln!(writer)?;
        }

        let files = &analysis.changed_files;
        if !files.is_empty() {
            writeln!(writer, "## Changed Files\n")?;
            writeln!(
                writer,
                "{} added, {} removed, {} modified\n",
                files.added.len(),
                files.removed.len(),
                files.modified.len()
            )?;
            for (label, paths) in [
                ("added", &files.added),
                ("removed", &files.removed),
                ("modified", &files.modified),
            ] {
                for path in paths {
                    writeln!(writer, "- {} `{}`", label, path)?;
                }
            }
        }

        Ok(())
    }

    fn format_codes<W: Write>(&self, codes: &[CodeEntry], writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "# Change Codes\n")?;

        let mut current = None;
        for (context, kind, rule) in codes {
            if current != Some(context) {
                writeln!(writer, "\n## {}\n", context)?;
                current = Some(context);
            }
            writeln!(
                writer,
                "- `{}` **{}** {}: {}",
                rule.code, rule.level, kind, rule.reason
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{SeverityTable, all_rules};
    use crate::model::{ChangeKind, Context, DbChange};
    use crate::report::Report;
    use crate::snapshot::ChangedFiles;

    fn analysis() -> Analysis {
        let op = SeverityTable::new().operation(
            Context::Database,
            ChangeKind::Database(DbChange::ColumnRemove),
            "sales_order/discount_amount",
            "Magento_Sales/etc/db_schema.json",
        );
        let report: Report = [op].into_iter().collect();
        let mut changed_files = ChangedFiles::default();
        changed_files
            .modified
            .insert("Magento_Sales/etc/db_schema.json".to_string());

        Analysis {
            level: report.level(),
            changes: report.clone(),
            membership: Report::new(),
            report,
            changed_files,
        }
    }

    fn render(output: &MarkdownOutput, analysis: &Analysis) -> String {
        let mut buffer = Vec::new();
        output.format(analysis, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_report_sections() {
        let text = render(&MarkdownOutput::new(Some(Level::Minor)), &analysis());

        assert!(text.contains("**Suggested bump:** MAJOR"));
        assert!(text.contains("Exceeds the allowed level (MINOR)"));
        assert!(text.contains("## database (MAJOR)"));
        assert!(text.contains("`DB107` `sales_order/discount_amount`: Column was removed"));
        assert!(text.contains("- modified `Magento_Sales/etc/db_schema.json`"));
    }

    #[test]
    fn test_empty_report() {
        let text = render(&MarkdownOutput::new(None), &Analysis::default());
        assert!(text.contains("**Suggested bump:** NONE"));
        assert!(text.contains("No structural differences detected."));
        assert!(!text.contains("allowed level"));
    }

    #[test]
    fn test_codes_grouped_by_context() {
        let mut buffer = Vec::new();
        MarkdownOutput::new(None)
            .format_codes(&all_rules(), &mut buffer)
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("## class"));
        assert!(text.contains("## database"));
        assert!(text.contains("`DB107` **MAJOR** ColumnRemove: Column was removed"));
    }
}
