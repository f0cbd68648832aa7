mod json;
mod markdown;

pub use json::JsonOutput;
pub use markdown::MarkdownOutput;

use crate::analysis::{Analysis, Rule};
use crate::model::{ChangeKind, Context};
use std::io::Write;

/// One row of the change-code catalogue.
pub type CodeEntry = (Context, ChangeKind, Rule);

pub trait OutputFormatter {
    fn format<W: Write>(&self, analysis: &Analysis, writer: &mut W) -> std::io::Result<()>;

    fn format_codes<W: Write>(&self, codes: &[CodeEntry], writer: &mut W) -> std::io::Result<()>;
}
