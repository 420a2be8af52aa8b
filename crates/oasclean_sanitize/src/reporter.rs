use std::io::{self, Write};

use colored::Colorize;
use log::debug;
use oasclean_refs::print_document;

use crate::types::SanitizeResult;

/// Per document: the reference report, then where the sanitized copy went.
pub fn print_sanitize_report<W: Write>(writer: &mut W, result: &SanitizeResult) -> io::Result<()> {
    debug!("Printing sanitize report for {} documents", result.reports.len());

    for report in &result.reports {
        print_document(writer, &report.document, true)?;
        if let Some(output) = &report.output {
            writeln!(
                writer,
                "    {} {} ({} tagged, {} deleted)",
                "→".bright_blue(),
                output.blue(),
                report.stats.tagged,
                report.stats.deleted
            )?;
        }
        if !report.document.is_clean() {
            writeln!(writer)?;
        }
    }

    writeln!(writer, "{}", "─".repeat(60).dimmed())?;
    writeln!(writer, "{}", "Summary".bold())?;
    writeln!(writer, "  Documents sanitized: {}/{}", result.written(), result.documents_analyzed)?;
    writeln!(writer, "  Failed: {}", result.failures().to_string().red().bold())?;
    writeln!(writer, "  Components tagged: {}", result.tagged_total().to_string().yellow())?;
    writeln!(writer, "  Components deleted: {}", result.deleted_total().to_string().yellow())?;
    writer.flush()?;
    Ok(())
}
