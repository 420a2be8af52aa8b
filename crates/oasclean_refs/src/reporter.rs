use std::io::{self, Write};

use colored::Colorize;
use log::{debug, trace};

use crate::types::{CheckResult, DocumentReport};

fn at_line(line: Option<usize>) -> String {
    line.map(|l| format!(" (line {})", l)).unwrap_or_default()
}

pub fn print_clean_message<W: Write>(writer: &mut W, documents: usize) -> io::Result<()> {
    debug!("No reference problems detected");
    writeln!(
        writer,
        "{} No undefined or unused components. Documents checked: {}",
        "✓".green().bold(),
        documents
    )?;
    writer.flush()?;
    Ok(())
}

/// One block per document: a status line, then its undefined and unused components as a tree.
pub fn print_report_tree<W: Write>(
    writer: &mut W,
    result: &CheckResult,
    lax: bool,
) -> io::Result<()> {
    debug!("Printing report tree for {} documents", result.reports.len());

    for report in &result.reports {
        print_document(writer, report, lax)?;
        if !report.is_clean() {
            writeln!(writer)?;
        }
    }

    print_summary(writer, result, lax)?;
    writer.flush()?;
    Ok(())
}

pub fn print_document<W: Write>(
    writer: &mut W,
    report: &DocumentReport,
    lax: bool,
) -> io::Result<()> {
    trace!("Printing report for {}", report.source);
    let dialect = report.dialect.map(|d| format!(" ({})", d)).unwrap_or_default();

    if report.is_clean() {
        writeln!(writer, "{} {}{}", "✓".green().bold(), report.source.blue(), dialect)?;
        return Ok(());
    }

    let marker = if report.is_failure() || !lax { "✗".red().bold() } else { "⚠".yellow().bold() };
    writeln!(writer, "{} {}{}", marker, report.source.blue(), dialect)?;
    if let Some(error) = &report.error
        && report.undefined.is_empty()
    {
        writeln!(writer, "    {}", error.red())?;
    }

    let total = report.undefined.len() + report.unused.len();
    let mut idx = 0;
    for undefined in &report.undefined {
        idx += 1;
        let is_last = idx == total;
        let prefix = if is_last { "└──" } else { "├──" };
        writeln!(writer, "{}  {} {}", prefix.dimmed(), "undefined".red(), undefined.path)?;

        let indent = if is_last { "    " } else { "│   " };
        for (ridx, referrer) in undefined.referrers.iter().enumerate() {
            let branch = if ridx == undefined.referrers.len() - 1 { "└──" } else { "├──" };
            writeln!(
                writer,
                "{}{}  referenced from {}{}",
                indent.dimmed(),
                branch.dimmed(),
                referrer.path,
                at_line(referrer.line).dimmed()
            )?;
        }
    }
    for unused in &report.unused {
        idx += 1;
        let prefix = if idx == total { "└──" } else { "├──" };
        writeln!(
            writer,
            "{}  {} {}{}",
            prefix.dimmed(),
            "unused".yellow(),
            unused.path,
            at_line(unused.line).dimmed()
        )?;
    }
    Ok(())
}

fn print_summary<W: Write>(writer: &mut W, result: &CheckResult, lax: bool) -> io::Result<()> {
    writeln!(writer, "{}", "─".repeat(60).dimmed())?;
    writeln!(writer, "{}", "Summary".bold())?;
    writeln!(writer, "  Documents checked: {}", result.documents_analyzed)?;
    writeln!(writer, "  Failed: {}", result.failures().to_string().red().bold())?;
    writeln!(writer, "  Undefined components: {}", result.undefined_total().to_string().red())?;
    let unused = result.unused_total().to_string();
    let unused = if lax { unused.yellow() } else { unused.red() };
    writeln!(writer, "  Unused components: {}", unused)?;
    Ok(())
}

pub fn print_json<W: Write, T: serde::Serialize>(writer: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value).map_err(io::Error::other)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
