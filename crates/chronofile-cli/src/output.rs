use std::io::Write;

use chronofile_core::{Plan, PlanOutcome, RunSummary};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// One-line record of a committed rename, for live progress output.
pub fn format_rename(from: &str, to: &str, color: ColorMode) -> String {
    if color.enabled() {
        format!("{} {} -> {}", "RENAMED".green(), from, to.bold())
    } else {
        format!("RENAMED {} -> {}", from, to)
    }
}

/// One-line record of a skipped document, for live progress output.
pub fn format_skip(name: &str, reason: &str, color: ColorMode) -> String {
    if color.enabled() {
        format!("{} {} ({})", "SKIPPED".yellow(), name, reason.dimmed())
    } else {
        format!("SKIPPED {} ({})", name, reason)
    }
}

/// Print the final report after a run: every document lands in exactly one
/// of the two counts.
pub fn print_summary(w: &mut dyn Write, summary: &RunSummary, color: ColorMode) -> std::io::Result<()> {
    writeln!(w)?;
    if color.enabled() {
        writeln!(
            w,
            "{} renamed, {} skipped",
            summary.renamed.len().to_string().green().bold(),
            summary.skipped.len().to_string().yellow().bold()
        )?;
    } else {
        writeln!(
            w,
            "{} renamed, {} skipped",
            summary.renamed.len(),
            summary.skipped.len()
        )?;
    }

    for (path, reason) in &summary.skipped {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        if color.enabled() {
            writeln!(w, "  {} {} ({})", "skipped:".yellow(), name, reason.to_string().dimmed())?;
        } else {
            writeln!(w, "  skipped: {} ({})", name, reason)?;
        }
    }
    Ok(())
}

/// Print the dry-run plan: targets in commit order, then skips.
pub fn print_plan(w: &mut dyn Write, plan: &Plan, color: ColorMode) -> std::io::Result<()> {
    if plan.entries.is_empty() {
        writeln!(w, "No PDF documents found.")?;
        return Ok(());
    }

    for entry in &plan.entries {
        let name = entry
            .original
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| entry.original.display().to_string());
        match &entry.outcome {
            PlanOutcome::Rename { target } => {
                if color.enabled() {
                    writeln!(w, "{} -> {}", name, target.bold().green())?;
                } else {
                    writeln!(w, "{} -> {}", name, target)?;
                }
            }
            PlanOutcome::Skip(reason) => {
                if color.enabled() {
                    writeln!(w, "{} {}", name, format!("({reason})").yellow())?;
                } else {
                    writeln!(w, "{} ({})", name, reason)?;
                }
            }
        }
    }

    let renames = plan
        .entries
        .iter()
        .filter(|e| matches!(e.outcome, PlanOutcome::Rename { .. }))
        .count();
    writeln!(w)?;
    writeln!(
        w,
        "{} of {} documents would be renamed (collision suffixes resolved at run time)",
        renames,
        plan.entries.len()
    )?;
    Ok(())
}
