//! Batch orchestration: backup, text extraction, date resolution, and
//! collision-safe renaming over one directory of documents.
//!
//! Every failure past setup is per-document: the run always attempts every
//! document and reports successes and skips in the final summary. Nothing
//! is retried; a skipped document is simply absent from this run's renames
//! and can be retried on a later run (aided by the backup).

use std::path::{Path, PathBuf};

use crate::config::RunConfig;
use crate::renamer::{self, RenameTask};
use crate::resolver::DateResolver;
use crate::{PdfBackend, PipelineError, SkipReason};

/// Progress events emitted while a run executes, for CLI rendering.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    BackupComplete { files: usize },
    Extracting { index: usize, total: usize, name: String },
    Renamed { from: String, to: String },
    Skipped { name: String, reason: String },
}

/// What one run did: every document ends up in exactly one of the two lists.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub renamed: Vec<(PathBuf, PathBuf)>,
    pub skipped: Vec<(PathBuf, SkipReason)>,
}

/// Dry-run product: the renames a real run would attempt, in commit order,
/// without suffix probing (suffixes depend on live disk state at commit
/// time, so a plan only shows the unsuffixed target).
#[derive(Debug, Default)]
pub struct Plan {
    pub entries: Vec<PlanEntry>,
}

#[derive(Debug)]
pub struct PlanEntry {
    pub original: PathBuf,
    pub outcome: PlanOutcome,
}

#[derive(Debug)]
pub enum PlanOutcome {
    Rename { target: String },
    Skip(SkipReason),
}

/// Execute a full run: backup, extract text artifacts, resolve, rename.
///
/// Renames are committed strictly sequentially in ascending start-date
/// order (original file name as tie-break), which keeps collision-suffix
/// assignment deterministic when several documents share a base name.
pub fn run(
    config: &RunConfig,
    backend: &dyn PdfBackend,
    mut progress: impl FnMut(ProgressEvent),
) -> Result<RunSummary, PipelineError> {
    if !config.root.is_dir() {
        return Err(PipelineError::RootMissing(config.root.clone()));
    }
    let resolver = DateResolver::new(config.resolver.clone())?;

    if config.backup {
        let files = back_up(config)?;
        progress(ProgressEvent::BackupComplete { files });
    }

    let output_text_dir = config.output_text_dir();
    std::fs::create_dir_all(&output_text_dir)?;

    let documents = list_documents(config)?;
    let total = documents.len();

    let mut summary = RunSummary::default();
    let mut tasks = Vec::new();

    for (index, path) in documents.into_iter().enumerate() {
        let name = display_name(&path);
        progress(ProgressEvent::Extracting {
            index,
            total,
            name: name.clone(),
        });

        let text = match backend.extract_text(&path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(file = %name, error = %e, "extraction failed, skipping");
                progress(ProgressEvent::Skipped {
                    name,
                    reason: e.to_string(),
                });
                summary.skipped.push((path, SkipReason::ExtractionFailure(e)));
                continue;
            }
        };

        // Persist the text artifact, regenerated every run.
        std::fs::write(output_text_dir.join(format!("{name}.txt")), &text)?;

        match resolver.resolve(&text) {
            Ok(period) => tasks.push(RenameTask::new(path, &period, config.naming)),
            Err(_) => {
                tracing::warn!(file = %name, "no date found, skipping");
                progress(ProgressEvent::Skipped {
                    name,
                    reason: "no date found".to_string(),
                });
                summary.skipped.push((path, SkipReason::NoDateFound));
            }
        }
    }

    renamer::sort_tasks(&mut tasks);

    for task in tasks {
        match task.commit(&config.root) {
            Ok(target) => {
                progress(ProgressEvent::Renamed {
                    from: display_name(&task.original),
                    to: display_name(&target),
                });
                summary.renamed.push((task.original, target));
            }
            Err(crate::RenameError::SourceMissing(path)) => {
                tracing::warn!(file = %path.display(), "source vanished before rename, skipping");
                progress(ProgressEvent::Skipped {
                    name: display_name(&path),
                    reason: "source file missing".to_string(),
                });
                summary.skipped.push((path, SkipReason::SourceMissing));
            }
            // An IO failure mid-rename is unrecoverable: stop here, leaving
            // already-renamed files intact.
            Err(crate::RenameError::Io(e)) => return Err(PipelineError::Io(e)),
        }
    }

    tracing::info!(
        renamed = summary.renamed.len(),
        skipped = summary.skipped.len(),
        "run complete"
    );
    Ok(summary)
}

/// Compute the renames a run would attempt without touching the directory:
/// no backup, no text artifacts, no renames.
pub fn plan(config: &RunConfig, backend: &dyn PdfBackend) -> Result<Plan, PipelineError> {
    if !config.root.is_dir() {
        return Err(PipelineError::RootMissing(config.root.clone()));
    }
    let resolver = DateResolver::new(config.resolver.clone())?;

    let mut tasks = Vec::new();
    let mut skips = Vec::new();

    for path in list_documents(config)? {
        let outcome = backend
            .extract_text(&path)
            .map_err(SkipReason::ExtractionFailure)
            .and_then(|text| {
                resolver
                    .resolve(&text)
                    .map_err(|_| SkipReason::NoDateFound)
            });
        match outcome {
            Ok(period) => tasks.push(RenameTask::new(path, &period, config.naming)),
            Err(reason) => skips.push(PlanEntry {
                original: path,
                outcome: PlanOutcome::Skip(reason),
            }),
        }
    }

    renamer::sort_tasks(&mut tasks);

    let mut entries: Vec<PlanEntry> = tasks
        .into_iter()
        .map(|task| {
            let target = match &task.extension {
                Some(ext) => format!("{}.{}", task.base, ext),
                None => task.base.clone(),
            };
            PlanEntry {
                original: task.original,
                outcome: PlanOutcome::Rename { target },
            }
        })
        .collect();
    entries.extend(skips);
    Ok(Plan { entries })
}

/// Copy every plain file directly in the root into the backup directory,
/// byte-for-byte. The working subdirectories are excluded; other
/// directories are skipped with a notice, never an error. Overwrites stale
/// copies from earlier runs, so a repeat run with unchanged inputs leaves
/// identical backup contents.
fn back_up(config: &RunConfig) -> Result<usize, PipelineError> {
    let backup_dir = config.backup_dir();
    std::fs::create_dir_all(&backup_dir)?;

    let mut copied = 0;
    for entry in sorted_entries(&config.root)? {
        let name = entry.file_name();
        if name == config.backup_dir_name.as_str()
            || name == config.output_text_dir_name.as_str()
        {
            continue;
        }
        if entry.file_type()?.is_file() {
            std::fs::copy(entry.path(), backup_dir.join(&name))?;
            copied += 1;
        } else {
            tracing::info!(name = %name.to_string_lossy(), "skipping directory during backup");
        }
    }
    tracing::debug!(files = copied, dir = %backup_dir.display(), "backup complete");
    Ok(copied)
}

/// PDF files directly in the root, sorted by name for a deterministic
/// processing order. Extension match is case-insensitive; everything else
/// in the directory is ignored.
fn list_documents(config: &RunConfig) -> Result<Vec<PathBuf>, PipelineError> {
    let mut documents = Vec::new();
    for entry in sorted_entries(&config.root)? {
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let is_pdf = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf {
            documents.push(path);
        }
    }
    Ok(documents)
}

fn sorted_entries(dir: &Path) -> std::io::Result<Vec<std::fs::DirEntry>> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
