use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

pub mod backend;
pub mod config;
pub mod config_file;
pub mod pipeline;
pub mod renamer;
pub mod resolver;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend};
pub use config::{NamingStyle, ResolverConfig, RunConfig};
pub use pipeline::{Plan, PlanEntry, PlanOutcome, ProgressEvent, RunSummary, plan, run};
pub use renamer::{RenameTask, base_name, parse_base_name};
pub use resolver::DateResolver;

/// Which layer of the resolver produced a match.
///
/// Carried on [`ResolvedPeriod`] so callers (and tests) can tell the
/// authoritative labeled-range path apart from the fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePattern {
    /// A labeled `<label>: <date> to <date>` marker.
    ExplicitRange,
    /// Unlabeled scan of the whole text for date-shaped substrings.
    LooseScan,
    /// A fixed 1-indexed line position holding a single date.
    FixedLine,
}

/// A date-shaped substring found in document text, before disambiguation.
#[derive(Debug, Clone)]
pub struct DateCandidate {
    pub raw: String,
    pub date: NaiveDate,
    pub source: SourcePattern,
}

/// The (start, end) period attributed to one document.
///
/// The loose-scan path guarantees `start <= end` by construction (min/max
/// over candidates). The explicit-range path passes the labeled pair through
/// as written, so a document whose label lists the dates backwards keeps
/// them backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub source: SourcePattern,
}

impl ResolvedPeriod {
    /// A period collapsing to a single day.
    pub fn single(date: NaiveDate, source: SourcePattern) -> Self {
        Self {
            start: date,
            end: date,
            source,
        }
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no date pattern matched")]
    NoDateFound,
}

#[derive(Error, Debug)]
pub enum RenameError {
    #[error("source file missing: {}", .0.display())]
    SourceMissing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why one document was skipped. Every variant is per-document and
/// non-fatal: the batch always attempts every document.
#[derive(Error, Debug)]
pub enum SkipReason {
    #[error("text extraction failed: {0}")]
    ExtractionFailure(#[from] BackendError),
    #[error("no date found")]
    NoDateFound,
    #[error("source file missing")]
    SourceMissing,
}

/// Fatal setup errors. Anything per-document becomes a [`SkipReason`]
/// instead and never aborts the run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("root directory not found: {}", .0.display())]
    RootMissing(PathBuf),
    #[error("invalid date pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
