use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::config::NamingStyle;
use crate::{RenameError, ResolvedPeriod};

/// Date format used in canonical file names. Sorts lexicographically in
/// chronological order.
const NAME_DATE_FORMAT: &str = "%Y-%m-%d";

/// One pending rename: an original file plus the canonical base name its
/// resolved period maps to. Ephemeral; built, sorted, committed, dropped.
#[derive(Debug, Clone)]
pub struct RenameTask {
    pub original: PathBuf,
    pub base: String,
    pub extension: Option<String>,
    /// Sort key for deterministic batch ordering.
    pub start: NaiveDate,
}

impl RenameTask {
    pub fn new(original: PathBuf, period: &ResolvedPeriod, naming: NamingStyle) -> Self {
        let extension = original
            .extension()
            .map(|e| e.to_string_lossy().to_string());
        Self {
            base: base_name(period, naming),
            extension,
            start: period.start,
            original,
        }
    }

    /// Commit this rename into `dir`, probing the live filesystem for a
    /// collision-free target. Never overwrites an existing file: on
    /// collision the base name gets `_1`, `_2`, ... until a free slot is
    /// found. The probe is against disk state at rename time, not any
    /// in-memory set, so it stays correct under interleaved manual changes.
    pub fn commit(&self, dir: &Path) -> Result<PathBuf, RenameError> {
        if !self.original.exists() {
            return Err(RenameError::SourceMissing(self.original.clone()));
        }

        let mut target = dir.join(self.file_name(None));
        let mut counter: u64 = 1;
        while target.exists() {
            target = dir.join(self.file_name(Some(counter)));
            counter += 1;
        }

        std::fs::rename(&self.original, &target)?;
        tracing::info!(from = %self.original.display(), to = %target.display(), "renamed");
        Ok(target)
    }

    fn file_name(&self, suffix: Option<u64>) -> String {
        let mut name = self.base.clone();
        if let Some(n) = suffix {
            name.push_str(&format!("_{n}"));
        }
        if let Some(ext) = &self.extension {
            name.push('.');
            name.push_str(ext);
        }
        name
    }
}

/// Canonical base name for a resolved period: `YYYY-MM-DD` for a single
/// day, `YYYY-MM-DDtoYYYY-MM-DD` for a range.
pub fn base_name(period: &ResolvedPeriod, naming: NamingStyle) -> String {
    let single = match naming {
        NamingStyle::Auto => period.is_single_day(),
        NamingStyle::AlwaysRange => false,
    };
    if single {
        period.start.format(NAME_DATE_FORMAT).to_string()
    } else {
        format!(
            "{}to{}",
            period.start.format(NAME_DATE_FORMAT),
            period.end.format(NAME_DATE_FORMAT)
        )
    }
}

/// Recover the (start, end) pair from a canonical base name. Returns `None`
/// for names this crate did not produce (including suffixed duplicates).
pub fn parse_base_name(base: &str) -> Option<(NaiveDate, NaiveDate)> {
    if base.len() == 10 {
        let date = NaiveDate::parse_from_str(base, NAME_DATE_FORMAT).ok()?;
        return Some((date, date));
    }
    let (start_str, rest) = base.split_at_checked(10)?;
    let end_str = rest.strip_prefix("to")?;
    let start = NaiveDate::parse_from_str(start_str, NAME_DATE_FORMAT).ok()?;
    let end = NaiveDate::parse_from_str(end_str, NAME_DATE_FORMAT).ok()?;
    Some((start, end))
}

/// Order tasks for committing: ascending by start date, then by original
/// file name. Ascending order makes collision suffixes deterministic when
/// several documents resolve to the same base name; the secondary key
/// breaks true ties (identical periods) stably.
pub fn sort_tasks(tasks: &mut [RenameTask]) {
    tasks.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| a.original.file_name().cmp(&b.original.file_name()))
    });
}
