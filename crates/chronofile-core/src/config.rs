use std::path::PathBuf;

use chrono::{Datelike, Local};

/// How the canonical base name is built from a resolved period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NamingStyle {
    /// `YYYY-MM-DD` when the period is a single day, else
    /// `YYYY-MM-DDtoYYYY-MM-DD`.
    #[default]
    Auto,
    /// Always `YYYY-MM-DDtoYYYY-MM-DD`, even when start == end.
    AlwaysRange,
}

/// Configuration for the layered date resolver.
///
/// Date formats are chrono `strftime` strings. Two-digit years go through
/// chrono's `%y` windowing; there is no custom century guessing here.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Label preceding an explicit date range, e.g. `Statement Period`.
    pub date_label: String,
    /// Format tried first for every matched substring (default `%m/%d/%Y`).
    pub date_format_primary: String,
    /// Format tried when the primary fails (default `%m/%d/%y`).
    pub date_format_fallback: String,
    /// 1-indexed line positions probed by the fixed-layout fallback.
    pub fixed_line_positions: [usize; 2],
    /// Single-date format for the fixed-layout fallback (default `%d-%b-%Y`).
    pub fixed_line_format: String,
    /// Loose-scan candidates with a year below this are discarded.
    pub year_min: i32,
    /// Loose-scan candidates with a year above this are discarded.
    /// Defaults to the current year: no future dates.
    pub year_max: i32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            date_label: "Statement Period".to_string(),
            date_format_primary: "%m/%d/%Y".to_string(),
            date_format_fallback: "%m/%d/%y".to_string(),
            fixed_line_positions: [29, 35],
            fixed_line_format: "%d-%b-%Y".to_string(),
            year_min: 2000,
            year_max: Local::now().year(),
        }
    }
}

/// Everything one run needs, passed explicitly. There is no implicit
/// current-directory anywhere in the pipeline.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory holding the source PDFs. Renames happen in place here.
    pub root: PathBuf,
    /// Subdirectory (under `root`) receiving byte-for-byte backups.
    pub backup_dir_name: String,
    /// Subdirectory (under `root`) receiving one `<name>.txt` per PDF.
    pub output_text_dir_name: String,
    /// Skip the backup step entirely when false.
    pub backup: bool,
    pub resolver: ResolverConfig,
    pub naming: NamingStyle,
}

impl RunConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            backup_dir_name: "backup".to_string(),
            output_text_dir_name: "output_text".to_string(),
            backup: true,
            resolver: ResolverConfig::default(),
            naming: NamingStyle::default(),
        }
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.root.join(&self.backup_dir_name)
    }

    pub fn output_text_dir(&self) -> PathBuf {
        self.root.join(&self.output_text_dir_name)
    }
}
