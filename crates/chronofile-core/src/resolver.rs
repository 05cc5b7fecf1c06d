use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ResolverConfig;
use crate::{DateCandidate, ResolveError, ResolvedPeriod, SourcePattern};

/// Sub-pattern matching one numeric date: `MM/DD/YY` or `MM/DD/YYYY`.
const DATE_SHAPE: &str = r"(\d{1,2}/\d{1,2}/\d{2,4})";

/// Unlabeled date-shaped substrings anywhere in free text.
static LOOSE_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,2}/\d{1,2}/\d{2,4}\b").unwrap());

/// Maps raw extracted text to a [`ResolvedPeriod`], or reports failure.
///
/// Three layered strategies, first success wins:
/// 1. Explicit labeled range (`<label>: <date> to <date>`), authoritative.
/// 2. Loose scan of the whole text for date-shaped substrings, taking the
///    chronological min/max of the survivors.
/// 3. Fixed line positions parsed against a single-date format, for
///    documents with a known layout instead of free text.
pub struct DateResolver {
    config: ResolverConfig,
    /// Compiled `<label>:\s*<date>\s+(to|thru)\s+<date>` pattern.
    explicit_range_re: Regex,
}

/// Strategies in evaluation order. The explicit-range layer short-circuits
/// the fallbacks when it matches.
const STRATEGIES: [fn(&DateResolver, &str) -> Option<ResolvedPeriod>; 3] = [
    DateResolver::try_explicit_range,
    DateResolver::try_loose_scan,
    DateResolver::try_fixed_lines,
];

impl DateResolver {
    /// Compile the labeled-range pattern for `config`. Fails fast with
    /// `regex::Error` if the label produces an invalid pattern.
    pub fn new(config: ResolverConfig) -> Result<Self, regex::Error> {
        let pattern = format!(
            r"{label}:\s*{DATE_SHAPE}\s+(?:to|thru)\s+{DATE_SHAPE}",
            label = regex::escape(&config.date_label),
        );
        let explicit_range_re = Regex::new(&pattern)?;
        Ok(Self {
            config,
            explicit_range_re,
        })
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve the period for one document's text.
    pub fn resolve(&self, text: &str) -> Result<ResolvedPeriod, ResolveError> {
        for strategy in STRATEGIES {
            if let Some(period) = strategy(self, text) {
                tracing::debug!(
                    source = ?period.source,
                    start = %period.start,
                    end = %period.end,
                    "resolved period"
                );
                return Ok(period);
            }
        }
        Err(ResolveError::NoDateFound)
    }

    /// Layer 1: labeled `<label>: <date> to <date>` marker.
    ///
    /// The labeled pair is taken as written. `start <= end` is NOT enforced
    /// here: a document whose label lists the dates backwards surfaces
    /// backwards, unlike the loose-scan layer which orders by construction.
    fn try_explicit_range(&self, text: &str) -> Option<ResolvedPeriod> {
        let caps = self.explicit_range_re.captures(text)?;
        let start = self.parse_date(caps.get(1).unwrap().as_str())?;
        let end = self.parse_date(caps.get(2).unwrap().as_str())?;
        Some(ResolvedPeriod {
            start,
            end,
            source: SourcePattern::ExplicitRange,
        })
    }

    /// Layer 2: scan the whole text for date-shaped substrings.
    ///
    /// Candidates that fail to parse, or whose year falls outside
    /// `[year_min, year_max]`, are discarded silently. Survivors are reduced
    /// to their chronological min/max, so `start <= end` always holds on
    /// this path. A single survivor yields `start == end`.
    fn try_loose_scan(&self, text: &str) -> Option<ResolvedPeriod> {
        let candidates: Vec<DateCandidate> = LOOSE_DATE_RE
            .find_iter(text)
            .filter_map(|m| {
                let date = self.parse_date(m.as_str())?;
                if date.year() < self.config.year_min || date.year() > self.config.year_max {
                    tracing::debug!(raw = m.as_str(), year = date.year(), "year out of range");
                    return None;
                }
                Some(DateCandidate {
                    raw: m.as_str().to_string(),
                    date,
                    source: SourcePattern::LooseScan,
                })
            })
            .collect();

        // Min/max by calendar value, not by position in the text.
        let start = candidates.iter().map(|c| c.date).min()?;
        let end = candidates.iter().map(|c| c.date).max()?;
        Some(ResolvedPeriod {
            start,
            end,
            source: SourcePattern::LooseScan,
        })
    }

    /// Layer 3: fixed 1-indexed line positions, for documents with a known
    /// layout. The first configured line that parses against the fixed
    /// single-date format wins, as a single-day period.
    fn try_fixed_lines(&self, text: &str) -> Option<ResolvedPeriod> {
        let lines: Vec<&str> = text.lines().collect();
        for &position in &self.config.fixed_line_positions {
            let Some(line) = position.checked_sub(1).and_then(|i| lines.get(i)) else {
                continue;
            };
            if let Ok(date) =
                NaiveDate::parse_from_str(line.trim(), &self.config.fixed_line_format)
            {
                return Some(ResolvedPeriod::single(date, SourcePattern::FixedLine));
            }
        }
        None
    }

    /// Parse one matched substring, trying the primary then fallback format.
    ///
    /// `%Y` happily consumes a two-digit year as year 24 AD; those are
    /// pushed on to the two-digit format so chrono's `%y` windowing applies
    /// instead of custom century guessing.
    fn parse_date(&self, raw: &str) -> Option<NaiveDate> {
        for format in [
            &self.config.date_format_primary,
            &self.config.date_format_fallback,
        ] {
            if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
                if format.contains("%Y") && date.year() < 100 {
                    continue;
                }
                return Some(date);
            }
        }
        None
    }
}
