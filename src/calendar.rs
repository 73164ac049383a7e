use std::collections::HashSet;

use anyhow::{Result, bail};
use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Tuesday/Thursday lectures for the fall term.
const DEFAULT_CLASS_DATES: [&str; 15] = [
    "2025-10-23",
    "2025-10-28",
    "2025-10-30",
    "2025-11-04",
    "2025-11-06",
    "2025-11-11",
    "2025-11-13",
    "2025-11-18",
    "2025-11-20",
    "2025-11-25",
    "2025-12-02",
    "2025-12-04",
    "2025-12-09",
    "2025-12-11",
    "2025-12-16",
];

/// Ordered list of class meetings. Lives outside the database and is only
/// consulted when building the overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCalendar {
    dates: Vec<NaiveDate>,
}

impl ClassCalendar {
    /// Parse a comma-separated list of `YYYY-MM-DD` dates, keeping the given order.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut dates = Vec::new();
        let mut seen = HashSet::new();

        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let date = parse_date(part)
                .ok_or_else(|| anyhow::anyhow!("{part:?} is not a YYYY-MM-DD date"))?;
            if !seen.insert(date) {
                bail!("class date {part} is listed twice");
            }
            dates.push(date);
        }

        if dates.is_empty() {
            bail!("class calendar has no dates");
        }

        Ok(Self { dates })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn date_strings(&self) -> Vec<String> {
        self.dates
            .iter()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .collect()
    }
}

impl Default for ClassCalendar {
    fn default() -> Self {
        let dates = DEFAULT_CLASS_DATES
            .iter()
            .filter_map(|d| parse_date(d))
            .collect();
        Self { dates }
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}
