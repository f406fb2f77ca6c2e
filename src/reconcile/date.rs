//! Launch-date normalization.
//!
//! Vendor sites print launch dates in a handful of informal shapes
//! (`Q2'17`, `04/16`, `7/7/2019`, `September 2018`, `3Q 2016`, ...).
//! Every shape is one row of an ordered pattern table; the first row whose
//! regex matches the whole (trimmed) input and whose extracted values are in
//! range wins. Nothing matching is a hard error.

use chrono::Month;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt;

use crate::error::ReconcileError;

/// Canonical launch quarter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LaunchQuarter {
    pub year: i32,
    pub quarter: u8,
}

impl LaunchQuarter {
    /// Returns `None` unless `quarter` is in 1..=4
    pub fn new(year: i32, quarter: u32) -> Option<Self> {
        if (1..=4).contains(&quarter) {
            Some(Self {
                year,
                quarter: quarter as u8,
            })
        } else {
            None
        }
    }

    fn from_month(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Self::new(year, quarter_of_month(month))
        } else {
            None
        }
    }
}

impl fmt::Display for LaunchQuarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-Q{}", self.year, self.quarter)
    }
}

/// Quarter of a 1-based month as the downstream sheet has always computed it:
/// `1 + month / 4` with integer division.
pub fn quarter_of_month(month: u32) -> u32 {
    1 + month / 4
}

type Extractor = fn(&Captures) -> Option<LaunchQuarter>;

struct DatePattern {
    name: &'static str,
    regex: Regex,
    extract: Extractor,
}

impl DatePattern {
    fn new(name: &'static str, pattern: &str, extract: Extractor) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("launch date pattern must compile"),
            extract,
        }
    }

    fn apply(&self, input: &str) -> Option<LaunchQuarter> {
        self.regex
            .captures(input)
            .and_then(|captures| (self.extract)(&captures))
    }
}

fn number(captures: &Captures, group: usize) -> Option<u32> {
    captures.get(group)?.as_str().parse().ok()
}

fn short_year(captures: &Captures, group: usize) -> Option<i32> {
    number(captures, group).map(|yy| 2000 + yy as i32)
}

fn long_year(captures: &Captures, group: usize) -> Option<i32> {
    number(captures, group).map(|yyyy| yyyy as i32)
}

fn month_from_name(name: &str) -> Option<u32> {
    let abbreviation: String = name.chars().take(3).collect();
    abbreviation
        .parse::<Month>()
        .ok()
        .map(|month| month.number_from_month())
}

static PATTERNS: Lazy<Vec<DatePattern>> = Lazy::new(|| {
    vec![
        DatePattern::new("quarter_short_year", r"^Q(\d)'?(\d{2})$", |c| {
            LaunchQuarter::new(short_year(c, 2)?, number(c, 1)?)
        }),
        DatePattern::new("month_short_year", r"^(\d{1,2})['/](\d{2})$", |c| {
            LaunchQuarter::from_month(short_year(c, 2)?, number(c, 1)?)
        }),
        DatePattern::new(
            "month_day_long_year",
            r"^(\d{1,2})/(\d{1,2})/(\d{4})$",
            |c| LaunchQuarter::from_month(long_year(c, 3)?, number(c, 1)?),
        ),
        DatePattern::new("month_long_year", r"^(\d{1,2})/(\d{4})$", |c| {
            LaunchQuarter::from_month(long_year(c, 2)?, number(c, 1)?)
        }),
        DatePattern::new(
            "month_day_short_year",
            r"^(\d{1,2})/(\d{1,2})/(\d{2})$",
            |c| LaunchQuarter::from_month(short_year(c, 3)?, number(c, 1)?),
        ),
        DatePattern::new("month_name_long_year", r"^([A-Za-z]+)\s+(\d{4})$", |c| {
            LaunchQuarter::from_month(long_year(c, 2)?, month_from_name(&c[1])?)
        }),
        DatePattern::new("quarter_long_year", r"^Q(\d)\s+(\d{4})$", |c| {
            LaunchQuarter::new(long_year(c, 2)?, number(c, 1)?)
        }),
        DatePattern::new("digit_q_short_year", r"^(\d)Q'?(\d{2})$", |c| {
            LaunchQuarter::new(short_year(c, 2)?, number(c, 1)?)
        }),
        DatePattern::new("digit_q_long_year", r"^(\d)Q\s+(\d{4})$", |c| {
            LaunchQuarter::new(long_year(c, 2)?, number(c, 1)?)
        }),
    ]
});

/// Drop everything from the first comma on (weekday or footnote text), then trim
fn significant_part(raw: &str) -> &str {
    raw.split(',').next().unwrap_or(raw).trim()
}

/// Parse a raw launch date into its quarter
pub fn parse_launch_quarter(raw: &str) -> Result<LaunchQuarter, ReconcileError> {
    let input = significant_part(raw);
    for pattern in PATTERNS.iter() {
        if let Some(quarter) = pattern.apply(input) {
            tracing::trace!(raw, pattern = pattern.name, %quarter, "launch date parsed");
            return Ok(quarter);
        }
    }
    Err(ReconcileError::UnparseableDate {
        raw: raw.to_string(),
    })
}

/// Normalize a raw launch date to `YYYY-Qn`
pub fn normalize(raw: &str) -> Result<String, ReconcileError> {
    parse_launch_quarter(raw).map(|quarter| quarter.to_string())
}

/// Converts raw launch dates into canonical quarters
pub trait LaunchDateNormalizer {
    fn normalize(&self, raw: &str) -> Result<String, ReconcileError>;
}

/// The ordered pattern table above
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternTableNormalizer;

impl LaunchDateNormalizer for PatternTableNormalizer {
    fn normalize(&self, raw: &str) -> Result<String, ReconcileError> {
        normalize(raw)
    }
}
