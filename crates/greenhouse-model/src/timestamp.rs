//! Lenient ISO 8601 timestamp parsing and normalized rendering.
//!
//! Readings carry timestamps as free text. Parsing accepts the usual ISO 8601
//! date and date-time shapes, with or without an offset. The normalized form
//! is used both for storage and as part of the duplicate-reading key, so
//! `2024-01-01T00:00:00Z` and `2024-01-01T00:00:00+00:00` compare equal.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A parsed reading timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// Carries an explicit UTC offset (`Z` is `+00:00`).
    Offset(DateTime<FixedOffset>),
    /// No offset in the source text.
    Naive(NaiveDateTime),
}

impl Timestamp {
    /// Parse timestamp text; surrounding whitespace is ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let zoned = match text.strip_suffix('Z').or_else(|| text.strip_suffix('z')) {
            Some(stripped) => format!("{stripped}+00:00"),
            None => text.to_string(),
        };
        for format in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(&zoned, format) {
                return Some(Self::Offset(dt));
            }
        }
        for format in NAIVE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
                return Some(Self::Naive(dt));
            }
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .map(|date| Self::Naive(date.and_time(NaiveTime::MIN)))
    }

    /// Point in time used for range comparisons; naive values count as UTC.
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            Self::Offset(dt) => dt.with_timezone(&Utc),
            Self::Naive(dt) => dt.and_utc(),
        }
    }

    /// `YYYY-MM-DDTHH:MM:SS[.ffffff][+HH:MM]`, microseconds only when non-zero.
    pub fn to_iso_string(&self) -> String {
        match self {
            Self::Offset(dt) => {
                format!("{}{}", render_naive(&dt.naive_local()), dt.format("%:z"))
            }
            Self::Naive(dt) => render_naive(dt),
        }
    }
}

fn render_naive(dt: &NaiveDateTime) -> String {
    let base = dt.format("%Y-%m-%dT%H:%M:%S").to_string();
    let micros = (dt.nanosecond() % 1_000_000_000) / 1_000;
    if micros == 0 {
        base
    } else {
        format!("{base}.{micros:06}")
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}
