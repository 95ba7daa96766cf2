//! Typed query selectors and filter-token boundary.
//!
//! # Responsibility
//! - Replace the controller-facing magic strings ("all", "recycle-bin",
//!   status values, date tokens, `"null"`/`""` sentinels) with closed types.
//! - Resolve month tokens into concrete `[start, end)` epoch-ms ranges.
//! - Generate descending year-month bucket lists for filter metadata.
//!
//! # Invariants
//! - Sentinel normalization happens exactly once, at this boundary; core
//!   code only ever sees `Option` values.
//! - Month ranges are half-open and computed in UTC.

use crate::model::article::ArticleStatus;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static MONTH_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})$").expect("valid month token regex"));

/// Malformed status/date token at the query boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTokenError {
    /// Status token not in {"all", "recycle_bin", concrete status}.
    InvalidStatus(String),
    /// Month token not of shape `YYYY-MM` with a real month.
    InvalidMonth(String),
}

impl Display for QueryTokenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStatus(token) => write!(f, "invalid status token: `{token}`"),
            Self::InvalidMonth(token) => write!(f, "invalid month token: `{token}`"),
        }
    }
}

impl Error for QueryTokenError {}

/// Closed status selector replacing the string token set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSelector {
    /// All articles outside the recycle bin.
    All,
    /// Recycled articles only, ignoring status.
    RecycleBin,
    /// Non-recycled articles with one concrete status.
    Only(ArticleStatus),
}

impl StatusSelector {
    /// Parses a controller-facing status token.
    ///
    /// Accepts `all`, `recycle_bin` (also `recycle-bin`), and the stable
    /// status representations. Absent/sentinel tokens mean `All`.
    pub fn parse(token: Option<&str>) -> Result<Self, QueryTokenError> {
        let Some(token) = normalize_filter_token(token) else {
            return Ok(Self::All);
        };
        match token.as_str() {
            "all" => Ok(Self::All),
            "recycle_bin" | "recycle-bin" => Ok(Self::RecycleBin),
            other => ArticleStatus::parse(other)
                .map(Self::Only)
                .ok_or_else(|| QueryTokenError::InvalidStatus(other.to_string())),
        }
    }

    /// Whether the selector targets the recycle bin.
    pub fn recycled(self) -> bool {
        matches!(self, Self::RecycleBin)
    }

    /// Concrete status constraint, if any.
    pub fn status_filter(self) -> Option<ArticleStatus> {
        match self {
            Self::Only(status) => Some(status),
            Self::All | Self::RecycleBin => None,
        }
    }
}

/// One calendar month in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    /// 1-based month.
    pub month: u32,
}

/// Half-open `[start, end)` epoch-ms range of one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl YearMonth {
    /// Parses a `YYYY-MM` token.
    pub fn parse(token: &str) -> Result<Self, QueryTokenError> {
        let captures = MONTH_TOKEN_RE
            .captures(token)
            .ok_or_else(|| QueryTokenError::InvalidMonth(token.to_string()))?;
        // Regex guarantees digit-only groups; range still needs checking.
        let year: i32 = captures[1]
            .parse()
            .map_err(|_| QueryTokenError::InvalidMonth(token.to_string()))?;
        let month: u32 = captures[2]
            .parse()
            .map_err(|_| QueryTokenError::InvalidMonth(token.to_string()))?;
        if !(1..=12).contains(&month) {
            return Err(QueryTokenError::InvalidMonth(token.to_string()));
        }
        Ok(Self { year, month })
    }

    /// The month containing the given epoch-ms instant, in UTC.
    pub fn from_epoch_ms(epoch_ms: i64) -> Option<Self> {
        let instant: DateTime<Utc> = DateTime::from_timestamp_millis(epoch_ms)?;
        Some(Self {
            year: instant.year(),
            month: instant.month(),
        })
    }

    /// Resolves this month into its concrete epoch-ms range.
    pub fn range(self) -> Option<MonthRange> {
        let start = NaiveDate::from_ymd_opt(self.year, self.month, 1)?;
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
        Some(MonthRange {
            start_ms: start.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis(),
            end_ms: end.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis(),
        })
    }

    /// Stable `YYYY-MM` label.
    pub fn label(self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    fn pred(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

/// Collapses absent-filter sentinels into `None`.
///
/// `None`, the literal string `"null"`, and blank strings all mean
/// "no filter" at the controller boundary.
pub fn normalize_filter_token(token: Option<&str>) -> Option<String> {
    let trimmed = token?.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return None;
    }
    Some(trimmed.to_string())
}

/// Generates descending `YYYY-MM` labels spanning `earliest_ms..=latest_ms`.
///
/// Every month in the range appears exactly once, whether or not an article
/// falls into it. Returns an empty list when the bounds are unusable.
pub fn month_buckets(earliest_ms: i64, latest_ms: i64) -> Vec<String> {
    let (Some(earliest), Some(latest)) = (
        YearMonth::from_epoch_ms(earliest_ms),
        YearMonth::from_epoch_ms(latest_ms),
    ) else {
        return Vec::new();
    };
    if (latest.year, latest.month) < (earliest.year, earliest.month) {
        return Vec::new();
    }

    let mut buckets = Vec::new();
    let mut cursor = latest;
    loop {
        buckets.push(cursor.label());
        if cursor == earliest {
            break;
        }
        cursor = cursor.pred();
    }
    buckets
}
