//! Commit range resolution.
//!
//! A changelog run selects commits either by revision bounds (`from...to`)
//! or by date bounds (`after...before`). The CLI forms always win over the
//! configured default range.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ChangelogError, Result};

/// Separator between the two halves of a range argument.
pub const RANGE_SEPARATOR: &str = "...";

/// Commit selection criteria for a changelog run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<NaiveDate>,
}

impl Range {
    /// Returns true when no selection criterion is set.
    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none() && self.after.is_none() && self.before.is_none()
    }

    /// Whether this range selects by revision bounds rather than dates.
    pub fn is_revision_range(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_revision_range() {
            return write!(
                f,
                "{}{}{}",
                self.from.as_deref().unwrap_or(""),
                RANGE_SEPARATOR,
                self.to.as_deref().unwrap_or("")
            );
        }

        let mut parts = Vec::new();
        if let Some(after) = self.after {
            parts.push(format!("after {}", after));
        }
        if let Some(before) = self.before {
            parts.push(format!("before {}", before));
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// Resolves the range for a run.
///
/// Precedence is the explicit `from...to` argument, then the date argument,
/// then a copy of `default_range`. The result must select something.
///
/// # Arguments
/// * `cli_range` - Value of `--range`, e.g. `"v1.0.0...HEAD"`
/// * `cli_date_range` - Value of `--date`, e.g. `"2024-01-01"` or `"2024-01-01...2024-02-01"`
/// * `default_range` - Range from configuration, used only when neither CLI form is given
///
/// # Returns
/// * `Ok(Range)` - A non-empty range
/// * `Err` - If an argument is malformed or nothing selects commits
pub fn resolve(
    cli_range: Option<&str>,
    cli_date_range: Option<&str>,
    default_range: &Range,
) -> Result<Range> {
    let range = if let Some(raw) = cli_range {
        parse_revision_range(raw)?
    } else if let Some(raw) = cli_date_range {
        parse_date_range(raw)?
    } else {
        default_range.clone()
    };

    if range.is_empty() {
        return Err(ChangelogError::config(
            "No range defined for the changelog. Pass --range or --date, \
             or set source_control.default_range in the config file",
        ));
    }

    Ok(range)
}

fn parse_revision_range(raw: &str) -> Result<Range> {
    let tokens: Vec<&str> = raw.split(RANGE_SEPARATOR).map(str::trim).collect();

    match tokens.as_slice() {
        [from, to] if !from.is_empty() && !to.is_empty() => Ok(Range {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
            ..Range::default()
        }),
        _ => Err(ChangelogError::config(format!(
            "Invalid range '{}': expected <from>{}<to>",
            raw, RANGE_SEPARATOR
        ))),
    }
}

fn parse_date_range(raw: &str) -> Result<Range> {
    let tokens: Vec<&str> = raw.split(RANGE_SEPARATOR).map(str::trim).collect();

    match tokens.as_slice() {
        [after] => Ok(Range {
            after: Some(parse_date(after)?),
            ..Range::default()
        }),
        [after, before] => Ok(Range {
            after: Some(parse_date(after)?),
            before: Some(parse_date(before)?),
            ..Range::default()
        }),
        _ => Err(ChangelogError::config(format!(
            "Invalid date range '{}': expected <date>[{}<date>]",
            raw, RANGE_SEPARATOR
        ))),
    }
}

/// Parses a calendar date given as `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .map_err(|_| ChangelogError::config(format!("Invalid date '{}'", raw)))
}
