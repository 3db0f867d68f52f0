//! Result Parsing
//!
//! The gateway returns query results as a sequence of text blocks.
//! These parsers turn the known block shapes into typed rows. All of
//! them are total: input that doesn't match yields an empty result.

use chrono::NaiveDate;
use serde::Serialize;

/// Label PostHog emits for rows with no breakdown value.
pub const BREAKDOWN_NULL_SENTINEL: &str = "$$_posthog_breakdown_null_$$";

/// One point of a trend series. `date` is the normalized date label
/// (`YYYY-MM-DD` for daily series, the raw label otherwise).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: String,
    pub value: f64,
}

/// One row of a breakdown result (country, referrer, error name, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownRow {
    pub label: String,
    pub count: u64,
}

/// An error-tracking record as reported by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub source: String,
    pub status: String,
    pub occurrences: u64,
    pub users: u64,
    pub sessions: u64,
    pub first_seen: String,
    pub last_seen: String,
}

impl ErrorRecord {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

/// Parse table-style results: lines shaped ` - [3]: 2025-11-21,271,7`.
pub fn parse_table(blocks: &[String]) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for block in blocks {
        for line in block.lines() {
            let Some(idx) = line.find("]: ") else { continue };
            if !line[..idx].contains(" - [") {
                continue;
            }
            let values = line[idx + 3..]
                .trim()
                .replace('"', "")
                .split(',')
                .map(|v| v.trim().to_string())
                .collect();
            rows.push(values);
        }
    }
    rows
}

/// Parse trend-style results: a `data[..]:` value series paired with a
/// `labels[..]:` label series in the first block.
pub fn parse_trend(blocks: &[String]) -> Vec<SeriesPoint> {
    let Some(block) = blocks.first() else {
        return Vec::new();
    };
    let (Some(data_line), Some(labels_line)) =
        (bracket_series(block, "data"), bracket_series(block, "labels"))
    else {
        return Vec::new();
    };

    let values: Vec<f64> = data_line
        .split(',')
        .filter_map(|v| v.trim().parse().ok())
        .collect();
    let labels = labels_line
        .split(',')
        .map(|l| l.trim().trim_matches('"').to_string());

    labels
        .zip(values)
        .map(|(label, value)| SeriesPoint {
            date: normalize_date_label(&label),
            value,
        })
        .collect()
}

/// Parse breakdown-style results: one `label:`/`count:` pair per block.
///
/// The PostHog null sentinel and zero-count rows are dropped; output is
/// sorted by count descending (stable on ties).
pub fn parse_breakdown(blocks: &[String]) -> Vec<BreakdownRow> {
    let mut rows = Vec::new();
    for block in blocks {
        let Some(label) = field_after(block, "label:") else {
            continue;
        };
        let count = field_after(block, "count:")
            .and_then(|c| c.parse().ok())
            .unwrap_or(0);
        if !label.is_empty() && label != BREAKDOWN_NULL_SENTINEL && count > 0 {
            rows.push(BreakdownRow { label, count });
        }
    }
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// Parse error-list results: one record per block, `key: value` lines.
pub fn parse_errors(blocks: &[String]) -> Vec<ErrorRecord> {
    let mut errors = Vec::new();
    for block in blocks {
        let mut record = ErrorRecord::default();
        let mut any = false;

        let mut text = |key, target: &mut String| {
            if let Some(v) = field_after(block, key) {
                *target = v;
                any = true;
            }
        };
        text("id:", &mut record.id);
        text("name:", &mut record.name);
        text("description:", &mut record.description);
        text("source:", &mut record.source);
        text("status:", &mut record.status);
        text("first_seen:", &mut record.first_seen);
        text("last_seen:", &mut record.last_seen);

        let mut number = |key, target: &mut u64| {
            if let Some(v) = field_after(block, key) {
                *target = v.parse().unwrap_or(0);
                any = true;
            }
        };
        number("occurrences:", &mut record.occurrences);
        number("users:", &mut record.users);
        number("sessions:", &mut record.sessions);

        if any {
            errors.push(record);
        }
    }
    errors
}

/// Find the rest of the line following `{prefix}[..]:` in a block.
fn bracket_series(block: &str, prefix: &str) -> Option<String> {
    let start = block.find(&format!("{}[", prefix))?;
    let rest = &block[start..];
    let colon = rest.find("]:")?;
    let line = rest[colon + 2..].lines().next()?.trim();
    Some(line.to_string())
}

/// First `key value` line in a block, trimmed and unquoted.
fn field_after(block: &str, key: &str) -> Option<String> {
    block.lines().find_map(|line| {
        line.trim_start()
            .strip_prefix(key)
            .map(|rest| rest.trim().trim_matches('"').to_string())
    })
}

/// Normalize `18-Nov-2025` style labels to `2025-11-18`; anything else
/// passes through unchanged (hourly labels keep their time suffix).
fn normalize_date_label(label: &str) -> String {
    match NaiveDate::parse_from_str(label, "%d-%b-%Y") {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => label.to_string(),
    }
}
