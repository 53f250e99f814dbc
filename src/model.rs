use serde::{Deserialize, Serialize};
use std::fmt;

pub const UNKNOWN: &str = "unknown";
pub const UNKNOWN_YEAR: &str = "Unknown";

/// Year label as reported by a source.
///
/// Most sources give a plain year, but bucketed trend data uses compound labels
/// such as "2014 and 2015" or "2019-2020", so the label is kept verbatim and only
/// interpreted numerically on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YearLabel(String);

impl YearLabel {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Self::unknown();
        }
        YearLabel(trimmed.to_string())
    }

    pub fn from_year(year: i32) -> Self {
        YearLabel(year.to_string())
    }

    pub fn unknown() -> Self {
        YearLabel(UNKNOWN_YEAR.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First four-digit run in the label, e.g. 2019 for "2019-2020".
    pub fn number(&self) -> Option<i32> {
        first_year_in(&self.0)
    }
}

impl fmt::Display for YearLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn first_year_in(text: &str) -> Option<i32> {
    let bytes = text.as_bytes();
    let mut start = None;
    for (i, b) in bytes.iter().enumerate() {
        if b.is_ascii_digit() {
            let s = *start.get_or_insert(i);
            if i + 1 - s == 4 {
                let next_is_digit = bytes.get(i + 1).is_some_and(|n| n.is_ascii_digit());
                if !next_is_digit {
                    return text[s..=i].parse().ok();
                }
            }
        } else {
            start = None;
        }
    }
    None
}

/// One normalized breach incident (or one pre-bucketed row of incidents).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreachRecord {
    pub entity: String,
    pub year: YearLabel,
    pub records_exposed: u64,
    /// Incidents this row stands for: 1, or the source's own `Count` for bucketed rows.
    pub incidents: u64,
    pub organization_type: String,
    pub method: String,
    pub country: Option<String>,
    pub domain: Option<String>,
    pub defense_mechanism: Option<String>,
    /// Millions of USD.
    pub financial_loss: Option<f64>,
}

impl Default for BreachRecord {
    fn default() -> Self {
        Self {
            entity: UNKNOWN.to_string(),
            year: YearLabel::unknown(),
            records_exposed: 0,
            incidents: 1,
            organization_type: UNKNOWN.to_string(),
            method: UNKNOWN.to_string(),
            country: None,
            domain: None,
            defense_mechanism: None,
            financial_loss: None,
        }
    }
}

impl BreachRecord {
    pub fn has_exposure(&self) -> bool {
        self.records_exposed > 0
    }
}

/// Ordered tuple of dimension values identifying a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(pub Vec<String>);

impl GroupKey {
    pub fn single(value: impl Into<String>) -> Self {
        GroupKey(vec![value.into()])
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    pub fn first(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" / "))
    }
}

/// Summed measures for one group, produced by a single aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateGroup {
    pub key: GroupKey,
    pub total_records: u64,
    pub incident_count: u64,
}
