//! Raw row shapes, one per backend schema, each with an explicit mapping into
//! [`BreachRecord`]. Downstream code never looks at raw field presence.

use super::values::{parse_amount, parse_count, text, year_from_date, year_label};
use crate::model::{BreachRecord, YearLabel, UNKNOWN};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

pub(crate) trait RawRow: DeserializeOwned {
    fn into_record(self) -> BreachRecord;
}

/// Map every element of a JSON array through `R`, skipping elements that are not
/// objects of the expected shape.
pub(crate) fn map_rows<R: RawRow>(source_id: &str, items: Vec<Value>) -> Vec<BreachRecord> {
    let total = items.len();
    let records: Vec<BreachRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<R>(item) {
            Ok(row) => Some(row.into_record()),
            Err(e) => {
                warn!(
                    "Skipping element {} of source '{}': {}",
                    index, source_id, e
                );
                None
            }
        })
        .collect();

    debug!(
        "Source '{}': mapped {} of {} elements",
        source_id,
        records.len(),
        total
    );
    records
}

fn or_unknown(value: Option<String>) -> String {
    value.unwrap_or_else(|| UNKNOWN.to_string())
}

/// `Entity`, `Year`, `Records`, `Organization type`, `Method`.
#[derive(Debug, Deserialize)]
pub(crate) struct EntityRow {
    #[serde(rename = "Entity")]
    entity: Option<Value>,
    #[serde(rename = "Year")]
    year: Option<Value>,
    #[serde(rename = "Records")]
    records: Option<Value>,
    #[serde(rename = "Organization type")]
    organization_type: Option<Value>,
    #[serde(rename = "Method")]
    method: Option<Value>,
}

impl RawRow for EntityRow {
    fn into_record(self) -> BreachRecord {
        BreachRecord {
            entity: or_unknown(text(self.entity.as_ref())),
            year: year_label(self.year.as_ref()).unwrap_or_else(YearLabel::unknown),
            records_exposed: parse_count(self.records.as_ref()),
            organization_type: or_unknown(text(self.organization_type.as_ref())),
            method: or_unknown(text(self.method.as_ref())),
            ..BreachRecord::default()
        }
    }
}

/// `Year`, `Records`.
#[derive(Debug, Deserialize)]
pub(crate) struct YearRow {
    #[serde(rename = "Year")]
    year: Option<Value>,
    #[serde(rename = "Records")]
    records: Option<Value>,
}

impl RawRow for YearRow {
    fn into_record(self) -> BreachRecord {
        BreachRecord {
            year: year_label(self.year.as_ref()).unwrap_or_else(YearLabel::unknown),
            records_exposed: parse_count(self.records.as_ref()),
            ..BreachRecord::default()
        }
    }
}

/// Pre-bucketed rows: `Organization type`, `Method`, `TotalRecords`, `Count`.
#[derive(Debug, Deserialize)]
pub(crate) struct MethodRow {
    #[serde(rename = "Organization type")]
    organization_type: Option<Value>,
    #[serde(rename = "Method")]
    method: Option<Value>,
    #[serde(rename = "TotalRecords")]
    total_records: Option<Value>,
    #[serde(rename = "Count")]
    count: Option<Value>,
}

impl RawRow for MethodRow {
    fn into_record(self) -> BreachRecord {
        // A bucket without an explicit count still stands for one incident.
        let incidents = match self.count.as_ref() {
            Some(count) => parse_count(Some(count)),
            None => 1,
        };
        BreachRecord {
            records_exposed: parse_count(self.total_records.as_ref()),
            incidents,
            organization_type: or_unknown(text(self.organization_type.as_ref())),
            method: or_unknown(text(self.method.as_ref())),
            ..BreachRecord::default()
        }
    }
}

/// Breach-notification API rows: `Title`, `BreachDate`, `PwnCount`, `Domain`, `Description`.
#[derive(Debug, Deserialize)]
pub(crate) struct BreachApiRow {
    #[serde(rename = "Title")]
    title: Option<Value>,
    #[serde(rename = "Name")]
    name: Option<Value>,
    #[serde(rename = "BreachDate")]
    breach_date: Option<Value>,
    #[serde(rename = "PwnCount")]
    pwn_count: Option<Value>,
    #[serde(rename = "Domain")]
    domain: Option<Value>,
    #[serde(rename = "Description")]
    description: Option<Value>,
}

impl RawRow for BreachApiRow {
    fn into_record(self) -> BreachRecord {
        let year = text(self.breach_date.as_ref())
            .and_then(|date| year_from_date(&date))
            .map(YearLabel::from_year)
            .unwrap_or_else(YearLabel::unknown);
        BreachRecord {
            entity: or_unknown(text(self.title.as_ref()).or_else(|| text(self.name.as_ref()))),
            year,
            records_exposed: parse_count(self.pwn_count.as_ref()),
            method: or_unknown(text(self.description.as_ref())),
            domain: text(self.domain.as_ref()),
            ..BreachRecord::default()
        }
    }
}

/// "Global breaches" rows. Two generations of this feed exist with different
/// field names, so each output field takes the first one present.
#[derive(Debug, Deserialize)]
pub(crate) struct GlobalBreachRow {
    country: Option<Value>,
    year: Option<Value>,
    affected_users: Option<Value>,
    target_industry: Option<Value>,
    attack_type: Option<Value>,
    financial_loss: Option<Value>,
    domain: Option<Value>,
    industry: Option<Value>,
    #[serde(rename = "exposedRecords")]
    exposed_records: Option<Value>,
    #[serde(rename = "breachID")]
    breach_id: Option<Value>,
    #[serde(rename = "breachedDate")]
    breached_date: Option<Value>,
}

impl RawRow for GlobalBreachRow {
    fn into_record(self) -> BreachRecord {
        let year = year_label(self.year.as_ref())
            .or_else(|| {
                text(self.breached_date.as_ref())
                    .and_then(|date| year_from_date(&date))
                    .map(YearLabel::from_year)
            })
            .unwrap_or_else(YearLabel::unknown);
        let records_exposed = match self.affected_users.as_ref() {
            Some(users) => parse_count(Some(users)),
            None => parse_count(self.exposed_records.as_ref()),
        };
        let domain = text(self.domain.as_ref());

        BreachRecord {
            entity: or_unknown(text(self.breach_id.as_ref()).or_else(|| domain.clone())),
            year,
            records_exposed,
            organization_type: or_unknown(
                text(self.target_industry.as_ref()).or_else(|| text(self.industry.as_ref())),
            ),
            method: or_unknown(text(self.attack_type.as_ref())),
            country: text(self.country.as_ref()),
            domain,
            financial_loss: parse_amount(self.financial_loss.as_ref()),
            ..BreachRecord::default()
        }
    }
}
