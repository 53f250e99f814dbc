pub mod delimited;
pub mod http;
pub mod raw;
pub mod values;

use crate::analysis::dedupe::dedupe_records;
use crate::error::FetchError;
use crate::model::BreachRecord;
use crate::presentation::ChartSlot;
use raw::{map_rows, BreachApiRow, EntityRow, GlobalBreachRow, MethodRow, YearRow};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Where a source's payload lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceLocation {
    Path(PathBuf),
    Url(String),
}

/// Raw payload shape. Each variant has its own row type and mapping in [`raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSchema {
    /// `Entity`, `Year`, `Records`, `Organization type`, `Method`
    BreachByEntity,
    /// `Year`, `Records`
    RecordsByYear,
    /// `Organization type`, `Method`, `TotalRecords`, `Count`
    MethodVsCategory,
    /// `Title`, `BreachDate`, `PwnCount`, `Domain`, `Description`
    BreachApi,
    /// `country`, `year`, `affected_users`, ... `breachID`, `breachedDate`
    GlobalBreaches,
    /// CSV export with at least `Country` and `Defense Mechanism Used`
    GlobalIncidentsCsv,
}

impl SourceSchema {
    pub fn default_slots(self) -> Vec<ChartSlot> {
        match self {
            SourceSchema::BreachByEntity | SourceSchema::BreachApi => vec![ChartSlot::Entities],
            SourceSchema::RecordsByYear => vec![ChartSlot::YearTrend],
            SourceSchema::MethodVsCategory => vec![ChartSlot::Categories],
            SourceSchema::GlobalBreaches => vec![ChartSlot::Countries],
            SourceSchema::GlobalIncidentsCsv => {
                vec![ChartSlot::Countries, ChartSlot::DefenseMechanisms]
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub id: String,
    pub location: SourceLocation,
    pub schema: SourceSchema,
    /// Dotted path to the array inside an enveloping JSON object, e.g. `data.values`.
    #[serde(default)]
    pub envelope: Option<String>,
    #[serde(default)]
    pub dedupe: bool,
    /// Chart slots fed by this source; defaults per schema.
    #[serde(default)]
    pub slots: Option<Vec<ChartSlot>>,
}

impl SourceConfig {
    pub fn new(id: &str, location: SourceLocation, schema: SourceSchema) -> Self {
        Self {
            id: id.to_string(),
            location,
            schema,
            envelope: None,
            dedupe: false,
            slots: None,
        }
    }

    pub fn with_envelope(mut self, envelope: &str) -> Self {
        self.envelope = Some(envelope.to_string());
        self
    }

    /// Everything that shapes this source's records. A cached payload with a
    /// different origin is not reused.
    pub fn origin(&self) -> String {
        format!(
            "{:?}|{:?}|{}|{}",
            self.schema,
            self.location,
            self.envelope.as_deref().unwrap_or_default(),
            self.dedupe
        )
    }

    pub fn slots(&self) -> Vec<ChartSlot> {
        self.slots
            .clone()
            .unwrap_or_else(|| self.schema.default_slots())
    }
}

/// Read and normalize one source. Performs only the read; caching is the caller's job.
pub fn fetch_records(source: &SourceConfig) -> Result<Vec<BreachRecord>, FetchError> {
    info!("Fetching source '{}'", source.id);
    let body = read_payload(source)?;
    let records = decode_payload(source, &body)?;

    if source.dedupe {
        let before = records.len();
        let unique = dedupe_records(records);
        debug!(
            "Source '{}': removed {} duplicate records",
            source.id,
            before - unique.len()
        );
        return Ok(unique);
    }
    Ok(records)
}

fn read_payload(source: &SourceConfig) -> Result<String, FetchError> {
    match &source.location {
        SourceLocation::Path(path) => fs::read_to_string(path).map_err(|error| FetchError::Io {
            source_id: source.id.clone(),
            error,
        }),
        SourceLocation::Url(url) => http::get_text(&source.id, url),
    }
}

/// Decode a raw payload according to the source's schema.
pub fn decode_payload(source: &SourceConfig, body: &str) -> Result<Vec<BreachRecord>, FetchError> {
    let items = || json_array(&source.id, body, source.envelope.as_deref());
    let records = match source.schema {
        SourceSchema::GlobalIncidentsCsv => delimited::parse_incidents_csv(&source.id, body)?,
        SourceSchema::BreachByEntity => map_rows::<EntityRow>(&source.id, items()?),
        SourceSchema::RecordsByYear => map_rows::<YearRow>(&source.id, items()?),
        SourceSchema::MethodVsCategory => map_rows::<MethodRow>(&source.id, items()?),
        SourceSchema::BreachApi => map_rows::<BreachApiRow>(&source.id, items()?),
        SourceSchema::GlobalBreaches => map_rows::<GlobalBreachRow>(&source.id, items()?),
    };
    Ok(records)
}

/// Parse `body` and return the array it holds (at `envelope`, when given).
/// Anything that is not an array is a hard failure, never an empty result.
fn json_array(source_id: &str, body: &str, envelope: Option<&str>) -> Result<Vec<Value>, FetchError> {
    let root: Value = serde_json::from_str(body.trim_start_matches('\u{feff}'))
        .map_err(|e| FetchError::malformed(source_id, format!("invalid JSON: {}", e)))?;

    let target = match envelope {
        Some(path) => {
            let pointer = format!("/{}", path.split('.').collect::<Vec<_>>().join("/"));
            let mut root = root;
            match root.pointer_mut(&pointer) {
                Some(inner) => inner.take(),
                None => {
                    return Err(FetchError::malformed(
                        source_id,
                        format!("envelope '{}' not found in payload", path),
                    ))
                }
            }
        }
        None => root,
    };

    match target {
        Value::Array(items) => Ok(items),
        other => Err(FetchError::malformed(
            source_id,
            format!("expected a JSON array, found {}", kind_of(&other)),
        )),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
