use super::values::{parse_amount, parse_count_text, year_label};
use crate::error::FetchError;
use crate::model::{BreachRecord, YearLabel, UNKNOWN};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde_json::Value;
use tracing::{debug, warn};

const COUNTRY: &str = "Country";
const DEFENSE: &str = "Defense Mechanism Used";
const YEAR: &str = "Year";
const ATTACK_TYPE: &str = "Attack Type";
const INDUSTRY: &str = "Target Industry";
const AFFECTED_USERS: &str = "Number of Affected Users";
const FINANCIAL_LOSS: &str = "Financial Loss (in Million $)";
const ENTITY: &str = "Entity";

/// Header positions resolved by name, so column order in the file does not matter.
struct ColumnMap {
    width: usize,
    country: usize,
    defense: usize,
    year: Option<usize>,
    attack_type: Option<usize>,
    industry: Option<usize>,
    affected_users: Option<usize>,
    financial_loss: Option<usize>,
    entity: Option<usize>,
}

impl ColumnMap {
    fn resolve(source_id: &str, headers: &StringRecord) -> Result<Self, FetchError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                FetchError::malformed(source_id, format!("missing required CSV column '{}'", name))
            })
        };

        Ok(ColumnMap {
            width: headers.len(),
            country: require(COUNTRY)?,
            defense: require(DEFENSE)?,
            year: find(YEAR),
            attack_type: find(ATTACK_TYPE),
            industry: find(INDUSTRY),
            affected_users: find(AFFECTED_USERS),
            financial_loss: find(FINANCIAL_LOSS),
            entity: find(ENTITY),
        })
    }

    fn field<'r>(&self, row: &'r StringRecord, column: Option<usize>) -> Option<&'r str> {
        column
            .and_then(|index| row.get(index))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    fn to_record(&self, row: &StringRecord) -> BreachRecord {
        let owned = |column: Option<usize>| self.field(row, column).map(str::to_string);
        BreachRecord {
            entity: owned(self.entity).unwrap_or_else(|| UNKNOWN.to_string()),
            year: self
                .field(row, self.year)
                .and_then(|year| year_label(Some(&Value::String(year.to_string()))))
                .unwrap_or_else(YearLabel::unknown),
            records_exposed: self
                .field(row, self.affected_users)
                .map(parse_count_text)
                .unwrap_or(0),
            organization_type: owned(self.industry).unwrap_or_else(|| UNKNOWN.to_string()),
            method: owned(self.attack_type).unwrap_or_else(|| UNKNOWN.to_string()),
            country: owned(Some(self.country)),
            defense_mechanism: owned(Some(self.defense)),
            financial_loss: self
                .field(row, self.financial_loss)
                .and_then(|loss| parse_amount(Some(&Value::String(loss.to_string())))),
            ..BreachRecord::default()
        }
    }
}

/// Parse a global-incidents CSV export. Blank lines are ignored and short rows are
/// skipped one by one; only a missing required column fails the whole load.
pub fn parse_incidents_csv(source_id: &str, body: &str) -> Result<Vec<BreachRecord>, FetchError> {
    let body = body.strip_prefix('\u{feff}').unwrap_or(body);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| FetchError::malformed(source_id, format!("unreadable CSV header: {}", e)))?
        .clone();
    let columns = ColumnMap::resolve(source_id, &headers)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (index, row) in reader.records().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping CSV row {} of source '{}': {}", index + 1, source_id, e);
                skipped += 1;
                continue;
            }
        };

        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        if row.len() < columns.width {
            warn!(
                "Skipping CSV row {} of source '{}': {} fields, expected {}",
                index + 1,
                source_id,
                row.len(),
                columns.width
            );
            skipped += 1;
            continue;
        }

        records.push(columns.to_record(&row));
    }

    debug!(
        "Source '{}': parsed {} CSV rows, skipped {}",
        source_id,
        records.len(),
        skipped
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_resolved_by_name() {
        let body = "Defense Mechanism Used,Number of Affected Users,Country,Year\n\
                    Firewall,1200,USA,2019\n";
        let records = parse_incidents_csv("csv", body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].country.as_deref(), Some("USA"));
        assert_eq!(records[0].defense_mechanism.as_deref(), Some("Firewall"));
        assert_eq!(records[0].records_exposed, 1200);
        assert_eq!(records[0].year.as_str(), "2019");
    }

    #[test]
    fn test_missing_required_column_is_malformed() {
        let err = parse_incidents_csv("csv", "Country,Year\nUSA,2019\n").unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
    }

    #[test]
    fn test_short_and_blank_rows_skipped() {
        let body = "Country,Defense Mechanism Used,Year\n\
                    USA,Firewall,2019\n\
                    \n\
                    India\n\
                    Brazil,VPN,2020\n";
        let records = parse_incidents_csv("csv", body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].country.as_deref(), Some("Brazil"));
    }

    #[test]
    fn test_quoted_fields_keep_commas() {
        let body = "Country,Defense Mechanism Used,Target Industry\n\
                    \"Korea, Republic of\",\"AI-based, behavioural\",Banking\n";
        let records = parse_incidents_csv("csv", body).unwrap();
        assert_eq!(records[0].country.as_deref(), Some("Korea, Republic of"));
        assert_eq!(records[0].defense_mechanism.as_deref(), Some("AI-based, behavioural"));
        assert_eq!(records[0].organization_type, "Banking");
    }
}
