use crate::categorizer::{Categorizer, MethodCategory};
use crate::country::canonical_country;
use crate::model::{AggregateGroup, BreachRecord, GroupKey, UNKNOWN};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Summable measures contributed by one record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Measures {
    pub records: u64,
    pub incidents: u64,
}

impl Measures {
    /// Exposure and incident count as carried by the record itself.
    pub fn of(record: &BreachRecord) -> Self {
        Measures {
            records: record.records_exposed,
            incidents: record.incidents,
        }
    }
}

/// Fixed grouping dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Category,
    OrganizationType,
    /// Canonical country name; missing countries share the "Unknown" bucket.
    Country,
    /// Opaque year label, so "2014 and 2015" is its own key.
    Year,
    Entity,
    DefenseMechanism,
}

impl Dimension {
    pub fn value(self, record: &BreachRecord, categorizer: &Categorizer) -> String {
        match self {
            Dimension::Category => categorizer.categorize(&record.method).label().to_string(),
            Dimension::OrganizationType => record.organization_type.clone(),
            Dimension::Country => canonical_country(record.country.as_deref()),
            Dimension::Year => record.year.as_str().to_string(),
            Dimension::Entity => record.entity.clone(),
            Dimension::DefenseMechanism => record
                .defense_mechanism
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }
}

/// Groups in first-seen order. Lives for one pass only.
#[derive(Default)]
struct GroupIndex {
    positions: AHashMap<GroupKey, usize>,
    groups: Vec<AggregateGroup>,
}

impl GroupIndex {
    fn add(&mut self, key: GroupKey, measures: Measures) {
        let position = match self.positions.get(&key) {
            Some(&position) => position,
            None => {
                self.groups.push(AggregateGroup {
                    key: key.clone(),
                    total_records: 0,
                    incident_count: 0,
                });
                self.positions.insert(key, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };

        let group = &mut self.groups[position];
        group.total_records = group.total_records.saturating_add(measures.records);
        group.incident_count = group.incident_count.saturating_add(measures.incidents);
    }

    fn into_groups(self) -> Vec<AggregateGroup> {
        self.groups
    }
}

/// Group `records` by `key_fn` and sum `measure_fn` per group.
///
/// Output order is the order in which each key was first seen.
pub fn aggregate<K, M>(records: &[BreachRecord], key_fn: K, measure_fn: M) -> Vec<AggregateGroup>
where
    K: Fn(&BreachRecord) -> GroupKey,
    M: Fn(&BreachRecord) -> Measures,
{
    let mut index = GroupIndex::default();
    for record in records {
        index.add(key_fn(record), measure_fn(record));
    }
    let groups = index.into_groups();
    debug!(
        "Aggregated {} records into {} groups",
        records.len(),
        groups.len()
    );
    groups
}

/// Group by one or more fixed dimensions, summing the record's own measures.
pub fn aggregate_by(
    records: &[BreachRecord],
    dimensions: &[Dimension],
    categorizer: &Categorizer,
) -> Vec<AggregateGroup> {
    aggregate(
        records,
        |record| {
            GroupKey(
                dimensions
                    .iter()
                    .map(|dimension| dimension.value(record, categorizer))
                    .collect(),
            )
        },
        Measures::of,
    )
}

/// Coarse category series plus the category × organization type detail map,
/// built in the same pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub by_category: Vec<AggregateGroup>,
    pub by_category_and_organization: Vec<AggregateGroup>,
}

impl CategoryBreakdown {
    pub fn detail_for(&self, category: MethodCategory) -> Vec<&AggregateGroup> {
        self.by_category_and_organization
            .iter()
            .filter(|group| group.key.first() == category.label())
            .collect()
    }
}

pub fn aggregate_by_category(records: &[BreachRecord], categorizer: &Categorizer) -> CategoryBreakdown {
    let mut coarse = GroupIndex::default();
    let mut fine = GroupIndex::default();

    for record in records {
        let category = categorizer.categorize(&record.method).label().to_string();
        let measures = Measures::of(record);
        fine.add(
            GroupKey(vec![category.clone(), record.organization_type.clone()]),
            measures,
        );
        coarse.add(GroupKey::single(category), measures);
    }

    let breakdown = CategoryBreakdown {
        by_category: coarse.into_groups(),
        by_category_and_organization: fine.into_groups(),
    };
    debug!(
        "Category pass: {} records, {} categories, {} category/organization pairs",
        records.len(),
        breakdown.by_category.len(),
        breakdown.by_category_and_organization.len()
    );
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(method: &str, organization_type: &str, records: u64) -> BreachRecord {
        BreachRecord {
            method: method.to_string(),
            organization_type: organization_type.to_string(),
            records_exposed: records,
            ..BreachRecord::default()
        }
    }

    #[test]
    fn test_first_seen_order_preserved() {
        let records = vec![
            record("stolen laptop", "health", 5),
            record("hacked", "web", 10),
            record("lost drive", "health", 1),
        ];
        let groups = aggregate_by(&records, &[Dimension::Category], &Categorizer::default());
        let keys: Vec<&str> = groups.iter().map(|g| g.key.first()).collect();
        assert_eq!(keys, vec!["Physical Loss/Theft", "External Attack"]);
        assert_eq!(groups[0].total_records, 6);
        assert_eq!(groups[0].incident_count, 2);
    }

    #[test]
    fn test_custom_key_and_measure() {
        let records = vec![record("hacked", "web", 10), record("hacked", "web", 30)];
        let groups = aggregate(
            &records,
            |r| GroupKey::single(r.organization_type.clone()),
            |r| Measures {
                records: r.records_exposed * 2,
                incidents: 0,
            },
        );
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].total_records, 80);
        assert_eq!(groups[0].incident_count, 0);
    }

    #[test]
    fn test_breakdown_detail_for_category() {
        let records = vec![
            record("hacked", "web", 10),
            record("ransomware", "health", 20),
            record("poor security", "web", 5),
        ];
        let breakdown = aggregate_by_category(&records, &Categorizer::default());
        assert_eq!(breakdown.by_category.len(), 2);
        let detail = breakdown.detail_for(MethodCategory::ExternalAttack);
        assert_eq!(detail.len(), 2);
        assert_eq!(detail[1].key.parts()[1], "health");
    }
}
