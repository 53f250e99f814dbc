use crate::model::{AggregateGroup, BreachRecord, YearLabel};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    TotalRecords,
    IncidentCount,
}

impl Measure {
    pub fn of(self, group: &AggregateGroup) -> u64 {
        match self {
            Measure::TotalRecords => group.total_records,
            Measure::IncidentCount => group.incident_count,
        }
    }
}

/// The `n` largest groups by `measure`, descending.
///
/// The sort is stable, so ties keep the aggregator's first-seen order and ranking
/// the same input twice gives the same output. Groups with no exposure are left
/// out of exposure rankings.
pub fn top_n(groups: &[AggregateGroup], measure: Measure, n: usize) -> Vec<AggregateGroup> {
    let mut ranked: Vec<AggregateGroup> = groups
        .iter()
        .filter(|group| measure != Measure::TotalRecords || group.total_records > 0)
        .cloned()
        .collect();
    ranked.sort_by_key(|group| Reverse(measure.of(group)));
    ranked.truncate(n);
    ranked
}

/// The `n` records with the largest exposure. Records without exposure are excluded.
pub fn top_records(records: &[BreachRecord], n: usize) -> Vec<BreachRecord> {
    let mut ranked: Vec<BreachRecord> = records
        .iter()
        .filter(|record| record.has_exposure())
        .cloned()
        .collect();
    ranked.sort_by_key(|record| Reverse(record.records_exposed));
    ranked.truncate(n);
    ranked
}

/// Chronological order for year-keyed groups.
pub fn sort_by_year(groups: &[AggregateGroup]) -> Vec<AggregateGroup> {
    let mut sorted = groups.to_vec();
    sorted.sort_by(|a, b| compare_year_labels(a.key.first(), b.key.first()));
    sorted
}

/// Compare year labels by their leading year, falling back to text comparison.
/// Labels without any year ("Unknown") sort after every dated label.
pub fn compare_year_labels(a: &str, b: &str) -> Ordering {
    let year_a = YearLabel::new(a).number();
    let year_b = YearLabel::new(b).number();
    match (year_a, year_b) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GroupKey;

    fn group(key: &str, total_records: u64, incident_count: u64) -> AggregateGroup {
        AggregateGroup {
            key: GroupKey::single(key),
            total_records,
            incident_count,
        }
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let groups = vec![group("a", 5, 1), group("b", 9, 1), group("c", 5, 1)];
        let ranked = top_n(&groups, Measure::TotalRecords, 10);
        let keys: Vec<&str> = ranked.iter().map(|g| g.key.first()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_zero_exposure_groups_excluded_from_exposure_ranking() {
        let groups = vec![group("a", 0, 4), group("b", 3, 1)];
        assert_eq!(top_n(&groups, Measure::TotalRecords, 10).len(), 1);
        assert_eq!(top_n(&groups, Measure::IncidentCount, 10).len(), 2);
    }

    #[test]
    fn test_compound_year_labels_sort_chronologically() {
        let groups = vec![
            group("2019-2020", 1, 1),
            group("Unknown", 1, 1),
            group("2014 and 2015", 1, 1),
            group("2019", 1, 1),
        ];
        let sorted = sort_by_year(&groups);
        let keys: Vec<&str> = sorted.iter().map(|g| g.key.first()).collect();
        assert_eq!(keys, vec!["2014 and 2015", "2019", "2019-2020", "Unknown"]);
    }
}
