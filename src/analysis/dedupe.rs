use crate::model::{BreachRecord, UNKNOWN};
use ahash::AHashSet;

/// Drop incidents reported more than once (same entity, domain and year),
/// keeping the first occurrence. Records with neither an entity nor a domain
/// cannot be identified and are always kept.
pub fn dedupe_records(records: Vec<BreachRecord>) -> Vec<BreachRecord> {
    let mut seen: AHashSet<String> = AHashSet::new();
    records
        .into_iter()
        .filter(|record| match dedupe_key(record) {
            Some(key) => seen.insert(key),
            None => true,
        })
        .collect()
}

fn dedupe_key(record: &BreachRecord) -> Option<String> {
    let entity = record.entity.trim().to_lowercase();
    let domain = record
        .domain
        .as_deref()
        .map(|domain| domain.trim().to_lowercase())
        .filter(|domain| !domain.is_empty());

    if (entity.is_empty() || entity == UNKNOWN) && domain.is_none() {
        return None;
    }
    Some(format!(
        "{}|{}|{}",
        entity,
        domain.unwrap_or_default(),
        record.year
    ))
}
