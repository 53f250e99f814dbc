use std::collections::HashMap;

pub const UNKNOWN_COUNTRY: &str = "Unknown";

lazy_static::lazy_static! {
    /// Lowercased synonym → canonical name. Canonical names follow the world-atlas
    /// naming the choropleth renderer keys its shapes on.
    static ref COUNTRY_SYNONYMS: HashMap<&'static str, &'static str> = {
        let table: &[(&str, &[&str])] = &[
            (
                "United States of America",
                &["usa", "us", "u.s.", "u.s.a.", "united states", "united states of america", "america"],
            ),
            (
                "United Kingdom",
                &["uk", "u.k.", "united kingdom", "great britain", "britain", "england"],
            ),
            ("Russia", &["russia", "russian federation"]),
            ("South Korea", &["south korea", "korea, republic of", "republic of korea"]),
            ("North Korea", &["north korea", "korea, democratic people's republic of"]),
            ("United Arab Emirates", &["uae", "u.a.e.", "united arab emirates"]),
            ("Czechia", &["czechia", "czech republic"]),
            ("China", &["china", "prc", "people's republic of china"]),
            ("Iran", &["iran", "iran, islamic republic of"]),
            ("Germany", &["germany", "deutschland"]),
            ("Netherlands", &["netherlands", "the netherlands", "holland"]),
            (UNKNOWN_COUNTRY, &["unknown", "n/a", "none"]),
        ];

        let mut map = HashMap::new();
        for (canonical, synonyms) in table {
            for synonym in *synonyms {
                map.insert(*synonym, *canonical);
            }
        }
        map
    };
}

/// Resolve a country label to its canonical name. Missing or blank labels map to
/// the "Unknown" bucket; names without a synonym entry pass through trimmed.
pub fn canonical_country(country: Option<&str>) -> String {
    let trimmed = match country.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return UNKNOWN_COUNTRY.to_string(),
    };

    COUNTRY_SYNONYMS
        .get(trimmed.to_lowercase().as_str())
        .map(|canonical| canonical.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}
