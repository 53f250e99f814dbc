use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed taxonomy of breach causes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodCategory {
    #[serde(rename = "External Attack", alias = "external_attack")]
    ExternalAttack,
    #[serde(rename = "Poor Security/Configuration", alias = "poor_security")]
    PoorSecurity,
    #[serde(rename = "Accidental Exposure", alias = "accidental_exposure")]
    AccidentalExposure,
    #[serde(rename = "Physical Loss/Theft", alias = "physical_loss")]
    PhysicalLoss,
    #[serde(rename = "Insider Threat", alias = "insider_threat")]
    InsiderThreat,
    #[serde(rename = "Unknown", alias = "unknown")]
    Unknown,
    #[serde(rename = "Social Engineering", alias = "social_engineering")]
    SocialEngineering,
    #[serde(rename = "Vulnerability Exploit", alias = "vulnerability_exploit")]
    VulnerabilityExploit,
    #[default]
    #[serde(rename = "Other", alias = "other")]
    Other,
}

impl MethodCategory {
    pub const ALL: [MethodCategory; 9] = [
        MethodCategory::ExternalAttack,
        MethodCategory::PoorSecurity,
        MethodCategory::AccidentalExposure,
        MethodCategory::PhysicalLoss,
        MethodCategory::InsiderThreat,
        MethodCategory::Unknown,
        MethodCategory::SocialEngineering,
        MethodCategory::VulnerabilityExploit,
        MethodCategory::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MethodCategory::ExternalAttack => "External Attack",
            MethodCategory::PoorSecurity => "Poor Security/Configuration",
            MethodCategory::AccidentalExposure => "Accidental Exposure",
            MethodCategory::PhysicalLoss => "Physical Loss/Theft",
            MethodCategory::InsiderThreat => "Insider Threat",
            MethodCategory::Unknown => "Unknown",
            MethodCategory::SocialEngineering => "Social Engineering",
            MethodCategory::VulnerabilityExploit => "Vulnerability Exploit",
            MethodCategory::Other => "Other",
        }
    }
}

impl fmt::Display for MethodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered matching rules. Vocabulary overlaps between rules, so earlier rules
/// shadow later ones and the order must not change.
const RULES: &[(&[&str], MethodCategory)] = &[
    (&["hacked", "ransomware"], MethodCategory::ExternalAttack),
    (
        &[
            "poor security",
            "misconfiguration",
            "unsecured",
            "unprotected",
            "improper setting",
            "data exposed by misconfiguration",
        ],
        MethodCategory::PoorSecurity,
    ),
    (&["accidentally"], MethodCategory::AccidentalExposure),
    (&["lost", "stolen"], MethodCategory::PhysicalLoss),
    (&["inside job", "rogue contractor"], MethodCategory::InsiderThreat),
    (&["unknown"], MethodCategory::Unknown),
    (&["social engineering"], MethodCategory::SocialEngineering),
    (&["zero-day", "vulnerabilities"], MethodCategory::VulnerabilityExploit),
];

/// Maps free-text breach methods onto [`MethodCategory`].
///
/// Only the fallback for unmatched text is configurable; sources disagree on
/// whether that should be `Other` or `External Attack`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Categorizer {
    unmatched: MethodCategory,
}

impl Categorizer {
    pub fn new(unmatched: MethodCategory) -> Self {
        Self { unmatched }
    }

    pub fn categorize(&self, method: &str) -> MethodCategory {
        let trimmed = method.trim();
        let lowered = if trimmed.is_empty() {
            "unknown".to_string()
        } else {
            trimmed.to_lowercase()
        };

        RULES
            .iter()
            .find(|(patterns, _)| patterns.iter().any(|p| lowered.contains(p)))
            .map(|(_, category)| *category)
            .unwrap_or(self.unmatched)
    }
}

/// Categorize with the default fallback (`Other`).
pub fn categorize(method: &str) -> MethodCategory {
    Categorizer::default().categorize(method)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_order_prefers_external_attack() {
        assert_eq!(
            categorize("hacked due to poor security"),
            MethodCategory::ExternalAttack
        );
    }

    #[test]
    fn test_empty_method_is_unknown() {
        assert_eq!(categorize(""), MethodCategory::Unknown);
        assert_eq!(categorize("   "), MethodCategory::Unknown);
    }

    #[test]
    fn test_unmatched_uses_configured_default() {
        let categorizer = Categorizer::new(MethodCategory::ExternalAttack);
        assert_eq!(categorizer.categorize("phishing"), MethodCategory::ExternalAttack);
        assert_eq!(categorize("phishing"), MethodCategory::Other);
    }

    #[test]
    fn test_deserialize_from_label_and_alias() {
        let from_label: MethodCategory = serde_json::from_str("\"External Attack\"").unwrap();
        let from_alias: MethodCategory = serde_json::from_str("\"external_attack\"").unwrap();
        assert_eq!(from_label, MethodCategory::ExternalAttack);
        assert_eq!(from_alias, MethodCategory::ExternalAttack);
    }
}
