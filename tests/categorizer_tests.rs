use breach_lens::{categorize, Categorizer, MethodCategory};

#[test]
fn test_each_rule_matches_its_vocabulary() {
    let cases = [
        ("hacked", MethodCategory::ExternalAttack),
        ("Ransomware attack", MethodCategory::ExternalAttack),
        ("poor security", MethodCategory::PoorSecurity),
        ("Unsecured S3 bucket", MethodCategory::PoorSecurity),
        ("unprotected api", MethodCategory::PoorSecurity),
        ("improper setting, hacked", MethodCategory::ExternalAttack),
        ("data exposed by misconfiguration", MethodCategory::PoorSecurity),
        ("accidentally published", MethodCategory::AccidentalExposure),
        ("lost / stolen media", MethodCategory::PhysicalLoss),
        ("stolen laptop", MethodCategory::PhysicalLoss),
        ("inside job", MethodCategory::InsiderThreat),
        ("rogue contractor", MethodCategory::InsiderThreat),
        ("unknown", MethodCategory::Unknown),
        ("Social Engineering", MethodCategory::SocialEngineering),
        ("zero-day exploit", MethodCategory::VulnerabilityExploit),
        ("multiple vulnerabilities", MethodCategory::VulnerabilityExploit),
    ];
    for (method, expected) in cases {
        assert_eq!(categorize(method), expected, "method {:?}", method);
    }
}

#[test]
fn test_earlier_rules_shadow_later_ones() {
    assert_eq!(
        categorize("poor security, then hacked"),
        MethodCategory::ExternalAttack
    );
    // Matches both the insider and external vocabularies.
    assert_eq!(categorize("inside job, hacked"), MethodCategory::ExternalAttack);
    // Matches both the physical-loss and unknown vocabularies.
    assert_eq!(categorize("lost, cause unknown"), MethodCategory::PhysicalLoss);
    assert_eq!(
        categorize("accidentally left unsecured"),
        MethodCategory::PoorSecurity
    );
}

#[test]
fn test_blank_input_is_unknown() {
    assert_eq!(categorize(""), MethodCategory::Unknown);
    assert_eq!(categorize("   "), MethodCategory::Unknown);
}

#[test]
fn test_unmatched_uses_configured_default() {
    assert_eq!(categorize("phishing"), MethodCategory::Other);

    let categorizer = Categorizer::new(MethodCategory::ExternalAttack);
    assert_eq!(categorizer.categorize("phishing"), MethodCategory::ExternalAttack);
    assert_eq!(categorizer.categorize("stolen laptop"), MethodCategory::PhysicalLoss);
    assert_eq!(categorizer.categorize(""), MethodCategory::Unknown);
}

#[test]
fn test_total_and_deterministic() {
    let inputs = [
        "",
        "HACKED",
        "misconfiguration",
        "état inconnu",
        "😀 emoji",
        "12345",
        "lost",
        "a very long description of something that matches nothing at all",
        "\t\n",
        "Poor Security / Inside Job",
    ];
    for input in inputs {
        let first = categorize(input);
        assert!(MethodCategory::ALL.contains(&first), "input {:?}", input);
        for _ in 0..3 {
            assert_eq!(categorize(input), first);
        }
    }
}

#[test]
fn test_case_and_whitespace_insensitive() {
    assert_eq!(categorize("  HaCkEd  "), categorize("hacked"));
    assert_eq!(categorize("ZERO-DAY"), MethodCategory::VulnerabilityExploit);
}
