use readmit_core::models::{Finding, FindingStatus, RiskLevel};
use readmit_core::scoring::{self, assess, RiskEngine, HIGH_RISK_TERMS, MEDIUM_RISK_TERMS};

fn finding(t: &str, v: &str, s: FindingStatus) -> Finding {
    Finding::new(t, v, s)
}

#[test]
fn empty_text_is_low_with_fallback_finding() {
    let a = assess("");
    assert_eq!(a.risk_score, 0);
    assert_eq!(a.risk_level, RiskLevel::Low);
    assert_eq!(
        a.findings,
        vec![finding("General Health", "Needs Assessment", FindingStatus::Review)]
    );
    assert_eq!(a.recommendations.len(), 3);
    assert_eq!(
        a.explanation,
        "Patient shows few risk factors for readmission. Standard follow-up procedures recommended."
    );
}

#[test]
fn mixed_conditions_score_medium() {
    // diabetes, chronic and sepsis are high-risk (3 x 15); hypertension is medium (5).
    let a = assess("History: Diabetes, hypertension, chronic kidney disease, recent sepsis.");
    assert_eq!(a.risk_score, 50);
    assert_eq!(a.risk_level, RiskLevel::Medium);
    assert!(a
        .findings
        .contains(&finding("Diabetes", "Present", FindingStatus::Monitor)));
    assert!(a
        .findings
        .contains(&finding("Hypertension", "Present", FindingStatus::Monitor)));
    assert_eq!(a.recommendations.len(), 4);
    assert_eq!(a.recommendations[0], "Schedule follow-up appointment within 14 days");
}

#[test]
fn high_explanation_cites_first_three_terms_in_table_order() {
    let text = "COPD exacerbation. Heart failure. Diabetes. Chronic pain. Patient was readmitted twice.";
    let a = assess(text);
    assert_eq!(a.risk_score, 75);
    assert_eq!(a.risk_level, RiskLevel::High);
    assert_eq!(
        a.explanation,
        "Patient shows multiple high-risk factors including readmitted, chronic, diabetes. Close monitoring and follow-up recommended."
    );
    assert_eq!(a.recommendations.len(), 4);
    assert_eq!(a.recommendations[0], "Schedule follow-up appointment within 7 days");
    assert!(a
        .findings
        .contains(&finding("Heart Condition", "Present", FindingStatus::HighRisk)));
}

#[test]
fn score_is_capped_at_one_hundred() {
    let everything = HIGH_RISK_TERMS
        .iter()
        .chain(MEDIUM_RISK_TERMS)
        .map(|(t, _)| *t)
        .collect::<Vec<_>>()
        .join(" ");
    let a = assess(&everything);
    assert_eq!(a.risk_score, 100);
    assert_eq!(a.risk_level, RiskLevel::High);
}

#[test]
fn matching_is_case_insensitive_substring() {
    let engine = RiskEngine::default();
    let matched = engine.matched_terms("CHRONICALLY ill, post-discharged");
    let high: Vec<&str> = matched.high.iter().map(|k| k.term.as_str()).collect();
    let medium: Vec<&str> = matched.medium.iter().map(|k| k.term.as_str()).collect();
    assert_eq!(high, vec!["chronic"]);
    assert_eq!(medium, vec!["discharge"]);
    assert_eq!(matched.score(), 20);
}

#[test]
fn repeated_terms_count_once() {
    assert_eq!(assess("sepsis sepsis sepsis").risk_score, 15);
}

#[test]
fn heart_probe_needs_failure_or_disease() {
    let only_heart = assess("heart rate normal");
    assert!(!only_heart
        .findings
        .iter()
        .any(|f| f.finding_type == "Heart Condition"));

    // "renal failure" supplies the "failure" probe on its own.
    let split = assess("heart sounds regular; renal failure noted");
    assert!(split
        .findings
        .iter()
        .any(|f| f.finding_type == "Heart Condition"));
}

#[test]
fn medication_probe_adds_adherence_finding() {
    let a = assess("Medication list reviewed");
    assert_eq!(
        a.findings,
        vec![finding("Medication Adherence", "Needs Review", FindingStatus::Monitor)]
    );
}

#[test]
fn level_thresholds_are_inclusive_on_upper_band() {
    for score in 0u8..=100 {
        let expected = match score {
            0..=29 => RiskLevel::Low,
            30..=69 => RiskLevel::Medium,
            _ => RiskLevel::High,
        };
        assert_eq!(RiskLevel::from_score(score), expected, "score {score}");
    }
}

#[test]
fn invariants_hold_across_sample_texts() {
    let samples = [
        "",
        "Error extracting text: PDF parsing failed: invalid file header",
        "Unsupported file type: txt",
        "elderly patient, therapy and monitoring during recovery",
        "pneumonia, sepsis, copd, renal failure, multiple admissions, previous admission",
        "héart fäilure ✓ diabetes",
    ];
    for text in samples {
        let a = assess(text);
        assert!(a.risk_score <= 100);
        assert_eq!(a.risk_level, RiskLevel::from_score(a.risk_score));
        assert!(!a.findings.is_empty());
        let expected_recs = match a.risk_level {
            RiskLevel::High | RiskLevel::Medium => 4,
            RiskLevel::Low => 3,
        };
        assert_eq!(a.recommendations.len(), expected_recs);
        assert_eq!(a.recommendations, scoring::recommendations(a.risk_level));
        assert_eq!(assess(text), a, "assess must be deterministic");
    }
}

#[test]
fn serializes_with_persistence_field_names() {
    let a = assess("diabetes and heart disease");
    let json = serde_json::to_value(&a).unwrap();
    assert_eq!(json["riskScore"], 15);
    assert_eq!(json["riskLevel"], "low");
    assert_eq!(json["findings"][1]["type"], "Heart Condition");
    assert_eq!(json["findings"][1]["status"], "High Risk");
}
