//! Keyword evidence rules for readmission risk.
//!
//! Scoring is a pure function of the text: lowercase it, look for each term as a plain
//! substring (so "chronic" also hits "chronically"), sum the weights of the terms found and
//! cap at 100. Findings use their own probes and do not share the scoring counters.

use crate::config::{KeywordWeight, ScoringConfig};
use crate::models::{Finding, FindingStatus, RiskAssessment, RiskLevel};

/// High-risk terms in citation order; the High explanation names the first three found.
pub const HIGH_RISK_TERMS: &[(&str, u32)] = &[
    ("readmitted", 15),
    ("previous admission", 15),
    ("chronic", 15),
    ("diabetes", 15),
    ("heart failure", 15),
    ("copd", 15),
    ("pneumonia", 15),
    ("sepsis", 15),
    ("renal failure", 15),
    ("multiple admissions", 15),
];

pub const MEDIUM_RISK_TERMS: &[(&str, u32)] = &[
    ("hypertension", 5),
    ("elderly", 5),
    ("medication", 5),
    ("follow-up", 5),
    ("discharge", 5),
    ("treatment", 5),
    ("therapy", 5),
    ("recovery", 5),
    ("monitoring", 5),
];

pub const MAX_SCORE: u32 = 100;

const HIGH_RECOMMENDATIONS: &[&str] = &[
    "Schedule follow-up appointment within 7 days",
    "Review medication adherence and potential interactions",
    "Consider home health services for monitoring",
    "Coordinate with specialist for comprehensive care plan",
];

const MEDIUM_RECOMMENDATIONS: &[&str] = &[
    "Schedule follow-up appointment within 14 days",
    "Review medication regimen",
    "Provide patient education on warning signs",
    "Consider telehealth check-in between appointments",
];

const LOW_RECOMMENDATIONS: &[&str] = &[
    "Schedule routine follow-up appointment",
    "Provide educational materials on maintaining health",
    "Ensure patient has clear discharge instructions",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub term: String,
    pub weight: u32,
}

impl Keyword {
    fn table(entries: &[(&str, u32)]) -> Vec<Keyword> {
        entries
            .iter()
            .map(|(term, weight)| Keyword {
                term: term.to_lowercase(),
                weight: *weight,
            })
            .collect()
    }

    fn from_config(entries: &[KeywordWeight]) -> Vec<Keyword> {
        entries
            .iter()
            .map(|k| Keyword {
                term: k.term.to_lowercase(),
                weight: k.weight,
            })
            .collect()
    }
}

/// Terms of each table found in a text, in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchedTerms<'a> {
    pub high: Vec<&'a Keyword>,
    pub medium: Vec<&'a Keyword>,
}

impl MatchedTerms<'_> {
    pub fn score(&self) -> u8 {
        let total: u32 = self
            .high
            .iter()
            .chain(self.medium.iter())
            .map(|k| k.weight)
            .fold(0u32, u32::saturating_add);
        total.min(MAX_SCORE) as u8
    }
}

#[derive(Debug, Clone)]
pub struct RiskEngine {
    high: Vec<Keyword>,
    medium: Vec<Keyword>,
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self {
            high: Keyword::table(HIGH_RISK_TERMS),
            medium: Keyword::table(MEDIUM_RISK_TERMS),
        }
    }
}

impl RiskEngine {
    pub fn new(high: Vec<Keyword>, medium: Vec<Keyword>) -> Self {
        Self { high, medium }
    }

    pub fn from_config(cfg: &ScoringConfig) -> Self {
        let defaults = Self::default();
        Self {
            high: cfg
                .high_risk
                .as_deref()
                .map(Keyword::from_config)
                .unwrap_or(defaults.high),
            medium: cfg
                .medium_risk
                .as_deref()
                .map(Keyword::from_config)
                .unwrap_or(defaults.medium),
        }
    }

    /// `lowered` must already be lowercase.
    fn matches<'a>(&'a self, lowered: &str) -> MatchedTerms<'a> {
        MatchedTerms {
            high: self
                .high
                .iter()
                .filter(|k| lowered.contains(k.term.as_str()))
                .collect(),
            medium: self
                .medium
                .iter()
                .filter(|k| lowered.contains(k.term.as_str()))
                .collect(),
        }
    }

    pub fn matched_terms<'a>(&'a self, text: &str) -> MatchedTerms<'a> {
        self.matches(&text.to_lowercase())
    }

    pub fn assess(&self, text: &str) -> RiskAssessment {
        let lowered = text.to_lowercase();
        let matched = self.matches(&lowered);
        let risk_score = matched.score();
        let risk_level = RiskLevel::from_score(risk_score);

        RiskAssessment {
            risk_score,
            risk_level,
            explanation: explanation(risk_level, &matched),
            findings: findings(&lowered),
            recommendations: recommendations(risk_level),
        }
    }
}

/// Scores `text` with the built-in keyword tables.
pub fn assess(text: &str) -> RiskAssessment {
    RiskEngine::default().assess(text)
}

fn explanation(level: RiskLevel, matched: &MatchedTerms<'_>) -> String {
    match level {
        RiskLevel::High => {
            let cited = matched
                .high
                .iter()
                .take(3)
                .map(|k| k.term.as_str())
                .collect::<Vec<_>>();
            if cited.is_empty() {
                "Patient shows multiple high-risk factors. Close monitoring and follow-up recommended."
                    .to_string()
            } else {
                format!(
                    "Patient shows multiple high-risk factors including {}. Close monitoring and follow-up recommended.",
                    cited.join(", ")
                )
            }
        }
        RiskLevel::Medium => "Patient has some risk factors that may increase readmission likelihood. Regular follow-up appointments advised.".to_string(),
        RiskLevel::Low => "Patient shows few risk factors for readmission. Standard follow-up procedures recommended.".to_string(),
    }
}

fn findings(lowered: &str) -> Vec<Finding> {
    let mut out = Vec::new();
    if lowered.contains("diabetes") {
        out.push(Finding::new("Diabetes", "Present", FindingStatus::Monitor));
    }
    if lowered.contains("hypertension") {
        out.push(Finding::new("Hypertension", "Present", FindingStatus::Monitor));
    }
    if lowered.contains("heart") && (lowered.contains("failure") || lowered.contains("disease")) {
        out.push(Finding::new("Heart Condition", "Present", FindingStatus::HighRisk));
    }
    if lowered.contains("medication") {
        out.push(Finding::new(
            "Medication Adherence",
            "Needs Review",
            FindingStatus::Monitor,
        ));
    }
    if out.is_empty() {
        out.push(general_finding());
    }
    out
}

fn general_finding() -> Finding {
    Finding::new("General Health", "Needs Assessment", FindingStatus::Review)
}

pub fn recommendations(level: RiskLevel) -> Vec<String> {
    let list = match level {
        RiskLevel::High => HIGH_RECOMMENDATIONS,
        RiskLevel::Medium => MEDIUM_RECOMMENDATIONS,
        RiskLevel::Low => LOW_RECOMMENDATIONS,
    };
    list.iter().map(|s| s.to_string()).collect()
}

impl RiskAssessment {
    /// Fixed result used when the pipeline is told not to score failed extractions.
    pub fn extraction_failed() -> Self {
        Self {
            risk_score: 0,
            risk_level: RiskLevel::Low,
            explanation: "Text could not be extracted from this document, so no risk factors were evaluated. Review the source document manually.".to_string(),
            findings: vec![general_finding()],
            recommendations: recommendations(RiskLevel::Low),
        }
    }
}
