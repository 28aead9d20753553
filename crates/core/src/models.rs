use crate::format::{self, DocumentKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An uploaded document as handed to the pipeline. Never mutated by the core.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub declared_size: u64,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let declared_size = bytes.len() as u64;
        Self {
            name: name.into(),
            bytes,
            declared_size,
        }
    }

    pub async fn from_path(path: &Path) -> anyhow::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, bytes))
    }

    pub fn suffix(&self) -> Option<String> {
        format::suffix(&self.name)
    }

    pub fn kind(&self) -> DocumentKind {
        format::detect(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedText {
    pub text: String,
    pub source_kind: DocumentKind,
    pub extraction_failed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl ExtractedText {
    pub fn ok(kind: DocumentKind, text: String) -> Self {
        Self {
            text,
            source_kind: kind,
            extraction_failed: false,
            error_detail: None,
        }
    }

    /// `text` carries the sentinel; `error_detail` carries the cause.
    pub fn failed(kind: DocumentKind, detail: String) -> Self {
        Self {
            text: format!("Error extracting text: {detail}"),
            source_kind: kind,
            extraction_failed: true,
            error_detail: Some(detail),
        }
    }

    pub fn unsupported(suffix: Option<&str>) -> Self {
        let suffix = suffix.unwrap_or_default();
        Self {
            text: format!("Unsupported file type: {suffix}"),
            source_kind: DocumentKind::Unsupported,
            extraction_failed: true,
            error_detail: Some(format!("no extractor for suffix '{suffix}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingStatus {
    Normal,
    Monitor,
    Elevated,
    #[serde(rename = "High Risk")]
    HighRisk,
    Review,
}

impl FindingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingStatus::Normal => "Normal",
            FindingStatus::Monitor => "Monitor",
            FindingStatus::Elevated => "Elevated",
            FindingStatus::HighRisk => "High Risk",
            FindingStatus::Review => "Review",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub finding_type: String,
    pub value: String,
    pub status: FindingStatus,
}

impl Finding {
    pub fn new(finding_type: &str, value: &str, status: FindingStatus) -> Self {
        Self {
            finding_type: finding_type.to_string(),
            value: value.to_string(),
            status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Band boundaries are inclusive on the upper band: 30 is Medium, 70 is High.
    pub fn from_score(score: u8) -> Self {
        if score >= 70 {
            RiskLevel::High
        } else if score >= 30 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(format!("unknown risk level: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub explanation: String,
    pub findings: Vec<Finding>,
    pub recommendations: Vec<String>,
}

/// What the upload flow asks the persistence collaborator to create before analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
    pub owner_id: String,
    pub name: String,
    pub file_type: String,
    pub file_size: u64,
    pub file_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: i64,
    pub owner_id: String,
    pub name: String,
    pub file_type: String,
    pub file_size: u64,
    pub file_url: String,
    pub created_at: i64,
}

/// Persistence payload for one analysis, keyed by the caller-issued document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub document_id: i64,
    pub extracted_text: String,
    pub extraction_failed: bool,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub explanation: String,
    pub findings: Vec<Finding>,
    pub recommendations: Vec<String>,
}

impl AnalysisRecord {
    pub fn new(document_id: i64, extracted: &ExtractedText, assessment: &RiskAssessment) -> Self {
        Self {
            document_id,
            extracted_text: extracted.text.clone(),
            extraction_failed: extracted.extraction_failed,
            risk_score: assessment.risk_score,
            risk_level: assessment.risk_level,
            explanation: assessment.explanation.clone(),
            findings: assessment.findings.clone(),
            recommendations: assessment.recommendations.clone(),
        }
    }
}
