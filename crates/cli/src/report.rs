//! Plain-text rendering for terminal output. `--json` bypasses all of this.

use readmit_core::models::{Finding, RiskAssessment, RiskLevel};
use readmit_core::pipeline::PipelineOutput;
use std::fmt::Write;
use storage::DocumentSummary;

pub fn render_output(name: &str, output: &PipelineOutput) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {name} ({})", output.extracted.source_kind.as_str());
    if output.extracted.extraction_failed {
        let detail = output
            .extracted
            .error_detail
            .as_deref()
            .unwrap_or(output.extracted.text.as_str());
        let _ = writeln!(out, "extraction failed: {detail}");
    } else {
        let _ = writeln!(out, "extracted {} characters", output.extracted.text.chars().count());
    }
    out.push_str(&render_assessment(&output.assessment));
    out
}

pub fn render_assessment(assessment: &RiskAssessment) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "risk: {}/100 ({})",
        assessment.risk_score,
        assessment.risk_level.as_str()
    );
    let _ = writeln!(out, "{}", assessment.explanation);
    out.push_str("findings:\n");
    for finding in &assessment.findings {
        let _ = writeln!(out, "  - {}", render_finding(finding));
    }
    out.push_str("recommendations:\n");
    for (i, rec) in assessment.recommendations.iter().enumerate() {
        let _ = writeln!(out, "  {}. {rec}", i + 1);
    }
    out
}

fn render_finding(finding: &Finding) -> String {
    format!(
        "{}: {} [{}]",
        finding.finding_type,
        finding.value,
        finding.status.as_str()
    )
}

pub fn render_summaries(rows: &[DocumentSummary]) -> String {
    if rows.is_empty() {
        return "no documents\n".to_string();
    }
    let mut out = String::new();
    for row in rows {
        let doc = &row.document;
        let when = chrono::DateTime::from_timestamp(doc.created_at, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let risk = match (row.risk_score, row.risk_level) {
            (Some(score), Some(level)) => format!("{score:>3} {}", level.as_str()),
            _ => "  - pending".to_string(),
        };
        let _ = writeln!(
            out,
            "{:>5}  {when}  {risk:<10}  {}  ({})",
            doc.id, doc.name, doc.owner_id
        );
    }
    let analyzed = rows.iter().filter(|r| r.risk_level.is_some()).count();
    let high = rows
        .iter()
        .filter(|r| r.risk_level == Some(RiskLevel::High))
        .count();
    let _ = writeln!(
        out,
        "{} documents, {analyzed} analyzed, {high} high risk",
        rows.len()
    );
    out
}
