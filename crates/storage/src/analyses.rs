use anyhow::Context;
use readmit_core::collab::AnalysisSink;
use readmit_core::models::{AnalysisRecord, DocumentRecord, NewDocument, RiskLevel};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

/// A stored document with the headline numbers of its analysis, if one exists yet.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub document: DocumentRecord,
    pub risk_score: Option<u8>,
    pub risk_level: Option<RiskLevel>,
}

#[derive(Debug, Clone)]
pub struct SqliteAnalysisStore {
    pool: SqlitePool,
}

impl SqliteAnalysisStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn get_analysis(&self, document_id: i64) -> anyhow::Result<Option<AnalysisRecord>> {
        let row = sqlx::query(
            "SELECT document_id, extracted_text, extraction_failed, risk_score, risk_level,
                    explanation, findings_json, recommendations_json
             FROM document_analysis WHERE document_id = ?1",
        )
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| analysis_from_row(&r)).transpose()
    }

    /// Newest first. `owner_id = None` lists every owner.
    pub async fn list_documents(&self, owner_id: Option<&str>) -> anyhow::Result<Vec<DocumentSummary>> {
        let rows = sqlx::query(
            "SELECT d.id, d.owner_id, d.name, d.file_type, d.file_size, d.file_url, d.created_at,
                    a.risk_score, a.risk_level
             FROM documents d
             LEFT JOIN document_analysis a ON a.document_id = d.id
             WHERE ?1 IS NULL OR d.owner_id = ?1
             ORDER BY d.created_at DESC, d.id DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| -> anyhow::Result<DocumentSummary> {
                let risk_score: Option<i64> = r.try_get("risk_score")?;
                let risk_level: Option<String> = r.try_get("risk_level")?;
                Ok(DocumentSummary {
                    document: document_from_row(r)?,
                    risk_score: risk_score.map(|s| s.clamp(0, 100) as u8),
                    risk_level: risk_level.map(|l| parse_level(&l)).transpose()?,
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl AnalysisSink for SqliteAnalysisStore {
    async fn record_document(&self, doc: NewDocument) -> anyhow::Result<DocumentRecord> {
        let created_at = chrono::Utc::now().timestamp();
        let id = sqlx::query(
            "INSERT INTO documents (owner_id, name, file_type, file_size, file_url, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&doc.owner_id)
        .bind(&doc.name)
        .bind(&doc.file_type)
        .bind(doc.file_size as i64)
        .bind(&doc.file_url)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .context("insert document")?
        .last_insert_rowid();

        debug!(id, name = %doc.name, "document recorded");
        Ok(DocumentRecord {
            id,
            owner_id: doc.owner_id,
            name: doc.name,
            file_type: doc.file_type,
            file_size: doc.file_size,
            file_url: doc.file_url,
            created_at,
        })
    }

    /// Re-analysing a document replaces its previous analysis.
    async fn record_analysis(&self, record: AnalysisRecord) -> anyhow::Result<()> {
        let findings_json = serde_json::to_string(&record.findings)?;
        let recommendations_json = serde_json::to_string(&record.recommendations)?;
        sqlx::query(
            "INSERT INTO document_analysis
                (document_id, extracted_text, extraction_failed, risk_score, risk_level,
                 explanation, findings_json, recommendations_json, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, strftime('%s','now'))
             ON CONFLICT(document_id) DO UPDATE SET
                extracted_text = excluded.extracted_text,
                extraction_failed = excluded.extraction_failed,
                risk_score = excluded.risk_score,
                risk_level = excluded.risk_level,
                explanation = excluded.explanation,
                findings_json = excluded.findings_json,
                recommendations_json = excluded.recommendations_json,
                created_at = excluded.created_at",
        )
        .bind(record.document_id)
        .bind(&record.extracted_text)
        .bind(record.extraction_failed)
        .bind(record.risk_score as i64)
        .bind(record.risk_level.as_str())
        .bind(&record.explanation)
        .bind(findings_json)
        .bind(recommendations_json)
        .execute(&self.pool)
        .await
        .with_context(|| format!("insert analysis for document {}", record.document_id))?;
        Ok(())
    }
}

fn document_from_row(r: &SqliteRow) -> anyhow::Result<DocumentRecord> {
    let file_size: i64 = r.try_get("file_size")?;
    Ok(DocumentRecord {
        id: r.try_get("id")?,
        owner_id: r.try_get("owner_id")?,
        name: r.try_get("name")?,
        file_type: r.try_get("file_type")?,
        file_size: file_size.max(0) as u64,
        file_url: r.try_get("file_url")?,
        created_at: r.try_get("created_at")?,
    })
}

fn analysis_from_row(r: &SqliteRow) -> anyhow::Result<AnalysisRecord> {
    let risk_score: i64 = r.try_get("risk_score")?;
    let risk_level: String = r.try_get("risk_level")?;
    let findings_json: String = r.try_get("findings_json")?;
    let recommendations_json: String = r.try_get("recommendations_json")?;
    Ok(AnalysisRecord {
        document_id: r.try_get("document_id")?,
        extracted_text: r.try_get("extracted_text")?,
        extraction_failed: r.try_get("extraction_failed")?,
        risk_score: risk_score.clamp(0, 100) as u8,
        risk_level: parse_level(&risk_level)?,
        explanation: r.try_get("explanation")?,
        findings: serde_json::from_str(&findings_json).context("findings_json")?,
        recommendations: serde_json::from_str(&recommendations_json)
            .context("recommendations_json")?,
    })
}

fn parse_level(raw: &str) -> anyhow::Result<RiskLevel> {
    raw.parse::<RiskLevel>().map_err(anyhow::Error::msg)
}
