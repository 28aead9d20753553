//! Collaborators the intake flow hands its results to. The core only defines the seams;
//! the `storage` crate provides the implementations.

use crate::models::{AnalysisRecord, DocumentRecord, NewDocument};

#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores the uploaded bytes and returns a durable reference to them.
    async fn put(&self, owner_id: &str, filename: &str, bytes: &[u8]) -> anyhow::Result<String>;
}

#[async_trait::async_trait]
pub trait AnalysisSink: Send + Sync {
    /// Creates the document row; the sink issues the id.
    async fn record_document(&self, doc: NewDocument) -> anyhow::Result<DocumentRecord>;
    async fn record_analysis(&self, record: AnalysisRecord) -> anyhow::Result<()>;
}
