use crate::collab::{AnalysisSink, BlobStore};
use crate::config::{AppConfig, FailurePolicy};
use crate::extractor::Dispatcher;
use crate::format;
use crate::models::{AnalysisRecord, DocumentRecord, ExtractedText, NewDocument, RiskAssessment, SourceFile};
use crate::scoring::RiskEngine;
use anyhow::Context;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub extracted: ExtractedText,
    pub assessment: RiskAssessment,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub document: DocumentRecord,
    pub output: PipelineOutput,
}

pub struct Pipeline {
    dispatcher: Dispatcher,
    engine: RiskEngine,
    on_failure: FailurePolicy,
    max_parallel: usize,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

impl Pipeline {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            dispatcher: Dispatcher::new(&config.extraction),
            engine: RiskEngine::from_config(&config.scoring),
            on_failure: config.pipeline.on_extraction_failure,
            max_parallel: config.pipeline.max_parallel,
        }
    }

    pub fn with_parts(dispatcher: Dispatcher, engine: RiskEngine, on_failure: FailurePolicy) -> Self {
        Self {
            dispatcher,
            engine,
            on_failure,
            max_parallel: 1,
        }
    }

    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel;
        self
    }

    /// Extracts and scores one file. Never fails: extraction problems come back flagged
    /// on `extracted`, and scoring is total.
    pub fn run(&self, file: &SourceFile) -> PipelineOutput {
        debug!(file = %file.name, size = file.declared_size, "starting pipeline");
        let extracted = self.dispatcher.dispatch(file);

        let assessment = if extracted.extraction_failed && self.on_failure == FailurePolicy::ShortCircuit {
            warn!(file = %file.name, "extraction failed, skipping scoring");
            RiskAssessment::extraction_failed()
        } else {
            self.engine.assess(&extracted.text)
        };

        info!(
            file = %file.name,
            score = assessment.risk_score,
            risk_level = assessment.risk_level.as_str(),
            extraction_failed = extracted.extraction_failed,
            "analysis complete"
        );
        PipelineOutput { extracted, assessment }
    }

    /// Runs [`Pipeline::run`] on the blocking pool; parsing and OCR are CPU-bound.
    pub async fn run_async(self: Arc<Self>, file: SourceFile) -> anyhow::Result<PipelineOutput> {
        let output = tokio::task::spawn_blocking(move || self.run(&file))
            .await
            .context("pipeline task")?;
        Ok(output)
    }

    /// Files are independent, so they run in parallel up to `max_parallel`.
    /// Outputs come back in submission order.
    pub async fn run_batch(self: Arc<Self>, files: Vec<SourceFile>) -> anyhow::Result<Vec<PipelineOutput>> {
        let limit = Arc::new(Semaphore::new(self.max_parallel.max(1)));
        let mut handles = Vec::with_capacity(files.len());
        for file in files {
            let permit = Arc::clone(&limit).acquire_owned().await?;
            let pipeline = Arc::clone(&self);
            handles.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                pipeline.run(&file)
            }));
        }

        let mut outputs = Vec::with_capacity(handles.len());
        for handle in handles {
            outputs.push(handle.await.context("pipeline task")?);
        }
        Ok(outputs)
    }

    /// Upload flow: store the bytes, create the document, analyze, persist the analysis.
    pub async fn ingest(
        self: Arc<Self>,
        blobs: &dyn BlobStore,
        sink: &dyn AnalysisSink,
        owner_id: &str,
        file: SourceFile,
    ) -> anyhow::Result<IngestOutcome> {
        if owner_id.trim().is_empty() {
            anyhow::bail!("owner id is required to ingest {}", file.name);
        }
        if file.bytes.is_empty() {
            anyhow::bail!("invalid file: {} is empty (0 bytes)", file.name);
        }

        let file_url = blobs
            .put(owner_id, &file.name, &file.bytes)
            .await
            .with_context(|| format!("store {}", file.name))?;
        let document = sink
            .record_document(NewDocument {
                owner_id: owner_id.to_string(),
                name: file.name.clone(),
                file_type: format::suffix(&file.name).unwrap_or_default(),
                file_size: file.declared_size,
                file_url,
            })
            .await
            .with_context(|| format!("record document {}", file.name))?;

        let output = self.run_async(file).await?;
        sink.record_analysis(AnalysisRecord::new(document.id, &output.extracted, &output.assessment))
            .await
            .with_context(|| format!("record analysis for document {}", document.id))?;

        info!(document_id = document.id, owner = owner_id, "document ingested");
        Ok(IngestOutcome { document, output })
    }
}
