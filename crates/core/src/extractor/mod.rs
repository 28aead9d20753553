//! Format-specific text extraction and the dispatcher that routes uploads to it.
//!
//! Strategies return `Result`; the dispatcher is the boundary where failures turn into
//! `ExtractedText` values with `extraction_failed` set. Nothing above it sees an error.

mod image;
mod pdf;
mod word;

pub use self::image::ImageExtractor;
pub use self::pdf::PdfExtractor;
pub use self::word::{body_text, WordExtractor};

use crate::config::ExtractionConfig;
use crate::format::DocumentKind;
use crate::models::{ExtractedText, SourceFile};
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("file is {size} bytes, above the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
    #[error("{0} support is not enabled in this build")]
    FeatureDisabled(&'static str),
    #[error("image decoding failed: {0}")]
    Image(String),
    #[error("OCR failed: {0}")]
    Ocr(String),
    #[error("PDF parsing failed: {0}")]
    Pdf(String),
    #[error("document parsing failed: {0}")]
    Word(String),
    #[error("extractor panicked: {0}")]
    Panicked(String),
}

/// Produces plain text from the bytes of one known document kind.
pub trait TextExtractor: Send + Sync {
    fn kind(&self) -> DocumentKind;
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

pub struct Dispatcher {
    image: Box<dyn TextExtractor>,
    pdf: Box<dyn TextExtractor>,
    word: Box<dyn TextExtractor>,
    max_file_bytes: Option<u64>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

impl Dispatcher {
    pub fn new(cfg: &ExtractionConfig) -> Self {
        Self {
            image: Box::new(ImageExtractor::new(
                &cfg.ocr_language,
                cfg.tessdata_dir.as_deref(),
            )),
            pdf: Box::new(PdfExtractor),
            word: Box::new(WordExtractor),
            max_file_bytes: cfg.max_file_bytes,
        }
    }

    /// Replaces the strategy registered for `extractor.kind()`.
    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        match extractor.kind() {
            DocumentKind::Image => self.image = extractor,
            DocumentKind::Pdf => self.pdf = extractor,
            DocumentKind::WordDoc => self.word = extractor,
            DocumentKind::Unsupported => {
                warn!("ignoring extractor registered for unsupported kind");
            }
        }
        self
    }

    fn strategy(&self, kind: DocumentKind) -> Option<&dyn TextExtractor> {
        match kind {
            DocumentKind::Image => Some(self.image.as_ref()),
            DocumentKind::Pdf => Some(self.pdf.as_ref()),
            DocumentKind::WordDoc => Some(self.word.as_ref()),
            DocumentKind::Unsupported => None,
        }
    }

    pub fn dispatch(&self, file: &SourceFile) -> ExtractedText {
        let kind = file.kind();
        let Some(strategy) = self.strategy(kind) else {
            warn!(file = %file.name, "unsupported file type");
            return ExtractedText::unsupported(file.suffix().as_deref());
        };

        let size = file.bytes.len() as u64;
        if let Some(limit) = self.max_file_bytes {
            if size > limit {
                let err = ExtractionError::TooLarge { size, limit };
                warn!(file = %file.name, error = %err, "extraction skipped");
                return ExtractedText::failed(kind, err.to_string());
            }
        }

        if let Some(sniffed) = infer::get(&file.bytes) {
            debug!(file = %file.name, kind = kind.as_str(), mime = sniffed.mime_type(), "sniffed content type");
        }

        match run_guarded(strategy, &file.bytes) {
            Ok(text) => {
                info!(file = %file.name, kind = kind.as_str(), chars = text.len(), "extracted text");
                ExtractedText::ok(kind, text)
            }
            Err(err) => {
                warn!(file = %file.name, kind = kind.as_str(), error = %err, "extraction failed");
                ExtractedText::failed(kind, err.to_string())
            }
        }
    }
}

// Third-party parsers can panic on malformed input; a panic is one more extraction failure.
fn run_guarded(strategy: &dyn TextExtractor, bytes: &[u8]) -> Result<String, ExtractionError> {
    match panic::catch_unwind(AssertUnwindSafe(|| strategy.extract(bytes))) {
        Ok(result) => result,
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(ExtractionError::Panicked(msg))
        }
    }
}
