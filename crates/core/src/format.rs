//! Maps upload filenames to the closed set of document kinds the extractors understand.

use serde::{Deserialize, Serialize};

pub const SUPPORTED_SUFFIXES: &[&str] = &["jpg", "jpeg", "png", "pdf", "doc", "docx"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Image,
    Pdf,
    WordDoc,
    Unsupported,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Image => "image",
            DocumentKind::Pdf => "pdf",
            DocumentKind::WordDoc => "word_doc",
            DocumentKind::Unsupported => "unsupported",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, DocumentKind::Unsupported)
    }
}

/// Lowercased text after the last `.`, or `None` when the name has no dot.
pub fn suffix(name: &str) -> Option<String> {
    name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

pub fn detect(name: &str) -> DocumentKind {
    suffix(name)
        .map(|ext| match ext.as_str() {
            "jpg" | "jpeg" | "png" => DocumentKind::Image,
            "pdf" => DocumentKind::Pdf,
            "doc" | "docx" => DocumentKind::WordDoc,
            _ => DocumentKind::Unsupported,
        })
        .unwrap_or(DocumentKind::Unsupported)
}
