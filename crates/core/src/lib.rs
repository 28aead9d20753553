//! Core library: format detection, text extraction, risk scoring, intake pipeline.

pub mod collab;
pub mod config;
pub mod extractor;
pub mod format;
pub mod models;
pub mod pipeline;
pub mod scoring;
