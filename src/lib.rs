#![deny(missing_docs)]

//! Core library for the docsearch document search assistant.

/// HTTP routing and request handlers.
pub mod api;
/// Language model chat client abstraction and Ollama adapter.
pub mod chat;
/// Environment-driven configuration management.
pub mod config;
/// Plain-text extraction for PDF, DOCX, and PPTX files.
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Search and upload activity counters.
pub mod metrics;
/// Relevance scoring, ranking, and summarization.
pub mod ranking;
/// Search service wiring the store, ranking, and summaries together.
pub mod search;
/// Uploaded document storage.
pub mod store;
