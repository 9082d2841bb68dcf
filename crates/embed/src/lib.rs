//! Folio embedding generation
//!
//! Gemini embedding client and input text preparation

mod client;
pub mod prepare;
mod provider;
mod types;

pub use client::GeminiClient;
pub use prepare::{content_hash, prepare_document, prepare_query, DocumentText};
pub use provider::EmbeddingProvider;
pub use types::{EmbedContentRequest, EmbedContentResponse, TaskType};
