//! Input text preparation for embedding generation.
//!
//! Title and summary are repeated so they weigh more than the body, and the
//! body is cut to a word budget to stay inside the model's input limit. The
//! content hash is taken over the prepared text, so any change that alters
//! what the model would see marks the stored embedding as stale.

use sha2::{Digest, Sha256};

/// Times the title appears in document input
pub const TITLE_WEIGHT: usize = 3;

/// Times the summary appears in document input
pub const SUMMARY_WEIGHT: usize = 2;

/// Default body word budget
pub const DEFAULT_BODY_WORD_LIMIT: usize = 500;

/// Borrowed view of the fields that feed a document embedding
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentText<'a> {
    pub title: &'a str,
    pub summary: &'a str,
    pub tags: &'a [String],
    pub body: &'a str,
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep at most `limit` words.
pub fn truncate_words(text: &str, limit: usize) -> String {
    text.split_whitespace()
        .take(limit)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the document embedding input.
///
/// Returns `None` when every field is empty after normalization.
pub fn prepare_document(doc: DocumentText<'_>, body_word_limit: usize) -> Option<String> {
    let title = normalize(doc.title);
    let summary = normalize(doc.summary);
    let tags: Vec<String> = doc
        .tags
        .iter()
        .map(|t| normalize(t))
        .filter(|t| !t.is_empty())
        .collect();
    let body = truncate_words(doc.body, body_word_limit);

    let mut sections = Vec::new();
    if !title.is_empty() {
        sections.push(vec![title.as_str(); TITLE_WEIGHT].join(" "));
    }
    if !summary.is_empty() {
        sections.push(vec![summary.as_str(); SUMMARY_WEIGHT].join(" "));
    }
    if !tags.is_empty() {
        sections.push(format!("Tags: {}", tags.join(", ")));
    }
    if !body.is_empty() {
        sections.push(body);
    }

    if sections.is_empty() {
        None
    } else {
        Some(sections.join("\n\n"))
    }
}

/// Build the query embedding input.
pub fn prepare_query(query: &str) -> Option<String> {
    let query = normalize(query);
    (!query.is_empty()).then_some(query)
}

/// Lowercase hex SHA-256 of prepared text.
pub fn content_hash(prepared: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prepared.as_bytes());
    hex::encode(hasher.finalize())
}
