use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of a retrieval pair a piece of text is on.
///
/// Document and query embeddings may be encoded differently by the model but
/// share one vector space, so they stay comparable with cosine similarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    RetrievalDocument,
    RetrievalQuery,
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetrievalDocument => write!(f, "document"),
            Self::RetrievalQuery => write!(f, "query"),
        }
    }
}

/// Gemini `embedContent` request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedContentRequest {
    /// Fully qualified model name (e.g., "models/text-embedding-004")
    pub model: String,

    /// Content to embed
    pub content: Content,

    /// Retrieval task type
    pub task_type: TaskType,

    /// Truncate output to this many dimensions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dimensionality: Option<usize>,
}

/// Gemini content block
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub text: String,
}

impl Content {
    /// Single text part
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part { text: text.into() }],
        }
    }
}

/// Gemini `embedContent` response
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedContentResponse {
    pub embedding: ContentEmbedding,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentEmbedding {
    #[serde(default)]
    pub values: Vec<f32>,
}

/// Gemini error envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: u16,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let request = EmbedContentRequest {
            model: "models/text-embedding-004".to_string(),
            content: Content::text("hello"),
            task_type: TaskType::RetrievalQuery,
            output_dimensionality: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["taskType"], "RETRIEVAL_QUERY");
        assert_eq!(json["content"]["parts"][0]["text"], "hello");
        assert!(json.get("outputDimensionality").is_none());
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"embedding":{"values":[0.25,-0.5,1.0]}}"#;
        let response: EmbedContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.embedding.values, vec![0.25, -0.5, 1.0]);
    }

    #[test]
    fn test_error_envelope_parsing() {
        let body = r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#;
        let response: ApiErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.error.code, 429);
        assert_eq!(response.error.status, "RESOURCE_EXHAUSTED");
    }
}
