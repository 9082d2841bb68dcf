/// Folio error types
#[derive(Debug, thiserror::Error)]
pub enum FolioError {
    /// Empty or malformed input (text, query, request body)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The embedding provider failed or returned an unusable vector
    #[error("Embedding generation failed: {0}")]
    EmbeddingGenerationFailed(String),

    /// Two vectors of different length were compared or stored together
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Record store error
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FolioError {
    /// Create invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create embedding generation error
    pub fn embedding_failed<S: Into<String>>(msg: S) -> Self {
        Self::EmbeddingGenerationFailed(msg.into())
    }

    /// Create dimension mismatch error
    pub fn dimension_mismatch(expected: usize, got: usize) -> Self {
        Self::DimensionMismatch { expected, got }
    }

    /// Create not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    /// Short machine-readable error kind, used in API responses
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::EmbeddingGenerationFailed(_) => "embedding_generation_failed",
            Self::DimensionMismatch { .. } => "dimension_mismatch",
            Self::NotFound(_) => "not_found",
            Self::Config(_) => "config",
            Self::Storage(_) => "storage",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }
}

// HTTP response conversion
impl FolioError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::NotFound(_) => 404,
            Self::DimensionMismatch { .. } => 409,
            Self::EmbeddingGenerationFailed(_) => 502,
            Self::Json(_) => 400,
            Self::Config(_) | Self::Storage(_) | Self::Io(_) => 500,
        }
    }
}
