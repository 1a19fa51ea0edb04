use thiserror::Error;

/// Errors returned by [`GenerationService::generate`](crate::GenerationService::generate).
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No API credential was configured. Raised before any request is made.
    #[error("OpenAI API key is required")]
    MissingCredential,
    /// Any downstream failure of the language model call.
    #[error("Failed to generate code: {0}")]
    GenerationFailed(#[source] forge_llm::LanguageModelError),
}

/// Errors raised by a [`SnapshotStorage`](crate::SnapshotStorage) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The artifact pointer was asked to reference an id that is not in the
    /// history.
    #[error("Unknown artifact: {0}")]
    UnknownArtifact(String),
    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to persist state: {0}")]
    Persist(#[from] StorageError),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum CompileError {
    /// The compilation endpoint answered with an `{error}` body.
    #[error("Compilation failed: {0}")]
    Rejected(String),
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Invalid compiler response (Status {0}): {1}")]
    InvalidResponse(reqwest::StatusCode, String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Errors surfaced by a [`Studio`](crate::Studio) session.
#[derive(Debug, Error)]
pub enum StudioError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
