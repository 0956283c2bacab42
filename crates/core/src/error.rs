#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unknown document type: {0}")]
    UnknownDocumentType(String),
    #[error("unknown section kind: {0}")]
    UnknownSectionKind(String),
    #[error("unknown input format: {0}")]
    UnknownInputFormat(String),
    #[error("unknown output format: {0}")]
    UnknownOutputFormat(String),
    #[error("{kind} schema mismatch at {path}: {message}")]
    SchemaMismatch {
        kind: &'static str,
        path: String,
        message: String,
    },
    #[error("failed to serialize JSON: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to render CDA: {0}")]
    Render(#[from] cda_model::CdaError),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
