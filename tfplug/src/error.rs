//! Error types for tfplug

#[derive(Debug, thiserror::Error)]
pub enum TfplugError {
    #[error("Data source type not found: {0}")]
    DataSourceNotFound(String),

    #[error("Provider not configured")]
    ProviderNotConfigured,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("Invalid attribute path: {0}")]
    InvalidPath(String),

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Invalid regular expression {pattern:?} in filter {name:?}: {source}")]
    InvalidFilterPattern {
        name: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid filter block: {0}")]
    InvalidFilter(String),
}

pub type Result<T> = std::result::Result<T, TfplugError>;
