use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown endpoint `{0}`")]
    UnknownEndpoint(String),
    #[error("Endpoint `{endpoint}` has no payload template for variant `{variant}`")]
    MissingVariantTemplate { endpoint: String, variant: String },
    #[error("Unsupported HTTP method `{0}`, only GET and POST are supported")]
    UnsupportedMethod(String),
    #[error("Unknown resolution policy `{0}`, expected `per-category` or `generic`")]
    UnknownResolutionPolicy(String),
    #[error("At least one backend variant has to be configured")]
    NoVariants,
    #[error("Invalid base URL `{0}`, it should start with http:// or https:// followed by a host")]
    InvalidBaseUrl(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Endpoint `{endpoint}` template is missing required field `{field}`")]
    MissingRequiredField { endpoint: String, field: String },
    #[error("IoError: {0}")]
    IoError(#[from] io::Error),
    #[error("reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("Configuration parse error: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Configuration serialization error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
    #[error("Json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("The lock was poisoned")]
    PoisonedLock,
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Error::PoisonedLock
    }
}
