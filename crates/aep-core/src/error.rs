use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}

/// Failures while obtaining a document from a file or URL.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("schema {0:?} not found")]
    SchemaNotFound(String),

    #[error("circular reference detected: {0}")]
    CircularRef(String),

    #[error("no definition named {0:?}")]
    NotADefinition(String),
}

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("parameter {name} not found in parameters")]
    MissingParameter { name: String },

    #[error("malformed resource pattern {pattern:?}: {reason}")]
    Malformed { pattern: String, reason: String },
}

/// Failures while collecting resources from an API description.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("resource {resource:?} parent {parent:?} not found")]
    ParentNotFound { resource: String, parent: String },

    #[error("resource {0:?} is its own ancestor")]
    ParentCycle(String),

    #[error("custom method {0} has a POST response but no request body")]
    MissingRequestBody(String),

    #[error("resource {0:?} not found")]
    ResourceNotFound(String),
}

/// Errors surfaced by [`crate::client::Client`] operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    #[error(transparent)]
    Path(#[from] PatternError),

    #[error("failed to serialize request body")]
    BodySerialization(#[source] serde_json::Error),

    #[error("failed to decode response body")]
    Decode(#[source] serde_json::Error),

    #[error("returned errors, {0}")]
    Api(serde_json::Value),

    #[error("no valid list key was found for {plural:?}")]
    NoListKeyFound { plural: String },

    #[error("invalid request URL")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid request")]
    InvalidRequest(#[from] http::Error),

    #[error(transparent)]
    Transport(Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
}
