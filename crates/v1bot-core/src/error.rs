use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("no response from tracker")]
    TransportUnavailable,

    #[error("malformed tracker response: missing {field}")]
    MalformedResponse { field: String },

    #[error("unknown asset type code: {0}")]
    UnknownTypeCode(String),

    #[error("malformed display id: {0}")]
    MalformedId(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("no mapping for '{key}' in domain '{domain}'")]
    MappingKeyAbsent { domain: String, key: String },

    #[error("invalid mapping domain name: {0}")]
    InvalidDomainName(String),

    #[error("tracker config not found: {}", .0.display())]
    ConfigMissing(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid XML in tracker response: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl TrackerError {
    /// A document was present but an expected attribute or element was not.
    pub fn malformed(field: impl Into<String>) -> Self {
        TrackerError::MalformedResponse {
            field: field.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
