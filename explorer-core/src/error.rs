use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kinds of failure the recipe service reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    BadRequest,
    NotFound,
}

impl ApiErrorKind {
    pub fn status(&self) -> u16 {
        match self {
            ApiErrorKind::BadRequest => 400,
            ApiErrorKind::NotFound => 404,
        }
    }

    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            400 => Some(ApiErrorKind::BadRequest),
            404 => Some(ApiErrorKind::NotFound),
            _ => None,
        }
    }
}

/// Error half of the `{data, error}` response envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: Option<u16>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: Some(kind.status()),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::BadRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::NotFound, message)
    }

    pub fn kind(&self) -> Option<ApiErrorKind> {
        self.status.and_then(ApiErrorKind::from_status)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(ApiErrorKind::NotFound)
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode value: {0}")]
    Serialize(#[from] serde_json::Error),
}
