//! AWS SDK integration: the IAM API seam, its error type, and the SDK-backed client.

pub(crate) mod api;
pub(crate) mod iam_client;

use serde::Serialize;
use thiserror::Error;

pub use api::IamApi;
pub use iam_client::AwsIamClient;

/// Error codes returned by the IAM API that the toolkit reacts to.
pub mod codes {
    pub const ENTITY_ALREADY_EXISTS: &str = "EntityAlreadyExists";
    pub const ENTITY_TEMPORARILY_UNMODIFIABLE: &str = "EntityTemporarilyUnmodifiable";
    pub const DELETE_CONFLICT: &str = "DeleteConflict";
    pub const NO_SUCH_ENTITY: &str = "NoSuchEntity";
    /// Used when the SDK error carries no code (transport failures, malformed responses).
    pub const UNKNOWN: &str = "Unknown";
}

/// A failed IAM API call, reduced to its machine-readable code and message.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
#[error("{code}: {message}")]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
