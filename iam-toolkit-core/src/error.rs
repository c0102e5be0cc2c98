//! Error type of the toolkit library.
//!
//! Expected IAM API failures are reported through error lists, not through this
//! type. It covers what the caller cannot continue past: required operations,
//! listing calls, configuration and aborted deletion runs.

use thiserror::Error;

use crate::aws::ApiError;
use crate::types::{IamOperation, OperationError};

#[derive(Error, Debug)]
pub enum IamToolkitError {
    #[error("{operation} failed for '{target}': {source}")]
    Api {
        operation: IamOperation,
        target: String,
        source: ApiError,
    },

    #[error("Required operation {operation} failed for '{target}': {source}")]
    RequiredOperationFailed {
        operation: IamOperation,
        target: String,
        source: ApiError,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("Password generation failed")]
    PasswordGeneration,

    #[error("Failed to delete '{name}': {}", describe(.errors))]
    DeletionAborted { name: String, errors: Vec<OperationError> },

    #[error("Gave up after {rounds} deletion rounds, still pending: {}", .pending.join(", "))]
    RetriesExhausted { rounds: u32, pending: Vec<String> },
}

fn describe(errors: &[OperationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl IamToolkitError {
    pub fn api(operation: IamOperation, target: impl Into<String>, source: ApiError) -> Self {
        Self::Api {
            operation,
            target: target.into(),
            source,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

pub type IamToolkitResult<T> = Result<T, IamToolkitError>;
