//! This crate provides the core logic of the IAM toolkit:
//! - IAM user, group and access-key operations that report failures as error lists
//! - Group naming/membership policy and regex-based group categorisation
//! - Retry-on-conflict deletion of users and groups
//!

mod aws;
pub mod commands;
mod config;
mod error;
mod password;
pub mod policy;
mod retry;
mod types;

#[cfg(test)]
mod testing;

// Re-exports for a small, focused public API
pub use aws::{codes, ApiError, ApiResult, AwsIamClient, IamApi};
pub use commands::{IamToolkitService, Teardown, TeardownReport};
pub use config::{
    AwsSettings, GroupPolicySettings, PasswordSettings, RetrySettings, ToolkitConfig,
    DEFAULT_RETRY_DELAY_SECS,
};
pub use error::{IamToolkitError, IamToolkitResult};
pub use password::{generate_password, DEFAULT_PASSWORD_LENGTH};
pub use policy::{init_group_category_regex, GroupCategories, GroupPolicy};
pub use retry::{classify, DeletionDriver, ErrorClass, TRANSIENT_ERROR_CODES};
pub use types::{
    AccessKeyDescriptor, AccessKeyPair, CreateUserOptions, DeletionReport, ErrorList,
    ErrorListExt, GroupSelection, IamOperation, OperationError, Requirement, UserCreation,
};
