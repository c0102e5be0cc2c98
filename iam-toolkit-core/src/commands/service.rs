//! IAM Toolkit Service Layer
//!
//! The service is the explicit context every operation runs against: the IAM API
//! client, the compiled group policy and the toolkit settings. Adapters (the CLI,
//! tests) construct one and call the operations in `users`, `groups` and
//! `access_keys` on it.

use std::sync::Arc;

use crate::aws::{AwsIamClient, IamApi};
use crate::config::ToolkitConfig;
use crate::error::IamToolkitResult;
use crate::policy::GroupPolicy;
use crate::retry::DeletionDriver;

pub struct IamToolkitService {
    pub(crate) client: Arc<dyn IamApi>,
    pub(crate) policy: GroupPolicy,
    pub(crate) config: ToolkitConfig,
}

impl IamToolkitService {
    /// Create a service backed by the AWS SDK.
    ///
    /// Credentials come from the default provider chain, narrowed to the profile and
    /// region of `config.aws` when set.
    ///
    /// # Errors
    ///
    /// Returns an error if the group policy in `config` does not compile.
    pub async fn new(config: ToolkitConfig) -> IamToolkitResult<Self> {
        let policy = GroupPolicy::from_settings(&config.groups)?;
        let client = AwsIamClient::from_settings(&config.aws).await;
        Ok(Self {
            client: Arc::new(client),
            policy,
            config,
        })
    }

    /// Create a service on top of any [`IamApi`] implementation
    pub fn with_client(client: Arc<dyn IamApi>, config: ToolkitConfig) -> IamToolkitResult<Self> {
        let policy = GroupPolicy::from_settings(&config.groups)?;
        Ok(Self {
            client,
            policy,
            config,
        })
    }

    pub fn config(&self) -> &ToolkitConfig {
        &self.config
    }

    pub fn policy(&self) -> &GroupPolicy {
        &self.policy
    }

    /// Deletion driver configured from the retry settings
    pub fn deletion_driver(&self) -> DeletionDriver {
        DeletionDriver::from_settings(&self.config.retry)
    }
}
