//! AWS IAM client wrapper: implements [`IamApi`] on top of `aws-sdk-iam`.
//!
//! Every SDK failure is flattened into an [`ApiError`] carrying the service error
//! code, which is what the operation wrappers and the deletion driver classify on.

use async_trait::async_trait;
use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_iam::Client as IamClient;
use chrono::{DateTime, Utc};

use crate::aws::{codes, ApiError, ApiResult, IamApi};
use crate::config::AwsSettings;
use crate::types::{AccessKeyDescriptor, AccessKeyPair};

pub struct AwsIamClient {
    client: IamClient,
}

impl AwsIamClient {
    pub fn new(client: IamClient) -> Self {
        Self { client }
    }

    /// Build a client from the default credential provider chain, optionally pinned
    /// to a named profile and region.
    pub async fn from_settings(settings: &AwsSettings) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(profile) = &settings.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &settings.region {
            loader = loader.region(aws_sdk_iam::config::Region::new(region.clone()));
        }
        let config = loader.load().await;
        Self::new(IamClient::new(&config))
    }
}

/// Reduce an SDK error to its service code and message
fn api_error<E, R>(err: SdkError<E, R>) -> ApiError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().unwrap_or(codes::UNKNOWN).to_string();
    let message = match err.message() {
        Some(message) => message.to_string(),
        None => DisplayErrorContext(&err).to_string(),
    };
    ApiError { code, message }
}

fn to_utc(date: &aws_sdk_iam::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(date.secs(), date.subsec_nanos())
}

#[async_trait]
impl IamApi for AwsIamClient {
    async fn create_user(&self, user_name: &str) -> ApiResult<()> {
        self.client
            .create_user()
            .user_name(user_name)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn delete_user(&self, user_name: &str) -> ApiResult<()> {
        self.client
            .delete_user()
            .user_name(user_name)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn add_user_to_group(&self, user_name: &str, group_name: &str) -> ApiResult<()> {
        self.client
            .add_user_to_group()
            .group_name(group_name)
            .user_name(user_name)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn remove_user_from_group(&self, user_name: &str, group_name: &str) -> ApiResult<()> {
        self.client
            .remove_user_from_group()
            .group_name(group_name)
            .user_name(user_name)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn list_groups_for_user(&self, user_name: &str) -> ApiResult<Vec<String>> {
        let groups = self
            .client
            .list_groups_for_user()
            .user_name(user_name)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .map_err(api_error)?;
        Ok(groups.into_iter().map(|group| group.group_name).collect())
    }

    async fn create_group(&self, group_name: &str) -> ApiResult<()> {
        self.client
            .create_group()
            .group_name(group_name)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn delete_group(&self, group_name: &str) -> ApiResult<()> {
        self.client
            .delete_group()
            .group_name(group_name)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn list_groups(&self) -> ApiResult<Vec<String>> {
        let groups = self
            .client
            .list_groups()
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .map_err(api_error)?;
        Ok(groups.into_iter().map(|group| group.group_name).collect())
    }

    async fn list_access_keys(&self, user_name: &str) -> ApiResult<Vec<AccessKeyDescriptor>> {
        let keys = self
            .client
            .list_access_keys()
            .user_name(user_name)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .map_err(api_error)?;

        Ok(keys
            .into_iter()
            .map(|key| AccessKeyDescriptor {
                access_key_id: key.access_key_id().unwrap_or_default().to_string(),
                status: key
                    .status()
                    .map(|status| status.as_str().to_string())
                    .unwrap_or_default(),
                created: key.create_date().and_then(to_utc),
            })
            .collect())
    }

    async fn create_access_key(&self, user_name: &str) -> ApiResult<AccessKeyPair> {
        let response = self
            .client
            .create_access_key()
            .user_name(user_name)
            .send()
            .await
            .map_err(api_error)?;

        let key = response.access_key.ok_or_else(|| {
            ApiError::new(
                codes::UNKNOWN,
                format!("CreateAccessKey response for '{user_name}' carried no access key"),
            )
        })?;
        Ok(AccessKeyPair::new(key.access_key_id, key.secret_access_key))
    }

    async fn delete_access_key(&self, user_name: &str, access_key_id: &str) -> ApiResult<()> {
        self.client
            .delete_access_key()
            .user_name(user_name)
            .access_key_id(access_key_id)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn create_login_profile(
        &self,
        user_name: &str,
        password: &str,
        password_reset_required: bool,
    ) -> ApiResult<()> {
        self.client
            .create_login_profile()
            .user_name(user_name)
            .password(password)
            .password_reset_required(password_reset_required)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn delete_login_profile(&self, user_name: &str) -> ApiResult<()> {
        self.client
            .delete_login_profile()
            .user_name(user_name)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }
    async fn list_mfa_devices(&self, user_name: &str) -> ApiResult<Vec<String>> {
        let devices = self
            .client
            .list_mfa_devices()
            .user_name(user_name)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .map_err(api_error)?;
        Ok(devices
            .into_iter()
            .map(|device| device.serial_number)
            .collect())
    }

    async fn deactivate_mfa_device(&self, user_name: &str, serial_number: &str) -> ApiResult<()> {
        self.client
            .deactivate_mfa_device()
            .user_name(user_name)
            .serial_number(serial_number)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn delete_virtual_mfa_device(&self, serial_number: &str) -> ApiResult<()> {
        self.client
            .delete_virtual_mfa_device()
            .serial_number(serial_number)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn list_user_policies(&self, user_name: &str) -> ApiResult<Vec<String>> {
        self.client
            .list_user_policies()
            .user_name(user_name)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .map_err(api_error)
    }

    async fn delete_user_policy(&self, user_name: &str, policy_name: &str) -> ApiResult<()> {
        self.client
            .delete_user_policy()
            .user_name(user_name)
            .policy_name(policy_name)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn list_attached_user_policies(&self, user_name: &str) -> ApiResult<Vec<String>> {
        let policies = self
            .client
            .list_attached_user_policies()
            .user_name(user_name)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .map_err(api_error)?;
        Ok(policies
            .into_iter()
            .filter_map(|policy| policy.policy_arn)
            .collect())
    }

    async fn detach_user_policy(&self, user_name: &str, policy_arn: &str) -> ApiResult<()> {
        self.client
            .detach_user_policy()
            .user_name(user_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn list_signing_certificates(&self, user_name: &str) -> ApiResult<Vec<String>> {
        let certificates = self
            .client
            .list_signing_certificates()
            .user_name(user_name)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .map_err(api_error)?;
        Ok(certificates
            .into_iter()
            .map(|certificate| certificate.certificate_id)
            .collect())
    }

    async fn delete_signing_certificate(
        &self,
        user_name: &str,
        certificate_id: &str,
    ) -> ApiResult<()> {
        self.client
            .delete_signing_certificate()
            .user_name(user_name)
            .certificate_id(certificate_id)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn list_ssh_public_keys(&self, user_name: &str) -> ApiResult<Vec<String>> {
        let keys = self
            .client
            .list_ssh_public_keys()
            .user_name(user_name)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .map_err(api_error)?;
        Ok(keys.into_iter().map(|key| key.ssh_public_key_id).collect())
    }

    async fn delete_ssh_public_key(
        &self,
        user_name: &str,
        ssh_public_key_id: &str,
    ) -> ApiResult<()> {
        self.client
            .delete_ssh_public_key()
            .user_name(user_name)
            .ssh_public_key_id(ssh_public_key_id)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }
}
