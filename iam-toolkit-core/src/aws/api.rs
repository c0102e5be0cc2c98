//! The subset of the IAM API the toolkit calls.
//!
//! Operations are expressed as a trait so the service layer can run against the
//! real SDK client or an in-memory double.

use async_trait::async_trait;

use crate::aws::ApiResult;
use crate::types::{AccessKeyDescriptor, AccessKeyPair};

#[async_trait]
pub trait IamApi: Send + Sync {
    async fn create_user(&self, user_name: &str) -> ApiResult<()>;

    async fn delete_user(&self, user_name: &str) -> ApiResult<()>;

    async fn add_user_to_group(&self, user_name: &str, group_name: &str) -> ApiResult<()>;

    async fn remove_user_from_group(&self, user_name: &str, group_name: &str) -> ApiResult<()>;

    /// Names of the groups the user belongs to
    async fn list_groups_for_user(&self, user_name: &str) -> ApiResult<Vec<String>>;

    async fn create_group(&self, group_name: &str) -> ApiResult<()>;

    async fn delete_group(&self, group_name: &str) -> ApiResult<()>;

    /// Names of every group in the account
    async fn list_groups(&self) -> ApiResult<Vec<String>>;

    async fn list_access_keys(&self, user_name: &str) -> ApiResult<Vec<AccessKeyDescriptor>>;

    async fn create_access_key(&self, user_name: &str) -> ApiResult<AccessKeyPair>;

    async fn delete_access_key(&self, user_name: &str, access_key_id: &str) -> ApiResult<()>;

    async fn create_login_profile(
        &self,
        user_name: &str,
        password: &str,
        password_reset_required: bool,
    ) -> ApiResult<()>;

    async fn delete_login_profile(&self, user_name: &str) -> ApiResult<()>;

    /// Serial numbers of the MFA devices enabled for the user
    async fn list_mfa_devices(&self, user_name: &str) -> ApiResult<Vec<String>>;

    async fn deactivate_mfa_device(&self, user_name: &str, serial_number: &str) -> ApiResult<()>;

    async fn delete_virtual_mfa_device(&self, serial_number: &str) -> ApiResult<()>;

    /// Names of the user's inline policies
    async fn list_user_policies(&self, user_name: &str) -> ApiResult<Vec<String>>;

    async fn delete_user_policy(&self, user_name: &str, policy_name: &str) -> ApiResult<()>;

    /// ARNs of the managed policies attached to the user
    async fn list_attached_user_policies(&self, user_name: &str) -> ApiResult<Vec<String>>;

    async fn detach_user_policy(&self, user_name: &str, policy_arn: &str) -> ApiResult<()>;

    async fn list_signing_certificates(&self, user_name: &str) -> ApiResult<Vec<String>>;

    async fn delete_signing_certificate(
        &self,
        user_name: &str,
        certificate_id: &str,
    ) -> ApiResult<()>;

    async fn list_ssh_public_keys(&self, user_name: &str) -> ApiResult<Vec<String>>;

    async fn delete_ssh_public_key(
        &self,
        user_name: &str,
        ssh_public_key_id: &str,
    ) -> ApiResult<()>;
}
