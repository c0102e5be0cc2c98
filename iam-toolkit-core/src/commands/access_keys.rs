//! Access key listing

use log::info;

use crate::error::{IamToolkitError, IamToolkitResult};
use crate::types::{AccessKeyDescriptor, IamOperation};

impl super::service::IamToolkitService {
    /// List the access keys currently attached to a user
    pub async fn get_access_keys(
        &self,
        user_name: &str,
    ) -> IamToolkitResult<Vec<AccessKeyDescriptor>> {
        self.client
            .list_access_keys(user_name)
            .await
            .map_err(|e| IamToolkitError::api(IamOperation::ListAccessKeys, user_name, e))
    }

    /// Like [`Self::get_access_keys`], also logging one line per key
    pub async fn show_access_keys(
        &self,
        user_name: &str,
    ) -> IamToolkitResult<Vec<AccessKeyDescriptor>> {
        let keys = self.get_access_keys(user_name).await?;
        info!("User '{user_name}' has {} access key(s):", keys.len());
        for key in &keys {
            match &key.created {
                Some(created) => info!(
                    "  {} ({}, created {})",
                    key.access_key_id,
                    key.status,
                    created.format("%Y-%m-%d %H:%M:%S UTC")
                ),
                None => info!("  {} ({})", key.access_key_id, key.status),
            }
        }
        Ok(keys)
    }
}
