//! Group operations

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::aws::codes;
use crate::error::{IamToolkitError, IamToolkitResult};
use crate::policy::GroupCategories;
use crate::types::{DeletionReport, ErrorList, GroupSelection, IamOperation, OperationError};

impl super::service::IamToolkitService {
    /// Create one or more groups, in order.
    ///
    /// Names the group policy disallows are rejected without an API call. A group
    /// that already exists is not an error.
    pub async fn create_groups(&self, groups: impl Into<GroupSelection>) -> ErrorList {
        let mut errors = Vec::new();
        for group in groups.into().into_names() {
            if let Some(err) = self.policy.check_group_name(&group) {
                warn!("Not creating group {group}: {err}");
                errors.push(err);
                continue;
            }

            info!("Creating group {group}...");
            match self.client.create_group(&group).await {
                Ok(()) => {}
                Err(e) if e.is(codes::ENTITY_ALREADY_EXISTS) => {
                    debug!("Group {group} already exists");
                }
                Err(e) => {
                    warn!("Failed to create group {group}: {e}");
                    errors.push(
                        OperationError::from_api(IamOperation::CreateGroup, e).with_target(group),
                    );
                }
            }
        }
        errors
    }

    /// Issue a single `DeleteGroup` call
    pub async fn delete_group(&self, group_name: &str) -> ErrorList {
        info!("Deleting group {group_name}...");
        match self.client.delete_group(group_name).await {
            Ok(()) => Vec::new(),
            Err(e) => {
                debug!("Failed to delete group {group_name}: {e}");
                vec![
                    OperationError::from_api(IamOperation::DeleteGroup, e).with_target(group_name),
                ]
            }
        }
    }

    /// Delete a batch of groups, retrying those still in use
    pub async fn delete_groups(
        &self,
        group_names: Vec<String>,
    ) -> IamToolkitResult<DeletionReport> {
        self.deletion_driver()
            .run(group_names, |name| async move { self.delete_group(&name).await })
            .await
    }

    pub async fn list_groups(&self) -> IamToolkitResult<Vec<String>> {
        self.client
            .list_groups()
            .await
            .map_err(|e| IamToolkitError::api(IamOperation::ListGroups, "account", e))
    }

    /// Bucket every group of the account by category label
    pub async fn categorize_groups(
        &self,
        categories: &GroupCategories,
    ) -> IamToolkitResult<BTreeMap<String, Vec<String>>> {
        let groups = self.list_groups().await?;
        Ok(categories.bucket(groups.iter().map(String::as_str)))
    }
}
