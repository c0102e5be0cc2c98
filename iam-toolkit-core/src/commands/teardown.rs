//! Explicit cleanup list for entities created during a session

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::IamToolkitResult;
use crate::types::DeletionReport;

/// Users and groups to remove once a session is over.
///
/// Setup code records what it created and hands the value to whoever cleans up;
/// nothing is tracked implicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Teardown {
    pub users: Vec<String>,
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TeardownReport {
    pub users: DeletionReport,
    pub groups: DeletionReport,
}

impl Teardown {
    pub fn user(&mut self, user_name: impl Into<String>) -> &mut Self {
        self.users.push(user_name.into());
        self
    }

    pub fn group(&mut self, group_name: impl Into<String>) -> &mut Self {
        self.groups.push(group_name.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.groups.is_empty()
    }

    /// Purge the users, then delete the groups they may have kept busy
    pub async fn run(
        self,
        service: &super::service::IamToolkitService,
    ) -> IamToolkitResult<TeardownReport> {
        info!(
            "Cleaning up {} users and {} groups...",
            self.users.len(),
            self.groups.len()
        );
        let users = service.delete_users(self.users, true).await?;
        let groups = service.delete_groups(self.groups).await?;
        Ok(TeardownReport { users, groups })
    }
}
