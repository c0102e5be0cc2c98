use std::collections::BTreeSet;

use log::debug;
use regex::Regex;

use crate::config::GroupPolicySettings;
use crate::error::{IamToolkitError, IamToolkitResult};
use crate::types::{IamOperation, OperationError};

/// Error code for a group name matching a disallowed pattern
pub const GROUP_NAME_NOT_ALLOWED: &str = "GroupNameNotAllowed";
/// Error code for a membership list with groups not declared compatible
pub const GROUP_COMBINATION_NOT_ALLOWED: &str = "GroupCombinationNotAllowed";

/// Compiled form of [`GroupPolicySettings`].
///
/// Membership is closed by default: a user may join any single group, but two or
/// more groups only when every pair of them is listed together in one of the
/// declared compatible sets.
#[derive(Debug, Clone, Default)]
pub struct GroupPolicy {
    disallowed_names: Vec<Regex>,
    compatible_sets: Vec<BTreeSet<String>>,
}

impl GroupPolicy {
    pub fn from_settings(settings: &GroupPolicySettings) -> IamToolkitResult<Self> {
        let disallowed_names = settings
            .disallowed_name_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| IamToolkitError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<IamToolkitResult<Vec<_>>>()?;

        Ok(Self {
            disallowed_names,
            compatible_sets: settings
                .compatible_groups
                .iter()
                .map(|set| set.iter().cloned().collect())
                .collect(),
        })
    }

    /// Reject a group name matching one of the disallowed patterns
    pub fn check_group_name(&self, group_name: &str) -> Option<OperationError> {
        let pattern = self
            .disallowed_names
            .iter()
            .find(|pattern| pattern.is_match(group_name))?;
        debug!("Group name {group_name} matches disallowed pattern {pattern}");
        Some(OperationError::rejected(
            IamOperation::CreateGroup,
            GROUP_NAME_NOT_ALLOWED,
            group_name,
            format!("group name matches disallowed pattern '{pattern}'"),
        ))
    }

    fn compatible(&self, a: &str, b: &str) -> bool {
        a == b
            || self
                .compatible_sets
                .iter()
                .any(|set| set.contains(a) && set.contains(b))
    }

    /// Reject a membership list holding a pair of groups never declared compatible.
    /// At most one error is produced per list, naming the first such pair.
    pub fn check_combination(&self, groups: &[String]) -> Option<OperationError> {
        let (first, second) = groups.iter().enumerate().find_map(|(i, a)| {
            groups[i + 1..]
                .iter()
                .find(|b| !self.compatible(a, b))
                .map(|b| (a, b))
        })?;
        Some(OperationError::rejected(
            IamOperation::AddUserToGroup,
            GROUP_COMBINATION_NOT_ALLOWED,
            first.clone(),
            format!(
                "groups '{first}' and '{second}' are not declared compatible: {}",
                groups.join(", ")
            ),
        ))
    }
}
