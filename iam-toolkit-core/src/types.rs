use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aws::ApiError;

/// Tag identifying which IAM call (or local check) produced an error-list entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IamOperation {
    #[serde(rename = "iam:createuser")]
    CreateUser,
    #[serde(rename = "iam:deleteuser")]
    DeleteUser,
    #[serde(rename = "iam:addusertogroup")]
    AddUserToGroup,
    #[serde(rename = "iam:removeuserfromgroup")]
    RemoveUserFromGroup,
    #[serde(rename = "iam:listgroupsforuser")]
    ListGroupsForUser,
    #[serde(rename = "iam:creategroup")]
    CreateGroup,
    #[serde(rename = "iam:deletegroup")]
    DeleteGroup,
    #[serde(rename = "iam:listgroups")]
    ListGroups,
    #[serde(rename = "iam:listaccesskeys")]
    ListAccessKeys,
    #[serde(rename = "iam:createaccesskey")]
    CreateAccessKey,
    #[serde(rename = "iam:deleteaccesskey")]
    DeleteAccessKey,
    #[serde(rename = "iam:createloginprofile")]
    CreateLoginProfile,
    #[serde(rename = "iam:deleteloginprofile")]
    DeleteLoginProfile,
    #[serde(rename = "iam:listmfadevices")]
    ListMfaDevices,
    #[serde(rename = "iam:deactivatemfadevice")]
    DeactivateMfaDevice,
    #[serde(rename = "iam:deletevirtualmfadevice")]
    DeleteVirtualMfaDevice,
    #[serde(rename = "iam:listuserpolicies")]
    ListUserPolicies,
    #[serde(rename = "iam:deleteuserpolicy")]
    DeleteUserPolicy,
    #[serde(rename = "iam:listattacheduserpolicies")]
    ListAttachedUserPolicies,
    #[serde(rename = "iam:detachuserpolicy")]
    DetachUserPolicy,
    #[serde(rename = "iam:listsigningcertificates")]
    ListSigningCertificates,
    #[serde(rename = "iam:deletesigningcertificate")]
    DeleteSigningCertificate,
    #[serde(rename = "iam:listsshpublickeys")]
    ListSshPublicKeys,
    #[serde(rename = "iam:deletesshpublickey")]
    DeleteSshPublicKey,
}

impl IamOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateUser => "iam:createuser",
            Self::DeleteUser => "iam:deleteuser",
            Self::AddUserToGroup => "iam:addusertogroup",
            Self::RemoveUserFromGroup => "iam:removeuserfromgroup",
            Self::ListGroupsForUser => "iam:listgroupsforuser",
            Self::CreateGroup => "iam:creategroup",
            Self::DeleteGroup => "iam:deletegroup",
            Self::ListGroups => "iam:listgroups",
            Self::ListAccessKeys => "iam:listaccesskeys",
            Self::CreateAccessKey => "iam:createaccesskey",
            Self::DeleteAccessKey => "iam:deleteaccesskey",
            Self::CreateLoginProfile => "iam:createloginprofile",
            Self::DeleteLoginProfile => "iam:deleteloginprofile",
            Self::ListMfaDevices => "iam:listmfadevices",
            Self::DeactivateMfaDevice => "iam:deactivatemfadevice",
            Self::DeleteVirtualMfaDevice => "iam:deletevirtualmfadevice",
            Self::ListUserPolicies => "iam:listuserpolicies",
            Self::DeleteUserPolicy => "iam:deleteuserpolicy",
            Self::ListAttachedUserPolicies => "iam:listattacheduserpolicies",
            Self::DetachUserPolicy => "iam:detachuserpolicy",
            Self::ListSigningCertificates => "iam:listsigningcertificates",
            Self::DeleteSigningCertificate => "iam:deletesigningcertificate",
            Self::ListSshPublicKeys => "iam:listsshpublickeys",
            Self::DeleteSshPublicKey => "iam:deletesshpublickey",
        }
    }
}

impl fmt::Display for IamOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of an operation's error list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OperationError {
    pub operation: IamOperation,
    pub code: String,
    /// Secondary entity involved, e.g. the group a user could not be added to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub message: String,
}

impl OperationError {
    pub fn from_api(operation: IamOperation, err: ApiError) -> Self {
        Self {
            operation,
            code: err.code,
            target: None,
            message: err.message,
        }
    }

    /// An error raised by a local check before any API call was made
    pub fn rejected(
        operation: IamOperation,
        code: &str,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            code: code.to_string(),
            target: Some(target.into()),
            message: message.into(),
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(target) => write!(
                f,
                "{} ({}): {}: {}",
                self.operation, target, self.code, self.message
            ),
            None => write!(f, "{}: {}: {}", self.operation, self.code, self.message),
        }
    }
}

/// Ordered errors of one operation; empty iff the operation fully succeeded.
pub type ErrorList = Vec<OperationError>;

pub trait ErrorListExt {
    fn has_code(&self, code: &str) -> bool;

    fn codes(&self) -> Vec<&str>;
}

impl ErrorListExt for [OperationError] {
    fn has_code(&self, code: &str) -> bool {
        self.iter().any(|e| e.code == code)
    }

    fn codes(&self) -> Vec<&str> {
        self.iter().map(|e| e.code.as_str()).collect()
    }
}

/// Access key credential pair, returned once at creation time
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccessKeyPair {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl AccessKeyPair {
    /// Prefix of long-lived IAM user access key IDs
    pub const ID_PREFIX: &'static str = "AKIA";

    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }
}

impl fmt::Debug for AccessKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessKeyPair")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Access key as listed on an existing user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccessKeyDescriptor {
    pub access_key_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

/// Outcome of `create_user`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserCreation {
    pub user_name: String,
    pub errors: ErrorList,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(flatten)]
    pub access_key: Option<AccessKeyPair>,
}

impl UserCreation {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            errors: Vec::new(),
            password: None,
            access_key: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Options of `create_user`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateUserOptions {
    pub with_password: bool,
    pub require_password_reset: bool,
    pub with_access_key: bool,
}

impl CreateUserOptions {
    pub fn with_password(mut self) -> Self {
        self.with_password = true;
        self
    }

    /// Only meaningful together with [`Self::with_password`]
    pub fn require_password_reset(mut self) -> Self {
        self.require_password_reset = true;
        self
    }

    pub fn with_access_key(mut self) -> Self {
        self.with_access_key = true;
        self
    }
}

/// Whether a failure of an operation must abort the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    Optional,
}

impl From<bool> for Requirement {
    fn from(must_succeed: bool) -> Self {
        if must_succeed {
            Self::Required
        } else {
            Self::Optional
        }
    }
}

/// One group name or an ordered list of them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSelection {
    Single(String),
    Many(Vec<String>),
}

impl GroupSelection {
    pub fn none() -> Self {
        Self::Many(Vec::new())
    }

    /// Resolve into the ordered list of names
    pub fn into_names(self) -> Vec<String> {
        match self {
            Self::Single(name) => vec![name],
            Self::Many(names) => names,
        }
    }
}

impl Default for GroupSelection {
    fn default() -> Self {
        Self::none()
    }
}

impl From<&str> for GroupSelection {
    fn from(name: &str) -> Self {
        Self::Single(name.to_string())
    }
}

impl From<String> for GroupSelection {
    fn from(name: String) -> Self {
        Self::Single(name)
    }
}

impl From<Vec<String>> for GroupSelection {
    fn from(names: Vec<String>) -> Self {
        Self::Many(names)
    }
}

impl From<Vec<&str>> for GroupSelection {
    fn from(names: Vec<&str>) -> Self {
        Self::Many(names.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for GroupSelection {
    fn from(names: [&str; N]) -> Self {
        Self::Many(names.iter().map(|s| s.to_string()).collect())
    }
}

impl<T: Into<GroupSelection>> From<Option<T>> for GroupSelection {
    fn from(selection: Option<T>) -> Self {
        selection.map_or_else(Self::none, Into::into)
    }
}

/// Summary of a deletion driver run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeletionReport {
    pub rounds: u32,
    pub delays: u32,
    pub deleted: Vec<String>,
}
