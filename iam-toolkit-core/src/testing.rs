//! In-memory IAM double used by the unit tests.
//!
//! Mirrors the IAM entity rules the tests rely on: unique names, existing groups
//! for membership, dependents blocking user and group deletion, assigned virtual
//! MFA devices blocking their own deletion.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::aws::{codes, ApiError, ApiResult, IamApi};
use crate::commands::IamToolkitService;
use crate::config::ToolkitConfig;
use crate::types::{AccessKeyDescriptor, AccessKeyPair, IamOperation};

#[derive(Debug, Default, Clone)]
pub(crate) struct FakeUser {
    pub groups: BTreeSet<String>,
    pub access_keys: Vec<String>,
    pub login_profile: Option<(String, bool)>,
    pub mfa_devices: Vec<String>,
    pub inline_policies: BTreeSet<String>,
    pub attached_policies: BTreeSet<String>,
    pub signing_certificates: Vec<String>,
    pub ssh_public_keys: Vec<String>,
}

impl FakeUser {
    fn has_dependents(&self) -> bool {
        !self.groups.is_empty()
            || !self.access_keys.is_empty()
            || self.login_profile.is_some()
            || !self.mfa_devices.is_empty()
            || !self.inline_policies.is_empty()
            || !self.attached_policies.is_empty()
            || !self.signing_certificates.is_empty()
            || !self.ssh_public_keys.is_empty()
    }
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<String, FakeUser>,
    groups: BTreeSet<String>,
    denied_groups: BTreeSet<String>,
    virtual_mfa_devices: BTreeSet<String>,
    scripted_user_deletes: HashMap<String, VecDeque<String>>,
    scripted_failures: HashMap<IamOperation, String>,
    calls: Vec<String>,
    next_key: u32,
}

#[derive(Debug, Default)]
pub(crate) struct FakeIam {
    state: Mutex<State>,
}

fn no_such_entity(kind: &str, name: &str) -> ApiError {
    ApiError::new(
        codes::NO_SUCH_ENTITY,
        format!("The {kind} with name {name} cannot be found."),
    )
}

impl State {
    /// Consume the failure scripted for `operation`, if any
    fn scripted(&mut self, operation: IamOperation) -> ApiResult<()> {
        match self.scripted_failures.remove(&operation) {
            Some(code) => Err(ApiError::new(code, format!("scripted {operation} failure"))),
            None => Ok(()),
        }
    }

    fn user_mut(&mut self, user_name: &str) -> ApiResult<&mut FakeUser> {
        self.users
            .get_mut(user_name)
            .ok_or_else(|| no_such_entity("user", user_name))
    }
}

impl FakeIam {
    pub fn with_groups(groups: &[&str]) -> Self {
        let fake = Self::default();
        fake.state().groups = groups.iter().map(|g| g.to_string()).collect();
        fake
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Make `CreateGroup` fail with `AccessDenied` for this name
    pub fn deny_group(&self, group_name: &str) {
        self.state().denied_groups.insert(group_name.to_string());
    }

    /// Codes returned by the next `DeleteUser` calls on `user_name`, in order
    pub fn script_user_deletes(&self, user_name: &str, codes: &[&str]) {
        self.state().scripted_user_deletes.insert(
            user_name.to_string(),
            codes.iter().map(|c| c.to_string()).collect(),
        );
    }

    /// Make the next call to `operation` fail with `code`
    pub fn fail_next(&self, operation: IamOperation, code: &str) {
        self.state().scripted_failures.insert(operation, code.to_string());
    }

    /// Edit an existing user in place, e.g. to attach dependents the toolkit never
    /// creates itself
    pub fn update_user(&self, user_name: &str, update: impl FnOnce(&mut FakeUser)) {
        if let Some(user) = self.state().users.get_mut(user_name) {
            update(user);
        }
    }

    /// Create a virtual MFA device and enable it for `user_name`
    pub fn enable_virtual_mfa(&self, user_name: &str, serial_number: &str) {
        let mut state = self.state();
        state.virtual_mfa_devices.insert(serial_number.to_string());
        if let Some(user) = state.users.get_mut(user_name) {
            user.mfa_devices.push(serial_number.to_string());
        }
    }

    pub fn has_virtual_mfa(&self, serial_number: &str) -> bool {
        self.state().virtual_mfa_devices.contains(serial_number)
    }

    pub fn user(&self, user_name: &str) -> Option<FakeUser> {
        self.state().users.get(user_name).cloned()
    }

    pub fn has_group(&self, group_name: &str) -> bool {
        self.state().groups.contains(group_name)
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }
}

#[async_trait]
impl IamApi for FakeIam {
    async fn create_user(&self, user_name: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.calls.push(format!("CreateUser {user_name}"));
        if state.users.contains_key(user_name) {
            return Err(ApiError::new(
                codes::ENTITY_ALREADY_EXISTS,
                format!("User with name {user_name} already exists."),
            ));
        }
        state.users.insert(user_name.to_string(), FakeUser::default());
        Ok(())
    }

    async fn delete_user(&self, user_name: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.calls.push(format!("DeleteUser {user_name}"));
        let scripted = state
            .scripted_user_deletes
            .get_mut(user_name)
            .and_then(VecDeque::pop_front);
        if let Some(code) = scripted {
            return Err(ApiError::new(code, "scripted failure"));
        }
        let user = state
            .users
            .get(user_name)
            .ok_or_else(|| no_such_entity("user", user_name))?;
        if user.has_dependents() {
            return Err(ApiError::new(
                codes::DELETE_CONFLICT,
                "Cannot delete entity, must remove referenced objects first.",
            ));
        }
        state.users.remove(user_name);
        Ok(())
    }

    async fn add_user_to_group(&self, user_name: &str, group_name: &str) -> ApiResult<()> {
        let mut state = self.state();
        state
            .calls
            .push(format!("AddUserToGroup {user_name} {group_name}"));
        if !state.groups.contains(group_name) {
            return Err(no_such_entity("group", group_name));
        }
        let user = state
            .users
            .get_mut(user_name)
            .ok_or_else(|| no_such_entity("user", user_name))?;
        user.groups.insert(group_name.to_string());
        Ok(())
    }

    async fn remove_user_from_group(&self, user_name: &str, group_name: &str) -> ApiResult<()> {
        let mut state = self.state();
        state
            .calls
            .push(format!("RemoveUserFromGroup {user_name} {group_name}"));
        let user = state
            .users
            .get_mut(user_name)
            .ok_or_else(|| no_such_entity("user", user_name))?;
        if !user.groups.remove(group_name) {
            return Err(no_such_entity("group", group_name));
        }
        Ok(())
    }

    async fn list_groups_for_user(&self, user_name: &str) -> ApiResult<Vec<String>> {
        let state = self.state();
        let user = state
            .users
            .get(user_name)
            .ok_or_else(|| no_such_entity("user", user_name))?;
        Ok(user.groups.iter().cloned().collect())
    }

    async fn create_group(&self, group_name: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.calls.push(format!("CreateGroup {group_name}"));
        if state.denied_groups.contains(group_name) {
            return Err(ApiError::new(
                "AccessDenied",
                format!("Not authorized to perform iam:CreateGroup on {group_name}"),
            ));
        }
        if !state.groups.insert(group_name.to_string()) {
            return Err(ApiError::new(
                codes::ENTITY_ALREADY_EXISTS,
                format!("Group with name {group_name} already exists."),
            ));
        }
        Ok(())
    }

    async fn delete_group(&self, group_name: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.calls.push(format!("DeleteGroup {group_name}"));
        if !state.groups.contains(group_name) {
            return Err(no_such_entity("group", group_name));
        }
        if state.users.values().any(|u| u.groups.contains(group_name)) {
            return Err(ApiError::new(
                codes::DELETE_CONFLICT,
                "Cannot delete entity, must remove users from group first.",
            ));
        }
        state.groups.remove(group_name);
        Ok(())
    }

    async fn list_groups(&self) -> ApiResult<Vec<String>> {
        Ok(self.state().groups.iter().cloned().collect())
    }

    async fn list_access_keys(&self, user_name: &str) -> ApiResult<Vec<AccessKeyDescriptor>> {
        let state = self.state();
        let user = state
            .users
            .get(user_name)
            .ok_or_else(|| no_such_entity("user", user_name))?;
        Ok(user
            .access_keys
            .iter()
            .map(|id| AccessKeyDescriptor {
                access_key_id: id.clone(),
                status: "Active".to_string(),
                created: None,
            })
            .collect())
    }

    async fn create_access_key(&self, user_name: &str) -> ApiResult<AccessKeyPair> {
        let mut state = self.state();
        state.calls.push(format!("CreateAccessKey {user_name}"));
        state.scripted(IamOperation::CreateAccessKey)?;
        state.next_key += 1;
        let key_id = format!("{}{:016}", AccessKeyPair::ID_PREFIX, state.next_key);
        let user = state
            .users
            .get_mut(user_name)
            .ok_or_else(|| no_such_entity("user", user_name))?;
        user.access_keys.push(key_id.clone());
        Ok(AccessKeyPair::new(key_id, format!("secret-for-{user_name}")))
    }

    async fn delete_access_key(&self, user_name: &str, access_key_id: &str) -> ApiResult<()> {
        let mut state = self.state();
        state
            .calls
            .push(format!("DeleteAccessKey {user_name} {access_key_id}"));
        let user = state
            .users
            .get_mut(user_name)
            .ok_or_else(|| no_such_entity("user", user_name))?;
        let before = user.access_keys.len();
        user.access_keys.retain(|id| id != access_key_id);
        if user.access_keys.len() == before {
            return Err(no_such_entity("access key", access_key_id));
        }
        Ok(())
    }

    async fn create_login_profile(
        &self,
        user_name: &str,
        password: &str,
        password_reset_required: bool,
    ) -> ApiResult<()> {
        let mut state = self.state();
        state.calls.push(format!("CreateLoginProfile {user_name}"));
        state.scripted(IamOperation::CreateLoginProfile)?;
        let user = state
            .users
            .get_mut(user_name)
            .ok_or_else(|| no_such_entity("user", user_name))?;
        if user.login_profile.is_some() {
            return Err(ApiError::new(
                codes::ENTITY_ALREADY_EXISTS,
                format!("Login Profile for user {user_name} already exists."),
            ));
        }
        user.login_profile = Some((password.to_string(), password_reset_required));
        Ok(())
    }

    async fn delete_login_profile(&self, user_name: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.calls.push(format!("DeleteLoginProfile {user_name}"));
        let user = state
            .users
            .get_mut(user_name)
            .ok_or_else(|| no_such_entity("user", user_name))?;
        if user.login_profile.take().is_none() {
            return Err(no_such_entity("login profile", user_name));
        }
        Ok(())
    }

    async fn list_mfa_devices(&self, user_name: &str) -> ApiResult<Vec<String>> {
        Ok(self.state().user_mut(user_name)?.mfa_devices.clone())
    }

    async fn deactivate_mfa_device(&self, user_name: &str, serial_number: &str) -> ApiResult<()> {
        let mut state = self.state();
        state
            .calls
            .push(format!("DeactivateMFADevice {user_name} {serial_number}"));
        let user = state.user_mut(user_name)?;
        let before = user.mfa_devices.len();
        user.mfa_devices.retain(|serial| serial != serial_number);
        if user.mfa_devices.len() == before {
            return Err(no_such_entity("MFA device", serial_number));
        }
        Ok(())
    }

    async fn delete_virtual_mfa_device(&self, serial_number: &str) -> ApiResult<()> {
        let mut state = self.state();
        state.calls.push(format!("DeleteVirtualMFADevice {serial_number}"));
        if state
            .users
            .values()
            .any(|user| user.mfa_devices.iter().any(|serial| serial == serial_number))
        {
            return Err(ApiError::new(codes::DELETE_CONFLICT, "MFA device is still in use."));
        }
        if !state.virtual_mfa_devices.remove(serial_number) {
            return Err(no_such_entity("MFA device", serial_number));
        }
        Ok(())
    }

    async fn list_user_policies(&self, user_name: &str) -> ApiResult<Vec<String>> {
        let mut state = self.state();
        let user = state.user_mut(user_name)?;
        Ok(user.inline_policies.iter().cloned().collect())
    }

    async fn delete_user_policy(&self, user_name: &str, policy_name: &str) -> ApiResult<()> {
        let mut state = self.state();
        state
            .calls
            .push(format!("DeleteUserPolicy {user_name} {policy_name}"));
        state.scripted(IamOperation::DeleteUserPolicy)?;
        if !state.user_mut(user_name)?.inline_policies.remove(policy_name) {
            return Err(no_such_entity("policy", policy_name));
        }
        Ok(())
    }

    async fn list_attached_user_policies(&self, user_name: &str) -> ApiResult<Vec<String>> {
        let mut state = self.state();
        let user = state.user_mut(user_name)?;
        Ok(user.attached_policies.iter().cloned().collect())
    }

    async fn detach_user_policy(&self, user_name: &str, policy_arn: &str) -> ApiResult<()> {
        let mut state = self.state();
        state
            .calls
            .push(format!("DetachUserPolicy {user_name} {policy_arn}"));
        state.scripted(IamOperation::DetachUserPolicy)?;
        if !state.user_mut(user_name)?.attached_policies.remove(policy_arn) {
            return Err(no_such_entity("policy", policy_arn));
        }
        Ok(())
    }

    async fn list_signing_certificates(&self, user_name: &str) -> ApiResult<Vec<String>> {
        Ok(self.state().user_mut(user_name)?.signing_certificates.clone())
    }

    async fn delete_signing_certificate(
        &self,
        user_name: &str,
        certificate_id: &str,
    ) -> ApiResult<()> {
        let mut state = self.state();
        state
            .calls
            .push(format!("DeleteSigningCertificate {user_name} {certificate_id}"));
        let user = state.user_mut(user_name)?;
        let before = user.signing_certificates.len();
        user.signing_certificates.retain(|id| id != certificate_id);
        if user.signing_certificates.len() == before {
            return Err(no_such_entity("signing certificate", certificate_id));
        }
        Ok(())
    }

    async fn list_ssh_public_keys(&self, user_name: &str) -> ApiResult<Vec<String>> {
        Ok(self.state().user_mut(user_name)?.ssh_public_keys.clone())
    }

    async fn delete_ssh_public_key(
        &self,
        user_name: &str,
        ssh_public_key_id: &str,
    ) -> ApiResult<()> {
        let mut state = self.state();
        state
            .calls
            .push(format!("DeleteSSHPublicKey {user_name} {ssh_public_key_id}"));
        let user = state.user_mut(user_name)?;
        let before = user.ssh_public_keys.len();
        user.ssh_public_keys.retain(|id| id != ssh_public_key_id);
        if user.ssh_public_keys.len() == before {
            return Err(no_such_entity("SSH public key", ssh_public_key_id));
        }
        Ok(())
    }
}

/// Service running against `fake`
pub(crate) fn service_with(fake: &Arc<FakeIam>, config: ToolkitConfig) -> IamToolkitService {
    IamToolkitService::with_client(fake.clone(), config).unwrap()
}
