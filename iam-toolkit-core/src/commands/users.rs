//! User operations: creation with optional credentials, group membership, deletion.

use std::future::Future;

use log::{debug, info, warn};

use crate::aws::{codes, ApiResult};
use crate::error::{IamToolkitError, IamToolkitResult};
use crate::password::generate_password;
use crate::types::{
    CreateUserOptions, DeletionReport, ErrorList, GroupSelection, IamOperation, OperationError,
    Requirement, UserCreation,
};

/// Error code recorded when no password could be generated for a login profile
pub const PASSWORD_GENERATION_FAILED: &str = "PasswordGenerationFailed";

impl super::service::IamToolkitService {
    /// Create a user, optionally adding it to groups and giving it a console password
    /// and an access key.
    ///
    /// Never fails as a whole: every failed step is recorded in the returned error
    /// list. A failure to create the user itself (e.g. the name is taken) stops
    /// processing, as does a group list the policy rejects.
    pub async fn create_user(
        &self,
        user_name: &str,
        groups: impl Into<GroupSelection>,
        options: CreateUserOptions,
    ) -> UserCreation {
        let groups = groups.into().into_names();
        let mut result = UserCreation::new(user_name);

        if let Some(err) = self.policy.check_combination(&groups) {
            warn!("Not creating user {user_name}: {err}");
            result.errors.push(err);
            return result;
        }

        info!("Creating user {user_name}...");
        if let Err(e) = self.client.create_user(user_name).await {
            warn!("Failed to create user {user_name}: {e}");
            result
                .errors
                .push(OperationError::from_api(IamOperation::CreateUser, e));
            return result;
        }

        for group in &groups {
            info!("Adding user {user_name} to group {group}...");
            if let Err(e) = self.client.add_user_to_group(user_name, group).await {
                warn!("Failed to add user {user_name} to group {group}: {e}");
                result.errors.push(
                    OperationError::from_api(IamOperation::AddUserToGroup, e).with_target(group),
                );
            }
        }

        if options.with_password {
            info!("Creating a login profile...");
            match generate_password(self.config.password.length) {
                Ok(password) => {
                    match self
                        .client
                        .create_login_profile(user_name, &password, options.require_password_reset)
                        .await
                    {
                        Ok(()) => result.password = Some(password),
                        Err(e) => {
                            warn!("Failed to create a login profile for {user_name}: {e}");
                            result.errors.push(OperationError::from_api(
                                IamOperation::CreateLoginProfile,
                                e,
                            ));
                        }
                    }
                }
                Err(e) => result.errors.push(OperationError::rejected(
                    IamOperation::CreateLoginProfile,
                    PASSWORD_GENERATION_FAILED,
                    user_name,
                    e.to_string(),
                )),
            }
        } else if options.require_password_reset {
            debug!("Ignoring password reset requirement for {user_name}: no password requested");
        }

        if options.with_access_key {
            info!("Creating an access key...");
            match self.client.create_access_key(user_name).await {
                Ok(access_key) => result.access_key = Some(access_key),
                Err(e) => {
                    warn!("Failed to create an access key for {user_name}: {e}");
                    result
                        .errors
                        .push(OperationError::from_api(IamOperation::CreateAccessKey, e));
                }
            }
        }

        result
    }

    /// Add a user to a group. A failure is an error for [`Requirement::Required`]
    /// and is only logged for [`Requirement::Optional`].
    pub async fn add_user_to_group(
        &self,
        user_name: &str,
        group_name: &str,
        requirement: impl Into<Requirement>,
    ) -> IamToolkitResult<()> {
        let requirement: Requirement = requirement.into();
        info!("Adding user {user_name} to group {group_name}...");
        match (
            self.client.add_user_to_group(user_name, group_name).await,
            requirement,
        ) {
            (Ok(()), _) => Ok(()),
            (Err(source), Requirement::Required) => Err(IamToolkitError::RequiredOperationFailed {
                operation: IamOperation::AddUserToGroup,
                target: format!("{user_name} -> {group_name}"),
                source,
            }),
            (Err(e), Requirement::Optional) => {
                debug!("Ignoring failure to add user {user_name} to group {group_name}: {e}");
                Ok(())
            }
        }
    }

    /// Issue a single `DeleteUser` call
    pub async fn delete_user(&self, user_name: &str) -> ErrorList {
        info!("Deleting user {user_name}...");
        match self.client.delete_user(user_name).await {
            Ok(()) => Vec::new(),
            Err(e) => {
                debug!("Failed to delete user {user_name}: {e}");
                vec![OperationError::from_api(IamOperation::DeleteUser, e)]
            }
        }
    }

    /// Remove everything that keeps a user from being deleted, then delete it.
    ///
    /// Dependents are group memberships, access keys, the login profile, MFA devices
    /// (virtual ones are deleted too), inline and attached policies, signing
    /// certificates and SSH public keys. All failures are collected; `DeleteUser`
    /// is only attempted once every dependent is gone.
    pub async fn purge_user(&self, user_name: &str) -> ErrorList {
        let client = self.client.as_ref();
        let mut errors = Vec::new();

        remove_each(
            &mut errors,
            client.list_groups_for_user(user_name).await,
            (IamOperation::ListGroupsForUser, IamOperation::RemoveUserFromGroup),
            move |group| async move { client.remove_user_from_group(user_name, &group).await },
        )
        .await;

        let keys = client
            .list_access_keys(user_name)
            .await
            .map(|keys| keys.into_iter().map(|key| key.access_key_id).collect());
        remove_each(
            &mut errors,
            keys,
            (IamOperation::ListAccessKeys, IamOperation::DeleteAccessKey),
            move |key_id| async move { client.delete_access_key(user_name, &key_id).await },
        )
        .await;

        match client.delete_login_profile(user_name).await {
            Ok(()) => debug!("Deleted login profile of {user_name}"),
            Err(e) if e.is(codes::NO_SUCH_ENTITY) => {}
            Err(e) => errors.push(OperationError::from_api(
                IamOperation::DeleteLoginProfile,
                e,
            )),
        }

        match client.list_mfa_devices(user_name).await {
            Ok(serials) => {
                for serial in serials {
                    debug!("Deactivating MFA device {serial} of {user_name}...");
                    if let Err(e) = client.deactivate_mfa_device(user_name, &serial).await {
                        errors.push(
                            OperationError::from_api(IamOperation::DeactivateMfaDevice, e)
                                .with_target(serial),
                        );
                        continue;
                    }
                    if is_virtual_mfa_device(&serial) {
                        if let Err(e) = client.delete_virtual_mfa_device(&serial).await {
                            errors.push(
                                OperationError::from_api(IamOperation::DeleteVirtualMfaDevice, e)
                                    .with_target(serial),
                            );
                        }
                    }
                }
            }
            Err(e) => errors.push(OperationError::from_api(IamOperation::ListMfaDevices, e)),
        }

        remove_each(
            &mut errors,
            client.list_user_policies(user_name).await,
            (IamOperation::ListUserPolicies, IamOperation::DeleteUserPolicy),
            move |policy| async move { client.delete_user_policy(user_name, &policy).await },
        )
        .await;

        remove_each(
            &mut errors,
            client.list_attached_user_policies(user_name).await,
            (IamOperation::ListAttachedUserPolicies, IamOperation::DetachUserPolicy),
            move |arn| async move { client.detach_user_policy(user_name, &arn).await },
        )
        .await;

        remove_each(
            &mut errors,
            client.list_signing_certificates(user_name).await,
            (IamOperation::ListSigningCertificates, IamOperation::DeleteSigningCertificate),
            move |id| async move { client.delete_signing_certificate(user_name, &id).await },
        )
        .await;

        remove_each(
            &mut errors,
            client.list_ssh_public_keys(user_name).await,
            (IamOperation::ListSshPublicKeys, IamOperation::DeleteSshPublicKey),
            move |id| async move { client.delete_ssh_public_key(user_name, &id).await },
        )
        .await;

        if errors.is_empty() {
            errors.extend(self.delete_user(user_name).await);
        }
        errors
    }

    /// Delete a batch of users, retrying those IAM reports as busy.
    /// With `purge`, each user's dependents are removed first.
    pub async fn delete_users(
        &self,
        user_names: Vec<String>,
        purge: bool,
    ) -> IamToolkitResult<DeletionReport> {
        let driver = self.deletion_driver();
        if purge {
            driver
                .run(user_names, |name| async move { self.purge_user(&name).await })
                .await
        } else {
            driver
                .run(user_names, |name| async move { self.delete_user(&name).await })
                .await
        }
    }
}

/// Virtual devices are identified by an ARN, hardware tokens by a bare serial
fn is_virtual_mfa_device(serial_number: &str) -> bool {
    serial_number.starts_with("arn:")
}

/// Remove every listed dependent, recording the listing failure or each failed
/// removal (tagged with the dependent's id) in `errors`.
async fn remove_each<F, Fut>(
    errors: &mut ErrorList,
    listed: ApiResult<Vec<String>>,
    (list_operation, remove_operation): (IamOperation, IamOperation),
    remove: F,
) where
    F: Fn(String) -> Fut,
    Fut: Future<Output = ApiResult<()>>,
{
    let ids = match listed {
        Ok(ids) => ids,
        Err(e) => {
            errors.push(OperationError::from_api(list_operation, e));
            return;
        }
    };
    for id in ids {
        debug!("{remove_operation} {id}");
        if let Err(e) = remove(id.clone()).await {
            errors.push(OperationError::from_api(remove_operation, e).with_target(id));
        }
    }
}
