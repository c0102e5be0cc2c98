//! Toolkit configuration, loaded from an optional TOML file.
//!
//! ```toml
//! [aws]
//! profile = "travislike"
//! region = "us-east-1"
//!
//! [retry]
//! delay_secs = 5
//! max_rounds = 10
//!
//! [groups]
//! disallowed_name_patterns = ["^HelloWorld"]
//! compatible_groups = [["AllUsers", "Developers"]]
//!
//! [password]
//! length = 16
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{IamToolkitError, IamToolkitResult};
use crate::password::DEFAULT_PASSWORD_LENGTH;

/// Delay between deletion rounds when nothing else is configured
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolkitConfig {
    pub aws: AwsSettings,
    pub retry: RetrySettings,
    pub groups: GroupPolicySettings,
    pub password: PasswordSettings,
}

/// Credential profile and region for the SDK; `None` defers to the default chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AwsSettings {
    pub profile: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    pub delay_secs: u64,
    /// Unbounded when unset: the driver keeps going as long as failures are transient.
    pub max_rounds: Option<u32>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            delay_secs: DEFAULT_RETRY_DELAY_SECS,
            max_rounds: None,
        }
    }
}

impl RetrySettings {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

/// Group naming and membership rules. Both lists are empty unless configured, so
/// by default any name is accepted and no two groups may be combined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupPolicySettings {
    /// Regular expressions; a group name matching any of them is rejected
    pub disallowed_name_patterns: Vec<String>,
    /// Sets of groups a user may belong to together
    pub compatible_groups: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordSettings {
    pub length: usize,
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            length: DEFAULT_PASSWORD_LENGTH,
        }
    }
}

impl ToolkitConfig {
    pub fn from_toml_str(text: &str) -> IamToolkitResult<Self> {
        toml::from_str(text)
            .map_err(|e| IamToolkitError::configuration(format!("Invalid configuration: {e}")))
    }

    pub fn load(path: &Path) -> IamToolkitResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            IamToolkitError::configuration(format!(
                "Failed to read configuration file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&text)
    }

    /// Load from `path` when given, otherwise fall back to defaults
    pub fn load_or_default(path: Option<&Path>) -> IamToolkitResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
