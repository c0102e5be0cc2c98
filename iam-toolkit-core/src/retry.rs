//! Retry-on-conflict deletion of a batch of IAM entities.
//!
//! Each round attempts to delete every pending name once. Entities the IAM API
//! reports as temporarily unmodifiable or still in use stay pending and are
//! retried after a fixed delay; any other failure aborts the run.

use std::future::Future;
use std::time::Duration;

use log::{debug, info, warn};

use crate::aws::codes;
use crate::config::RetrySettings;
use crate::error::{IamToolkitError, IamToolkitResult};
use crate::types::{DeletionReport, OperationError};

/// Error codes that may clear up on their own
pub const TRANSIENT_ERROR_CODES: [&str; 2] = [
    codes::ENTITY_TEMPORARILY_UNMODIFIABLE,
    codes::DELETE_CONFLICT,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Transient,
    Fatal,
}

/// Classify the outcome of one deletion attempt; `None` means it succeeded.
///
/// A list is transient only if every entry carries a transient code.
pub fn classify(errors: &[OperationError]) -> Option<ErrorClass> {
    if errors.is_empty() {
        None
    } else if errors
        .iter()
        .all(|e| TRANSIENT_ERROR_CODES.contains(&e.code.as_str()))
    {
        Some(ErrorClass::Transient)
    } else {
        Some(ErrorClass::Fatal)
    }
}

#[derive(Debug, Clone)]
pub struct DeletionDriver {
    delay: Duration,
    max_rounds: Option<u32>,
}

impl Default for DeletionDriver {
    fn default() -> Self {
        Self::from_settings(&RetrySettings::default())
    }
}

impl DeletionDriver {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            max_rounds: None,
        }
    }

    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self {
            delay: settings.delay(),
            max_rounds: settings.max_rounds,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = Some(max_rounds);
        self
    }

    /// Delete every name in `names` with `delete`, retrying transient failures.
    ///
    /// Duplicate names are attempted once. The pending set only ever shrinks.
    pub async fn run<F, Fut>(
        &self,
        names: Vec<String>,
        mut delete: F,
    ) -> IamToolkitResult<DeletionReport>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Vec<OperationError>>,
    {
        let mut pending: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            if !pending.contains(&name) {
                pending.push(name);
            }
        }

        let mut report = DeletionReport::default();
        while !pending.is_empty() {
            report.rounds += 1;
            debug!(
                "Deletion round {}: {} entities pending",
                report.rounds,
                pending.len()
            );

            let mut remaining = Vec::with_capacity(pending.len());
            for name in pending {
                let errors = delete(name.clone()).await;
                match classify(&errors) {
                    None => {
                        debug!("Deleted {name}");
                        report.deleted.push(name);
                    }
                    Some(ErrorClass::Transient) => {
                        debug!("{name} is not deletable yet: {errors:?}");
                        remaining.push(name);
                    }
                    Some(ErrorClass::Fatal) => {
                        warn!("Failed to delete {name}, aborting");
                        return Err(IamToolkitError::DeletionAborted { name, errors });
                    }
                }
            }
            pending = remaining;

            if pending.is_empty() {
                break;
            }
            if self.max_rounds.is_some_and(|max| report.rounds >= max) {
                return Err(IamToolkitError::RetriesExhausted {
                    rounds: report.rounds,
                    pending,
                });
            }

            info!(
                "Sleeping {:?} before another attempt at deleting {} IAM entities...",
                self.delay,
                pending.len()
            );
            tokio::time::sleep(self.delay).await;
            report.delays += 1;
        }

        Ok(report)
    }
}
