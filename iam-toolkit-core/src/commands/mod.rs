//! Commands module - service layer for IAM toolkit operations

mod access_keys;
mod groups;
pub(crate) mod service;
mod teardown;
mod users;

pub use service::IamToolkitService;
pub use teardown::{Teardown, TeardownReport};
pub use users::PASSWORD_GENERATION_FAILED;
