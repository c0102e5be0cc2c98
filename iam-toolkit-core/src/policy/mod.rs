//! Group naming rules, membership combination rules and name-based categorisation

pub mod categories;
pub mod group_policy;

pub use categories::{init_group_category_regex, GroupCategories};
pub use group_policy::GroupPolicy;
