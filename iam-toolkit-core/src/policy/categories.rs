//! Bucket group names into free-form categories by regular expression.

use std::collections::BTreeMap;

use regex::Regex;

use crate::error::{IamToolkitError, IamToolkitResult};

/// Labels paired with optional patterns, in declaration order.
///
/// Patterns match from the start of a group name. At most one label may be
/// declared with an empty pattern; it never matches on its own and collects the
/// groups no pattern matched.
#[derive(Debug, Clone)]
pub struct GroupCategories {
    entries: Vec<(String, Option<Regex>)>,
}

/// Pair each category label with the pattern at the same position.
///
/// # Errors
///
/// Fails when the two lists differ in length, when more than one pattern is empty,
/// or when a pattern is not a valid regular expression.
pub fn init_group_category_regex(
    categories: &[impl AsRef<str>],
    patterns: &[impl AsRef<str>],
) -> IamToolkitResult<GroupCategories> {
    if categories.len() != patterns.len() {
        return Err(IamToolkitError::configuration(format!(
            "Got {} group categories but {} category patterns",
            categories.len(),
            patterns.len()
        )));
    }

    if patterns.iter().filter(|p| p.as_ref().is_empty()).count() > 1 {
        return Err(IamToolkitError::configuration(
            "Only one group category may have an empty pattern",
        ));
    }

    let entries = categories
        .iter()
        .zip(patterns)
        .map(|(category, pattern)| {
            let pattern = pattern.as_ref();
            let regex = if pattern.is_empty() {
                None
            } else {
                let anchored = format!("^(?:{pattern})");
                Some(
                    Regex::new(&anchored).map_err(|source| IamToolkitError::InvalidPattern {
                        pattern: pattern.to_string(),
                        source,
                    })?,
                )
            };
            Ok((category.as_ref().to_string(), regex))
        })
        .collect::<IamToolkitResult<Vec<_>>>()?;

    Ok(GroupCategories { entries })
}

impl GroupCategories {
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    /// Label of the first category whose pattern matches, else the catch-all label
    pub fn categorize(&self, group_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, regex)| regex.as_ref().is_some_and(|r| r.is_match(group_name)))
            .or_else(|| self.entries.iter().find(|(_, regex)| regex.is_none()))
            .map(|(label, _)| label.as_str())
    }

    /// Group names by category label. Every label is present in the result; names
    /// without a category are left out.
    pub fn bucket<'a>(
        &self,
        group_names: impl IntoIterator<Item = &'a str>,
    ) -> BTreeMap<String, Vec<String>> {
        let mut buckets: BTreeMap<String, Vec<String>> =
            self.labels().map(|label| (label.to_string(), Vec::new())).collect();
        for name in group_names {
            if let Some(label) = self.categorize(name) {
                buckets
                    .entry(label.to_string())
                    .or_default()
                    .push(name.to_string());
            }
        }
        buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pattern_is_accepted() {
        let categories = init_group_category_regex(&["a", "b"], &["", ".*hello.*"]).unwrap();
        assert_eq!(categories.labels().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(categories.categorize("say-hello-world"), Some("b"));
        assert_eq!(categories.categorize("goodbye"), Some("a"));
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        let categories = init_group_category_regex(
            &["admins", "readers"],
            &["(?i).*admin", "(?i)read|.*admin"],
        )
        .unwrap();
        assert_eq!(categories.categorize("ReadOnlyAdmins"), Some("admins"));
        assert_eq!(categories.categorize("Readers"), Some("readers"));
        assert_eq!(categories.categorize("Developers"), None);
    }

    #[test]
    fn test_patterns_match_from_the_start() {
        let categories = init_group_category_regex(&["other", "hello"], &["", "hello"]).unwrap();
        assert_eq!(categories.categorize("hello-world"), Some("hello"));
        assert_eq!(categories.categorize("say-hello"), Some("other"));
    }

    #[test]
    fn test_second_empty_pattern_is_rejected() {
        let result = init_group_category_regex(&["a", "b", "c"], &["", "^x", ""]);
        assert!(matches!(result, Err(IamToolkitError::Configuration(_))));
    }

    #[test]
    fn test_bucket_lists_every_label() {
        let categories =
            init_group_category_regex(&["other", "blocked"], &["", "^Blocked"]).unwrap();
        let buckets = categories.bucket(["BlockedUsers", "AllUsers", "BlockedBots"]);
        assert_eq!(buckets["blocked"], vec!["BlockedUsers", "BlockedBots"]);
        assert_eq!(buckets["other"], vec!["AllUsers"]);

        let empty = categories.bucket(std::iter::empty());
        assert_eq!(empty.len(), 2);
        assert!(empty.values().all(Vec::is_empty));
    }

    #[test]
    fn test_length_mismatch() {
        let result = init_group_category_regex(&["a", "b"], &[".*"]);
        assert!(matches!(result, Err(IamToolkitError::Configuration(_))));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = init_group_category_regex(&["a"], &["[unclosed"]);
        assert!(matches!(result, Err(IamToolkitError::InvalidPattern { .. })));
    }
}
