//! Activity filters used by queries and renames.

use regex::Regex;

/// Selects activities by name and rewrites the names it selects.
pub trait ActivityFilter {
    /// Returns true if the filter selects `name`.
    fn matches(&self, name: &str) -> bool;

    /// Returns `name` with the selected part replaced by `new_name`.
    ///
    /// Names the filter does not select are returned unchanged.
    fn replace(&self, name: &str, new_name: &str) -> String;
}

/// Selects every activity, the inactive sentinel included.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyActivityFilter;

impl ActivityFilter for AnyActivityFilter {
    fn matches(&self, _name: &str) -> bool {
        true
    }

    fn replace(&self, _name: &str, new_name: &str) -> String {
        new_name.to_string()
    }
}

/// Selects one activity by its exact name.
#[derive(Debug, Clone)]
pub struct ExactActivityFilter {
    name: String,
}

impl ExactActivityFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ActivityFilter for ExactActivityFilter {
    fn matches(&self, name: &str) -> bool {
        name == self.name
    }

    fn replace(&self, name: &str, new_name: &str) -> String {
        if self.matches(name) {
            new_name.to_string()
        } else {
            name.to_string()
        }
    }
}

/// Selects activities whose name contains a match for a regular expression.
///
/// Replacement substitutes every match, so `$1`-style capture references in
/// the new name are expanded.
#[derive(Debug, Clone)]
pub struct RegexActivityFilter {
    regex: Regex,
}

impl RegexActivityFilter {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }
}

impl ActivityFilter for RegexActivityFilter {
    fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    fn replace(&self, name: &str, new_name: &str) -> String {
        self.regex.replace_all(name, new_name).into_owned()
    }
}
