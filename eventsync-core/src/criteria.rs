//! Search criteria routing matching events into a target calendar.

use std::fmt;

/// One row of the search-terms file.
///
/// Blank string fields and an empty tag list are wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriterion {
    /// Display name of the calendar that receives matching events
    pub calendar: String,
    pub title: String,
    pub location: String,
    pub category: String,
    pub tags: Vec<String>,
}

impl SearchCriterion {
    /// True when no term restricts the result.
    pub fn is_wildcard(&self) -> bool {
        self.title.is_empty()
            && self.location.is_empty()
            && self.category.is_empty()
            && self.tags.iter().all(|t| t.is_empty())
    }

    /// Human readable summary of the non-empty terms, for logs.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.title.is_empty() {
            parts.push(format!("title containing '{}'", self.title));
        }
        if !self.location.is_empty() {
            parts.push(format!("location containing '{}'", self.location));
        }
        if !self.category.is_empty() {
            parts.push(format!("category containing '{}'", self.category));
        }
        if self.tags.iter().any(|t| !t.is_empty()) {
            parts.push(format!("tags containing [{}]", self.tags.join(", ")));
        }

        if parts.is_empty() {
            "all events".to_string()
        } else {
            parts.join(" and ")
        }
    }
}

impl fmt::Display for SearchCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.calendar.is_empty() {
            write!(f, "{}", self.describe())
        } else {
            write!(f, "{} -> '{}'", self.describe(), self.calendar)
        }
    }
}
