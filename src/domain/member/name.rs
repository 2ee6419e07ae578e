//! Person name value object.
//!
//! Full names are always recomputed from the component parts. Client-supplied
//! full name strings are never trusted over the computed value.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Collapses repeated whitespace and trims the ends.
///
/// Returns None when nothing but whitespace remains.
pub fn clean(value: &str) -> Option<String> {
    let cleaned = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// A person's name, split into its stored components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    prefix: Option<String>,
    first: String,
    middle: Option<String>,
    last: String,
}

impl PersonName {
    /// Builds a name from raw component strings.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if first or last name is blank after cleaning
    pub fn new(
        prefix: Option<&str>,
        first: &str,
        middle: Option<&str>,
        last: &str,
    ) -> Result<Self, ValidationError> {
        let first = clean(first).ok_or_else(|| ValidationError::empty_field("firstName"))?;
        let last = clean(last).ok_or_else(|| ValidationError::empty_field("lastName"))?;
        Ok(Self {
            prefix: prefix.and_then(clean),
            first,
            middle: middle.and_then(clean),
            last,
        })
    }

    /// Returns the name prefix (honorific), if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Returns the first name.
    pub fn first(&self) -> &str {
        &self.first
    }

    /// Returns the middle name, if any.
    pub fn middle(&self) -> Option<&str> {
        self.middle.as_deref()
    }

    /// Returns the last name (surname).
    pub fn last(&self) -> &str {
        &self.last
    }

    /// Replaces the surname, e.g. when a spouse inherits the member's.
    pub fn with_last(mut self, last: &str) -> Result<Self, ValidationError> {
        self.last = clean(last).ok_or_else(|| ValidationError::empty_field("lastName"))?;
        Ok(self)
    }

    /// The display form: `prefix first middle last` with blanks dropped.
    pub fn full(&self) -> String {
        [
            self.prefix.as_deref(),
            Some(self.first.as_str()),
            self.middle.as_deref(),
            Some(self.last.as_str()),
        ]
        .iter()
        .flatten()
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_collapses_inner_whitespace() {
        assert_eq!(clean("  Asha   Devi  "), Some("Asha Devi".to_string()));
        assert_eq!(clean("   "), None);
    }

    #[test]
    fn full_name_composes_all_parts() {
        let name = PersonName::new(Some("Shri"), "Ram", Some("Krishna"), "Patil").unwrap();
        assert_eq!(name.full(), "Shri Ram Krishna Patil");
    }

    #[test]
    fn full_name_skips_missing_parts() {
        let name = PersonName::new(None, "Sita", None, "Patil").unwrap();
        assert_eq!(name.full(), "Sita Patil");
    }

    #[test]
    fn name_cleans_components() {
        let name = PersonName::new(None, "  Ram  ", Some("  "), " Patil  ").unwrap();
        assert_eq!(name.first(), "Ram");
        assert_eq!(name.middle(), None);
        assert_eq!(name.last(), "Patil");
    }

    #[test]
    fn blank_first_name_is_rejected() {
        let result = PersonName::new(None, "   ", None, "Patil");
        assert!(matches!(result, Err(ValidationError::EmptyField { field }) if field == "firstName"));
    }

    #[test]
    fn blank_last_name_is_rejected() {
        let result = PersonName::new(None, "Ram", None, "");
        assert!(matches!(result, Err(ValidationError::EmptyField { field }) if field == "lastName"));
    }

    #[test]
    fn with_last_replaces_surname() {
        let name = PersonName::new(None, "Asha", None, "Kale").unwrap();
        let renamed = name.with_last("Patil").unwrap();
        assert_eq!(renamed.full(), "Asha Patil");
    }
}
