//! Field-level validation errors for request payloads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

/// Validation messages keyed by the wire (camelCase) name of the offending field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single failing field
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok(value)` when nothing failed, otherwise the collected errors
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    /// A required, non-blank string of at most `max` characters
    pub(crate) fn require_text(&mut self, field: &str, value: Option<&str>, max: usize) {
        match value {
            Some(value) => self.check_text(field, value, max),
            None => self.add(field, format!("The {field} field is required")),
        }
    }

    /// A present string must be non-blank and at most `max` characters
    pub(crate) fn check_text(&mut self, field: &str, value: &str, max: usize) {
        if value.trim().is_empty() {
            self.add(field, format!("The {field} field must not be blank"));
        } else if value.chars().count() > max {
            self.add(field, format!("The {field} field must be at most {max} characters"));
        }
    }

    /// An optional free-text field only has a length limit
    pub(crate) fn check_max_length(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(value) = value
            && value.chars().count() > max
        {
            self.add(field, format!("The {field} field must be at most {max} characters"));
        }
    }

    pub(crate) fn check_range(&mut self, field: &str, value: Option<i32>, min: i32, max: i32) {
        if let Some(value) = value
            && !(min..=max).contains(&value)
        {
            self.add(field, format!("The {field} field must be between {min} and {max}"));
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_messages_per_field() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.require_text("title", None, 100);
        errors.check_text("moniker", "   ", 30);
        errors.check_range("level", Some(50), 100, 400);
        errors.check_range("length", Some(3), 1, 30);
        errors.check_max_length("abstract", Some("short"), 4000);

        assert!(errors.contains("title"));
        assert!(errors.contains("moniker"));
        assert!(errors.contains("level"));
        assert!(!errors.contains("length"));
        assert!(!errors.contains("abstract"));
        assert_eq!(
            errors.to_string(),
            "level: The level field must be between 100 and 400; \
             moniker: The moniker field must not be blank; \
             title: The title field is required"
        );
    }

    #[test]
    fn test_serializes_as_field_map() {
        let errors = ValidationErrors::single("moniker", "Moniker is already in use");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({"moniker": ["Moniker is already in use"]}));
        assert_eq!(errors.into_result(()), Err(ValidationErrors::single("moniker", "Moniker is already in use")));
    }
}
