//! Form field validity tracking
//!
//! A field turns dirty on its first edit. When a dirty field loses focus it is
//! checked against its constraints: passing marks it valid, failing marks it
//! invalid and records one message per violated constraint, joined with `;`.

use crate::error::{PanelError, Result};
use regex::Regex;
use std::collections::BTreeMap;

/// Separator between validity messages
pub const ERRMSG_SEPARATOR: &str = ";";

/// Constraint a field value can violate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Constraint {
    ValueMissing,
    TooLong,
    PatternMismatch,
}

/// Constraints declared on a field, each with its message
#[derive(Debug, Clone, Default)]
pub struct FieldConstraints {
    required: bool,
    max_length: Option<usize>,
    pattern: Option<Regex>,
    messages: BTreeMap<Constraint, String>,
}

impl FieldConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.required = true;
        self.messages.insert(Constraint::ValueMissing, message.into());
        self
    }

    /// Limit in characters
    pub fn max_length(mut self, max: usize, message: impl Into<String>) -> Self {
        self.max_length = Some(max);
        self.messages.insert(Constraint::TooLong, message.into());
        self
    }

    /// Whole-value pattern; empty values are not matched
    pub fn pattern(mut self, pattern: &str, message: impl Into<String>) -> Result<Self> {
        let anchored = Regex::new(&format!("^(?:{})$", pattern))
            .map_err(|e| PanelError::Validation(format!("invalid pattern {:?}: {}", pattern, e)))?;
        self.pattern = Some(anchored);
        self.messages.insert(Constraint::PatternMismatch, message.into());
        Ok(self)
    }

    /// Constraints violated by `value`
    pub fn check(&self, value: &str) -> Vec<Constraint> {
        let mut violations = Vec::new();

        if self.required && value.trim().is_empty() {
            violations.push(Constraint::ValueMissing);
        }
        if let Some(max) = self.max_length {
            if value.chars().count() > max {
                violations.push(Constraint::TooLong);
            }
        }
        if let Some(pattern) = &self.pattern {
            if !value.is_empty() && !pattern.is_match(value) {
                violations.push(Constraint::PatternMismatch);
            }
        }

        violations
    }

    /// Messages for the given violations, joined with [`ERRMSG_SEPARATOR`]
    pub fn messages_for(&self, violations: &[Constraint]) -> String {
        violations
            .iter()
            .filter_map(|c| self.messages.get(c).map(String::as_str))
            .collect::<Vec<_>>()
            .join(ERRMSG_SEPARATOR)
    }
}

/// Validity of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldState {
    #[default]
    Unchecked,
    Valid,
    Invalid,
}

/// Dirty / valid / invalid tracking for one field
#[derive(Debug, Clone, Default)]
pub struct FieldValidity {
    constraints: FieldConstraints,
    dirty: bool,
    state: FieldState,
    messages: String,
}

impl FieldValidity {
    pub fn new(constraints: FieldConstraints) -> Self {
        Self {
            constraints,
            ..Self::default()
        }
    }

    /// The user edited the field
    pub fn on_input(&mut self) {
        self.dirty = true;
    }

    /// The field lost focus; only dirty fields are checked
    pub fn on_focus_out(&mut self, value: &str) -> FieldState {
        if self.dirty {
            let violations = self.constraints.check(value);
            if violations.is_empty() {
                self.mark_valid();
            } else {
                self.on_invalid(&violations);
            }
        }
        self.state
    }

    /// Record violations and mark the field invalid
    pub fn on_invalid(&mut self, violations: &[Constraint]) {
        self.state = FieldState::Invalid;
        self.messages = self.constraints.messages_for(violations);
    }

    /// Check `value` on submit regardless of dirtiness
    pub fn validate(&mut self, value: &str) -> Result<()> {
        let violations = self.constraints.check(value);
        if violations.is_empty() {
            self.mark_valid();
            Ok(())
        } else {
            self.on_invalid(&violations);
            Err(PanelError::Validation(self.messages.clone()))
        }
    }

    fn mark_valid(&mut self) {
        self.state = FieldState::Valid;
        self.messages.clear();
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn state(&self) -> FieldState {
        self.state
    }

    /// Messages of the last failed check
    pub fn messages(&self) -> &str {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jar_field() -> FieldValidity {
        FieldValidity::new(
            FieldConstraints::new()
                .required("Please enter a jar name")
                .max_length(12, "Too long")
                .pattern(r".+\.jar", "Must be a .jar file")
                .unwrap(),
        )
    }

    #[test]
    fn test_pristine_field_is_not_checked_on_focus_out() {
        let mut field = jar_field();
        assert_eq!(field.on_focus_out(""), FieldState::Unchecked);
        assert!(!field.is_dirty());
    }

    #[test]
    fn test_dirty_field_becomes_valid() {
        let mut field = jar_field();
        field.on_input();
        assert_eq!(field.on_focus_out("server.jar"), FieldState::Valid);
        assert_eq!(field.messages(), "");
    }

    #[test]
    fn test_messages_are_joined() {
        let mut field = jar_field();
        field.on_input();
        assert_eq!(field.on_focus_out("a-very-long-name.zip"), FieldState::Invalid);
        assert_eq!(field.messages(), "Too long;Must be a .jar file");
    }

    #[test]
    fn test_invalid_then_valid_clears_messages() {
        let mut field = jar_field();
        assert!(field.validate("   ").is_err());
        assert_eq!(field.messages(), "Please enter a jar name");

        assert!(field.validate("ok.jar").is_ok());
        assert_eq!(field.state(), FieldState::Valid);
        assert_eq!(field.messages(), "");
    }

    #[test]
    fn test_empty_value_skips_pattern() {
        let constraints = FieldConstraints::new().pattern("[0-9]+", "digits").unwrap();
        assert!(constraints.check("").is_empty());
        assert_eq!(constraints.check("12a"), vec![Constraint::PatternMismatch]);
    }

    #[test]
    fn test_bad_pattern_is_rejected() {
        assert!(FieldConstraints::new().pattern("(", "never").is_err());
    }
}
