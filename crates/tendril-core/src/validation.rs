//! Shared validation utilities for string identifiers.
//!
//! Capability names, context keys, and other identifiers share the same
//! validation core with per-identifier rules, so the rules live in one
//! place instead of being duplicated across newtypes.

use std::fmt;

/// Validation rules for string identifiers.
#[derive(Debug, Clone, Copy)]
pub struct IdentifierRules {
    /// Maximum allowed length in characters
    pub max_length: usize,
    /// Whether to allow dots (.) in the identifier
    pub allow_dots: bool,
    /// Whether to allow colons (:) in the identifier
    pub allow_colons: bool,
}

impl IdentifierRules {
    /// Standard rules for capability names.
    ///
    /// - Max length: 64 characters
    /// - Allows: alphanumeric, `_`, `-`
    /// - Disallows: `.`, `:`, spaces, and other special characters
    pub const CAPABILITY_NAME: Self = Self {
        max_length: 64,
        allow_dots: false,
        allow_colons: false,
    };

    /// Standard rules for workflow context keys.
    ///
    /// - Max length: 128 characters
    /// - Allows: alphanumeric, `_`, `-`, `.`, `:`
    ///
    /// The additional characters enable namespacing patterns like
    /// `research.summary` or `step:3:output`.
    pub const CONTEXT_KEY: Self = Self {
        max_length: 128,
        allow_dots: true,
        allow_colons: true,
    };

    /// Validate a string against these rules.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The validated (trimmed) string
    /// * `Err(ValidationError)` - Description of the validation failure
    pub fn validate(&self, input: &str) -> Result<String, ValidationError> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }

        if trimmed.len() > self.max_length {
            return Err(ValidationError::TooLong {
                length: trimmed.len(),
                max: self.max_length,
            });
        }

        for ch in trimmed.chars() {
            let is_valid = ch.is_alphanumeric()
                || ch == '_'
                || ch == '-'
                || (self.allow_dots && ch == '.')
                || (self.allow_colons && ch == ':');
            if !is_valid {
                return Err(ValidationError::InvalidCharacter { character: ch });
            }
        }

        Ok(trimmed.to_string())
    }
}

/// Errors produced by identifier validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Identifier was empty or whitespace-only.
    Empty,

    /// Identifier exceeded the maximum length.
    TooLong { length: usize, max: usize },

    /// Identifier contained a disallowed character.
    InvalidCharacter { character: char },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Empty => write!(f, "Identifier cannot be empty"),
            ValidationError::TooLong { length, max } => {
                write!(f, "Identifier too long: {} characters (max: {})", length, max)
            }
            ValidationError::InvalidCharacter { character } => {
                write!(f, "Identifier contains invalid character: '{}'", character)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_name_rules_accept_valid_names() {
        assert_eq!(
            IdentifierRules::CAPABILITY_NAME.validate("web_search"),
            Ok("web_search".to_string())
        );
        assert_eq!(
            IdentifierRules::CAPABILITY_NAME.validate("  fetch-page "),
            Ok("fetch-page".to_string())
        );
    }

    #[test]
    fn capability_name_rules_reject_invalid_names() {
        assert_eq!(
            IdentifierRules::CAPABILITY_NAME.validate(""),
            Err(ValidationError::Empty)
        );
        assert_eq!(
            IdentifierRules::CAPABILITY_NAME.validate("   "),
            Err(ValidationError::Empty)
        );
        assert!(matches!(
            IdentifierRules::CAPABILITY_NAME.validate("has space"),
            Err(ValidationError::InvalidCharacter { character: ' ' })
        ));
        assert!(matches!(
            IdentifierRules::CAPABILITY_NAME.validate("dotted.name"),
            Err(ValidationError::InvalidCharacter { .. })
        ));
        let long = "x".repeat(65);
        assert!(matches!(
            IdentifierRules::CAPABILITY_NAME.validate(&long),
            Err(ValidationError::TooLong { length: 65, max: 64 })
        ));
    }

    #[test]
    fn context_key_rules_allow_namespacing() {
        assert_eq!(
            IdentifierRules::CONTEXT_KEY.validate("research.summary"),
            Ok("research.summary".to_string())
        );
        assert_eq!(
            IdentifierRules::CONTEXT_KEY.validate("step:3:output"),
            Ok("step:3:output".to_string())
        );
    }
}
