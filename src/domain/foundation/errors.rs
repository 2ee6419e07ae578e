//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' is required")]
    MissingField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates a missing required field validation error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        ValidationError::MissingField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field } => field,
            ValidationError::MissingField { field } => field,
            ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    EmptyField,
    InvalidFormat,

    // Not found errors
    MemberNotFound,
    MarriageNotFound,
    AccountNotFound,

    // Conflict errors
    DuplicateChild,
    DuplicateMarriage,
    SelfReference,
    Conflict,

    // Authorization errors
    Unauthorized,
    Forbidden,

    // Infrastructure errors
    DatabaseError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::MemberNotFound => "MEMBER_NOT_FOUND",
            ErrorCode::MarriageNotFound => "MARRIAGE_NOT_FOUND",
            ErrorCode::AccountNotFound => "ACCOUNT_NOT_FOUND",
            ErrorCode::DuplicateChild => "DUPLICATE_CHILD",
            ErrorCode::DuplicateMarriage => "DUPLICATE_MARRIAGE",
            ErrorCode::SelfReference => "SELF_REFERENCE",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            details: HashMap::new(),
        }
        .with_detail("field", field.into())
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        DomainError::validation(err.field().to_string(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("firstName");
        assert_eq!(format!("{}", err), "Field 'firstName' cannot be empty");
    }

    #[test]
    fn validation_error_missing_field_displays_correctly() {
        let err = ValidationError::missing_field("dob");
        assert_eq!(format!("{}", err), "Field 'dob' is required");
    }

    #[test]
    fn validation_error_exposes_field_name() {
        assert_eq!(ValidationError::missing_field("gender").field(), "gender");
        assert_eq!(
            ValidationError::invalid_format("memberId", "bad prefix").field(),
            "memberId"
        );
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::MemberNotFound, "Member not found");
        assert_eq!(format!("{}", err), "[MEMBER_NOT_FOUND] Member not found");
    }

    #[test]
    fn domain_error_with_detail_adds_detail() {
        let err = DomainError::new(ErrorCode::ValidationFailed, "Validation failed")
            .with_detail("field", "lastName")
            .with_detail("reason", "empty");

        assert_eq!(err.details.get("field"), Some(&"lastName".to_string()));
        assert_eq!(err.details.get("reason"), Some(&"empty".to_string()));
    }

    #[test]
    fn validation_error_converts_to_domain_error_with_field_detail() {
        let err: DomainError = ValidationError::missing_field("maritalStatus").into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.get("field"), Some(&"maritalStatus".to_string()));
    }

    #[test]
    fn error_code_display_formats_correctly() {
        assert_eq!(format!("{}", ErrorCode::MemberNotFound), "MEMBER_NOT_FOUND");
        assert_eq!(format!("{}", ErrorCode::DuplicateChild), "DUPLICATE_CHILD");
    }
}
