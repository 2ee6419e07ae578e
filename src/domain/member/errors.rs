//! Member-specific error types.

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Errors surfaced by member operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberError {
    /// Member was not found (carries the reference as given by the caller).
    NotFound(String),
    /// Validation failed on a specific field.
    ValidationFailed { field: String, message: String },
    /// A child with this name already exists for the same parent.
    DuplicateChild { name: String },
    /// A relationship link pointed a member at itself.
    SelfReference(String),
    /// Some other conflicting state.
    Conflict(String),
    /// Caller lacks the required permission.
    Forbidden,
    /// Store or other infrastructure failure.
    Infrastructure(String),
}

impl MemberError {
    pub fn not_found(reference: impl Into<String>) -> Self {
        MemberError::NotFound(reference.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        MemberError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn duplicate_child(name: impl Into<String>) -> Self {
        MemberError::DuplicateChild { name: name.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        MemberError::Conflict(message.into())
    }

    pub fn forbidden() -> Self {
        MemberError::Forbidden
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        MemberError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            MemberError::NotFound(_) => ErrorCode::MemberNotFound,
            MemberError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            MemberError::DuplicateChild { .. } => ErrorCode::DuplicateChild,
            MemberError::SelfReference(_) => ErrorCode::SelfReference,
            MemberError::Conflict(_) => ErrorCode::Conflict,
            MemberError::Forbidden => ErrorCode::Forbidden,
            MemberError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            MemberError::NotFound(reference) => format!("Member not found: {}", reference),
            MemberError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            MemberError::DuplicateChild { name } => {
                format!("A child named '{}' already exists for this parent", name)
            }
            MemberError::SelfReference(relation) => {
                format!("Member cannot be their own {}", relation)
            }
            MemberError::Conflict(msg) => msg.clone(),
            MemberError::Forbidden => "Permission denied".to_string(),
            MemberError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for MemberError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for MemberError {}

impl From<DomainError> for MemberError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::MemberNotFound => MemberError::NotFound(err.message),
            ErrorCode::Forbidden | ErrorCode::Unauthorized => MemberError::Forbidden,
            ErrorCode::DuplicateChild => MemberError::DuplicateChild { name: err.message },
            ErrorCode::SelfReference => MemberError::SelfReference(err.message),
            ErrorCode::DuplicateMarriage | ErrorCode::Conflict => {
                MemberError::Conflict(err.message)
            }
            ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::InvalidFormat => {
                let field = err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string());
                MemberError::ValidationFailed {
                    field,
                    message: err.message,
                }
            }
            _ => MemberError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for MemberError {
    fn from(err: ValidationError) -> Self {
        MemberError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_taxonomy() {
        assert_eq!(MemberError::not_found("M0001").code(), ErrorCode::MemberNotFound);
        assert_eq!(
            MemberError::duplicate_child("Ram Patil").code(),
            ErrorCode::DuplicateChild
        );
        assert_eq!(MemberError::forbidden().code(), ErrorCode::Forbidden);
    }

    #[test]
    fn domain_validation_error_keeps_field_detail() {
        let domain = DomainError::validation("dob", "Field 'dob' is required");
        let err: MemberError = domain.into();
        assert!(matches!(
            err,
            MemberError::ValidationFailed { field, .. } if field == "dob"
        ));
    }

    #[test]
    fn database_errors_become_infrastructure() {
        let domain = DomainError::new(ErrorCode::DatabaseError, "connection refused");
        let err: MemberError = domain.into();
        assert!(matches!(err, MemberError::Infrastructure(_)));
    }

    #[test]
    fn display_includes_child_name() {
        let err = MemberError::duplicate_child("Asha Patil");
        assert!(err.to_string().contains("Asha Patil"));
    }
}
