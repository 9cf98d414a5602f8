//! Domain-level errors.
//!
//! These errors represent business rule violations and are independent of
//! infrastructure concerns (HTTP, database).

use std::fmt;

use thiserror::Error;

/// Identity field whose format check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatField {
    Cpf,
    Email,
    Phone,
}

impl FormatField {
    /// Message shown to clients when the field is rejected.
    pub fn message(self) -> &'static str {
        match self {
            FormatField::Cpf => "CPF inválido",
            FormatField::Email => "E-mail inválido",
            FormatField::Phone => "Número de telefone inválido",
        }
    }

    /// Field name as it appears in request payloads.
    pub fn name(self) -> &'static str {
        match self {
            FormatField::Cpf => "cpf",
            FormatField::Email => "email",
            FormatField::Phone => "phone",
        }
    }
}

impl fmt::Display for FormatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity value that must be unique among users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Email,
    Cpf,
}

impl IdentityField {
    fn label(self) -> &'static str {
        match self {
            IdentityField::Email => "E-mail",
            IdentityField::Cpf => "CPF",
        }
    }
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value object rejected its raw input
    #[error("{}", .0.message())]
    InvalidFormat(FormatField),

    /// An e-mail or CPF is already owned by another user
    #[error("{field} já cadastrado: {value}")]
    DuplicateIdentity { field: IdentityField, value: String },

    /// Aggregate invariant or input rule violated
    #[error("{0}")]
    Validation(String),

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal domain error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Create a duplicate e-mail error
    pub fn duplicate_email(value: impl Into<String>) -> Self {
        DomainError::DuplicateIdentity {
            field: IdentityField::Email,
            value: value.into(),
        }
    }

    /// Create a duplicate CPF error
    pub fn duplicate_cpf(value: impl Into<String>) -> Self {
        DomainError::DuplicateIdentity {
            field: IdentityField::Cpf,
            value: value.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>) -> Self {
        DomainError::NotFound(entity.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        DomainError::Internal(msg.into())
    }

    /// Field that failed a format check, if this is a format error.
    pub fn field(&self) -> Option<FormatField> {
        match self {
            DomainError::InvalidFormat(field) => Some(*field),
            _ => None,
        }
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_messages() {
        assert_eq!(
            DomainError::InvalidFormat(FormatField::Cpf).to_string(),
            "CPF inválido"
        );
        assert_eq!(
            DomainError::InvalidFormat(FormatField::Email).to_string(),
            "E-mail inválido"
        );
        assert_eq!(
            DomainError::InvalidFormat(FormatField::Phone).to_string(),
            "Número de telefone inválido"
        );
    }

    #[test]
    fn test_duplicate_messages() {
        assert_eq!(
            DomainError::duplicate_email("a@b.co").to_string(),
            "E-mail já cadastrado: a@b.co"
        );
        assert_eq!(
            DomainError::duplicate_cpf("11144477735").to_string(),
            "CPF já cadastrado: 11144477735"
        );
    }

    #[test]
    fn test_field_accessor() {
        assert_eq!(
            DomainError::InvalidFormat(FormatField::Phone).field(),
            Some(FormatField::Phone)
        );
        assert_eq!(DomainError::validation("x").field(), None);
    }
}
