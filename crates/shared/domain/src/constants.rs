//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// CPF
// =============================================================================

/// Number of digits in a canonical CPF
pub const CPF_LENGTH: usize = 11;

/// Number of leading digits covered by the first check digit
pub const CPF_BASE_DIGITS: usize = 9;

// =============================================================================
// Email
// =============================================================================

/// Longest accepted e-mail address (RFC 5321 path limit)
pub const EMAIL_MAX_LENGTH: usize = 254;

// =============================================================================
// Phone
// =============================================================================

/// Only country code accepted for phone numbers
pub const BRAZIL_COUNTRY_CODE: &str = "+55";

/// Digits after the country code for a landline (area code + 8)
pub const LANDLINE_DIGITS: usize = 10;

/// Digits after the country code for a mobile (area code + 9)
pub const MOBILE_DIGITS: usize = 11;

// =============================================================================
// User input
// =============================================================================

/// Minimum name length
pub const MIN_NAME_LENGTH: usize = 2;

/// Maximum name length
pub const MAX_NAME_LENGTH: usize = 100;

/// Minimum plain password length
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum plain password length
pub const MAX_PASSWORD_LENGTH: usize = 20;
