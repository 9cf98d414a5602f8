//! CPF value object.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{CPF_BASE_DIGITS, CPF_LENGTH};
use crate::error::{DomainError, DomainResult, FormatField};

/// Brazilian taxpayer number, stored as its 11 canonical digits.
///
/// Any separators in the input are ignored, so `"111.444.777-35"` and
/// `"11144477735"` build equal values.
///
/// ```
/// use domain::Cpf;
///
/// let cpf = Cpf::parse("111.444.777-35").unwrap();
/// assert_eq!(cpf.value(), "11144477735");
/// assert_eq!(cpf.formatted(), "111.444.777-35");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cpf(String);

impl Cpf {
    /// Parse a CPF from any string carrying its 11 digits.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidFormat(FormatField::Cpf)` when the digit
    /// count is wrong, all digits are equal, or a check digit mismatches.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let digits: Vec<u32> = raw.chars().filter_map(|c| c.to_digit(10)).collect();

        if digits.len() != CPF_LENGTH {
            return Err(Self::invalid());
        }
        if digits.iter().all(|d| *d == digits[0]) {
            return Err(Self::invalid());
        }
        if check_digit(&digits[..CPF_BASE_DIGITS]) != digits[CPF_BASE_DIGITS] {
            return Err(Self::invalid());
        }
        if check_digit(&digits[..CPF_BASE_DIGITS + 1]) != digits[CPF_BASE_DIGITS + 1] {
            return Err(Self::invalid());
        }

        let canonical = digits
            .iter()
            .filter_map(|d| char::from_digit(*d, 10))
            .collect();
        Ok(Self(canonical))
    }

    /// Canonical 11-digit form, used for storage and comparison.
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Display form `DDD.DDD.DDD-DD`.
    pub fn formatted(&self) -> String {
        let d = &self.0;
        format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    fn invalid() -> DomainError {
        DomainError::InvalidFormat(FormatField::Cpf)
    }
}

/// Mod-11 check digit over `digits`, with weights counting down to 2.
fn check_digit(digits: &[u32]) -> u32 {
    let top = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top - i as u32))
        .sum();
    match (sum * 10) % 11 {
        10 => 0,
        r => r,
    }
}

impl Serialize for Cpf {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Cpf {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Cpf::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}
