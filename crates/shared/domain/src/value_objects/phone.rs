//! Phone value object.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{BRAZIL_COUNTRY_CODE, LANDLINE_DIGITS, MOBILE_DIGITS};
use crate::error::{DomainError, DomainResult, FormatField};

/// Brazilian phone number in canonical `+55<area><number>` form.
///
/// A phone may be empty: users are not required to have one, and the empty
/// value is always valid.
///
/// ```
/// use domain::Phone;
///
/// let phone = Phone::parse(Some("(11) 98765-4321")).unwrap();
/// assert_eq!(phone.value(), "+5511987654321");
/// assert_eq!(phone.formatted(), "+55 (11) 98765-4321");
/// assert!(Phone::parse(None).unwrap().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Phone(String);

impl Phone {
    /// Normalize and validate a phone number.
    ///
    /// Everything except digits and `+` is dropped; numbers without a
    /// country code are assumed Brazilian.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidFormat(FormatField::Phone)` for foreign
    /// country codes or a digit count other than 10 or 11 after `+55`.
    pub fn parse(raw: Option<&str>) -> DomainResult<Self> {
        let raw = match raw {
            None | Some("") => return Ok(Self::empty()),
            Some(raw) => raw,
        };

        let mut cleaned: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        if !cleaned.starts_with('+') {
            cleaned.insert_str(0, BRAZIL_COUNTRY_CODE);
        }

        let national = cleaned
            .strip_prefix(BRAZIL_COUNTRY_CODE)
            .ok_or_else(Self::invalid)?;
        let digit_count_ok = matches!(national.len(), LANDLINE_DIGITS | MOBILE_DIGITS);
        if !digit_count_ok || !national.chars().all(|c| c.is_ascii_digit()) {
            return Err(Self::invalid());
        }

        Ok(Self(cleaned))
    }

    /// The absent phone.
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Canonical form, or `""` when empty.
    pub fn value(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical form, or `None` when empty.
    pub fn as_option(&self) -> Option<&str> {
        (!self.is_empty()).then_some(self.0.as_str())
    }

    /// Display form: `+55 (DD) DDDDD-DDDD` for mobiles, `+55 (DD) DDDD-DDDD`
    /// for landlines, `""` when empty.
    pub fn formatted(&self) -> String {
        let Some(national) = self.0.strip_prefix(BRAZIL_COUNTRY_CODE) else {
            return String::new();
        };
        let (area, number) = national.split_at(2);
        let split = if national.len() == MOBILE_DIGITS { 5 } else { 4 };
        let (head, tail) = number.split_at(split);
        format!("{BRAZIL_COUNTRY_CODE} ({area}) {head}-{tail}")
    }

    fn invalid() -> DomainError {
        DomainError::InvalidFormat(FormatField::Phone)
    }
}

impl Serialize for Phone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.as_option().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Phone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        Phone::parse(s.as_deref()).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_valid_inputs() {
        let cases = [
            ("+5511987654321", "+5511987654321"),
            ("+551187654321", "+551187654321"),
            ("11987654321", "+5511987654321"),
            ("1187654321", "+551187654321"),
            ("(11) 98765-4321", "+5511987654321"),
            ("(11) 8765-4321", "+551187654321"),
            ("+55 (11) 98765-4321", "+5511987654321"),
            ("+55 11 98765-4321", "+5511987654321"),
            ("11.98765.4321", "+5511987654321"),
            ("+55 (11) 9.8765-4321", "+5511987654321"),
            ("  11987654321  ", "+5511987654321"),
        ];
        for (raw, canonical) in cases {
            let phone = Phone::parse(Some(raw)).unwrap_or_else(|_| panic!("{raw} should be valid"));
            assert_eq!(phone.value(), canonical);
        }
    }

    #[test]
    fn test_phone_invalid_inputs() {
        let cases = [
            "123",
            "12345678901234",
            "+1234567890123",
            "abcdefghijk",
            "+55119876543210",
        ];
        for raw in cases {
            assert_eq!(
                Phone::parse(Some(raw)),
                Err(DomainError::InvalidFormat(FormatField::Phone)),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_phone_absent_is_empty() {
        for raw in [None, Some("")] {
            let phone = Phone::parse(raw).unwrap();
            assert!(phone.is_empty());
            assert_eq!(phone.value(), "");
            assert_eq!(phone.formatted(), "");
            assert_eq!(phone.as_option(), None);
        }
    }

    #[test]
    fn test_phone_formatting() {
        let mobile = Phone::parse(Some("+5511987654321")).unwrap();
        assert_eq!(mobile.formatted(), "+55 (11) 98765-4321");
        assert_eq!(mobile.to_string(), "+55 (11) 98765-4321");

        let landline = Phone::parse(Some("+551187654321")).unwrap();
        assert_eq!(landline.formatted(), "+55 (11) 8765-4321");
    }

    #[test]
    fn test_phone_format_round_trip() {
        let phone = Phone::parse(Some("11987654321")).unwrap();
        let reparsed = Phone::parse(Some(&phone.formatted())).unwrap();
        assert_eq!(reparsed, phone);
    }

    #[test]
    fn test_phone_serde() {
        let phone: Phone = serde_json::from_str("\"(11) 98765-4321\"").unwrap();
        assert_eq!(serde_json::to_string(&phone).unwrap(), "\"+5511987654321\"");

        let empty: Phone = serde_json::from_str("null").unwrap();
        assert!(empty.is_empty());
        assert_eq!(serde_json::to_string(&empty).unwrap(), "null");
    }
}
