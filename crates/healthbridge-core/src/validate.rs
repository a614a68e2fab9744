//! Contact form field validation

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const MSG_REQUIRED: &str = "This field is required";
pub const MSG_EMAIL: &str = "Please enter a valid email address";
pub const MSG_PHONE: &str = "Please enter a valid phone number";

/// Input type of a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Tel,
}

impl FromStr for FieldKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "email" => Ok(Self::Email),
            "tel" | "phone" => Ok(Self::Tel),
            other => Err(Error::InvalidInput(format!("Unknown field kind: {}", other))),
        }
    }
}

/// Validation rule attached to a registered field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldRule {
    pub fn new(kind: FieldKind, required: bool) -> Self {
        Self { kind, required }
    }

    pub fn check(&self, value: &str) -> Result<()> {
        validate_field(self.kind, self.required, value)
    }
}

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

fn phone_regex() -> Option<&'static Regex> {
    static PHONE: OnceLock<Option<Regex>> = OnceLock::new();
    PHONE
        .get_or_init(|| Regex::new(r"^\+?[1-9]\d{0,15}$").ok())
        .as_ref()
}

pub fn is_valid_email(value: &str) -> bool {
    email_regex().is_some_and(|re| re.is_match(value))
}

/// Spaces, dashes and parentheses are ignored
pub fn is_valid_phone(value: &str) -> bool {
    let digits: String = value
        .chars()
        .filter(|c| !(c.is_whitespace() || matches!(c, '-' | '(' | ')')))
        .collect();
    phone_regex().is_some_and(|re| re.is_match(&digits))
}

/// Check a field value; the error carries the message shown to the user
///
/// Values are trimmed first. An empty optional field is always valid.
pub fn validate_field(kind: FieldKind, required: bool, value: &str) -> Result<()> {
    let value = value.trim();
    if value.is_empty() {
        return if required {
            Err(Error::InvalidInput(MSG_REQUIRED.to_string()))
        } else {
            Ok(())
        };
    }

    match kind {
        FieldKind::Email if !is_valid_email(value) => {
            Err(Error::InvalidInput(MSG_EMAIL.to_string()))
        }
        FieldKind::Tel if !is_valid_phone(value) => {
            Err(Error::InvalidInput(MSG_PHONE.to_string()))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<()>) -> Option<String> {
        result.err().map(|e| e.to_string())
    }

    #[test]
    fn test_required() {
        assert_eq!(message(validate_field(FieldKind::Text, true, "   ")).as_deref(), Some(MSG_REQUIRED));
        assert!(validate_field(FieldKind::Text, false, "").is_ok());
        assert!(validate_field(FieldKind::Email, false, "").is_ok());
        assert!(validate_field(FieldKind::Text, true, "Jane").is_ok());
    }

    #[test]
    fn test_email() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("a.b+c@mail.co.uk"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane example@x.com"));
        assert!(!is_valid_email("@example.com"));
        assert_eq!(
            message(validate_field(FieldKind::Email, true, "nope")).as_deref(),
            Some(MSG_EMAIL)
        );
    }

    #[test]
    fn test_phone() {
        assert!(is_valid_phone("(555) 123-4567"));
        assert!(is_valid_phone("+1 555 123 4567"));
        assert!(!is_valid_phone("0123456"));
        assert!(!is_valid_phone("555-CALL-NOW"));
        assert!(!is_valid_phone("12345678901234567"));
        assert_eq!(
            message(validate_field(FieldKind::Tel, true, "abc")).as_deref(),
            Some(MSG_PHONE)
        );
    }

    #[test]
    fn test_field_kind_from_str() {
        assert_eq!("EMAIL".parse::<FieldKind>().unwrap(), FieldKind::Email);
        assert_eq!("phone".parse::<FieldKind>().unwrap(), FieldKind::Tel);
        assert!("date".parse::<FieldKind>().is_err());
    }
}
