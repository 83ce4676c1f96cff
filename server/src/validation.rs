use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::errors::BackendError;

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();

    // Indian mobile numbers: ten digits with a leading 6-9.
    static ref PHONE: Regex = Regex::new(r"^[6-9][0-9]{9}$").unwrap();
}

/// Normalizes a name by stripping surrounding whitespace and decomposing it
/// into Unicode Normalization Form D.
///
/// ```
/// use backend::validation::normalize_name;
/// assert_eq!(normalize_name(" asha "), "asha");
/// ```
pub fn normalize_name(name: impl AsRef<str>) -> String {
    use unicode_normalization::UnicodeNormalization;

    name.as_ref().trim().nfd().to_string()
}

/// Deserializes a `String` after running it through `normalize_name`.
pub fn deserialize_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where D: Deserializer<'de> {
    let s: &str = Deserialize::deserialize(deserializer)?;
    Ok(normalize_name(s))
}

pub fn validate_email(email: &str) -> Result<(), BackendError> {
    if EMAIL.is_match(email) {
        Ok(())
    } else {
        Err(BackendError::InvalidEmail)
    }
}

pub fn validate_phone(phone: &str) -> Result<(), BackendError> {
    if PHONE.is_match(phone) {
        Ok(())
    } else {
        Err(BackendError::InvalidPhone)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use unicode_normalization::is_nfd;

    use super::{normalize_name, validate_email, validate_phone};

    #[test]
    fn accepts_plausible_emails() {
        for email in &["a@b.co", "someone+tag@example.org", "x.y@z.example.com"] {
            assert!(validate_email(email).is_ok(), "{} should validate", email);
        }
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in &["", "plain", "a@b", "a b@c.d", "@example.com"] {
            assert!(validate_email(email).is_err(), "{} should not validate", email);
        }
    }

    #[test]
    fn rejects_malformed_phones() {
        for phone in &["", "12345", "5876543210", "987654321", "98765432101", "98765x3210"] {
            assert!(validate_phone(phone).is_err(), "{} should not validate", phone);
        }
    }

    fn count_whitespace(s: impl AsRef<str>) -> usize {
        s.as_ref().chars().filter(|c| c.is_whitespace()).count()
    }

    proptest! {
        #[test]
        fn phone_validation_works(prefix in 6..=9u32, rest in "[0-9]{9}") {
            let phone = format!("{}{}", prefix, rest);

            prop_assert!(validate_phone(&phone).is_ok(), "{:?} is a valid phone number", phone);
        }

        #[test]
        fn normalization_works(string in "(\\S.*\\S|\\S+)", space_before in "\\s*", space_after in "\\s*") {
            let normalized = normalize_name(format!("{}{}{}", space_before, string, space_after));

            prop_assert!(is_nfd(&normalized), "{:?} (normalized form of {:?}) is in NFD", normalized, string);

            prop_assert!(!normalized.starts_with(char::is_whitespace) && !normalized.ends_with(char::is_whitespace), "{:?} (normalized form of {:?}) has no leading or trailing whitespace", normalized, string);

            let trimmed = normalized.trim();

            prop_assert_eq!(count_whitespace(&normalized), count_whitespace(&trimmed), "{:?} (normalized form of {:?}) preserves inner whitespace", normalized, string);
        }
    }
}
