use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{CoreError, Result};

/// Contact details collected after the tournament resolves and before the
/// summary screen unlocks. A lead is only attached to the session once it
/// passes validation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct Lead {
    #[validate(length(min = 2, max = 80))]
    pub full_name: String,
    #[validate(custom = "validate_phone")]
    pub phone: String,
    #[validate(email)]
    pub email: String,
}

impl Lead {
    pub fn ensure_valid(&self) -> Result<()> {
        self.validate()
            .map_err(|errors| CoreError::ValidationError(errors.to_string()))
    }
}

/// Accepts an optional leading `+`, separators, and 9 to 13 digits.
fn validate_phone(phone: &str) -> std::result::Result<(), ValidationError> {
    let trimmed = phone.strip_prefix('+').unwrap_or(phone);
    let digits: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    let count = digits.chars().count();
    if !(9..=13).contains(&count) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("phone"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(name: &str, phone: &str, email: &str) -> Lead {
        Lead {
            full_name: name.to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn test_valid_lead_passes() {
        assert!(lead("נועה לוי", "050-1234567", "noa@example.com")
            .ensure_valid()
            .is_ok());
        assert!(lead("Dana", "+972 50 123 4567", "dana@example.co.il")
            .ensure_valid()
            .is_ok());
    }

    #[test]
    fn test_short_name_is_rejected() {
        assert!(lead("N", "0501234567", "noa@example.com")
            .ensure_valid()
            .is_err());
    }

    #[test]
    fn test_bad_email_is_rejected() {
        assert!(lead("Noa Levi", "0501234567", "not-an-email")
            .ensure_valid()
            .is_err());
    }

    #[test]
    fn test_phone_rules() {
        assert!(lead("Noa Levi", "12345", "noa@example.com")
            .ensure_valid()
            .is_err());
        assert!(lead("Noa Levi", "05o1234567", "noa@example.com")
            .ensure_valid()
            .is_err());
        assert!(lead("Noa Levi", "(050) 123-4567", "noa@example.com")
            .ensure_valid()
            .is_ok());
    }
}
