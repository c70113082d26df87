use crate::error::{AppError, AppResult, FieldError};
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$")
        .expect("EMAIL_REGEX: invalid regex pattern")
});

static PROMO_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9]{4,20}$").expect("PROMO_CODE_REGEX: invalid regex pattern")
});

static REFERRAL_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9]{8}$").expect("REFERRAL_CODE_REGEX: invalid regex pattern")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

pub fn is_valid_promo_code(code: &str) -> bool {
    PROMO_CODE_REGEX.is_match(code)
}

pub fn is_valid_referral_code(code: &str) -> bool {
    REFERRAL_CODE_REGEX.is_match(code)
}

/// Collects field errors and turns them into a single `AppError::FieldErrors`.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add(field, message);
        }
    }

    pub fn into_result(self) -> AppResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::FieldErrors(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.ng"));
        assert!(!is_valid_email("ada@"));
        assert!(!is_valid_email("ada example.com"));
    }

    #[test]
    fn test_codes() {
        assert!(is_valid_promo_code("WELCOME10"));
        assert!(!is_valid_promo_code("abc"));
        assert!(!is_valid_promo_code("welcome10"));
        assert!(is_valid_referral_code("AB12CD34"));
        assert!(!is_valid_referral_code("AB12CD3"));
    }

    #[test]
    fn test_field_errors_collects_all() {
        let mut errors = ValidationErrors::new();
        errors.check(false, "email", "Invalid email");
        errors.check(true, "phone", "unused");
        errors.add("password", "Too short");
        match errors.into_result() {
            Err(AppError::FieldErrors(list)) => {
                assert_eq!(list.len(), 2);
                assert_eq!(list[0].field, "email");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
