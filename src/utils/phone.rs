use crate::error::{AppError, AppResult};

/// Normalise a Nigerian phone number to `+234XXXXXXXXXX`.
///
/// Accepts local `0XXXXXXXXXX` and international `234XXXXXXXXXX` forms with
/// any punctuation in between.
pub fn normalize_ng_phone(phone: &str) -> AppResult<String> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() == 11 && digits.starts_with('0') {
        Ok(format!("+234{}", &digits[1..]))
    } else if digits.len() == 13 && digits.starts_with("234") {
        Ok(format!("+{digits}"))
    } else {
        Err(AppError::field(
            "phone",
            "Please enter a valid Nigerian phone number",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ng_phone() {
        assert_eq!(normalize_ng_phone("08031234567").unwrap(), "+2348031234567");
        assert_eq!(normalize_ng_phone("+234 803 123 4567").unwrap(), "+2348031234567");
        assert_eq!(normalize_ng_phone("2348031234567").unwrap(), "+2348031234567");
        assert_eq!(normalize_ng_phone("(0803) 123-4567").unwrap(), "+2348031234567");
    }

    #[test]
    fn test_reject_foreign_or_short_numbers() {
        assert!(normalize_ng_phone("+12345678901").is_err());
        assert!(normalize_ng_phone("0803123").is_err());
        assert!(normalize_ng_phone("").is_err());
    }
}
