use rand::Rng;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn random_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// 8 characters of `[A-Z0-9]`
pub fn generate_referral_code() -> String {
    random_code(8)
}

/// `LOYALTY-` followed by 12 upper-case hex digits
pub fn generate_loyalty_qr_code() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("LOYALTY-{}", hex[..12].to_ascii_uppercase())
}

pub fn format_order_number(sequence: i64) -> String {
    format!("ORD-{sequence:03}")
}

pub fn parse_order_sequence(order_number: &str) -> Option<i64> {
    order_number
        .strip_prefix("ORD-")
        .and_then(|n| n.parse::<i64>().ok())
}

/// Merchant-side reference handed to the payment gateway
pub fn generate_payment_reference(order_number: &str) -> String {
    format!("{}-{}", order_number, random_code(10))
}

/// Username candidate derived from an email local part, with an optional numeric suffix
pub fn username_from_email(email: &str, suffix: u32) -> String {
    let base: String = email
        .split('@')
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let base = if base.is_empty() { "user".to_string() } else { base };
    if suffix == 0 {
        base
    } else {
        format!("{base}{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_referral_code() {
        let code = generate_referral_code();
        assert_eq!(code.len(), 8);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_generate_loyalty_qr_code() {
        let code = generate_loyalty_qr_code();
        assert_eq!(code.len(), 20);
        assert!(code.starts_with("LOYALTY-"));
        assert!(
            code[8..]
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        );
    }

    #[test]
    fn test_order_number_sequence() {
        assert_eq!(format_order_number(7), "ORD-007");
        assert_eq!(format_order_number(1234), "ORD-1234");
        assert_eq!(parse_order_sequence("ORD-042"), Some(42));
        assert_eq!(parse_order_sequence("ORDER-1"), None);
    }

    #[test]
    fn test_username_from_email() {
        assert_eq!(username_from_email("ada.obi@example.com", 0), "ada.obi");
        assert_eq!(username_from_email("ada.obi@example.com", 2), "ada.obi2");
        assert_eq!(username_from_email("@example.com", 0), "user");
    }
}
