use regex::Regex;
use std::sync::LazyLock;

static LOYALTY_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^LOYALTY-[0-9A-F]{12}$").expect("LOYALTY_CODE_REGEX: invalid regex pattern")
});

static CUSTOMER_ID_PARAM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[?&]customerID=(\d+)").expect("CUSTOMER_ID_PARAM_REGEX: invalid regex pattern")
});

/// Reduce a raw scanner payload to the card code stored in `loyalty_cards.qr_code`.
///
/// Accepted payloads:
/// - `LOYALTY-` followed by 12 upper-case hex digits (optionally wrapped as `LOYALTY:<code>`,
///   the form printed on generated cards)
/// - a bare numeric customer id
/// - a URL carrying `customerID=<digits>`
pub fn extract_card_code(payload: &str) -> Option<String> {
    let payload = payload.trim();
    let payload = payload.strip_prefix("LOYALTY:").unwrap_or(payload);

    if payload.contains("customerID=") {
        return CUSTOMER_ID_PARAM_REGEX
            .captures(payload)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
    }

    if LOYALTY_CODE_REGEX.is_match(payload) {
        return Some(payload.to_string());
    }

    if !payload.is_empty() && payload.chars().all(|c| c.is_ascii_digit()) {
        return Some(payload.to_string());
    }

    None
}

/// Text encoded into the QR image of a card
pub fn card_qr_payload(code: &str) -> String {
    format!("LOYALTY:{code}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loyalty_prefixed_codes() {
        assert_eq!(
            extract_card_code("LOYALTY-A1B2C3D4E5F6").as_deref(),
            Some("LOYALTY-A1B2C3D4E5F6")
        );
        assert_eq!(
            extract_card_code("LOYALTY:LOYALTY-A1B2C3D4E5F6").as_deref(),
            Some("LOYALTY-A1B2C3D4E5F6")
        );
        assert_eq!(extract_card_code("LOYALTY-a1b2c3d4e5f6"), None);
        assert_eq!(extract_card_code("LOYALTY-A1B2"), None);
    }

    #[test]
    fn test_numeric_and_url_codes() {
        assert_eq!(extract_card_code(" 1042 ").as_deref(), Some("1042"));
        assert_eq!(
            extract_card_code("https://script.google.com/macros/s/abc/exec?customerID=77")
                .as_deref(),
            Some("77")
        );
        assert_eq!(
            extract_card_code("https://example.com/card?x=1&customerID=5&y=2").as_deref(),
            Some("5")
        );
        assert_eq!(extract_card_code("https://example.com/?customerID=abc"), None);
    }

    #[test]
    fn test_garbage_rejected() {
        assert_eq!(extract_card_code(""), None);
        assert_eq!(extract_card_code("hello"), None);
        assert_eq!(extract_card_code("12a4"), None);
    }

    #[test]
    fn test_printed_payload_round_trips() {
        let printed = card_qr_payload("LOYALTY-00FF00FF00FF");
        assert_eq!(
            extract_card_code(&printed).as_deref(),
            Some("LOYALTY-00FF00FF00FF")
        );
    }
}
