use crate::config::PaystackConfig;
use crate::error::{AppError, AppResult};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Envelope every Paystack API response comes in
#[derive(Debug, Deserialize)]
pub struct PaystackResponse<T> {
    pub status: bool,
    pub message: String,
    pub data: Option<T>,
}

#[derive(Debug, Serialize)]
pub struct InitializeTransactionRequest<'a> {
    pub email: &'a str,
    /// kobo
    pub amount: i64,
    pub reference: &'a str,
    pub currency: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<&'a str>,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InitializeTransactionData {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionCustomer {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionData {
    pub reference: String,
    /// "success", "failed", "abandoned", "ongoing", ...
    pub status: String,
    pub amount: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub gateway_response: Option<String>,
    #[serde(default)]
    pub paid_at: Option<String>,
    #[serde(default)]
    pub customer: Option<TransactionCustomer>,
}

impl TransactionData {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Webhook payload: `{"event": "charge.success", "data": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub data: serde_json::Value,
}

impl WebhookEvent {
    pub fn reference(&self) -> Option<&str> {
        self.data.get("reference").and_then(|v| v.as_str())
    }
}

#[derive(Clone)]
pub struct PaystackService {
    client: Client,
    config: PaystackConfig,
}

impl PaystackService {
    pub fn new(config: PaystackConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn currency(&self) -> &str {
        &self.config.currency
    }

    pub fn callback_url(&self) -> &str {
        &self.config.callback_url
    }

    pub async fn initialize_transaction(
        &self,
        request: &InitializeTransactionRequest<'_>,
    ) -> AppResult<InitializeTransactionData> {
        let url = format!("{}/transaction/initialize", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.secret_key)
            .json(request)
            .send()
            .await?;

        let http_status = response.status();
        let body: PaystackResponse<InitializeTransactionData> = response.json().await?;
        match body.data {
            Some(data) if http_status.is_success() && body.status => {
                log::info!("Paystack transaction initialized: {}", data.reference);
                Ok(data)
            }
            _ => {
                log::error!(
                    "Paystack initialize failed: HTTP {} {}",
                    http_status.as_u16(),
                    body.message
                );
                Err(AppError::ExternalApiError(format!(
                    "Payment initialization failed: {}",
                    body.message
                )))
            }
        }
    }

    pub async fn verify_transaction(&self, reference: &str) -> AppResult<TransactionData> {
        let url = format!("{}/transaction/verify/{}", self.config.base_url, reference);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.secret_key)
            .send()
            .await?;

        let http_status = response.status();
        let body: PaystackResponse<TransactionData> = response.json().await?;
        match body.data {
            Some(data) if body.status => Ok(data),
            _ => Err(AppError::ExternalApiError(format!(
                "Payment verification failed (HTTP {}): {}",
                http_status.as_u16(),
                body.message
            ))),
        }
    }

    /// `X-Paystack-Signature` is the hex HMAC-SHA512 of the raw body keyed by the secret key.
    pub fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> bool {
        verify_signature(payload, signature, &self.config.secret_key)
    }
}

pub fn verify_signature(payload: &[u8], signature: &str, secret: &str) -> bool {
    let Ok(provided) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha512::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&provided).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_payload(payload: &[u8], secret: &str) -> String {
        let mut mac = HmacSha512::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    const SECRET: &str = "sk_test_abc123";

    #[test]
    fn test_signature_accepts_matching_digest() {
        let body = br#"{"event":"charge.success","data":{"reference":"ORD-001-X"}}"#;
        let sig = sign_payload(body, SECRET);
        assert_eq!(sig.len(), 128);
        assert!(verify_signature(body, &sig, SECRET));
        assert!(verify_signature(body, &sig.to_uppercase(), SECRET));
    }

    #[test]
    fn test_signature_rejects_tampering() {
        let body = br#"{"event":"charge.success"}"#;
        let sig = sign_payload(body, SECRET);
        assert!(!verify_signature(br#"{"event":"charge.failed"}"#, &sig, SECRET));
        assert!(!verify_signature(body, &sig, "sk_test_other"));
        assert!(!verify_signature(body, "not-hex", SECRET));
        assert!(!verify_signature(body, "", SECRET));
    }

    #[test]
    fn test_webhook_event_reference() {
        let event: WebhookEvent = serde_json::from_str(
            r#"{"event":"charge.success","data":{"reference":"ORD-007-ABC","amount":5000}}"#,
        )
        .unwrap();
        assert_eq!(event.event, "charge.success");
        assert_eq!(event.reference(), Some("ORD-007-ABC"));
    }
}
