use crate::external::paystack::{PaystackService, WebhookEvent};
use crate::services::PaymentService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use log::{error, info, warn};

const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Paystack webhook receiver.
///
/// The signature is checked against the raw body before anything is parsed.
pub async fn paystack_webhook(
    req: HttpRequest,
    body: web::Bytes,
    paystack_service: web::Data<PaystackService>,
    payment_service: web::Data<PaymentService>,
) -> Result<HttpResponse> {
    let signature = match req.headers().get(SIGNATURE_HEADER) {
        Some(sig) => sig.to_str().unwrap_or(""),
        None => {
            warn!("Missing X-Paystack-Signature header");
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Missing X-Paystack-Signature header"
            })));
        }
    };

    if !paystack_service.verify_webhook_signature(&body, signature) {
        warn!("Paystack webhook signature mismatch");
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid signature"
        })));
    }

    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!("Unreadable Paystack webhook payload: {e}");
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Invalid payload"
            })));
        }
    };

    info!("Received Paystack webhook event: {}", event.event);

    match payment_service.handle_webhook(event).await {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "received": true
        }))),
        Err(e) => {
            // A non-2xx answer makes Paystack redeliver the event.
            error!("Failed to process Paystack webhook: {e}");
            Ok(e.error_response())
        }
    }
}

pub fn webhook_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/webhook").route("/paystack", web::post().to(paystack_webhook)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaystackConfig;
    use actix_web::{App, test};
    use hmac::{Hmac, Mac};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use sha2::Sha512;

    fn paystack() -> PaystackService {
        PaystackService::new(PaystackConfig {
            secret_key: "sk_test_secret".into(),
            base_url: "http://127.0.0.1:9".into(),
            callback_url: "http://localhost/callback".into(),
            currency: "NGN".into(),
        })
    }

    fn sign(body: &[u8]) -> String {
        let mut mac = Hmac::<Sha512>::new_from_slice(b"sk_test_secret").unwrap();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    macro_rules! webhook_app {
        () => {{
            let pool = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
            let payments = PaymentService::new(pool, paystack(), Default::default());
            test::init_service(
                App::new()
                    .app_data(web::Data::new(paystack()))
                    .app_data(web::Data::new(payments))
                    .configure(webhook_config),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_missing_signature_is_rejected() {
        let app = webhook_app!();
        let req = test::TestRequest::post()
            .uri("/webhook/paystack")
            .set_payload(r#"{"event":"charge.success","data":{}}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn test_wrong_signature_is_rejected() {
        let app = webhook_app!();
        let req = test::TestRequest::post()
            .uri("/webhook/paystack")
            .insert_header((SIGNATURE_HEADER, "deadbeef"))
            .set_payload(r#"{"event":"charge.success","data":{}}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn test_signed_unrelated_event_is_acknowledged() {
        let app = webhook_app!();
        let body = br#"{"event":"transfer.success","data":{}}"#;
        let req = test::TestRequest::post()
            .uri("/webhook/paystack")
            .insert_header((SIGNATURE_HEADER, sign(body)))
            .set_payload(&body[..])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
    }
}
