use crate::config::LoyaltyConfig;
use crate::database::DbPool;
use crate::entities::{
    OrderPaymentStatus, OrderStatus, PaymentMethod, PaymentStatus, order_entity as orders,
    payment_entity as pay, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::external::paystack::{
    InitializeTransactionRequest, PaystackService, TransactionData, WebhookEvent,
};
use crate::models::*;
use crate::services::loyalty_service::award_order_points;
use crate::utils::{generate_payment_reference, is_valid_email};
use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel,
    QueryFilter, Set, TransactionTrait,
};
use serde_json::json;

/// Pending payments older than this are considered abandoned.
const PAYMENT_ABANDON_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    Paid,
    Failed(String),
}

/// Decide what a gateway transaction means for our payment row.
pub fn gateway_outcome(payment: &pay::Model, data: &TransactionData) -> GatewayOutcome {
    if !data.is_success() {
        return GatewayOutcome::Failed(
            data.gateway_response
                .clone()
                .unwrap_or_else(|| data.status.clone()),
        );
    }
    if data.amount < payment.amount {
        return GatewayOutcome::Failed(format!(
            "Amount paid ({}) is less than amount due ({})",
            data.amount, payment.amount
        ));
    }
    if let Some(currency) = &data.currency {
        if !currency.eq_ignore_ascii_case(&payment.currency) {
            return GatewayOutcome::Failed(format!("Unexpected currency {currency}"));
        }
    }
    GatewayOutcome::Paid
}

#[derive(Clone)]
pub struct PaymentService {
    pool: DbPool,
    paystack: PaystackService,
    loyalty: LoyaltyConfig,
}

impl PaymentService {
    pub fn new(pool: DbPool, paystack: PaystackService, loyalty: LoyaltyConfig) -> Self {
        Self {
            pool,
            paystack,
            loyalty,
        }
    }

    pub async fn initialize(
        &self,
        req: InitializePaymentRequest,
        user_id: Option<i64>,
    ) -> AppResult<InitializePaymentResponse> {
        let order = orders::Entity::find_by_id(req.order_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".into()))?;
        if !order.is_guest() && order.user_id != user_id {
            return Err(AppError::NotFound("Order not found".into()));
        }
        match order.payment_status {
            OrderPaymentStatus::Pending | OrderPaymentStatus::Failed => {}
            OrderPaymentStatus::Paid => return Err(AppError::Conflict("Order is already paid".into())),
            OrderPaymentStatus::Refunded => {
                return Err(AppError::ValidationError("Order has been refunded".into()));
            }
        }
        if order.status == OrderStatus::Cancelled {
            return Err(AppError::ValidationError("Order has been cancelled".into()));
        }
        if order.payment_method != PaymentMethod::Online {
            return Err(AppError::ValidationError("Order is set to be paid in cash".into()));
        }

        let email = match req.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            Some(email) => email.to_lowercase(),
            None => match order.user_id {
                Some(uid) => users::Entity::find_by_id(uid)
                    .one(self.pool.as_ref())
                    .await?
                    .map(|u| u.email)
                    .unwrap_or_default(),
                None => order.guest_email.clone().unwrap_or_default(),
            },
        };
        if !is_valid_email(&email) {
            return Err(AppError::field("email", "A valid email is required for payment"));
        }

        let reference = generate_payment_reference(&order.order_number);
        let callback_url = Some(self.paystack.callback_url()).filter(|u| !u.is_empty());
        let metadata = json!({
            "order_id": order.id,
            "order_number": order.order_number,
        });
        let data = self
            .paystack
            .initialize_transaction(&InitializeTransactionRequest {
                email: &email,
                amount: order.total_amount,
                reference: &reference,
                currency: self.paystack.currency(),
                callback_url,
                metadata: metadata.clone(),
            })
            .await?;

        let txn = self.pool.begin().await?;
        let payment = pay::ActiveModel {
            reference: Set(reference.clone()),
            order_id: Set(order.id),
            amount: Set(order.total_amount),
            currency: Set(self.paystack.currency().to_string()),
            status: Set(PaymentStatus::Pending),
            access_code: Set(Some(data.access_code.clone())),
            authorization_url: Set(Some(data.authorization_url.clone())),
            customer_email: Set(email),
            metadata: Set(Some(metadata)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        let mut am = order.into_active_model();
        am.payment_reference = Set(Some(reference.clone()));
        am.payment_status = Set(OrderPaymentStatus::Pending);
        am.updated_at = Set(Utc::now());
        am.update(&txn).await?;
        txn.commit().await?;

        log::info!("Payment initialized: reference={reference} order={}", payment.order_id);
        Ok(InitializePaymentResponse {
            reference,
            authorization_url: data.authorization_url,
            access_code: data.access_code,
            amount: payment.amount,
            currency: payment.currency,
        })
    }

    async fn find_payment(&self, reference: &str) -> AppResult<pay::Model> {
        pay::Entity::find()
            .filter(pay::Column::Reference.eq(reference))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".into()))
    }

    /// Check a reference with the gateway and settle the payment.
    pub async fn verify(&self, reference: &str) -> AppResult<VerifyPaymentResponse> {
        let payment = self.find_payment(reference.trim()).await?;
        if payment.status == PaymentStatus::Success {
            return self.response_for(payment, 0).await;
        }
        let data = self.paystack.verify_transaction(&payment.reference).await?;
        let (payment, points) = self.settle(payment, &data).await?;
        self.response_for(payment, points).await
    }

    /// Process a signature-checked webhook. Only `charge.success` changes state.
    pub async fn handle_webhook(&self, event: WebhookEvent) -> AppResult<()> {
        if event.event != "charge.success" {
            log::info!("Ignoring Paystack event {}", event.event);
            return Ok(());
        }
        let Some(reference) = event.reference().map(str::to_string) else {
            log::warn!("charge.success webhook without a reference");
            return Ok(());
        };
        let payment = match pay::Entity::find()
            .filter(pay::Column::Reference.eq(reference.as_str()))
            .one(self.pool.as_ref())
            .await?
        {
            Some(p) => p,
            None => {
                log::warn!("Webhook for unknown payment reference {reference}");
                return Ok(());
            }
        };
        if payment.status == PaymentStatus::Success {
            return Ok(());
        }
        let data: TransactionData = serde_json::from_value(event.data)?;
        self.settle(payment, &data).await?;
        Ok(())
    }

    async fn settle(&self, payment: pay::Model, data: &TransactionData) -> AppResult<(pay::Model, i64)> {
        let now = Utc::now();
        let txn = self.pool.begin().await?;
        let outcome = gateway_outcome(&payment, data);
        let next_status = match &outcome {
            GatewayOutcome::Paid => PaymentStatus::Success,
            GatewayOutcome::Failed(_) => PaymentStatus::Failed,
        };

        // Only one settlement may move the row out of its unsettled state.
        let mut update = pay::Entity::update_many()
            .col_expr(pay::Column::Status, next_status.as_enum())
            .col_expr(pay::Column::GatewayStatus, Expr::value(Some(data.status.clone())))
            .col_expr(pay::Column::UpdatedAt, Expr::value(now))
            .filter(pay::Column::Id.eq(payment.id))
            .filter(pay::Column::Status.ne(PaymentStatus::Success));
        if outcome == GatewayOutcome::Paid {
            update = update.col_expr(pay::Column::VerifiedAt, Expr::value(Some(now)));
        }
        let claimed = update.exec(&txn).await?;

        let mut points = 0;
        if claimed.rows_affected > 0 {
            let order = orders::Entity::find_by_id(payment.order_id)
                .one(&txn)
                .await?
                .ok_or_else(|| AppError::NotFound("Order not found".into()))?;
            match &outcome {
                GatewayOutcome::Paid => {
                    let mut am = order.clone().into_active_model();
                    am.payment_status = Set(OrderPaymentStatus::Paid);
                    am.payment_verified_at = Set(Some(now));
                    if order.status == OrderStatus::Pending {
                        am.status = Set(OrderStatus::Confirmed);
                    }
                    am.updated_at = Set(now);
                    let order = am.update(&txn).await?;
                    if order.earns_points() {
                        points = award_order_points(&txn, &order, &self.loyalty).await?;
                    } else {
                        log::warn!(
                            "Charge settled on {} order {}; no points awarded, refund required",
                            order.status,
                            order.order_number
                        );
                    }
                    log::info!(
                        "Payment verified: reference={} order={} points={points}",
                        payment.reference,
                        order.order_number
                    );
                }
                GatewayOutcome::Failed(reason) => {
                    if order.payment_status == OrderPaymentStatus::Pending {
                        let mut am = order.into_active_model();
                        am.payment_status = Set(OrderPaymentStatus::Failed);
                        am.updated_at = Set(now);
                        am.update(&txn).await?;
                    }
                    log::warn!("Payment failed: reference={} reason={reason}", payment.reference);
                }
            }
        }
        txn.commit().await?;

        let payment = pay::Entity::find_by_id(payment.id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".into()))?;
        Ok((payment, points))
    }

    async fn response_for(&self, payment: pay::Model, points_awarded: i64) -> AppResult<VerifyPaymentResponse> {
        let order = orders::Entity::find_by_id(payment.order_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".into()))?;
        Ok(VerifyPaymentResponse {
            payment: PaymentResponse::from(payment),
            order_number: order.order_number,
            order_payment_status: order.payment_status,
            points_awarded,
        })
    }

    /// Mark pending payments that never completed as abandoned.
    pub async fn abandon_stale_payments(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - Duration::hours(PAYMENT_ABANDON_HOURS);
        let res = pay::Entity::update_many()
            .col_expr(pay::Column::Status, PaymentStatus::Abandoned.as_enum())
            .col_expr(pay::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(pay::Column::Status.eq(PaymentStatus::Pending))
            .filter(pay::Column::CreatedAt.lt(cutoff))
            .exec(self.pool.as_ref())
            .await?;
        Ok(res.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaystackConfig;
    use crate::entities::DeliveryType;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn payment(amount: i64) -> pay::Model {
        let now = Utc::now();
        pay::Model {
            id: 1,
            reference: "ORD-001-ABCDEFGHIJ".into(),
            order_id: 1,
            amount,
            currency: "NGN".into(),
            status: PaymentStatus::Pending,
            gateway_status: None,
            access_code: None,
            authorization_url: None,
            customer_email: "ada@example.com".into(),
            metadata: None,
            verified_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn transaction(status: &str, amount: i64, currency: Option<&str>) -> TransactionData {
        TransactionData {
            reference: "ORD-001-ABCDEFGHIJ".into(),
            status: status.into(),
            amount,
            currency: currency.map(str::to_string),
            gateway_response: Some("Approved".into()),
            paid_at: None,
            customer: None,
        }
    }

    #[test]
    fn test_successful_charge_settles() {
        let p = payment(500_000);
        assert_eq!(gateway_outcome(&p, &transaction("success", 500_000, Some("NGN"))), GatewayOutcome::Paid);
        assert_eq!(gateway_outcome(&p, &transaction("success", 500_000, None)), GatewayOutcome::Paid);
    }

    #[test]
    fn test_short_payment_fails() {
        let p = payment(500_000);
        assert!(matches!(
            gateway_outcome(&p, &transaction("success", 499_999, Some("NGN"))),
            GatewayOutcome::Failed(_)
        ));
    }

    #[test]
    fn test_declined_or_wrong_currency_fails() {
        let p = payment(500_000);
        assert!(matches!(
            gateway_outcome(&p, &transaction("failed", 500_000, Some("NGN"))),
            GatewayOutcome::Failed(_)
        ));
        assert!(matches!(
            gateway_outcome(&p, &transaction("success", 500_000, Some("USD"))),
            GatewayOutcome::Failed(_)
        ));
    }

    #[test]
    fn test_webhook_payload_parses() {
        let raw = r#"{"event":"charge.success","data":{"reference":"ORD-001-ABCDEFGHIJ","status":"success","amount":500000,"currency":"NGN"}}"#;
        let event: WebhookEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.reference(), Some("ORD-001-ABCDEFGHIJ"));
        let data: TransactionData = serde_json::from_value(event.data).unwrap();
        assert_eq!(gateway_outcome(&payment(500_000), &data), GatewayOutcome::Paid);
    }

    fn order(status: OrderStatus) -> orders::Model {
        let now = Utc::now();
        orders::Model {
            id: 1,
            order_number: "ORD-001".into(),
            user_id: Some(7),
            guest_name: None,
            guest_email: None,
            guest_phone: None,
            delivery_type: DeliveryType::Pickup,
            delivery_address: None,
            latitude: None,
            longitude: None,
            special_instructions: None,
            subtotal: 500_000,
            tax_amount: 0,
            delivery_fee: 0,
            discount_amount: 0,
            total_amount: 500_000,
            status,
            payment_status: OrderPaymentStatus::Pending,
            payment_method: PaymentMethod::Online,
            promo_code_id: None,
            user_reward_id: None,
            estimated_delivery_time: None,
            actual_delivery_time: None,
            payment_reference: Some("ORD-001-ABCDEFGHIJ".into()),
            payment_verified_at: None,
            points_awarded: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[actix_web::test]
    async fn test_charge_on_cancelled_order_awards_no_points() {
        let cancelled = order(OrderStatus::Cancelled);
        let mut paid = cancelled.clone();
        paid.payment_status = OrderPaymentStatus::Paid;
        let mut settled = payment(500_000);
        settled.status = PaymentStatus::Success;

        // No results are queued for the points award, so reaching it would fail.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 1 }])
            .append_query_results([[cancelled]])
            .append_query_results([[paid]])
            .append_query_results([[settled]])
            .into_connection();
        let svc = PaymentService::new(
            Arc::new(db),
            PaystackService::new(PaystackConfig {
                secret_key: "sk_test_secret".into(),
                base_url: "http://127.0.0.1:9".into(),
                callback_url: String::new(),
                currency: "NGN".into(),
            }),
            LoyaltyConfig::default(),
        );

        let (payment, points) = svc
            .settle(payment(500_000), &transaction("success", 500_000, Some("NGN")))
            .await
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Success);
        assert_eq!(points, 0);
    }
}
