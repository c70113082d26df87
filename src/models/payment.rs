use crate::entities::{OrderPaymentStatus, PaymentStatus, payment_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InitializePaymentRequest {
    pub order_id: i64,
    /// Receipt email; defaults to the account or guest email on the order
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InitializePaymentResponse {
    pub reference: String,
    pub authorization_url: String,
    pub access_code: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub id: i64,
    pub reference: String,
    pub order_id: i64,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub gateway_status: Option<String>,
    pub customer_email: String,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<payment_entity::Model> for PaymentResponse {
    fn from(p: payment_entity::Model) -> Self {
        Self {
            id: p.id,
            reference: p.reference,
            order_id: p.order_id,
            amount: p.amount,
            currency: p.currency,
            status: p.status,
            gateway_status: p.gateway_status,
            customer_email: p.customer_email,
            verified_at: p.verified_at,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyPaymentResponse {
    pub payment: PaymentResponse,
    pub order_number: String,
    pub order_payment_status: OrderPaymentStatus,
    /// Points credited by this verification, 0 when already credited or a guest order
    pub points_awarded: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaymentCallbackQuery {
    pub reference: String,
}
