use crate::entities::{
    DeliveryType, OrderPaymentStatus, OrderStatus, PaymentMethod, order_entity, order_item_entity,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const MAX_ITEM_QUANTITY: i32 = 50;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub menu_item_id: i64,
    #[schema(example = 2)]
    pub quantity: i32,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub delivery_type: DeliveryType,
    /// Saved address of the signed-in user; overrides the free-text address
    pub address_id: Option<i64>,
    pub delivery_address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub special_instructions: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub promo_code: Option<String>,
    pub user_reward_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CalculateTotalsRequest {
    pub items: Vec<OrderItemRequest>,
    pub delivery_type: DeliveryType,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub promo_code: Option<String>,
    pub user_reward_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeliveryFeeRequest {
    pub delivery_type: DeliveryType,
    /// kobo
    #[serde(default)]
    pub subtotal: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuotedLine {
    pub menu_item_id: i64,
    pub name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub total_price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderQuoteResponse {
    pub items: Vec<QuotedLine>,
    pub subtotal: i64,
    pub tax_amount: i64,
    pub delivery_fee: i64,
    pub promo_discount: i64,
    pub reward_discount: i64,
    pub discount_amount: i64,
    pub total_amount: i64,
    pub distance_km: Option<f64>,
    pub free_delivery_applied: bool,
    pub estimated_minutes: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i64,
    pub menu_item_id: i64,
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub total_price: i64,
    pub special_instructions: Option<String>,
}

impl From<order_item_entity::Model> for OrderItemResponse {
    fn from(i: order_item_entity::Model) -> Self {
        Self {
            id: i.id,
            menu_item_id: i.menu_item_id,
            item_name: i.item_name,
            quantity: i.quantity,
            unit_price: i.unit_price,
            total_price: i.total_price,
            special_instructions: i.special_instructions,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i64,
    pub order_number: String,
    pub user_id: Option<i64>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub delivery_type: DeliveryType,
    pub delivery_address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub special_instructions: Option<String>,
    pub subtotal: i64,
    pub tax_amount: i64,
    pub delivery_fee: i64,
    pub discount_amount: i64,
    pub total_amount: i64,
    pub status: OrderStatus,
    pub payment_status: OrderPaymentStatus,
    pub payment_method: PaymentMethod,
    pub payment_reference: Option<String>,
    pub estimated_delivery_time: Option<DateTime<Utc>>,
    pub actual_delivery_time: Option<DateTime<Utc>>,
    pub can_be_cancelled: bool,
    pub items: Vec<OrderItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderResponse {
    pub fn new(o: order_entity::Model, items: Vec<order_item_entity::Model>) -> Self {
        let can_be_cancelled = o.can_be_cancelled();
        Self {
            id: o.id,
            order_number: o.order_number,
            user_id: o.user_id,
            guest_name: o.guest_name,
            guest_email: o.guest_email,
            guest_phone: o.guest_phone,
            delivery_type: o.delivery_type,
            delivery_address: o.delivery_address,
            latitude: o.latitude,
            longitude: o.longitude,
            special_instructions: o.special_instructions,
            subtotal: o.subtotal,
            tax_amount: o.tax_amount,
            delivery_fee: o.delivery_fee,
            discount_amount: o.discount_amount,
            total_amount: o.total_amount,
            status: o.status,
            payment_status: o.payment_status,
            payment_method: o.payment_method,
            payment_reference: o.payment_reference,
            estimated_delivery_time: o.estimated_delivery_time,
            actual_delivery_time: o.actual_delivery_time,
            can_be_cancelled,
            items: items.into_iter().map(OrderItemResponse::from).collect(),
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

/// Compact row for order lists
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderSummary {
    pub id: i64,
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_status: OrderPaymentStatus,
    pub delivery_type: DeliveryType,
    pub total_amount: i64,
    pub customer_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<order_entity::Model> for OrderSummary {
    fn from(o: order_entity::Model) -> Self {
        Self {
            id: o.id,
            order_number: o.order_number,
            status: o.status,
            payment_status: o.payment_status,
            delivery_type: o.delivery_type,
            total_amount: o.total_amount,
            customer_name: o.guest_name,
            created_at: o.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub status: Option<OrderStatus>,
    pub payment_status: Option<OrderPaymentStatus>,
    pub delivery_type: Option<DeliveryType>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderTrackingResponse {
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_status: OrderPaymentStatus,
    pub delivery_type: DeliveryType,
    pub total_amount: i64,
    pub estimated_delivery_time: Option<DateTime<Utc>>,
    pub actual_delivery_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<order_entity::Model> for OrderTrackingResponse {
    fn from(o: order_entity::Model) -> Self {
        Self {
            order_number: o.order_number,
            status: o.status,
            payment_status: o.payment_status,
            delivery_type: o.delivery_type,
            total_amount: o.total_amount,
            estimated_delivery_time: o.estimated_delivery_time,
            actual_delivery_time: o.actual_delivery_time,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}
