use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "order_status")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "preparing")]
    Preparing,
    #[sea_orm(string_value = "ready")]
    Ready,
    #[sea_orm(string_value = "out_for_delivery")]
    OutForDelivery,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Confirmed => write!(f, "confirmed"),
            OrderStatus::Preparing => write!(f, "preparing"),
            OrderStatus::Ready => write!(f, "ready"),
            OrderStatus::OutForDelivery => write!(f, "out_for_delivery"),
            OrderStatus::Delivered => write!(f, "delivered"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
            OrderStatus::Refunded => write!(f, "refunded"),
        }
    }
}

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "order_payment_status")]
#[serde(rename_all = "snake_case")]
pub enum OrderPaymentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

impl std::fmt::Display for OrderPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderPaymentStatus::Pending => write!(f, "pending"),
            OrderPaymentStatus::Paid => write!(f, "paid"),
            OrderPaymentStatus::Failed => write!(f, "failed"),
            OrderPaymentStatus::Refunded => write!(f, "refunded"),
        }
    }
}

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "delivery_type")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    #[sea_orm(string_value = "delivery")]
    Delivery,
    #[sea_orm(string_value = "pickup")]
    Pickup,
}

impl std::fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryType::Delivery => write!(f, "delivery"),
            DeliveryType::Pickup => write!(f, "pickup"),
        }
    }
}

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "online")]
    Online,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Online => write!(f, "online"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub order_number: String,
    /// None for guest checkouts
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
    pub promo_code_id: Option<i64>,
    pub user_reward_id: Option<i64>,
    pub estimated_delivery_time: Option<DateTime<Utc>>,
    pub actual_delivery_time: Option<DateTime<Utc>>,
    pub payment_reference: Option<String>,
    pub payment_verified_at: Option<DateTime<Utc>>,
    pub points_awarded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Status change permitted by the order workflow.
    ///
    /// `ready` forks on fulfilment: delivery orders go out for delivery,
    /// pickup orders are handed over directly. Refunding a cancelled
    /// order is only possible once money was taken.
    pub fn can_transition_to(&self, next: &OrderStatus) -> bool {
        use OrderStatus::*;
        match (&self.status, next) {
            (Pending, Confirmed | Cancelled) => true,
            (Confirmed, Preparing | Cancelled) => true,
            (Preparing, Ready | Cancelled) => true,
            (Ready, OutForDelivery) => self.delivery_type == DeliveryType::Delivery,
            (Ready, Delivered) => self.delivery_type == DeliveryType::Pickup,
            (Ready, Cancelled) => true,
            (OutForDelivery, Delivered) => true,
            (Delivered, Refunded) => true,
            (Cancelled, Refunded) => self.payment_status == OrderPaymentStatus::Paid,
            _ => false,
        }
    }

    pub fn can_be_cancelled(&self) -> bool {
        !matches!(
            self.status,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Refunded
        )
    }

    pub fn is_guest(&self) -> bool {
        self.user_id.is_none()
    }

    /// Cancelled or refunded orders never earn loyalty points, even if paid.
    pub fn earns_points(&self) -> bool {
        !matches!(self.status, OrderStatus::Cancelled | OrderStatus::Refunded)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(status: OrderStatus, delivery_type: DeliveryType) -> Model {
        let now = Utc::now();
        Model {
            id: 1,
            order_number: "ORD-001".into(),
            user_id: Some(1),
            guest_name: None,
            guest_email: None,
            guest_phone: None,
            delivery_type,
            delivery_address: None,
            latitude: None,
            longitude: None,
            special_instructions: None,
            subtotal: 0,
            tax_amount: 0,
            delivery_fee: 0,
            discount_amount: 0,
            total_amount: 0,
            status,
            payment_status: OrderPaymentStatus::Pending,
            payment_method: PaymentMethod::Cash,
            promo_code_id: None,
            user_reward_id: None,
            estimated_delivery_time: None,
            actual_delivery_time: None,
            payment_reference: None,
            payment_verified_at: None,
            points_awarded: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_happy_path_delivery() {
        use OrderStatus::*;
        let chain = [Pending, Confirmed, Preparing, Ready, OutForDelivery, Delivered];
        for pair in chain.windows(2) {
            let o = order(pair[0].clone(), DeliveryType::Delivery);
            assert!(o.can_transition_to(&pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_ready_forks_on_fulfilment() {
        let pickup = order(OrderStatus::Ready, DeliveryType::Pickup);
        assert!(pickup.can_transition_to(&OrderStatus::Delivered));
        assert!(!pickup.can_transition_to(&OrderStatus::OutForDelivery));

        let delivery = order(OrderStatus::Ready, DeliveryType::Delivery);
        assert!(!delivery.can_transition_to(&OrderStatus::Delivered));
        assert!(delivery.can_transition_to(&OrderStatus::OutForDelivery));
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        let o = order(OrderStatus::Pending, DeliveryType::Delivery);
        assert!(!o.can_transition_to(&OrderStatus::Preparing));
        assert!(!o.can_transition_to(&OrderStatus::Delivered));
        let o = order(OrderStatus::Preparing, DeliveryType::Delivery);
        assert!(!o.can_transition_to(&OrderStatus::Confirmed));
        let o = order(OrderStatus::OutForDelivery, DeliveryType::Delivery);
        assert!(!o.can_transition_to(&OrderStatus::Cancelled));
    }

    #[test]
    fn test_only_live_orders_earn_points() {
        assert!(order(OrderStatus::Confirmed, DeliveryType::Pickup).earns_points());
        assert!(order(OrderStatus::Delivered, DeliveryType::Delivery).earns_points());
        assert!(!order(OrderStatus::Cancelled, DeliveryType::Pickup).earns_points());
        assert!(!order(OrderStatus::Refunded, DeliveryType::Delivery).earns_points());
    }

    #[test]
    fn test_refund_of_cancelled_requires_payment() {
        let mut o = order(OrderStatus::Cancelled, DeliveryType::Pickup);
        assert!(!o.can_transition_to(&OrderStatus::Refunded));
        o.payment_status = OrderPaymentStatus::Paid;
        assert!(o.can_transition_to(&OrderStatus::Refunded));
    }

    #[test]
    fn test_cancellable_states() {
        assert!(order(OrderStatus::Ready, DeliveryType::Pickup).can_be_cancelled());
        assert!(!order(OrderStatus::Delivered, DeliveryType::Pickup).can_be_cancelled());
        assert!(!order(OrderStatus::Refunded, DeliveryType::Pickup).can_be_cancelled());
    }
}
