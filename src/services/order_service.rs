use crate::database::DbPool;
use crate::entities::{
    DeliveryType, OrderPaymentStatus, OrderStatus, PaymentMethod, address_entity as addr,
    menu_item_entity as menu, order_entity as orders, order_item_entity as order_items,
    promo_code_entity as promo, reward_entity as rewards, settings_entity as rs,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::loyalty_service::{mark_reward_used, usable_user_reward};
use crate::services::promotion_service::{apply_promo, find_usable_promo};
use crate::services::settings_service::{load_settings, local_time_now};
use crate::utils::dates::{end_of_local_day, start_of_local_day};
use crate::utils::pricing::{DeliveryQuote, compute_totals, estimated_minutes, line_subtotal, vat_amount};
use crate::utils::{ValidationErrors, format_order_number, is_valid_email, normalize_ng_phone, parse_order_sequence};
use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, SqlErr,
    TransactionTrait,
};
use std::collections::HashMap;

const ORDER_NUMBER_ATTEMPTS: usize = 3;

/// Shape checks on the requested lines before any lookup.
pub fn validate_order_lines(items: &[OrderItemRequest]) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::field("items", "Order must contain at least one item"));
    }
    let mut errors = ValidationErrors::new();
    for (i, line) in items.iter().enumerate() {
        if !(1..=MAX_ITEM_QUANTITY).contains(&line.quantity) {
            errors.add(
                &format!("items[{i}].quantity"),
                format!("Quantity must be between 1 and {MAX_ITEM_QUANTITY}"),
            );
        }
    }
    errors.into_result()
}

/// Latitude and longitude come together or not at all.
pub fn coordinates(latitude: Option<f64>, longitude: Option<f64>) -> AppResult<Option<(f64, f64)>> {
    match (latitude, longitude) {
        (Some(lat), Some(lng)) => {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                return Err(AppError::field("latitude", "Coordinates are out of range"));
            }
            Ok(Some((lat, lng)))
        }
        (None, None) => Ok(None),
        _ => Err(AppError::field(
            "latitude",
            "Latitude and longitude must be provided together",
        )),
    }
}

/// A requested line priced from the current menu.
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub menu_item_id: i64,
    pub name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub special_instructions: Option<String>,
}

impl PricedLine {
    fn total_price(&self) -> i64 {
        self.unit_price * self.quantity as i64
    }

    fn quoted(&self) -> QuotedLine {
        QuotedLine {
            menu_item_id: self.menu_item_id,
            name: self.name.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            total_price: self.total_price(),
        }
    }
}

async fn price_lines<C: ConnectionTrait>(db: &C, items: &[OrderItemRequest]) -> AppResult<Vec<PricedLine>> {
    validate_order_lines(items)?;
    let ids: Vec<i64> = items.iter().map(|i| i.menu_item_id).collect();
    let menu_items: HashMap<i64, menu::Model> = menu::Entity::find()
        .filter(menu::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    let mut errors = ValidationErrors::new();
    let mut lines = Vec::with_capacity(items.len());
    for (i, line) in items.iter().enumerate() {
        match menu_items.get(&line.menu_item_id) {
            None => errors.add(
                &format!("items[{i}].menu_item_id"),
                format!("Menu item {} does not exist", line.menu_item_id),
            ),
            Some(item) if !item.is_available => errors.add(
                &format!("items[{i}].menu_item_id"),
                format!("{} is currently unavailable", item.name),
            ),
            Some(item) => lines.push(PricedLine {
                menu_item_id: item.id,
                name: item.name.clone(),
                quantity: line.quantity,
                unit_price: item.price,
                special_instructions: line.special_instructions.clone(),
            }),
        }
    }
    errors.into_result()?;
    Ok(lines)
}

/// Price an order: subtotal, VAT, delivery fee and both kinds of discount.
pub fn build_quote(
    lines: &[PricedLine],
    settings: &rs::Model,
    delivery_type: &DeliveryType,
    coords: Option<(f64, f64)>,
    promo_code: Option<&promo::Model>,
    reward: Option<&rewards::Model>,
) -> AppResult<OrderQuoteResponse> {
    let subtotal = line_subtotal(lines.iter().map(|l| (l.unit_price, l.quantity)));
    let tax_amount = vat_amount(subtotal, settings.vat_rate_bp);
    let DeliveryQuote {
        delivery_fee,
        distance_km,
        free_delivery_applied,
    } = settings
        .delivery_pricing()
        .quote(delivery_type, subtotal, coords)?;

    let promo_discount = match promo_code {
        Some(p) if subtotal < p.minimum_order_amount => {
            return Err(AppError::field(
                "promo_code",
                format!(
                    "Minimum order amount for this code is ₦{:.2}",
                    p.minimum_order_amount as f64 / 100.0
                ),
            ));
        }
        Some(p) => p.calculate_discount(subtotal),
        None => 0,
    };
    let reward_discount = reward.map_or(0, |r| r.discount_for(subtotal, delivery_fee));
    let totals = compute_totals(subtotal, tax_amount, delivery_fee, promo_discount + reward_discount);
    let item_count: i64 = lines.iter().map(|l| l.quantity as i64).sum();

    Ok(OrderQuoteResponse {
        items: lines.iter().map(PricedLine::quoted).collect(),
        subtotal: totals.subtotal,
        tax_amount: totals.tax_amount,
        delivery_fee: totals.delivery_fee,
        promo_discount,
        reward_discount,
        discount_amount: totals.discount_amount,
        total_amount: totals.total_amount,
        distance_km,
        free_delivery_applied,
        estimated_minutes: estimated_minutes(item_count, delivery_type),
    })
}

struct GuestContact {
    name: String,
    email: String,
    phone: String,
}

fn guest_contact(req: &CreateOrderRequest) -> AppResult<GuestContact> {
    let name = req.guest_name.as_deref().map(str::trim).unwrap_or_default();
    let email = req
        .guest_email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_default();
    let phone = req.guest_phone.as_deref().map(str::trim).unwrap_or_default();

    let mut errors = ValidationErrors::new();
    errors.check(!name.is_empty(), "guest_name", "Name is required for guest orders");
    errors.check(is_valid_email(&email), "guest_email", "A valid email is required for guest orders");
    let phone = if phone.is_empty() {
        errors.add("guest_phone", "Phone number is required for guest orders");
        String::new()
    } else {
        match normalize_ng_phone(phone) {
            Ok(p) => p,
            Err(_) => {
                errors.add("guest_phone", "Enter a valid Nigerian phone number");
                String::new()
            }
        }
    };
    errors.into_result()?;
    Ok(GuestContact {
        name: name.to_string(),
        email,
        phone,
    })
}

fn is_order_number_collision(err: &AppError) -> bool {
    match err {
        AppError::DatabaseError(e) => matches!(
            e.sql_err(),
            Some(SqlErr::UniqueConstraintViolation(msg)) if msg.contains("order_number")
        ),
        _ => false,
    }
}

async fn next_order_number<C: ConnectionTrait>(db: &C) -> AppResult<String> {
    let numbers: Vec<String> = orders::Entity::find()
        .select_only()
        .column(orders::Column::OrderNumber)
        .order_by_desc(orders::Column::Id)
        .limit(50)
        .into_tuple()
        .all(db)
        .await?;
    let last = numbers
        .iter()
        .filter_map(|n| parse_order_sequence(n))
        .max()
        .unwrap_or(0);
    Ok(format_order_number(last + 1))
}

fn apply_filters(mut select: Select<orders::Entity>, query: &OrderQuery) -> Select<orders::Entity> {
    if let Some(status) = &query.status {
        select = select.filter(orders::Column::Status.eq(status.clone()));
    }
    if let Some(payment_status) = &query.payment_status {
        select = select.filter(orders::Column::PaymentStatus.eq(payment_status.clone()));
    }
    if let Some(delivery_type) = &query.delivery_type {
        select = select.filter(orders::Column::DeliveryType.eq(delivery_type.clone()));
    }
    if let Some(from) = query.date_from {
        select = select.filter(orders::Column::CreatedAt.gte(start_of_local_day(from)));
    }
    if let Some(to) = query.date_to {
        select = select.filter(orders::Column::CreatedAt.lt(end_of_local_day(to)));
    }
    select.order_by_desc(orders::Column::CreatedAt)
}

#[derive(Clone)]
pub struct OrderService {
    pool: DbPool,
}

impl OrderService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load_items(&self, order_id: i64) -> AppResult<Vec<order_items::Model>> {
        Ok(order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(order_id))
            .order_by_asc(order_items::Column::Id)
            .all(self.pool.as_ref())
            .await?)
    }

    pub async fn quote(&self, req: &CalculateTotalsRequest, user_id: Option<i64>) -> AppResult<OrderQuoteResponse> {
        let now = Utc::now();
        let settings = load_settings(self.pool.as_ref()).await?;
        let coords = coordinates(req.latitude, req.longitude)?;
        let lines = price_lines(self.pool.as_ref(), &req.items).await?;
        let promo_code = match req.promo_code.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(code) => Some(find_usable_promo(self.pool.as_ref(), code, user_id, now, "promo_code").await?),
            None => None,
        };
        let reward = match (req.user_reward_id, user_id) {
            (Some(id), Some(user_id)) => Some(usable_user_reward(self.pool.as_ref(), user_id, id, now).await?.1),
            (Some(_), None) => return Err(AppError::AuthError("Sign in to use rewards".into())),
            (None, _) => None,
        };
        build_quote(
            &lines,
            &settings,
            &req.delivery_type,
            coords,
            promo_code.as_ref(),
            reward.as_ref(),
        )
    }

    pub async fn delivery_fee(&self, req: &DeliveryFeeRequest) -> AppResult<DeliveryQuote> {
        if req.subtotal < 0 {
            return Err(AppError::field("subtotal", "Subtotal cannot be negative"));
        }
        let coords = coordinates(req.latitude, req.longitude)?;
        let settings = load_settings(self.pool.as_ref()).await?;
        settings
            .delivery_pricing()
            .quote(&req.delivery_type, req.subtotal, coords)
    }

    /// Place an order for a signed-in user or a guest.
    pub async fn create(&self, req: CreateOrderRequest, user_id: Option<i64>) -> AppResult<OrderResponse> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_create(&req, user_id).await {
                Err(e) if attempt < ORDER_NUMBER_ATTEMPTS && is_order_number_collision(&e) => {
                    log::warn!("Order number collision, retrying (attempt {attempt})");
                }
                result => return result,
            }
        }
    }

    async fn try_create(&self, req: &CreateOrderRequest, user_id: Option<i64>) -> AppResult<OrderResponse> {
        let now = Utc::now();
        let settings = load_settings(self.pool.as_ref()).await?;
        if !settings.is_accepting_orders_at(local_time_now()) {
            let message = if settings.maintenance_mode && !settings.maintenance_message.is_empty() {
                settings.maintenance_message.clone()
            } else {
                "The restaurant is not accepting orders right now".to_string()
            };
            return Err(AppError::ValidationError(message));
        }

        let guest = match user_id {
            Some(_) => None,
            None => {
                if req.user_reward_id.is_some() || req.address_id.is_some() {
                    return Err(AppError::AuthError(
                        "Sign in to use saved addresses or rewards".into(),
                    ));
                }
                Some(guest_contact(req)?)
            }
        };

        let payment_method = req.payment_method.clone().unwrap_or(PaymentMethod::Online);
        if payment_method == PaymentMethod::Cash && !settings.accepts_cash {
            return Err(AppError::field("payment_method", "Cash payments are not accepted"));
        }
        if payment_method == PaymentMethod::Online
            && !(settings.accepts_card || settings.accepts_mobile_money)
        {
            return Err(AppError::field("payment_method", "Online payments are not accepted"));
        }

        let txn = self.pool.begin().await?;

        let (delivery_address, coords) = match (&req.delivery_type, req.address_id, user_id) {
            (DeliveryType::Pickup, _, _) => (None, None),
            (DeliveryType::Delivery, Some(address_id), Some(user_id)) => {
                let address = addr::Entity::find_by_id(address_id)
                    .filter(addr::Column::UserId.eq(user_id))
                    .one(&txn)
                    .await?
                    .ok_or_else(|| AppError::field("address_id", "Address not found"))?;
                let coords = match address.coordinates() {
                    Some(c) => Some(c),
                    None => coordinates(req.latitude, req.longitude)?,
                };
                (Some(address.one_line()), coords)
            }
            (DeliveryType::Delivery, _, _) => {
                let text = req
                    .delivery_address
                    .as_deref()
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .ok_or_else(|| {
                        AppError::field("delivery_address", "Delivery address is required")
                    })?;
                (Some(text.to_string()), coordinates(req.latitude, req.longitude)?)
            }
        };

        let lines = price_lines(&txn, &req.items).await?;
        let promo_code = match req.promo_code.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(code) => Some(find_usable_promo(&txn, code, user_id, now, "promo_code").await?),
            None => None,
        };
        let reward = match (req.user_reward_id, user_id) {
            (Some(id), Some(user_id)) => Some(usable_user_reward(&txn, user_id, id, now).await?.1),
            _ => None,
        };
        let quote = build_quote(
            &lines,
            &settings,
            &req.delivery_type,
            coords,
            promo_code.as_ref(),
            reward.as_ref(),
        )?;
        if quote.subtotal < settings.minimum_order {
            return Err(AppError::field(
                "items",
                format!(
                    "Minimum order amount is ₦{:.2}",
                    settings.minimum_order as f64 / 100.0
                ),
            ));
        }

        let order = orders::ActiveModel {
            order_number: Set(next_order_number(&txn).await?),
            user_id: Set(user_id),
            guest_name: Set(guest.as_ref().map(|g| g.name.clone())),
            guest_email: Set(guest.as_ref().map(|g| g.email.clone())),
            guest_phone: Set(guest.as_ref().map(|g| g.phone.clone())),
            delivery_type: Set(req.delivery_type.clone()),
            delivery_address: Set(delivery_address),
            latitude: Set(coords.map(|c| c.0)),
            longitude: Set(coords.map(|c| c.1)),
            special_instructions: Set(req.special_instructions.clone()),
            subtotal: Set(quote.subtotal),
            tax_amount: Set(quote.tax_amount),
            delivery_fee: Set(quote.delivery_fee),
            discount_amount: Set(quote.discount_amount),
            total_amount: Set(quote.total_amount),
            status: Set(OrderStatus::Pending),
            payment_status: Set(OrderPaymentStatus::Pending),
            payment_method: Set(payment_method),
            promo_code_id: Set(promo_code.as_ref().map(|p| p.id)),
            user_reward_id: Set(req.user_reward_id.filter(|_| reward.is_some())),
            estimated_delivery_time: Set(Some(now + Duration::minutes(quote.estimated_minutes))),
            points_awarded: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let item = order_items::ActiveModel {
                order_id: Set(order.id),
                menu_item_id: Set(line.menu_item_id),
                item_name: Set(line.name.clone()),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                total_price: Set(line.total_price()),
                special_instructions: Set(line.special_instructions.clone()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            items.push(item);
        }

        if let Some(p) = &promo_code {
            apply_promo(&txn, p, user_id, order.id, quote.promo_discount).await?;
        }
        if let (Some(user_reward_id), Some(user_id), Some(_)) = (req.user_reward_id, user_id, &reward) {
            mark_reward_used(&txn, user_id, user_reward_id, Some(order.id), now).await?;
        }
        txn.commit().await?;

        log::info!(
            "Order created: number={} user={:?} total={} items={}",
            order.order_number,
            order.user_id,
            order.total_amount,
            items.len()
        );
        Ok(OrderResponse::new(order, items))
    }

    pub async fn list_mine(&self, user_id: i64, query: &OrderQuery) -> AppResult<PaginatedResponse<OrderSummary>> {
        let select = orders::Entity::find().filter(orders::Column::UserId.eq(user_id));
        self.paginate(apply_filters(select, query), query).await
    }

    pub async fn list_all(&self, query: &OrderQuery) -> AppResult<PaginatedResponse<OrderSummary>> {
        self.paginate(apply_filters(orders::Entity::find(), query), query).await
    }

    async fn paginate(
        &self,
        select: Select<orders::Entity>,
        query: &OrderQuery,
    ) -> AppResult<PaginatedResponse<OrderSummary>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let paginator = select.paginate(self.pool.as_ref(), params.page_size());
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(params.page_index()).await?;
        Ok(PaginatedResponse::from_params(
            rows.into_iter().map(OrderSummary::from).collect(),
            &params,
            total,
        ))
    }

    /// Order visible to `viewer_id`: its owner, or any staff member.
    async fn visible_order(&self, order_id: i64, viewer_id: i64, is_staff: bool) -> AppResult<orders::Model> {
        let order = orders::Entity::find_by_id(order_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".into()))?;
        if !is_staff && order.user_id != Some(viewer_id) {
            return Err(AppError::NotFound("Order not found".into()));
        }
        Ok(order)
    }

    pub async fn get(&self, order_id: i64, viewer_id: i64, is_staff: bool) -> AppResult<OrderResponse> {
        let order = self.visible_order(order_id, viewer_id, is_staff).await?;
        let items = self.load_items(order.id).await?;
        Ok(OrderResponse::new(order, items))
    }

    pub async fn cancel(&self, order_id: i64, viewer_id: i64, is_staff: bool) -> AppResult<OrderResponse> {
        let order = self.visible_order(order_id, viewer_id, is_staff).await?;
        if !order.can_be_cancelled() {
            return Err(AppError::ValidationError(format!(
                "Order cannot be cancelled once {}",
                order.status
            )));
        }
        let order = self
            .set_status(&order, OrderStatus::Cancelled)
            .await?;
        log::info!("Order cancelled: {} by user {viewer_id}", order.order_number);
        let items = self.load_items(order.id).await?;
        Ok(OrderResponse::new(order, items))
    }

    pub async fn tracking(&self, order_number: &str) -> AppResult<OrderTrackingResponse> {
        orders::Entity::find()
            .filter(orders::Column::OrderNumber.eq(order_number.trim().to_uppercase()))
            .one(self.pool.as_ref())
            .await?
            .map(OrderTrackingResponse::from)
            .ok_or_else(|| AppError::NotFound("Order not found".into()))
    }

    /// Staff status change, restricted to the order workflow.
    pub async fn update_status(&self, order_id: i64, next: OrderStatus) -> AppResult<OrderResponse> {
        let order = orders::Entity::find_by_id(order_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".into()))?;
        if !order.can_transition_to(&next) {
            return Err(AppError::field(
                "status",
                format!("Cannot change order status from {} to {}", order.status, next),
            ));
        }
        let previous = order.status.clone();
        let order = self.set_status(&order, next).await?;
        log::info!(
            "Order status changed: {} {} -> {}",
            order.order_number,
            previous,
            order.status
        );
        let items = self.load_items(order.id).await?;
        Ok(OrderResponse::new(order, items))
    }

    /// Move the order to `next` only if nobody changed its status meanwhile.
    async fn set_status(&self, order: &orders::Model, next: OrderStatus) -> AppResult<orders::Model> {
        let now = Utc::now();
        let mut update = orders::Entity::update_many()
            .col_expr(orders::Column::Status, next.as_enum())
            .col_expr(orders::Column::UpdatedAt, Expr::value(now))
            .filter(orders::Column::Id.eq(order.id))
            .filter(orders::Column::Status.eq(order.status.clone()));
        if next == OrderStatus::Delivered {
            update = update.col_expr(orders::Column::ActualDeliveryTime, Expr::value(Some(now)));
        }
        let res = update.exec(self.pool.as_ref()).await?;
        if res.rows_affected == 0 {
            return Err(AppError::Conflict("Order status changed concurrently".into()));
        }
        orders::Entity::find_by_id(order.id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{DiscountType, RewardType};
    use chrono::NaiveTime;

    fn settings() -> rs::Model {
        rs::Model {
            id: 1,
            name: "Chopsticks and Bowls".into(),
            description: String::new(),
            tagline: String::new(),
            address: String::new(),
            phone: String::new(),
            email: String::new(),
            latitude: 9.0820,
            longitude: 7.3986,
            opening_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            closing_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            opening_hours: None,
            is_open: true,
            delivery_radius_km: 15.0,
            minimum_order: 0,
            free_delivery_threshold: 1_000_000,
            vat_rate_bp: 750,
            pickup_fee: 0,
            delivery_fee_base: 50_000,
            delivery_fee_per_km: 10_000,
            accepts_cash: true,
            accepts_card: true,
            accepts_mobile_money: true,
            maintenance_mode: false,
            maintenance_message: String::new(),
            updated_at: Utc::now(),
        }
    }

    fn line(price: i64, quantity: i32) -> PricedLine {
        PricedLine {
            menu_item_id: 1,
            name: "Jollof Rice".into(),
            quantity,
            unit_price: price,
            special_instructions: None,
        }
    }

    fn promo(discount_type: DiscountType, value: i64, minimum: i64) -> promo::Model {
        let now = Utc::now();
        promo::Model {
            id: 1,
            code: "SAVE10".into(),
            description: String::new(),
            discount_type,
            discount_value: value,
            minimum_order_amount: minimum,
            maximum_discount: None,
            is_active: true,
            usage_limit: 0,
            current_usage: 0,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            created_at: now,
            updated_at: now,
        }
    }

    fn reward(reward_type: RewardType, amount: Option<i64>) -> rewards::Model {
        let now = Utc::now();
        rewards::Model {
            id: 1,
            name: "Treat".into(),
            description: String::new(),
            reward_type,
            points_required: 500,
            discount_percentage_bp: None,
            discount_amount: amount,
            free_item_id: None,
            is_active: true,
            max_redemptions: 0,
            current_redemptions: 0,
            valid_from: now - Duration::days(1),
            valid_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_total_is_sum_of_parts() {
        let s = settings();
        let lines = [line(250_000, 2), line(80_000, 1)];
        let q = build_quote(&lines, &s, &DeliveryType::Delivery, None, None, None).unwrap();
        assert_eq!(q.subtotal, 580_000);
        assert_eq!(q.tax_amount, 43_500);
        assert_eq!(q.delivery_fee, 50_000);
        assert_eq!(q.total_amount, q.subtotal + q.tax_amount + q.delivery_fee - q.discount_amount);
        assert_eq!(q.estimated_minutes, 35);
    }

    #[test]
    fn test_free_delivery_at_threshold() {
        let s = settings();
        let q = build_quote(&[line(500_000, 2)], &s, &DeliveryType::Delivery, None, None, None).unwrap();
        assert_eq!(q.delivery_fee, 0);
        assert!(q.free_delivery_applied);

        let q = build_quote(&[line(999_999, 1)], &s, &DeliveryType::Delivery, None, None, None).unwrap();
        assert_eq!(q.delivery_fee, 50_000);
    }

    #[test]
    fn test_discounts_combine_and_are_capped() {
        let s = settings();
        let p = promo(DiscountType::Percentage, 1000, 0);
        let r = reward(RewardType::FreeDelivery, None);
        let q = build_quote(&[line(200_000, 1)], &s, &DeliveryType::Delivery, None, Some(&p), Some(&r)).unwrap();
        assert_eq!(q.promo_discount, 20_000);
        assert_eq!(q.reward_discount, 50_000);
        assert_eq!(q.discount_amount, 70_000);
        assert_eq!(q.total_amount, 200_000 + 15_000 + 50_000 - 70_000);

        let big = reward(RewardType::Cashback, Some(10_000_000));
        let q = build_quote(&[line(10_000, 1)], &s, &DeliveryType::Pickup, None, None, Some(&big)).unwrap();
        assert_eq!(q.total_amount, 0);
        assert_eq!(q.discount_amount, q.subtotal + q.tax_amount + q.delivery_fee);
    }

    #[test]
    fn test_promo_minimum_order() {
        let s = settings();
        let p = promo(DiscountType::Fixed, 50_000, 300_000);
        let res = build_quote(&[line(100_000, 1)], &s, &DeliveryType::Pickup, None, Some(&p), None);
        assert!(matches!(res, Err(AppError::FieldErrors(ref e)) if e[0].field == "promo_code"));
    }

    #[test]
    fn test_outside_delivery_zone() {
        let s = settings();
        // Lagos is far outside a 15 km radius around Abuja
        let res = build_quote(
            &[line(100_000, 1)],
            &s,
            &DeliveryType::Delivery,
            Some((6.5244, 3.3792)),
            None,
            None,
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_line_validation() {
        assert!(validate_order_lines(&[]).is_err());
        let bad = OrderItemRequest {
            menu_item_id: 1,
            quantity: 51,
            special_instructions: None,
        };
        match validate_order_lines(&[bad]) {
            Err(AppError::FieldErrors(errs)) => assert_eq!(errs[0].field, "items[0].quantity"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_coordinates_pairing() {
        assert_eq!(coordinates(None, None).unwrap(), None);
        assert_eq!(coordinates(Some(6.5), Some(3.4)).unwrap(), Some((6.5, 3.4)));
        assert!(coordinates(Some(6.5), None).is_err());
        assert!(coordinates(Some(95.0), Some(3.4)).is_err());
    }
}
