use crate::database::DbPool;
use crate::entities::{
    DiscountType, OrderPaymentStatus, OrderStatus, PromoRejection, order_entity as orders,
    order_item_entity as order_items, promo_code_entity as promo, promo_code_usage_entity as usage,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::pricing::compute_totals;
use crate::utils::{ValidationErrors, is_valid_promo_code};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use std::collections::HashMap;

/// Upper-case a user supplied code and check its shape.
pub fn normalize_promo_code(code: &str, field: &str) -> AppResult<String> {
    let code = code.trim().to_uppercase();
    if !is_valid_promo_code(&code) {
        return Err(AppError::field(field, "Invalid promo code format"));
    }
    Ok(code)
}

/// Look up a code that can be used right now. `field` names the request
/// field errors are reported against.
pub async fn find_usable_promo<C: ConnectionTrait>(
    db: &C,
    code: &str,
    user_id: Option<i64>,
    now: DateTime<Utc>,
    field: &str,
) -> AppResult<promo::Model> {
    let code = normalize_promo_code(code, field)?;
    let promo_code = promo::Entity::find()
        .filter(promo::Column::Code.eq(code))
        .one(db)
        .await?
        .ok_or_else(|| AppError::field(field, "Promo code not found"))?;
    promo_code
        .check_valid_at(now)
        .map_err(|reason| AppError::field(field, reason.to_string()))?;
    if let Some(user_id) = user_id {
        if has_used(db, promo_code.id, user_id).await? {
            return Err(AppError::field(field, "You have already used this promo code"));
        }
    }
    Ok(promo_code)
}

/// Unique index enforcing one use of a code per signed-in user.
const ONE_USE_PER_USER_INDEX: &str = "idx_promo_code_usages_code_user";

fn already_used() -> AppError {
    AppError::field("promo_code", "You have already used this promo code")
}

/// Map a unique violation on `promo_code_usages` to the rule it enforces.
/// Concurrent orders both pass the read check; the index rejects the loser.
fn usage_conflict(constraint_message: &str) -> AppError {
    if constraint_message.contains(ONE_USE_PER_USER_INDEX) {
        already_used()
    } else {
        AppError::Conflict("Promo code already applied to this order".into())
    }
}

fn usage_insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => usage_conflict(&msg),
        _ => AppError::from(err),
    }
}

async fn has_used<C: ConnectionTrait>(db: &C, promo_code_id: i64, user_id: i64) -> AppResult<bool> {
    let count = usage::Entity::find()
        .filter(usage::Column::PromoCodeId.eq(promo_code_id))
        .filter(usage::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Consume one use of `promo_code` for `order_id`.
///
/// The usage counter only moves while it is below the limit, so concurrent
/// orders cannot push a code past `usage_limit`.
pub async fn apply_promo<C: ConnectionTrait>(
    db: &C,
    promo_code: &promo::Model,
    user_id: Option<i64>,
    order_id: i64,
    discount_amount: i64,
) -> AppResult<usage::Model> {
    let used_on_order = usage::Entity::find()
        .filter(usage::Column::PromoCodeId.eq(promo_code.id))
        .filter(usage::Column::OrderId.eq(order_id))
        .count(db)
        .await?;
    if used_on_order > 0 {
        return Err(AppError::Conflict("Promo code already applied to this order".into()));
    }
    if let Some(user_id) = user_id {
        if has_used(db, promo_code.id, user_id).await? {
            return Err(already_used());
        }
    }

    let claimed = promo::Entity::update_many()
        .col_expr(
            promo::Column::CurrentUsage,
            Expr::col(promo::Column::CurrentUsage).add(1),
        )
        .col_expr(promo::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(promo::Column::Id.eq(promo_code.id))
        .filter(promo::Column::IsActive.eq(true))
        .filter(
            Condition::any()
                .add(promo::Column::UsageLimit.eq(0))
                .add(
                    Expr::col(promo::Column::CurrentUsage)
                        .lt(Expr::col(promo::Column::UsageLimit)),
                ),
        )
        .exec(db)
        .await?;
    if claimed.rows_affected == 0 {
        return Err(AppError::field(
            "promo_code",
            PromoRejection::UsageLimitReached.to_string(),
        ));
    }

    let row = usage::ActiveModel {
        promo_code_id: Set(promo_code.id),
        user_id: Set(user_id),
        order_id: Set(order_id),
        discount_amount: Set(discount_amount),
        used_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(usage_insert_error)?;
    log::info!(
        "Promo code applied: code={} order={} discount={}",
        promo_code.code,
        order_id,
        discount_amount
    );
    Ok(row)
}

pub fn validate_promo_fields(
    discount_type: &DiscountType,
    discount_value: i64,
    minimum_order_amount: i64,
    maximum_discount: Option<i64>,
    usage_limit: i32,
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
) -> AppResult<()> {
    let mut errors = ValidationErrors::new();
    match discount_type {
        DiscountType::Percentage => errors.check(
            (1..=10_000).contains(&discount_value),
            "discount_value",
            "Percentage must be between 1 and 10000 basis points",
        ),
        DiscountType::Fixed => errors.check(
            discount_value > 0,
            "discount_value",
            "Fixed discount must be positive",
        ),
    }
    errors.check(
        minimum_order_amount >= 0,
        "minimum_order_amount",
        "Minimum order amount cannot be negative",
    );
    if let Some(max) = maximum_discount {
        errors.check(max >= 0, "maximum_discount", "Maximum discount cannot be negative");
    }
    errors.check(usage_limit >= 0, "usage_limit", "Usage limit cannot be negative");
    errors.check(valid_until > valid_from, "valid_until", "End must be after start");
    errors.into_result()
}

#[derive(Clone)]
pub struct PromotionService {
    pool: DbPool,
}

impl PromotionService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn active_promotions(&self) -> AppResult<Vec<PromoCodeResponse>> {
        let now = Utc::now();
        let rows = promo::Entity::find()
            .filter(promo::Column::IsActive.eq(true))
            .filter(promo::Column::ValidFrom.lte(now))
            .filter(promo::Column::ValidUntil.gte(now))
            .order_by_asc(promo::Column::ValidUntil)
            .all(self.pool.as_ref())
            .await?;
        Ok(rows
            .into_iter()
            .filter(|p| p.is_valid_at(now))
            .map(PromoCodeResponse::from)
            .collect())
    }

    pub async fn get_promotion(&self, code: &str) -> AppResult<PromoCodeResponse> {
        let code = normalize_promo_code(code, "code")?;
        promo::Entity::find()
            .filter(promo::Column::Code.eq(code))
            .one(self.pool.as_ref())
            .await?
            .map(PromoCodeResponse::from)
            .ok_or_else(|| AppError::NotFound("Promo code not found".into()))
    }

    /// Dry run of a code against an order amount. Business rejections come
    /// back as `is_valid = false` with a message, not as errors.
    pub async fn validate(
        &self,
        req: &ValidatePromoRequest,
        user_id: Option<i64>,
    ) -> AppResult<ValidatePromoResponse> {
        if req.order_amount < 0 {
            return Err(AppError::field("order_amount", "Amount cannot be negative"));
        }
        let code = normalize_promo_code(&req.code, "code")?;
        let rejected = |message: String| ValidatePromoResponse {
            code: code.clone(),
            is_valid: false,
            discount_amount: 0,
            final_amount: req.order_amount,
            message,
        };

        let Some(promo_code) = promo::Entity::find()
            .filter(promo::Column::Code.eq(code.clone()))
            .one(self.pool.as_ref())
            .await?
        else {
            return Ok(rejected("Promo code not found".into()));
        };
        if let Err(reason) = promo_code.check_valid_at(Utc::now()) {
            return Ok(rejected(reason.to_string()));
        }
        if let Some(user_id) = user_id {
            if has_used(self.pool.as_ref(), promo_code.id, user_id).await? {
                return Ok(rejected("You have already used this promo code".into()));
            }
        }
        if req.order_amount < promo_code.minimum_order_amount {
            return Ok(rejected(format!(
                "Minimum order amount is ₦{:.2}",
                promo_code.minimum_order_amount as f64 / 100.0
            )));
        }

        let discount_amount = promo_code.calculate_discount(req.order_amount);
        Ok(ValidatePromoResponse {
            code,
            is_valid: true,
            discount_amount,
            final_amount: req.order_amount - discount_amount,
            message: "Promo code applied".into(),
        })
    }

    pub async fn usage_history(&self, user_id: i64) -> AppResult<Vec<PromoUsageResponse>> {
        let rows = usage::Entity::find()
            .filter(usage::Column::UserId.eq(user_id))
            .order_by_desc(usage::Column::UsedAt)
            .all(self.pool.as_ref())
            .await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let codes: HashMap<i64, String> = promo::Entity::find()
            .filter(promo::Column::Id.is_in(rows.iter().map(|u| u.promo_code_id)))
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(|p| (p.id, p.code))
            .collect();
        Ok(rows
            .into_iter()
            .map(|u| {
                let code = codes.get(&u.promo_code_id).cloned().unwrap_or_default();
                PromoUsageResponse::new(u, code)
            })
            .collect())
    }

    /// Attach a code to one of the caller's pending orders and recompute its totals.
    pub async fn apply_to_order(
        &self,
        user_id: i64,
        order_id: i64,
        code: &str,
    ) -> AppResult<OrderResponse> {
        let now = Utc::now();
        let txn = self.pool.begin().await?;
        let order = orders::Entity::find_by_id(order_id)
            .filter(orders::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".into()))?;
        if order.status != OrderStatus::Pending || order.payment_status != OrderPaymentStatus::Pending {
            return Err(AppError::ValidationError(
                "Promo codes can only be applied to pending orders".into(),
            ));
        }
        if order.promo_code_id.is_some() {
            return Err(AppError::Conflict("Order already has a promo code".into()));
        }

        let promo_code = find_usable_promo(&txn, code, Some(user_id), now, "code").await?;
        if order.subtotal < promo_code.minimum_order_amount {
            return Err(AppError::field("code", "Order does not meet the minimum amount"));
        }
        let discount = promo_code.calculate_discount(order.subtotal);
        apply_promo(&txn, &promo_code, Some(user_id), order.id, discount).await?;

        let totals = compute_totals(
            order.subtotal,
            order.tax_amount,
            order.delivery_fee,
            order.discount_amount + discount,
        );
        let mut am = order.into_active_model();
        am.promo_code_id = Set(Some(promo_code.id));
        am.discount_amount = Set(totals.discount_amount);
        am.total_amount = Set(totals.total_amount);
        am.updated_at = Set(now);
        let order = am.update(&txn).await?;
        let items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(order.id))
            .all(&txn)
            .await?;
        txn.commit().await?;
        Ok(OrderResponse::new(order, items))
    }

    // Staff operations

    pub async fn list_all(&self, params: &PaginationParams) -> AppResult<PaginatedResponse<PromoCodeResponse>> {
        let paginator = promo::Entity::find()
            .order_by_desc(promo::Column::CreatedAt)
            .paginate(self.pool.as_ref(), params.page_size());
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(params.page_index()).await?;
        Ok(PaginatedResponse::from_params(
            rows.into_iter().map(PromoCodeResponse::from).collect(),
            params,
            total,
        ))
    }

    pub async fn create(&self, req: CreatePromoCodeRequest) -> AppResult<PromoCodeResponse> {
        let code = normalize_promo_code(&req.code, "code")?;
        validate_promo_fields(
            &req.discount_type,
            req.discount_value,
            req.minimum_order_amount,
            req.maximum_discount,
            req.usage_limit,
            req.valid_from,
            req.valid_until,
        )?;
        let taken = promo::Entity::find()
            .filter(promo::Column::Code.eq(code.clone()))
            .count(self.pool.as_ref())
            .await?;
        if taken > 0 {
            return Err(AppError::field("code", "Promo code already exists"));
        }
        let model = promo::ActiveModel {
            code: Set(code),
            description: Set(req.description),
            discount_type: Set(req.discount_type),
            discount_value: Set(req.discount_value),
            minimum_order_amount: Set(req.minimum_order_amount),
            maximum_discount: Set(req.maximum_discount),
            is_active: Set(req.is_active.unwrap_or(true)),
            usage_limit: Set(req.usage_limit),
            current_usage: Set(0),
            valid_from: Set(req.valid_from),
            valid_until: Set(req.valid_until),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;
        log::info!("Promo code created: {}", model.code);
        Ok(PromoCodeResponse::from(model))
    }

    pub async fn update(&self, id: i64, req: UpdatePromoCodeRequest) -> AppResult<PromoCodeResponse> {
        let current = promo::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Promo code not found".into()))?;
        validate_promo_fields(
            req.discount_type.as_ref().unwrap_or(&current.discount_type),
            req.discount_value.unwrap_or(current.discount_value),
            req.minimum_order_amount.unwrap_or(current.minimum_order_amount),
            req.maximum_discount.or(current.maximum_discount),
            req.usage_limit.unwrap_or(current.usage_limit),
            req.valid_from.unwrap_or(current.valid_from),
            req.valid_until.unwrap_or(current.valid_until),
        )?;
        let mut am = current.into_active_model();
        if let Some(v) = req.description {
            am.description = Set(v);
        }
        if let Some(v) = req.discount_type {
            am.discount_type = Set(v);
        }
        if let Some(v) = req.discount_value {
            am.discount_value = Set(v);
        }
        if let Some(v) = req.minimum_order_amount {
            am.minimum_order_amount = Set(v);
        }
        if let Some(v) = req.maximum_discount {
            am.maximum_discount = Set(Some(v));
        }
        if let Some(v) = req.is_active {
            am.is_active = Set(v);
        }
        if let Some(v) = req.usage_limit {
            am.usage_limit = Set(v);
        }
        if let Some(v) = req.valid_from {
            am.valid_from = Set(v);
        }
        if let Some(v) = req.valid_until {
            am.valid_until = Set(v);
        }
        am.updated_at = Set(Utc::now());
        Ok(PromoCodeResponse::from(am.update(self.pool.as_ref()).await?))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let used = usage::Entity::find()
            .filter(usage::Column::PromoCodeId.eq(id))
            .count(self.pool.as_ref())
            .await?;
        if used > 0 {
            return Err(AppError::Conflict(
                "Promo code has been used; deactivate it instead".into(),
            ));
        }
        let res = promo::Entity::delete_by_id(id).exec(self.pool.as_ref()).await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Promo code not found".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    fn promo_code() -> promo::Model {
        let now = Utc::now();
        promo::Model {
            id: 3,
            code: "WELCOME10".into(),
            description: "Welcome".into(),
            discount_type: DiscountType::Percentage,
            discount_value: 1000,
            minimum_order_amount: 0,
            maximum_discount: None,
            is_active: true,
            usage_limit: 0,
            current_usage: 0,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(7),
            created_at: now,
            updated_at: now,
        }
    }

    fn field_message(err: AppError) -> (String, String) {
        match err {
            AppError::FieldErrors(errs) => (errs[0].field.clone(), errs[0].message.clone()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_normalize_promo_code() {
        assert_eq!(normalize_promo_code(" welcome10 ", "code").unwrap(), "WELCOME10");
        assert!(normalize_promo_code("no spaces!", "code").is_err());
        assert!(normalize_promo_code("", "promo_code").is_err());
    }

    #[test]
    fn test_percentage_bounds() {
        let now = Utc::now();
        let later = now + Duration::days(7);
        assert!(validate_promo_fields(&DiscountType::Percentage, 1000, 0, None, 0, now, later).is_ok());
        assert!(validate_promo_fields(&DiscountType::Percentage, 0, 0, None, 0, now, later).is_err());
        assert!(validate_promo_fields(&DiscountType::Percentage, 10_001, 0, None, 0, now, later).is_err());
    }

    #[test]
    fn test_window_and_limits() {
        let now = Utc::now();
        match validate_promo_fields(&DiscountType::Fixed, 50_000, -1, Some(-5), -1, now, now) {
            Err(AppError::FieldErrors(errs)) => {
                let fields: Vec<_> = errs.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(
                    fields,
                    ["minimum_order_amount", "maximum_discount", "usage_limit", "valid_until"]
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[actix_web::test]
    async fn test_second_use_by_same_user_is_refused() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(0)]])
            .append_query_results([[count_row(1)]])
            .into_connection();
        let err = apply_promo(&db, &promo_code(), Some(7), 11, 500).await.unwrap_err();
        assert_eq!(
            field_message(err),
            ("promo_code".to_string(), "You have already used this promo code".to_string())
        );
    }

    #[test]
    fn test_concurrent_use_maps_to_field_error() {
        let per_user = usage_conflict(
            "duplicate key value violates unique constraint \"idx_promo_code_usages_code_user\"",
        );
        assert_eq!(per_user.status_code(), 400);
        assert_eq!(field_message(per_user).0, "promo_code");

        let per_order = usage_conflict(
            "duplicate key value violates unique constraint \"idx_promo_code_usages_code_order\"",
        );
        assert!(matches!(per_order, AppError::Conflict(_)));
    }
}
