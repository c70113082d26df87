use crate::database::DbPool;
use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

#[derive(Clone)]
pub struct UserService {
    pool: DbPool,
}

impl UserService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_user(&self, user_id: i64) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn get_profile(&self, user_id: i64) -> AppResult<UserResponse> {
        Ok(UserResponse::from(self.find_user(user_id).await?))
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        req: UpdateProfileRequest,
    ) -> AppResult<UserResponse> {
        let user = self.find_user(user_id).await?;
        let mut errors = ValidationErrors::new();
        if let Some(name) = &req.first_name {
            errors.check(!name.trim().is_empty(), "first_name", "First name cannot be empty");
        }
        if let Some(name) = &req.last_name {
            errors.check(!name.trim().is_empty(), "last_name", "Last name cannot be empty");
        }
        let phone = match req.phone.as_deref().map(str::trim) {
            Some("") => Some(None),
            Some(p) => match normalize_ng_phone(p) {
                Ok(p) => Some(Some(p)),
                Err(_) => {
                    errors.add("phone", "Enter a valid Nigerian phone number");
                    None
                }
            },
            None => None,
        };
        if let Some(dob) = req.date_of_birth {
            errors.check(
                dob < Utc::now().date_naive(),
                "date_of_birth",
                "Date of birth must be in the past",
            );
        }
        if let Some(username) = req.username.as_deref().map(str::trim) {
            if username.len() < 3 {
                errors.add("username", "Username must be at least 3 characters");
            } else {
                let taken = users::Entity::find()
                    .filter(users::Column::Username.eq(username))
                    .filter(users::Column::Id.ne(user_id))
                    .count(self.pool.as_ref())
                    .await?;
                errors.check(taken == 0, "username", "Username is already taken");
            }
        }
        errors.into_result()?;

        let mut am = user.into_active_model();
        if let Some(v) = req.first_name {
            am.first_name = Set(v.trim().to_string());
        }
        if let Some(v) = req.last_name {
            am.last_name = Set(v.trim().to_string());
        }
        if let Some(v) = phone {
            am.phone = Set(v);
        }
        if let Some(v) = req.date_of_birth {
            am.date_of_birth = Set(Some(v));
        }
        if let Some(v) = req.avatar_url {
            am.avatar_url = Set(Some(v).filter(|u| !u.is_empty()));
        }
        if let Some(v) = req.username {
            am.username = Set(Some(v.trim().to_string()));
        }
        am.updated_at = Set(Utc::now());
        let user = am.update(self.pool.as_ref()).await?;
        Ok(UserResponse::from(user))
    }

    pub async fn change_password(&self, user_id: i64, req: ChangePasswordRequest) -> AppResult<()> {
        let user = self.find_user(user_id).await?;
        if let Some(hash) = user.password_hash.as_deref() {
            let old = req.old_password.as_deref().unwrap_or_default();
            if !verify_password(old, hash)? {
                return Err(AppError::field("old_password", "Current password is incorrect"));
            }
        }
        validate_password(&req.new_password).map_err(|e| match e {
            AppError::FieldErrors(errs) => AppError::FieldErrors(
                errs.into_iter()
                    .map(|f| crate::error::FieldError::new("new_password", f.message))
                    .collect(),
            ),
            other => other,
        })?;

        let mut am = user.into_active_model();
        am.password_hash = Set(Some(hash_password(&req.new_password)?));
        am.updated_at = Set(Utc::now());
        am.update(self.pool.as_ref()).await?;
        log::info!("Password changed for user {user_id}");
        Ok(())
    }

    pub async fn referrals(&self, user_id: i64) -> AppResult<ReferralSummary> {
        let user = self.find_user(user_id).await?;
        let referred = users::Entity::find()
            .filter(users::Column::ReferredBy.eq(user_id))
            .order_by_desc(users::Column::CreatedAt)
            .all(self.pool.as_ref())
            .await?;
        Ok(ReferralSummary {
            referral_code: user.referral_code,
            referrals_count: referred.len() as u64,
            referred_users: referred
                .into_iter()
                .map(|u| ReferredUser {
                    id: u.id,
                    full_name: u.full_name(),
                    joined_at: u.created_at,
                })
                .collect(),
        })
    }

    pub async fn list_users(
        &self,
        query: &UserListQuery,
    ) -> AppResult<PaginatedResponse<AdminUserResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let mut select = users::Entity::find().order_by_desc(users::Column::CreatedAt);
        if let Some(is_staff) = query.is_staff {
            select = select.filter(users::Column::IsStaff.eq(is_staff));
        }
        if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = format!("%{}%", q.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(users::Column::Email))).like(pattern.clone()))
                    .add(Expr::expr(Func::lower(Expr::col(users::Column::FirstName))).like(pattern.clone()))
                    .add(Expr::expr(Func::lower(Expr::col(users::Column::LastName))).like(pattern)),
            );
        }
        let paginator = select.paginate(self.pool.as_ref(), params.page_size());
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(params.page_index()).await?;
        Ok(PaginatedResponse::from_params(
            rows.into_iter().map(AdminUserResponse::from).collect(),
            &params,
            total,
        ))
    }

    pub async fn set_staff(&self, user_id: i64, is_staff: bool) -> AppResult<AdminUserResponse> {
        let user = self.find_user(user_id).await?;
        let mut am = user.into_active_model();
        am.is_staff = Set(is_staff);
        am.updated_at = Set(Utc::now());
        let user = am.update(self.pool.as_ref()).await?;
        log::info!("User {user_id} staff flag set to {is_staff}");
        Ok(AdminUserResponse::from(user))
    }
}
