use crate::database::DbPool;
use crate::entities::{SocialProvider, social_account_entity as sa, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::external::{GoogleOAuthService, GoogleUserInfo};
use crate::models::*;
use crate::utils::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, Set, TransactionTrait,
};

const CODE_ATTEMPTS: u32 = 10;

#[derive(Clone)]
pub struct AuthService {
    pool: DbPool,
    jwt_service: JwtService,
    google: GoogleOAuthService,
}

/// Identity asserted by a social provider
#[derive(Debug, Clone)]
struct SocialIdentity {
    provider: SocialProvider,
    provider_user_id: String,
    email: String,
    first_name: String,
    last_name: String,
    avatar_url: Option<String>,
}

impl From<GoogleUserInfo> for SocialIdentity {
    fn from(info: GoogleUserInfo) -> Self {
        Self {
            provider: SocialProvider::Google,
            provider_user_id: info.id,
            email: info.email.trim().to_lowercase(),
            first_name: info.given_name.unwrap_or_default(),
            last_name: info.family_name.unwrap_or_default(),
            avatar_url: info.picture,
        }
    }
}

/// A referral code unused by any account
pub async fn unique_referral_code<C: ConnectionTrait>(db: &C) -> AppResult<String> {
    for _ in 0..CODE_ATTEMPTS {
        let code = generate_referral_code();
        let taken = users::Entity::find()
            .filter(users::Column::ReferralCode.eq(code.clone()))
            .count(db)
            .await?;
        if taken == 0 {
            return Ok(code);
        }
    }
    Err(AppError::InternalError(
        "Could not allocate a unique referral code".into(),
    ))
}

async fn unique_username<C: ConnectionTrait>(db: &C, email: &str) -> AppResult<String> {
    for suffix in 0..100 {
        let candidate = username_from_email(email, suffix);
        let taken = users::Entity::find()
            .filter(users::Column::Username.eq(candidate.clone()))
            .count(db)
            .await?;
        if taken == 0 {
            return Ok(candidate);
        }
    }
    Err(AppError::Conflict("Could not derive a free username".into()))
}

pub fn validate_registration(req: &RegisterRequest) -> AppResult<()> {
    let mut errors = ValidationErrors::new();
    errors.check(
        is_valid_email(req.email.trim()),
        "email",
        "Enter a valid email address",
    );
    if let Err(AppError::FieldErrors(password_errors)) = validate_password(&req.password) {
        for e in password_errors {
            errors.add(&e.field, e.message);
        }
    }
    errors.check(
        !req.first_name.trim().is_empty(),
        "first_name",
        "First name is required",
    );
    errors.check(
        !req.last_name.trim().is_empty(),
        "last_name",
        "Last name is required",
    );
    if let Some(phone) = req.phone.as_deref().filter(|p| !p.trim().is_empty()) {
        errors.check(
            normalize_ng_phone(phone).is_ok(),
            "phone",
            "Enter a valid Nigerian phone number",
        );
    }
    if let Some(dob) = req.date_of_birth {
        errors.check(
            dob < Utc::now().date_naive(),
            "date_of_birth",
            "Date of birth must be in the past",
        );
    }
    errors.into_result()
}

impl AuthService {
    pub fn new(pool: DbPool, jwt_service: JwtService, google: GoogleOAuthService) -> Self {
        Self {
            pool,
            jwt_service,
            google,
        }
    }

    fn issue_tokens(&self, user: users::Model, is_new_user: bool) -> AppResult<AuthResponse> {
        let access_token =
            self.jwt_service
                .generate_access_token(user.id, &user.email, user.is_staff)?;
        let refresh_token =
            self.jwt_service
                .generate_refresh_token(user.id, &user.email, user.is_staff)?;
        Ok(AuthResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.get_access_token_expires_in(),
            user: UserResponse::from(user),
            is_new_user,
        })
    }

    pub async fn register(&self, req: RegisterRequest) -> AppResult<AuthResponse> {
        validate_registration(&req)?;
        let email = req.email.trim().to_lowercase();

        let exists = users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .count(self.pool.as_ref())
            .await?;
        if exists > 0 {
            return Err(AppError::field("email", "An account with this email already exists"));
        }

        let referrer = match req
            .referral_code
            .as_deref()
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
        {
            Some(code) if !is_valid_referral_code(&code) => {
                return Err(AppError::field("referral_code", "Invalid referral code"));
            }
            Some(code) => Some(
                users::Entity::find()
                    .filter(users::Column::ReferralCode.eq(code))
                    .one(self.pool.as_ref())
                    .await?
                    .ok_or_else(|| AppError::field("referral_code", "Invalid referral code"))?,
            ),
            None => None,
        };

        let phone = match req.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(p) => Some(normalize_ng_phone(p)?),
            None => None,
        };
        let password_hash = hash_password(&req.password)?;

        let txn = self.pool.begin().await?;
        let user = users::ActiveModel {
            email: Set(email.clone()),
            username: Set(Some(unique_username(&txn, &email).await?)),
            password_hash: Set(Some(password_hash)),
            first_name: Set(req.first_name.trim().to_string()),
            last_name: Set(req.last_name.trim().to_string()),
            phone: Set(phone),
            date_of_birth: Set(req.date_of_birth),
            referral_code: Set(unique_referral_code(&txn).await?),
            referred_by: Set(referrer.as_ref().map(|r| r.id)),
            is_staff: Set(false),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!("User registered: id={} referred_by={:?}", user.id, user.referred_by);
        self.issue_tokens(user, true)
    }

    pub async fn login(&self, req: LoginRequest) -> AppResult<AuthResponse> {
        let email = req.email.trim().to_lowercase();
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

        let Some(hash) = user.password_hash.as_deref() else {
            return Err(AppError::AuthError(
                "This account uses social login".to_string(),
            ));
        };
        if !verify_password(&req.password, hash)? {
            return Err(AppError::AuthError("Invalid email or password".to_string()));
        }
        if !user.is_active {
            return Err(AppError::AuthError("Account is disabled".to_string()));
        }

        log::info!("User logged in: id={}", user.id);
        self.issue_tokens(user, false)
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<RefreshTokenResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user_id = claims.user_id()?;
        let user = users::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::AuthError("User not found".to_string()))?;

        Ok(RefreshTokenResponse {
            access_token: self
                .jwt_service
                .generate_access_token(user.id, &user.email, user.is_staff)?,
            refresh_token: self
                .jwt_service
                .generate_refresh_token(user.id, &user.email, user.is_staff)?,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    pub fn google_oauth_url(&self) -> AppResult<OAuthUrlResponse> {
        Ok(OAuthUrlResponse {
            authorization_url: self.google.authorization_url()?,
        })
    }

    pub async fn social_login(&self, req: SocialLoginRequest) -> AppResult<AuthResponse> {
        let identity = match req.provider {
            SocialProvider::Google => {
                let info = self.google.fetch_user_info(&req.access_token).await?;
                if !info.verified_email {
                    return Err(AppError::AuthError(
                        "Google account email is not verified".to_string(),
                    ));
                }
                SocialIdentity::from(info)
            }
            provider => {
                let mut errors = ValidationErrors::new();
                let provider_user_id = req.provider_user_id.clone().unwrap_or_default();
                let email = req.email.clone().unwrap_or_default().trim().to_lowercase();
                errors.check(
                    !provider_user_id.is_empty(),
                    "provider_user_id",
                    "Provider user ID is required for this provider",
                );
                errors.check(is_valid_email(&email), "email", "A valid email is required");
                errors.into_result()?;
                SocialIdentity {
                    provider,
                    provider_user_id,
                    email,
                    first_name: req.first_name.clone().unwrap_or_default(),
                    last_name: req.last_name.clone().unwrap_or_default(),
                    avatar_url: None,
                }
            }
        };
        self.login_with_identity(identity).await
    }

    /// Completes the server-side Google flow started from `google_oauth_url`.
    pub async fn google_callback(&self, code: &str) -> AppResult<AuthResponse> {
        if code.trim().is_empty() {
            return Err(AppError::field("code", "Authorization code is required"));
        }
        let access_token = self.google.exchange_code(code.trim()).await?;
        self.social_login(SocialLoginRequest {
            provider: SocialProvider::Google,
            access_token,
            provider_user_id: None,
            email: None,
            first_name: None,
            last_name: None,
        })
        .await
    }

    async fn login_with_identity(&self, identity: SocialIdentity) -> AppResult<AuthResponse> {
        let txn = self.pool.begin().await?;

        // Known social account
        if let Some(account) = sa::Entity::find()
            .filter(sa::Column::Provider.eq(identity.provider.clone()))
            .filter(sa::Column::ProviderUserId.eq(identity.provider_user_id.clone()))
            .one(&txn)
            .await?
        {
            let user = users::Entity::find_by_id(account.user_id)
                .one(&txn)
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".into()))?;
            txn.commit().await?;
            if !user.is_active {
                return Err(AppError::AuthError("Account is disabled".to_string()));
            }
            return self.issue_tokens(user, false);
        }

        // Existing account with the same email: link it
        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(identity.email.clone()))
            .one(&txn)
            .await?;
        let (user, is_new_user) = match existing {
            Some(user) => (user, false),
            None => {
                let user = users::ActiveModel {
                    email: Set(identity.email.clone()),
                    username: Set(Some(unique_username(&txn, &identity.email).await?)),
                    password_hash: Set(None),
                    first_name: Set(identity.first_name.clone()),
                    last_name: Set(identity.last_name.clone()),
                    avatar_url: Set(identity.avatar_url.clone()),
                    referral_code: Set(unique_referral_code(&txn).await?),
                    is_staff: Set(false),
                    is_active: Set(true),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                (user, true)
            }
        };

        sa::ActiveModel {
            user_id: Set(user.id),
            provider: Set(identity.provider.clone()),
            provider_user_id: Set(identity.provider_user_id.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        if !user.is_active {
            return Err(AppError::AuthError("Account is disabled".to_string()));
        }
        log::info!(
            "{} login linked to user {} (new: {})",
            identity.provider,
            user.id,
            is_new_user
        );
        self.issue_tokens(user, is_new_user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            email: "ada@example.com".into(),
            password: "Passw0rd123".into(),
            first_name: "Ada".into(),
            last_name: "Obi".into(),
            phone: Some("08031234567".into()),
            date_of_birth: None,
            referral_code: None,
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(validate_registration(&request()).is_ok());
    }

    #[test]
    fn test_registration_collects_field_errors() {
        let mut req = request();
        req.email = "not-an-email".into();
        req.password = "short".into();
        req.first_name = " ".into();
        req.phone = Some("12345".into());
        match validate_registration(&req) {
            Err(AppError::FieldErrors(errs)) => {
                let fields: Vec<_> = errs.iter().map(|e| e.field.as_str()).collect();
                assert!(fields.contains(&"email"));
                assert!(fields.contains(&"password"));
                assert!(fields.contains(&"first_name"));
                assert!(fields.contains(&"phone"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_google_identity_normalizes_email() {
        let info = GoogleUserInfo {
            id: "1098".into(),
            email: " Ada@Example.com ".into(),
            verified_email: true,
            given_name: Some("Ada".into()),
            family_name: None,
            picture: None,
        };
        let identity = SocialIdentity::from(info);
        assert_eq!(identity.email, "ada@example.com");
        assert_eq!(identity.provider, SocialProvider::Google);
        assert_eq!(identity.last_name, "");
    }
}
