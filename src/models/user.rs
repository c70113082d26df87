use crate::entities::{SocialProvider, user_entity};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "Passw0rd123")]
    pub password: String,
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Obi")]
    pub last_name: String,
    #[schema(example = "08031234567")]
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    /// Referral code of an existing customer
    #[schema(example = "K3X9Q2ZA")]
    pub referral_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "Passw0rd123")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SocialLoginRequest {
    pub provider: SocialProvider,
    /// OAuth access token issued by the provider
    pub access_token: String,
    /// Required for providers whose tokens are not verified server-side
    pub provider_user_id: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GoogleCallbackRequest {
    /// Authorization code from the consent redirect
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OAuthUrlResponse {
    pub authorization_url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub avatar_url: Option<String>,
    pub referral_code: String,
    pub is_staff: bool,
    pub has_password: bool,
    pub created_at: DateTime<Utc>,
}

impl From<user_entity::Model> for UserResponse {
    fn from(u: user_entity::Model) -> Self {
        let full_name = u.full_name();
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
            full_name,
            phone: u.phone,
            date_of_birth: u.date_of_birth,
            avatar_url: u.avatar_url,
            referral_code: u.referral_code,
            is_staff: u.is_staff,
            has_password: u.password_hash.is_some(),
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
    /// True when the account was created by this request
    pub is_new_user: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub avatar_url: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    /// Omitted only by social-login accounts setting their first password
    pub old_password: Option<String>,
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReferredUser {
    pub id: i64,
    pub full_name: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReferralSummary {
    pub referral_code: String,
    pub referrals_count: u64,
    pub referred_users: Vec<ReferredUser>,
}
