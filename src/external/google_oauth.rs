use crate::config::GoogleConfig;
use crate::error::{AppError, AppResult};
use reqwest::{Client, Url};
use serde::Deserialize;

const AUTHORIZE_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Profile returned by the userinfo endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUserInfo {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub verified_email: bool,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Clone)]
pub struct GoogleOAuthService {
    client: Client,
    config: GoogleConfig,
}

impl GoogleOAuthService {
    pub fn new(config: GoogleConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.oauth_client_id.is_empty()
    }

    /// Consent-screen URL the client redirects the browser to.
    pub fn authorization_url(&self) -> AppResult<String> {
        if !self.is_configured() {
            return Err(AppError::ConfigError("Google OAuth is not configured".into()));
        }
        let url = Url::parse_with_params(
            AUTHORIZE_ENDPOINT,
            &[
                ("client_id", self.config.oauth_client_id.as_str()),
                ("redirect_uri", self.config.oauth_redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", "openid email profile"),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| AppError::InternalError(format!("Invalid OAuth URL: {e}")))?;
        Ok(url.to_string())
    }

    /// Trade an authorization code from the consent redirect for an access token.
    pub async fn exchange_code(&self, code: &str) -> AppResult<String> {
        let params = [
            ("client_id", self.config.oauth_client_id.as_str()),
            ("client_secret", self.config.oauth_client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.oauth_redirect_uri.as_str()),
        ];
        let response = self.client.post(TOKEN_ENDPOINT).form(&params).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            log::warn!("Google code exchange failed: HTTP {status} {text}");
            return Err(AppError::AuthError("Invalid Google authorization code".into()));
        }
        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Resolve an access token to the Google profile it belongs to.
    pub async fn fetch_user_info(&self, access_token: &str) -> AppResult<GoogleUserInfo> {
        let response = self
            .client
            .get(USERINFO_ENDPOINT)
            .bearer_auth(access_token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AppError::AuthError("Invalid or expired Google token".into()));
        }
        if !response.status().is_success() {
            return Err(AppError::ExternalApiError(format!(
                "Google userinfo returned HTTP {}",
                response.status().as_u16()
            )));
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_is_encoded() {
        let svc = GoogleOAuthService::new(GoogleConfig {
            oauth_client_id: "client-123.apps.googleusercontent.com".into(),
            oauth_client_secret: String::new(),
            oauth_redirect_uri: "https://chopsticks.ng/auth/google/callback".into(),
            maps_api_key: String::new(),
        });
        let url = svc.authorization_url().unwrap();
        assert!(url.starts_with(AUTHORIZE_ENDPOINT));
        assert!(url.contains("client_id=client-123.apps.googleusercontent.com"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fchopsticks.ng%2Fauth%2Fgoogle%2Fcallback"));
        assert!(url.contains("scope=openid+email+profile"));
    }

    #[test]
    fn test_unconfigured_client_rejected() {
        let svc = GoogleOAuthService::new(GoogleConfig::default());
        assert!(matches!(
            svc.authorization_url(),
            Err(AppError::ConfigError(_))
        ));
    }
}
