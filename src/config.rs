use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub paystack: PaystackConfig,
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub loyalty: LoyaltyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory uploaded images are written to
    #[serde(default = "default_media_root")]
    pub media_root: String,
    /// Public URL prefix under which `media_root` is served
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64,  // seconds
    pub refresh_token_expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaystackConfig {
    pub secret_key: String,
    #[serde(default = "default_paystack_base_url")]
    pub base_url: String,
    /// Where Paystack redirects the customer after checkout
    #[serde(default)]
    pub callback_url: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GoogleConfig {
    #[serde(default)]
    pub oauth_client_id: String,
    #[serde(default)]
    pub oauth_client_secret: String,
    #[serde(default)]
    pub oauth_redirect_uri: String,
    #[serde(default)]
    pub maps_api_key: String,
}

/// Point values of the loyalty program. Amount-based accrual is
/// `amount_kobo / 100 * points_per_unit`, i.e. per whole Naira.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoyaltyConfig {
    pub points_per_unit: i64,
    pub first_order_bonus: i64,
    pub birthday_bonus: i64,
    pub referral_bonus: i64,
    pub physical_visit_points: i64,
    pub lunch_visit_bonus: i64,
    pub dinner_visit_bonus: i64,
    pub happy_hour_visit_bonus: i64,
    pub min_scan_interval_minutes: i64,
    pub silver_threshold: i64,
    pub gold_threshold: i64,
    pub platinum_threshold: i64,
    pub reward_validity_days: i64,
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            points_per_unit: 1,
            first_order_bonus: 1000,
            birthday_bonus: 5000,
            referral_bonus: 1000,
            physical_visit_points: 500,
            lunch_visit_bonus: 25,
            dinner_visit_bonus: 25,
            happy_hour_visit_bonus: 30,
            min_scan_interval_minutes: 30,
            silver_threshold: 50_000,
            gold_threshold: 100_000,
            platinum_threshold: 250_000,
            reward_validity_days: 30,
        }
    }
}

fn default_media_root() -> String {
    "media".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8080/media".to_string()
}

fn default_paystack_base_url() -> String {
    "https://api.paystack.co".to_string()
}

fn default_currency() -> String {
    "NGN".to_string()
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            // File present: parse it, environment overrides are applied below
            Ok(config_str) => toml::from_str(&config_str)
                .map_err(|e| format!("Failed to parse config file: {e}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and no config.toml was found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                        media_root: get_env("MEDIA_ROOT").unwrap_or_else(default_media_root),
                        public_base_url: get_env("PUBLIC_MEDIA_URL")
                            .unwrap_or_else(default_public_base_url),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 3600i64),
                        refresh_token_expires_in: get_env_parse(
                            "JWT_REFRESH_EXPIRES_IN",
                            604_800i64,
                        ),
                    },
                    paystack: PaystackConfig {
                        secret_key: get_env("PAYSTACK_SECRET_KEY").unwrap_or_default(),
                        base_url: get_env("PAYSTACK_BASE_URL")
                            .unwrap_or_else(default_paystack_base_url),
                        callback_url: get_env("PAYSTACK_CALLBACK_URL").unwrap_or_default(),
                        currency: get_env("PAYSTACK_CURRENCY").unwrap_or_else(default_currency),
                    },
                    google: GoogleConfig {
                        oauth_client_id: get_env("GOOGLE_OAUTH_CLIENT_ID").unwrap_or_default(),
                        oauth_client_secret: get_env("GOOGLE_OAUTH_CLIENT_SECRET")
                            .unwrap_or_default(),
                        oauth_redirect_uri: get_env("GOOGLE_OAUTH_REDIRECT_URI")
                            .unwrap_or_default(),
                        maps_api_key: get_env("GOOGLE_MAPS_API_KEY").unwrap_or_default(),
                    },
                    loyalty: LoyaltyConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("Unable to read config file {config_path}: {e}").into());
            }
        };

        // Environment variables win over file values
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("MEDIA_ROOT") {
            config.server.media_root = v;
        }
        if let Ok(v) = env::var("PUBLIC_MEDIA_URL") {
            config.server.public_base_url = v;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            config.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("JWT_REFRESH_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.refresh_token_expires_in = n;
        }
        if let Ok(v) = env::var("PAYSTACK_SECRET_KEY") {
            config.paystack.secret_key = v;
        }
        if let Ok(v) = env::var("PAYSTACK_BASE_URL") {
            config.paystack.base_url = v;
        }
        if let Ok(v) = env::var("PAYSTACK_CALLBACK_URL") {
            config.paystack.callback_url = v;
        }
        if let Ok(v) = env::var("PAYSTACK_CURRENCY") {
            config.paystack.currency = v;
        }
        if let Ok(v) = env::var("GOOGLE_OAUTH_CLIENT_ID") {
            config.google.oauth_client_id = v;
        }
        if let Ok(v) = env::var("GOOGLE_OAUTH_CLIENT_SECRET") {
            config.google.oauth_client_secret = v;
        }
        if let Ok(v) = env::var("GOOGLE_OAUTH_REDIRECT_URI") {
            config.google.oauth_redirect_uri = v;
        }
        if let Ok(v) = env::var("GOOGLE_MAPS_API_KEY") {
            config.google.maps_api_key = v;
        }
        if let Ok(v) = env::var("LOYALTY_POINTS_PER_UNIT")
            && let Ok(n) = v.parse()
        {
            config.loyalty.points_per_unit = n;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_toml_uses_defaults() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "postgres://localhost/chopsticks"
            max_connections = 5

            [jwt]
            secret = "s"
            access_token_expires_in = 60
            refresh_token_expires_in = 120

            [paystack]
            secret_key = "sk_test_x"
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.server.media_root, "media");
        assert_eq!(config.paystack.base_url, "https://api.paystack.co");
        assert_eq!(config.paystack.currency, "NGN");
        assert_eq!(config.loyalty.first_order_bonus, 1000);
        assert_eq!(config.loyalty.min_scan_interval_minutes, 30);
        assert!(config.google.maps_api_key.is_empty());
    }

    #[test]
    fn test_partial_loyalty_section() {
        let raw = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            [database]
            url = "postgres://localhost/x"
            max_connections = 1
            [jwt]
            secret = "s"
            access_token_expires_in = 1
            refresh_token_expires_in = 1
            [paystack]
            secret_key = ""
            [loyalty]
            points_per_unit = 2
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.loyalty.points_per_unit, 2);
        assert_eq!(config.loyalty.birthday_bonus, 5000);
    }
}
