use std::env;
use std::str::FromStr;

use anyhow::{Context, bail};

/// How a request's credential is established. Selected once at startup; the
/// two modes are never mixed within a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// Server-side session with a single configured admin identity.
    Session,
    /// Signed JWT carrying `{sub, role}`; user accounts live in the database.
    Token,
}

impl FromStr for AuthStrategy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "session" => Ok(Self::Session),
            "token" => Ok(Self::Token),
            other => bail!("unknown auth strategy {other:?} (expected \"session\" or \"token\")"),
        }
    }
}

/// How an incoming order names its product: inline `uc_amount`/`bundle_name`
/// fields, or a `product_id` resolved against the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductResolution {
    Inline,
    Catalog,
}

impl FromStr for ProductResolution {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "catalog" => Ok(Self::Catalog),
            other => {
                bail!("unknown product resolution {other:?} (expected \"inline\" or \"catalog\")")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub auth_strategy: AuthStrategy,
    pub product_resolution: ProductResolution,
    pub admin_username: String,
    pub admin_password: String,
    /// Announce new orders on the chat channel. Off by default; one deployment
    /// variant wants it, the others do not.
    pub notify_on_order: bool,
    pub telegram: Option<TelegramConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);

        let auth_strategy = env::var("AUTH_STRATEGY")
            .unwrap_or_else(|_| "token".to_string())
            .parse::<AuthStrategy>()?;
        let product_resolution = env::var("PRODUCT_RESOLUTION")
            .unwrap_or_else(|_| "catalog".to_string())
            .parse::<ProductResolution>()?;

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let admin_username = env::var("ADMIN_USERNAME").context("ADMIN_USERNAME is not set")?;
        let admin_password = env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD is not set")?;

        let notify_on_order = env::var("NOTIFY_ON_ORDER")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        let telegram = match (env::var("TELEGRAM_BOT_TOKEN"), env::var("TELEGRAM_CHAT_ID")) {
            (Ok(bot_token), Ok(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            _ => None,
        };

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            auth_strategy,
            product_resolution,
            admin_username,
            admin_password,
            notify_on_order,
            telegram,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_strategy_parses_case_insensitively() {
        assert_eq!("Session".parse::<AuthStrategy>().unwrap(), AuthStrategy::Session);
        assert_eq!("TOKEN".parse::<AuthStrategy>().unwrap(), AuthStrategy::Token);
        assert!("cookie".parse::<AuthStrategy>().is_err());
    }

    #[test]
    fn product_resolution_parses() {
        assert_eq!(
            "inline".parse::<ProductResolution>().unwrap(),
            ProductResolution::Inline
        );
        assert_eq!(
            "Catalog".parse::<ProductResolution>().unwrap(),
            ProductResolution::Catalog
        );
        assert!("lookup".parse::<ProductResolution>().is_err());
    }
}
