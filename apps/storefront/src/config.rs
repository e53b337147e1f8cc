//! # Storefront Configuration
//!
//! Configuration is loaded from `VITRINE_*` environment variables with
//! fallback to defaults suitable for development.
//!
//! | Variable                        | Default                     |
//! |---------------------------------|-----------------------------|
//! | `VITRINE_DB_PATH`               | `./vitrine.db`              |
//! | `VITRINE_GUEST_CART_PATH`       | `./guest_cart.json`         |
//! | `VITRINE_JWT_SECRET`            | development secret          |
//! | `VITRINE_TOKEN_LIFETIME_SECS`   | `604800` (7 days)           |
//! | `VITRINE_STORE_NAME`            | `Vitrine`                   |
//! | `VITRINE_CURRENCY_SYMBOL`       | `R$`                        |
//! | `VITRINE_ADMIN_EMAIL`           | unset                       |
//! | `VITRINE_ADMIN_PASSWORD`        | unset (required with email) |

use std::env;
use std::path::PathBuf;

use serde::Serialize;

const DEV_JWT_SECRET: &str = "vitrine-dev-secret-change-in-production";

/// Storefront configuration. Read-only after startup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorefrontConfig {
    /// SQLite database file.
    pub db_path: PathBuf,

    /// JSON file holding the guest cart between runs.
    pub guest_cart_path: PathBuf,

    #[serde(skip)]
    pub jwt_secret: String,

    /// Session token lifetime in seconds.
    pub token_lifetime_secs: i64,

    pub store_name: String,

    pub currency_symbol: String,

    pub currency_decimals: u8,

    /// Back-office account created at startup when missing.
    pub admin_email: Option<String>,

    #[serde(skip)]
    pub admin_password: Option<String>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        StorefrontConfig {
            db_path: PathBuf::from("./vitrine.db"),
            guest_cart_path: PathBuf::from("./guest_cart.json"),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_lifetime_secs: 7 * 24 * 60 * 60,
            store_name: "Vitrine".to_string(),
            currency_symbol: "R$".to_string(),
            currency_decimals: 2,
            admin_email: None,
            admin_password: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn load_from<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = StorefrontConfig::default();

        let token_lifetime_secs = match var("VITRINE_TOKEN_LIFETIME_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidValue("VITRINE_TOKEN_LIFETIME_SECS".to_string()))?,
            None => defaults.token_lifetime_secs,
        };

        let jwt_secret = var("VITRINE_JWT_SECRET").unwrap_or(defaults.jwt_secret);
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::InvalidValue("VITRINE_JWT_SECRET".to_string()));
        }

        let config = StorefrontConfig {
            db_path: var("VITRINE_DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            guest_cart_path: var("VITRINE_GUEST_CART_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.guest_cart_path),
            jwt_secret,
            token_lifetime_secs,
            store_name: var("VITRINE_STORE_NAME").unwrap_or(defaults.store_name),
            currency_symbol: var("VITRINE_CURRENCY_SYMBOL").unwrap_or(defaults.currency_symbol),
            currency_decimals: defaults.currency_decimals,
            admin_email: var("VITRINE_ADMIN_EMAIL").filter(|e| !e.trim().is_empty()),
            admin_password: var("VITRINE_ADMIN_PASSWORD"),
        };

        if config.admin_email.is_some() && config.admin_password.is_none() {
            return Err(ConfigError::MissingRequired("VITRINE_ADMIN_PASSWORD".to_string()));
        }

        Ok(config)
    }

    /// Whether the built-in development JWT secret is still in use.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// Formats a cent amount as a currency string.
    ///
    /// ## Example
    /// ```rust
    /// use vitrine_storefront::config::StorefrontConfig;
    ///
    /// let config = StorefrontConfig::default();
    /// assert_eq!(config.format_currency(1234), "R$12.34");
    /// ```
    pub fn format_currency(&self, cents: i64) -> String {
        let divisor = 10_i64.pow(self.currency_decimals as u32);
        let whole = cents / divisor;
        let frac = (cents % divisor).abs();

        format!(
            "{}{}{}",
            if cents < 0 { "-" } else { "" },
            self.currency_symbol,
            if self.currency_decimals > 0 {
                format!(
                    "{}.{:0width$}",
                    whole.abs(),
                    frac,
                    width = self.currency_decimals as usize
                )
            } else {
                whole.abs().to_string()
            }
        )
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StorefrontConfig::load_from(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.token_lifetime_secs, 604_800);
        assert_eq!(config.currency_symbol, "R$");
        assert!(config.uses_dev_secret());
        assert!(config.admin_email.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("VITRINE_DB_PATH", "/tmp/shop.db"),
            ("VITRINE_JWT_SECRET", "s3cret"),
            ("VITRINE_TOKEN_LIFETIME_SECS", "3600"),
            ("VITRINE_CURRENCY_SYMBOL", "$"),
        ])
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.token_lifetime_secs, 3600);
        assert!(!config.uses_dev_secret());
        assert_eq!(config.format_currency(500), "$5.00");
    }

    #[test]
    fn test_invalid_lifetime() {
        assert!(matches!(
            load(&[("VITRINE_TOKEN_LIFETIME_SECS", "soon")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            load(&[("VITRINE_TOKEN_LIFETIME_SECS", "0")]),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_admin_email_needs_password() {
        assert!(matches!(
            load(&[("VITRINE_ADMIN_EMAIL", "admin@vitrine.test")]),
            Err(ConfigError::MissingRequired(_))
        ));
        let config = load(&[
            ("VITRINE_ADMIN_EMAIL", "admin@vitrine.test"),
            ("VITRINE_ADMIN_PASSWORD", "admin123"),
        ])
        .unwrap();
        assert_eq!(config.admin_email.as_deref(), Some("admin@vitrine.test"));
    }

    #[test]
    fn test_format_currency() {
        let config = StorefrontConfig::default();
        assert_eq!(config.format_currency(1234), "R$12.34");
        assert_eq!(config.format_currency(1), "R$0.01");
        assert_eq!(config.format_currency(0), "R$0.00");
        assert_eq!(config.format_currency(-1234), "-R$12.34");
    }
}
