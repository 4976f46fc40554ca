//! Application configuration
//!
//! Loaded from a TOML file (`$RENTAL_CONFIG` or
//! `~/.config/rental-service/config.toml`). Every section and field has a
//! default, so a partial file is valid.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::rental::{BookingPolicy, CheckoutPolicy};
use crate::infrastructure::crypto::JwtConfig;
use crate::infrastructure::database::DatabaseConfig;
use crate::infrastructure::payments::StripeConfig;

pub const CONFIG_ENV: &str = "RENTAL_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub booking: BookingSection,
    pub payments: PaymentsSection,
    pub mail: MailSection,
    pub seed: SeedSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout: 30,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let defaults = DatabaseConfig::default();
        Self {
            url: defaults.url,
            max_connections: defaults.max_connections,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive, overridden by `RUST_LOG`
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_expiration_hours: i64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        let defaults = JwtConfig::default();
        Self {
            jwt_secret: defaults.secret,
            jwt_issuer: defaults.issuer,
            jwt_expiration_hours: defaults.expiration_hours,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingSection {
    pub late_cancel_hours: i64,
    /// Decimal string, e.g. "0.20"
    pub penalty_rate: String,
}

impl Default for BookingSection {
    fn default() -> Self {
        Self {
            late_cancel_hours: 24,
            penalty_rate: "0.20".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentsSection {
    pub currency: String,
    pub subunit_factor: i64,
    pub gateway_api_base: String,
    pub secret_key: String,
    pub publishable_key: String,
    pub webhook_secret: String,
    pub webhook_tolerance_secs: i64,
    pub success_url: String,
    pub cancel_url: String,
}

impl Default for PaymentsSection {
    fn default() -> Self {
        let checkout = CheckoutPolicy::default();
        Self {
            currency: checkout.currency,
            subunit_factor: checkout.subunit_factor,
            gateway_api_base: crate::infrastructure::payments::stripe::DEFAULT_API_BASE.to_string(),
            secret_key: String::new(),
            publishable_key: String::new(),
            webhook_secret: String::new(),
            webhook_tolerance_secs: crate::infrastructure::payments::webhook::DEFAULT_TOLERANCE_SECS,
            success_url: checkout.success_url,
            cancel_url: checkout.cancel_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailSection {
    pub from: String,
}

impl Default for MailSection {
    fn default() -> Self {
        Self {
            from: "noreply@scootygo.local".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedSection {
    pub demo_vehicles: bool,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let cfg: AppConfig = toml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let rate = self.penalty_rate()?;
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(ConfigError::Invalid(format!(
                "booking.penalty_rate must be within 0..=1, got {}",
                rate
            )));
        }
        if self.booking.late_cancel_hours < 0 {
            return Err(ConfigError::Invalid(
                "booking.late_cancel_hours must not be negative".to_string(),
            ));
        }
        if self.payments.subunit_factor <= 0 {
            return Err(ConfigError::Invalid(
                "payments.subunit_factor must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn penalty_rate(&self) -> Result<Decimal, ConfigError> {
        self.booking
            .penalty_rate
            .trim()
            .parse::<Decimal>()
            .map_err(|e| ConfigError::Invalid(format!("booking.penalty_rate: {}", e)))
    }

    pub fn booking_policy(&self) -> Result<BookingPolicy, ConfigError> {
        Ok(BookingPolicy::new(
            self.booking.late_cancel_hours,
            self.penalty_rate()?,
        ))
    }

    pub fn checkout_policy(&self) -> CheckoutPolicy {
        CheckoutPolicy {
            currency: self.payments.currency.to_lowercase(),
            subunit_factor: self.payments.subunit_factor,
            success_url: self.payments.success_url.clone(),
            cancel_url: self.payments.cancel_url.clone(),
        }
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
        }
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.security.jwt_secret.clone(),
            expiration_hours: self.security.jwt_expiration_hours,
            issuer: self.security.jwt_issuer.clone(),
        }
    }

    pub fn stripe_config(&self) -> StripeConfig {
        StripeConfig {
            api_base: self.payments.gateway_api_base.clone(),
            secret_key: self.payments.secret_key.clone(),
            publishable_key: self.payments.publishable_key.clone(),
        }
    }
}

/// `~/.config/rental-service/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rental-service")
        .join("config.toml")
}

/// `$RENTAL_CONFIG` if set, else [`default_config_path`]
pub fn resolve_config_path() -> PathBuf {
    std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_config_path())
}
