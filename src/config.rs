use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::Validate;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";

/// Pricing knobs and special product ids.
///
/// Everything the calculators used to reach for global configuration lives
/// here as an explicit value object, passed into the pricing code at call
/// sites. The defaults mirror the production store settings.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PricingConfig {
    /// Product ids sold as gift certificates (store credit).
    #[serde(default)]
    pub gift_certificate_ids: Vec<i64>,

    /// The carbon-offset / charity donation product.
    #[serde(default)]
    pub charity_product_id: Option<i64>,

    /// Lottery tickets may receive coupon discounts even when on sale.
    #[serde(default)]
    pub lottery_ticket_id: Option<i64>,

    /// Products that always ship for free.
    #[serde(default)]
    pub free_shipping_product_ids: Vec<i64>,

    /// Subtotal (excluding certificates) at which shipping becomes free.
    #[serde(default = "default_free_shipping_threshold")]
    pub free_shipping_threshold: Decimal,

    /// Fallback low-stock warning threshold, used when a product carries
    /// no threshold of its own.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,
}

fn default_free_shipping_threshold() -> Decimal {
    Decimal::from(100)
}

fn default_low_stock_threshold() -> i64 {
    5
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            gift_certificate_ids: Vec::new(),
            charity_product_id: None,
            lottery_ticket_id: None,
            free_shipping_product_ids: Vec::new(),
            free_shipping_threshold: default_free_shipping_threshold(),
            low_stock_threshold: default_low_stock_threshold(),
        }
    }
}

impl PricingConfig {
    pub fn is_gift_certificate(&self, product_id: i64) -> bool {
        self.gift_certificate_ids.contains(&product_id)
    }

    pub fn is_charity(&self, product_id: i64) -> bool {
        self.charity_product_id == Some(product_id)
    }

    pub fn is_lottery_ticket(&self, product_id: i64) -> bool {
        self.lottery_ticket_id == Some(product_id)
    }

    pub fn ships_free(&self, product_id: i64) -> bool {
        self.free_shipping_product_ids.contains(&product_id)
    }
}

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Capacity of the domain event channel
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Pricing configuration
    #[serde(default)]
    #[validate]
    pub pricing: PricingConfig,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_event_channel_capacity() -> usize {
    1024
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),
    #[error("configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Loads application configuration.
///
/// Layers configuration sources in this order:
/// 1. Default config (config/default.toml)
/// 2. Environment-specific config (config/{env}.toml)
/// 3. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("database_url", "sqlite://smokehouse.db?mode=rwc")?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}
