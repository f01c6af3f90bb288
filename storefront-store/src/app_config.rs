use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cms: CmsConfig,
    pub automations: AutomationsConfig,
    pub payment: PaymentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 { 5001 }

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_seconds")]
    pub acquire_timeout_seconds: u64,
}

fn default_max_connections() -> u32 { 5 }

fn default_acquire_timeout_seconds() -> u64 { 3 }

/// Read access to the CMS delivery API
#[derive(Debug, Deserialize, Clone)]
pub struct CmsConfig {
    pub api_key: String,
    pub access_token: String,
    pub environment: String,
    pub base_url: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_content_type() -> String { "home".to_string() }

fn default_timeout_seconds() -> u64 { 10 }

#[derive(Debug, Deserialize, Clone)]
pub struct AutomationsConfig {
    pub stock: AutomationEndpoint,
    pub rating: AutomationEndpoint,
}

/// A CMS automation webhook and the shared secret sent in `ah-http-key`
#[derive(Debug, Deserialize, Clone)]
pub struct AutomationEndpoint {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Stripe,
    Mock,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    #[serde(default = "default_provider")]
    pub provider: PaymentProvider,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_provider() -> PaymentProvider { PaymentProvider::Stripe }

fn default_api_base() -> String { "https://api.stripe.com".to_string() }

fn default_currency() -> String { "inr".to_string() }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `STOREFRONT__PAYMENT__SECRET_KEY=sk_live_...`
            .add_source(config::Environment::with_prefix("STOREFRONT").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [server]
        [database]
        url = "postgres://localhost/storefront"
        [cms]
        api_key = "blt_key"
        access_token = "cs_token"
        environment = "main"
        base_url = "https://cdn.example.io/v3"
        [automations.stock]
        url = "https://automations.example.io/run/stock"
        key = "stock-secret"
        [automations.rating]
        url = "https://automations.example.io/run/rating"
        key = "rating-secret"
        [payment]
    "#;

    fn parse(toml: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_fill_optional_fields() {
        let config = parse(MINIMAL);

        assert_eq!(config.server.port, 5001);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.acquire_timeout_seconds, 3);
        assert_eq!(config.cms.content_type, "home");
        assert_eq!(config.payment.provider, PaymentProvider::Stripe);
        assert_eq!(config.payment.currency, "inr");
        assert_eq!(config.automations.rating.key, "rating-secret");
    }

    #[test]
    fn test_mock_provider() {
        let config = parse(&MINIMAL.replace("[payment]", "[payment]\nprovider = \"mock\""));
        assert_eq!(config.payment.provider, PaymentProvider::Mock);
    }
}
