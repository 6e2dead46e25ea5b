//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub identity_graph: IdentityGraphConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Provider credentials and dispatch timeouts (spec.md §4.1, §6
/// "An empty providers auto-builds the default set using ambient
/// credential availability").
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub github_token: Option<String>,
    #[serde(default = "default_erc8004_rpc_url")]
    pub erc8004_rpc_url: String,
    #[serde(default = "default_clawhub_base_url")]
    pub clawhub_base_url: String,
    #[serde(default)]
    pub twitter_bearer_token: Option<String>,
    #[serde(default)]
    pub moltbook_api_key: Option<String>,
    /// Per-provider wall-clock timeout in milliseconds (spec.md §4.5,
    /// default 10s).
    #[serde(default = "default_provider_timeout_ms")]
    pub provider_timeout_ms: u64,
}

impl ProvidersConfig {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            github_token: std::env::var("GITHUB_TOKEN").ok(),
            erc8004_rpc_url: default_erc8004_rpc_url(),
            clawhub_base_url: default_clawhub_base_url(),
            twitter_bearer_token: std::env::var("TWITTER_BEARER_TOKEN").ok(),
            moltbook_api_key: std::env::var("MOLTBOOK_API_KEY").ok(),
            provider_timeout_ms: default_provider_timeout_ms(),
        }
    }
}

/// Result-cache TTL and sweep cadence (spec.md §4.6).
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl_secs")]
    pub default_ttl_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: default_cache_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// Identity-graph hydration source (spec.md §3 "hydrated at startup").
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityGraphConfig {
    /// Path to a JSON file of pre-verified links to hydrate the graph
    /// with at startup. Absent means start with an empty graph.
    #[serde(default)]
    pub hydrate_from_path: Option<String>,
}

impl Default for IdentityGraphConfig {
    fn default() -> Self {
        Self {
            hydrate_from_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_erc8004_rpc_url() -> String {
    std::env::var("ERC8004_RPC_URL").unwrap_or_else(|_| "https://registry.erc8004.example".into())
}

fn default_clawhub_base_url() -> String {
    std::env::var("CLAWHUB_BASE_URL").unwrap_or_else(|_| "https://api.clawhub.example".into())
}

fn default_provider_timeout_ms() -> u64 {
    10_000
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file, environment variables (prefix
    /// `TRUST_`), and defaults, in that ascending order of precedence.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("TRUST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.providers.provider_timeout_ms == 0 {
            anyhow::bail!("providers.provider_timeout_ms must be positive");
        }
        if self.cache.default_ttl_secs == 0 {
            anyhow::bail!("cache.default_ttl_secs must be positive");
        }
        if self.cache.sweep_interval_secs == 0 {
            anyhow::bail!("cache.sweep_interval_secs must be positive");
        }
        Ok(())
    }

    /// Masked configuration for display (hide secrets).
    pub fn masked_display(&self) -> String {
        format!(
            r#"Configuration:
  Providers:
    github_token: {}
    erc8004_rpc_url: {}
    clawhub_base_url: {}
    twitter_bearer_token: {}
    moltbook_api_key: {}
    provider_timeout_ms: {}
  Cache:
    default_ttl_secs: {}
    sweep_interval_secs: {}
  Identity graph:
    hydrate_from_path: {:?}
  Logging:
    level: {}
    json: {}
"#,
            mask(&self.providers.github_token),
            self.providers.erc8004_rpc_url,
            self.providers.clawhub_base_url,
            mask(&self.providers.twitter_bearer_token),
            mask(&self.providers.moltbook_api_key),
            self.providers.provider_timeout_ms,
            self.cache.default_ttl_secs,
            self.cache.sweep_interval_secs,
            self.identity_graph.hydrate_from_path,
            self.logging.level,
            self.logging.json,
        )
    }
}

fn mask(secret: &Option<String>) -> &'static str {
    if secret.is_some() {
        "***"
    } else {
        "(not set)"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            providers: ProvidersConfig::default(),
            cache: CacheConfig::default(),
            identity_graph: IdentityGraphConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
