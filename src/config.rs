use crate::categorizer::MethodCategory;
use crate::source::SourceConfig;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const DEFAULT_CONFIG_NAME: &str = "Config";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// RocksDB directory. Empty or `None` keeps the cache in memory for this process only.
    #[serde(default = "default_cache_path")]
    pub path: Option<String>,
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
}

impl CacheSettings {
    pub fn persistent_path(&self) -> Option<&str> {
        self.path.as_deref().map(str::trim).filter(|path| !path.is_empty())
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_hours.saturating_mul(60 * 60))
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            ttl_hours: default_ttl_hours(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub unmatched_method_default: MethodCategory,
    #[serde(default = "default_handoff_delay_ms")]
    pub handoff_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            cache: CacheSettings::default(),
            top_n: default_top_n(),
            unmatched_method_default: MethodCategory::default(),
            handoff_delay_ms: default_handoff_delay_ms(),
        }
    }
}

impl AppConfig {
    pub fn handoff_delay(&self) -> Duration {
        Duration::from_millis(self.handoff_delay_ms)
    }
}

fn default_cache_path() -> Option<String> {
    Some("breach_cache.db".to_string())
}

fn default_ttl_hours() -> u64 {
    24
}

fn default_top_n() -> usize {
    10
}

fn default_handoff_delay_ms() -> u64 {
    100
}

/// Load `Config.toml` (or the file named by `BREACH_LENS_CONFIG`), overridden by
/// `BREACH_LENS__*` environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let name = env::var("BREACH_LENS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_NAME.to_string());
    let builder = Config::builder()
        .add_source(ConfigFile::with_name(&name).required(false))
        .add_source(Environment::with_prefix("BREACH_LENS").separator("__"))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
