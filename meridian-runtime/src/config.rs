use serde::Deserialize;
use std::time::Duration;

fn default_service_name() -> String {
    "meridian".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cache_size() -> usize {
    10_000
}

fn default_cache_ttl_secs() -> u64 {
    15 * 60
}

/// Process configuration, loaded from environment variables prefixed
/// `MERIDIAN_` (`envy`-style, per the ambient-stack note alongside
/// `meridian_core::config`'s KV-path typed views).
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_json: bool,
    #[serde(default = "default_cache_size")]
    pub llm_cache_size: usize,
    #[serde(default = "default_cache_size")]
    pub tool_cache_size: usize,
    #[serde(default = "default_cache_size")]
    pub retrieval_cache_size: usize,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_level: default_log_level(),
            log_json: false,
            llm_cache_size: default_cache_size(),
            tool_cache_size: default_cache_size(),
            retrieval_cache_size: default_cache_size(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl RuntimeConfig {
    /// Reads `MERIDIAN_*` env vars, falling back to defaults for anything
    /// unset. Malformed values fail fast rather than silently defaulting.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(envy::prefixed("MERIDIAN_").from_env::<Self>()?)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
