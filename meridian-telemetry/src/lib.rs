//! Telemetry initialization and configuration.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Configuration for the telemetry system.
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub default_level: Option<String>,
    pub log_directives: Vec<String>,
    pub json: bool,
}

impl TelemetryConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into(), ..Default::default() }
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.default_level = Some(level.into());
        self
    }

    pub fn with_log_directive(mut self, directive: impl Into<String>) -> Self {
        self.log_directives.push(directive.into());
        self
    }

    pub fn with_json(mut self) -> Self {
        self.json = true;
        self
    }

    /// Load configuration from environment variables:
    /// `SERVICE_NAME`, `LOG_LEVEL`, `LOG_JSON`.
    pub fn from_env() -> Self {
        Self {
            service_name: std::env::var("SERVICE_NAME").unwrap_or_else(|_| "meridian".to_string()),
            default_level: std::env::var("LOG_LEVEL").ok(),
            log_directives: Vec::new(),
            json: std::env::var("LOG_JSON").map(|v| v == "true").unwrap_or(false),
        }
    }
}

/// Initialize telemetry with basic console logging. Idempotent: subsequent
/// calls are no-ops.
pub fn init_telemetry(service_name: &str) {
    init_with_config(TelemetryConfig::new(service_name))
}

pub fn init_with_config(config: TelemetryConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let level = config.default_level.as_deref().unwrap_or("info");
            EnvFilter::new(level)
        });

        for directive in &config.log_directives {
            if let Ok(directive) = directive.parse() {
                filter = filter.add_directive(directive);
            }
        }

        let registry = tracing_subscriber::registry().with(filter);

        if config.json {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_target(true).with_current_span(true))
                .init();
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_target(true).with_thread_ids(true))
                .init();
        }

        tracing::info!(
            service.name = config.service_name,
            log.level = config.default_level.as_deref().unwrap_or("env"),
            "telemetry initialized"
        );
    });
}
