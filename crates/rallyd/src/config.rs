//! Deployment configuration, read from the environment.

use std::time::Duration;

use rallyd_registry::{AiIdentity, RegistryConfig};

const DEFAULT_BIND: &str = "0.0.0.0:3000";
const DEFAULT_STATS_URL: &str = "http://stats:3000";
const DEFAULT_AI_URL: &str = "http://ai_deeppong:3000";
const DEFAULT_AI_NAME: &str = "DeepPong";

/// Server configuration. [`from_env`](Self::from_env) reads the
/// standard deployment variables; everything has a compose-friendly
/// default.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// WebSocket listen address (`RALLYD_BIND`).
    pub bind_addr: String,
    /// Stats collaborator base URL (`STATS_URL`).
    pub stats_url: String,
    /// Per-request timeout for stats submissions.
    pub stats_timeout: Duration,
    /// AI collaborator base URL (`AI_DEEPPONG_URL`).
    pub ai_url: String,
    /// Per-request timeout for AI notifications.
    pub ai_timeout: Duration,
    /// Registry timing windows and the automated-opponent roster.
    pub registry: RegistryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            stats_url: DEFAULT_STATS_URL.to_string(),
            stats_timeout: Duration::from_secs(5),
            ai_url: DEFAULT_AI_URL.to_string(),
            ai_timeout: Duration::from_secs(2),
            registry: RegistryConfig {
                ai_roster: vec![AiIdentity::new(DEFAULT_AI_NAME)],
                ..Default::default()
            },
        }
    }
}

impl ServerConfig {
    /// Reads configuration from the environment, falling back to the
    /// defaults above for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(bind) = std::env::var("RALLYD_BIND") {
            config.bind_addr = bind;
        }
        if let Ok(url) = std::env::var("STATS_URL") {
            config.stats_url = url;
        }
        if let Ok(url) = std::env::var("AI_DEEPPONG_URL") {
            config.ai_url = url;
        }
        config
    }
}
