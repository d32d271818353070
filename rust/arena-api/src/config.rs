//! Configuration loading from environment variables and config files.

use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Debate timing and judge configuration.
    #[serde(default)]
    pub debate: DebateConfig,
}

impl AppConfig {
    /// Load configuration from defaults, an optional `config/arena-api`
    /// file and `ARENA__*` environment variables (in that order).
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.timeout_secs", 30)?
            .set_default("debate.session_secs", 300)?
            .set_default("debate.prompt_secs", 60)?
            .set_default("debate.tick_interval_ms", 1000)?
            .add_source(config::File::with_name("config/arena-api").required(false))
            .add_source(
                config::Environment::with_prefix("ARENA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Main API port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Debate timing and judge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateConfig {
    /// Total session countdown in seconds.
    #[serde(default = "default_session_secs")]
    pub session_secs: u64,
    /// Per-prompt countdown in seconds (reset each user turn).
    #[serde(default = "default_prompt_secs")]
    pub prompt_secs: u64,
    /// Timer tick interval in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Optional fixed judge seed. Unset means OS entropy.
    #[serde(default)]
    pub judge_seed: Option<u64>,
}

fn default_session_secs() -> u64 {
    300
}

fn default_prompt_secs() -> u64 {
    60
}

fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            session_secs: default_session_secs(),
            prompt_secs: default_prompt_secs(),
            tick_interval_ms: default_tick_interval_ms(),
            judge_seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.debate.session_secs, 300);
        assert_eq!(config.debate.prompt_secs, 60);
        assert_eq!(config.debate.tick_interval_ms, 1000);
        assert!(config.debate.judge_seed.is_none());
    }

    #[test]
    fn test_deserialize_partial_overrides() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "debate": { "session_secs": 30, "judge_seed": 42 }
        }))
        .unwrap();
        assert_eq!(config.debate.session_secs, 30);
        assert_eq!(config.debate.judge_seed, Some(42));
        // Untouched sections keep their defaults.
        assert_eq!(config.debate.prompt_secs, 60);
        assert_eq!(config.server.host, "0.0.0.0");
    }
}
