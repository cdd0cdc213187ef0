use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for Heartrest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub completion: CompletionConfig,
    pub search: SearchConfig,
    pub reply: ReplyConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: i32,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub engine_id: Option<String>,
    #[serde(default = "SearchConfig::default_endpoint")]
    pub endpoint: String,
    pub max_results: usize,
    pub timeout_seconds: u64,
}

/// How replies are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyMode {
    /// Completion provider plus sectionizer
    Llm,
    /// Offline keyword responder, no provider calls
    Heuristic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyConfig {
    pub mode: ReplyMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub max_entries: usize,
}

impl Config {
    /// Load configuration from file with environment variable overrides
    /// ALWAYS returns a valid config - never fails
    pub fn load() -> Self {
        let env_paths = ["../.env", ".env"];

        let mut env_loaded = false;
        for path in &env_paths {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                env_loaded = true;
                break;
            }
        }

        if !env_loaded {
            tracing::warn!("No .env file found - continuing with env vars only");
        }

        let config_path =
            env::var("HEARTREST_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => Self::from_yaml(&contents).unwrap_or_else(|e| {
                    tracing::error!(
                        "Failed to parse config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }),
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::warn!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();

        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str::<Config>(contents)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(bind) = env::var("HEARTREST_HTTP_BIND") {
            self.server.bind = bind;
        }

        // Completion provider overrides
        if let Ok(api_key) = env::var("OPENAI_API_KEY") {
            self.completion.api_key = api_key;
        }
        if let Ok(model) = env::var("OPENAI_MODEL") {
            self.completion.model = model;
        }
        if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
            self.completion.base_url = base_url;
        }
        if let Ok(timeout) = env::var("HEARTREST_COMPLETION_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                self.completion.timeout_seconds = secs;
            }
        }

        // Search provider overrides
        if let Ok(api_key) = env::var("GOOGLE_SEARCH_API_KEY") {
            self.search.api_key = Some(api_key);
        }
        if let Ok(engine_id) = env::var("GOOGLE_CUSTOM_SEARCH_ENGINE_ID") {
            self.search.engine_id = Some(engine_id);
        }
        if let Ok(endpoint) = env::var("GOOGLE_SEARCH_ENDPOINT") {
            self.search.endpoint = endpoint;
        }
        if let Ok(timeout) = env::var("HEARTREST_SEARCH_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                self.search.timeout_seconds = secs;
            }
        }

        if let Ok(mode) = env::var("HEARTREST_REPLY_MODE") {
            match mode.to_lowercase().as_str() {
                "llm" => self.reply.mode = ReplyMode::Llm,
                "heuristic" => self.reply.mode = ReplyMode::Heuristic,
                other => tracing::warn!("Unknown reply mode: {}. Keeping {:?}", other, self.reply.mode),
            }
        }

        if let Ok(limit) = env::var("HEARTREST_HISTORY_LIMIT") {
            if let Ok(max) = limit.parse() {
                self.history.max_entries = max;
            }
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.reply.mode == ReplyMode::Llm && self.completion.api_key.is_empty() {
            return Err("OPENAI_API_KEY environment variable must be set".into());
        }
        if self.completion.timeout_seconds == 0 || self.search.timeout_seconds == 0 {
            return Err("Provider timeouts cannot be 0".into());
        }
        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err("Completion temperature must be between 0.0 and 2.0".into());
        }
        if self.search.max_results == 0 || self.search.max_results > 5 {
            return Err("search.max_results must be between 1 and 5".into());
        }
        if self.history.max_entries == 0 {
            return Err("history.max_entries cannot be 0".into());
        }
        Ok(())
    }
}

impl CompletionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl SearchConfig {
    /// Key and engine id, or `None` when search is disabled
    pub fn credentials(&self) -> Option<(String, String)> {
        match (self.api_key.as_deref(), self.engine_id.as_deref()) {
            (Some(key), Some(cx)) if !key.is_empty() && !cx.is_empty() => {
                Some((key.to_string(), cx.to_string()))
            }
            _ => None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn default_endpoint() -> String {
        "https://www.googleapis.com/customsearch/v1".to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind: "127.0.0.1:3000".to_string(),
            },
            completion: CompletionConfig {
                api_key: String::new(),
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o".to_string(),
                max_tokens: 1500,
                temperature: 0.8,
                timeout_seconds: 60,
            },
            search: SearchConfig {
                api_key: None,
                engine_id: None,
                endpoint: SearchConfig::default_endpoint(),
                max_results: 5,
                timeout_seconds: 10,
            },
            reply: ReplyConfig {
                mode: ReplyMode::Llm,
            },
            history: HistoryConfig { max_entries: 50 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_generation_parameters() {
        let cfg = Config::default();
        assert_eq!(cfg.completion.model, "gpt-4o");
        assert_eq!(cfg.completion.max_tokens, 1500);
        assert!((cfg.completion.temperature - 0.8).abs() < 1e-6);
        assert_eq!(cfg.search.max_results, 5);
        assert_eq!(cfg.reply.mode, ReplyMode::Llm);
    }

    #[test]
    fn test_search_credentials_require_both_values() {
        let mut cfg = Config::default();
        assert!(cfg.search.credentials().is_none());

        cfg.search.api_key = Some("key".to_string());
        assert!(cfg.search.credentials().is_none());

        cfg.search.engine_id = Some(String::new());
        assert!(cfg.search.credentials().is_none());

        cfg.search.engine_id = Some("cx".to_string());
        assert_eq!(
            cfg.search.credentials(),
            Some(("key".to_string(), "cx".to_string()))
        );
    }

    #[test]
    fn test_yaml_config_parses_heuristic_mode() {
        let yaml = r#"
server:
  bind: "0.0.0.0:8080"
completion:
  api_key: ""
  base_url: "https://api.openai.com/v1"
  model: "gpt-4o-mini"
  max_tokens: 800
  temperature: 0.5
  timeout_seconds: 30
search:
  max_results: 3
  timeout_seconds: 5
reply:
  mode: heuristic
history:
  max_entries: 10
"#;
        let cfg = Config::from_yaml(yaml).expect("yaml should parse");
        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
        assert_eq!(cfg.reply.mode, ReplyMode::Heuristic);
        assert!(cfg.search.api_key.is_none());
        assert_eq!(cfg.search.endpoint, "https://www.googleapis.com/customsearch/v1");
        assert_eq!(cfg.history.max_entries, 10);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_key_in_llm_mode() {
        let cfg = Config::default();
        assert!(cfg.validate().is_err());
    }
}
