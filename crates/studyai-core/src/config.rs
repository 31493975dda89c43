//! StudyAI Configuration Management
//!
//! Handles configuration from environment variables and config files
//! with sensible defaults for development. API keys are optional here:
//! a missing key only fails the LLM call that needs it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default Gemini endpoint speaking the OpenAI chat-completions protocol
pub const GEMINI_OPENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Default OpenAI endpoint
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Web search configuration
    pub search: SearchConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_env(|key| std::env::var(key).ok())?;
        Ok(self)
    }

    /// Override fields from a key lookup, leaving unset keys untouched
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(host) = lookup("API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("API_PORT") {
            self.server.port = parse_value("API_PORT", port)?;
        }
        if let Some(bytes) = lookup("MAX_UPLOAD_BYTES") {
            self.server.max_upload_bytes = parse_value("MAX_UPLOAD_BYTES", bytes)?;
        }
        if let Some(dir) = lookup("SCRATCH_DIR") {
            self.server.scratch_dir = Some(PathBuf::from(dir));
        }

        // CORS origins (comma-separated)
        if let Some(origins) = lookup("CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // LLM
        if let Some(provider) = lookup("LLM_PROVIDER") {
            let previous_default = self.llm.provider.default_model();
            self.llm.provider = provider.parse()?;
            // Keep a model chosen in the config file
            if self.llm.model == previous_default {
                self.llm.model = self.llm.provider.default_model().to_string();
            }
        }
        if let Some(key) = lookup("GOOGLE_API_KEY") {
            self.llm.google_api_key = Some(key);
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.llm.openai_api_key = Some(key);
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.llm.openai_base_url = Some(url);
        }
        if let Some(url) = lookup("OLLAMA_URL") {
            self.llm.ollama_url = url;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(temperature) = lookup("LLM_TEMPERATURE") {
            self.llm.temperature = parse_value("LLM_TEMPERATURE", temperature)?;
        }
        if let Some(secs) = lookup("LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_value("LLM_TIMEOUT_SECS", secs)?;
        }

        // Search
        if let Some(lang) = lookup("WIKIPEDIA_LANG") {
            self.search.wikipedia_lang = lang;
        }
        if let Some(top_k) = lookup("SEARCH_TOP_K") {
            self.search.top_k = parse_value("SEARCH_TOP_K", top_k)?;
        }
        if let Some(max_chars) = lookup("SEARCH_MAX_CHARS") {
            self.search.max_chars = parse_value("SEARCH_MAX_CHARS", max_chars)?;
        }
        if let Some(secs) = lookup("SEARCH_TIMEOUT_SECS") {
            self.search.timeout_secs = parse_value("SEARCH_TIMEOUT_SECS", secs)?;
        }

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.json_format = format.eq_ignore_ascii_case("json");
        }

        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum request body size in bytes
    pub max_upload_bytes: usize,

    /// Allowed origins for CORS (empty allows any origin)
    pub cors_origins: Vec<String>,

    /// Directory for per-request scratch files (system temp dir when unset)
    pub scratch_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Resolved scratch directory
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// `host:port` bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 10 * 1024 * 1024, // 10MB
            cors_origins: vec![],
            scratch_dir: None,
        }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// LLM provider to use
    pub provider: LlmProvider,

    /// Google AI Studio key (Gemini)
    pub google_api_key: Option<String>,

    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// OpenAI API base URL (for Azure or compatible APIs)
    pub openai_base_url: Option<String>,

    /// Ollama server URL
    pub ollama_url: String,

    /// Model name to use
    pub model: String,

    /// Maximum tokens for completion
    pub max_tokens: u32,

    /// Temperature for generation
    pub temperature: f32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// API key for the selected provider, if any
    pub fn api_key(&self) -> Option<&str> {
        match self.provider {
            LlmProvider::Gemini => self.google_api_key.as_deref(),
            LlmProvider::OpenAI => self.openai_api_key.as_deref(),
            LlmProvider::Ollama => None,
        }
    }

    /// Chat-completions base URL for the OpenAI-compatible providers
    pub fn base_url(&self) -> String {
        match self.provider {
            LlmProvider::Gemini => GEMINI_OPENAI_BASE_URL.to_string(),
            LlmProvider::OpenAI => self
                .openai_base_url
                .clone()
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            LlmProvider::Ollama => self.ollama_url.clone(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            google_api_key: None,
            openai_api_key: None,
            openai_base_url: None,
            ollama_url: "http://localhost:11434".to_string(),
            model: LlmProvider::Gemini.default_model().to_string(),
            max_tokens: 2048,
            temperature: 0.3,
            timeout_secs: 60,
        }
    }
}

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Gemini,
    OpenAI,
    Ollama,
}

impl LlmProvider {
    /// Model used when `LLM_MODEL` is not set
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.5-flash",
            Self::OpenAI => "gpt-4o-mini",
            Self::Ollama => "llama3",
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(ConfigError::InvalidValue {
                key: "LLM_PROVIDER".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Wikipedia search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Wikipedia language edition (e.g. "en")
    pub wikipedia_lang: String,

    /// Number of pages to include
    pub top_k: usize,

    /// Maximum characters of search text passed on
    pub max_chars: usize,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User-Agent sent to the Wikipedia API
    pub user_agent: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            wikipedia_lang: "en".to_string(),
            top_k: 1,
            max_chars: 4000,
            timeout_secs: 30,
            user_agent: concat!("studyai/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.llm.provider, LlmProvider::Gemini);
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.search.top_k, 1);
        assert_eq!(config.search.max_chars, 4000);
        assert!(config.llm.api_key().is_none());
    }

    #[test]
    fn test_llm_provider_parse() {
        assert_eq!("gemini".parse::<LlmProvider>().unwrap(), LlmProvider::Gemini);
        assert_eq!("OpenAI".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAI);
        assert_eq!("ollama".parse::<LlmProvider>().unwrap(), LlmProvider::Ollama);
        assert!("invalid".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env(lookup(&[
                ("API_PORT", "9000"),
                ("LLM_PROVIDER", "openai"),
                ("OPENAI_API_KEY", "sk-test"),
                ("CORS_ORIGINS", "http://localhost:3000, ,http://localhost:5173"),
                ("SCRATCH_DIR", "/tmp/studyai"),
                ("LOG_FORMAT", "JSON"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.llm.provider, LlmProvider::OpenAI);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.api_key(), Some("sk-test"));
        assert_eq!(config.llm.base_url(), OPENAI_BASE_URL);
        assert_eq!(config.server.cors_origins.len(), 2);
        assert_eq!(config.server.scratch_dir(), PathBuf::from("/tmp/studyai"));
        assert!(config.logging.json_format);
    }

    #[test]
    fn test_explicit_model_wins_over_provider_default() {
        let mut config = AppConfig::default();
        config
            .apply_env(lookup(&[("LLM_PROVIDER", "ollama"), ("LLM_MODEL", "mistral")]))
            .unwrap();
        assert_eq!(config.llm.model, "mistral");
        assert_eq!(config.llm.base_url(), "http://localhost:11434");
    }

    #[test]
    fn test_provider_override_keeps_file_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studyai.toml");
        std::fs::write(&path, "[llm]\nmodel = \"gpt-4.1\"\n").unwrap();

        let mut config = AppConfig::from_file(&path).unwrap();
        config
            .apply_env(lookup(&[("LLM_PROVIDER", "openai")]))
            .unwrap();

        assert_eq!(config.llm.provider, LlmProvider::OpenAI);
        assert_eq!(config.llm.model, "gpt-4.1");
    }

    #[test]
    fn test_invalid_port() {
        let mut config = AppConfig::default();
        let err = config.apply_env(lookup(&[("API_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "API_PORT"));
    }

    #[test]
    fn test_from_file_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studyai.toml");
        std::fs::write(
            &path,
            "[server]\nport = 8080\n\n[search]\nwikipedia_lang = \"de\"\n",
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.search.wikipedia_lang, "de");
        assert_eq!(config.search.top_k, 1);
    }

    #[test]
    fn test_from_file_missing() {
        let err = AppConfig::from_file("/nonexistent/studyai.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileReadError { .. }));
    }
}
