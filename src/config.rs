use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Settings for the LLM chat endpoint
    #[serde(default)]
    pub llm: LlmConfig,
    /// Settings for the OCR engine
    #[serde(default)]
    pub ocr: OcrConfig,
}

/// Configuration for the menu reasoning service
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// API key for authentication (can also be set via OPENAI_API_KEY)
    pub api_key: Option<String>,
    /// Base URL for the API endpoint (for proxies or compatible services)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature; kept low so answers are stable between runs
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout: default_llm_timeout(),
        }
    }
}

impl LlmConfig {
    /// API key from configuration, falling back to the OPENAI_API_KEY environment variable.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key_or(std::env::var("OPENAI_API_KEY").ok())
    }

    /// Configured API key, else `fallback`. Blank keys count as missing.
    pub fn api_key_or(&self, fallback: Option<String>) -> Option<String> {
        self.api_key
            .clone()
            .or(fallback)
            .filter(|key| !key.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Configuration for the OCR engine
#[derive(Debug, Deserialize, Clone)]
pub struct OcrConfig {
    /// Engine to use: "tesseract" or "vision"
    #[serde(default = "default_engine")]
    pub engine: String,
    /// Recognition language (Tesseract language code)
    #[serde(default = "default_language")]
    pub language: String,
    /// Location of the engine executable
    #[serde(default = "default_core_path")]
    pub core_path: String,
    /// Location of the language data (tessdata directory)
    pub lang_path: Option<String>,
    /// Working directory for the engine process
    pub worker_path: Option<String>,
    /// Google Cloud Vision API key (can also be set via GOOGLE_API_KEY)
    pub api_key: Option<String>,
    /// Google Cloud Vision base URL
    #[serde(default = "default_vision_url")]
    pub endpoint: String,
    /// OCR timeout in seconds
    #[serde(default = "default_ocr_timeout")]
    pub timeout: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            language: default_language(),
            core_path: default_core_path(),
            lang_path: None,
            worker_path: None,
            api_key: None,
            endpoint: default_vision_url(),
            timeout: default_ocr_timeout(),
        }
    }
}

impl OcrConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

// Default value functions
fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_temperature() -> f64 {
    0.3
}

fn default_max_tokens() -> u32 {
    500
}

fn default_llm_timeout() -> u64 {
    30
}

fn default_engine() -> String {
    "tesseract".to_string()
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_core_path() -> String {
    "tesseract".to_string()
}

fn default_vision_url() -> String {
    "https://vision.googleapis.com".to_string()
}

fn default_ocr_timeout() -> u64 {
    60
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with PROTEIN_SCOUT__ prefix
    /// 2. protein-scout.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: PROTEIN_SCOUT__LLM__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config(None)
    }

    /// Same as [`AppConfig::load`], reading an explicit file instead of
    /// `protein-scout.toml`. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        load_config(Some(path))
    }

    /// Startup warnings for settings that degrade results without being fatal
    pub fn diagnostics(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.llm.resolved_api_key().is_none() {
            warnings.push(
                "No LLM API key configured (set OPENAI_API_KEY or PROTEIN_SCOUT__LLM__API_KEY); \
                 every analysis will return the placeholder result"
                    .to_string(),
            );
        }

        if self.ocr.engine == "vision"
            && self.ocr.api_key.is_none()
            && std::env::var("GOOGLE_API_KEY").is_err()
        {
            warnings.push(
                "OCR engine 'vision' selected but no Google API key configured (set GOOGLE_API_KEY)"
                    .to_string(),
            );
        }

        warnings
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        // Optional config file (can be missing)
        None => File::with_name("protein-scout").required(false),
    };

    let settings = Config::builder()
        .add_source(file)
        // Use double underscore for nested: PROTEIN_SCOUT__LLM__API_KEY
        .add_source(
            Environment::with_prefix("PROTEIN_SCOUT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        assert_eq!(default_model(), "gpt-4");
        assert_eq!(default_temperature(), 0.3);
        assert_eq!(default_max_tokens(), 500);
        assert_eq!(default_llm_timeout(), 30);
        assert_eq!(default_ocr_timeout(), 60);
        assert_eq!(default_engine(), "tesseract");
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.llm.base_url, "https://api.openai.com");
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.core_path, "tesseract");
        assert!(config.ocr.lang_path.is_none());
        assert_eq!(config.llm.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_configured_api_key_wins() {
        let config = LlmConfig {
            api_key: Some("from-config".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolved_api_key().as_deref(), Some("from-config"));
    }

    #[test]
    fn test_env_key_used_when_unconfigured() {
        let config = LlmConfig::default();
        assert_eq!(
            config.api_key_or(Some("from-env".to_string())).as_deref(),
            Some("from-env")
        );
        assert!(config.api_key_or(None).is_none());
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let config = LlmConfig {
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(config.api_key_or(None).is_none());
    }

    #[test]
    fn test_diagnostics_quiet_when_key_present() {
        let config = AppConfig {
            llm: LlmConfig {
                api_key: Some("test-key".to_string()),
                ..Default::default()
            },
            ocr: OcrConfig::default(),
        };
        assert!(config.diagnostics().is_empty());
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let result = AppConfig::load_from(Path::new("/nonexistent/protein-scout.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_without_file() {
        // Every section has defaults, so loading with no file must succeed
        let config = AppConfig::load().unwrap();
        assert!(config.llm.temperature >= 0.0);
    }
}
