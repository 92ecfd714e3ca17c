use std::time::Duration;

use log::warn;

use crate::config::AppConfig;
use crate::error::{AnalyzeError, ReasoningError};
use crate::images_to_text::{EngineLauncher, LauncherFactory, TextExtractor};
use crate::pipelines::MenuAnalyzer;
use crate::providers::{MenuReasoner, OpenAIReasoner};

/// Builder for configuring a [`MenuAnalyzer`]
#[derive(Default)]
pub struct MenuAnalyzerBuilder {
    config: Option<AppConfig>,
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    reasoner: Option<Box<dyn MenuReasoner>>,
    launcher: Option<Box<dyn EngineLauncher>>,
    ocr_timeout: Option<Duration>,
    reasoning_timeout: Option<Duration>,
}

impl MenuAnalyzerBuilder {
    /// Use an already loaded configuration instead of the defaults
    ///
    /// # Example
    /// ```
    /// use protein_scout::{AppConfig, MenuAnalyzer};
    ///
    /// let builder = MenuAnalyzer::builder().config(AppConfig::default());
    /// ```
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the API key for the LLM endpoint
    ///
    /// This allows passing the API key directly instead of relying on
    /// environment variables or config files.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the model name for the LLM endpoint
    ///
    /// # Example
    /// ```
    /// use protein_scout::MenuAnalyzer;
    ///
    /// let builder = MenuAnalyzer::builder().model("gpt-4o-mini");
    /// ```
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Point the reasoner at an OpenAI-compatible proxy
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Use a custom reasoner. Overrides every LLM setting.
    pub fn reasoner(mut self, reasoner: Box<dyn MenuReasoner>) -> Self {
        self.reasoner = Some(reasoner);
        self
    }

    /// Use a custom OCR engine launcher. Overrides the configured engine.
    pub fn launcher(mut self, launcher: Box<dyn EngineLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    /// Time budget for text extraction
    pub fn ocr_timeout(mut self, duration: Duration) -> Self {
        self.ocr_timeout = Some(duration);
        self
    }

    /// Time budget for the reasoning call
    pub fn reasoning_timeout(mut self, duration: Duration) -> Self {
        self.reasoning_timeout = Some(duration);
        self
    }

    /// Build the analyzer
    ///
    /// A missing LLM API key is not an error: the analyzer is built without a
    /// reasoner and every analysis returns the fallback result.
    ///
    /// # Errors
    /// Returns `AnalyzeError::Builder` if:
    /// - The configured OCR engine name is unknown
    /// - The HTTP client for the reasoner cannot be created
    ///
    /// # Example
    /// ```no_run
    /// # use protein_scout::MenuAnalyzer;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let analyzer = MenuAnalyzer::builder()
    ///     .api_key("sk-...")
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<MenuAnalyzer, AnalyzeError> {
        self.build_with_env_key(std::env::var("OPENAI_API_KEY").ok())
    }

    fn build_with_env_key(self, env_key: Option<String>) -> Result<MenuAnalyzer, AnalyzeError> {
        let mut config = self.config.unwrap_or_default();

        if let Some(key) = self.api_key {
            config.llm.api_key = Some(key);
        }
        if let Some(model) = self.model {
            config.llm.model = model;
        }
        if let Some(url) = self.base_url {
            config.llm.base_url = url;
        }
        if let Some(duration) = self.reasoning_timeout {
            config.llm.timeout = duration.as_secs().max(1);
        }

        let launcher = match self.launcher {
            Some(launcher) => launcher,
            None => LauncherFactory::create(&config.ocr)?,
        };

        let reasoner = match self.reasoner {
            Some(reasoner) => Some(reasoner),
            None => {
                let api_key = config.llm.api_key_or(env_key);
                match OpenAIReasoner::with_api_key(&config.llm, api_key) {
                    Ok(reasoner) => Some(Box::new(reasoner) as Box<dyn MenuReasoner>),
                    Err(ReasoningError::MissingApiKey) => {
                        warn!("No LLM API key configured, analyses will return the placeholder result");
                        None
                    }
                    Err(e) => {
                        return Err(AnalyzeError::Builder(format!(
                            "Failed to create reasoner: {}",
                            e
                        )))
                    }
                }
            }
        };

        let ocr_timeout = self.ocr_timeout.unwrap_or_else(|| config.ocr.timeout());
        let reasoning_timeout = self
            .reasoning_timeout
            .unwrap_or_else(|| config.llm.timeout());

        Ok(MenuAnalyzer::new(TextExtractor::new(launcher), reasoner)
            .with_timeouts(ocr_timeout, reasoning_timeout))
    }
}
