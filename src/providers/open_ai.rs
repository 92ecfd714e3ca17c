use crate::config::LlmConfig;
use crate::error::ReasoningError;
use crate::model::AnalysisResult;
use crate::providers::{build_menu_prompt, parse_analysis, MenuReasoner};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

pub struct OpenAIReasoner {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl OpenAIReasoner {
    /// Create a new OpenAI reasoner from configuration
    pub fn new(config: &LlmConfig) -> Result<Self, ReasoningError> {
        Self::with_api_key(config, config.resolved_api_key())
    }

    /// Same as [`OpenAIReasoner::new`] with the API key already resolved
    pub fn with_api_key(
        config: &LlmConfig,
        api_key: Option<String>,
    ) -> Result<Self, ReasoningError> {
        let api_key = api_key.ok_or(ReasoningError::MissingApiKey)?;

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(OpenAIReasoner {
            client,
            api_key,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        OpenAIReasoner {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.3,
            max_tokens: 500,
        }
    }
}

#[async_trait]
impl MenuReasoner for OpenAIReasoner {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn analyze_menu_text(&self, text: &str) -> Result<AnalysisResult, ReasoningError> {
        let response = self
            .client
            .post(format!(
                "{}/v1/chat/completions",
                self.base_url.trim_end_matches('/')
            ))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "user", "content": build_menu_prompt(text)}
                ],
                "temperature": self.temperature,
                "max_tokens": self.max_tokens
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReasoningError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);

        let content = response_body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(ReasoningError::EmptyResponse)?;

        parse_analysis(content)
    }
}
