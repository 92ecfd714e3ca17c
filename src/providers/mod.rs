mod open_ai;
mod prompt;

pub use open_ai::OpenAIReasoner;
pub use prompt::{build_menu_prompt, MENU_ANALYSIS_PROMPT};

use crate::error::ReasoningError;
use crate::model::{AnalysisResult, MacroInfo};
use async_trait::async_trait;
use serde::Deserialize;

/// Picks the highest-protein item from raw menu text
#[async_trait]
pub trait MenuReasoner: Send + Sync {
    /// Get the provider name (e.g., "openai")
    fn provider_name(&self) -> &str;

    /// Analyze OCR output and return the highest-protein item with its macros
    async fn analyze_menu_text(&self, text: &str) -> Result<AnalysisResult, ReasoningError>;
}

// Every field optional so a missing one is reported as a structural problem
// instead of a generic JSON error.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    menu_item: Option<String>,
    macros: Option<MacroInfo>,
}

/// Parse a model reply into an [`AnalysisResult`].
///
/// The reply must be a JSON object with a non-empty `menuItem` and a complete
/// `macros` object. A surrounding Markdown code fence is tolerated.
pub fn parse_analysis(content: &str) -> Result<AnalysisResult, ReasoningError> {
    let content = strip_code_fence(content.trim());
    if content.is_empty() {
        return Err(ReasoningError::EmptyResponse);
    }

    let raw: RawAnalysis = serde_json::from_str(content)?;

    let menu_item = raw
        .menu_item
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .ok_or_else(|| ReasoningError::InvalidStructure("missing menuItem".to_string()))?;
    let macros = raw
        .macros
        .ok_or_else(|| ReasoningError::InvalidStructure("missing macros".to_string()))?;

    Ok(AnalysisResult {
        menu_item,
        macros,
        is_fallback: false,
    })
}

fn strip_code_fence(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("```") else {
        return content;
    };
    // Drop an optional language tag such as ```json
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
