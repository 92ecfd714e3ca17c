use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Pipeline stage that exceeded its time budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ocr,
    Reasoning,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Ocr => write!(f, "text extraction"),
            Stage::Reasoning => write!(f, "menu analysis"),
        }
    }
}

/// Errors that end an analysis request
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// The OCR engine could not be started
    #[error("Failed to initialize OCR engine: {0}")]
    EngineInit(String),

    /// The OCR engine failed to read the image
    #[error("Failed to extract text from image: {0}")]
    Extraction(String),

    /// OCR produced too little text to analyze
    #[error("Not enough text was found in the image ({found} characters). Please ensure the image is clear and contains readable menu text.")]
    InsufficientText { found: usize },

    /// A stage ran longer than its configured budget
    #[error("The {stage} step timed out after {}", format_budget(.budget))]
    Timeout { stage: Stage, budget: Duration },

    /// The input is not an image we can process
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    /// Failed to read the image file
    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),

    /// Analyzer configuration error
    #[error("Builder error: {0}")]
    Builder(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Whole seconds when the budget is a whole number of seconds, milliseconds otherwise
pub(crate) fn format_budget(budget: &Duration) -> String {
    if budget.subsec_nanos() == 0 {
        format!("{}s", budget.as_secs())
    } else {
        format!("{}ms", budget.as_millis())
    }
}

/// Errors from the LLM reasoning step. These never reach the caller of
/// `MenuAnalyzer::analyze`; the orchestrator replaces them with the fallback.
#[derive(Error, Debug)]
pub enum ReasoningError {
    #[error("No API key configured for the reasoning service")]
    MissingApiKey,

    #[error("Request to reasoning service failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Reasoning service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("No response content from reasoning service")]
    EmptyResponse,

    #[error("Reasoning response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid response structure: {0}")]
    InvalidStructure(String),
}

/// Errors raised by an OCR engine implementation
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("{0}")]
    Launch(String),

    #[error("{0}")]
    Recognize(String),
}

impl From<OcrError> for AnalyzeError {
    fn from(err: OcrError) -> Self {
        match err {
            OcrError::Launch(msg) => AnalyzeError::EngineInit(msg),
            OcrError::Recognize(msg) => AnalyzeError::Extraction(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_text_message_is_actionable() {
        let err = AnalyzeError::InsufficientText { found: 2 };
        let msg = err.to_string();
        assert!(msg.contains("ensure the image is clear and contains readable menu text"));
        assert!(msg.contains("2 characters"));
    }

    #[test]
    fn test_ocr_error_mapping() {
        let init: AnalyzeError = OcrError::Launch("no binary".to_string()).into();
        assert!(matches!(init, AnalyzeError::EngineInit(ref m) if m == "no binary"));

        let read: AnalyzeError = OcrError::Recognize("bad image".to_string()).into();
        assert!(matches!(read, AnalyzeError::Extraction(ref m) if m == "bad image"));
    }

    #[test]
    fn test_timeout_message_names_stage() {
        let err = AnalyzeError::Timeout {
            stage: Stage::Ocr,
            budget: Duration::from_secs(60),
        };
        assert_eq!(err.to_string(), "The text extraction step timed out after 60s");
    }

    #[test]
    fn test_sub_second_timeout_reported_in_millis() {
        let err = AnalyzeError::Timeout {
            stage: Stage::Ocr,
            budget: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "The text extraction step timed out after 250ms");
        assert_eq!(format_budget(&Duration::from_millis(1500)), "1500ms");
    }
}
