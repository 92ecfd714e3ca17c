use crate::builder::MenuAnalyzerBuilder;
use crate::error::{format_budget, AnalyzeError, Stage};
use crate::images_to_text::TextExtractor;
use crate::model::{AnalysisResult, ImageInput};
use crate::providers::MenuReasoner;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::time::timeout;

pub(crate) const DEFAULT_OCR_TIMEOUT: Duration = Duration::from_secs(60);
pub(crate) const DEFAULT_REASONING_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs one menu photo through OCR and reasoning
///
/// This pipeline:
/// 1. Extracts text with the owned [`TextExtractor`] (errors are fatal)
/// 2. Rejects text shorter than [`crate::model::MIN_TEXT_LENGTH`]
/// 3. Asks the reasoner for the highest-protein item, substituting
///    [`AnalysisResult::fallback`] on any failure
pub struct MenuAnalyzer {
    extractor: TextExtractor,
    reasoner: Option<Box<dyn MenuReasoner>>,
    ocr_timeout: Duration,
    reasoning_timeout: Duration,
}

impl MenuAnalyzer {
    /// Creates a new builder for configuring an analyzer
    pub fn builder() -> MenuAnalyzerBuilder {
        MenuAnalyzerBuilder::default()
    }

    /// Compose an analyzer from parts. Without a reasoner every request
    /// resolves to the fallback result.
    pub fn new(extractor: TextExtractor, reasoner: Option<Box<dyn MenuReasoner>>) -> Self {
        MenuAnalyzer {
            extractor,
            reasoner,
            ocr_timeout: DEFAULT_OCR_TIMEOUT,
            reasoning_timeout: DEFAULT_REASONING_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, ocr: Duration, reasoning: Duration) -> Self {
        self.ocr_timeout = ocr;
        self.reasoning_timeout = reasoning;
        self
    }

    /// Whether a live reasoning service is configured
    pub fn has_reasoner(&self) -> bool {
        self.reasoner.is_some()
    }

    pub fn extractor(&self) -> &TextExtractor {
        &self.extractor
    }

    /// Analyze a menu photo
    ///
    /// # Errors
    /// Returns `AnalyzeError` if:
    /// - The OCR engine cannot start (`EngineInit`)
    /// - Recognition fails (`Extraction`)
    /// - OCR runs past its time budget (`Timeout`)
    /// - Too little text was found (`InsufficientText`)
    ///
    /// Reasoning failures never surface here; they produce a result with
    /// `is_fallback` set.
    pub async fn analyze(&self, image: &ImageInput) -> Result<AnalysisResult, AnalyzeError> {
        let text = timeout(self.ocr_timeout, self.extractor.extract_text(image))
            .await
            .map_err(|_| AnalyzeError::Timeout {
                stage: Stage::Ocr,
                budget: self.ocr_timeout,
            })??;

        if !text.is_usable() {
            debug!("OCR produced only {} characters", text.char_count());
            return Err(AnalyzeError::InsufficientText {
                found: text.char_count(),
            });
        }

        Ok(self.reason(text.as_str()).await)
    }

    async fn reason(&self, text: &str) -> AnalysisResult {
        let Some(reasoner) = &self.reasoner else {
            warn!("No reasoning service configured, returning placeholder result");
            return AnalysisResult::fallback();
        };

        match timeout(self.reasoning_timeout, reasoner.analyze_menu_text(text)).await {
            Ok(Ok(result)) => {
                info!(
                    "{} picked '{}' ({}g protein)",
                    reasoner.provider_name(),
                    result.menu_item,
                    result.macros.protein
                );
                result
            }
            Ok(Err(e)) => {
                warn!("Menu analysis with {} failed: {}", reasoner.provider_name(), e);
                AnalysisResult::fallback()
            }
            Err(_) => {
                warn!(
                    "The {} step timed out after {}",
                    Stage::Reasoning,
                    format_budget(&self.reasoning_timeout)
                );
                AnalysisResult::fallback()
            }
        }
    }

    /// Release the OCR engine. Safe to call more than once.
    pub async fn dispose(&self) {
        self.extractor.dispose().await;
    }
}
