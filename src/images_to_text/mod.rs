mod factory;
mod tesseract;
mod vision;

pub use factory::LauncherFactory;
pub use tesseract::{TesseractEngine, TesseractLauncher};
pub use vision::{VisionEngine, VisionLauncher};

use crate::error::{AnalyzeError, OcrError};
use crate::model::{ExtractedText, ImageInput};
use async_trait::async_trait;
use log::{debug, info};
use tokio::sync::Mutex;

/// Raw output of one recognition pass
#[derive(Debug, Clone, Default)]
pub struct Recognition {
    pub text: String,
    /// Engine-reported confidence in the range 0.0-1.0, when available
    pub confidence: Option<f32>,
}

/// A running OCR engine
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Get the engine name (e.g., "tesseract", "vision")
    fn engine_name(&self) -> &str;

    /// Read the text contained in an image
    async fn recognize(&self, image: &ImageInput) -> Result<Recognition, OcrError>;

    /// Release whatever the engine holds. Called once, right before the handle is dropped.
    async fn terminate(&self) {}
}

/// Starts OCR engines. Launch failures surface as `AnalyzeError::EngineInit`.
#[async_trait]
pub trait EngineLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn OcrEngine>, OcrError>;
}

/// Where the extractor is in its engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Ready,
    Disposed,
}

enum EngineState {
    Uninitialized,
    Ready(Box<dyn OcrEngine>),
    Disposed,
}

/// Owns one OCR engine handle: launched lazily on first use, reused after,
/// released by [`TextExtractor::dispose`].
///
/// The handle sits behind an async mutex, so concurrent calls on the same
/// extractor run one at a time.
pub struct TextExtractor {
    launcher: Box<dyn EngineLauncher>,
    state: Mutex<EngineState>,
}

impl TextExtractor {
    pub fn new(launcher: Box<dyn EngineLauncher>) -> Self {
        TextExtractor {
            launcher,
            state: Mutex::new(EngineState::Uninitialized),
        }
    }

    /// Extract trimmed text from an image, launching the engine if needed
    pub async fn extract_text(&self, image: &ImageInput) -> Result<ExtractedText, AnalyzeError> {
        let mut state = self.state.lock().await;

        if !matches!(*state, EngineState::Ready(_)) {
            debug!("Launching OCR engine");
            let engine = self.launcher.launch().await.map_err(|e| match e {
                // Whatever goes wrong while launching is an init failure
                OcrError::Launch(msg) | OcrError::Recognize(msg) => AnalyzeError::EngineInit(msg),
            })?;
            info!("OCR engine '{}' ready", engine.engine_name());
            *state = EngineState::Ready(engine);
        }

        let EngineState::Ready(engine) = &*state else {
            return Err(AnalyzeError::EngineInit(
                "OCR engine handle missing after launch".to_string(),
            ));
        };

        debug!(
            "Running OCR on {} bytes of {}",
            image.data().len(),
            image.mime_type()
        );
        let recognition = engine
            .recognize(image)
            .await
            .map_err(|e| AnalyzeError::Extraction(e.to_string()))?;

        let text = ExtractedText::new(&recognition.text);
        debug!(
            "Extracted {} characters (confidence: {:?})",
            text.char_count(),
            recognition.confidence
        );
        Ok(text)
    }

    /// Release the engine handle. Safe to call repeatedly or before any use;
    /// a later `extract_text` launches a fresh engine.
    pub async fn dispose(&self) {
        let mut state = self.state.lock().await;
        if let EngineState::Ready(engine) = std::mem::replace(&mut *state, EngineState::Disposed) {
            info!("Terminating OCR engine '{}'", engine.engine_name());
            engine.terminate().await;
        }
    }

    pub async fn lifecycle(&self) -> Lifecycle {
        match &*self.state.lock().await {
            EngineState::Uninitialized => Lifecycle::Uninitialized,
            EngineState::Ready(_) => Lifecycle::Ready,
            EngineState::Disposed => Lifecycle::Disposed,
        }
    }
}
