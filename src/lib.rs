pub mod builder;
pub mod config;
pub mod error;
pub mod images_to_text;
pub mod model;
pub mod pipelines;
pub mod providers;

use std::path::Path;

use log::{debug, warn};

pub use builder::MenuAnalyzerBuilder;
pub use config::AppConfig;
pub use error::{AnalyzeError, ReasoningError, Stage};
pub use model::{AnalysisResult, ExtractedText, ImageInput, MacroInfo};
pub use pipelines::{AnalysisSession, MenuAnalyzer, Outcome};

/// Find the highest-protein item on a menu photo.
///
/// Loads configuration, builds an analyzer, runs one analysis and releases the
/// OCR engine whatever the outcome.
pub async fn analyze_menu_image(path: &Path) -> Result<AnalysisResult, AnalyzeError> {
    let config = AppConfig::load()?;
    for warning in config.diagnostics() {
        warn!("{}", warning);
    }

    let image = ImageInput::from_path(path).await?;
    debug!(
        "Loaded {} ({} bytes, {})",
        path.display(),
        image.data().len(),
        image.mime_type()
    );

    let analyzer = MenuAnalyzer::builder().config(config).build()?;
    let result = analyzer.analyze(&image).await;
    analyzer.dispose().await;
    result
}
