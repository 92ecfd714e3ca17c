use crate::config::OcrConfig;
use crate::error::AnalyzeError;
use crate::images_to_text::{EngineLauncher, TesseractLauncher, VisionLauncher};

pub struct LauncherFactory;

impl LauncherFactory {
    /// Create the engine launcher named in the OCR configuration
    pub fn create(config: &OcrConfig) -> Result<Box<dyn EngineLauncher>, AnalyzeError> {
        match config.engine.as_str() {
            "tesseract" => Ok(Box::new(TesseractLauncher::new(config))),
            "vision" => Ok(Box::new(VisionLauncher::new(config))),
            other => Err(AnalyzeError::Builder(format!(
                "Unknown OCR engine: {} (available: {})",
                other,
                Self::available_engines().join(", ")
            ))),
        }
    }

    /// List all available engine names
    pub fn available_engines() -> Vec<&'static str> {
        vec!["tesseract", "vision"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_known_engines() {
        for engine in LauncherFactory::available_engines() {
            let config = OcrConfig {
                engine: engine.to_string(),
                ..OcrConfig::default()
            };
            assert!(LauncherFactory::create(&config).is_ok());
        }
    }

    #[test]
    fn test_create_unknown_engine() {
        let config = OcrConfig {
            engine: "easyocr".to_string(),
            ..OcrConfig::default()
        };
        match LauncherFactory::create(&config) {
            Err(AnalyzeError::Builder(msg)) => assert!(msg.contains("Unknown OCR engine")),
            _ => panic!("expected builder error"),
        }
    }
}
