use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::error::AnalyzeError;

/// Minimum number of trimmed characters OCR output needs before it is worth
/// sending to the reasoning step.
pub const MIN_TEXT_LENGTH: usize = 10;

/// Label used for the placeholder result returned when reasoning fails.
pub const FALLBACK_MENU_ITEM: &str = "Grilled Chicken Breast (Analysis Failed)";

const ACCEPTED_MIME_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "image/bmp",
    "image/tiff",
];

/// An uploaded menu photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    data: Vec<u8>,
    mime_type: String,
}

impl ImageInput {
    /// Wrap raw image bytes.
    ///
    /// Rejects empty payloads and MIME types that are not images we accept.
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Result<Self, AnalyzeError> {
        let mime_type = mime_type.into().to_ascii_lowercase();
        if !ACCEPTED_MIME_TYPES.contains(&mime_type.as_str()) {
            return Err(AnalyzeError::UnsupportedImage(format!(
                "'{}' is not a supported image type",
                mime_type
            )));
        }
        if data.is_empty() {
            return Err(AnalyzeError::UnsupportedImage(
                "image file is empty".to_string(),
            ));
        }

        Ok(ImageInput { data, mime_type })
    }

    /// Read an image from disk, inferring the MIME type from the extension
    pub async fn from_path(path: &Path) -> Result<Self, AnalyzeError> {
        let mime_type = mime_from_path(path).ok_or_else(|| {
            AnalyzeError::UnsupportedImage(format!(
                "{} does not look like an image file",
                path.display()
            ))
        })?;
        let data = tokio::fs::read(path).await?;
        Self::new(data, mime_type)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

fn mime_from_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        _ => None,
    }
}

/// OCR output, trimmed of surrounding whitespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    pub fn new(raw: &str) -> Self {
        ExtractedText(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, not bytes
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_usable(&self) -> bool {
        self.char_count() >= MIN_TEXT_LENGTH
    }
}

/// Macronutrients for one menu item. Grams, except calories (kcal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroInfo {
    #[serde(deserialize_with = "whole_units")]
    pub protein: u32,
    #[serde(deserialize_with = "whole_units")]
    pub carbs: u32,
    #[serde(deserialize_with = "whole_units")]
    pub fat: u32,
    #[serde(deserialize_with = "whole_units")]
    pub calories: u32,
}

// Models occasionally answer with 42.5 or -0; round and clamp instead of failing.
fn whole_units<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom("macro value must be a finite number"));
    }
    Ok(value.round().clamp(0.0, u32::MAX as f64) as u32)
}

/// The highest-protein item found on a menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub menu_item: String,
    pub macros: MacroInfo,
    /// Set when the result is the fixed placeholder rather than a real analysis
    #[serde(default)]
    pub is_fallback: bool,
}

impl AnalysisResult {
    /// The fixed placeholder substituted whenever live reasoning fails
    pub fn fallback() -> Self {
        AnalysisResult {
            menu_item: FALLBACK_MENU_ITEM.to_string(),
            macros: MacroInfo {
                protein: 35,
                carbs: 5,
                fat: 8,
                calories: 220,
            },
            is_fallback: true,
        }
    }
}
