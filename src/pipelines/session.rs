use super::MenuAnalyzer;
use crate::error::AnalyzeError;
use crate::model::{AnalysisResult, ImageInput};
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};

/// Result of a submission, checked against the newest request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// No newer request started while this one ran
    Current(T),
    /// Superseded by a newer submission or a reset; discard it
    Stale,
}

impl<T> Outcome<T> {
    pub fn current(self) -> Option<T> {
        match self {
            Outcome::Current(value) => Some(value),
            Outcome::Stale => None,
        }
    }
}

/// One user's analysis session.
///
/// Every submission takes the next generation number. A finished request is
/// only reported if its generation is still the newest, so a slow upload never
/// overwrites the result of one started after it.
pub struct AnalysisSession {
    analyzer: MenuAnalyzer,
    generation: AtomicU64,
}

impl AnalysisSession {
    pub fn new(analyzer: MenuAnalyzer) -> Self {
        AnalysisSession {
            analyzer,
            generation: AtomicU64::new(0),
        }
    }

    /// Analyze an image. Errors from a superseded request are dropped too.
    pub async fn submit(
        &self,
        image: &ImageInput,
    ) -> Result<Outcome<AnalysisResult>, AnalyzeError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.analyzer.analyze(image).await;

        let latest = self.generation.load(Ordering::SeqCst);
        if latest != ticket {
            debug!("Discarding result of request {} (latest is {})", ticket, latest);
            return Ok(Outcome::Stale);
        }

        result.map(Outcome::Current)
    }

    /// Invalidate whatever is in flight, e.g. when the user clears the upload
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn analyzer(&self) -> &MenuAnalyzer {
        &self.analyzer
    }

    /// Tear the session down, releasing the OCR engine
    pub async fn close(self) {
        self.analyzer.dispose().await;
    }
}
