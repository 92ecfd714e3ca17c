mod menu;
mod session;

pub use menu::MenuAnalyzer;
pub use session::{AnalysisSession, Outcome};
