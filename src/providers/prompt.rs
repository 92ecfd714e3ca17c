/// The prompt template used for picking the highest-protein menu item.
///
/// Loaded from `prompt.txt` at compile time. The `{menu_text}` placeholder is
/// replaced with the OCR output by [`build_menu_prompt`].
pub const MENU_ANALYSIS_PROMPT: &str = include_str!("prompt.txt");

const MENU_TEXT_PLACEHOLDER: &str = "{menu_text}";

/// Build the user message for one menu
pub fn build_menu_prompt(menu_text: &str) -> String {
    MENU_ANALYSIS_PROMPT.replace(MENU_TEXT_PLACEHOLDER, menu_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_embedded() {
        assert!(!MENU_ANALYSIS_PROMPT.is_empty());
        assert!(MENU_ANALYSIS_PROMPT.contains(MENU_TEXT_PLACEHOLDER));
    }

    #[test]
    fn test_prompt_covers_selection_rules() {
        assert!(MENU_ANALYSIS_PROMPT.contains("ALL menu items"));
        assert!(MENU_ANALYSIS_PROMPT.contains("HIGHEST protein"));
        assert!(MENU_ANALYSIS_PROMPT.contains("protein-to-calorie ratio"));
        assert!(MENU_ANALYSIS_PROMPT.contains("ONLY a JSON object"));
        assert!(MENU_ANALYSIS_PROMPT.contains("\"menuItem\""));
        assert!(MENU_ANALYSIS_PROMPT.contains("Round to whole numbers"));
    }

    #[test]
    fn test_build_menu_prompt_inlines_text() {
        let prompt = build_menu_prompt("Tofu Scramble $9");
        assert!(prompt.contains("\"Tofu Scramble $9\""));
        assert!(!prompt.contains(MENU_TEXT_PLACEHOLDER));
    }
}
