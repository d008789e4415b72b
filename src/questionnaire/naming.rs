//! Questionnaire file naming rules
//!
//! Listing and saving use different rules: listing also recognizes the plural
//! `questions_*.json` form, saving only ever produces `question_*.json`.

use glob::Pattern;

use super::error::ValidationError;

/// Prefix every saved file name must start with
pub const SAVE_PREFIX: &str = "question_";
/// Suffix every saved file name must end with
pub const SAVE_SUFFIX: &str = ".json";

/// Glob patterns recognized when listing
pub const LIST_PATTERNS: [&str; 2] = ["question_*.json", "questions_*.json"];

/// Compiled listing patterns
pub struct ListingMatcher {
    patterns: Vec<Pattern>,
}

impl ListingMatcher {
    pub fn new() -> Self {
        let patterns = LIST_PATTERNS
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .collect();
        Self { patterns }
    }

    /// Check a bare file name against the listing patterns
    pub fn matches(&self, file_name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(file_name))
    }
}

impl Default for ListingMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a requested save file name, returning the trimmed name to write
pub fn validate_save_name(raw: &str) -> Result<&str, ValidationError> {
    let name = raw.trim();
    if !name.starts_with(SAVE_PREFIX) {
        return Err(ValidationError::BadPrefix(name.to_string()));
    }
    if !name.ends_with(SAVE_SUFFIX) {
        return Err(ValidationError::BadSuffix(name.to_string()));
    }
    if name.contains(['/', '\\']) {
        return Err(ValidationError::PathSeparator(name.to_string()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_patterns() {
        let m = ListingMatcher::new();
        assert!(m.matches("question_a.json"));
        assert!(m.matches("questions_a.json"));
        assert!(m.matches("question_.json"));
        assert!(!m.matches("questions.json"));
        assert!(!m.matches("question_a.json.bak"));
        assert!(!m.matches("Question_a.json"));
        assert!(!m.matches("quiz_a.json"));
    }

    #[test]
    fn test_valid_save_names() {
        assert_eq!(validate_save_name("question_1.json"), Ok("question_1.json"));
        assert_eq!(
            validate_save_name("  question_trim.json\n"),
            Ok("question_trim.json")
        );
    }

    #[test]
    fn test_plural_form_cannot_be_saved() {
        assert!(matches!(
            validate_save_name("questions_1.json"),
            Err(ValidationError::BadPrefix(_))
        ));
    }

    #[test]
    fn test_rejected_save_names() {
        assert!(matches!(
            validate_save_name("quiz_1.json"),
            Err(ValidationError::BadPrefix(_))
        ));
        assert!(matches!(
            validate_save_name("question_1.txt"),
            Err(ValidationError::BadSuffix(_))
        ));
        assert!(matches!(
            validate_save_name("../question_escape.json"),
            Err(ValidationError::BadPrefix(_))
        ));
        assert!(matches!(
            validate_save_name("question_/../escape.json"),
            Err(ValidationError::PathSeparator(_))
        ));
        assert!(matches!(
            validate_save_name("question_a\\b.json"),
            Err(ValidationError::PathSeparator(_))
        ));
        assert!(validate_save_name("").is_err());
    }
}
