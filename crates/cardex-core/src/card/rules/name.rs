//! Holder name extraction.

use super::patterns::NAME_BEFORE_DOB;
use super::{ExtractionMatch, FieldExtractor};

/// Name field extractor.
///
/// The name is the capitalized word sequence printed just before the birth
/// label; the "Government of India" banner is skipped when it precedes it.
pub struct NameExtractor;

impl NameExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for NameExtractor {
    type Output = ExtractionMatch<String>;

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        NAME_BEFORE_DOB
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| ExtractionMatch::at(m.as_str().trim().to_string(), 0.6, m))
            .collect()
    }
}

/// Extract the holder's name.
pub fn extract_name(text: &str) -> Option<String> {
    NameExtractor::new().extract(text).map(|m| m.value)
}
