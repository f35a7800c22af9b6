//! Date of birth extraction.

use super::patterns::DATE_DMY;
use super::{ExtractionMatch, FieldExtractor};

/// Date of birth extractor. Matches the first `DD/MM/YYYY` token without
/// checking it against the calendar.
pub struct DateOfBirthExtractor;

impl DateOfBirthExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateOfBirthExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateOfBirthExtractor {
    type Output = ExtractionMatch<String>;

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DATE_DMY
            .find_iter(text)
            .map(|m| ExtractionMatch::at(m.as_str().to_string(), 0.9, m))
            .collect()
    }
}

pub fn extract_date_of_birth(text: &str) -> Option<String> {
    DateOfBirthExtractor::new().extract(text).map(|m| m.value)
}
