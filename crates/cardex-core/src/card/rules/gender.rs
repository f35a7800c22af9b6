//! Gender extraction.

use crate::models::record::Gender;

use super::patterns::GENDER;
use super::{ExtractionMatch, FieldExtractor};

/// Gender field extractor (whole-word, case-insensitive).
pub struct GenderExtractor;

impl GenderExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GenderExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for GenderExtractor {
    type Output = ExtractionMatch<Gender>;

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        GENDER
            .find_iter(text)
            .filter_map(|m| Gender::from_str(m.as_str()).map(|g| ExtractionMatch::at(g, 0.9, m)))
            .collect()
    }
}

pub fn extract_gender(text: &str) -> Option<Gender> {
    GenderExtractor::new().extract(text).map(|m| m.value)
}
