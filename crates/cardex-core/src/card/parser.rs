//! Record assembly from the per-field rules.

use std::time::Instant;

use tracing::{debug, info};

use crate::models::config::{AddressSpan, ExtractionConfig};
use crate::models::input::PairedText;
use crate::models::record::{ExtractedRecord, NOT_FOUND};

use super::rules::{
    AddressExtractor, DateOfBirthExtractor, FieldExtractor, GenderExtractor, IdNumberExtractor,
    NameExtractor, PostalCodeExtractor,
};
use super::CardExtractor;

/// Result of card extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted record; every field is populated.
    pub record: ExtractedRecord,
    /// Corpus the rules ran over.
    pub raw_text: String,
    /// One entry per field that fell back to the sentinel.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for card parsing.
pub trait CardParser {
    /// Parse a record from the recognized corpus. Never fails.
    fn parse(&self, text: &str) -> ExtractionResult;
}

/// Parser applying one independent rule per field.
pub struct RuleCardParser {
    address_span: AddressSpan,
}

impl RuleCardParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self {
            address_span: AddressSpan::default(),
        }
    }

    /// Create a parser from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new().with_address_span(config.address_span)
    }

    /// Set which part of the address match is reported.
    pub fn with_address_span(mut self, span: AddressSpan) -> Self {
        self.address_span = span;
        self
    }
}

impl Default for RuleCardParser {
    fn default() -> Self {
        Self::new()
    }
}

fn or_sentinel(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_FOUND.to_string())
}

impl CardParser for RuleCardParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();

        info!("Parsing card from {} characters of text", text.len());

        let record = ExtractedRecord {
            id_number: or_sentinel(IdNumberExtractor::new().extract(text).map(|m| m.value)),
            name: or_sentinel(NameExtractor::new().extract(text).map(|m| m.value)),
            date_of_birth: or_sentinel(DateOfBirthExtractor::new().extract(text).map(|m| m.value)),
            gender: or_sentinel(
                GenderExtractor::new()
                    .extract(text)
                    .map(|m| m.value.to_string()),
            ),
            address: or_sentinel(
                AddressExtractor::new()
                    .with_span(self.address_span)
                    .extract(text)
                    .map(|m| m.value),
            ),
            postal_code: or_sentinel(PostalCodeExtractor::new().extract(text).map(|m| m.value)),
        };

        let warnings: Vec<String> = record
            .missing_fields()
            .into_iter()
            .map(|f| format!("Could not extract {}", f.label().to_lowercase()))
            .collect();

        debug!(
            "Extracted {} of 6 fields",
            6 - warnings.len()
        );

        ExtractionResult {
            record,
            raw_text: text.to_string(),
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

impl CardExtractor for RuleCardParser {
    fn extract(&self, text: &PairedText) -> ExtractedRecord {
        self.parse(&text.corpus()).record
    }
}
