//! Identity card field extraction module.

mod parser;
mod precheck;
pub mod rules;

pub use parser::{CardParser, ExtractionResult, RuleCardParser};
pub use precheck::DocumentCheck;

use crate::models::input::PairedText;
use crate::models::record::ExtractedRecord;

/// Trait for card field extractors.
pub trait CardExtractor {
    /// Extract a record from recognized front and back text.
    fn extract(&self, text: &PairedText) -> ExtractedRecord;
}
