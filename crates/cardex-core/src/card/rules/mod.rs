//! Rule-based field extractors for identity cards.
//!
//! Every rule scans the whole corpus independently and returns `None` when
//! nothing matches; the record assembler substitutes the sentinel.

use std::ops::Range;

pub mod address;
pub mod dates;
pub mod gender;
pub mod id_number;
pub mod name;
pub mod patterns;

pub use address::{extract_address, extract_postal_code, AddressExtractor, PostalCodeExtractor};
pub use dates::{extract_date_of_birth, DateOfBirthExtractor};
pub use gender::{extract_gender, GenderExtractor};
pub use id_number::{extract_id_number, IdNumberExtractor};
pub use name::{extract_name, NameExtractor};
pub use patterns::*;

/// A single-field rule over the recognized corpus.
pub trait FieldExtractor {
    type Output;

    /// Every occurrence, in corpus order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;

    /// The first occurrence.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }
}

/// A matched value and the corpus span it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    pub value: T,
    /// Rough rule confidence in `0.0..=1.0`.
    pub confidence: f32,
    /// Byte range of the whole match in the corpus.
    pub span: Range<usize>,
    /// Matched corpus text.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub(crate) fn at(value: T, confidence: f32, m: regex::Match<'_>) -> Self {
        Self {
            value,
            confidence,
            span: m.range(),
            source: m.as_str().to_string(),
        }
    }
}
