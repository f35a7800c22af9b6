//! Address and postal code extraction.

use crate::models::config::AddressSpan;

use super::patterns::{ADDRESS, POSTAL_CODE};
use super::{ExtractionMatch, FieldExtractor};

/// Address field extractor.
///
/// Matches from the literal `Address:` label through the next standalone
/// 6-digit group, across line breaks. With [`AddressSpan::Matched`] the
/// label is part of the value.
pub struct AddressExtractor {
    span: AddressSpan,
}

impl AddressExtractor {
    pub fn new() -> Self {
        Self {
            span: AddressSpan::default(),
        }
    }

    /// Select which part of the match is reported.
    pub fn with_span(mut self, span: AddressSpan) -> Self {
        self.span = span;
        self
    }
}

impl Default for AddressExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AddressExtractor {
    type Output = ExtractionMatch<String>;

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        ADDRESS
            .captures_iter(text)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                let reported = match self.span {
                    AddressSpan::Matched => full,
                    AddressSpan::Body => caps.get(1)?,
                };
                Some(ExtractionMatch::at(
                    reported.as_str().trim().to_string(),
                    0.7,
                    full,
                ))
            })
            .collect()
    }
}

/// Extract the address, label included.
pub fn extract_address(text: &str) -> Option<String> {
    AddressExtractor::new().extract(text).map(|m| m.value)
}

/// Postal code extractor: first standalone 6-digit group, independent of
/// the address match.
pub struct PostalCodeExtractor;

impl PostalCodeExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PostalCodeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PostalCodeExtractor {
    type Output = ExtractionMatch<String>;

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        POSTAL_CODE
            .find_iter(text)
            .map(|m| ExtractionMatch::at(m.as_str().to_string(), 0.8, m))
            .collect()
    }
}

pub fn extract_postal_code(text: &str) -> Option<String> {
    PostalCodeExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BACK: &str = "Unique Identification Authority of India\nAddress: S/O Ram Lal,\n12 MG Road, Bengaluru,\nKarnataka - 560001\n1234 5678 9101";

    #[test]
    fn test_address_keeps_label_by_default() {
        assert_eq!(
            extract_address(BACK),
            Some("Address: S/O Ram Lal,\n12 MG Road, Bengaluru,\nKarnataka - 560001".to_string())
        );
    }

    #[test]
    fn test_address_body_only() {
        let m = AddressExtractor::new()
            .with_span(AddressSpan::Body)
            .extract(BACK)
            .unwrap();
        assert_eq!(m.value, "S/O Ram Lal,\n12 MG Road, Bengaluru,\nKarnataka - 560001");
        assert!(m.source.starts_with("Address:"));
    }

    #[test]
    fn test_address_stops_at_first_code() {
        assert_eq!(
            extract_address("Address: 123 Road 560001 and 560002"),
            Some("Address: 123 Road 560001".to_string())
        );
    }

    #[test]
    fn test_address_requires_code() {
        assert_eq!(extract_address("Address: 12 MG Road, Bengaluru"), None);
        assert_eq!(extract_address("address: 12 MG Road 560001"), None);
    }

    #[test]
    fn test_postal_code() {
        assert_eq!(extract_postal_code(BACK), Some("560001".to_string()));
        assert_eq!(extract_postal_code("1234567 and 12345"), None);
        assert_eq!(extract_postal_code("123456789101"), None);
    }
}
