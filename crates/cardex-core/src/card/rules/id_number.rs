//! 12-digit card number extraction.

use super::patterns::ID_NUMBER;
use super::{ExtractionMatch, FieldExtractor};

/// ID number field extractor.
///
/// Accepts three groups of four digits, each optionally separated by one
/// space. No checksum validation is performed.
pub struct IdNumberExtractor;

impl IdNumberExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IdNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for IdNumberExtractor {
    type Output = ExtractionMatch<String>;

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        ID_NUMBER
            .captures_iter(text)
            .filter_map(|caps| {
                let value = format!("{} {} {}", &caps[1], &caps[2], &caps[3]);
                caps.get(0).map(|m| ExtractionMatch::at(value, 0.9, m))
            })
            .collect()
    }
}

/// Extract the ID number, normalized to `dddd dddd dddd`.
pub fn extract_id_number(text: &str) -> Option<String> {
    IdNumberExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_spaced() {
        assert_eq!(
            extract_id_number("Your number\n1234 5678 9101\nVID"),
            Some("1234 5678 9101".to_string())
        );
    }

    #[test]
    fn test_extract_run_together_is_normalized() {
        assert_eq!(
            extract_id_number("ID 123456789101"),
            Some("1234 5678 9101".to_string())
        );
    }

    #[test]
    fn test_first_occurrence_wins() {
        let text = "1111 2222 3333 then 4444 5555 6666";
        let all = IdNumberExtractor::new().extract_all(text);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].value, "1111 2222 3333");
        assert_eq!(all[0].span, 0..14);
    }

    #[test]
    fn test_rejects_longer_digit_runs() {
        assert_eq!(extract_id_number("1234567891012"), None);
        assert_eq!(extract_id_number("12345 6789 101"), None);
    }

    #[test]
    fn test_does_not_span_lines() {
        assert_eq!(extract_id_number("1234\n5678\n9101"), None);
    }
}
