//! Keyword pre-check that each image plausibly shows the claimed side.

use tracing::{debug, warn};

use crate::error::CardexError;
use crate::models::config::PrecheckConfig;
use crate::models::input::{PairedText, Slot, Verdict};

/// Advisory text check run before extraction.
///
/// A slot passes when its own text contains at least one common keyword and
/// at least one keyword specific to that slot (case-insensitive substring).
#[derive(Debug, Clone)]
pub struct DocumentCheck {
    common: Vec<String>,
    front: Vec<String>,
    back: Vec<String>,
}

impl DocumentCheck {
    pub fn new() -> Self {
        Self::from_config(&PrecheckConfig::default())
    }

    pub fn from_config(config: &PrecheckConfig) -> Self {
        let lower = |words: &[String]| -> Vec<String> {
            words.iter().map(|w| w.to_lowercase()).collect()
        };
        Self {
            common: lower(&config.common_keywords),
            front: lower(config.keywords_for(Slot::Front)),
            back: lower(config.keywords_for(Slot::Back)),
        }
    }

    /// Judge one slot's text.
    pub fn check_slot(&self, slot: Slot, text: &str) -> Verdict {
        let haystack = text.to_lowercase();
        let specific = match slot {
            Slot::Front => &self.front,
            Slot::Back => &self.back,
        };

        if !self.common.iter().any(|k| haystack.contains(k.as_str())) {
            return Verdict::fail(
                slot,
                format!("The {slot} image does not look like an identity card."),
            );
        }

        match specific.iter().find(|k| haystack.contains(k.as_str())) {
            Some(keyword) => {
                debug!("{} image matched keyword {:?}", slot, keyword);
                Verdict::pass(slot, format!("The {slot} image looks like the {slot} of the card."))
            }
            None => Verdict::fail(
                slot,
                format!("The {slot} image does not look like the {slot} of the card."),
            ),
        }
    }

    /// Judge both slots; any failure blocks extraction.
    pub fn check(&self, text: &PairedText) -> Result<Vec<Verdict>, CardexError> {
        let verdicts: Vec<Verdict> = Slot::ALL
            .into_iter()
            .map(|slot| self.check_slot(slot, text.text(slot)))
            .collect();

        if verdicts.iter().all(|v| v.passed) {
            Ok(verdicts)
        } else {
            warn!("Document check failed");
            Err(CardexError::DocumentMismatch { verdicts })
        }
    }
}

impl Default for DocumentCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::input::RecognitionResult;

    fn pair(front: &str, back: &str) -> PairedText {
        PairedText {
            front: RecognitionResult { slot: Slot::Front, text: front.into() },
            back: RecognitionResult { slot: Slot::Back, text: back.into() },
        }
    }

    #[test]
    fn test_both_sides_pass() {
        let text = pair(
            "Government of India\nJohn Doe\nDOB: 01/01/1990",
            "UIDAI\nAddress: 123 Road 560001",
        );
        let verdicts = DocumentCheck::new().check(&text).unwrap();
        assert_eq!(verdicts.len(), 2);
        assert!(verdicts.iter().all(|v| v.passed));
    }

    #[test]
    fn test_missing_common_keyword() {
        let verdict = DocumentCheck::new().check_slot(Slot::Front, "John Doe DOB 01/01/1990");
        assert!(!verdict.passed);
        assert!(verdict.reason.contains("identity card"));
    }

    #[test]
    fn test_swapped_sides_blocked() {
        let text = pair(
            "UIDAI\nAddress: 123 Road 560001",
            "Government of India\nJohn Doe\nDOB: 01/01/1990",
        );
        let err = DocumentCheck::new().check(&text).unwrap_err();
        let verdicts = err.verdicts();
        assert!(verdicts.iter().all(|v| !v.passed));
        assert_eq!(verdicts[0].slot, Slot::Front);
    }

    #[test]
    fn test_custom_keywords() {
        let config = PrecheckConfig {
            enabled: true,
            common_keywords: vec!["Republic".into()],
            front_keywords: vec!["Born".into()],
            back_keywords: vec!["Residence".into()],
        };
        let check = DocumentCheck::from_config(&config);
        assert!(check.check_slot(Slot::Front, "REPUBLIC OF X\nborn 1990").passed);
        assert!(!check.check_slot(Slot::Back, "REPUBLIC OF X\nborn 1990").passed);
    }
}
