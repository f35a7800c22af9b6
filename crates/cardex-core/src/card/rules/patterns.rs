//! Common regex patterns for identity card extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // 12-digit ID number, printed as 4-4-4 groups or run together
    pub static ref ID_NUMBER: Regex = Regex::new(
        r"\b(\d{4}) ?(\d{4}) ?(\d{4})\b"
    ).unwrap();

    // Capitalized name on the line(s) before the birth label, skipping the
    // issuer banner when present. The label must end on a word boundary.
    pub static ref NAME_BEFORE_DOB: Regex = Regex::new(
        r"(?:(?i:government\s+of\s+india)\s+)?\b([A-Z][A-Za-z.']*(?:[ \t]+[A-Z][A-Za-z.']*)*)\s+(?i:(?:DOB|Date\s+of\s+Birth|Year\s+of\s+Birth)\b|D\.O\.B\b\.?)"
    ).unwrap();

    // DD/MM/YYYY, purely syntactic
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{2}/\d{2}/\d{4})\b"
    ).unwrap();

    pub static ref GENDER: Regex = Regex::new(
        r"(?i)\b(male|female|other)\b"
    ).unwrap();

    // Everything after the label through the next standalone 6-digit group
    pub static ref ADDRESS: Regex = Regex::new(
        r"(?s)Address:\s*(.*?\b\d{6}\b)"
    ).unwrap();

    pub static ref POSTAL_CODE: Regex = Regex::new(
        r"\b(\d{6})\b"
    ).unwrap();
}
