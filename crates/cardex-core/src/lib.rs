//! Core library for identity card OCR processing.
//!
//! This crate provides:
//! - Upload validation and form session state (front/back images)
//! - Concurrent text recognition with a deadline
//! - Rule-based field extraction into a fixed record
//! - An optional keyword pre-check and an access gate

pub mod auth;
pub mod card;
pub mod error;
pub mod intake;
pub mod models;
pub mod ocr;
pub mod pipeline;

pub use auth::{AccessGate, Admission, IdentityProvider, StaticIdentity};
pub use card::{CardExtractor, CardParser, DocumentCheck, ExtractionResult, RuleCardParser};
pub use error::{AuthError, CardexError, RecognitionError, Rejection, Result};
pub use intake::{Session, Validator};
pub use models::config::CardexConfig;
pub use models::input::{PairedText, RecognitionResult, Slot, UploadCandidate, ValidatedInput, Verdict};
pub use models::record::{ExtractedRecord, Field, Gender, NOT_FOUND};
pub use ocr::{RecognitionAdapter, Recognizer};
#[cfg(feature = "native")]
pub use ocr::PureOcrRecognizer;
pub use pipeline::Pipeline;
