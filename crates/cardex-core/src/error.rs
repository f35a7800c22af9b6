//! Error types for the cardex-core library.

use std::time::Duration;

use thiserror::Error;

use crate::models::input::Verdict;

/// Main error type for the cardex library.
#[derive(Error, Debug)]
pub enum CardexError {
    /// A candidate file failed validation.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// Fewer than two inputs were accepted when a run was requested.
    #[error("Please upload both front and back images of the card.")]
    IncompleteInput { accepted: usize },

    /// The text recognition service failed for at least one image.
    #[error("recognition failed: {0}")]
    RecognitionFailed(#[from] RecognitionError),

    /// The recognition join did not finish before the deadline.
    #[error("Processing took too long. Please try again.")]
    RecognitionTimedOut { after: Duration },

    /// The document pre-check rejected at least one slot.
    #[error("document check failed: {}", describe_verdicts(.verdicts))]
    DocumentMismatch { verdicts: Vec<Verdict> },

    /// A run was requested while another one is still active.
    #[error("a run is already in progress")]
    RunInProgress,

    /// A run outcome was reported while no run was active.
    #[error("no run is in progress")]
    RunNotStarted,

    /// Access was not granted by the identity provider.
    #[error("access denied: {0}")]
    Auth(#[from] AuthError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed or written.
    #[error("configuration error: {0}")]
    Config(String),
}

impl CardexError {
    /// Message suitable for showing to the person operating the form.
    pub fn user_message(&self) -> String {
        match self {
            Self::RecognitionFailed(_) => {
                "An error occurred while processing the images.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Whether the caller should offer to run recognition again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RecognitionFailed(_) | Self::RecognitionTimedOut { .. }
        )
    }

    /// Verdicts carried by a document mismatch, if any.
    pub fn verdicts(&self) -> &[Verdict] {
        match self {
            Self::DocumentMismatch { verdicts } => verdicts,
            _ => &[],
        }
    }
}

fn describe_verdicts(verdicts: &[Verdict]) -> String {
    verdicts
        .iter()
        .filter(|v| !v.passed)
        .map(|v| format!("{}: {}", v.slot, v.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Whole mebibytes as "N MB", anything else in bytes.
fn describe_limit(bytes: &u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if *bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Reasons a candidate file is refused by the validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Extension missing or not in the allowed set.
    #[error("Invalid file type. Only {} are allowed.", .allowed.join(", "))]
    InvalidFileType { allowed: Vec<String> },

    /// Declared size above the ceiling.
    #[error("File size exceeds the limit of {}.", describe_limit(.limit_bytes))]
    FileTooLarge { limit_bytes: u64 },

    /// The accepted set (or the requested slot) is already full.
    #[error("You can only upload two images (front and back of the card).")]
    CapacityReached,
}

/// Errors reported by a text recognition service.
#[derive(Error, Debug)]
pub enum RecognitionError {
    /// Failed to load recognition models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The image bytes could not be decoded.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The engine itself failed.
    #[error("engine failure: {0}")]
    Engine(String),

    /// The engine worker is gone.
    #[error("recognition worker unavailable")]
    WorkerGone,
}

/// Errors from the access gate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The user is not signed in.
    #[error("login required, continue at {redirect}")]
    LoginRequired { redirect: String },

    /// Silent token acquisition failed.
    #[error("could not obtain access token: {0}")]
    Token(String),
}

/// Result type for the cardex library.
pub type Result<T> = std::result::Result<T, CardexError>;
