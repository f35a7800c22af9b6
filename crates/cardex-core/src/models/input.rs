//! Inputs flowing through the pipeline: candidates, accepted inputs,
//! recognized text, and pre-check verdicts.

use std::fmt;
use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Logical role of an image on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Front,
    Back,
}

impl Slot {
    /// Both slots in corpus order.
    pub const ALL: [Slot; 2] = [Slot::Front, Slot::Back];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file offered by the upload widget, not yet validated.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    /// Declared file name.
    pub name: String,
    /// Declared size in bytes.
    pub size: u64,
    /// Raw file contents.
    pub data: Bytes,
}

impl UploadCandidate {
    /// Create a candidate whose declared size is the length of `data`.
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            size: data.len() as u64,
            data,
        }
    }

    /// Create a candidate with only metadata, as reported by a browser.
    pub fn declared(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            data: Bytes::new(),
        }
    }

    /// Read a candidate from disk.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(Self::new(name, data))
    }

    /// Extension after the last dot, upper-cased.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.name.rsplit_once('.')?;
        Some(ext.to_uppercase()).filter(|e| !e.is_empty())
    }
}

/// A candidate that passed validation, tagged with its slot.
#[derive(Debug, Clone)]
pub struct ValidatedInput {
    pub slot: Slot,
    pub candidate: UploadCandidate,
}

/// Raw text produced for one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub slot: Slot,
    pub text: String,
}

/// Recognized text for both sides of the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedText {
    pub front: RecognitionResult,
    pub back: RecognitionResult,
}

impl PairedText {
    /// Text for a given slot.
    pub fn text(&self, slot: Slot) -> &str {
        match slot {
            Slot::Front => &self.front.text,
            Slot::Back => &self.back.text,
        }
    }

    /// Front text followed by back text.
    pub fn corpus(&self) -> String {
        format!("{}\n{}", self.front.text, self.back.text)
    }
}

/// Advisory judgment from the document pre-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub slot: Slot,
    pub passed: bool,
    pub reason: String,
}

impl Verdict {
    pub fn pass(slot: Slot, reason: impl Into<String>) -> Self {
        Self {
            slot,
            passed: true,
            reason: reason.into(),
        }
    }

    pub fn fail(slot: Slot, reason: impl Into<String>) -> Self {
        Self {
            slot,
            passed: false,
            reason: reason.into(),
        }
    }
}
