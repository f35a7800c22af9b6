//! Configuration structures for the card pipeline.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CardexError, Result};
use crate::models::input::Slot;

/// Main configuration for the cardex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CardexConfig {
    /// Upload validation configuration.
    pub intake: IntakeConfig,

    /// Text recognition configuration.
    pub recognition: RecognitionConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Document pre-check configuration.
    pub precheck: PrecheckConfig,

    /// Access gate configuration.
    pub auth: AuthConfig,
}

/// Upload validation rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Allowed extensions, upper-case, in the order they are reported.
    pub allowed_extensions: Vec<String>,

    /// Largest accepted declared size in bytes.
    pub max_file_size: u64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: ["JPG", "PNG", "GIF", "JPEG"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_file_size: 5 * 1024 * 1024,
        }
    }
}

/// Text recognition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Language hint passed to the recognizer (e.g. "eng" or "eng+hin").
    pub language: String,

    /// Deadline for recognizing both images, in seconds. `None` waits
    /// indefinitely.
    pub timeout_secs: Option<u64>,

    /// Directory containing the recognition models.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            timeout_secs: Some(30),
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

impl RecognitionConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Which part of the address match is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressSpan {
    /// The whole match, label included (observed behavior).
    #[default]
    Matched,
    /// Only the text after the label, through the postal code.
    Body,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Portion of the address match to keep.
    pub address_span: AddressSpan,
}

/// Keyword sets for the document pre-check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecheckConfig {
    /// Run the pre-check before extraction.
    pub enabled: bool,

    /// Terms expected on either side of the card.
    pub common_keywords: Vec<String>,

    /// Terms expected on the front.
    pub front_keywords: Vec<String>,

    /// Terms expected on the back.
    pub back_keywords: Vec<String>,
}

impl Default for PrecheckConfig {
    fn default() -> Self {
        fn words(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }

        Self {
            enabled: false,
            common_keywords: words(&[
                "government of india",
                "aadhaar",
                "unique identification authority",
                "uidai",
            ]),
            front_keywords: words(&["dob", "date of birth", "year of birth", "male", "female"]),
            back_keywords: words(&["address", "pincode", "pin code"]),
        }
    }
}

impl PrecheckConfig {
    pub fn keywords_for(&self, slot: Slot) -> &[String] {
        match slot {
            Slot::Front => &self.front_keywords,
            Slot::Back => &self.back_keywords,
        }
    }
}

/// Signed-in profile used by the static identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Access gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Refuse to open a session without a signed-in user.
    pub required: bool,

    /// Where an unauthenticated user is sent to sign in.
    pub login_url: String,

    /// Signed-in user, if any.
    pub user: Option<UserProfile>,

    /// Access token issued to the signed-in user.
    pub access_token: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            required: false,
            login_url: "https://login.example.com/authorize".to_string(),
            user: None,
            access_token: None,
        }
    }
}

impl CardexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| CardexError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| CardexError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
