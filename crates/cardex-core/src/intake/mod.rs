//! Upload validation and the per-form session state.

mod session;

pub use session::Session;

use tracing::debug;

use crate::error::Rejection;
use crate::models::config::IntakeConfig;
use crate::models::input::UploadCandidate;

/// Maximum number of accepted inputs (front and back).
pub const MAX_INPUTS: usize = 2;

/// Checks candidates against type, size and capacity rules.
#[derive(Debug, Clone)]
pub struct Validator {
    allowed_extensions: Vec<String>,
    max_file_size: u64,
}

impl Validator {
    /// Create a validator with the default rules.
    pub fn new() -> Self {
        Self::from_config(&IntakeConfig::default())
    }

    /// Create a validator from configuration.
    pub fn from_config(config: &IntakeConfig) -> Self {
        Self {
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|e| e.to_uppercase())
                .collect(),
            max_file_size: config.max_file_size,
        }
    }

    /// Set the size ceiling in bytes.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    /// Validate a candidate given how many inputs are already accepted.
    ///
    /// Rules run in order (extension, size, capacity); the first failure is
    /// returned.
    pub fn validate(
        &self,
        candidate: &UploadCandidate,
        accepted: usize,
    ) -> Result<(), Rejection> {
        let allowed = candidate
            .extension()
            .is_some_and(|ext| self.allowed_extensions.contains(&ext));
        if !allowed {
            debug!("Rejected {}: unsupported extension", candidate.name);
            return Err(Rejection::InvalidFileType {
                allowed: self.allowed_extensions.clone(),
            });
        }

        if candidate.size > self.max_file_size {
            debug!(
                "Rejected {}: {} bytes exceeds {}",
                candidate.name, candidate.size, self.max_file_size
            );
            return Err(Rejection::FileTooLarge {
                limit_bytes: self.max_file_size,
            });
        }

        if accepted >= MAX_INPUTS {
            debug!("Rejected {}: already holding {} inputs", candidate.name, accepted);
            return Err(Rejection::CapacityReached);
        }

        Ok(())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
