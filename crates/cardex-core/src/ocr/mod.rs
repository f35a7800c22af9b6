//! Text recognition: the external service seam and the paired adapter.

mod adapter;
#[cfg(feature = "native")]
mod pure_engine;

pub use adapter::RecognitionAdapter;
#[cfg(feature = "native")]
pub use pure_engine::PureOcrRecognizer;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::RecognitionError;

/// An external text-recognition service.
///
/// Implementations recognize a single image per call and report failure
/// without partial text.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Recognize the text in `image`.
    ///
    /// `language` is a hint such as `"eng"` or `"eng+hin"`.
    async fn recognize(&self, image: Bytes, language: &str) -> Result<String, RecognitionError>;
}

#[async_trait]
impl<R: Recognizer + ?Sized> Recognizer for Arc<R> {
    async fn recognize(&self, image: Bytes, language: &str) -> Result<String, RecognitionError> {
        (**self).recognize(image, language).await
    }
}
