//! Concurrent recognition of the front and back images.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{CardexError, RecognitionError};
use crate::models::config::RecognitionConfig;
use crate::models::input::{PairedText, RecognitionResult, Slot, ValidatedInput};

use super::Recognizer;

/// Runs the recognizer over both inputs and joins the results by slot.
pub struct RecognitionAdapter<R: Recognizer> {
    recognizer: R,
    language: String,
    timeout: Option<Duration>,
}

impl<R: Recognizer> RecognitionAdapter<R> {
    /// Create an adapter with the default language hint and deadline.
    pub fn new(recognizer: R) -> Self {
        Self::from_config(recognizer, &RecognitionConfig::default())
    }

    /// Create an adapter from configuration.
    pub fn from_config(recognizer: R, config: &RecognitionConfig) -> Self {
        Self {
            recognizer,
            language: config.language.clone(),
            timeout: config.timeout(),
        }
    }

    /// Set the language hint.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the deadline for the whole join. `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// Recognize the front and back inputs.
    ///
    /// Fails with [`CardexError::IncompleteInput`] before calling the
    /// recognizer unless both slots are present. Any single failure fails
    /// the whole operation.
    pub async fn recognize_pair(
        &self,
        inputs: &[ValidatedInput],
    ) -> Result<PairedText, CardexError> {
        let front = find_slot(inputs, Slot::Front);
        let back = find_slot(inputs, Slot::Back);

        let (Some(front), Some(back)) = (front, back) else {
            return Err(CardexError::IncompleteInput {
                accepted: inputs.len(),
            });
        };

        let start = Instant::now();
        info!(
            "Recognizing {} and {} (language: {})",
            front.candidate.name, back.candidate.name, self.language
        );

        let join = async {
            tokio::try_join!(self.recognize_one(front), self.recognize_one(back))
        };

        let (front, back) = match self.timeout {
            Some(deadline) => tokio::time::timeout(deadline, join).await.map_err(|_| {
                warn!("Recognition abandoned after {:?}", deadline);
                CardexError::RecognitionTimedOut { after: deadline }
            })??,
            None => join.await?,
        };

        debug!("Recognition finished in {}ms", start.elapsed().as_millis());

        Ok(PairedText { front, back })
    }

    async fn recognize_one(
        &self,
        input: &ValidatedInput,
    ) -> Result<RecognitionResult, RecognitionError> {
        let text = self
            .recognizer
            .recognize(input.candidate.data.clone(), &self.language)
            .await
            .inspect_err(|e| warn!("Recognition of {} image failed: {}", input.slot, e))?;

        debug!("{} image produced {} characters", input.slot, text.len());

        Ok(RecognitionResult {
            slot: input.slot,
            text,
        })
    }
}

fn find_slot(inputs: &[ValidatedInput], slot: Slot) -> Option<&ValidatedInput> {
    inputs.iter().find(|i| i.slot == slot)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use bytes::Bytes;

    use super::*;
    use crate::models::input::UploadCandidate;

    /// Echoes the image bytes back as text.
    #[derive(Default)]
    struct EchoRecognizer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Recognizer for EchoRecognizer {
        async fn recognize(&self, image: Bytes, _language: &str) -> Result<String, RecognitionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(String::from_utf8_lossy(&image).into_owned())
        }
    }

    /// Fails for images whose bytes read "bad"; never resolves for "hang".
    struct PickyRecognizer;

    #[async_trait]
    impl Recognizer for PickyRecognizer {
        async fn recognize(&self, image: Bytes, _language: &str) -> Result<String, RecognitionError> {
            match &image[..] {
                b"bad" => Err(RecognitionError::Engine("unreadable".into())),
                b"hang" => std::future::pending().await,
                other => Ok(String::from_utf8_lossy(other).into_owned()),
            }
        }
    }

    /// Records the language hint of every call.
    #[derive(Default)]
    struct HintRecorder {
        hints: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Recognizer for HintRecorder {
        async fn recognize(&self, _image: Bytes, language: &str) -> Result<String, RecognitionError> {
            self.hints.lock().unwrap().push(language.to_string());
            Ok(String::new())
        }
    }

    fn input(slot: Slot, text: &str) -> ValidatedInput {
        ValidatedInput {
            slot,
            candidate: UploadCandidate::new(format!("{slot}.png"), text.as_bytes().to_vec()),
        }
    }

    #[tokio::test]
    async fn test_joins_by_slot_not_order() {
        let adapter = RecognitionAdapter::new(EchoRecognizer::default());
        let inputs = [input(Slot::Back, "back text"), input(Slot::Front, "front text")];

        let pair = adapter.recognize_pair(&inputs).await.unwrap();
        assert_eq!(pair.front.text, "front text");
        assert_eq!(pair.back.text, "back text");
        assert_eq!(pair.corpus(), "front text\nback text");
    }

    #[tokio::test]
    async fn test_incomplete_input_never_calls_recognizer() {
        let adapter = RecognitionAdapter::new(EchoRecognizer::default());

        let err = adapter
            .recognize_pair(&[input(Slot::Front, "x")])
            .await
            .unwrap_err();
        assert!(matches!(err, CardexError::IncompleteInput { accepted: 1 }));

        let err = adapter.recognize_pair(&[]).await.unwrap_err();
        assert!(matches!(err, CardexError::IncompleteInput { accepted: 0 }));

        assert_eq!(adapter.recognizer().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_single_failure_fails_whole_join() {
        let adapter = RecognitionAdapter::new(PickyRecognizer);
        let inputs = [input(Slot::Front, "fine"), input(Slot::Back, "bad")];

        let err = adapter.recognize_pair(&inputs).await.unwrap_err();
        assert!(matches!(err, CardexError::RecognitionFailed(RecognitionError::Engine(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_at_deadline() {
        let deadline = Duration::from_secs(30);
        let adapter = RecognitionAdapter::new(PickyRecognizer).with_timeout(Some(deadline));
        let inputs = [input(Slot::Front, "fine"), input(Slot::Back, "hang")];

        let started = tokio::time::Instant::now();
        let err = adapter.recognize_pair(&inputs).await.unwrap_err();

        assert!(matches!(err, CardexError::RecognitionTimedOut { after } if after == deadline));
        assert!(started.elapsed() >= deadline);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_timeout_variant_waits() {
        let adapter = RecognitionAdapter::new(PickyRecognizer).with_timeout(None);
        let inputs = [input(Slot::Front, "fine"), input(Slot::Back, "hang")];

        let pending = adapter.recognize_pair(&inputs);
        let outcome = tokio::time::timeout(Duration::from_secs(3600), pending).await;
        assert!(outcome.is_err(), "join without deadline should still be pending");
    }

    #[tokio::test]
    async fn test_language_hint_reaches_every_call() {
        let adapter = RecognitionAdapter::new(HintRecorder::default()).with_language("eng+hin");
        let inputs = [input(Slot::Front, "a"), input(Slot::Back, "b")];

        adapter.recognize_pair(&inputs).await.unwrap();

        assert_eq!(*adapter.recognizer().hints.lock().unwrap(), ["eng+hin", "eng+hin"]);
    }

    #[tokio::test]
    async fn test_language_hint_from_config() {
        let config = RecognitionConfig {
            language: "eng+hin".to_string(),
            ..RecognitionConfig::default()
        };
        let adapter = RecognitionAdapter::from_config(HintRecorder::default(), &config);
        let inputs = [input(Slot::Front, "a"), input(Slot::Back, "b")];

        adapter.recognize_pair(&inputs).await.unwrap();

        let hints = adapter.recognizer().hints.lock().unwrap();
        assert_eq!(hints.len(), 2);
        assert!(hints.iter().all(|h| h == "eng+hin"));
        drop(hints);

        let default_adapter = RecognitionAdapter::new(HintRecorder::default());
        default_adapter.recognize_pair(&inputs).await.unwrap();
        assert_eq!(*default_adapter.recognizer().hints.lock().unwrap(), ["eng", "eng"]);
    }
}
