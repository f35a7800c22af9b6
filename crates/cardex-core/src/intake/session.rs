//! Form session state with explicit transitions.

use tracing::{debug, info, warn};

use crate::error::{CardexError, Rejection};
use crate::models::input::{Slot, UploadCandidate, ValidatedInput, Verdict};
use crate::models::record::ExtractedRecord;

use super::{Validator, MAX_INPUTS};

/// State owned by one upload form.
///
/// Only one run may be active at a time; callers serialize runs by
/// checking [`Session::is_loading`] or handling [`CardexError::RunInProgress`].
#[derive(Debug, Default)]
pub struct Session {
    validator: Validator,
    accepted: Vec<ValidatedInput>,
    error: Option<String>,
    record: Option<ExtractedRecord>,
    loading: bool,
    retry_available: bool,
    verdicts: Vec<Verdict>,
}

impl Session {
    /// Create a session with the default validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with a specific validator.
    pub fn with_validator(validator: Validator) -> Self {
        Self {
            validator,
            ..Self::default()
        }
    }

    /// Offer a candidate; it takes the first vacant slot (front, then back).
    pub fn submit_candidate(&mut self, candidate: UploadCandidate) -> Result<Slot, Rejection> {
        self.accept(candidate, None)
    }

    /// Offer a candidate for a specific slot.
    pub fn submit_to_slot(
        &mut self,
        candidate: UploadCandidate,
        slot: Slot,
    ) -> Result<Slot, Rejection> {
        self.accept(candidate, Some(slot))
    }

    fn accept(
        &mut self,
        candidate: UploadCandidate,
        requested: Option<Slot>,
    ) -> Result<Slot, Rejection> {
        self.error = None;

        let outcome = self
            .validator
            .validate(&candidate, self.accepted.len())
            .and_then(|()| match requested {
                Some(slot) if self.slot_taken(slot) => Err(Rejection::CapacityReached),
                Some(slot) => Ok(slot),
                None => self.vacant_slot().ok_or(Rejection::CapacityReached),
            });

        match outcome {
            Ok(slot) => {
                debug!("Accepted {} as {} image", candidate.name, slot);
                self.accepted.push(ValidatedInput { slot, candidate });
                Ok(slot)
            }
            Err(rejection) => {
                self.error = Some(rejection.to_string());
                Err(rejection)
            }
        }
    }

    fn slot_taken(&self, slot: Slot) -> bool {
        self.accepted.iter().any(|i| i.slot == slot)
    }

    fn vacant_slot(&self) -> Option<Slot> {
        Slot::ALL.into_iter().find(|s| !self.slot_taken(*s))
    }

    /// Remove the accepted input at `index`. Nothing else changes.
    pub fn remove_input(&mut self, index: usize) -> Option<ValidatedInput> {
        (index < self.accepted.len()).then(|| self.accepted.remove(index))
    }

    /// Begin a run, handing out the accepted inputs.
    pub fn start_run(&mut self) -> Result<Vec<ValidatedInput>, CardexError> {
        if self.loading {
            return Err(CardexError::RunInProgress);
        }

        if self.accepted.len() < MAX_INPUTS {
            let err = CardexError::IncompleteInput {
                accepted: self.accepted.len(),
            };
            self.error = Some(err.user_message());
            return Err(err);
        }

        self.loading = true;
        self.error = None;
        self.retry_available = false;
        info!("Starting run over {} inputs", self.accepted.len());

        Ok(self.accepted.clone())
    }

    /// Finish a run successfully. The record replaces any previous one and
    /// the accepted inputs are discarded.
    pub fn complete_run(
        &mut self,
        record: ExtractedRecord,
        verdicts: Vec<Verdict>,
    ) -> Result<(), CardexError> {
        self.ensure_running()?;
        self.loading = false;
        self.error = None;
        self.retry_available = false;
        self.record = Some(record);
        self.verdicts = verdicts;
        self.accepted.clear();
        Ok(())
    }

    /// Finish a run with an error.
    pub fn fail_run(&mut self, err: &CardexError) -> Result<(), CardexError> {
        self.ensure_running()?;
        self.loading = false;
        self.error = Some(err.user_message());
        self.retry_available = err.is_retryable();
        self.verdicts = err.verdicts().to_vec();
        Ok(())
    }

    /// Release a run that ended without an outcome. The inputs are kept and
    /// a retry is offered. Does nothing when no run is active.
    pub fn abandon_run(&mut self) {
        if self.loading {
            warn!("Run abandoned before it finished");
            self.loading = false;
            self.retry_available = true;
        }
    }

    fn ensure_running(&self) -> Result<(), CardexError> {
        if self.loading {
            Ok(())
        } else {
            Err(CardexError::RunNotStarted)
        }
    }

    pub fn accepted(&self) -> &[ValidatedInput] {
        &self.accepted
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn record(&self) -> Option<&ExtractedRecord> {
        self.record.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn retry_available(&self) -> bool {
        self.retry_available
    }

    pub fn verdicts(&self) -> &[Verdict] {
        &self.verdicts
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecognitionError;
    use pretty_assertions::assert_eq;

    fn names(session: &Session) -> Vec<&str> {
        session.accepted().iter().map(|i| i.candidate.name.as_str()).collect()
    }

    #[test]
    fn test_slots_assigned_in_order() {
        let mut session = Session::new();
        assert_eq!(session.submit_candidate(UploadCandidate::declared("f.jpg", 1)), Ok(Slot::Front));
        assert_eq!(session.submit_candidate(UploadCandidate::declared("b.jpg", 1)), Ok(Slot::Back));
    }

    #[test]
    fn test_third_candidate_rejected_and_set_unchanged() {
        let mut session = Session::new();
        session.submit_candidate(UploadCandidate::declared("f.jpg", 1)).unwrap();
        session.submit_candidate(UploadCandidate::declared("b.jpg", 1)).unwrap();

        let err = session
            .submit_candidate(UploadCandidate::declared("c.jpg", 1))
            .unwrap_err();
        assert_eq!(err, Rejection::CapacityReached);
        assert_eq!(names(&session), vec!["f.jpg", "b.jpg"]);
        assert_eq!(
            session.error(),
            Some("You can only upload two images (front and back of the card).")
        );
    }

    #[test]
    fn test_invalid_type_leaves_set_unchanged() {
        let mut session = Session::new();
        session.submit_candidate(UploadCandidate::declared("f.jpg", 1)).unwrap();
        assert!(session.submit_candidate(UploadCandidate::declared("doc.pdf", 1)).is_err());
        assert_eq!(names(&session), vec!["f.jpg"]);
        assert!(session.error().unwrap().starts_with("Invalid file type"));
    }

    #[test]
    fn test_only_latest_error_visible() {
        let mut session = Session::new();
        session.submit_candidate(UploadCandidate::declared("doc.pdf", 1)).unwrap_err();
        session
            .submit_candidate(UploadCandidate::declared("big.jpg", 6 * 1024 * 1024))
            .unwrap_err();
        assert_eq!(session.error(), Some("File size exceeds the limit of 5 MB."));

        session.submit_candidate(UploadCandidate::declared("ok.jpg", 1)).unwrap();
        assert_eq!(session.error(), None);
    }

    #[test]
    fn test_duplicates_permitted() {
        let mut session = Session::new();
        let file = UploadCandidate::new("same.png", vec![1u8, 2, 3]);
        session.submit_candidate(file.clone()).unwrap();
        session.submit_candidate(file).unwrap();
        assert_eq!(session.accepted().len(), 2);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut session = Session::new();
        session.submit_candidate(UploadCandidate::declared("f.jpg", 1)).unwrap();
        session.submit_candidate(UploadCandidate::declared("b.jpg", 1)).unwrap();

        let removed = session.remove_input(0).unwrap();
        assert_eq!(removed.candidate.name, "f.jpg");
        assert_eq!(names(&session), vec!["b.jpg"]);
        assert_eq!(session.accepted()[0].slot, Slot::Back);

        // The vacated front slot is filled next.
        assert_eq!(session.submit_candidate(UploadCandidate::declared("f2.jpg", 1)), Ok(Slot::Front));
        assert!(session.remove_input(5).is_none());
        assert_eq!(session.accepted().len(), 2);
    }

    #[test]
    fn test_remove_does_not_touch_error() {
        let mut session = Session::new();
        session.submit_candidate(UploadCandidate::declared("f.jpg", 1)).unwrap();
        session.submit_candidate(UploadCandidate::declared("x.pdf", 1)).unwrap_err();
        session.remove_input(0);
        assert!(session.error().is_some());
    }

    #[test]
    fn test_submit_to_occupied_slot() {
        let mut session = Session::new();
        session.submit_to_slot(UploadCandidate::declared("b.jpg", 1), Slot::Back).unwrap();
        assert_eq!(
            session.submit_to_slot(UploadCandidate::declared("b2.jpg", 1), Slot::Back),
            Err(Rejection::CapacityReached)
        );
        assert_eq!(session.submit_candidate(UploadCandidate::declared("f.jpg", 1)), Ok(Slot::Front));
    }

    #[test]
    fn test_start_run_requires_two_inputs() {
        let mut session = Session::new();
        session.submit_candidate(UploadCandidate::declared("f.jpg", 1)).unwrap();

        let err = session.start_run().unwrap_err();
        assert!(matches!(err, CardexError::IncompleteInput { accepted: 1 }));
        assert!(!session.is_loading());
        assert_eq!(
            session.error(),
            Some("Please upload both front and back images of the card.")
        );
    }

    #[test]
    fn test_run_lifecycle() {
        let mut session = Session::new();
        session.submit_candidate(UploadCandidate::declared("f.jpg", 1)).unwrap();
        session.submit_candidate(UploadCandidate::declared("b.jpg", 1)).unwrap();

        let inputs = session.start_run().unwrap();
        assert_eq!(inputs.len(), 2);
        assert!(session.is_loading());
        assert!(matches!(session.start_run(), Err(CardexError::RunInProgress)));

        let err = CardexError::from(RecognitionError::Engine("ocr crashed".into()));
        session.fail_run(&err).unwrap();
        assert!(!session.is_loading());
        assert!(session.retry_available());
        assert_eq!(session.accepted().len(), 2);

        session.start_run().unwrap();
        assert!(!session.retry_available());
        session.complete_run(ExtractedRecord::not_found(), Vec::new()).unwrap();
        assert!(!session.is_loading());
        assert!(session.accepted().is_empty());
        assert_eq!(session.record(), Some(&ExtractedRecord::not_found()));
    }

    #[test]
    fn test_outcome_requires_active_run() {
        let mut session = Session::new();

        assert!(matches!(
            session.complete_run(ExtractedRecord::not_found(), Vec::new()),
            Err(CardexError::RunNotStarted)
        ));
        assert!(session.record().is_none());

        let err = CardexError::from(RecognitionError::Engine("late".into()));
        assert!(matches!(session.fail_run(&err), Err(CardexError::RunNotStarted)));
        assert_eq!(session.error(), None);
        assert!(!session.retry_available());
    }

    #[test]
    fn test_outcome_accepted_once_per_run() {
        let mut session = Session::new();
        session.submit_candidate(UploadCandidate::declared("f.jpg", 1)).unwrap();
        session.submit_candidate(UploadCandidate::declared("b.jpg", 1)).unwrap();
        session.start_run().unwrap();

        session.complete_run(ExtractedRecord::not_found(), Vec::new()).unwrap();
        assert!(matches!(
            session.complete_run(ExtractedRecord::default(), Vec::new()),
            Err(CardexError::RunNotStarted)
        ));
    }

    #[test]
    fn test_abandon_keeps_inputs_for_retry() {
        let mut session = Session::new();
        session.abandon_run();
        assert!(!session.retry_available());

        session.submit_candidate(UploadCandidate::declared("f.jpg", 1)).unwrap();
        session.submit_candidate(UploadCandidate::declared("b.jpg", 1)).unwrap();
        session.start_run().unwrap();
        session.abandon_run();

        assert!(!session.is_loading());
        assert!(session.retry_available());
        assert_eq!(session.accepted().len(), 2);
        assert!(session.start_run().is_ok());
    }
}
