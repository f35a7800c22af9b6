//! WASM bindings for identity card field extraction.
//!
//! Recognition runs in the browser; these bindings own the upload form
//! state and turn recognized text into a record.

use wasm_bindgen::prelude::*;

use cardex_core::card::{CardExtractor, CardParser, DocumentCheck, RuleCardParser};
use cardex_core::models::config::AddressSpan;
use cardex_core::{
    CardexError, ExtractedRecord, PairedText, RecognitionError, RecognitionResult, Session, Slot,
    UploadCandidate,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_error(err: &CardexError) -> JsValue {
    JsValue::from_str(&err.user_message())
}

fn paired(front: &str, back: &str) -> PairedText {
    PairedText {
        front: RecognitionResult { slot: Slot::Front, text: front.to_string() },
        back: RecognitionResult { slot: Slot::Back, text: back.to_string() },
    }
}

/// Declared sizes come from JS numbers; only finite, non-negative ones are
/// meaningful.
fn declared_size(size: f64) -> Result<u64, JsValue> {
    if size.is_finite() && size >= 0.0 {
        Ok(size as u64)
    } else {
        Err(JsValue::from_str(&format!("Invalid file size: {}", size)))
    }
}

fn parse_slot(slot: &str) -> Result<Slot, JsValue> {
    match slot.to_ascii_lowercase().as_str() {
        "front" => Ok(Slot::Front),
        "back" => Ok(Slot::Back),
        other => Err(JsValue::from_str(&format!("Unknown slot: {}", other))),
    }
}

/// Extract a record from recognized text.
///
/// Takes the front text and the back text and returns an object with
/// `idNumber`, `name`, `dateOfBirth`, `gender`, `address` and `postalCode`.
#[wasm_bindgen]
pub fn extract_fields(front: &str, back: &str) -> Result<JsValue, JsValue> {
    to_js(&RuleCardParser::new().extract(&paired(front, back)))
}

/// Run the keyword pre-check and return one verdict per side.
#[wasm_bindgen]
pub fn precheck(front: &str, back: &str) -> Result<JsValue, JsValue> {
    let check = DocumentCheck::new();
    let text = paired(front, back);
    let verdicts: Vec<_> = Slot::ALL
        .into_iter()
        .map(|slot| check.check_slot(slot, text.text(slot)))
        .collect();
    to_js(&verdicts)
}

/// Field extractor class for browser use.
#[wasm_bindgen]
pub struct CardFieldExtractor {
    parser: RuleCardParser,
}

#[wasm_bindgen]
impl CardFieldExtractor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            parser: RuleCardParser::new(),
        }
    }

    /// Report only the text after "Address:" instead of the whole match.
    #[wasm_bindgen]
    pub fn set_address_body_only(&mut self, body_only: bool) {
        let span = if body_only { AddressSpan::Body } else { AddressSpan::Matched };
        self.parser = RuleCardParser::new().with_address_span(span);
    }

    /// Extract a record from a single corpus.
    #[wasm_bindgen]
    pub fn extract(&self, corpus: &str) -> Result<JsValue, JsValue> {
        to_js(&self.parser.parse(corpus).record)
    }

    /// Extract a record along with warnings and timing.
    #[wasm_bindgen]
    pub fn extract_with_metadata(&self, corpus: &str) -> Result<JsValue, JsValue> {
        let result = self.parser.parse(corpus);

        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct ExtractResult {
            record: ExtractedRecord,
            raw_text: String,
            warnings: Vec<String>,
            processing_time_ms: u64,
        }

        to_js(&ExtractResult {
            record: result.record,
            raw_text: result.raw_text,
            warnings: result.warnings,
            processing_time_ms: result.processing_time_ms,
        })
    }
}

impl Default for CardFieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Upload form state: two image slots, a loading flag, the last error and
/// the last record.
#[wasm_bindgen]
pub struct UploadForm {
    session: Session,
    parser: RuleCardParser,
    check: Option<DocumentCheck>,
}

#[wasm_bindgen]
impl UploadForm {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            session: Session::new(),
            parser: RuleCardParser::new(),
            check: None,
        }
    }

    /// Require each side's text to pass the keyword pre-check.
    #[wasm_bindgen]
    pub fn enable_precheck(&mut self) {
        self.check = Some(DocumentCheck::new());
    }

    /// Offer a file by name and size. Returns the slot it was placed in.
    #[wasm_bindgen]
    pub fn submit(&mut self, name: &str, size: f64) -> Result<String, JsValue> {
        let candidate = UploadCandidate::declared(name, declared_size(size)?);
        self.session
            .submit_candidate(candidate)
            .map(|slot| slot.to_string())
            .map_err(|e| {
                web_sys::console::warn_1(&JsValue::from_str(&e.to_string()));
                JsValue::from_str(&e.to_string())
            })
    }

    /// Offer a file for an explicit slot ("front" or "back").
    #[wasm_bindgen]
    pub fn submit_to(&mut self, name: &str, size: f64, slot: &str) -> Result<String, JsValue> {
        let slot = parse_slot(slot)?;
        let candidate = UploadCandidate::declared(name, declared_size(size)?);
        self.session
            .submit_to_slot(candidate, slot)
            .map(|slot| slot.to_string())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Remove the accepted file at `index`.
    #[wasm_bindgen]
    pub fn remove(&mut self, index: usize) -> bool {
        self.session.remove_input(index).is_some()
    }

    /// Names of the accepted files, in acceptance order.
    #[wasm_bindgen]
    pub fn accepted_names(&self) -> js_sys::Array {
        self.session
            .accepted()
            .iter()
            .map(|input| JsValue::from_str(&input.candidate.name))
            .collect()
    }

    /// Mark the form as processing. Fails unless both sides are present.
    #[wasm_bindgen]
    pub fn begin_run(&mut self) -> Result<(), JsValue> {
        self.session
            .start_run()
            .map(|_| ())
            .map_err(|e| JsValue::from_str(&e.user_message()))
    }

    /// Finish a run with the text recognized for each side. Fails unless
    /// `begin_run` succeeded first.
    #[wasm_bindgen]
    pub fn finish_run(&mut self, front: &str, back: &str) -> Result<JsValue, JsValue> {
        if !self.session.is_loading() {
            return Err(js_error(&CardexError::RunNotStarted));
        }

        let text = paired(front, back);

        let verdicts = match &self.check {
            Some(check) => match check.check(&text) {
                Ok(verdicts) => verdicts,
                Err(e) => {
                    self.session.fail_run(&e).map_err(|e| js_error(&e))?;
                    return Err(JsValue::from_str(&e.user_message()));
                }
            },
            None => Vec::new(),
        };

        let record = self.parser.parse(&text.corpus()).record;
        self.session
            .complete_run(record.clone(), verdicts)
            .map_err(|e| js_error(&e))?;
        to_js(&record)
    }

    /// Finish a run whose recognition failed.
    #[wasm_bindgen]
    pub fn fail_run(&mut self, reason: &str) -> Result<(), JsValue> {
        let err = CardexError::RecognitionFailed(RecognitionError::Engine(reason.to_string()));
        self.session.fail_run(&err).map_err(|e| js_error(&e))
    }

    /// Finish a run whose recognition exceeded its deadline.
    #[wasm_bindgen]
    pub fn time_out(&mut self, after_ms: f64) -> Result<(), JsValue> {
        let err = CardexError::RecognitionTimedOut {
            after: std::time::Duration::from_millis(declared_size(after_ms)?),
        };
        self.session.fail_run(&err).map_err(|e| js_error(&e))
    }

    #[wasm_bindgen(getter)]
    pub fn count(&self) -> usize {
        self.session.accepted().len()
    }

    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.session.error().map(str::to_string)
    }

    #[wasm_bindgen(getter)]
    pub fn loading(&self) -> bool {
        self.session.is_loading()
    }

    #[wasm_bindgen(getter)]
    pub fn retry_available(&self) -> bool {
        self.session.retry_available()
    }

    /// Last record, or `undefined` before the first successful run.
    #[wasm_bindgen]
    pub fn record(&self) -> Result<JsValue, JsValue> {
        match self.session.record() {
            Some(record) => to_js(record),
            None => Ok(JsValue::UNDEFINED),
        }
    }
}

impl Default for UploadForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const FRONT: &str = "Government of India\nJohn Doe\nDOB: 01/01/1990\nMALE\n1234 5678 9101";
    const BACK: &str = "UIDAI\nAddress: 123 Road 560001";

    #[wasm_bindgen_test]
    fn test_form_accepts_two_images() {
        let mut form = UploadForm::new();
        assert_eq!(form.submit("front.jpg", 1024.0).unwrap(), "front");
        assert_eq!(form.submit("back.png", 2048.0).unwrap(), "back");
        assert!(form.submit("extra.gif", 10.0).is_err());
        assert_eq!(form.count(), 2);
        assert!(form.error().is_some());
    }

    #[wasm_bindgen_test]
    fn test_form_rejects_large_file() {
        let mut form = UploadForm::new();
        assert!(form.submit("big.jpg", (5 * 1024 * 1024 + 1) as f64).is_err());
        assert_eq!(form.count(), 0);
    }

    #[wasm_bindgen_test]
    fn test_begin_run_needs_both_sides() {
        let mut form = UploadForm::new();
        form.submit("front.jpg", 10.0).unwrap();
        assert!(form.begin_run().is_err());
        assert!(!form.loading());
    }

    #[wasm_bindgen_test]
    fn test_run_cycle() {
        let mut form = UploadForm::new();
        form.submit("front.jpg", 10.0).unwrap();
        form.submit("back.jpg", 10.0).unwrap();
        form.begin_run().unwrap();
        assert!(form.loading());

        form.time_out(30_000.0).unwrap();
        assert!(form.retry_available());
        assert!(!form.loading());

        form.begin_run().unwrap();
        assert!(form.finish_run(FRONT, BACK).is_ok());
        assert_eq!(form.count(), 0);
        assert!(!form.retry_available());
    }

    #[wasm_bindgen_test]
    fn test_precheck_failure_is_not_retryable() {
        let mut form = UploadForm::new();
        form.enable_precheck();
        form.submit("front.jpg", 10.0).unwrap();
        form.submit("back.jpg", 10.0).unwrap();
        form.begin_run().unwrap();

        assert!(form.finish_run(BACK, FRONT).is_err());
        assert!(!form.retry_available());
        assert!(form.record().unwrap().is_undefined());
    }

    #[wasm_bindgen_test]
    fn test_outcome_without_begin_run_is_refused() {
        let mut form = UploadForm::new();
        assert!(form.finish_run(FRONT, BACK).is_err());
        assert!(form.record().unwrap().is_undefined());
        assert!(form.fail_run("late").is_err());
        assert!(form.error().is_none());

        form.submit("front.jpg", 10.0).unwrap();
        form.submit("back.jpg", 10.0).unwrap();
        assert!(form.finish_run(FRONT, BACK).is_err());
        assert_eq!(form.count(), 2);
    }

    #[wasm_bindgen_test]
    fn test_invalid_declared_size_rejected() {
        let mut form = UploadForm::new();
        assert!(form.submit("nan.jpg", f64::NAN).is_err());
        assert!(form.submit("neg.jpg", -1.0).is_err());
        assert!(form.submit_to("inf.jpg", f64::INFINITY, "back").is_err());
        assert_eq!(form.count(), 0);
    }

    #[wasm_bindgen_test]
    fn test_declared_size_bounds() {
        assert_eq!(declared_size(0.0).ok(), Some(0));
        assert_eq!(declared_size(1024.0).ok(), Some(1024));
        assert!(declared_size(-0.5).is_err());
        assert!(declared_size(f64::NAN).is_err());
    }
}
