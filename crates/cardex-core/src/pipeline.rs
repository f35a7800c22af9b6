//! End-to-end run: recognition, optional pre-check, extraction.

use tracing::{error, info};

use crate::card::{CardParser, DocumentCheck, RuleCardParser};
use crate::error::Result;
use crate::intake::Session;
use crate::models::config::CardexConfig;
use crate::models::input::{ValidatedInput, Verdict};
use crate::models::record::ExtractedRecord;
use crate::ocr::{RecognitionAdapter, Recognizer};

/// Drives one run over a [`Session`].
pub struct Pipeline<R: Recognizer> {
    adapter: RecognitionAdapter<R>,
    parser: RuleCardParser,
    precheck: Option<DocumentCheck>,
}

impl<R: Recognizer> Pipeline<R> {
    /// Create a pipeline with default settings and no pre-check.
    pub fn new(recognizer: R) -> Self {
        Self {
            adapter: RecognitionAdapter::new(recognizer),
            parser: RuleCardParser::new(),
            precheck: None,
        }
    }

    /// Create a pipeline from configuration.
    pub fn from_config(recognizer: R, config: &CardexConfig) -> Self {
        Self {
            adapter: RecognitionAdapter::from_config(recognizer, &config.recognition),
            parser: RuleCardParser::from_config(&config.extraction),
            precheck: config
                .precheck
                .enabled
                .then(|| DocumentCheck::from_config(&config.precheck)),
        }
    }

    /// Replace the recognition adapter settings.
    pub fn with_adapter(mut self, adapter: RecognitionAdapter<R>) -> Self {
        self.adapter = adapter;
        self
    }

    /// Enable the document pre-check.
    pub fn with_precheck(mut self, check: DocumentCheck) -> Self {
        self.precheck = Some(check);
        self
    }

    pub fn adapter(&self) -> &RecognitionAdapter<R> {
        &self.adapter
    }

    /// Run recognition and extraction for the session's accepted inputs.
    ///
    /// On success the record is stored in the session and returned. On
    /// failure the session records the error and the retry affordance; a
    /// retry is another call to `run`. Dropping the future mid-run releases
    /// the session with a retry offered.
    pub async fn run(&self, session: &mut Session) -> Result<ExtractedRecord> {
        let inputs = session.start_run()?;
        let mut run = ActiveRun { session };

        match self.execute(&inputs).await {
            Ok((record, verdicts)) => {
                info!("Run complete, {} fields missing", record.missing_fields().len());
                run.session.complete_run(record.clone(), verdicts)?;
                Ok(record)
            }
            Err(e) => {
                error!("Run failed: {}", e);
                run.session.fail_run(&e)?;
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        inputs: &[ValidatedInput],
    ) -> Result<(ExtractedRecord, Vec<Verdict>)> {
        let text = self.adapter.recognize_pair(inputs).await?;

        let verdicts = match &self.precheck {
            Some(check) => check.check(&text)?,
            None => Vec::new(),
        };

        let result = self.parser.parse(&text.corpus());
        for warning in &result.warnings {
            info!("{}", warning);
        }

        Ok((result.record, verdicts))
    }
}

/// Holds the session for the duration of a run.
struct ActiveRun<'a> {
    session: &'a mut Session,
}

impl Drop for ActiveRun<'_> {
    fn drop(&mut self) {
        self.session.abandon_run();
    }
}
