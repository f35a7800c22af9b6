//! Scan command - recognize and extract fields from both sides of a card.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use cardex_core::{
    AccessGate, CardexConfig, Pipeline, PureOcrRecognizer, Session, Slot, StaticIdentity,
    UploadCandidate, Validator,
};

use super::{OutputFormat, format_record, load_config, report_issues, report_verdicts, write_output};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Image of the front of the card
    #[arg(long, required = true)]
    front: PathBuf,

    /// Image of the back of the card
    #[arg(long, required = true)]
    back: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Recognition language hint (e.g. "eng" or "eng+hin")
    #[arg(long)]
    lang: Option<String>,

    /// Recognition deadline in seconds
    #[arg(long, conflicts_with = "no_timeout")]
    timeout: Option<u64>,

    /// Wait for recognition without a deadline
    #[arg(long)]
    no_timeout: bool,

    /// Check that each image looks like the expected side of the card
    #[arg(long)]
    precheck: bool,

    /// Validate extracted data
    #[arg(long)]
    validate: bool,
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    apply_overrides(&mut config, &args);

    let identity = StaticIdentity::from_config(&config.auth);
    let gate = AccessGate::new(&identity).required(config.auth.required);
    let mut session = gate
        .open_session(Validator::from_config(&config.intake))
        .await?;

    submit(&mut session, &args.front, Slot::Front)?;
    submit(&mut session, &args.back, Slot::Back)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Loading OCR models...");

    let recognizer = PureOcrRecognizer::from_config(&config.recognition).map_err(|e| {
        anyhow::anyhow!(
            "{}\n\nPlace {} and {} in {} or pass --model-dir.",
            e,
            config.recognition.detection_model,
            config.recognition.recognition_model,
            config.recognition.model_dir.display()
        )
    })?;

    let pipeline = Pipeline::from_config(recognizer, &config);

    pb.set_message("Recognizing front and back...");
    let outcome = pipeline.run(&mut session).await;

    let record = match outcome {
        Ok(record) => {
            pb.finish_with_message("Done");
            record
        }
        Err(e) => {
            pb.abandon_with_message("Failed");
            report_verdicts(e.verdicts());
            if session.retry_available() {
                anyhow::bail!("{} Run the command again to retry.", e.user_message());
            }
            anyhow::bail!("{}", e.user_message());
        }
    };

    if config.precheck.enabled {
        report_verdicts(session.verdicts());
    }

    if args.validate {
        report_issues(&record);
    }

    let output = format_record(&record, args.format)?;
    write_output(&output, args.output.as_ref())?;

    info!("{} of 6 fields found", 6 - record.missing_fields().len());
    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn apply_overrides(config: &mut CardexConfig, args: &ScanArgs) {
    if let Some(dir) = &args.model_dir {
        config.recognition.model_dir = dir.clone();
    }
    if let Some(lang) = &args.lang {
        config.recognition.language = lang.clone();
    }
    if args.no_timeout {
        config.recognition.timeout_secs = None;
    } else if let Some(secs) = args.timeout {
        config.recognition.timeout_secs = Some(secs);
    }
    if args.precheck {
        config.precheck.enabled = true;
    }
}

fn submit(session: &mut Session, path: &Path, slot: Slot) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let candidate = UploadCandidate::from_path(path)?;
    session
        .submit_to_slot(candidate, slot)
        .map_err(|e| anyhow::anyhow!("{} ({}): {}", style(slot).bold(), path.display(), e))?;

    debug!("Accepted {} as {}", path.display(), slot);
    Ok(())
}
