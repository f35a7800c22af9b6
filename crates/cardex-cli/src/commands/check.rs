//! Check command - run upload validation over files without recognizing them.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use cardex_core::intake::MAX_INPUTS;
use cardex_core::{CardexError, Session, UploadCandidate, Validator};

use super::load_config;

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Candidate files, offered in order (front first)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Override the size ceiling in bytes
    #[arg(long)]
    max_size: Option<u64>,
}

pub async fn run(args: CheckArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let mut validator = Validator::from_config(&config.intake);
    if let Some(bytes) = args.max_size {
        validator = validator.with_max_file_size(bytes);
    }
    let mut session = Session::with_validator(validator);

    let mut rejected = 0usize;
    for path in &args.files {
        let size = fs::metadata(path)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?
            .len();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        match session.submit_candidate(UploadCandidate::declared(name, size)) {
            Ok(slot) => println!("{} {} -> {}", style("✓").green(), path.display(), slot),
            Err(e) => {
                rejected += 1;
                println!("{} {}: {}", style("✗").red(), path.display(), e);
            }
        }
    }

    let accepted = session.accepted().len();
    if accepted < MAX_INPUTS {
        println!(
            "{} {}",
            style("ℹ").blue(),
            CardexError::IncompleteInput { accepted }
        );
    }

    if rejected > 0 {
        anyhow::bail!("{} of {} files rejected", rejected, args.files.len());
    }

    Ok(())
}
