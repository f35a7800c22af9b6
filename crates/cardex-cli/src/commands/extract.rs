//! Extract command - run the field rules over already recognized text.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::debug;

use cardex_core::card::{CardParser, DocumentCheck, RuleCardParser};
use cardex_core::models::config::AddressSpan;
use cardex_core::{PairedText, RecognitionResult, Slot};

use super::{OutputFormat, format_record, load_config, report_issues, report_verdicts, write_output};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Text recognized from the front of the card
    #[arg(required = true)]
    front: PathBuf,

    /// Text recognized from the back of the card
    back: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Portion of the address match to report
    #[arg(long, value_enum)]
    address_span: Option<SpanArg>,

    /// Check that each text looks like the expected side of the card
    #[arg(long, requires = "back")]
    precheck: bool,

    /// Validate extracted data
    #[arg(long)]
    validate: bool,

    /// Show fields that could not be extracted
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum SpanArg {
    /// Whole match, "Address:" label included
    Matched,
    /// Only the text after the label
    Body,
}

impl From<SpanArg> for AddressSpan {
    fn from(arg: SpanArg) -> Self {
        match arg {
            SpanArg::Matched => AddressSpan::Matched,
            SpanArg::Body => AddressSpan::Body,
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let front = read_text(&args.front)?;
    let corpus = match &args.back {
        Some(back_path) => {
            let paired = PairedText {
                front: RecognitionResult { slot: Slot::Front, text: front },
                back: RecognitionResult { slot: Slot::Back, text: read_text(back_path)? },
            };

            if args.precheck || config.precheck.enabled {
                let check = DocumentCheck::from_config(&config.precheck);
                if let Err(e) = check.check(&paired) {
                    report_verdicts(e.verdicts());
                    anyhow::bail!("{}", e.user_message());
                }
            }

            paired.corpus()
        }
        None => front,
    };

    let span = args
        .address_span
        .map(AddressSpan::from)
        .unwrap_or(config.extraction.address_span);
    let parser = RuleCardParser::from_config(&config.extraction).with_address_span(span);

    let result = parser.parse(&corpus);
    debug!("Extraction took {}ms", result.processing_time_ms);

    if args.show_warnings {
        for warning in &result.warnings {
            eprintln!("{} {}", style("⚠").yellow(), warning);
        }
    }

    if args.validate {
        report_issues(&result.record);
    }

    let output = format_record(&result.record, args.format)?;
    write_output(&output, args.output.as_ref())
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    Ok(fs::read_to_string(path)?)
}
