//! CLI subcommands and shared output helpers.

pub mod check;
pub mod config;
pub mod extract;
pub mod scan;

use std::fs;
use std::path::{Path, PathBuf};

use console::style;

use cardex_core::{CardexConfig, ExtractedRecord, Field, Verdict};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

/// Load the config passed with `--config`, then the user config file, then defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<CardexConfig> {
    if let Some(path) = config_path {
        return Ok(CardexConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        Ok(CardexConfig::from_file(&default_path)?)
    } else {
        Ok(CardexConfig::default())
    }
}

pub fn format_record(record: &ExtractedRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &ExtractedRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(Field::ALL.iter().map(|f| f.key()))?;
    wtr.write_record(Field::ALL.iter().map(|f| record.get(*f)))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &ExtractedRecord) -> String {
    let mut output = String::new();

    for field in Field::ALL {
        output.push_str(&format!("{:<14} {}\n", format!("{}:", field.label()), record.get(field)));
    }

    output
}

/// Write to the output file, or stdout when none was given.
pub fn write_output(output: &str, path: Option<&PathBuf>) -> anyhow::Result<()> {
    if let Some(output_path) = path {
        fs::write(output_path, output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output.trim_end());
    }

    Ok(())
}

/// Print validation issues for a record to stderr.
pub fn report_issues(record: &ExtractedRecord) {
    let issues = record.validate();
    if !issues.is_empty() {
        eprintln!("{}", style("Validation issues:").yellow());
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
    }
}

pub fn report_verdicts(verdicts: &[Verdict]) {
    for verdict in verdicts {
        let mark = if verdict.passed {
            style("✓").green()
        } else {
            style("✗").red()
        };
        eprintln!("{} {}: {}", mark, verdict.slot, verdict.reason);
    }
}
