//! Process command - ingest a single CSV file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use csvinv_core::{CsvProcessor, ProgressAdapter};

use super::{load_config, percent_bar};
use crate::output::{format_invoices, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input CSV file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Field delimiter (overrides config)
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Treat the first row as data
    #[arg(long)]
    no_headers: bool,

    /// Skip NIP checksum validation
    #[arg(long)]
    no_nip_validation: bool,

    /// Validate assembled invoices
    #[arg(long)]
    validate: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(delimiter) = args.delimiter {
        config.csv.delimiter = delimiter;
    }
    if args.no_headers {
        config.csv.has_headers = false;
    }
    if args.no_nip_validation {
        config.extraction.validate_nip = false;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = percent_bar();
    let bar = pb.clone();
    let options = config.parse_options()?.with_progress(move |progress, message| {
        bar.set_position(progress as u64);
        bar.set_message(message.to_string());
    });

    let adapter = ProgressAdapter::new(CsvProcessor::new());
    let result = adapter.process_file(&args.input, Some(options)).await;

    pb.set_position(adapter.progress() as u64);
    pb.finish_with_message(adapter.progress_message());

    let result = result?;

    if !result.errors.is_empty() {
        eprintln!(
            "{} {} rows rejected:",
            style("⚠").yellow(),
            result.errors.len()
        );
        for error in &result.errors {
            eprintln!("  - {}", error);
        }
    }

    if args.validate {
        for invoice in &result.invoices {
            let issues = invoice.validate();
            if !issues.is_empty() {
                eprintln!(
                    "{}",
                    style(format!("Validation issues in {}:", invoice.header.invoice_number)).yellow()
                );
                for issue in &issues {
                    eprintln!("  - {}", issue);
                }
            }
        }
    }

    let output = format_invoices(&result.invoices, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    eprintln!(
        "{} {} invoices from {} rows",
        style("ℹ").blue(),
        result.file_info.invoice_count,
        result.file_info.row_count
    );

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
