//! Batch processing command for multiple CSV files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use tracing::debug;

use csvinv_core::{CsvProcessor, ProcessResult, ProcessingStats, ProgressAdapter};

use super::{load_config, percent_bar};
use crate::output::{format_invoices, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Stop with an error if any file fails
    #[arg(long)]
    fail_fast: bool,

    /// Drop failed files from the statistics
    #[arg(long)]
    exclude_failed: bool,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "csv" | "tsv" | "txt")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let mut options = config.parse_options()?;
    if args.fail_fast {
        options.continue_on_error = false;
    }
    let adapter = ProgressAdapter::with_defaults(CsvProcessor::new(), options);

    // Mirror adapter state into the bar from a separate task
    let pb = percent_bar();
    let bar = pb.clone();
    let mut state = adapter.subscribe();
    let watcher = tokio::spawn(async move {
        while state.changed().await.is_ok() {
            let current = state.borrow_and_update().clone();
            bar.set_position(current.progress as u64);
            bar.set_message(current.message);
        }
    });

    let results = adapter.process_files(&files, None).await;

    watcher.abort();
    pb.set_position(adapter.progress() as u64);
    pb.finish_with_message(adapter.progress_message());

    let results = results?;
    let failed: Vec<&ProcessResult> = results.iter().filter(|r| !r.success).collect();

    if args.fail_fast || !config.processing.continue_on_error {
        if let Some(first) = failed.first() {
            print_failures(&failed);
            anyhow::bail!(
                "Processing failed for {}: {}",
                first.file_info.path.display(),
                first.errors.first().map(String::as_str).unwrap_or("unknown error")
            );
        }
    }

    // Write outputs for every file that produced invoices
    if let Some(output_dir) = &args.output_dir {
        for result in results.iter().filter(|r| !r.invoices.is_empty()) {
            let output_path = output_path(output_dir, &result.file_info.path, args.format);
            fs::write(&output_path, format_invoices(&result.invoices, args.format)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    if args.exclude_failed {
        for result in &failed {
            adapter.remove_file(&result.file_info.id);
        }
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    print_stats(&adapter.stats());
    print_failures(&failed);

    Ok(())
}

fn output_path(output_dir: &Path, input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("invoices");
    output_dir.join(format!("{}.{}", stem, format.extension()))
}

fn print_stats(stats: &ProcessingStats) {
    println!(
        "   {} files: {} completed, {} with errors, {} invoices",
        stats.total_files,
        style(stats.completed_files).green(),
        style(stats.error_files).red(),
        stats.total_invoices
    );
}

fn print_failures(failed: &[&ProcessResult]) {
    if failed.is_empty() {
        return;
    }

    println!();
    println!("{}", style("Files with errors:").red());
    for result in failed {
        println!("  - {}", result.file_info.path.display());
        for error in &result.errors {
            println!("      {}", error);
        }
    }
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "file_id",
        "filename",
        "status",
        "rows",
        "invoices",
        "size_bytes",
        "errors",
    ])?;

    for result in results {
        let status = if result.success { "success" } else { "error" };
        wtr.write_record([
            result.file_info.id.as_str(),
            &result.file_info.name,
            status,
            &result.file_info.row_count.to_string(),
            &result.file_info.invoice_count.to_string(),
            &result.file_info.size_bytes.to_string(),
            &result.errors.join("; "),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_uses_stem_and_format() {
        let path = output_path(
            Path::new("/out"),
            Path::new("/in/january.csv"),
            OutputFormat::Text,
        );
        assert_eq!(path, PathBuf::from("/out/january.txt"));
    }
}
