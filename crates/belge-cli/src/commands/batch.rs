//! Batch processing command for multiple documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use belge_core::{CancellationToken, ExtractionPipeline, ExtractionResult, OcrProvider};

use super::config::load_config;
use super::process::{
    cancel_on_ctrl_c, check_record_format, extract_document, format_result, InputKind,
    OutputFormat,
};
use crate::ocr::CommandOcr;

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

    /// Wrap JSON output in storage records
    #[arg(long)]
    record: bool,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of documents processed concurrently (default: from config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// OCR program to run on images (overrides config)
    #[arg(long)]
    ocr_command: Option<String>,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    result: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(command) = &args.ocr_command {
        config.ocr.command = command.clone();
    }
    let jobs = args.jobs.unwrap_or(config.pipeline.batch_jobs).max(1);
    check_record_format(args.format, args.record)?;

    let files = collect_files(&args.input)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(output_dir) = &args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files",
        )?
        .progress_chars("=>-"),
    );

    let pipeline = ExtractionPipeline::from_config(&config);
    let cancel = CancellationToken::new();
    let ctrl_c = cancel_on_ctrl_c(cancel.clone());
    let ocr: Arc<dyn OcrProvider> =
        Arc::new(CommandOcr::from_config(&config.ocr).with_cancel(cancel.clone()));

    debug!("Processing {} files with {} workers", files.len(), jobs);

    // `buffered` keeps results in input order while up to `jobs` files run at once
    let mut outcomes = stream::iter(files)
        .map(|path| {
            let ocr = Arc::clone(&ocr);
            let pipeline = &pipeline;
            let cancel = &cancel;
            async move {
                let file_start = Instant::now();
                let outcome = extract_document(&path, pipeline, ocr, cancel).await;
                let processing_time_ms = file_start.elapsed().as_millis() as u64;

                let (result, error) = match outcome {
                    Ok(result) => (Some(result), None),
                    Err(e) => (None, Some(e.to_string())),
                };

                ProcessResult {
                    path,
                    result,
                    error,
                    processing_time_ms,
                }
            }
        })
        .buffered(jobs);

    let mut results = Vec::new();
    while let Some(result) = outcomes.next().await {
        progress.inc(1);

        if let Some(message) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), message);
            } else {
                error!("Failed to process {}: {}", result.path.display(), message);
                cancel.cancel();
                progress.abandon();
                ctrl_c.abort();
                anyhow::bail!("Processing failed: {}", message);
            }
        }

        results.push(result);
    }

    ctrl_c.abort();
    progress.finish_with_message("Complete");

    for result in &results {
        let Some(extraction) = &result.result else {
            continue;
        };

        match &args.output_dir {
            Some(output_dir) => {
                let output_path = output_path(output_dir, &result.path, args.format);
                let content =
                    format_result(extraction, args.format, args.record, image_path(&result.path))?;
                fs::write(&output_path, content)?;
                debug!("Wrote output to {}", output_path.display());
            }
            None => {
                let classification = &extraction.classification;
                println!(
                    "  {} -> {} ({})",
                    result.path.display(),
                    classification.category,
                    classification.category.default_folder()
                );
            }
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

    let failed: Vec<&ProcessResult> = results.iter().filter(|r| r.error.is_some()).collect();
    let successful = results.len() - failed.len();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Expand a glob pattern, keeping files we know how to read.
fn collect_files(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let files = glob(pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && InputKind::from_path(p).is_some())
        .collect();
    Ok(files)
}

fn output_path(output_dir: &Path, input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    output_dir.join(format!("{}.{}", stem, format.extension()))
}

fn image_path(path: &Path) -> Option<String> {
    match InputKind::from_path(path) {
        Some(InputKind::Image) => Some(path.display().to_string()),
        _ => None,
    }
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "category",
        "confidence",
        "amount",
        "currency",
        "links",
        "folder",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let time = result.processing_time_ms.to_string();

        if let Some(extraction) = &result.result {
            let category = extraction.classification.category;
            let confidence = format!("{:.2}", extraction.classification.confidence);
            let (amount, currency) = match &extraction.amount {
                Some(a) => (format!("{:.2}", a.value), a.currency.as_str()),
                None => (String::new(), ""),
            };
            let links = extraction.links.join(" ");

            wtr.write_record([
                filename,
                "success",
                category.as_str(),
                confidence.as_str(),
                amount.as_str(),
                currency,
                links.as_str(),
                category.default_folder(),
                time.as_str(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                time.as_str(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_files_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "Fatura").unwrap();
        fs::write(dir.path().join("b.png"), b"\x89PNG\r\n\x1a\n").unwrap();
        fs::write(dir.path().join("c.pdf"), "skip").unwrap();

        let pattern = format!("{}/*", dir.path().display());
        let mut files = collect_files(&pattern).unwrap();
        files.sort();

        let names: Vec<_> = files
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec!["a.txt", "b.png"]);
    }

    #[test]
    fn test_output_path_uses_format_extension() {
        let path = output_path(Path::new("out"), Path::new("scans/receipt.jpg"), OutputFormat::Csv);
        assert_eq!(path, Path::new("out").join("receipt.csv"));
    }

    #[test]
    fn test_image_path_only_for_images() {
        assert_eq!(image_path(Path::new("scan.png")), Some("scan.png".to_string()));
        assert_eq!(image_path(Path::new("scan.txt")), None);
    }

    #[test]
    fn test_write_summary() {
        let dir = tempfile::tempdir().unwrap();
        let summary = dir.path().join("summary.csv");
        let results = vec![
            ProcessResult {
                path: PathBuf::from("invoice.txt"),
                result: Some(ExtractionPipeline::new().run("Fatura Toplam: 99,90 TL")),
                error: None,
                processing_time_ms: 3,
            },
            ProcessResult {
                path: PathBuf::from("broken.png"),
                result: None,
                error: Some("Cancelled".to_string()),
                processing_time_ms: 1,
            },
        ];

        write_summary(&summary, &results).unwrap();
        let content = fs::read_to_string(&summary).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "invoice.txt,success,invoice,0.85,99.90,TL,,Faturalar,3,");
        assert_eq!(lines[2], "broken.png,error,,,,,,,1,Cancelled");
    }
}
