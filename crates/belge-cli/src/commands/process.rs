//! Process command - extract signals from a single document.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use belge_core::{
    BelgeError, CancellationToken, DocumentRecord, ExtractionPipeline, ExtractionResult,
    OcrProvider,
};

use super::config::load_config;
use crate::ocr::CommandOcr;

/// Image extensions sent through OCR.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp", "webp"];

/// Extensions treated as OCR transcripts.
pub const TEXT_EXTENSIONS: &[&str] = &["txt", "text"];

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (OCR transcript or image); "-" reads text from stdin
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Wrap JSON output in a storage record (id, date, folder)
    #[arg(long)]
    record: bool,

    /// OCR program to run on images (overrides config)
    #[arg(long)]
    ocr_command: Option<String>,

    /// Show classification confidence
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

/// How an input file is turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Image,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        if TEXT_EXTENSIONS.contains(&extension.as_str()) {
            Some(Self::Text)
        } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            Some(Self::Image)
        } else {
            None
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(command) = &args.ocr_command {
        config.ocr.command = command.clone();
    }

    check_record_format(args.format, args.record)?;

    let pipeline = ExtractionPipeline::from_config(&config);
    let cancel = CancellationToken::new();
    let ctrl_c = cancel_on_ctrl_c(cancel.clone());
    let ocr: Arc<dyn OcrProvider> =
        Arc::new(CommandOcr::from_config(&config.ocr).with_cancel(cancel.clone()));

    let result = if args.input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        pipeline.run(&text)
    } else {
        let path = PathBuf::from(&args.input);
        if !path.exists() {
            anyhow::bail!("Input file not found: {}", path.display());
        }

        info!("Processing file: {}", path.display());
        extract_document(&path, &pipeline, ocr, &cancel).await?
    };

    ctrl_c.abort();

    let image_path = match InputKind::from_path(Path::new(&args.input)) {
        Some(InputKind::Image) => Some(args.input.clone()),
        _ => None,
    };
    let output = format_result(&result, args.format, args.record, image_path)?;

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

    // stdout carries only the formatted result
    if args.show_confidence {
        eprintln!(
            "{} Classification confidence: {:.0}% ({})",
            style("ℹ").blue(),
            result.classification.confidence * 100.0,
            result.classification.level().as_str()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// `--record` only has a JSON form.
pub fn check_record_format(format: OutputFormat, record: bool) -> anyhow::Result<()> {
    if record && !matches!(format, OutputFormat::Json) {
        anyhow::bail!("--record requires --format json");
    }
    Ok(())
}

/// Cancel `token` when the user presses Ctrl-C.
pub fn cancel_on_ctrl_c(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    })
}

/// Read one document and run the pipeline on its text.
pub async fn extract_document(
    path: &Path,
    pipeline: &ExtractionPipeline,
    ocr: Arc<dyn OcrProvider>,
    cancel: &CancellationToken,
) -> anyhow::Result<ExtractionResult> {
    match InputKind::from_path(path) {
        Some(InputKind::Text) => {
            let text = tokio::fs::read_to_string(path).await?;
            Ok(pipeline.run(&text))
        }
        Some(InputKind::Image) => {
            let image = tokio::fs::read(path).await?;
            match pipeline.process_image(ocr, image, cancel).await {
                Ok(result) => Ok(result),
                Err(BelgeError::Cancelled) => anyhow::bail!("Cancelled"),
                Err(e) => Err(e.into()),
            }
        }
        None => {
            let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            anyhow::bail!("Unsupported file format: {}", extension)
        }
    }
}

pub fn format_result(
    result: &ExtractionResult,
    format: OutputFormat,
    record: bool,
    image_path: Option<String>,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if record => {
            let record = DocumentRecord::from_extraction(result, image_path);
            Ok(serde_json::to_string_pretty(&record)?)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "category",
        "confidence",
        "amount",
        "currency",
        "links",
        "folder",
    ])?;

    let category = result.classification.category;
    let confidence = format!("{:.2}", result.classification.confidence);
    let (amount, currency) = match &result.amount {
        Some(a) => (format!("{:.2}", a.value), a.currency.as_str()),
        None => (String::new(), ""),
    };
    let links = result.links.join(" ");

    wtr.write_record([
        category.as_str(),
        confidence.as_str(),
        amount.as_str(),
        currency,
        links.as_str(),
        category.default_folder(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();
    let classification = &result.classification;

    output.push_str(&format!(
        "Category: {} ({:.0}%)\n",
        classification.category,
        classification.confidence * 100.0
    ));
    output.push_str(&format!("Folder:   {}\n", classification.category.default_folder()));

    match &result.amount {
        Some(amount) => output.push_str(&format!("Amount:   {}\n", amount)),
        None => output.push_str("Amount:   -\n"),
    }

    if result.links.is_empty() {
        output.push_str("Links:    -\n");
    } else {
        output.push_str("Links:\n");
        for link in &result.links {
            output.push_str(&format!("  - {}\n", link));
        }
    }

    output
}
