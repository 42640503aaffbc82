//! Process command - extract a structured record from a single BOL document.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use bolcr_core::error::{BolcrError, RecognitionError};
use bolcr_core::extract::{LlmParser, RecordParser, RuleParser};
use bolcr_core::models::config::{BolcrConfig, EngineKind, ExtractorMode};
use bolcr_core::models::record::BolRecord;
use bolcr_core::output::{JsonWriter, write_atomic};
use bolcr_core::source::{RecognizeOptions, recognize_file};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, image, or pre-recognized text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Recognition engine override
    #[arg(long, value_enum)]
    engine: Option<EngineArg>,

    /// Skip OCR and use only embedded PDF text
    #[arg(long)]
    text_only: bool,

    /// Print the raw recognized text to stderr
    #[arg(long)]
    show_text: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
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

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum EngineArg {
    Remote,
    Tesseract,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let mut config = if let Some(path) = config_path {
        BolcrConfig::from_file(Path::new(path))?
    } else {
        BolcrConfig::default()
    };

    if let Some(engine) = args.engine {
        config.source.engine = match engine {
            EngineArg::Remote => EngineKind::Remote,
            EngineArg::Tesseract => EngineKind::Tesseract,
        };
    }
    if args.text_only {
        config.pdf.prefer_embedded_text = true;
        config.pdf.ocr_fallback = false;
    }

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    pb.set_message("Recognizing text...");
    pb.set_position(10);

    let opts = RecognizeOptions::from_config(&config.source);
    let text = recognize_file(&args.input, &config, opts).await?;

    if args.show_text {
        eprintln!("{}", text);
    }

    pb.set_message("Extracting fields...");
    pb.set_position(60);

    let record = extract_record(&text, &config).await?;

    pb.set_message("Writing output...");
    pb.set_position(90);

    let writer = JsonWriter::new().with_pretty(args.pretty || config.output.pretty);

    match &args.output {
        Some(path) => {
            match args.format {
                OutputFormat::Json => writer.write(&record, path)?,
                format => {
                    let rendered = render(&record, format, &writer)?;
                    write_atomic(path, rendered.as_bytes())?;
                }
            }
            pb.finish_with_message("Done");
            println!(
                "{} Output written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => {
            pb.finish_and_clear();
            println!("{}", render(&record, args.format, &writer)?);
        }
    }

    if !record.warnings.is_empty() {
        eprintln!("{}", style("Extraction warnings:").yellow());
        for warning in &record.warnings {
            eprintln!("  - {}", warning);
        }
    }

    debug!("total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Run the configured extraction mode over recognized text.
async fn extract_record(text: &str, config: &BolcrConfig) -> anyhow::Result<BolRecord> {
    let rules = RuleParser::new(config.extraction.clone());

    match config.extraction.mode {
        ExtractorMode::Rules => Ok(rules.parse(text)?),
        ExtractorMode::Llm => {
            let llm = LlmParser::new(&config.extraction);
            match llm.parse(text).await {
                Ok(record) => Ok(record),
                Err(BolcrError::Recognition(RecognitionError::QuotaExhausted)) => {
                    warn!("engine quota exhausted; falling back to rule-based extraction");
                    Ok(rules.parse(text)?)
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}

fn render(record: &BolRecord, format: OutputFormat, writer: &JsonWriter) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(writer.to_string(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &BolRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "document_number",
        "pro_number",
        "ship_date",
        "delivery_date",
        "weight_value",
        "weight_unit",
        "carrier",
        "carrier_scac",
        "total_packages",
        "warnings",
    ])?;

    wtr.write_record([
        record.document_number.clone().unwrap_or_default(),
        record.pro_number.clone().unwrap_or_default(),
        record
            .ship_date
            .map(|d| d.to_string())
            .unwrap_or_default(),
        record
            .delivery_date
            .map(|d| d.to_string())
            .unwrap_or_default(),
        record
            .weight
            .as_ref()
            .map(|w| w.value.to_string())
            .unwrap_or_default(),
        record
            .weight
            .as_ref()
            .map(|w| w.unit.display().to_string())
            .unwrap_or_default(),
        record.carrier.clone().unwrap_or_default(),
        record.carrier_scac.clone().unwrap_or_default(),
        record
            .total_packages
            .map(|n| n.to_string())
            .unwrap_or_default(),
        record.warnings.join("; "),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &BolRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "BOL:      {}\n",
        record.document_number.as_deref().unwrap_or("-")
    ));
    if let Some(pro) = &record.pro_number {
        output.push_str(&format!("PRO:      {}\n", pro));
    }
    output.push_str(&format!(
        "Shipped:  {}\n",
        record
            .ship_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string())
    ));
    output.push_str(&format!(
        "Delivered: {}\n",
        record
            .delivery_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string())
    ));
    output.push_str(&format!(
        "Weight:   {}\n",
        record
            .weight
            .as_ref()
            .map(|w| format!("{} {}", w.value, w.unit.display()))
            .unwrap_or_else(|| "-".to_string())
    ));
    output.push_str(&format!(
        "Carrier:  {}{}\n",
        record.carrier.as_deref().unwrap_or("-"),
        record
            .carrier_scac
            .as_deref()
            .map(|s| format!(" ({})", s))
            .unwrap_or_default()
    ));

    if !record.freight_lines.is_empty() {
        output.push_str("\nFreight:\n");
        for line in &record.freight_lines {
            output.push_str(&format!(
                "  {} {} {}{}\n",
                line.quantity.map(|q| q.to_string()).unwrap_or_default(),
                line.package_type.as_deref().unwrap_or("pkg"),
                line.description,
                line.weight
                    .as_ref()
                    .map(|w| format!(" ({} {})", w.value, w.unit.display()))
                    .unwrap_or_default()
            ));
        }
    }

    if !record.warnings.is_empty() {
        output.push_str("\nWarnings:\n");
        for warning in &record.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    }

    output
}
