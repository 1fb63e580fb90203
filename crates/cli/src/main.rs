//! CLI tool for converting HTML into PowerPoint slide text.

use anyhow::{Context, Result};
use clap::Parser;
use slidetext_core::SlideContent;
use slidetext_html::HtmlParser;
use slidetext_pptx::{PptxParser, PptxWriter, DEFAULT_BASE_FONT_SIZE};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Convert HTML into the body text of a PowerPoint slide.
#[derive(Parser, Debug)]
#[command(name = "html2pptx")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file(s): .html, or .pptx with --inspect
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Slide title (default: the document's <title>)
    #[arg(short, long)]
    title: Option<String>,

    /// Body font size in points
    #[arg(long, default_value_t = DEFAULT_BASE_FONT_SIZE)]
    font_size: f64,

    /// Print the converted rich text as JSON instead of writing a .pptx
    #[arg(long, conflicts_with = "inspect")]
    json: bool,

    /// Read .pptx inputs and print their slide text as JSON
    #[arg(long)]
    inspect: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let parser = HtmlParser::new();
    let mut failures = 0usize;

    for input_path in &args.input {
        log::info!("Processing: {}", input_path.display());

        let result = if args.inspect {
            inspect_file(input_path, &args)
        } else {
            process_file(input_path, &args, &parser)
        };

        if let Err(e) = result {
            eprintln!("Error processing {}: {:#}", input_path.display(), e);
            failures += 1;
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} inputs failed", failures, args.input.len());
    }

    Ok(())
}

/// Convert a single HTML file.
fn process_file(input_path: &Path, args: &Args, parser: &HtmlParser) -> Result<()> {
    let bytes = std::fs::read(input_path)
        .with_context(|| format!("Failed to read {}", input_path.display()))?;
    let parsed = parser
        .parse_bytes(&bytes)
        .with_context(|| format!("Failed to parse {}", input_path.display()))?;

    let body = parsed.to_rich_text();
    log::debug!(
        "  Converted into {} paragraphs, {} runs",
        body.paragraphs.len(),
        body.run_count()
    );

    if args.json {
        return print_json(&body);
    }

    let writer = PptxWriter::new()
        .with_title(args.title.clone().or(parsed.title))
        .with_base_font_size(args.font_size);

    let output_path = get_output_path(input_path, args.output.as_ref())?;
    let file = File::create(&output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;
    writer
        .write(&body, BufWriter::new(file))
        .with_context(|| format!("Failed to write {}", output_path.display()))?
        .flush()
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    log::info!("Written to: {}", output_path.display());
    Ok(())
}

/// Print the slide text of an existing presentation.
fn inspect_file(input_path: &Path, args: &Args) -> Result<()> {
    let file = File::open(input_path)
        .with_context(|| format!("Failed to open {}", input_path.display()))?;

    let slides: Vec<SlideContent> = PptxParser::new()
        .with_base_font_size(args.font_size)
        .parse(BufReader::new(file))
        .with_context(|| format!("Failed to read {}", input_path.display()))?;

    log::debug!("  Found {} slides", slides.len());
    print_json(&slides)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Determine the output path for a converted file.
fn get_output_path(input_path: &Path, output_dir: Option<&PathBuf>) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = format!("{}.pptx", stem);

    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(output_filename)
        }
        None => {
            if let Some(parent) = input_path.parent() {
                parent.join(output_filename)
            } else {
                PathBuf::from(output_filename)
            }
        }
    };

    Ok(output_path)
}
