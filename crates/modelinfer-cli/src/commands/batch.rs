//! Batch command - inference over multiple input files with one session.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, error, warn};

use super::run::{OutputFormat, format_output};
use super::{Session, load_config, open_session};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching input files
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long, required = true)]
    output_dir: PathBuf,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model file (overrides the config file)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Model input shape, comma separated
    #[arg(long, value_delimiter = ',')]
    shape: Option<Vec<usize>>,

    /// Also write summary.csv to the output directory
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
#[derive(Serialize)]
struct SummaryRow {
    file: String,
    status: &'static str,
    values: usize,
    elapsed_ms: u64,
    error: String,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    fs::create_dir_all(&args.output_dir)?;

    let mut session = open_session(config, args.model.clone(), args.shape.clone())?;

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut rows = Vec::with_capacity(files.len());

    for path in &files {
        let file_start = Instant::now();
        let result = process_single_file(&mut session, path, &args);
        let elapsed_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(values) => rows.push(SummaryRow {
                file: path.display().to_string(),
                status: "ok",
                values,
                elapsed_ms,
                error: String::new(),
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if !args.continue_on_error {
                    progress.abandon();
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
                warn!("Failed to process {}: {}", path.display(), error_msg);
                rows.push(SummaryRow {
                    file: path.display().to_string(),
                    status: "error",
                    values: 0,
                    elapsed_ms,
                    error: error_msg,
                });
            }
        }

        progress.inc(1);
    }

    progress.finish_with_message("Complete");

    if args.summary {
        let summary_path = args.output_dir.join("summary.csv");
        let mut writer = csv::Writer::from_path(&summary_path)?;
        for row in &rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        debug!("Summary written to {}", summary_path.display());
    }

    let failed = rows.iter().filter(|r| r.status == "error").count();

    println!();
    println!(
        "{} Processed {} files in {:.1}s",
        style("✓").green(),
        rows.len(),
        start.elapsed().as_secs_f64()
    );
    if failed > 0 {
        println!("{} {} files failed", style("✗").red(), failed);
    }

    Ok(())
}

/// Run one file through the session and write its output; returns the value count.
fn process_single_file(
    session: &mut Session,
    path: &Path,
    args: &BatchArgs,
) -> anyhow::Result<usize> {
    let input = fs::read(path)?;
    let output = session.infer_from_buffer(&input)?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let output_path = args
        .output_dir
        .join(format!("{}.{}", stem, args.format.extension()));

    fs::write(&output_path, format_output(&output, args.format)?)?;
    debug!("Wrote {}", output_path.display());

    Ok(output.len())
}
