//! Run command - inference over a single input file.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::{debug, info};

use modelinfer_core::InferenceOutput;

use super::{load_config, open_session};

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Input file with little-endian f32 tensor bytes
    #[arg(required = true)]
    input: PathBuf,

    /// Model file (overrides the config file)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Model input shape, comma separated (e.g. 1,3,224,224)
    #[arg(long, value_delimiter = ',')]
    shape: Option<Vec<usize>>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON with element count and values
    Json,
    /// CSV with one index,value row per element
    Csv,
    /// Plain text summary
    Text,
    /// Little-endian f32 bytes
    Raw,
}

impl OutputFormat {
    /// File extension used when writing this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
            OutputFormat::Raw => "bin",
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    count: usize,
    values: &'a InferenceOutput,
}

#[derive(Serialize)]
struct CsvRow {
    index: usize,
    value: f32,
}

pub fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let mut session = open_session(config, args.model, args.shape)?;

    info!("Processing file: {}", args.input.display());
    let input = fs::read(&args.input)?;
    let output = session.infer_from_buffer(&input)?;

    let formatted = format_output(&output, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &formatted)?;
        println!(
            "{} {} values written to {}",
            style("✓").green(),
            output.len(),
            output_path.display()
        );
    } else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&formatted)?;
        stdout.flush()?;
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Render inference output in the requested format.
pub fn format_output(output: &InferenceOutput, format: OutputFormat) -> anyhow::Result<Vec<u8>> {
    match format {
        OutputFormat::Json => {
            let report = JsonReport {
                count: output.len(),
                values: output,
            };
            let mut bytes = serde_json::to_vec_pretty(&report)?;
            bytes.push(b'\n');
            Ok(bytes)
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for (index, &value) in output.as_slice().iter().enumerate() {
                writer.serialize(CsvRow { index, value })?;
            }
            writer
                .into_inner()
                .map_err(|e| anyhow::anyhow!("failed to flush CSV output: {}", e))
        }
        OutputFormat::Text => Ok(format_text(output).into_bytes()),
        OutputFormat::Raw => Ok(output.to_le_bytes()),
    }
}

fn format_text(output: &InferenceOutput) -> String {
    let values = output.as_slice();
    let mut text = String::new();

    text.push_str(&format!("Values: {}\n", values.len()));

    if values.is_empty() {
        return text;
    }

    let min = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64;

    text.push_str(&format!("Min:    {}\n", min));
    text.push_str(&format!("Max:    {}\n", max));
    text.push_str(&format!("Mean:   {:.6}\n", mean));

    // Highest values first, useful for classifier logits
    let mut ranked: Vec<(usize, f32)> = values.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    text.push_str("\nTop values:\n");
    for (index, value) in ranked.iter().take(5) {
        text.push_str(&format!("  [{}] {}\n", index, value));
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InferenceOutput {
        InferenceOutput::from(vec![0.5, 2.0, -1.0])
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let bytes = format_output(&sample(), OutputFormat::Csv).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(text, "index,value\n0,0.5\n1,2.0\n2,-1.0\n");
    }

    #[test]
    fn test_text_ranks_values() {
        let text = format_text(&sample());

        assert!(text.starts_with("Values: 3\n"));
        assert!(text.contains("Max:    2\n"));
        assert!(text.contains("Top values:\n  [1] 2\n  [0] 0.5\n  [2] -1\n"));
    }

    #[test]
    fn test_raw_is_little_endian() {
        let bytes = format_output(&sample(), OutputFormat::Raw).unwrap();
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[4..8], &2.0f32.to_le_bytes());
    }
}
