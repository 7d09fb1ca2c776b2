//! Verify command - check a model path the way a session would.

use std::path::PathBuf;

use clap::Args;
use console::style;

use super::Session;

/// Arguments for the verify command.
#[derive(Args)]
pub struct VerifyArgs {
    /// Model file to check
    #[arg(required = true)]
    model: PathBuf,

    /// Image width; with --height, validates an image session instead of loading the model
    #[arg(long, requires = "height", allow_negative_numbers = true)]
    width: Option<i32>,

    /// Image height
    #[arg(long, requires = "width", allow_negative_numbers = true)]
    height: Option<i32>,

    /// Model input shape, comma separated
    #[arg(long, value_delimiter = ',')]
    shape: Option<Vec<usize>>,
}

pub fn run(args: VerifyArgs) -> anyhow::Result<()> {
    let mut session = Session::new();

    match (args.width, args.height) {
        (Some(width), Some(height)) => {
            session.initialize_with_image(&args.model, width, height)?;
            println!(
                "{} {} is usable for {}x{} images",
                style("✓").green(),
                args.model.display(),
                width,
                height
            );
        }
        _ => {
            let options = modelinfer_core::RuntimeOptions {
                input_shape: args.shape,
                ..Default::default()
            };
            let mut session = session.with_options(options);
            session.initialize(&args.model)?;
            println!(
                "{} {} loaded successfully",
                style("✓").green(),
                args.model.display()
            );
        }
    }

    Ok(())
}
