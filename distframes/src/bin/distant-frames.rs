use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{self, Context};
use distframes::{
    extraction::{extract_frames, ExtractionConfig},
    sink::image_extension,
};
use distframes_common::{
    bin_common::init::{init_eyre, init_logger},
    Threshold,
};

#[derive(Parser, Debug)]
#[command()]
/// Extract visually distinct frames from a video file.
///
/// The video is sampled about once per second. A sample is kept when its colours differ
/// enough from the last kept frame.
struct Cli {
    /// Similarity ceiling within 0..=1. Samples at least this similar to the reference
    /// are dropped, so a higher value keeps more frames
    #[arg(long, default_value = "0.65")]
    threshold: Threshold,

    /// Where to place the kept frames, created if missing
    #[arg(long, default_value = "extracted_frames")]
    output: PathBuf,

    /// Image format of the kept frames, as a file extension
    #[arg(long, default_value = "jpg", value_parser = image_extension)]
    format: String,

    /// A file to additionally write the logs to
    #[arg(long)]
    logfile: Option<PathBuf>,

    /// The video file to extract from
    video_path: PathBuf,
}

fn main() -> eyre::Result<()> {
    init_eyre()?;
    let cli = Cli::parse();
    init_logger(cli.logfile.as_deref())?;
    log::debug!("CLI arguments: {cli:#?}");

    if !cli.video_path.is_file() {
        eyre::bail!("Video file not found at {}", cli.video_path.display());
    }

    std::fs::create_dir_all(&cli.output).wrap_err_with(|| {
        format!("failed to create the output directory {}", cli.output.display())
    })?;

    let config = ExtractionConfig::new(cli.threshold, &cli.output).extension(cli.format);
    let summary = extract_frames(&cli.video_path, config).wrap_err_with(|| {
        format!("failed to extract frames from {}", cli.video_path.display())
    })?;
    log::debug!(
        "Kept {} of {} samples after {} comparisons",
        summary.kept.len(),
        summary.samples,
        summary.comparisons
    );

    Ok(())
}
