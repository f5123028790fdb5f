use std::path::PathBuf;

use clap::Parser;
use mfx_core::clip::CLIP_SECONDS;

/// mfx — MFCC features for keyword-spotting clips.
#[derive(Parser, Debug, Clone)]
#[command(name = "mfx", version, about)]
pub struct Cli {
    /// Audio file to analyse (wav, flac, ogg, mp3, ...).
    pub input: PathBuf,

    /// Spectral parameters (TOML). Built-in deployment values when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the JSON report here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Clip duration in seconds, at most one hour.
    #[arg(long, default_value_t = CLIP_SECONDS)]
    pub clip_seconds: f64,

    /// Overlap between consecutive clips, as a fraction of the clip [0, 1).
    #[arg(long, default_value_t = 0.5)]
    pub overlap: f64,

    /// Print the resolved spectral parameters as TOML and exit.
    #[arg(long)]
    pub print_config: bool,
}
