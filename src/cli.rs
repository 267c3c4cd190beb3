use barsweep_core::MosaicKind;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Moving-bar stimulus sweep over a simulated cone mosaic")]
pub struct Args {
    /// Path to config JSON
    #[arg(long, default_value = "barsweep.json")]
    pub config: PathBuf,

    /// Where to write the stimulus/response record (overrides config)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Also dump the raw RGB movie as f32 bytes
    #[arg(long)]
    pub movie: Option<PathBuf>,

    /// Display calibration profile (overrides config)
    #[arg(long)]
    pub display: Option<String>,

    /// Bar width in pixels (overrides config)
    #[arg(long)]
    pub bar_width: Option<usize>,

    /// Cone mosaic variant: standard, biophysical or hexagonal
    #[arg(long)]
    pub mosaic: Option<MosaicKind>,

    /// Seed for cone-mosaic noise
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disable per-decile progress logging
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}
