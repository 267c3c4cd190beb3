use barsweep_core::{StimulusError, StimulusParameters};
use barsweep_timing::FrameTimeStats;
use barsweep_toolbox::{ConeMosaic, Photocurrent, Toolbox};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::config::ExperimentConfig;
use crate::sequencer::{ResultBundle, StimulusSequencer};

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error(transparent)]
    Stimulus(#[from] StimulusError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outer segment that forwards photocurrent unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughOuterSegment;

impl PassThroughOuterSegment {
    pub fn process(&self, current: &Photocurrent) -> Photocurrent {
        current.clone()
    }
}

/// Outer-segment output reduced to what downstream analysis reads.
#[derive(Debug, Clone, Serialize)]
pub struct OuterSegmentSummary {
    pub rows: usize,
    pub cols: usize,
    pub steps: usize,
    pub dt: f64,
    pub background_rate: Option<f64>,
    pub mean_trace: Vec<f64>,
}

impl From<&Photocurrent> for OuterSegmentSummary {
    fn from(current: &Photocurrent) -> Self {
        Self {
            rows: current.rows,
            cols: current.cols,
            steps: current.steps,
            dt: current.dt,
            background_rate: current.background_rate,
            mean_trace: current.mean_trace(),
        }
    }
}

/// Stimulus/response pair written to disk.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentRecord {
    pub params: StimulusParameters,
    pub display: String,
    pub frames: usize,
    pub sweep_window: (usize, usize),
    /// `[rows, cols, frames]` of `stimulus`.
    pub stimulus_shape: [usize; 3],
    /// First color channel of the raw movie, `[frame][row][col]`.
    pub stimulus: Vec<f32>,
    pub outer_segment: OuterSegmentSummary,
    pub frame_stats: FrameTimeStats,
}

impl ExperimentRecord {
    pub fn from_bundle(bundle: &ResultBundle<ConeMosaic>, outer_segment: &Photocurrent) -> Self {
        let window = bundle.timeline.sweep_window();
        let (stimulus_shape, stimulus) = match &bundle.movie {
            Some(movie) => {
                let [rows, cols, frames, _] = movie.shape();
                ([rows, cols, frames], movie.channel_plane(0))
            }
            None => ([0, 0, 0], Vec::new()),
        };
        Self {
            params: bundle.params.clone(),
            display: bundle.display.name(),
            frames: bundle.timeline.len(),
            sweep_window: (*window.start(), *window.end()),
            stimulus_shape,
            stimulus,
            outer_segment: OuterSegmentSummary::from(outer_segment),
            frame_stats: bundle.frame_stats.clone(),
        }
    }
}

pub struct ExperimentOutcome {
    pub bundle: ResultBundle<ConeMosaic>,
    pub record: ExperimentRecord,
    pub record_path: PathBuf,
    pub movie_path: Option<PathBuf>,
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

/// Generate the stimulus, pass the photocurrent through the outer segment
/// and save the stimulus/response record.
pub fn run_experiment(
    config: &ExperimentConfig,
    toolbox: &Toolbox,
) -> Result<ExperimentOutcome, ExperimentError> {
    let bundle = StimulusSequencer::new(toolbox)
        .show_progress(config.show_progress)
        .generate(&config.stimulus)?;

    let outer_segment = PassThroughOuterSegment.process(&bundle.photocurrent);
    let record = ExperimentRecord::from_bundle(&bundle, &outer_segment);

    ensure_parent(&config.record_path)?;
    fs::write(&config.record_path, serde_json::to_vec_pretty(&record)?)?;
    info!(path = %config.record_path.display(), "wrote experiment record");

    let movie_path = match (&config.movie_path, &bundle.movie) {
        (Some(path), Some(movie)) => {
            ensure_parent(path)?;
            fs::write(path, movie.as_bytes())?;
            info!(path = %path.display(), shape = ?movie.shape(), "wrote raw movie");
            Some(path.clone())
        }
        _ => None,
    };

    Ok(ExperimentOutcome {
        bundle,
        record,
        record_path: config.record_path.clone(),
        movie_path,
    })
}
