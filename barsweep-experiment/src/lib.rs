pub mod config;
pub mod driver;
pub mod progress;
pub mod sequencer;
pub mod timeline;

pub use config::ExperimentConfig;
pub use driver::{
    ExperimentError, ExperimentOutcome, ExperimentRecord, PassThroughOuterSegment, run_experiment,
};
pub use progress::{ProgressOverride, ProgressReporter};
pub use sequencer::{ResultBundle, StimulusSequencer};
pub use timeline::{FrameSlot, FrameTimeline};
