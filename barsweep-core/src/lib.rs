pub mod error;
pub mod params;
pub mod segment;
pub mod stimulus;

pub use error::{ConfigError, StimulusError, ToolboxError};
pub use params::{Eccentricity, Eye, MosaicKind, NoiseMode, StimulusParameters};
pub use segment::Segment;
pub use stimulus::{BarSpan, FrameStimulus};
