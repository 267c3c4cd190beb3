use thiserror::Error;

/// Rejected stimulus parameters, reported once at entry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("display name must not be empty")]
    EmptyDisplay,
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must be at least 1")]
    Zero { field: &'static str },
    #[error("bar width {bar_width} must be smaller than the image width {image_cols}")]
    BarTooWide { bar_width: usize, image_cols: usize },
    #[error(
        "{stimulus_frames} sweep frames would move the bar past column {image_cols} (at most {max} fit)"
    )]
    SweepOverrun {
        stimulus_frames: usize,
        image_cols: usize,
        max: usize,
    },
}

/// Failure raised by one of the external modelling collaborators.
#[derive(Debug, Error)]
pub enum ToolboxError {
    #[error("unknown display profile '{0}'")]
    UnknownDisplay(String),
    #[error("{what}: expected {expected} values, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("receptor geometry has not been configured")]
    GeometryNotConfigured,
    #[error("invalid receptor geometry: {0}")]
    InvalidGeometry(String),
    #[error("receptor array holds no accumulated responses")]
    NothingAccumulated,
    #[error("the {0} receptor model needs a background rate to derive photocurrent")]
    MissingBackgroundRate(&'static str),
    #[error("photocurrent has already been derived for this receptor array")]
    AlreadyFinalized,
    #[error("{0}")]
    Model(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Error returned by a stimulus sequencing run.
#[derive(Debug, Error)]
pub enum StimulusError {
    #[error("invalid stimulus configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("stimulus generation failed: {0}")]
    Generation(#[source] ToolboxError),
}

impl From<ToolboxError> for StimulusError {
    fn from(err: ToolboxError) -> Self {
        StimulusError::Generation(err)
    }
}
