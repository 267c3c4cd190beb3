use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Receptor array model selected once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MosaicKind {
    #[default]
    Standard,
    Biophysical,
    Hexagonal,
}

impl MosaicKind {
    pub fn label(&self) -> &'static str {
        match self {
            MosaicKind::Standard => "standard",
            MosaicKind::Biophysical => "biophysical",
            MosaicKind::Hexagonal => "hexagonal",
        }
    }
}

impl std::str::FromStr for MosaicKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" | "default" | "linear" => Ok(MosaicKind::Standard),
            "biophysical" | "biophys" => Ok(MosaicKind::Biophysical),
            "hexagonal" | "hex" => Ok(MosaicKind::Hexagonal),
            other => Err(format!("unknown mosaic kind '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Eye {
    #[default]
    Left,
    Right,
}

/// Retinal position of the patch, radius in meters and polar angle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Eccentricity {
    pub radius_m: f64,
    pub angle_deg: f64,
}

/// Whether receptor absorptions carry shot noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoiseMode {
    /// Noise-free mean absorptions.
    Frozen,
    /// Shot noise drawn from a generator seeded with `StimulusParameters::seed`.
    #[default]
    Random,
}

/// Complete description of one bar-sweep run. Replaying a run with the same
/// record reproduces the same result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StimulusParameters {
    pub display: String,
    pub bar_width: usize,
    /// cd/m^2
    pub mean_luminance: f64,
    pub image_rows: usize,
    pub image_cols: usize,
    pub fov_deg: f64,
    pub pre_roll: usize,
    /// `None` derives the sweep length from the rendered width minus the bar width.
    pub stimulus_frames: Option<usize>,
    pub post_roll: usize,
    pub mosaic: MosaicKind,
    pub eccentricity: Eccentricity,
    pub eye: Eye,
    pub noise: NoiseMode,
    pub seed: u64,
}

impl Default for StimulusParameters {
    fn default() -> Self {
        Self {
            display: "LCD-Apple".to_string(),
            bar_width: 10,
            mean_luminance: 200.0,
            image_rows: 96,
            image_cols: 96,
            fov_deg: 0.6,
            pre_roll: 60,
            stimulus_frames: None,
            post_roll: 30,
            mosaic: MosaicKind::Standard,
            eccentricity: Eccentricity::default(),
            eye: Eye::Left,
            noise: NoiseMode::Random,
            seed: 1,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn nonzero(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::Zero { field })
    } else {
        Ok(())
    }
}

impl StimulusParameters {
    /// Entry checks. An oversized bar is rejected instead of degrading to a
    /// sweep-less run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display.trim().is_empty() {
            return Err(ConfigError::EmptyDisplay);
        }
        positive("mean_luminance", self.mean_luminance)?;
        positive("fov_deg", self.fov_deg)?;
        nonzero("image_rows", self.image_rows)?;
        nonzero("image_cols", self.image_cols)?;
        nonzero("bar_width", self.bar_width)?;
        if self.bar_width >= self.image_cols {
            return Err(ConfigError::BarTooWide {
                bar_width: self.bar_width,
                image_cols: self.image_cols,
            });
        }
        if let Some(frames) = self.stimulus_frames {
            nonzero("stimulus_frames", frames)?;
            let max = self.image_cols - self.bar_width;
            if frames > max {
                return Err(ConfigError::SweepOverrun {
                    stimulus_frames: frames,
                    image_cols: self.image_cols,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Sweep length for a scene rendered `scene_cols` wide.
    pub fn resolve_stimulus_frames(&self, scene_cols: usize) -> usize {
        self.stimulus_frames
            .unwrap_or_else(|| scene_cols.saturating_sub(self.bar_width))
    }

    pub fn total_frames(&self, scene_cols: usize) -> usize {
        self.pre_roll + self.resolve_stimulus_frames(scene_cols) + self.post_roll
    }
}
