//! Modelling collaborators driven by the stimulus sequencer.
//!
//! Each concern is a trait so the sequencer can run against any toolbox. The
//! types in this crate are small deterministic stand-ins: they keep the call
//! contracts and data shapes of a full retinal toolbox without modelling its
//! physiology.

pub mod density;
pub mod display;
pub mod mosaic;
pub mod optics;
pub mod progress;
pub mod scene;

use barsweep_core::{Eccentricity, Eye, ToolboxError};
use barsweep_render::RgbImage;

pub use density::PowerLawDensity;
pub use display::{BuiltinDisplays, DisplayCalibration};
pub use mosaic::{ConeMosaic, ConeType, EyePath, MosaicGeometry, Photocurrent};
pub use optics::{OpticalImage, ShiftInvariantOptics};
pub use progress::{
    release_toolbox_progress, set_toolbox_progress, silence_toolbox_progress,
    toolbox_progress_enabled,
};
pub use scene::{ColorSpace, LinearSceneBuilder, Scene};

/// Resolves display profiles by name.
pub trait DisplayProvider {
    fn display(&self, name: &str) -> Result<DisplayCalibration, ToolboxError>;
}

/// Turns an RGB frame into a scene in photometric units.
pub trait SceneBuilder {
    fn build(
        &self,
        image: &RgbImage,
        space: ColorSpace,
        mean_luminance: f64,
        display: &DisplayCalibration,
    ) -> Result<Scene, ToolboxError>;
}

/// Scene to retinal irradiance. Must be deterministic.
pub trait Optics {
    fn compute(&self, scene: &Scene) -> Result<OpticalImage, ToolboxError>;
}

/// Linear cone density (cones per meter) at a retinal position.
pub trait ConeDensityModel {
    fn linear_density(&self, eccentricity: Eccentricity, eye: Eye) -> Result<f64, ToolboxError>;
}

/// Photoreceptor array with a two-phase interface: append absorptions frame
/// by frame, then derive photocurrent once.
pub trait ReceptorArray {
    fn label(&self) -> &'static str;

    /// Set sampling geometry. Called once before the first frame.
    fn configure_geometry(&mut self, geometry: MosaicGeometry) -> Result<(), ToolboxError>;

    /// Seconds of exposure per accumulated step.
    fn integration_time(&self) -> f64;

    /// Noise-free baseline computation on the background optical image,
    /// run once before the first sweep frame. Not part of the accumulated
    /// response.
    fn prime(&mut self, oi: &OpticalImage) -> Result<(), ToolboxError>;

    /// Append one step per eye position without deriving photocurrent.
    fn accumulate(&mut self, oi: &OpticalImage, path: &EyePath) -> Result<(), ToolboxError>;

    /// Number of appended steps so far.
    fn accumulated_steps(&self) -> usize;

    fn requires_background_rate(&self) -> bool;

    /// Mean absorptions per second over everything appended so far.
    fn mean_absorption_rate(&self) -> Option<f64>;

    fn finalize(&mut self, background_rate: Option<f64>) -> Result<Photocurrent, ToolboxError>;
}

/// The set of collaborators one sequencer run talks to.
pub struct Toolbox {
    pub displays: Box<dyn DisplayProvider>,
    pub scenes: Box<dyn SceneBuilder>,
    pub optics: Box<dyn Optics>,
    pub density: Box<dyn ConeDensityModel>,
}

impl Toolbox {
    pub fn reference() -> Self {
        Self {
            displays: Box::new(BuiltinDisplays::new()),
            scenes: Box::new(LinearSceneBuilder),
            optics: Box::new(ShiftInvariantOptics::default()),
            density: Box::new(PowerLawDensity::default()),
        }
    }
}

impl Default for Toolbox {
    fn default() -> Self {
        Self::reference()
    }
}
