#![allow(dead_code)]

use barsweep_core::{Eccentricity, Eye, StimulusParameters, ToolboxError};
use barsweep_render::{CHANNELS, RgbImage};
use barsweep_toolbox::{
    BuiltinDisplays, ColorSpace, ConeDensityModel, DisplayCalibration, EyePath,
    LinearSceneBuilder, MosaicGeometry, OpticalImage, Optics, Photocurrent, PowerLawDensity,
    ReceptorArray, Scene, SceneBuilder, ShiftInvariantOptics, Toolbox, toolbox_progress_enabled,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Small run that still has every segment.
pub fn small_params() -> StimulusParameters {
    StimulusParameters {
        image_rows: 4,
        image_cols: 24,
        bar_width: 4,
        pre_roll: 3,
        post_roll: 2,
        ..Default::default()
    }
}

/// Optics that counts calls and remembers the toolbox progress flag it saw.
pub struct CountingOptics {
    inner: ShiftInvariantOptics,
    pub calls: Rc<Cell<usize>>,
    pub progress_seen: Rc<RefCell<Vec<bool>>>,
    pub fail_after: Option<usize>,
}

impl CountingOptics {
    pub fn new() -> Self {
        Self {
            inner: ShiftInvariantOptics::default(),
            calls: Rc::new(Cell::new(0)),
            progress_seen: Rc::new(RefCell::new(Vec::new())),
            fail_after: None,
        }
    }

    pub fn failing_after(calls: usize) -> Self {
        Self {
            fail_after: Some(calls),
            ..Self::new()
        }
    }
}

impl Optics for CountingOptics {
    fn compute(&self, scene: &Scene) -> Result<OpticalImage, ToolboxError> {
        self.calls.set(self.calls.get() + 1);
        self.progress_seen.borrow_mut().push(toolbox_progress_enabled());
        if let Some(limit) = self.fail_after {
            if self.calls.get() > limit {
                return Err(ToolboxError::Model("optics blew up".into()));
            }
        }
        self.inner.compute(scene)
    }
}

pub struct FixedDensity(pub f64);

impl ConeDensityModel for FixedDensity {
    fn linear_density(&self, _: Eccentricity, _: Eye) -> Result<f64, ToolboxError> {
        Ok(self.0)
    }
}

/// Scene builder that keeps only the leftmost `keep_cols` columns.
pub struct CroppingScenes {
    pub keep_cols: usize,
}

impl SceneBuilder for CroppingScenes {
    fn build(
        &self,
        image: &RgbImage,
        space: ColorSpace,
        mean_luminance: f64,
        display: &DisplayCalibration,
    ) -> Result<Scene, ToolboxError> {
        let full = LinearSceneBuilder.build(image, space, mean_luminance, display)?;
        let (rows, cols) = full.size();
        let keep = self.keep_cols.min(cols);
        let radiance = full
            .radiance()
            .chunks(cols * CHANNELS)
            .flat_map(|row| row[..keep * CHANNELS].iter().copied())
            .collect();
        Ok(Scene::new(rows, keep, radiance, full.fov_deg(), full.distance_m()))
    }
}

/// Reference toolbox with counting optics. Returns the call counter.
pub fn counting_toolbox() -> (Toolbox, Rc<Cell<usize>>, Rc<RefCell<Vec<bool>>>) {
    toolbox_with(CountingOptics::new())
}

pub fn toolbox_with(optics: CountingOptics) -> (Toolbox, Rc<Cell<usize>>, Rc<RefCell<Vec<bool>>>) {
    let calls = Rc::clone(&optics.calls);
    let seen = Rc::clone(&optics.progress_seen);
    let toolbox = Toolbox {
        displays: Box::new(BuiltinDisplays::new()),
        scenes: Box::new(LinearSceneBuilder),
        optics: Box::new(optics),
        density: Box::new(PowerLawDensity::default()),
    };
    (toolbox, calls, seen)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Configure,
    Prime,
    Accumulate,
    Finalize(Option<f64>),
}

/// Receptor array that records every call it receives.
#[derive(Debug, Default)]
pub struct RecordingMosaic {
    pub events: Vec<Event>,
    pub geometry: Option<MosaicGeometry>,
    pub step_means: Vec<f64>,
    pub needs_background: bool,
}

impl RecordingMosaic {
    pub fn adapting() -> Self {
        Self {
            needs_background: true,
            ..Default::default()
        }
    }

    pub fn count(&self, wanted: fn(&Event) -> bool) -> usize {
        self.events.iter().filter(|e| wanted(e)).count()
    }
}

impl ReceptorArray for RecordingMosaic {
    fn label(&self) -> &'static str {
        "recording"
    }

    fn configure_geometry(&mut self, geometry: MosaicGeometry) -> Result<(), ToolboxError> {
        self.events.push(Event::Configure);
        self.geometry = Some(geometry);
        Ok(())
    }

    fn integration_time(&self) -> f64 {
        0.01
    }

    fn prime(&mut self, _oi: &OpticalImage) -> Result<(), ToolboxError> {
        self.events.push(Event::Prime);
        Ok(())
    }

    fn accumulate(&mut self, oi: &OpticalImage, path: &EyePath) -> Result<(), ToolboxError> {
        for _ in path.positions() {
            self.events.push(Event::Accumulate);
            self.step_means.push(oi.mean());
        }
        Ok(())
    }

    fn accumulated_steps(&self) -> usize {
        self.step_means.len()
    }

    fn requires_background_rate(&self) -> bool {
        self.needs_background
    }

    fn mean_absorption_rate(&self) -> Option<f64> {
        if self.step_means.is_empty() {
            return None;
        }
        let mean = self.step_means.iter().sum::<f64>() / self.step_means.len() as f64;
        Some(mean / self.integration_time())
    }

    fn finalize(&mut self, background_rate: Option<f64>) -> Result<Photocurrent, ToolboxError> {
        self.events.push(Event::Finalize(background_rate));
        Ok(Photocurrent {
            rows: 1,
            cols: 1,
            steps: self.step_means.len(),
            dt: self.integration_time(),
            background_rate,
            values: self.step_means.clone(),
        })
    }
}
