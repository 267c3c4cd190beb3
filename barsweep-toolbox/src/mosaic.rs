use barsweep_core::{MosaicKind, NoiseMode, ToolboxError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, trace};

use crate::ReceptorArray;
use crate::optics::OpticalImage;
use crate::progress::toolbox_progress_enabled;

/// Photons absorbed per unit irradiance, per square micron, per second.
const PHOTONS_PER_UNIT: f64 = 5_000.0;
/// Dark current in pA.
const DARK_CURRENT: f64 = 40.0;
/// R*/s at which the linear outer segment closes all channels.
const SATURATION_RATE: f64 = 1.0e6;
/// R*/s half-saturation of the adapting outer segment before adaptation.
const HALF_SATURATION: f64 = 2.0e4;
/// Outer-segment low-pass time constant in seconds.
const TAU: f64 = 0.01;
const DEFAULT_INTEGRATION_TIME: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConeType {
    L,
    M,
    S,
}

impl ConeType {
    /// Image channel the cone samples.
    pub fn channel(self) -> usize {
        match self {
            ConeType::L => 0,
            ConeType::M => 1,
            ConeType::S => 2,
        }
    }

    /// Fixed 6:3:1 L:M:S assignment, scrambled across the grid.
    pub fn for_position(row: usize, col: usize) -> Self {
        match (row * 7 + col * 3) % 10 {
            0..=5 => ConeType::L,
            6..=8 => ConeType::M,
            _ => ConeType::S,
        }
    }
}

/// Sampling grid of a receptor array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MosaicGeometry {
    pub rows: usize,
    pub cols: usize,
    /// Center-to-center cone spacing in meters.
    pub pitch_m: f64,
}

impl MosaicGeometry {
    /// Retinal distance covered by one degree of visual angle.
    pub const METERS_PER_DEGREE: f64 = 300e-6;

    /// Grid with `pitch_m` spacing covering the given field of view.
    pub fn for_field(fov_h_deg: f64, fov_v_deg: f64, pitch_m: f64) -> Result<Self, ToolboxError> {
        if !(pitch_m.is_finite() && pitch_m > 0.0) {
            return Err(ToolboxError::InvalidGeometry(format!(
                "cone pitch must be positive, got {pitch_m}"
            )));
        }
        let span = |deg: f64| ((deg * Self::METERS_PER_DEGREE / pitch_m).round() as usize).max(1);
        Ok(Self {
            rows: span(fov_v_deg),
            cols: span(fov_h_deg),
            pitch_m,
        })
    }

    pub fn cone_count(&self) -> usize {
        self.rows * self.cols
    }

    fn area_um2(&self) -> f64 {
        let um = self.pitch_m * 1e6;
        um * um
    }
}

/// Fixational eye positions, one per accumulated step, in cone units.
#[derive(Debug, Clone, PartialEq)]
pub struct EyePath {
    positions: Vec<(i32, i32)>,
}

impl EyePath {
    pub fn stationary(steps: usize) -> Self {
        Self {
            positions: vec![(0, 0); steps],
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[(i32, i32)] {
        &self.positions
    }
}

/// Photocurrent time series in pA, laid out `[step][row][col]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Photocurrent {
    pub rows: usize,
    pub cols: usize,
    pub steps: usize,
    /// Seconds per step.
    pub dt: f64,
    pub background_rate: Option<f64>,
    pub values: Vec<f64>,
}

impl Photocurrent {
    pub fn at(&self, step: usize, row: usize, col: usize) -> f64 {
        self.values[(step * self.rows + row) * self.cols + col]
    }

    /// Mean current across the array at every step.
    pub fn mean_trace(&self) -> Vec<f64> {
        let n = (self.rows * self.cols).max(1);
        self.values
            .chunks(n)
            .map(|step| step.iter().sum::<f64>() / n as f64)
            .collect()
    }
}

/// State shared by every mosaic variant.
#[derive(Debug, Clone)]
pub struct MosaicState {
    geometry: Option<MosaicGeometry>,
    cone_types: Vec<ConeType>,
    integration_time: f64,
    noise: NoiseMode,
    rng: StdRng,
    baseline: Option<Vec<f64>>,
    steps: Vec<Vec<f64>>,
    finalized: bool,
}

impl MosaicState {
    fn new(noise: NoiseMode, seed: u64) -> Self {
        Self {
            geometry: None,
            cone_types: Vec::new(),
            integration_time: DEFAULT_INTEGRATION_TIME,
            noise,
            rng: StdRng::seed_from_u64(seed),
            baseline: None,
            steps: Vec::new(),
            finalized: false,
        }
    }

    fn geometry(&self) -> Result<&MosaicGeometry, ToolboxError> {
        self.geometry.as_ref().ok_or(ToolboxError::GeometryNotConfigured)
    }

    /// Mean absorptions per cone for one step.
    fn mean_absorptions(
        &self,
        oi: &OpticalImage,
        shift: (i32, i32),
        hexagonal: bool,
    ) -> Result<Vec<f64>, ToolboxError> {
        let g = self.geometry()?;
        let scale = PHOTONS_PER_UNIT * g.area_um2() * self.integration_time;
        let mut out = Vec::with_capacity(g.cone_count());
        for row in 0..g.rows {
            // Odd rows of a hexagonal lattice sit half a cone to the right.
            let stagger = if hexagonal && row % 2 == 1 { 0.5 } else { 0.0 };
            let y = (row as f64 + 0.5 + shift.1 as f64) / g.rows as f64;
            for col in 0..g.cols {
                let x = (col as f64 + 0.5 + stagger + shift.0 as f64) / g.cols as f64;
                let ch = self.cone_types[row * g.cols + col].channel();
                out.push(oi.sample(x, y, ch) * scale);
            }
        }
        Ok(out)
    }

    fn add_shot_noise(&mut self, counts: &mut [f64]) {
        for c in counts.iter_mut() {
            // Gaussian approximation of Poisson noise via Box-Muller.
            let u1: f64 = 1.0 - self.rng.random::<f64>();
            let u2: f64 = self.rng.random::<f64>();
            let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
            *c = (*c + c.sqrt() * z).max(0.0);
        }
    }

    fn assign_cone_types(&mut self) -> Result<(), ToolboxError> {
        let g = self.geometry()?.clone();
        if self.cone_types.len() != g.cone_count() {
            self.cone_types = (0..g.rows)
                .flat_map(|r| (0..g.cols).map(move |c| ConeType::for_position(r, c)))
                .collect();
        }
        Ok(())
    }

    fn mean_rate(&self) -> Option<f64> {
        let total: usize = self.steps.iter().map(Vec::len).sum();
        if total == 0 {
            return None;
        }
        let sum: f64 = self.steps.iter().flatten().sum();
        Some(sum / total as f64 / self.integration_time)
    }

    /// Low-pass filtered absorption rate per cone, mapped through `transduce`.
    fn filtered_current(
        &self,
        background_rate: Option<f64>,
        transduce: impl Fn(f64) -> f64,
    ) -> Result<Photocurrent, ToolboxError> {
        let g = self.geometry()?;
        let dt = self.integration_time;
        let alpha = 1.0 - (-dt / TAU).exp();
        let initial = self
            .baseline
            .as_ref()
            .or_else(|| self.steps.first())
            .ok_or(ToolboxError::NothingAccumulated)?;
        let mut state: Vec<f64> = initial.iter().map(|c| c / dt).collect();

        let mut values = Vec::with_capacity(self.steps.len() * g.cone_count());
        for step in &self.steps {
            for (s, count) in state.iter_mut().zip(step) {
                *s += alpha * (count / dt - *s);
                values.push(transduce(*s));
            }
        }
        Ok(Photocurrent {
            rows: g.rows,
            cols: g.cols,
            steps: self.steps.len(),
            dt,
            background_rate,
            values,
        })
    }
}

/// Cone mosaic variants. The variant is fixed when the mosaic is built.
#[derive(Debug, Clone)]
pub enum ConeMosaic {
    /// Rectangular lattice, linear outer segment.
    Standard(MosaicState),
    /// Rectangular lattice, outer segment adapted to a background rate.
    Biophysical(MosaicState),
    /// Staggered lattice, linear outer segment.
    Hexagonal(MosaicState),
}

impl ConeMosaic {
    pub fn new(kind: MosaicKind, noise: NoiseMode, seed: u64) -> Self {
        let state = MosaicState::new(noise, seed);
        match kind {
            MosaicKind::Standard => ConeMosaic::Standard(state),
            MosaicKind::Biophysical => ConeMosaic::Biophysical(state),
            MosaicKind::Hexagonal => ConeMosaic::Hexagonal(state),
        }
    }

    pub fn kind(&self) -> MosaicKind {
        match self {
            ConeMosaic::Standard(_) => MosaicKind::Standard,
            ConeMosaic::Biophysical(_) => MosaicKind::Biophysical,
            ConeMosaic::Hexagonal(_) => MosaicKind::Hexagonal,
        }
    }

    fn state(&self) -> &MosaicState {
        match self {
            ConeMosaic::Standard(s) | ConeMosaic::Biophysical(s) | ConeMosaic::Hexagonal(s) => s,
        }
    }

    fn state_mut(&mut self) -> &mut MosaicState {
        match self {
            ConeMosaic::Standard(s) | ConeMosaic::Biophysical(s) | ConeMosaic::Hexagonal(s) => s,
        }
    }

    fn is_hexagonal(&self) -> bool {
        matches!(self, ConeMosaic::Hexagonal(_))
    }

    /// Accumulated absorption counts, one vector per step.
    pub fn absorptions(&self) -> &[Vec<f64>] {
        &self.state().steps
    }

    /// Noise-free counts from the priming step.
    pub fn baseline(&self) -> Option<&[f64]> {
        self.state().baseline.as_deref()
    }
}

impl ReceptorArray for ConeMosaic {
    fn label(&self) -> &'static str {
        self.kind().label()
    }

    fn configure_geometry(&mut self, geometry: MosaicGeometry) -> Result<(), ToolboxError> {
        if geometry.rows == 0 || geometry.cols == 0 {
            return Err(ToolboxError::InvalidGeometry(format!(
                "{}x{} cone grid",
                geometry.rows, geometry.cols
            )));
        }
        let state = self.state_mut();
        if !state.steps.is_empty() {
            return Err(ToolboxError::InvalidGeometry(
                "geometry cannot change once responses are accumulated".into(),
            ));
        }
        debug!(
            rows = geometry.rows,
            cols = geometry.cols,
            pitch_um = geometry.pitch_m * 1e6,
            "cone mosaic geometry"
        );
        state.geometry = Some(geometry);
        state.cone_types.clear();
        state.baseline = None;
        Ok(())
    }

    fn integration_time(&self) -> f64 {
        self.state().integration_time
    }

    fn prime(&mut self, oi: &OpticalImage) -> Result<(), ToolboxError> {
        let hexagonal = self.is_hexagonal();
        let state = self.state_mut();
        state.assign_cone_types()?;
        let baseline = state.mean_absorptions(oi, (0, 0), hexagonal)?;
        state.baseline = Some(baseline);
        Ok(())
    }

    fn accumulate(&mut self, oi: &OpticalImage, path: &EyePath) -> Result<(), ToolboxError> {
        let hexagonal = self.is_hexagonal();
        let state = self.state_mut();
        if state.finalized {
            return Err(ToolboxError::AlreadyFinalized);
        }
        state.assign_cone_types()?;
        for &shift in path.positions() {
            let mut counts = state.mean_absorptions(oi, shift, hexagonal)?;
            if state.noise == NoiseMode::Random {
                state.add_shot_noise(&mut counts);
            }
            state.steps.push(counts);
            if toolbox_progress_enabled() {
                trace!(step = state.steps.len(), "absorptions appended");
            }
        }
        Ok(())
    }

    fn accumulated_steps(&self) -> usize {
        self.state().steps.len()
    }

    fn requires_background_rate(&self) -> bool {
        matches!(self, ConeMosaic::Biophysical(_))
    }

    fn mean_absorption_rate(&self) -> Option<f64> {
        self.state().mean_rate()
    }

    fn finalize(&mut self, background_rate: Option<f64>) -> Result<Photocurrent, ToolboxError> {
        let label = self.label();
        let biophysical = self.requires_background_rate();
        let state = self.state_mut();
        if state.finalized {
            return Err(ToolboxError::AlreadyFinalized);
        }
        if state.steps.is_empty() {
            return Err(ToolboxError::NothingAccumulated);
        }

        let current = if biophysical {
            let bg = background_rate
                .filter(|r| r.is_finite() && *r > 0.0)
                .ok_or(ToolboxError::MissingBackgroundRate(label))?;
            // Background light raises the half-saturation point.
            let half = HALF_SATURATION + bg;
            state.filtered_current(Some(bg), |rate| -DARK_CURRENT * half / (half + rate))?
        } else {
            if background_rate.is_some() {
                debug!(model = label, "background rate ignored by linear outer segment");
            }
            state.filtered_current(None, |rate| {
                -DARK_CURRENT * (1.0 - rate / SATURATION_RATE).max(0.0)
            })?
        };
        state.finalized = true;
        Ok(current)
    }
}
