use barsweep_core::ToolboxError;
use barsweep_render::CHANNELS;
use std::f64::consts::PI;

use crate::Optics;
use crate::scene::Scene;

/// Retinal irradiance sampled on the scene grid, interleaved RGB.
#[derive(Debug, Clone, PartialEq)]
pub struct OpticalImage {
    pub rows: usize,
    pub cols: usize,
    pub fov_deg: f64,
    pub irradiance: Vec<f64>,
}

impl OpticalImage {
    #[inline]
    pub fn get(&self, row: usize, col: usize, ch: usize) -> f64 {
        self.irradiance[(row * self.cols + col) * CHANNELS + ch]
    }

    /// Nearest sample at fractional position (0..1 on both axes, clamped).
    pub fn sample(&self, x: f64, y: f64, ch: usize) -> f64 {
        let col = ((x.clamp(0.0, 1.0) * self.cols as f64) as usize).min(self.cols - 1);
        let row = ((y.clamp(0.0, 1.0) * self.rows as f64) as usize).min(self.rows - 1);
        self.get(row, col, ch)
    }

    pub fn mean(&self) -> f64 {
        if self.irradiance.is_empty() {
            return 0.0;
        }
        self.irradiance.iter().sum::<f64>() / self.irradiance.len() as f64
    }
}

/// Diffraction-free optics: f-number throughput, transmittance and a
/// separable Gaussian point spread.
#[derive(Debug, Clone)]
pub struct ShiftInvariantOptics {
    pub f_number: f64,
    pub transmittance: f64,
    /// Point-spread standard deviation in degrees of visual angle.
    pub blur_sigma_deg: f64,
}

impl Default for ShiftInvariantOptics {
    fn default() -> Self {
        Self {
            f_number: 4.0,
            transmittance: 0.9,
            blur_sigma_deg: 0.5 / 60.0,
        }
    }
}

impl ShiftInvariantOptics {
    fn throughput(&self) -> f64 {
        PI / (1.0 + 4.0 * self.f_number * self.f_number) * self.transmittance
    }

    fn kernel(sigma_px: f64) -> Vec<f64> {
        let radius = (3.0 * sigma_px).ceil() as isize;
        let weights: Vec<f64> = (-radius..=radius)
            .map(|i| (-(i * i) as f64 / (2.0 * sigma_px * sigma_px)).exp())
            .collect();
        let sum: f64 = weights.iter().sum();
        weights.into_iter().map(|w| w / sum).collect()
    }

    /// One pass along rows (`horizontal`) or columns, edges clamped.
    fn blur_pass(
        src: &[f64],
        rows: usize,
        cols: usize,
        kernel: &[f64],
        horizontal: bool,
    ) -> Vec<f64> {
        let radius = (kernel.len() / 2) as isize;
        let mut out = vec![0.0; src.len()];
        for r in 0..rows {
            for c in 0..cols {
                for ch in 0..CHANNELS {
                    let mut acc = 0.0;
                    for (k, w) in kernel.iter().enumerate() {
                        let off = k as isize - radius;
                        let (rr, cc) = if horizontal {
                            (r, (c as isize + off).clamp(0, cols as isize - 1) as usize)
                        } else {
                            ((r as isize + off).clamp(0, rows as isize - 1) as usize, c)
                        };
                        acc += w * src[(rr * cols + cc) * CHANNELS + ch];
                    }
                    out[(r * cols + c) * CHANNELS + ch] = acc;
                }
            }
        }
        out
    }
}

impl Optics for ShiftInvariantOptics {
    fn compute(&self, scene: &Scene) -> Result<OpticalImage, ToolboxError> {
        let (rows, cols) = scene.size();
        let expected = rows * cols * CHANNELS;
        if rows == 0 || cols == 0 || scene.radiance().len() != expected {
            return Err(ToolboxError::ShapeMismatch {
                what: "scene radiance",
                expected,
                actual: scene.radiance().len(),
            });
        }

        let gain = self.throughput();
        let mut irradiance: Vec<f64> = scene.radiance().iter().map(|r| r * gain).collect();

        let deg_per_px = scene.fov_deg() / cols as f64;
        let sigma_px = if deg_per_px > 0.0 {
            self.blur_sigma_deg / deg_per_px
        } else {
            0.0
        };
        if sigma_px >= 0.05 {
            let kernel = Self::kernel(sigma_px);
            irradiance = Self::blur_pass(&irradiance, rows, cols, &kernel, true);
            irradiance = Self::blur_pass(&irradiance, rows, cols, &kernel, false);
        }

        Ok(OpticalImage {
            rows,
            cols,
            fov_deg: scene.fov_deg(),
            irradiance,
        })
    }
}
