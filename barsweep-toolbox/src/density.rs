use barsweep_core::{Eccentricity, Eye, ToolboxError};

use crate::ConeDensityModel;

/// Areal cone density falling off as a power of eccentricity, with denser
/// packing on the nasal side of the retina.
#[derive(Debug, Clone)]
pub struct PowerLawDensity {
    /// cones/mm^2 at the fovea
    pub peak_areal: f64,
    /// mm
    pub half_radius_mm: f64,
    pub exponent: f64,
    /// Fractional density boost along the nasal meridian.
    pub nasal_gain: f64,
}

impl Default for PowerLawDensity {
    fn default() -> Self {
        Self {
            peak_areal: 199_000.0,
            half_radius_mm: 0.2,
            exponent: 1.5,
            nasal_gain: 0.2,
        }
    }
}

impl PowerLawDensity {
    /// Polar angle of the nasal meridian; left and right eyes mirror.
    fn nasal_angle_deg(eye: Eye) -> f64 {
        match eye {
            Eye::Left => 180.0,
            Eye::Right => 0.0,
        }
    }

    pub fn areal_density(&self, eccentricity: Eccentricity, eye: Eye) -> f64 {
        let e_mm = eccentricity.radius_m.abs() * 1e3;
        let falloff = (1.0 + e_mm / self.half_radius_mm).powf(-self.exponent);
        let delta = (eccentricity.angle_deg - Self::nasal_angle_deg(eye)).to_radians();
        // Only off-foveal positions are asymmetric.
        let asym = 1.0 + self.nasal_gain * delta.cos() * (e_mm / (e_mm + 1.0));
        self.peak_areal * falloff * asym
    }
}

impl ConeDensityModel for PowerLawDensity {
    fn linear_density(&self, eccentricity: Eccentricity, eye: Eye) -> Result<f64, ToolboxError> {
        if !eccentricity.radius_m.is_finite() || !eccentricity.angle_deg.is_finite() {
            return Err(ToolboxError::Model(format!(
                "eccentricity must be finite, got {:?}",
                eccentricity
            )));
        }
        // cones/mm -> cones/m
        Ok(self.areal_density(eccentricity, eye).sqrt() * 1e3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(radius_mm: f64, angle_deg: f64) -> Eccentricity {
        Eccentricity {
            radius_m: radius_mm * 1e-3,
            angle_deg,
        }
    }

    #[test]
    fn fovea_has_peak_density() {
        let model = PowerLawDensity::default();
        let d = model.linear_density(at(0.0, 0.0), Eye::Left).unwrap();
        assert!((d - 199_000f64.sqrt() * 1e3).abs() < 1e-6);
    }

    #[test]
    fn density_falls_with_eccentricity() {
        let model = PowerLawDensity::default();
        let near = model.linear_density(at(0.5, 90.0), Eye::Left).unwrap();
        let far = model.linear_density(at(3.0, 90.0), Eye::Left).unwrap();
        assert!(near > far);
    }

    #[test]
    fn nasal_side_mirrors_between_eyes() {
        let model = PowerLawDensity::default();
        let left_nasal = model.areal_density(at(2.0, 180.0), Eye::Left);
        let left_temporal = model.areal_density(at(2.0, 0.0), Eye::Left);
        let right_nasal = model.areal_density(at(2.0, 0.0), Eye::Right);
        assert!(left_nasal > left_temporal);
        assert!((left_nasal - right_nasal).abs() < 1e-9);
    }

    #[test]
    fn non_finite_positions_are_errors() {
        let model = PowerLawDensity::default();
        assert!(model.linear_density(at(f64::NAN, 0.0), Eye::Right).is_err());
    }
}
