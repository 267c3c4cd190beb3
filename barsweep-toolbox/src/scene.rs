use barsweep_core::ToolboxError;
use barsweep_render::{CHANNELS, RgbImage};

use crate::SceneBuilder;
use crate::display::DisplayCalibration;

/// Encoding of the RGB values handed to a scene builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
    /// Display-encoded values, linearised through the display gamma.
    #[default]
    Rgb,
    /// Already linear intensities.
    LinearRgb,
}

/// Per-channel luminance map of a displayed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    rows: usize,
    cols: usize,
    /// cd/m^2 contributed by each primary, interleaved RGB.
    radiance: Vec<f64>,
    fov_deg: f64,
    distance_m: f64,
}

impl Scene {
    pub fn new(
        rows: usize,
        cols: usize,
        radiance: Vec<f64>,
        fov_deg: f64,
        distance_m: f64,
    ) -> Self {
        Self {
            rows,
            cols,
            radiance,
            fov_deg,
            distance_m,
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn fov_deg(&self) -> f64 {
        self.fov_deg
    }

    pub fn set_fov(&mut self, fov_deg: f64) {
        self.fov_deg = fov_deg;
    }

    pub fn vertical_fov_deg(&self) -> f64 {
        self.fov_deg * self.rows as f64 / self.cols as f64
    }

    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    pub fn radiance(&self) -> &[f64] {
        &self.radiance
    }

    pub fn luminance(&self, row: usize, col: usize) -> f64 {
        let i = (row * self.cols + col) * CHANNELS;
        self.radiance[i..i + CHANNELS].iter().sum()
    }

    pub fn mean_luminance(&self) -> f64 {
        let px = self.rows * self.cols;
        if px == 0 {
            return 0.0;
        }
        self.radiance.iter().sum::<f64>() / px as f64
    }
}

/// Builds scenes by gamma-linearising the frame and scaling it to the
/// requested mean luminance.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearSceneBuilder;

impl SceneBuilder for LinearSceneBuilder {
    fn build(
        &self,
        image: &RgbImage,
        space: ColorSpace,
        mean_luminance: f64,
        display: &DisplayCalibration,
    ) -> Result<Scene, ToolboxError> {
        let expected = image.pixel_count() * CHANNELS;
        if image.data.len() != expected {
            return Err(ToolboxError::ShapeMismatch {
                what: "scene image",
                expected,
                actual: image.data.len(),
            });
        }

        let mut radiance: Vec<f64> = image
            .data
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let linear = match space {
                    ColorSpace::Rgb => display.linearize(*v),
                    ColorSpace::LinearRgb => v.clamp(0.0, 1.0) as f64,
                };
                linear * display.channel_luminance[i % CHANNELS] * display.peak_luminance
            })
            .collect();

        let mut scene = Scene::new(
            image.rows,
            image.cols,
            Vec::new(),
            display.fov_deg(image.cols),
            display.viewing_distance_m,
        );
        let current = radiance.iter().sum::<f64>() / image.pixel_count().max(1) as f64;
        if current > 0.0 {
            let scale = mean_luminance / current;
            radiance.iter_mut().for_each(|r| *r *= scale);
        }
        scene.radiance = radiance;
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DisplayProvider;
    use crate::display::BuiltinDisplays;

    fn apple() -> DisplayCalibration {
        BuiltinDisplays::new().display("LCD-Apple").unwrap()
    }

    #[test]
    fn scene_is_scaled_to_the_requested_mean() {
        let img = RgbImage::uniform(8, 8, 0.5);
        let scene = LinearSceneBuilder
            .build(&img, ColorSpace::Rgb, 200.0, &apple())
            .unwrap();
        assert_eq!(scene.size(), (8, 8));
        assert!((scene.mean_luminance() - 200.0).abs() < 1e-9);
        assert!((scene.luminance(3, 3) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn bright_columns_stay_brighter_after_scaling() {
        let mut img = RgbImage::uniform(2, 4, 0.5);
        for row in 0..2 {
            for ch in 0..CHANNELS {
                img.data[(row * 4 + 1) * CHANNELS + ch] = 1.0;
            }
        }
        let scene = LinearSceneBuilder
            .build(&img, ColorSpace::Rgb, 100.0, &apple())
            .unwrap();
        assert!(scene.luminance(0, 1) > scene.luminance(0, 0));
        assert!((scene.mean_luminance() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn black_frames_stay_black() {
        let img = RgbImage::uniform(2, 2, 0.0);
        let scene = LinearSceneBuilder
            .build(&img, ColorSpace::LinearRgb, 100.0, &apple())
            .unwrap();
        assert_eq!(scene.mean_luminance(), 0.0);
    }

    #[test]
    fn fov_is_settable() {
        let img = RgbImage::uniform(4, 8, 0.5);
        let mut scene = LinearSceneBuilder
            .build(&img, ColorSpace::Rgb, 50.0, &apple())
            .unwrap();
        scene.set_fov(0.6);
        assert_eq!(scene.fov_deg(), 0.6);
        assert!((scene.vertical_fov_deg() - 0.3).abs() < 1e-12);
        assert_eq!(scene.distance_m(), 0.5);
    }

    #[test]
    fn truncated_images_are_refused() {
        let mut img = RgbImage::uniform(2, 2, 0.5);
        img.data.pop();
        assert!(
            LinearSceneBuilder
                .build(&img, ColorSpace::Rgb, 50.0, &apple())
                .is_err()
        );
    }
}
