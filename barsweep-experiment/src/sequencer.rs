use barsweep_core::{FrameStimulus, StimulusError, StimulusParameters, ToolboxError};
use barsweep_render::{CHANNELS, FrameSynth, RawMovie, RgbImage};
use barsweep_timing::{FrameTimeStats, HighPrecisionTimer, Timer};
use barsweep_toolbox::{
    ColorSpace, ConeMosaic, DisplayCalibration, EyePath, MosaicGeometry, OpticalImage,
    Photocurrent, ReceptorArray, Scene, Toolbox,
};
use tracing::{debug, info, warn};

use crate::progress::{ProgressOverride, ProgressReporter};
use crate::timeline::FrameTimeline;

/// Multiplier applied to the mean absorption rate to obtain the background
/// rate of adapting receptor models.
pub const BACKGROUND_RATE_FACTOR: f64 = 10.0;

/// Everything produced by one sequencer run. `params` alone is enough to
/// reproduce it.
#[derive(Debug, Clone)]
pub struct ResultBundle<R> {
    pub params: StimulusParameters,
    pub display: DisplayCalibration,
    pub timeline: FrameTimeline,
    pub mean_scene: Scene,
    pub mean_optical_image: OpticalImage,
    /// Scene and optical image of the last sweep frame.
    pub last_scene: Option<Scene>,
    pub last_optical_image: Option<OpticalImage>,
    /// Allocated only when the timeline has a sweep.
    pub movie: Option<RawMovie>,
    pub mosaic: R,
    pub photocurrent: Photocurrent,
    pub background_rate: Option<f64>,
    pub frame_stats: FrameTimeStats,
}

impl ResultBundle<ConeMosaic> {
    /// Run again from the stored parameters.
    pub fn replay(&self, toolbox: &Toolbox) -> Result<Self, StimulusError> {
        StimulusSequencer::new(toolbox).generate(&self.params)
    }
}

/// Drives the bar-sweep frame loop against a toolbox.
pub struct StimulusSequencer<'a> {
    toolbox: &'a Toolbox,
    show_progress: bool,
}

impl<'a> StimulusSequencer<'a> {
    pub fn new(toolbox: &'a Toolbox) -> Self {
        Self {
            toolbox,
            show_progress: false,
        }
    }

    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// Run with the cone mosaic variant named in `params`.
    pub fn generate(
        &self,
        params: &StimulusParameters,
    ) -> Result<ResultBundle<ConeMosaic>, StimulusError> {
        let mosaic = ConeMosaic::new(params.mosaic, params.noise, params.seed);
        self.run(params, mosaic)
    }

    /// Run the full sequence, appending every frame to `mosaic` in order and
    /// deriving its photocurrent once at the end.
    pub fn run<R: ReceptorArray>(
        &self,
        params: &StimulusParameters,
        mut mosaic: R,
    ) -> Result<ResultBundle<R>, StimulusError> {
        params.validate()?;
        // Collaborators stay quiet for the whole run; the sequencer reports.
        let _quiet = ProgressOverride::silence();

        let display = self.toolbox.displays.display(&params.display)?;
        let mut synth = FrameSynth::new(params.image_rows, params.image_cols)?;

        // The background is constant, so its optical image is computed once.
        let gray = synth.render(&FrameStimulus::Uniform);
        let mean_scene = self.scene(&gray, params, &display)?;
        let mean_optical_image = self.toolbox.optics.compute(&mean_scene)?;

        // The sweep length follows the scene; the movie holds the raw frames.
        let (_, scene_cols) = mean_scene.size();
        let (image_rows, image_cols) = synth.size();
        let timeline = FrameTimeline::from_params(params, scene_cols);
        let display_name = display.name();
        info!(
            display = %display_name,
            mosaic = mosaic.label(),
            integration_ms = mosaic.integration_time() * 1e3,
            frames = timeline.len(),
            sweep_start = *timeline.sweep_window().start(),
            sweep_end = *timeline.sweep_window().end(),
            "starting bar sweep"
        );

        let density = self
            .toolbox
            .density
            .linear_density(params.eccentricity, params.eye)?;
        let geometry = MosaicGeometry::for_field(
            mean_scene.fov_deg(),
            mean_scene.vertical_fov_deg(),
            1.0 / density,
        )?;
        mosaic.configure_geometry(geometry)?;

        let mut movie = None;
        if timeline.first_sweep_frame().is_some() {
            movie = Some(RawMovie::allocate(
                image_rows,
                image_cols,
                timeline.len(),
                CHANNELS,
            ));
            mosaic.prime(&mean_optical_image)?;
        } else {
            warn!(
                scene_cols,
                bar_width = params.bar_width,
                "empty sweep window, every frame is background"
            );
        }

        let path = EyePath::stationary(1);
        let mut timer = HighPrecisionTimer::with_capacity(timeline.len().max(1));
        let mut reporter = ProgressReporter::new(timeline.len(), self.show_progress);
        let mut last_sweep = None;

        for slot in timeline.iter() {
            let started = timer.now();
            match slot.stimulus {
                FrameStimulus::Uniform => {
                    mosaic.accumulate(&mean_optical_image, &path)?;
                }
                FrameStimulus::Bar(_) => {
                    let image = synth.render(&slot.stimulus);
                    let scene = self.scene(&image, params, &display)?;
                    let oi = self.toolbox.optics.compute(&scene)?;
                    if let Some(movie) = movie.as_mut() {
                        movie.store_frame(slot.index - 1, &image)?;
                    }
                    mosaic.accumulate(&oi, &path)?;
                    last_sweep = Some((scene, oi));
                }
            }
            timer.record_frame(timer.elapsed(started));
            reporter.tick(slot.index);
            debug!(frame = slot.index, segment = slot.segment.label(), "frame appended");
        }

        let background_rate = if mosaic.requires_background_rate() {
            let mean_rate = mosaic
                .mean_absorption_rate()
                .ok_or(ToolboxError::NothingAccumulated)?;
            Some(BACKGROUND_RATE_FACTOR * mean_rate)
        } else {
            None
        };
        let photocurrent = mosaic.finalize(background_rate)?;

        let frame_stats = timer.stats();
        info!(
            frames = timeline.len(),
            steps = photocurrent.steps,
            simulated_ms = photocurrent.steps as f64 * mosaic.integration_time() * 1e3,
            ms_per_frame = frame_stats.average_frame_time_ns / 1_000_000.0,
            "bar sweep complete"
        );

        let (last_scene, last_optical_image) = match last_sweep {
            Some((scene, oi)) => (Some(scene), Some(oi)),
            None => (None, None),
        };
        Ok(ResultBundle {
            params: params.clone(),
            display,
            timeline,
            mean_scene,
            mean_optical_image,
            last_scene,
            last_optical_image,
            movie,
            mosaic,
            photocurrent,
            background_rate,
            frame_stats,
        })
    }

    fn scene(
        &self,
        image: &RgbImage,
        params: &StimulusParameters,
        display: &DisplayCalibration,
    ) -> Result<Scene, ToolboxError> {
        let mut scene =
            self.toolbox
                .scenes
                .build(image, ColorSpace::Rgb, params.mean_luminance, display)?;
        scene.set_fov(params.fov_deg);
        Ok(scene)
    }
}
