use anyhow::{Context, Result};
use barsweep_experiment::{ExperimentConfig, ExperimentOutcome, run_experiment};
use barsweep_toolbox::{BuiltinDisplays, Toolbox};
use tracing::info;

use crate::cli::Args;

pub struct App {
    config: ExperimentConfig,
    toolbox: Toolbox,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let mut config = ExperimentConfig::load_or_default(&args.config)
            .with_context(|| format!("reading config {}", args.config.display()))?;

        if let Some(output) = args.output {
            config.record_path = output;
        }
        if args.movie.is_some() {
            config.movie_path = args.movie;
        }
        if let Some(display) = args.display {
            config.stimulus.display = display;
        }
        if let Some(width) = args.bar_width {
            config.stimulus.bar_width = width;
        }
        if let Some(mosaic) = args.mosaic {
            config.stimulus.mosaic = mosaic;
        }
        if let Some(seed) = args.seed {
            config.stimulus.seed = seed;
        }
        if args.quiet {
            config.show_progress = false;
        }

        Ok(Self {
            config,
            toolbox: Toolbox::reference(),
        })
    }

    pub fn run(self) -> Result<()> {
        let params = &self.config.stimulus;
        println!("=== BAR SWEEP ===");
        println!(
            "Display: {} (known: {})",
            params.display,
            BuiltinDisplays::names().collect::<Vec<_>>().join(", ")
        );
        println!(
            "Image: {}x{} px, bar {} px, {:.2} deg, {:.0} cd/m2",
            params.image_rows,
            params.image_cols,
            params.bar_width,
            params.fov_deg,
            params.mean_luminance
        );
        println!("Mosaic: {} (seed {})\n", params.mosaic.label(), params.seed);

        info!(config = ?self.config, "running experiment");
        let outcome = run_experiment(&self.config, &self.toolbox)?;
        Self::print_summary(&outcome);
        Ok(())
    }

    fn print_summary(outcome: &ExperimentOutcome) {
        let record = &outcome.record;
        let stats = &record.frame_stats;
        println!(
            "Frames: {} (sweep {}..={})",
            record.frames, record.sweep_window.0, record.sweep_window.1
        );
        println!(
            "Cones: {}x{}, {} steps of {:.1} ms",
            record.outer_segment.rows,
            record.outer_segment.cols,
            record.outer_segment.steps,
            record.outer_segment.dt * 1e3
        );
        if let Some(rate) = record.outer_segment.background_rate {
            println!("Background rate: {:.1} R*/s", rate);
        }
        println!(
            "Frame time: avg {:.3}ms, min {:.3}ms, max {:.3}ms, jitter {:.3}ms",
            stats.average_frame_time_ns / 1e6,
            stats.min_frame_time_ns / 1e6,
            stats.max_frame_time_ns / 1e6,
            stats.jitter_ns / 1e6
        );
        println!("Record: {}", outcome.record_path.display());
        if let Some(path) = &outcome.movie_path {
            println!("Movie: {}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barsweep_core::MosaicKind;
    use clap::Parser;

    #[test]
    fn flags_override_the_config_file() {
        let args = Args::try_parse_from([
            "barsweep",
            "--config",
            "/definitely/not/here/barsweep.json",
            "--output",
            "out/record.json",
            "--display",
            "OLED-Sony",
            "--bar-width",
            "6",
            "--mosaic",
            "hexagonal",
            "--seed",
            "7",
            "--quiet",
        ])
        .unwrap();
        let app = App::new(args).unwrap();
        let cfg = &app.config;
        assert_eq!(cfg.record_path.to_str(), Some("out/record.json"));
        assert_eq!(cfg.stimulus.display, "OLED-Sony");
        assert_eq!(cfg.stimulus.bar_width, 6);
        assert_eq!(cfg.stimulus.mosaic, MosaicKind::Hexagonal);
        assert_eq!(cfg.stimulus.seed, 7);
        assert!(!cfg.show_progress);
        assert!(cfg.movie_path.is_none());
    }

    #[test]
    fn without_flags_the_defaults_stand() {
        let args =
            Args::try_parse_from(["barsweep", "--config", "/definitely/not/here.json"]).unwrap();
        let app = App::new(args).unwrap();
        assert_eq!(app.config, ExperimentConfig::default());
    }
}
