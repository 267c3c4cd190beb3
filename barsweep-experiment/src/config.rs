use barsweep_core::StimulusParameters;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::driver::ExperimentError;

/// Settings of one bar-sweep experiment, read from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    #[serde(default)]
    pub stimulus: StimulusParameters,
    /// Where the stimulus/response record is written.
    #[serde(default = "ExperimentConfig::default_record_path")]
    pub record_path: PathBuf,
    /// Optional dump of the raw RGB movie as native-endian f32.
    #[serde(default)]
    pub movie_path: Option<PathBuf>,
    #[serde(default = "ExperimentConfig::default_show_progress")]
    pub show_progress: bool,
}

impl ExperimentConfig {
    fn default_record_path() -> PathBuf {
        PathBuf::from("bar_sweep_record.json")
    }

    fn default_show_progress() -> bool {
        true
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExperimentError> {
        let text = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ExperimentError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            stimulus: StimulusParameters::default(),
            record_path: Self::default_record_path(),
            movie_path: None,
            show_progress: Self::default_show_progress(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barsweep_core::MosaicKind;

    #[test]
    fn partial_json_fills_in_defaults() {
        let cfg: ExperimentConfig = serde_json::from_str(
            r#"{ "stimulus": { "bar_width": 6, "mosaic": "biophysical" }, "show_progress": false }"#,
        )
        .unwrap();
        assert_eq!(cfg.stimulus.bar_width, 6);
        assert_eq!(cfg.stimulus.mosaic, MosaicKind::Biophysical);
        assert_eq!(cfg.stimulus.pre_roll, 60);
        assert_eq!(cfg.record_path, PathBuf::from("bar_sweep_record.json"));
        assert!(!cfg.show_progress);
    }

    #[test]
    fn empty_object_equals_default() {
        let cfg: ExperimentConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, ExperimentConfig::default());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = ExperimentConfig::load_or_default("/definitely/not/here/barsweep.json").unwrap();
        assert_eq!(cfg, ExperimentConfig::default());
        assert!(ExperimentConfig::load("/definitely/not/here/barsweep.json").is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let path = std::env::temp_dir().join(format!("barsweep-bad-{}.json", std::process::id()));
        fs::write(&path, "{ not json").unwrap();
        let err = ExperimentConfig::load(&path).unwrap_err();
        assert!(matches!(err, ExperimentError::Json(_)));
        let _ = fs::remove_file(&path);
    }
}
