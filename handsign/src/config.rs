//! TOML configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::hand::estimator::DEFAULT_THRESHOLD;
use crate::hand::template::{GestureTemplate, TemplateRegistry};

/// Camera capture request forwarded to the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub width: u32,
    pub height: u32,
    /// Target frames per second; also the frame loop cadence.
    pub fps: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
        }
    }
}

impl VideoConfig {
    /// Delay between frame cycles.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.fps.max(1)))
    }
}

/// External detector command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub command: Vec<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            command: vec!["python3".to_string(), "hand_detect.py".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum match score as a fraction of the maximum (1.0).
    pub threshold: f32,
    pub flip_horizontal: bool,
    /// Emit per-keypoint draw events.
    pub emit_points: bool,
    pub status_interval_secs: u64,
    pub video: VideoConfig,
    pub detector: DetectorConfig,
    /// Custom templates, in priority order; empty selects the built-ins.
    #[serde(rename = "gesture", skip_serializing_if = "Vec::is_empty")]
    pub gestures: Vec<GestureTemplate>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            flip_horizontal: true,
            emit_points: true,
            status_interval_secs: 60,
            video: VideoConfig::default(),
            detector: DetectorConfig::default(),
            gestures: Vec::new(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=240).contains(&self.video.fps) {
            bail!("video.fps must be in 1..=240, got {}", self.video.fps);
        }
        if self.video.width == 0 || self.video.height == 0 {
            bail!(
                "video resolution must be non-zero, got {}x{}",
                self.video.width,
                self.video.height
            );
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            bail!("threshold must be in [0, 1], got {}", self.threshold);
        }
        Ok(())
    }

    /// Build the template registry this config selects.
    pub fn registry(&self) -> Result<TemplateRegistry> {
        if self.gestures.is_empty() {
            return Ok(TemplateRegistry::builtin().clone());
        }
        TemplateRegistry::new(self.gestures.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.video.fps, 30);
        assert!((config.threshold - 0.9).abs() < f32::EPSILON);
        assert_eq!(config.registry().unwrap().len(), 2);
    }

    #[test]
    fn test_frame_interval() {
        let video = VideoConfig {
            fps: 20,
            ..VideoConfig::default()
        };
        assert_eq!(video.frame_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("threshold = 0.8\n[video]\nfps = 15\n").unwrap();
        assert!((config.threshold - 0.8).abs() < f32::EPSILON);
        assert_eq!(config.video.fps, 15);
        assert_eq!(config.video.width, 640);
        assert!(config.flip_horizontal);
        assert!(config.gestures.is_empty());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.video.fps = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.threshold = 9.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_custom_gestures() {
        let src = r#"
            [[gesture]]
            name = "victory"
            curls = [
                { finger = "index", target = "no-curl" },
                { finger = "middle", target = "no-curl" },
                { finger = "ring", target = "full-curl" },
            ]
        "#;
        let config: Config = toml::from_str(src).unwrap();
        let registry = config.registry().unwrap();
        assert_eq!(registry.names(), vec!["victory"]);
    }

    #[test]
    fn test_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("handsign-config-{}.toml", std::process::id()));
        let mut config = Config::default();
        config.gestures = TemplateRegistry::builtin().templates().to_vec();
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }
}
