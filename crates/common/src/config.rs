//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{HandweaveError, HandweaveResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Gesture classifier thresholds.
    pub classifier: ClassifierSettings,

    /// Formation generator parameters.
    pub formation: FormationSettings,

    /// Per-tick smoothing parameters.
    pub motion: MotionSettings,

    /// Render and detection cadence.
    pub scheduler: SchedulerSettings,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Gesture classifier thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Planar thumb-to-index distance (normalized units) below which a pinch fires.
    pub pinch_threshold: f64,
}

/// Parameters of the three precomputed formations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationSettings {
    /// Number of managed objects. Fixed for the session.
    pub object_count: usize,

    /// Scatter samples each axis from `[-half_extent, half_extent]`.
    pub scatter_half_extent: f64,

    /// Radius of the tree spiral shell.
    pub tree_radius: f64,

    /// Vertical spacing between consecutive tree slots.
    pub tree_vertical_step: f64,

    /// Height of tree slot 0.
    pub tree_vertical_offset: f64,

    /// Radius of the focus arc.
    pub focus_radius: f64,

    /// Angle (radians) between neighbouring focus slots.
    pub focus_angle_step: f64,

    /// Focus slots per row.
    pub focus_columns: usize,

    /// Vertical spacing between focus rows.
    pub focus_row_spacing: f64,

    /// Height of the first focus row.
    pub focus_top: f64,
}

/// Smoothing parameters for the motion integrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionSettings {
    /// Per-tick interpolation weight for object pose.
    pub object_smoothing: f64,

    /// Per-tick interpolation weight for the camera.
    pub camera_smoothing: f64,

    /// Amplitude of the sinusoidal camera drift on x/y.
    pub camera_drift_amplitude: f64,

    /// Resting camera position. Also the look-at reference for object rotations.
    pub camera_rest: [f64; 3],
}

/// Cadence of the two periodic activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Render/motion ticks per second.
    pub tick_rate_hz: u32,

    /// How long the detection task yields when the source has nothing ready.
    pub detection_poll_interval_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "handweave_session=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            pinch_threshold: 0.05,
        }
    }
}

impl Default for FormationSettings {
    fn default() -> Self {
        Self {
            object_count: 50,
            scatter_half_extent: 2000.0,
            tree_radius: 800.0,
            tree_vertical_step: 20.0,
            tree_vertical_offset: -500.0,
            focus_radius: 1200.0,
            focus_angle_step: 0.175,
            focus_columns: 10,
            focus_row_spacing: 180.0,
            focus_top: 400.0,
        }
    }
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            object_smoothing: 0.05,
            camera_smoothing: 0.01,
            camera_drift_amplitude: 100.0,
            camera_rest: [0.0, 0.0, 3000.0],
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            detection_poll_interval_ms: 1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &Path) -> HandweaveResult<Self> {
        if !path.exists() {
            return Err(HandweaveError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> HandweaveResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> HandweaveResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> HandweaveResult<()> {
        if self.formation.object_count == 0 {
            return Err(HandweaveError::config("formation.object_count must be > 0"));
        }
        if self.formation.focus_columns == 0 {
            return Err(HandweaveError::config("formation.focus_columns must be > 0"));
        }
        if self.scheduler.tick_rate_hz == 0 {
            return Err(HandweaveError::config("scheduler.tick_rate_hz must be > 0"));
        }
        if !(self.classifier.pinch_threshold > 0.0) {
            return Err(HandweaveError::config(
                "classifier.pinch_threshold must be positive",
            ));
        }
        for (name, value) in [
            ("motion.object_smoothing", self.motion.object_smoothing),
            ("motion.camera_smoothing", self.motion.camera_smoothing),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(HandweaveError::config(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("handweave").join("config.json")
}
