//! # Service Configuration
//!
//! Everything the host needs at startup lives in a single TOML file. Every
//! section is optional; missing fields fall back to the defaults below.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8080"
//! request_queue = 16
//!
//! [controller]
//! backend = "simulated"
//! axes = 2
//! calibrated_moves = true
//!
//! [calibration]
//! matrix = [1.0, 0.0, 5.0,
//!           0.0, 1.0, 0.0,
//!           0.0, 0.0, 1.0]
//!
//! [[safety.bounds]]
//! min = 0.0
//! max = 100.0
//!
//! [homing]
//! method = "index_pos"
//! timeout_ms = 20000
//!
//! [logging]
//! level = "debug"
//! ```

// src/config.rs - Single configuration file
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::motion::drive::{HomeConfig, HomeMethod};
use crate::motion::safety::DEFAULT_AXIS_LIMIT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration struct for the HTTP server, motion backend and simulated engine.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub safety: SafetyConfig,
    #[serde(default)]
    pub homing: HomingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Depth of the request channel in front of the motion worker.
    #[serde(default = "default_request_queue")]
    pub request_queue: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            request_queue: default_request_queue(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Simulated,
    Native,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Simulated => write!(f, "simulated"),
            BackendKind::Native => write!(f, "native"),
        }
    }
}

/// Motion backend selection and controller shape.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControllerConfig {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_axes")]
    pub axes: usize,
    /// Treat incoming move targets as world coordinates and apply calibration.
    #[serde(default = "default_calibrated_moves")]
    pub calibrated_moves: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            axes: default_axes(),
            calibrated_moves: default_calibrated_moves(),
        }
    }
}

/// Row-major 3x3 homogeneous transform applied to (X, Y).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CalibrationConfig {
    #[serde(default = "default_matrix")]
    pub matrix: [f64; 9],
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self { matrix: default_matrix() }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for AxisBounds {
    fn default() -> Self {
        Self {
            min: -DEFAULT_AXIS_LIMIT,
            max: DEFAULT_AXIS_LIMIT,
        }
    }
}

/// Per-axis travel limits. Axes without an entry keep the default limits.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SafetyConfig {
    #[serde(default)]
    pub bounds: Vec<AxisBounds>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HomingConfig {
    #[serde(default)]
    pub method: HomeMethod,
    #[serde(default)]
    pub offset: i32,
    #[serde(default = "default_vel_fast")]
    pub vel_fast: i32,
    #[serde(default = "default_vel_slow")]
    pub vel_slow: i32,
    #[serde(default = "default_home_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for HomingConfig {
    fn default() -> Self {
        Self {
            method: HomeMethod::default(),
            offset: 0,
            vel_fast: default_vel_fast(),
            vel_slow: default_vel_slow(),
            timeout_ms: default_home_timeout_ms(),
        }
    }
}

impl HomingConfig {
    pub fn home_config(&self) -> HomeConfig {
        HomeConfig {
            method: self.method,
            offset: self.offset,
            vel_fast: self.vel_fast,
            vel_slow: self.vel_slow,
        }
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Number of engine events kept in memory for `/motion/events`.
    #[serde(default = "default_history")]
    pub history: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            history: default_history(),
        }
    }
}

impl LoggingConfig {
    pub fn tracing_level(&self) -> Result<tracing::Level, ConfigError> {
        self.level
            .parse::<tracing::Level>()
            .map_err(|_| ConfigError::Invalid(format!("Unknown log level '{}'", self.level)))
    }
}

impl Config {
    /// Validate ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.controller.axes == 0 {
            return Err(ConfigError::Invalid("controller.axes must be >= 1".to_string()));
        }
        if self.server.request_queue == 0 {
            return Err(ConfigError::Invalid("server.request_queue must be >= 1".to_string()));
        }
        for (axis, bounds) in self.safety.bounds.iter().enumerate() {
            if !bounds.min.is_finite() || !bounds.max.is_finite() {
                return Err(ConfigError::Invalid(format!("Bounds for axis {} must be finite", axis)));
            }
            if bounds.min > bounds.max {
                return Err(ConfigError::Invalid(format!(
                    "Bounds for axis {} have min {} > max {}",
                    axis, bounds.min, bounds.max
                )));
            }
        }
        if self.calibration.matrix.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Invalid("Calibration matrix entries must be finite".to_string()));
        }
        self.logging.tracing_level()?;
        Ok(())
    }
}

// Default value functions
fn default_bind() -> String { "0.0.0.0:8080".to_string() }
fn default_request_queue() -> usize { 16 }
fn default_axes() -> usize { 2 }
fn default_calibrated_moves() -> bool { true }
fn default_matrix() -> [f64; 9] { [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0] }
fn default_vel_fast() -> i32 { 10000 }
fn default_vel_slow() -> i32 { 1000 }
fn default_home_timeout_ms() -> u64 { 20000 }
fn default_log_level() -> String { "info".to_string() }
fn default_history() -> usize { 1024 }

/// Load configuration from a TOML file at the given path.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::error!("Failed to parse config TOML: {}", e);
                Err(ConfigError::Toml(e))
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file '{}': {}", path.display(), e);
            Err(ConfigError::Io(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.server.request_queue, 16);
        assert_eq!(config.controller.backend, BackendKind::Simulated);
        assert_eq!(config.controller.axes, 2);
        assert!(config.controller.calibrated_moves);
        assert_eq!(config.calibration.matrix[0], 1.0);
        assert_eq!(config.calibration.matrix[4], 1.0);
        assert_eq!(config.calibration.matrix[8], 1.0);
        assert_eq!(config.homing.vel_fast, 10000);
        assert_eq!(config.homing.vel_slow, 1000);
        assert_eq!(config.homing.timeout_ms, 20000);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_success() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("motion.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(
            file,
            "[controller]\nbackend = 'native'\naxes = 3\n\n[[safety.bounds]]\nmin = -5.0\nmax = 5.0"
        )
        .unwrap();
        file.flush().unwrap();
        let config = load_config(&file_path).unwrap();
        assert_eq!(config.controller.backend, BackendKind::Native);
        assert_eq!(config.controller.axes, 3);
        assert_eq!(config.safety.bounds, vec![AxisBounds { min: -5.0, max: 5.0 }]);
        // Defaults for missing fields
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert!(config.controller.calibrated_moves);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent_file.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("bad.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "not a valid toml").unwrap();
        file.flush().unwrap();
        let result = load_config(&file_path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_homing_method_parsing() {
        let toml = r#"
        [homing]
        method = "index_pos"
        offset = 12
        timeout_ms = 500
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.homing.method, HomeMethod::IndexPos);
        assert_eq!(config.homing.home_config().offset, 12);
        assert_eq!(config.homing.timeout(), std::time::Duration::from_millis(500));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.controller.axes = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.safety.bounds = vec![AxisBounds { min: 10.0, max: 0.0 }];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.calibration.matrix[2] = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.request_queue = 0;
        match config.validate() {
            Err(ConfigError::Invalid(msg)) => assert!(msg.contains("request_queue")),
            other => panic!("expected invalid request_queue, got {:?}", other),
        }

        let mut config = Config::default();
        config.safety.bounds = vec![AxisBounds { min: 0.0, max: f64::INFINITY }];
        match config.validate() {
            Err(ConfigError::Invalid(msg)) => assert!(msg.contains("finite")),
            other => panic!("expected non-finite bounds rejection, got {:?}", other),
        }

        let mut config = Config::default();
        config.safety.bounds = vec![Default::default(), AxisBounds { min: f64::NAN, max: 1.0 }];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
