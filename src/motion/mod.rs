// src/motion/mod.rs - Simulated motion engine
pub mod calibration;
pub mod controller;
pub mod drive;
pub mod event_log;
pub mod safety;
pub mod trigger;

pub use calibration::{Calibration, CalibrationMatrix};
pub use controller::MotionController;
pub use drive::{DriveError, HomeConfig, HomeMethod};
pub use event_log::{EventLog, EventRecord};
pub use safety::SafetyMonitor;
pub use trigger::{TriggerHandler, TriggerId};

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MotionError {
    #[error("MotionController not initialized")]
    NotInitialized,
    /// Homing requested before initialization; reported with its own code.
    #[error("MotionController not initialized")]
    HomeNotInitialized,
    #[error("Emergency stop active")]
    EmergencyStop,
    #[error("Incorrect number of target positions: expected {expected}, got {actual}")]
    AxisCountMismatch { expected: usize, actual: usize },
    #[error("Target position out of safety bounds")]
    OutOfBounds,
    #[error("Drive fault on axis {axis}: {source}")]
    Drive {
        axis: usize,
        #[source]
        source: DriveError,
    },
    #[error("Native motion library returned error code {0}")]
    Native(i32),
    #[error("{operation} is not supported by the {backend} backend")]
    Unsupported {
        operation: &'static str,
        backend: &'static str,
    },
    #[error("Motion worker unavailable")]
    WorkerUnavailable,
}

impl MotionError {
    /// Numeric error code reported alongside the message.
    pub fn code(&self) -> i32 {
        match self {
            MotionError::NotInitialized => -100,
            MotionError::HomeNotInitialized => -110,
            MotionError::EmergencyStop => -101,
            MotionError::AxisCountMismatch { .. } => -102,
            MotionError::OutOfBounds => -103,
            MotionError::Drive { source, .. } => source.code(),
            MotionError::Native(code) => *code,
            MotionError::Unsupported { .. } => -200,
            MotionError::WorkerUnavailable => -201,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    Idle,
    Moving,
    Error,
    EmergencyStop,
}

/// Snapshot of the controller reported by `/motion/status`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MotionStatus {
    pub state: ControllerState,
    pub initialized: bool,
    pub emergency_stop: bool,
    pub positions: Vec<f64>,
}
