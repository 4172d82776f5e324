//! Motion backends: the seam between the HTTP service and whatever actually
//! moves the axes.
//!
//! Every backend provides the three core entry points. Status, emergency stop,
//! triggers and event history are optional; the defaults report
//! [`MotionError::Unsupported`].

pub mod native;
pub mod simulated;

use thiserror::Error;

use crate::config::{BackendKind, Config};
use crate::motion::{EventRecord, MotionController, MotionError, MotionStatus, TriggerId};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("The {0} backend is not compiled into this binary (enable the `{0}` feature)")]
    NotCompiled(BackendKind),
}

pub trait MotionBackend: Send {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    fn initialize(&mut self) -> Result<(), MotionError>;

    fn home_all(&mut self) -> Result<(), MotionError>;

    fn move_to(&mut self, positions: &[f64]) -> Result<(), MotionError>;

    fn emergency_stop(&mut self) -> Result<(), MotionError> {
        Err(self.unsupported("emergency_stop"))
    }

    fn clear_emergency_stop(&mut self) -> Result<(), MotionError> {
        Err(self.unsupported("clear_emergency_stop"))
    }

    fn status(&self) -> Result<MotionStatus, MotionError> {
        Err(self.unsupported("status"))
    }

    fn events(&self) -> Result<Vec<EventRecord>, MotionError> {
        Err(self.unsupported("events"))
    }

    fn set_trigger(&mut self, _id: TriggerId, _active: bool) -> Result<(), MotionError> {
        Err(self.unsupported("set_trigger"))
    }

    fn trigger_state(&self, _id: TriggerId) -> Result<bool, MotionError> {
        Err(self.unsupported("trigger_state"))
    }

    fn unsupported(&self, operation: &'static str) -> MotionError {
        MotionError::Unsupported {
            operation,
            backend: self.name(),
        }
    }
}

/// Construct the backend selected by `config.controller.backend`.
pub fn build(config: &Config) -> Result<Box<dyn MotionBackend>, BackendError> {
    match config.controller.backend {
        BackendKind::Simulated => {
            tracing::info!(
                "Using simulated motion engine with {} axes",
                config.controller.axes.max(1)
            );
            Ok(Box::new(MotionController::from_config(config)))
        }
        #[cfg(feature = "native")]
        BackendKind::Native => {
            tracing::info!("Using native motion library '{}'", native::LIBRARY_NAME);
            Ok(Box::new(native::NativeBackend::new()))
        }
        #[cfg(not(feature = "native"))]
        BackendKind::Native => Err(BackendError::NotCompiled(BackendKind::Native)),
    }
}
