// motion-host: HTTP front end for a motion control backend

pub mod backend;
pub mod config;
pub mod motion;
pub mod service;
pub mod web;

pub use backend::{BackendError, MotionBackend};
pub use config::{BackendKind, Config, ConfigError};
pub use motion::{ControllerState, MotionController, MotionError, MotionStatus};
pub use service::MotionService;
