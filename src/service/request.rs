//! Defines the messages exchanged between the web handlers and the motion worker.

use tokio::sync::oneshot;

use crate::motion::{EventRecord, MotionError, MotionStatus, TriggerId};

pub type Reply<T> = oneshot::Sender<Result<T, MotionError>>;

/// A request sent from a web handler to the motion worker.
#[derive(Debug)]
pub enum MotionRequest {
    Initialize {
        respond_to: Reply<()>,
    },
    HomeAll {
        respond_to: Reply<()>,
    },
    /// Move to the given positions. The vector is handed to the backend untouched.
    MoveTo {
        positions: Vec<f64>,
        respond_to: Reply<()>,
    },
    EmergencyStop {
        respond_to: Reply<()>,
    },
    ClearEmergencyStop {
        respond_to: Reply<()>,
    },
    GetStatus {
        respond_to: Reply<MotionStatus>,
    },
    GetEvents {
        respond_to: Reply<Vec<EventRecord>>,
    },
    SetTrigger {
        id: TriggerId,
        active: bool,
        respond_to: Reply<()>,
    },
    GetTrigger {
        id: TriggerId,
        respond_to: Reply<bool>,
    },
}

impl MotionRequest {
    pub fn operation(&self) -> &'static str {
        match self {
            MotionRequest::Initialize { .. } => "initialize",
            MotionRequest::HomeAll { .. } => "home_all",
            MotionRequest::MoveTo { .. } => "move_to",
            MotionRequest::EmergencyStop { .. } => "emergency_stop",
            MotionRequest::ClearEmergencyStop { .. } => "clear_emergency_stop",
            MotionRequest::GetStatus { .. } => "status",
            MotionRequest::GetEvents { .. } => "events",
            MotionRequest::SetTrigger { .. } => "set_trigger",
            MotionRequest::GetTrigger { .. } => "trigger_state",
        }
    }
}
