//! Contains the data models for API requests and responses.

use serde::{Deserialize, Serialize};

use crate::motion::TriggerId;

/// Fixed acknowledgement bodies.
pub const INITIALIZED: &str = "Initialized.";
pub const HOMING_COMPLETE: &str = "Homing complete.";
pub const MOVE_SENT: &str = "Move command sent.";
pub const ESTOP_ENGAGED: &str = "Emergency stop engaged.";
pub const ESTOP_CLEARED: &str = "Emergency stop cleared.";

/// Error body returned for any failed motion call.
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub code: i32,
}

/// Represents a request to change a trigger.
#[derive(Deserialize, Debug)]
pub struct TriggerUpdateRequest {
    pub active: bool,
}

/// Represents the state of a single trigger.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct TriggerResponse {
    pub id: TriggerId,
    pub active: bool,
}
