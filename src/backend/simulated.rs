// src/backend/simulated.rs - In-process engine behind the backend trait
use crate::backend::MotionBackend;
use crate::motion::{EventRecord, MotionController, MotionError, MotionStatus, TriggerId};

impl MotionBackend for MotionController {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn initialize(&mut self) -> Result<(), MotionError> {
        MotionController::initialize(self)
    }

    fn home_all(&mut self) -> Result<(), MotionError> {
        MotionController::home_all(self)
    }

    fn move_to(&mut self, positions: &[f64]) -> Result<(), MotionError> {
        MotionController::move_to(self, positions)
    }

    fn emergency_stop(&mut self) -> Result<(), MotionError> {
        MotionController::emergency_stop(self);
        Ok(())
    }

    fn clear_emergency_stop(&mut self) -> Result<(), MotionError> {
        MotionController::clear_emergency_stop(self);
        Ok(())
    }

    fn status(&self) -> Result<MotionStatus, MotionError> {
        Ok(MotionController::status(self))
    }

    fn events(&self) -> Result<Vec<EventRecord>, MotionError> {
        Ok(self.event_log().entries())
    }

    fn set_trigger(&mut self, id: TriggerId, active: bool) -> Result<(), MotionError> {
        self.triggers().set_trigger(id, active);
        Ok(())
    }

    fn trigger_state(&self, id: TriggerId) -> Result<bool, MotionError> {
        Ok(self.triggers().is_triggered(id))
    }
}
