// src/motion/controller.rs - Coordinates drives, calibration, triggers and safety
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::motion::calibration::Calibration;
use crate::motion::drive::{self, Amplifier, DriveSettings, HomeConfig, Network};
use crate::motion::event_log::EventLog;
use crate::motion::safety::SafetyMonitor;
use crate::motion::trigger::TriggerHandler;
use crate::motion::{ControllerState, MotionError, MotionStatus};

pub struct MotionController {
    network: Network,
    axes: Vec<Amplifier>,
    initialized: bool,
    state: ControllerState,
    calibration: Calibration,
    triggers: Arc<TriggerHandler>,
    safety: SafetyMonitor,
    log: EventLog,
    home_config: HomeConfig,
    home_timeout: Duration,
    calibrated_moves: bool,
}

impl MotionController {
    /// Build a controller for `axes` axes (clamped to at least one).
    pub fn new(
        calibration: Calibration,
        triggers: Arc<TriggerHandler>,
        safety: SafetyMonitor,
        log: EventLog,
        axes: usize,
    ) -> Self {
        let axes = axes.max(1);
        Self {
            network: Network::new(),
            axes: vec![Amplifier::new(); axes],
            initialized: false,
            state: ControllerState::Idle,
            calibration,
            triggers,
            safety,
            log,
            home_config: HomeConfig::default(),
            home_timeout: Duration::from_millis(20000),
            calibrated_moves: true,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let axes = config.controller.axes;
        let mut safety = SafetyMonitor::new(axes);
        for (axis, bounds) in config.safety.bounds.iter().enumerate() {
            safety.set_axis_bounds(axis, bounds.min, bounds.max);
        }
        let mut controller = Self::new(
            Calibration::new(config.calibration.matrix),
            Arc::new(TriggerHandler::new()),
            safety,
            EventLog::new(config.logging.history),
            axes,
        );
        controller.home_config = config.homing.home_config();
        controller.home_timeout = config.homing.timeout();
        controller.calibrated_moves = config.controller.calibrated_moves;
        controller
    }

    pub fn with_home_config(mut self, config: HomeConfig, timeout: Duration) -> Self {
        self.home_config = config;
        self.home_timeout = timeout;
        self
    }

    fn fail(&mut self, message: impl Into<String>, error: MotionError) -> MotionError {
        self.log.record(message);
        self.state = ControllerState::Error;
        error
    }

    /// Open the drive network and bring up every axis.
    pub fn initialize(&mut self) -> Result<(), MotionError> {
        if let Err(source) = self.network.open() {
            return Err(self.fail("Error: Failed to open network", MotionError::Drive { axis: 0, source }));
        }
        let settings = DriveSettings::default();
        let (primary, rest) = match self.axes.split_first_mut() {
            Some(split) => split,
            None => return Ok(()),
        };
        if let Err(source) = primary.init(&self.network, -1, settings) {
            return Err(self.fail(
                "Error: Failed to initialize primary axis",
                MotionError::Drive { axis: 0, source },
            ));
        }
        self.log.record("Primary axis initialized");

        let mut failure = None;
        for (i, axis) in rest.iter_mut().enumerate() {
            let number = i + 2;
            match axis.init_sub_axis(primary, number as i32, settings) {
                Ok(()) => self.log.record(format!("Axis {} initialized", number)),
                Err(source) => {
                    failure = Some((number, source));
                    break;
                }
            }
        }
        if let Some((number, source)) = failure {
            return Err(self.fail(
                format!("Error: Failed to initialize axis {}", number),
                MotionError::Drive { axis: number - 1, source },
            ));
        }

        self.initialized = true;
        self.state = ControllerState::Idle;
        self.log.record("MotionController initialization complete");
        Ok(())
    }

    /// Home every axis and wait for the sequence to settle.
    pub fn home_all(&mut self) -> Result<(), MotionError> {
        if !self.initialized {
            return Err(self.fail(
                "Home failed: MotionController not initialized",
                MotionError::HomeNotInitialized,
            ));
        }
        self.log.record("Starting homing sequence for all axes...");

        let config = self.home_config;
        let mut failure = None;
        for (i, axis) in self.axes.iter_mut().enumerate() {
            if let Err(source) = axis.go_home(&config) {
                failure = Some((i, source));
                break;
            }
        }
        if let Some((i, source)) = failure {
            return Err(self.fail(
                format!("Error: Failed to home axis {}", i + 1),
                MotionError::Drive { axis: i, source },
            ));
        }

        if let Err(source) = drive::wait_move_done(&self.axes, self.home_timeout) {
            return Err(self.fail(
                "Error: Timeout or failure during homing wait",
                MotionError::Drive { axis: 0, source },
            ));
        }

        self.state = ControllerState::Idle;
        self.log.record("Homing complete on all axes.");
        Ok(())
    }

    /// Move using the configured coordinate frame.
    pub fn move_to(&mut self, targets: &[f64]) -> Result<(), MotionError> {
        self.move_to_with(targets, self.calibrated_moves)
    }

    /// Move every axis to `targets`. When `calibrated` is set the targets are
    /// world coordinates and pass through the calibration transform first.
    pub fn move_to_with(&mut self, targets: &[f64], calibrated: bool) -> Result<(), MotionError> {
        if !self.initialized {
            return Err(self.fail("Move failed: MotionController not initialized", MotionError::NotInitialized));
        }
        if self.safety.is_emergency_stop() {
            self.log.record("Move aborted: Emergency Stop is active");
            self.state = ControllerState::EmergencyStop;
            return Err(MotionError::EmergencyStop);
        }
        if targets.len() != self.axes.len() {
            let error = MotionError::AxisCountMismatch {
                expected: self.axes.len(),
                actual: targets.len(),
            };
            return Err(self.fail("Move failed: Target position vector size mismatch", error));
        }

        let stage = if calibrated {
            let stage = self.calibration.apply(targets);
            if self.axes.len() >= 2 {
                self.log.record(format!(
                    "Applied calibration transform: [{:.6},{:.6}] -> [{:.6},{:.6}]",
                    targets[0], targets[1], stage[0], stage[1]
                ));
            } else {
                self.log.record("Applied calibration transform to target positions");
            }
            stage
        } else {
            targets.to_vec()
        };

        if !self.safety.check_position(&stage) {
            return Err(self.fail("Move denied: Target position out of safety bounds", MotionError::OutOfBounds));
        }

        let listed: Vec<String> = stage.iter().map(|p| format!("{:.6}", p)).collect();
        self.log.record(format!("Moving to positions: [{}]", listed.join(",")));
        self.state = ControllerState::Moving;

        let mut failure = None;
        for (i, (axis, &target)) in self.axes.iter_mut().zip(stage.iter()).enumerate() {
            if let Err(source) = axis.move_abs(target) {
                failure = Some((i, target, source));
                break;
            }
        }
        if let Some((i, target, source)) = failure {
            return Err(self.fail(
                format!("Error moving axis {} to position {:.6}", i + 1, target),
                MotionError::Drive { axis: i, source },
            ));
        }

        self.state = ControllerState::Idle;
        self.log.record("Move completed");
        Ok(())
    }

    /// Halt every axis and latch the safety lockout.
    pub fn emergency_stop(&mut self) {
        for (i, axis) in self.axes.iter_mut().enumerate() {
            if let Err(e) = axis.stop() {
                tracing::debug!("Stop skipped on axis {}: {}", i + 1, e);
            }
        }
        self.safety.trigger_estop();
        self.state = ControllerState::EmergencyStop;
        self.log.record("Emergency Stop engaged! All motion halted.");
    }

    /// Release the safety lockout so moves are accepted again.
    ///
    /// Does nothing unless an emergency stop is engaged; other states are kept.
    pub fn clear_emergency_stop(&mut self) {
        if !self.safety.is_emergency_stop() && self.state != ControllerState::EmergencyStop {
            return;
        }
        self.safety.clear_estop();
        self.state = ControllerState::Idle;
        self.log.record("Emergency Stop cleared");
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    /// Current position of `axis`, or 0.0 for an unknown axis.
    pub fn axis_position(&self, axis: usize) -> f64 {
        self.axes.get(axis).map(Amplifier::position).unwrap_or(0.0)
    }

    pub fn status(&self) -> MotionStatus {
        MotionStatus {
            state: self.state,
            initialized: self.initialized,
            emergency_stop: self.safety.is_emergency_stop(),
            positions: self.axes.iter().map(Amplifier::position).collect(),
        }
    }

    pub fn triggers(&self) -> &Arc<TriggerHandler> {
        &self.triggers
    }

    pub fn event_log(&self) -> &EventLog {
        &self.log
    }
}
