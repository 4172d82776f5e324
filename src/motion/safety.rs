// src/motion/safety.rs - Travel limits and emergency stop latch

/// Default travel limit applied symmetrically to every axis.
pub const DEFAULT_AXIS_LIMIT: f64 = 1e6;

#[derive(Debug, Clone)]
pub struct SafetyMonitor {
    min_bounds: Vec<f64>,
    max_bounds: Vec<f64>,
    emergency_stop: bool,
}

impl SafetyMonitor {
    /// Create a monitor for `axes` axes (at least one) with the default limits.
    pub fn new(axes: usize) -> Self {
        let axes = axes.max(1);
        Self {
            min_bounds: vec![-DEFAULT_AXIS_LIMIT; axes],
            max_bounds: vec![DEFAULT_AXIS_LIMIT; axes],
            emergency_stop: false,
        }
    }

    pub fn axes(&self) -> usize {
        self.min_bounds.len()
    }

    /// Set the allowed range for one axis. Unknown axes are ignored.
    pub fn set_axis_bounds(&mut self, axis: usize, min: f64, max: f64) {
        if axis >= self.min_bounds.len() {
            tracing::warn!("Ignoring bounds for unknown axis {}", axis);
            return;
        }
        self.min_bounds[axis] = min;
        self.max_bounds[axis] = max;
    }

    pub fn axis_bounds(&self, axis: usize) -> Option<(f64, f64)> {
        Some((*self.min_bounds.get(axis)?, *self.max_bounds.get(axis)?))
    }

    /// True when the emergency stop is released and every checked axis is in range.
    ///
    /// Only the first `min(positions.len(), axes)` entries are checked. Limits are inclusive.
    pub fn check_position(&self, positions: &[f64]) -> bool {
        if self.emergency_stop {
            return false;
        }
        positions
            .iter()
            .zip(self.min_bounds.iter().zip(self.max_bounds.iter()))
            .all(|(&p, (&min, &max))| p >= min && p <= max)
    }

    pub fn trigger_estop(&mut self) {
        self.emergency_stop = true;
    }

    pub fn clear_estop(&mut self) {
        self.emergency_stop = false;
    }

    pub fn is_emergency_stop(&self) -> bool {
        self.emergency_stop
    }
}

impl Default for SafetyMonitor {
    fn default() -> Self {
        Self::new(1)
    }
}
