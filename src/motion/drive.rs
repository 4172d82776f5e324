// src/motion/drive.rs - Simulated amplifier network
//! Stand-in for the amplifier drive layer. Each `Amplifier` keeps a commanded
//! position and velocity; moves complete instantly.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum DriveError {
    #[error("Network not opened")]
    NetworkNotOpened,
    #[error("Master axis not initialized")]
    MasterNotInitialized,
    #[error("Axis not initialized")]
    AxisNotInitialized,
    #[error("Cannot home an uninitialized axis")]
    HomeAxisNotInitialized,
    #[error("Axis not initialized during wait")]
    WaitAxisNotInitialized,
}

impl DriveError {
    /// Numeric code reported to clients.
    pub fn code(&self) -> i32 {
        match self {
            DriveError::NetworkNotOpened => -1,
            DriveError::MasterNotInitialized => -2,
            DriveError::AxisNotInitialized => -3,
            DriveError::HomeAxisNotInitialized => -4,
            DriveError::WaitAxisNotInitialized => -5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HomeMethod {
    #[default]
    None,
    IndexPos,
    Switch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeConfig {
    pub method: HomeMethod,
    pub offset: i32,
    pub vel_fast: i32,
    pub vel_slow: i32,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            method: HomeMethod::None,
            offset: 0,
            vel_fast: 10000,
            vel_slow: 1000,
        }
    }
}

/// Connection to the drive network. Must be opened before any axis is initialized.
#[derive(Debug, Default)]
pub struct Network {
    opened: bool,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) -> Result<(), DriveError> {
        self.opened = true;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveSettings {
    pub synch_period: u32,
    pub guard_time: u32,
}

impl Default for DriveSettings {
    fn default() -> Self {
        Self {
            synch_period: 1000,
            guard_time: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Amplifier {
    initialized: bool,
    position: f64,
    velocity: f64,
    node_id: i32,
    settings: DriveSettings,
}

impl Amplifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind this amplifier to `node_id` on an open network.
    pub fn init(&mut self, network: &Network, node_id: i32, settings: DriveSettings) -> Result<(), DriveError> {
        if !network.is_open() {
            return Err(DriveError::NetworkNotOpened);
        }
        self.initialized = true;
        self.node_id = node_id;
        self.settings = settings;
        Ok(())
    }

    /// Initialize as a sub-axis driven through an already initialized master.
    pub fn init_sub_axis(&mut self, master: &Amplifier, sub_axis: i32, settings: DriveSettings) -> Result<(), DriveError> {
        if !master.initialized {
            return Err(DriveError::MasterNotInitialized);
        }
        self.initialized = true;
        self.node_id = sub_axis;
        self.settings = settings;
        Ok(())
    }

    pub fn move_abs(&mut self, target: f64) -> Result<(), DriveError> {
        self.ensure_initialized()?;
        self.position = target;
        self.velocity = 0.0;
        Ok(())
    }

    pub fn move_rel(&mut self, offset: f64) -> Result<(), DriveError> {
        self.ensure_initialized()?;
        self.position += offset;
        self.velocity = 0.0;
        Ok(())
    }

    pub fn move_vel(&mut self, velocity: f64) -> Result<(), DriveError> {
        self.ensure_initialized()?;
        self.velocity = velocity;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), DriveError> {
        self.ensure_initialized()?;
        self.velocity = 0.0;
        Ok(())
    }

    /// Run the homing sequence. The simulated drive lands on zero immediately.
    pub fn go_home(&mut self, config: &HomeConfig) -> Result<(), DriveError> {
        if !self.initialized {
            return Err(DriveError::HomeAxisNotInitialized);
        }
        tracing::debug!(
            node = self.node_id,
            method = ?config.method,
            vel_fast = config.vel_fast,
            vel_slow = config.vel_slow,
            "Homing axis"
        );
        self.position = 0.0;
        self.velocity = 0.0;
        Ok(())
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn node_id(&self) -> i32 {
        self.node_id
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn ensure_initialized(&self) -> Result<(), DriveError> {
        if self.initialized {
            Ok(())
        } else {
            Err(DriveError::AxisNotInitialized)
        }
    }
}

/// Wait for every amplifier to finish its current move.
pub fn wait_move_done(axes: &[Amplifier], timeout: Duration) -> Result<(), DriveError> {
    if axes.iter().any(|axis| !axis.is_initialized()) {
        return Err(DriveError::WaitAxisNotInitialized);
    }
    tracing::trace!("Moves settled within {:?}", timeout);
    Ok(())
}
