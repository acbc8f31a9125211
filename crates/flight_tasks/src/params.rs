//! Manual position tunables.
//!
//! # Parameters
//!
//! - `MPC_VEL_MANUAL` - maximum horizontal speed commanded by the sticks (m/s)
//! - `MPC_ACC_HOR_MAX` - maximum horizontal acceleration (m/s^2), consumed by
//!   the altitude/yaw base task
//! - `MPC_HOLD_MAX_XY` - speed below which the vehicle counts as stopped and
//!   the position is latched (m/s); 0 disables the check
//!
//! The store is written between ticks; the loop takes one [`ConfigLimits`]
//! snapshot at the start of every tick and passes it down.

use crate::error::ParamError;

/// Limits used for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigLimits {
    pub vel_manual_max: f32,
    pub acc_xy_max: f32,
    pub hold_max_xy: f32,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            vel_manual_max: VEL_MANUAL.default,
            acc_xy_max: ACC_HOR_MAX.default,
            hold_max_xy: HOLD_MAX_XY.default,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ParamDef {
    name: &'static str,
    default: f32,
    min: f32,
    max: f32,
}

const VEL_MANUAL: ParamDef = ParamDef {
    name: "MPC_VEL_MANUAL",
    default: 10.0,
    min: 3.0,
    max: 20.0,
};

const ACC_HOR_MAX: ParamDef = ParamDef {
    name: "MPC_ACC_HOR_MAX",
    default: 5.0,
    min: 2.0,
    max: 15.0,
};

const HOLD_MAX_XY: ParamDef = ParamDef {
    name: "MPC_HOLD_MAX_XY",
    default: 0.8,
    min: 0.0,
    max: 3.0,
};

const PARAM_COUNT: usize = 3;
const DEFS: [ParamDef; PARAM_COUNT] = [VEL_MANUAL, ACC_HOR_MAX, HOLD_MAX_XY];

/// Named parameter table, initialised to defaults.
#[derive(Debug, Clone)]
pub struct ParamStore {
    values: [f32; PARAM_COUNT],
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamStore {
    pub const fn new() -> Self {
        Self {
            values: [VEL_MANUAL.default, ACC_HOR_MAX.default, HOLD_MAX_XY.default],
        }
    }

    fn index_of(name: &str) -> Result<usize, ParamError> {
        DEFS.iter()
            .position(|d| d.name == name)
            .ok_or(ParamError::UnknownParameter)
    }

    pub fn get(&self, name: &str) -> Result<f32, ParamError> {
        Ok(self.values[Self::index_of(name)?])
    }

    /// Set a parameter, rejecting non-finite and out-of-range values.
    ///
    /// A rejected value leaves the stored one untouched.
    pub fn set(&mut self, name: &str, value: f32) -> Result<(), ParamError> {
        let idx = Self::index_of(name)?;
        if !value.is_finite() {
            return Err(ParamError::NotFinite);
        }
        let def = &DEFS[idx];
        if value < def.min || value > def.max {
            return Err(ParamError::OutOfRange);
        }
        self.values[idx] = value;
        Ok(())
    }

    /// Parameter names in table order.
    pub fn names() -> impl Iterator<Item = &'static str> {
        DEFS.iter().map(|d| d.name)
    }

    /// Snapshot for one tick.
    pub fn limits(&self) -> ConfigLimits {
        ConfigLimits {
            vel_manual_max: self.values[0],
            acc_xy_max: self.values[1],
            hold_max_xy: self.values[2],
        }
    }
}
