//! flight_tasks - horizontal half of the manual position flight task
//!
//! Runs once per control tick on the flight controller:
//!
//! - [`stick`]: shapes the two-axis stick into a bounded velocity command
//!   rotated into the local frame
//! - [`hold`]: brake-and-hold decision, latches the position once the
//!   vehicle has actually stopped
//! - [`task`]: composes the vertical/yaw result of the base task with the
//!   horizontal velocity and position setpoints
//! - [`params`]: tunable limits, snapshotted once per tick
//!
//! Everything here is pure computation over already fetched inputs: no
//! allocation, no I/O, no platform dependency. Enable the `defmt` feature
//! to derive `defmt::Format` on the public types.

#![no_std]

pub mod error;
pub mod hold;
pub mod params;
pub mod setpoint;
pub mod stick;
pub mod task;
pub mod vector;

pub use error::ParamError;
pub use hold::{HoldState, PositionHold};
pub use params::{ConfigLimits, ParamStore};
pub use setpoint::{CombinedSetpoint, HorizontalEstimate, VerticalYawProvider, VerticalYawSetpoint};
pub use stick::StickInput;
pub use task::ManualPositionTask;
pub use vector::Vector2;
