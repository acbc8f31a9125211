//! Messages passed between tasks through Embassy signals.
//!
//! All `Copy`. A signal keeps only the newest value: a producer faster than
//! its consumer overwrites, the consumer never sees a stale backlog.

use flight_tasks::{CombinedSetpoint, HorizontalEstimate, Vector2};

#[derive(Clone, Copy)]
pub struct RcData {
    pub channels: [u16; 16],
}

impl Default for RcData {
    fn default() -> Self {
        // sticks centered, throttle mid, disarmed
        let mut channels = [992u16; 16];
        channels[4] = 172;
        Self { channels }
    }
}

/// One horizontal estimator sample, published only from a valid fix.
#[derive(Clone, Copy, Default)]
pub struct NavData {
    pub estimate: HorizontalEstimate,
    /// Altitude above the first fix (m)
    pub altitude: f32,
    pub sats: u8,
}

/// Position loop output mirrored to telemetry.
#[derive(Clone, Copy, Default)]
pub struct SetpointState {
    pub setpoint: CombinedSetpoint,
    pub armed: bool,
    pub nav_valid: bool,
    /// Estimated position the setpoint was computed from
    pub position: Vector2,
    pub sats: u8,
}
