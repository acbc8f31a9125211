//! RC channel -> stick input mapping (AETR order).

use flight_tasks::stick::{deadzone, expo};
use flight_tasks::StickInput;

use crate::state::RcData;

pub const CH_ROLL: usize = 0;
pub const CH_PITCH: usize = 1;
pub const CH_THROTTLE: usize = 2;
pub const CH_YAW: usize = 3;
pub const CH_ARM: usize = 4;

const CRSF_CENTER: f32 = 992.0;
const CRSF_HALF_RANGE: f32 = 820.0;
const CRSF_MIN: f32 = 172.0;
const CRSF_MAX: f32 = 1811.0;

const XY_DEADZONE: f32 = 0.05;
const XY_EXPO: f32 = 0.4;
const Z_DEADZONE: f32 = 0.1;
const YAW_EXPO: f32 = 0.3;

pub fn crsf_to_unit(ch_value: u16) -> f32 {
    ((ch_value as f32 - CRSF_CENTER) / CRSF_HALF_RANGE).clamp(-1.0, 1.0)
}

pub fn crsf_to_throttle(ch_value: u16) -> f32 {
    ((ch_value as f32 - CRSF_MIN) / (CRSF_MAX - CRSF_MIN)).clamp(0.0, 1.0)
}

pub fn is_armed(rc: &RcData) -> bool {
    rc.channels[CH_ARM] > 1200
}

/// Horizontal stick: pitch forward -> +x (forward), roll right -> +y (right).
pub fn stick_xy(rc: &RcData) -> StickInput {
    let x = expo(deadzone(crsf_to_unit(rc.channels[CH_PITCH]), XY_DEADZONE), XY_EXPO);
    let y = expo(deadzone(crsf_to_unit(rc.channels[CH_ROLL]), XY_DEADZONE), XY_EXPO);
    StickInput::new(x, y)
}

/// Throttle mapped to [-1, 1] around mid-stick, positive up.
pub fn stick_climb(rc: &RcData) -> f32 {
    let centered = crsf_to_throttle(rc.channels[CH_THROTTLE]) * 2.0 - 1.0;
    deadzone(centered, Z_DEADZONE)
}

pub fn stick_yaw(rc: &RcData) -> f32 {
    expo(deadzone(crsf_to_unit(rc.channels[CH_YAW]), XY_DEADZONE), YAW_EXPO)
}
