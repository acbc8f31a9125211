use core::cell::RefCell;

use embassy_executor::task;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Ticker};

use flight_tasks::{CombinedSetpoint, HoldState, ManualPositionTask, ParamStore};

use crate::drivers::sticks::{is_armed, stick_climb, stick_xy, stick_yaw};
use crate::state::{NavData, RcData, SetpointState};
use crate::vertical::StickVerticalYaw;

/// Flight task rate
const POSITION_LOOP_HZ: u64 = 50;
/// Estimate older than this stops the task
const NAV_TIMEOUT: Duration = Duration::from_millis(500);

/// Position loop: one manual position tick per period.
///
/// Inputs (RC, estimate, parameters) are refreshed before the tick and stay
/// fixed while it runs. The task only runs armed with a fresh estimate;
/// any other tick deactivates it so the next entry starts unlocked.
#[task]
pub async fn position_loop_task(
    params: &'static Mutex<CriticalSectionRawMutex, RefCell<ParamStore>>,
    rc_in: &'static Signal<CriticalSectionRawMutex, RcData>,
    nav_in: &'static Signal<CriticalSectionRawMutex, NavData>,
    setpoint_out: &'static Signal<CriticalSectionRawMutex, SetpointState>,
) {
    let mut task = ManualPositionTask::new();
    let mut base = StickVerticalYaw::new(0.0);
    let mut active = false;

    let mut rc = RcData::default();
    let mut nav: Option<(NavData, Instant)> = None;

    let mut ticker = Ticker::every(Duration::from_hz(POSITION_LOOP_HZ));
    let mut last = Instant::now();

    loop {
        ticker.next().await;

        let now = Instant::now();
        let dt = ((now - last).as_micros() as f32 / 1_000_000.0).clamp(0.005, 0.1);
        last = now;

        // ── A. Refresh inputs (non-blocking) ─────────────────────────────────
        if let Some(new_rc) = rc_in.try_take() {
            rc = new_rc;
        }
        if let Some(new_nav) = nav_in.try_take() {
            nav = Some((new_nav, now));
        }
        let limits = params.lock(|p| p.borrow().limits());

        let armed = is_armed(&rc);
        let fresh_nav = nav.filter(|(_, at)| now - *at < NAV_TIMEOUT).map(|(n, _)| n);

        // ── B. Manual position tick ──────────────────────────────────────────
        let setpoint = match (armed, fresh_nav) {
            (true, Some(nav)) => {
                if !active {
                    defmt::info!("posctl: task activated");
                    task.activate();
                    // no attitude estimate on this board: heading starts at
                    // north, so stick-forward commands north until yawed
                    base.reset(0.0);
                    active = true;
                }

                base.climb_stick = stick_climb(&rc);
                base.yaw_stick = stick_yaw(&rc);
                base.altitude = nav.altitude;
                base.dt = dt;

                let before = task.hold().state();
                let sp = task.update(&mut base, stick_xy(&rc), &nav.estimate, &limits);

                match (before, task.hold().state()) {
                    (HoldState::Unlocked, HoldState::Locked) => {
                        if let Some(p) = task.hold().held_position() {
                            defmt::info!("posctl: position locked at n={} e={}", p.x, p.y);
                        }
                    }
                    (HoldState::Locked, HoldState::Unlocked) => defmt::info!("posctl: position released"),
                    _ => {}
                }
                sp
            }
            _ => {
                if active {
                    defmt::warn!(
                        "posctl: task deactivated (armed={}, nav={}, locked={})",
                        armed, fresh_nav.is_some(), task.is_position_locked()
                    );
                    active = false;
                }
                CombinedSetpoint::default()
            }
        };

        // ── C. Publish for telemetry ─────────────────────────────────────────
        setpoint_out.signal(SetpointState {
            setpoint,
            armed,
            nav_valid: fresh_nav.is_some(),
            position: fresh_nav.map(|n| n.estimate.position).unwrap_or_default(),
            sats: fresh_nav.map(|n| n.sats).unwrap_or(0),
        });
    }
}
