use core::fmt::Write;

use embassy_executor::task;
use embassy_stm32::peripherals::{DMA1_CH4, UART4};
use embassy_stm32::usart::UartTx;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker};

use protocols::crsf::{build_telemetry_packet, payload_flight_mode, CRSF_FRAMETYPE_FLIGHT_MODE};

use crate::state::SetpointState;
use crate::usb::UsbSerial;

const USB_DEBUG_ENABLED: bool = true;

fn flight_mode(state: &SetpointState) -> &'static str {
    match (state.armed, state.nav_valid, state.setpoint.position_locked()) {
        (false, _, _) => "DISARMED",
        (true, false, _) => "NO_NAV",
        (true, true, true) => "POSHOLD",
        (true, true, false) => "POSCTL",
    }
}

/// Telemetry task, 10 Hz.
/// USB debug line every 0.5 s, CRSF flight mode frame every 1 s.
#[task]
pub async fn telemetry_task(
    mut crsf_tx: UartTx<'static, UART4, DMA1_CH4>,
    mut usb_serial: UsbSerial<'static>,
    setpoint_in: &'static Signal<CriticalSectionRawMutex, SetpointState>,
) {
    let mut tick: u32 = 0;
    let mut state = SetpointState::default();
    let mut ticker = Ticker::every(Duration::from_hz(10));

    loop {
        ticker.next().await;
        tick = tick.wrapping_add(1);

        if let Some(s) = setpoint_in.try_take() {
            state = s;
        }
        let sp = &state.setpoint;

        // ── USB debug ────────────────────────────────────────────────────────
        if USB_DEBUG_ENABLED && usb_serial.dtr() && tick % 5 == 0 {
            let mut m = heapless::String::<160>::new();
            let _ = write!(m,
                "[SP] {} sats={} yaw={:.1} vz={:.2} vn={:.2} ve={:.2}",
                flight_mode(&state), state.sats, sp.yaw.to_degrees(), sp.climb_rate,
                sp.velocity_xy.x, sp.velocity_xy.y
            );
            match sp.position_xy {
                Some(p) => {
                    let err = (p - state.position).length();
                    let _ = write!(m, " hold=({:.2},{:.2}) err={:.2}\r\n", p.x, p.y, err);
                }
                None => { let _ = write!(m, " hold=-\r\n"); }
            }
            // full-speed CDC packets are 64 bytes max
            for chunk in m.as_bytes().chunks(64) {
                let _ = usb_serial.write_packet(chunk).await;
            }
        }

        // ── CRSF flight mode ─────────────────────────────────────────────────
        if tick % 10 == 0 {
            let mut pkt = [0u8; 32];
            let len = build_telemetry_packet(
                &mut pkt,
                CRSF_FRAMETYPE_FLIGHT_MODE,
                &payload_flight_mode(flight_mode(&state)),
            );
            if len > 0 {
                let _ = crsf_tx.write(&pkt[..len]).await;
            }
        }
    }
}
