#![no_std]
#![no_main]

mod board;
mod drivers;
mod state;
mod tasks;
mod usb;
mod vertical;

use core::cell::RefCell;

use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::usart::{Config as UsartConfig, Uart};
use embassy_stm32::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use flight_tasks::ParamStore;

use crate::state::{NavData, RcData, SetpointState};
use crate::tasks::crsf_task::crsf_task;
use crate::tasks::nav_task::nav_task;
use crate::tasks::position_loop::position_loop_task;
use crate::tasks::telemetry_task::telemetry_task;

// ── Inter-task signals ────────────────────────────────────────────────────────
//  Latest value wins: a new sample replaces one not yet taken.
static RC_SIG:       Signal<CriticalSectionRawMutex, RcData>        = Signal::new();
static NAV_SIG:      Signal<CriticalSectionRawMutex, NavData>       = Signal::new();
static SETPOINT_SIG: Signal<CriticalSectionRawMutex, SetpointState> = Signal::new();

// ── Parameters ────────────────────────────────────────────────────────────────
//  Written between ticks, snapshotted by the position loop at each tick start.
static PARAMS: Mutex<CriticalSectionRawMutex, RefCell<ParamStore>> =
    Mutex::new(RefCell::new(ParamStore::new()));

/// Airframe overrides applied at boot on top of the defaults.
const PARAM_OVERRIDES: &[(&str, f32)] = &[
    ("MPC_VEL_MANUAL", 5.0),
    ("MPC_HOLD_MAX_XY", 0.5),
];

bind_interrupts!(struct Irqs {
    UART4    => embassy_stm32::usart::InterruptHandler<peripherals::UART4>;
    USART3   => embassy_stm32::usart::InterruptHandler<peripherals::USART3>;
});

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // 1. Clocks (168 MHz)
    let p = board::init();
    defmt::info!("goldhorn-position: boot");

    // 2. USB CDC-ACM debug console
    let (usb_dev, usb_serial) = usb::init(p.USB_OTG_FS, p.PA12, p.PA11);
    spawner.spawn(usb::usb_task(usb_dev)).unwrap();

    // 3. Parameters
    PARAMS.lock(|params| {
        let mut params = params.borrow_mut();
        for &(name, value) in PARAM_OVERRIDES {
            if let Err(e) = params.set(name, value) {
                defmt::warn!("param {} = {} rejected: {}", name, value, e);
            }
        }
        for name in ParamStore::names() {
            if let Ok(value) = params.get(name) {
                defmt::info!("param {} = {}", name, value);
            }
        }
    });

    // 4. GPS USART3 @ 115200 (TX=PB10, RX=PB11)
    let mut gps_config = UsartConfig::default();
    gps_config.baudrate = 115_200;
    let gps_uart = Uart::new(
        p.USART3, p.PB11, p.PB10,
        Irqs,
        p.DMA1_CH3, p.DMA1_CH1,
        gps_config,
    ).unwrap();

    // 5. CRSF/ELRS UART4 @ 420000 (TX=PA0, RX=PA1)
    //    Rx -> crsf_task, Tx -> telemetry_task
    let mut crsf_config = UsartConfig::default();
    crsf_config.baudrate = 420_000;
    let crsf_uart = Uart::new(
        p.UART4, p.PA1, p.PA0,
        Irqs,
        p.DMA1_CH4, p.DMA1_CH2,
        crsf_config,
    ).unwrap();
    let (crsf_uart_tx, crsf_uart_rx) = crsf_uart.split();

    // 6. Heartbeat LED (PC13)
    let mut led = Output::new(p.PC13, Level::High, Speed::Low);

    // 7. Tasks
    spawner.spawn(crsf_task(crsf_uart_rx, &RC_SIG)).unwrap();
    spawner.spawn(nav_task(gps_uart, &NAV_SIG)).unwrap();
    spawner.spawn(position_loop_task(&PARAMS, &RC_SIG, &NAV_SIG, &SETPOINT_SIG)).unwrap();
    spawner.spawn(telemetry_task(crsf_uart_tx, usb_serial, &SETPOINT_SIG)).unwrap();

    // 8. LED heartbeat @ 1 Hz
    loop {
        led.toggle();
        Timer::after(Duration::from_millis(500)).await;
    }
}
