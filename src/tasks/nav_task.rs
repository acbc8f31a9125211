use embassy_executor::task;
use embassy_futures::select::{select, Either};
use embassy_stm32::peripherals::{DMA1_CH1, DMA1_CH3, USART3};
use embassy_stm32::usart::Uart;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use micromath::F32Ext;

use flight_tasks::{HorizontalEstimate, Vector2};
use protocols::nmea::{NavFix, NmeaParser};

use crate::state::NavData;

const EARTH_RADIUS_M: f32 = 6_371_000.0;
const E7_TO_RAD: f32 = core::f32::consts::PI / 180.0 / 1e7;
const MIN_SATS: u8 = 6;

/// Local north/east frame anchored at the first usable fix.
struct LocalOrigin {
    lat_e7: i32,
    lon_e7: i32,
    alt_m: f32,
    cos_lat: f32,
}

impl LocalOrigin {
    fn new(fix: &NavFix) -> Self {
        Self {
            lat_e7: fix.lat_e7,
            lon_e7: fix.lon_e7,
            alt_m: fix.alt_m,
            cos_lat: (fix.lat_e7 as f32 * E7_TO_RAD).cos(),
        }
    }

    /// Equirectangular projection, fine over the few km a manual flight covers.
    fn project(&self, fix: &NavFix) -> Vector2 {
        // i32 difference first, the absolute e7 values do not fit f32 exactly
        let d_lat = fix.lat_e7.wrapping_sub(self.lat_e7) as f32 * E7_TO_RAD;
        let d_lon = fix.lon_e7.wrapping_sub(self.lon_e7) as f32 * E7_TO_RAD;
        Vector2::new(d_lat * EARTH_RADIUS_M, d_lon * EARTH_RADIUS_M * self.cos_lat)
    }
}

fn ground_velocity(fix: &NavFix) -> Vector2 {
    let course = fix.course_deg.to_radians();
    Vector2::new(fix.speed_ms * course.cos(), fix.speed_ms * course.sin())
}

/// GPS task: NMEA on USART3 -> horizontal estimate in the local frame.
///
/// A sample is published once per receiver epoch, after both its GGA and
/// RMC arrived, with a valid fix and enough satellites. Position and
/// velocity therefore always come from the same epoch.
#[task]
pub async fn nav_task(
    mut gps_uart: Uart<'static, USART3, DMA1_CH3, DMA1_CH1>,
    nav: &'static Signal<CriticalSectionRawMutex, NavData>,
) {
    let mut parser = NmeaParser::new();
    let mut origin: Option<LocalOrigin> = None;
    let mut buf = [0u8; 512];
    let mut reported_errors = 0u16;

    loop {
        // receiver bursts at 10 Hz
        let n = match select(
            gps_uart.read_until_idle(&mut buf),
            Timer::after(Duration::from_millis(110)),
        )
        .await
        {
            Either::First(Ok(n)) => n,
            Either::First(Err(_)) | Either::Second(_) => continue,
        };

        let epoch = parser.push_data(&buf[..n]);

        if parser.checksum_errors != reported_errors {
            reported_errors = parser.checksum_errors;
            defmt::warn!("nav: {} NMEA checksum errors", reported_errors);
        }

        let Some(fix) = epoch else {
            continue;
        };
        if !fix.fix || !fix.velocity_valid || fix.sats < MIN_SATS {
            continue;
        }

        let origin = origin.get_or_insert_with(|| {
            defmt::info!("nav: local origin set, {} sats", fix.sats);
            LocalOrigin::new(&fix)
        });

        let estimate = HorizontalEstimate {
            position: origin.project(&fix),
            velocity: ground_velocity(&fix),
        };
        if !estimate.position.is_finite() || !estimate.velocity.is_finite() {
            defmt::warn!("nav: non-finite estimate dropped");
            continue;
        }

        nav.signal(NavData {
            estimate,
            altitude: fix.alt_m - origin.alt_m,
            sats: fix.sats,
        });
    }
}
