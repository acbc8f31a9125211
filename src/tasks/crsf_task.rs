use embassy_executor::task;
use embassy_stm32::peripherals::{DMA1_CH2, UART4};
use embassy_stm32::usart::UartRx;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use protocols::crsf::CrsfParser;

use crate::state::RcData;

/// CRSF/ELRS task: reads UART4 RX and publishes the newest decoded RC frame.
#[task]
pub async fn crsf_task(
    mut crsf_rx: UartRx<'static, UART4, DMA1_CH2>,
    rc: &'static Signal<CriticalSectionRawMutex, RcData>,
) {
    let mut parser = CrsfParser::new();
    let mut buf = [0u8; 64];

    loop {
        match crsf_rx.read_until_idle(&mut buf).await {
            Ok(n) => {
                if let Some(frame) = parser.push_bytes(&buf[..n]) {
                    rc.signal(RcData { channels: frame.channels });
                }
            }
            Err(_) => defmt::warn!("crsf: uart error, {} crc errors so far", parser.crc_errors),
        }
    }
}
