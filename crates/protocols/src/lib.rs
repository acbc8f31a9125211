//! protocols - byte-level parsers for the serial links
//!
//! - [`crsf`]: RC channels in, telemetry frames out (ELRS receiver on UART4)
//! - [`nmea`]: GGA/RMC position and ground velocity (GPS on USART3)
//!
//! Both parsers are fed whatever chunk the UART DMA returned and keep their
//! partial frame between calls. No I/O here, so everything runs on the host.

#![no_std]

pub mod crsf;
pub mod nmea;
