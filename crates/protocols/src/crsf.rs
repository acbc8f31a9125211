//! CRSF (Crossfire / ExpressLRS) link.
//!
//! Frame layout: `[sync] [len] [type] [payload..] [crc]`, where `len` counts
//! type + payload + crc and the CRC8 (poly 0xD5) covers type + payload.

pub const CRSF_SYNC: u8 = 0xC8;
pub const CRSF_FRAMETYPE_RC_CHANNELS_PACKED: u8 = 0x16;
pub const CRSF_FRAMETYPE_FLIGHT_MODE: u8 = 0x21;

/// Largest frame on the wire (sync + len + 62).
const CRSF_FRAME_MAX: usize = 64;
const RC_PAYLOAD_LEN: usize = 22;
const RC_CHANNEL_COUNT: usize = 16;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RcChannels {
    /// 11-bit raw values (172..1811 for a full stick throw)
    pub channels: [u16; RC_CHANNEL_COUNT],
}

pub struct CrsfParser {
    frame: heapless::Vec<u8, CRSF_FRAME_MAX>,
    pub crc_errors: u16,
}

impl Default for CrsfParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CrsfParser {
    pub fn new() -> Self {
        Self {
            frame: heapless::Vec::new(),
            crc_errors: 0,
        }
    }

    pub fn push_byte(&mut self, b: u8) -> Option<RcChannels> {
        match self.frame.len() {
            0 => {
                if b == CRSF_SYNC {
                    let _ = self.frame.push(b);
                }
                return None;
            }
            1 => {
                if !(2..=62).contains(&b) {
                    self.frame.clear();
                    // a sync byte here may start the real frame
                    if b == CRSF_SYNC {
                        let _ = self.frame.push(b);
                    }
                } else {
                    let _ = self.frame.push(b);
                }
                return None;
            }
            _ => {}
        }

        let _ = self.frame.push(b);
        let total = 2 + self.frame[1] as usize;
        if self.frame.len() < total {
            return None;
        }

        let body = &self.frame[2..total - 1];
        let result = if crc8(body) == self.frame[total - 1] {
            let (kind, payload) = (body[0], &body[1..]);
            if kind == CRSF_FRAMETYPE_RC_CHANNELS_PACKED && payload.len() == RC_PAYLOAD_LEN {
                Some(unpack_channels(payload))
            } else {
                None
            }
        } else {
            self.crc_errors = self.crc_errors.wrapping_add(1);
            None
        };

        self.frame.clear();
        result
    }

    /// Feed a chunk, returning the last complete RC frame in it.
    pub fn push_bytes(&mut self, data: &[u8]) -> Option<RcChannels> {
        data.iter().fold(None, |last, &b| self.push_byte(b).or(last))
    }
}

fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0;
    for &b in data {
        crc ^= b;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ 0xD5 } else { crc << 1 };
        }
    }
    crc
}

/// 16 channels x 11 bits, little-endian bit stream.
fn unpack_channels(payload: &[u8]) -> RcChannels {
    let mut out = RcChannels::default();
    let mut acc: u32 = 0;
    let mut bits = 0u32;
    let mut idx = 0;

    for &byte in payload {
        acc |= (byte as u32) << bits;
        bits += 8;
        while bits >= 11 && idx < RC_CHANNEL_COUNT {
            out.channels[idx] = (acc & 0x07FF) as u16;
            acc >>= 11;
            bits -= 11;
            idx += 1;
        }
    }
    out
}

/// Serialize a telemetry frame into `buf`, returning the written length
/// (0 if `buf` is too small).
pub fn build_telemetry_packet(buf: &mut [u8], frame_type: u8, payload: &[u8]) -> usize {
    let len = payload.len() + 2;
    let total = len + 2;
    if buf.len() < total || len > 62 {
        return 0;
    }

    buf[0] = CRSF_SYNC;
    buf[1] = len as u8;
    buf[2] = frame_type;
    buf[3..3 + payload.len()].copy_from_slice(payload);
    buf[total - 1] = crc8(&buf[2..total - 1]);
    total
}

/// Null-terminated flight mode string.
pub fn payload_flight_mode(mode: &str) -> heapless::Vec<u8, 16> {
    let mut buf = heapless::Vec::new();
    for &b in mode.as_bytes().iter().take(15) {
        let _ = buf.push(b);
    }
    let _ = buf.push(0);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    /// RC frame carrying 172, 992, 1811, 992, 1811, 0, 2047, 1, then 992 x 8.
    const RC_FRAME: [u8; 26] = [
        0xC8, 0x18, 0x16, 0xAC, 0x00, 0xDF, 0xC4, 0xC1, 0x37, 0x71, 0x00, 0xFC, 0x3F, 0x00,
        0xE0, 0x03, 0x1F, 0xF8, 0xC0, 0x07, 0x3E, 0xF0, 0x81, 0x0F, 0x7C, 0xAE,
    ];
    const RC_CHANNELS: [u16; 16] = [
        172, 992, 1811, 992, 1811, 0, 2047, 1, 992, 992, 992, 992, 992, 992, 992, 992,
    ];

    #[test]
    fn test_crc8_check_value() {
        // CRC-8/DVB-S2
        assert_eq!(crc8(b"123456789"), 0xBC);
        assert_eq!(crc8(&[]), 0);
    }

    #[test]
    fn test_unpack_channels() {
        let rc = unpack_channels(&RC_FRAME[3..25]);
        assert_eq!(rc.channels, RC_CHANNELS);
    }

    #[test]
    fn test_full_frame_decoded() {
        let mut p = CrsfParser::new();
        let rc = p.push_bytes(&RC_FRAME).unwrap();
        assert_eq!(rc.channels, RC_CHANNELS);
        assert_eq!(p.crc_errors, 0);
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut p = CrsfParser::new();
        assert_eq!(p.push_bytes(&RC_FRAME[..10]), None);
        assert!(p.push_bytes(&RC_FRAME[10..]).is_some());
    }

    #[test]
    fn test_crc_error_counted() {
        let mut p = CrsfParser::new();
        let mut frame = RC_FRAME;
        frame[5] ^= 0x01;
        assert_eq!(p.push_bytes(&frame), None);
        assert_eq!(p.crc_errors, 1);

        // parser is back in sync for the next frame
        assert!(p.push_bytes(&RC_FRAME).is_some());
    }

    #[test]
    fn test_leading_garbage_skipped() {
        let mut p = CrsfParser::new();
        let mut data = [0u8; 30];
        data[..4].copy_from_slice(&[0x00, 0x55, 0x16, 0xFF]);
        data[4..].copy_from_slice(&RC_FRAME);
        assert!(p.push_bytes(&data).is_some());
    }

    #[test]
    fn test_bad_length_resyncs_on_sync_byte() {
        let mut p = CrsfParser::new();
        // sync followed by an impossible length, which is itself a sync byte
        assert_eq!(p.push_byte(CRSF_SYNC), None);
        assert_eq!(p.push_byte(CRSF_SYNC), None);
        assert!(p.push_bytes(&RC_FRAME[1..]).is_some());
    }

    #[test]
    fn test_bad_length_dropped() {
        let mut p = CrsfParser::new();
        assert_eq!(p.push_bytes(&[CRSF_SYNC, 0x01]), None);
        assert_eq!(p.push_bytes(&[CRSF_SYNC, 0x7F]), None);
        assert!(p.push_bytes(&RC_FRAME).is_some());
    }

    #[test]
    fn test_other_frame_types_ignored() {
        let mut p = CrsfParser::new();
        let mut buf = [0u8; 32];
        let len = build_telemetry_packet(&mut buf, CRSF_FRAMETYPE_FLIGHT_MODE, b"ACRO\0");
        assert_eq!(p.push_bytes(&buf[..len]), None);
        assert_eq!(p.crc_errors, 0);
    }

    #[test]
    fn test_flight_mode_packet() {
        let mut buf = [0u8; 32];
        let len = build_telemetry_packet(
            &mut buf,
            CRSF_FRAMETYPE_FLIGHT_MODE,
            &payload_flight_mode("POSHOLD"),
        );
        assert_eq!(
            &buf[..len],
            &[0xC8, 0x0A, 0x21, 0x50, 0x4F, 0x53, 0x48, 0x4F, 0x4C, 0x44, 0x00, 0xF8]
        );
    }

    #[test]
    fn test_packet_buffer_too_small() {
        let mut buf = [0u8; 4];
        assert_eq!(build_telemetry_packet(&mut buf, CRSF_FRAMETYPE_FLIGHT_MODE, b"LONG"), 0);
    }

    #[test]
    fn test_flight_mode_truncated_and_terminated() {
        let payload = payload_flight_mode("A_VERY_LONG_MODE_NAME");
        assert_eq!(payload.len(), 16);
        assert_eq!(payload[15], 0);
    }
}
