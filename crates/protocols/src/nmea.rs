//! NMEA 0183 parser for the horizontal navigation fix.
//!
//! Only GGA (fix quality, coordinates, satellites) and RMC (ground speed,
//! course) are decoded. Coordinates are kept as integer 1e-7 degrees so the
//! local projection does not lose precision in f32.
//!
//! A fix is handed out per receiver epoch: GGA and RMC must carry the same
//! UTC time, so position and velocity always describe the same instant.

use core::str::FromStr;

const LINE_MAX: usize = 96;
const KNOTS_TO_MS: f32 = 0.514_444;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sentence {
    Gga,
    Rmc,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NavFix {
    pub lat_e7: i32,
    pub lon_e7: i32,
    /// Altitude above MSL (m)
    pub alt_m: f32,
    pub sats: u8,
    /// GGA quality > 0
    pub fix: bool,
    /// Ground speed (m/s)
    pub speed_ms: f32,
    /// Course over ground (deg, 0 = north)
    pub course_deg: f32,
    /// RMC status 'A'
    pub velocity_valid: bool,
    /// UTC of the last GGA, centiseconds of day
    pub gga_time: Option<u32>,
    /// UTC of the last RMC, centiseconds of day
    pub rmc_time: Option<u32>,
}

impl NavFix {
    /// GGA and RMC belong to the same receiver epoch.
    pub fn same_epoch(&self) -> bool {
        self.gga_time.is_some() && self.gga_time == self.rmc_time
    }
}

pub struct NmeaParser {
    line: heapless::String<LINE_MAX>,
    data: NavFix,
    last_epoch: Option<u32>,
    pub checksum_errors: u16,
}

impl Default for NmeaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl NmeaParser {
    pub fn new() -> Self {
        Self {
            line: heapless::String::new(),
            data: NavFix::default(),
            last_epoch: None,
            checksum_errors: 0,
        }
    }

    /// Push received bytes, returning the last epoch they completed.
    ///
    /// An epoch completes on the second of its GGA/RMC pair; each epoch is
    /// returned once.
    pub fn push_data(&mut self, data: &[u8]) -> Option<NavFix> {
        let mut completed = None;
        for &b in data {
            if b == b'$' {
                self.line.clear();
            }
            if self.line.push(b as char).is_err() {
                self.line.clear();
                continue;
            }
            if b == b'\n' {
                let line = core::mem::take(&mut self.line);
                if let Some(Sentence::Gga | Sentence::Rmc) = self.parse_sentence(line.as_str().trim()) {
                    completed = self.take_epoch().or(completed);
                }
            }
        }
        completed
    }

    fn take_epoch(&mut self) -> Option<NavFix> {
        if !self.data.same_epoch() || self.data.gga_time == self.last_epoch {
            return None;
        }
        self.last_epoch = self.data.gga_time;
        Some(self.data)
    }

    fn parse_sentence(&mut self, s: &str) -> Option<Sentence> {
        if s.len() < 6 || !s.starts_with('$') {
            return None;
        }
        if !verify_checksum(s) {
            self.checksum_errors = self.checksum_errors.wrapping_add(1);
            return None;
        }

        let body = s.split('*').next().unwrap_or("");
        let kind = match s.get(3..6).unwrap_or("") {
            "GGA" => Sentence::Gga,
            "RMC" => Sentence::Rmc,
            _ => Sentence::Other,
        };
        match kind {
            Sentence::Gga => self.parse_gga(body),
            Sentence::Rmc => self.parse_rmc(body),
            Sentence::Other => {}
        }
        Some(kind)
    }

    // $xxGGA,time,lat,N,lon,E,quality,sats,hdop,alt,M,...
    fn parse_gga(&mut self, s: &str) {
        let mut f = s.split(',').skip(1);
        let time = parse_utc(f.next().unwrap_or(""));
        let lat = f.next().unwrap_or("");
        let ns = f.next().unwrap_or("");
        let lon = f.next().unwrap_or("");
        let ew = f.next().unwrap_or("");
        let quality = u8::from_str(f.next().unwrap_or("")).unwrap_or(0);
        let sats = u8::from_str(f.next().unwrap_or("")).unwrap_or(0);
        let _hdop = f.next();
        let alt = f32::from_str(f.next().unwrap_or("")).ok().filter(|a| a.is_finite());

        self.data.gga_time = time;
        self.data.sats = sats;

        match (coord_to_e7(lat, ns), coord_to_e7(lon, ew)) {
            (Some(lat_e7), Some(lon_e7)) if quality > 0 => {
                self.data.lat_e7 = lat_e7;
                self.data.lon_e7 = lon_e7;
                self.data.alt_m = alt.unwrap_or(self.data.alt_m);
                self.data.fix = true;
            }
            _ => self.data.fix = false,
        }
    }

    // $xxRMC,time,status,lat,N,lon,E,speed_kn,course,date,...
    fn parse_rmc(&mut self, s: &str) {
        let mut f = s.split(',').skip(1);
        let time = parse_utc(f.next().unwrap_or(""));
        let status = f.next().unwrap_or("");
        let mut f = f.skip(4);
        let speed = f32::from_str(f.next().unwrap_or("")).ok().filter(|v| v.is_finite());
        let course = f32::from_str(f.next().unwrap_or("")).ok().filter(|c| c.is_finite());

        self.data.rmc_time = time;

        match (status, speed) {
            ("A", Some(kn)) => {
                self.data.speed_ms = kn * KNOTS_TO_MS;
                // course is empty when stationary on most receivers
                self.data.course_deg = course.unwrap_or(0.0);
                self.data.velocity_valid = true;
            }
            _ => self.data.velocity_valid = false,
        }
    }
}

/// `hhmmss[.ss]` -> centiseconds of day.
fn parse_utc(raw: &str) -> Option<u32> {
    let (hms, frac) = raw.split_once('.').unwrap_or((raw, ""));
    if hms.len() != 6 || !hms.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let h = u32::from_str(&hms[0..2]).ok()?;
    let m = u32::from_str(&hms[2..4]).ok()?;
    let s = u32::from_str(&hms[4..6]).ok()?;
    if h > 23 || m > 59 || s > 60 {
        return None;
    }

    let mut cs = 0;
    let mut scale = 10;
    for c in frac.chars().take(2) {
        cs += c.to_digit(10)? * scale;
        scale /= 10;
    }
    Some(((h * 60 + m) * 60 + s) * 100 + cs)
}

/// `ddmm.mmmm` / `dddmm.mmmm` + hemisphere -> 1e-7 degrees.
pub fn coord_to_e7(raw: &str, hemisphere: &str) -> Option<i32> {
    let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw, ""));
    if int_part.len() < 3 || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let deg_len = int_part.len() - 2;
    let deg = i64::from_str(&int_part[..deg_len]).ok()?;
    let min_whole = i64::from_str(&int_part[deg_len..]).ok()?;

    // minutes in 1e-5 units, extra fraction digits dropped
    let mut min_e5 = min_whole * 100_000;
    let mut scale = 10_000;
    for c in frac_part.chars().take(5) {
        min_e5 += c.to_digit(10)? as i64 * scale;
        scale /= 10;
    }

    // 1 minute = 1/60 deg -> 1e-5 min * 1e7 / (60 * 1e5) = 1e-5 min / 60 * 100
    let e7 = deg * 10_000_000 + min_e5 * 100 / 60;
    let e7 = match hemisphere {
        "S" | "W" => -e7,
        "N" | "E" => e7,
        _ => return None,
    };
    i32::try_from(e7).ok()
}

/// `$body*hh`, XOR of every byte between `$` and `*`.
pub fn verify_checksum(s: &str) -> bool {
    let Some((body, cs)) = s.get(1..).and_then(|rest| rest.split_once('*')) else {
        return false;
    };
    let Ok(expected) = u8::from_str_radix(cs.get(..2).unwrap_or(""), 16) else {
        return false;
    };
    body.bytes().fold(0u8, |acc, b| acc ^ b) == expected
}
