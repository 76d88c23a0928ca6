//! GNSS receiver on its own serial channel.
//!
//! The receiver streams NMEA sentences continuously. [`GnssReceiver`] waits
//! for the next RMC sentence, keeps it, and decodes position and local
//! date/time from it on request.

pub mod rmc;

pub use rmc::{FixDateTime, Position, RmcFix};

use crate::error::{ModemError, Result};
use crate::io::{Clock, GnssEnable, SerialChannel};
use crate::protocol::{ascii_char, REPLY_BUFFER_LENGTH};
use arrayvec::ArrayString;
use tracing::{debug, warn};

/// Bytes that must already be buffered before an `A` counts as the
/// fixed-data marker.
pub const FIX_MARKER_OFFSET: usize = 30;

const FIX_VALID: u8 = b'A';
const FIX_INVALID: u8 = b'V';

pub struct GnssReceiver<S, E, C> {
    serial: S,
    enable: E,
    clock: C,
    sentence: ArrayString<REPLY_BUFFER_LENGTH>,
    fixed: bool,
    date_time: Option<FixDateTime>,
    max_wait_ms: Option<u32>,
}

impl<S, E, C> GnssReceiver<S, E, C>
where
    S: SerialChannel,
    E: GnssEnable,
    C: Clock,
{
    pub fn new(serial: S, enable: E, clock: C) -> Self {
        Self {
            serial,
            enable,
            clock,
            sentence: ArrayString::new(),
            fixed: false,
            date_time: None,
            max_wait_ms: None,
        }
    }

    /// Give up on a sentence after `ms` instead of waiting indefinitely.
    pub fn with_max_wait(mut self, ms: u32) -> Self {
        self.max_wait_ms = Some(ms);
        self
    }

    pub fn set_power_level(&mut self, enabled: bool) {
        self.enable.set_gnss_enabled(enabled);
    }

    /// Wait for the next RMC sentence and report whether it carries a fix.
    pub fn get_fix_status(&mut self) -> Result<bool> {
        self.read_sentence()?;
        Ok(self.fixed)
    }

    /// Decode the sentence captured by the last [`Self::get_fix_status`].
    /// Fails unless that sentence reported a fix.
    pub fn get_data(&mut self) -> Result<Position> {
        if !self.fixed {
            return Err(ModemError::GnssFix);
        }

        let fix = rmc::decode(&self.sentence).ok_or(ModemError::GnssFix)?;
        self.date_time = Some(fix.date_time);
        Ok(fix.position)
    }

    /// Local date/time of the last decoded fix.
    pub fn date_time(&self) -> Option<&FixDateTime> {
        self.date_time.as_ref()
    }

    pub fn seconds(&self) -> Option<u8> {
        self.date_time.map(|dt| dt.seconds)
    }

    pub fn minutes(&self) -> Option<u8> {
        self.date_time.map(|dt| dt.minutes)
    }

    pub fn hour(&self) -> Option<u8> {
        self.date_time.map(|dt| dt.hour)
    }

    pub fn day(&self) -> Option<u8> {
        self.date_time.map(|dt| dt.day)
    }

    pub fn month(&self) -> Option<u8> {
        self.date_time.map(|dt| dt.month)
    }

    pub fn year(&self) -> Option<u16> {
        self.date_time.map(|dt| dt.year)
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Raw capture, starting at the `C` of the sentence tag.
    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    pub fn serial(&self) -> &S {
        &self.serial
    }

    /// Scan for the ordered bytes `R`, `M`, `C`, then buffer until a
    /// carriage return or an invalid-fix marker.
    ///
    /// An `A` seen once [`FIX_MARKER_OFFSET`] bytes are buffered marks the
    /// sentence fixed; any `V` marks it unfixed and ends the capture.
    fn read_sentence(&mut self) -> Result<()> {
        self.serial.clear();
        self.sentence.clear();
        self.fixed = false;
        self.date_time = None;

        let deadline = self
            .max_wait_ms
            .map(|ms| self.clock.now_ms().saturating_add(u64::from(ms)));

        let (mut seen_r, mut seen_m, mut in_sentence) = (false, false, false);

        loop {
            let Ok(byte) = self.serial.read() else {
                if deadline.is_some_and(|d| self.clock.now_ms() >= d) {
                    warn!("no RMC sentence before deadline");
                    return Err(ModemError::GnssFix);
                }
                self.clock.delay_ms(1);
                continue;
            };

            if !in_sentence {
                match byte {
                    b'R' => seen_r = true,
                    b'M' if seen_r => seen_m = true,
                    b'C' if seen_m => in_sentence = true,
                    _ => {}
                }
                if !in_sentence {
                    continue;
                }
            }

            match byte {
                b'\r' => break,
                FIX_INVALID => {
                    self.fixed = false;
                    break;
                }
                FIX_VALID if self.sentence.len() >= FIX_MARKER_OFFSET => self.fixed = true,
                _ => {}
            }

            if self.sentence.try_push(ascii_char(byte)).is_err() {
                warn!("RMC sentence exceeds {} bytes", REPLY_BUFFER_LENGTH);
                break;
            }
        }

        debug!("GNSS <--- {} (fixed: {})", self.sentence.as_str(), self.fixed);
        Ok(())
    }
}
