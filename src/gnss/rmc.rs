//! Recommended-minimum (RMC) sentence decoding.
//!
//! Times are reported in a fixed local zone six hours behind UTC. The date
//! rollback uses a plain month-length table; February always has 28 days.

use heapless::Vec;
use serde::{Deserialize, Serialize};

pub const KNOTS_TO_KPH: f32 = 1.852;
pub const UTC_OFFSET_HOURS: u8 = 6;

/// Days per month, indexed by month number.
const LAST_DAY_OF_MONTH: [u8; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

const FIELD_TIME: usize = 1;
const FIELD_LATITUDE: usize = 3;
const FIELD_LAT_HEMISPHERE: usize = 4;
const FIELD_LONGITUDE: usize = 5;
const FIELD_LON_HEMISPHERE: usize = 6;
const FIELD_SPEED_KNOTS: usize = 7;
const FIELD_DATE: usize = 9;

/// Fields past this are never looked at.
const MAX_FIELDS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kph: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FixDateTime {
    pub seconds: u8,
    pub minutes: u8,
    pub hour: u8,
    pub day: u8,
    pub month: u8,
    pub year: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RmcFix {
    pub position: Position,
    /// Local time, already shifted by [`UTC_OFFSET_HOURS`].
    pub date_time: FixDateTime,
}

/// Decode a buffered RMC sentence (anything before the first comma is the
/// sentence tag and is ignored). `None` when a required field is missing or
/// malformed, or the time stamp is out of range.
pub fn decode(sentence: &str) -> Option<RmcFix> {
    let fields: Vec<&str, MAX_FIELDS> = sentence.split(',').take(MAX_FIELDS).collect();
    let field = |index: usize| fields.get(index).copied();

    let (hour, minutes, seconds) = split_two_digit_triplet(field(FIELD_TIME)?)?;
    let (day, month, year) = split_two_digit_triplet(field(FIELD_DATE)?)?;
    if hour > 23 || !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return None;
    }

    let latitude = decode_coordinate(field(FIELD_LATITUDE)?, field(FIELD_LAT_HEMISPHERE)?)?;
    let longitude = decode_coordinate(field(FIELD_LONGITUDE)?, field(FIELD_LON_HEMISPHERE)?)?;

    let speed_knots = field(FIELD_SPEED_KNOTS)
        .and_then(|s| s.parse::<f32>().ok())
        .unwrap_or(0.0);

    let utc = FixDateTime {
        seconds,
        minutes,
        hour,
        day,
        month,
        year: 2000 + u16::from(year),
    };

    Some(RmcFix {
        position: Position {
            latitude,
            longitude,
            speed_kph: knots_to_kph(speed_knots),
        },
        date_time: to_local(utc),
    })
}

/// `dddmm.mmmm` plus hemisphere to signed decimal degrees. South and west
/// are negative.
pub fn decode_coordinate(value: &str, hemisphere: &str) -> Option<f64> {
    let raw = value.parse::<f64>().ok()?;
    let degrees = (raw / 100.0).floor();
    let minutes = raw - degrees * 100.0;
    let decimal = degrees + minutes / 60.0;

    match hemisphere.chars().next() {
        Some('S' | 'W') => Some(-decimal),
        _ => Some(decimal),
    }
}

pub fn knots_to_kph(knots: f32) -> f32 {
    knots * KNOTS_TO_KPH
}

/// Shift a UTC time stamp into the local zone.
///
/// A minute reading of 59 advances the hour before the shift to make up for
/// sampling skew; the date is not advanced when that wraps past midnight.
/// Hours that land before midnight roll the date back one day.
pub fn to_local(utc: FixDateTime) -> FixDateTime {
    let mut local = utc;

    if local.minutes == 59 {
        local.hour = if local.hour < 23 { local.hour + 1 } else { 0 };
    }

    if local.hour >= UTC_OFFSET_HOURS {
        local.hour -= UTC_OFFSET_HOURS;
    } else {
        local.hour += 24 - UTC_OFFSET_HOURS;
        roll_back_one_day(&mut local);
    }

    local
}

fn roll_back_one_day(date: &mut FixDateTime) {
    if date.day > 1 {
        date.day -= 1;
        return;
    }

    if date.month > 1 {
        date.month -= 1;
    } else {
        date.month = 12;
        date.year = date.year.saturating_sub(1);
    }

    if let Some(&last) = LAST_DAY_OF_MONTH.get(usize::from(date.month)) {
        date.day = last;
    }
}

/// `"hhmmss.sss"` / `"ddmmyy"` into three numbers.
fn split_two_digit_triplet(field: &str) -> Option<(u8, u8, u8)> {
    let digits = field.as_bytes().get(..6)?;
    if !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }

    let pair = |i: usize| (digits[i] - b'0') * 10 + (digits[i + 1] - b'0');
    Some((pair(0), pair(2), pair(4)))
}
