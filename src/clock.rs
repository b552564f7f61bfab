//! Minute counter and its `HH:MM` rendering
//!
//! The counter is the whole clock: there is no RTC involved, every wake moves
//! it by one minute and the zero button sends it back to midnight.

use core::fmt;

use crate::wake::Classification;

/// Number of minutes in a day, the counter range is `0..MINUTES_PER_DAY`
pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// Value the counter is forced to on reset, the following +1 lands on 0
pub const RESET_SENTINEL: i32 = -1;

/// Counter value on the very first power-up.
///
/// Sits just before midnight so the day wrap shows up after a couple of
/// presses. Can be overridden at build time with `WAKECLOCK_INITIAL_MINUTE`.
pub const INITIAL_MINUTE: i32 = match option_env!("WAKECLOCK_FIRST_BOOT_MINUTE") {
    Some(raw) => parse_minute(raw),
    None => 1436,
};

/// Const parser for the override that `build.rs` validated and forwarded
const fn parse_minute(raw: &str) -> i32 {
    let bytes = raw.as_bytes();
    let mut value = 0i32;
    let mut i = 0;
    while i < bytes.len() {
        let digit = bytes[i];
        if digit < b'0' || digit > b'9' {
            panic!("WAKECLOCK_FIRST_BOOT_MINUTE must be a decimal number");
        }
        value = value * 10 + (digit - b'0') as i32;
        i += 1;
    }
    value
}

/// The two scalars that survive deep sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockState {
    /// Wakes since power-up, diagnostics only. Wraps on overflow.
    pub boot_count: u32,
    /// Minutes since the logical start of the day.
    ///
    /// Signed because it mirrors the raw persisted word, which may hold the
    /// reset sentinel or garbage after a brown-out.
    pub minute_count: i32,
}

impl ClockState {
    /// State of a chip that has never slept
    pub const fn first_boot() -> Self {
        ClockState {
            boot_count: 0,
            minute_count: INITIAL_MINUTE,
        }
    }

    /// True when the stored minute is inside the day range
    pub fn is_valid(&self) -> bool {
        (0..MINUTES_PER_DAY).contains(&self.minute_count)
    }

    /// Advance the state for one wake and return the time to show.
    ///
    /// Reset forces the sentinel, then the counter always moves one minute
    /// and anything outside the day range wraps to midnight.
    pub fn apply(&mut self, classification: &Classification) -> ClockTime {
        self.boot_count = self.boot_count.wrapping_add(1);

        if classification.resets() {
            self.minute_count = RESET_SENTINEL;
        }

        self.minute_count = self.minute_count.wrapping_add(1);
        if !self.is_valid() {
            self.minute_count = 0;
        }

        ClockTime::from_minute_of_day(self.minute_count as u16)
    }
}

impl Default for ClockState {
    fn default() -> Self {
        Self::first_boot()
    }
}

/// Hours and minutes of the day, displayed as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    hours: u8,
    minutes: u8,
}

impl ClockTime {
    /// Split a minute of the day, values past the day wrap around
    pub fn from_minute_of_day(minute: u16) -> Self {
        let minute = minute % MINUTES_PER_DAY as u16;
        ClockTime {
            hours: (minute / 60) as u8,
            minutes: (minute % 60) as u8,
        }
    }

    pub fn minute_of_day(&self) -> u16 {
        u16::from(self.hours) * 60 + u16::from(self.minutes)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours, self.minutes)
    }
}
