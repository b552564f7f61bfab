//! Wake cause classification
//!
//! Works out why the chip left deep sleep and what that means for the minute
//! counter. Only the `Ext1` cause carries a trigger line mask; every other
//! cause is classified from the cause alone.

use core::fmt;

use log::{info, warn};

/// Hardware reported reason for the current boot.
///
/// Mirrors the ESP-IDF `esp_sleep_wakeup_cause_t` values the firmware cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeCause {
    /// Not a wake from deep sleep, e.g. power-on or reset button
    Undefined,
    /// External signal using RTC_IO
    Ext0,
    /// External signal using RTC_CNTL (multi-pin)
    Ext1,
    /// RTC timer
    Timer,
    /// Touch pad
    Touchpad,
    /// ULP coprocessor program
    Ulp,
    /// GPIO (light sleep only)
    Gpio,
    /// UART (light sleep only)
    Uart,
    /// Anything else, carrying the raw cause value
    Other(u32),
}

impl WakeCause {
    /// Human readable sentence for the serial log.
    pub fn description(&self) -> String {
        match self {
            WakeCause::Ext0 => "Wakeup caused by external signal using RTC_IO".into(),
            WakeCause::Ext1 => "Wakeup caused by external signal using RTC_CNTL".into(),
            WakeCause::Timer => "Wakeup caused by timer".into(),
            WakeCause::Touchpad => "Wakeup caused by touchpad".into(),
            WakeCause::Ulp => "Wakeup caused by ULP program".into(),
            WakeCause::Gpio => "Wakeup caused by GPIO".into(),
            WakeCause::Uart => "Wakeup caused by UART".into(),
            WakeCause::Undefined => "Wakeup was not caused by deep sleep: 0".into(),
            WakeCause::Other(raw) => format!("Wakeup was not caused by deep sleep: {}", raw),
        }
    }
}

/// Bit-vector of wake capable lines, bit `n` is GPIO `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineMask(u64);

impl LineMask {
    /// No lines
    pub const EMPTY: LineMask = LineMask(0);

    /// Wrap a raw register value
    pub const fn from_bits(bits: u64) -> Self {
        LineMask(bits)
    }

    /// Build a mask from a list of line numbers, lines above 63 are ignored
    pub fn from_lines(lines: &[u8]) -> Self {
        let bits = lines
            .iter()
            .filter(|&&line| line < 64)
            .fold(0u64, |acc, &line| acc | (1u64 << line));
        LineMask(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, line: u8) -> bool {
        line < 64 && self.0 & (1u64 << line) != 0
    }

    /// Resolve the mask to the one line that fired.
    ///
    /// A bit scan instead of a logarithm: it only names a line when exactly
    /// one bit is set, and reports simultaneous triggers as `Multiple`.
    pub fn decode(self) -> LineDecode {
        match self.0.count_ones() {
            0 => LineDecode::None,
            1 => LineDecode::Single(self.0.trailing_zeros() as u8),
            _ => LineDecode::Multiple(self),
        }
    }
}

impl fmt::Display for LineMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

/// Outcome of [`LineMask::decode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDecode {
    /// No line bit set
    None,
    /// Exactly one line, zero based bit position
    Single(u8),
    /// More than one line fired in the same wake
    Multiple(LineMask),
}

impl fmt::Display for LineDecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineDecode::None => write!(f, "none"),
            LineDecode::Single(line) => write!(f, "{}", line),
            LineDecode::Multiple(mask) => write!(f, "ambiguous ({})", mask),
        }
    }
}

/// Logical meaning of the two buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerLine {
    /// Advances the minute counter
    Tick,
    /// Resets the counter to 00:00
    Zero,
}

/// Trigger level for the multi-pin wake source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeLevel {
    /// Wake when any configured line goes high
    AnyHigh,
    /// Wake when all configured lines are low
    AllLow,
}

/// Wake source configuration, re-applied on every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeConfig {
    pub lines: LineMask,
    pub level: WakeLevel,
}

/// What a wake means for the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Advance by one minute
    Increment,
    /// Zero the counter, then advance as usual (lands on 00:00)
    Reset,
    /// A concrete cause other than the buttons, advances like `Increment`
    Spurious(WakeCause),
    /// Several trigger lines fired together, advances like `Increment`
    Ambiguous(LineMask),
}

impl Classification {
    /// True only when the counter must restart from zero
    pub fn resets(&self) -> bool {
        matches!(self, Classification::Reset)
    }
}

/// Map a bit position onto one of the configured buttons.
pub fn trigger_line(line: u8, tick_line: u8, zero_line: u8) -> Option<TriggerLine> {
    if line == zero_line {
        Some(TriggerLine::Zero)
    } else if line == tick_line {
        Some(TriggerLine::Tick)
    } else {
        None
    }
}

/// Classify the current wake. Pure apart from the diagnostic log lines.
pub fn classify(cause: WakeCause, lines: LineMask, tick_line: u8, zero_line: u8) -> Classification {
    match cause {
        WakeCause::Ext1 => match lines.decode() {
            LineDecode::Single(line) => match trigger_line(line, tick_line, zero_line) {
                Some(TriggerLine::Zero) => Classification::Reset,
                Some(TriggerLine::Tick) => Classification::Increment,
                None => {
                    info!("Wakeup pin {} is not a clock button", line);
                    Classification::Increment
                }
            },
            LineDecode::None => Classification::Increment,
            LineDecode::Multiple(mask) => {
                warn!("Several wakeup pins fired at once: {}", mask);
                Classification::Ambiguous(mask)
            }
        },
        WakeCause::Undefined => Classification::Increment,
        other => Classification::Spurious(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: u8 = 32;
    const ZERO: u8 = 33;

    #[test]
    fn test_decode_single_line() {
        assert_eq!(LineMask::from_bits(1 << 32).decode(), LineDecode::Single(32));
        assert_eq!(LineMask::from_bits(1 << 33).decode(), LineDecode::Single(33));
        assert_eq!(LineMask::from_bits(1).decode(), LineDecode::Single(0));
    }

    #[test]
    fn test_decode_empty_and_multiple() {
        assert_eq!(LineMask::EMPTY.decode(), LineDecode::None);

        let both = LineMask::from_lines(&[TICK, ZERO]);
        assert_eq!(both.bits(), 0x3_0000_0000);
        assert_eq!(both.decode(), LineDecode::Multiple(both));
    }

    #[test]
    fn test_from_lines_ignores_out_of_range() {
        let mask = LineMask::from_lines(&[2, 64, 200]);
        assert_eq!(mask.bits(), 0b100);
        assert!(mask.contains(2));
        assert!(!mask.contains(64));
    }

    #[test]
    fn test_zero_button_resets() {
        let lines = LineMask::from_lines(&[ZERO]);
        assert_eq!(classify(WakeCause::Ext1, lines, TICK, ZERO), Classification::Reset);
    }

    #[test]
    fn test_tick_button_increments() {
        let lines = LineMask::from_lines(&[TICK]);
        assert_eq!(
            classify(WakeCause::Ext1, lines, TICK, ZERO),
            Classification::Increment
        );
    }

    #[test]
    fn test_unknown_or_missing_line_increments() {
        let stray = LineMask::from_lines(&[4]);
        assert_eq!(
            classify(WakeCause::Ext1, stray, TICK, ZERO),
            Classification::Increment
        );
        assert_eq!(
            classify(WakeCause::Ext1, LineMask::EMPTY, TICK, ZERO),
            Classification::Increment
        );
    }

    #[test]
    fn test_simultaneous_buttons_are_ambiguous() {
        let both = LineMask::from_lines(&[TICK, ZERO]);
        let classification = classify(WakeCause::Ext1, both, TICK, ZERO);
        assert_eq!(classification, Classification::Ambiguous(both));
        assert!(!classification.resets());
    }

    #[test]
    fn test_first_boot_increments() {
        assert_eq!(
            classify(WakeCause::Undefined, LineMask::EMPTY, TICK, ZERO),
            Classification::Increment
        );
    }

    #[test]
    fn test_other_causes_ignore_line_mask() {
        // A stale zero bit must not reset the clock on a timer wake
        let lines = LineMask::from_lines(&[ZERO]);
        for cause in [
            WakeCause::Timer,
            WakeCause::Touchpad,
            WakeCause::Ulp,
            WakeCause::Ext0,
            WakeCause::Other(42),
        ] {
            assert_eq!(
                classify(cause, lines, TICK, ZERO),
                Classification::Spurious(cause)
            );
        }
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(
            WakeCause::Ext1.description(),
            "Wakeup caused by external signal using RTC_CNTL"
        );
        assert_eq!(
            WakeCause::Other(9).description(),
            "Wakeup was not caused by deep sleep: 9"
        );
    }

    #[test]
    fn test_line_decode_display() {
        assert_eq!(LineDecode::None.to_string(), "none");
        assert_eq!(LineDecode::Single(33).to_string(), "33");
        let both = LineMask::from_lines(&[TICK, ZERO]);
        assert_eq!(
            LineDecode::Multiple(both).to_string(),
            "ambiguous (0x300000000)"
        );
    }
}
