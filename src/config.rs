//! Board wiring and clock configuration
//!
//! Wemos Lolin32 Lite with a HINK-E154A07-A1 1.54" e-paper board.

use crate::ssd1681::DisplayRotation;
use crate::wake::{LineMask, WakeConfig, WakeLevel};

/// Pin configuration constants for the display and the two buttons
pub struct Pins;

#[allow(dead_code)]
impl Pins {
    // SPI Display pins
    /// Chip Select pin for SPI display
    pub const CS: u8 = 5;
    /// Data/Command control pin (High for data, Low for command)
    pub const DC: u8 = 17;
    /// Reset pin for display
    pub const RST: u8 = 16;
    /// Busy status pin (High when display is busy)
    pub const BSY: u8 = 4;
    /// SPI Clock pin
    pub const SCK: u8 = 18;
    /// SPI Master Out Slave In
    pub const MOSI: u8 = 23;

    // Button pins, both RTC capable so they can end deep sleep
    /// Minute increment button
    pub const BTN_TICK: u8 = 32;
    /// Reset to zero minutes button
    pub const BTN_ZERO: u8 = 33;
}

/// Runtime configuration of the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    /// GPIO that advances the counter
    pub tick_line: u8,
    /// GPIO that zeroes the counter
    pub zero_line: u8,
    /// Level that ends deep sleep
    pub wake_level: WakeLevel,
    /// Panel orientation
    pub rotation: DisplayRotation,
}

impl ClockConfig {
    /// Wake sources to arm before sleeping
    pub fn wake_config(&self) -> WakeConfig {
        WakeConfig {
            lines: LineMask::from_lines(&[self.tick_line, self.zero_line]),
            level: self.wake_level,
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig {
            tick_line: Pins::BTN_TICK,
            zero_line: Pins::BTN_ZERO,
            wake_level: WakeLevel::AnyHigh,
            rotation: DisplayRotation::Rotate270,
        }
    }
}
