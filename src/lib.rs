//! Wakeclock
//!
//! A battery clock that shows elapsed minutes (00:00 - 23:59) on a bistable
//! e-paper panel. It has no RTC: a button press wakes the ESP32 from deep
//! sleep, the minute counter kept in RTC memory moves on by one, the panel is
//! refreshed and the chip goes straight back to sleep.
//!
//! The board specific glue lives in the firmware binary, everything here runs
//! on the host as well.
//!
//! - [`wake`] - why did we wake up, and what does it mean for the counter
//! - [`clock`] - the minute counter and its `HH:MM` text
//! - [`store`] - counter persistence across deep sleep
//! - [`cycle`] - one boot-to-sleep pass over all of the above
//! - [`render`] - the e-paper clock face
//! - [`ssd1681`] - the panel controller driver

pub mod clock;
pub mod config;
pub mod cycle;
pub mod render;
pub mod ssd1681;
pub mod store;
pub mod wake;

pub use crate::clock::{ClockState, ClockTime};
pub use crate::config::{ClockConfig, Pins};
pub use crate::cycle::{ArmedCycle, CyclePhase, CycleReport, RenderSink, WakeControl, WakeCycle};
pub use crate::render::EpaperClock;
pub use crate::store::{MemoryStore, PersistentStore};
pub use crate::wake::{Classification, LineMask, WakeCause, WakeConfig, WakeLevel};
