//! SSD1681 ePaper Display Driver
//!
//! Used on the HINK-E154A07-A1 1.54" 200x200 black/white panel board.
//!
//! This driver is losely modeled after the
//! [epd-waveshare](https://github.com/caemor/epd-waveshare) drivers but only
//! covers what a once-per-wake full refresh needs.
//!
//! ### Usage
//! 1. draw into a [`graphics::FrameBuffer`] with
//! [`embedded_graphics`](https://github.com/embedded-graphics/embedded-graphics)
//! 1. wake and configure the panel with [`driver::Ssd1681::init`]
//! 1. send the frame with [`driver::Ssd1681::write_frame`]
//! 1. kick off a display update with [`driver::Ssd1681::refresh_full`]
//! 1. power the panel down with [`driver::Ssd1681::sleep`]
#![allow(clippy::cast_possible_truncation)]

pub mod driver;
pub mod graphics;
pub mod interface;

mod cmd;
mod flag;

pub use driver::{DisplayError, Ssd1681};
pub use graphics::{DisplayRotation, FrameBuffer};

/// Display height, pixels vertically
pub const HEIGHT: u16 = 200;

/// Display width, pixels horizontally
pub const WIDTH: u16 = 200;
