//! Frame buffer with `embedded-graphics` support
//!
//! One bit per pixel, MSB first, row major in controller orientation.
//! `BinaryColor::On` is ink (black), `BinaryColor::Off` is paper (white).

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

use crate::ssd1681::{flag::Flag, HEIGHT, WIDTH};

/// Bytes needed for one full frame
pub const BUFFER_SIZE: usize = (WIDTH as usize / 8) * HEIGHT as usize;

/// Display rotation, counted in clockwise quarter turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayRotation {
    /// No rotation
    #[default]
    Rotate0,
    /// Rotate by 90 degrees clockwise
    Rotate90,
    /// Rotate by 180 degrees clockwise
    Rotate180,
    /// Rotate by 270 degrees clockwise
    Rotate270,
}

/// Full frame for the 200x200 panel, the pixels live on the heap
pub struct FrameBuffer {
    buffer: Box<[u8]>,
    rotation: DisplayRotation,
}

impl FrameBuffer {
    /// White frame in the default orientation
    pub fn new() -> Self {
        FrameBuffer {
            buffer: vec![Flag::RAM_BYTE_WHITE; BUFFER_SIZE].into_boxed_slice(),
            rotation: DisplayRotation::default(),
        }
    }

    pub fn set_rotation(&mut self, rotation: DisplayRotation) {
        self.rotation = rotation;
    }

    /// Raw bytes in controller RAM layout
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Map a point in the rotated drawing space to a controller pixel
    fn physical(&self, point: Point) -> Option<(u32, u32)> {
        let size = self.size();
        if point.x < 0
            || point.y < 0
            || point.x as u32 >= size.width
            || point.y as u32 >= size.height
        {
            return None;
        }
        let (x, y) = (point.x as u32, point.y as u32);
        let (w, h) = (u32::from(WIDTH), u32::from(HEIGHT));

        Some(match self.rotation {
            DisplayRotation::Rotate0 => (x, y),
            DisplayRotation::Rotate90 => (w - 1 - y, x),
            DisplayRotation::Rotate180 => (w - 1 - x, h - 1 - y),
            DisplayRotation::Rotate270 => (y, h - 1 - x),
        })
    }

    fn set_pixel(&mut self, point: Point, color: BinaryColor) {
        let Some((x, y)) = self.physical(point) else {
            return;
        };
        let index = (y * u32::from(WIDTH) / 8 + x / 8) as usize;
        let bit = 0x80 >> (x % 8);
        match color {
            BinaryColor::On => self.buffer[index] &= !bit,
            BinaryColor::Off => self.buffer[index] |= bit,
        }
    }

    /// Color at a point in drawing space, `None` when off the panel
    pub fn pixel(&self, point: Point) -> Option<BinaryColor> {
        let (x, y) = self.physical(point)?;
        let index = (y * u32::from(WIDTH) / 8 + x / 8) as usize;
        let bit = 0x80 >> (x % 8);
        Some(if self.buffer[index] & bit == 0 {
            BinaryColor::On
        } else {
            BinaryColor::Off
        })
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        match self.rotation {
            DisplayRotation::Rotate0 | DisplayRotation::Rotate180 => {
                Size::new(u32::from(WIDTH), u32::from(HEIGHT))
            }
            DisplayRotation::Rotate90 | DisplayRotation::Rotate270 => {
                Size::new(u32::from(HEIGHT), u32::from(WIDTH))
            }
        }
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let byte = match color {
            BinaryColor::On => !Flag::RAM_BYTE_WHITE,
            BinaryColor::Off => Flag::RAM_BYTE_WHITE,
        };
        self.buffer.fill(byte);
        Ok(())
    }
}
