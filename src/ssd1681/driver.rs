//! SSD1681 Display Driver Implementation
//!
//! Just enough of the controller to show one full frame per boot and go back
//! to sleep:
//!
//! - `init()` - hardware reset, software reset and panel setup
//! - `write_frame()` - copy a full frame into the B/W RAM
//! - `refresh_full()` - full waveform refresh, waits for BUSY
//! - `sleep()` - deep sleep mode 1, left only through `init()`
//!
//! ## Polarity
//!
//! RAM bit `1` is a white pixel and `0` is black, the frame buffer in
//! [`graphics`](super::graphics) already uses that layout.

pub use display_interface::DisplayError;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::ssd1681::interface::DisplayInterface;
use crate::ssd1681::{cmd::Cmd, flag::Flag, graphics::BUFFER_SIZE, HEIGHT, WIDTH};

/// SSD1681 E-Paper Display Driver
///
/// ## Type Parameters
///
/// - `SPI` - SPI device for communication
/// - `BSY` - BUSY input pin (HIGH when display is busy)
/// - `DC` - Data/Command output pin
/// - `RST` - Reset output pin
/// - `DELAY` - Delay provider for timing
pub struct Ssd1681<SPI, BSY, DC, RST, DELAY> {
    /// The display interface
    interface: DisplayInterface<SPI, BSY, DC, RST, DELAY>,
    /// Set once the panel went into deep sleep, cleared by `init()`
    asleep: bool,
}

impl<SPI, BSY, DC, RST, DELAY> Ssd1681<SPI, BSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    RST: OutputPin,
    DC: OutputPin,
    BSY: InputPin,
    DELAY: DelayNs,
{
    /// Wrap the bus and pins. The panel is not touched until `init()`.
    pub fn new(spi: SPI, busy: BSY, dc: DC, rst: RST, delay: DELAY) -> Self {
        Ssd1681 {
            interface: DisplayInterface::new(spi, busy, dc, rst, delay),
            asleep: false,
        }
    }

    pub fn is_asleep(&self) -> bool {
        self.asleep
    }

    /// Reset the controller and configure it for the full 200x200 window.
    ///
    /// # Initialization Sequence
    ///
    /// 1. **Hardware Reset** - short pulse, also wakes the panel from deep sleep
    /// 2. **Software Reset** (0x12)
    /// 3. **Driver Output Control** (0x01) - 200 gate lines
    /// 4. **Data Entry Mode** (0x11) - Y+, X+
    /// 5. **RAM window** (0x44, 0x45) and counters (0x4E, 0x4F)
    /// 6. **Border Waveform** (0x3C)
    /// 7. **Temperature Sensor** (0x18) - internal sensor
    pub fn init(&mut self) -> Result<(), DisplayError> {
        log::info!("Initializing e-paper panel");

        self.interface.reset_all()?;
        self.asleep = false;

        let gates = HEIGHT - 1;
        self.cmd_data(
            Cmd::DRIVER_CONTROL,
            &[
                (gates & 0xFF) as u8,
                (gates >> 8) as u8,
                Flag::DRIVER_OUTPUT_GATE_SCAN_FROM_G0,
            ],
        )?;
        self.cmd_data(Cmd::DATA_ENTRY_MODE, &[Flag::DATA_ENTRY_INCRY_INCRX])?;
        self.use_full_frame()?;
        self.cmd_data(
            Cmd::BORDER_WAVEFORM_CONTROL,
            &[Flag::BORDER_WAVEFORM_FOLLOW_LUT_WHITE],
        )?;
        self.cmd_data(Cmd::TEMP_CONTROL, &[Flag::INTERNAL_TEMP_SENSOR])?;

        self.interface.wait_busy_low();
        log::debug!("Panel initialized");
        Ok(())
    }

    /// Copy a full frame into the B/W RAM
    pub fn write_frame(&mut self, buffer: &[u8]) -> Result<(), DisplayError> {
        if buffer.len() != BUFFER_SIZE {
            log::error!(
                "Frame is {} bytes, the panel needs {}",
                buffer.len(),
                BUFFER_SIZE
            );
            return Err(DisplayError::OutOfBoundsError);
        }

        self.reset_ram_counters()?;
        self.interface.cmd_with_data(Cmd::WRITE_BW_DATA, buffer)
    }

    /// Full refresh of the panel from RAM, blocks until BUSY goes low
    pub fn refresh_full(&mut self) -> Result<(), DisplayError> {
        log::info!("Full refresh");
        self.cmd_data(Cmd::UPDATE_DISPLAY_CTRL2, &[Flag::DISPLAY_UPDATE_FULL])?;
        self.interface.cmd(Cmd::MASTER_ACTIVATE)?;
        self.interface.wait_busy_low();
        Ok(())
    }

    /// Put the controller into deep sleep mode 1 to save power.
    ///
    /// The picture stays on the panel without power. Calling it twice is a
    /// no-op since a sleeping controller ignores the bus anyway.
    pub fn sleep(&mut self) -> Result<(), DisplayError> {
        if self.asleep {
            return Ok(());
        }
        log::info!("Putting display into deep sleep mode");
        self.cmd_data(Cmd::DEEP_SLEEP_MODE, &[Flag::DEEP_SLEEP_MODE_1])?;
        self.asleep = true;
        Ok(())
    }

    /// Set RAM window to full frame (0-24 for X bytes, 0-199 for Y)
    fn use_full_frame(&mut self) -> Result<(), DisplayError> {
        let x_end = (WIDTH / 8 - 1) as u8;
        let y_end = HEIGHT - 1;

        self.cmd_data(Cmd::SET_RAMXPOS, &[0x00, x_end])?;
        self.cmd_data(
            Cmd::SET_RAMYPOS,
            &[0x00, 0x00, (y_end & 0xFF) as u8, (y_end >> 8) as u8],
        )?;
        self.reset_ram_counters()
    }

    /// Set RAM X and Y counters to origin (0, 0)
    fn reset_ram_counters(&mut self) -> Result<(), DisplayError> {
        self.cmd_data(Cmd::SET_RAMX_COUNTER, &[0x00])?;
        self.cmd_data(Cmd::SET_RAMY_COUNTER, &[0x00, 0x00])
    }

    /// Execute command followed by data (shorthand for cmd + data pattern)
    fn cmd_data(&mut self, cmd: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.interface.cmd_with_data(cmd, data)
    }
}
