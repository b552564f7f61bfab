//! Display interface using SPI
use crate::ssd1681::cmd::Cmd;
use display_interface::DisplayError;
use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};

/// Length of the reset pulse. Boards with a reset capacitor ("clever" reset
/// circuit) need a short pulse, a long one leaves the controller stuck.
const RESET_PULSE_MS: u32 = 2;
/// Settle time on either side of the reset pulse
const RESET_SETTLE_MS: u32 = 10;
/// A full refresh takes about 1.2 s, anything past this is a stuck panel
pub(crate) const BUSY_WAIT_TIMEOUT_MS: u32 = 10_000;

/// The wires between the MCU and the panel controller
pub struct DisplayInterface<SPI, BSY, DC, RST, DELAY> {
    /// SPI device
    spi: SPI,
    /// High while the controller is busy
    busy: BSY,
    /// Data/Command Control Pin (High for data, Low for command)
    dc: DC,
    /// Pin for Reseting
    rst: RST,
    /// Delay provider for reset timing and busy polling
    delay: DELAY,
}

impl<SPI, BSY, DC, RST, DELAY> DisplayInterface<SPI, BSY, DC, RST, DELAY> {
    pub fn new(spi: SPI, busy: BSY, dc: DC, rst: RST, delay: DELAY) -> Self {
        DisplayInterface {
            spi,
            busy,
            dc,
            rst,
            delay,
        }
    }
}

impl<SPI, BSY, DC, RST, DELAY> DisplayInterface<SPI, BSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    RST: OutputPin,
    DC: OutputPin,
    BSY: InputPin,
    DELAY: DelayNs,
{
    /// Basic function for sending commands
    pub(crate) fn cmd(&mut self, command: u8) -> Result<(), DisplayError> {
        // low for commands
        self.dc.set_low().map_err(|_| DisplayError::DCError)?;

        match self.spi.write(&[command]) {
            Ok(_) => Ok(()),
            Err(e) => {
                log::error!("SPI write error for command 0x{:02X}: {:?}", command, e);
                Err(DisplayError::BusWriteError)
            }
        }
    }

    /// Basic function for sending an array of u8-values of data over spi
    pub(crate) fn data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        // high for data
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        self.spi
            .write(data)
            .map_err(|_| DisplayError::BusWriteError)
    }

    /// Basic function for sending a command and the data belonging to it.
    pub(crate) fn cmd_with_data(&mut self, command: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.cmd(command)?;
        self.data(data)
    }

    /// Wait for the BUSY pin to go LOW.
    ///
    /// Gives up after [`BUSY_WAIT_TIMEOUT_MS`] and carries on: a stale
    /// picture beats a clock that never goes back to sleep.
    pub(crate) fn wait_busy_low(&mut self) {
        let mut waited_ms = 0u32;

        while waited_ms < BUSY_WAIT_TIMEOUT_MS {
            match self.busy.is_high() {
                Ok(false) => {
                    log::debug!("Panel ready after {} ms", waited_ms);
                    return;
                }
                Ok(true) => {
                    self.delay.delay_ms(1);
                    waited_ms += 1;
                }
                Err(_) => {
                    log::error!("Error reading BUSY pin state - assuming not busy to continue");
                    return;
                }
            }
        }

        log::error!(
            "TIMEOUT waiting for BUSY pin to go LOW after {} ms",
            BUSY_WAIT_TIMEOUT_MS
        );
    }

    /// Hardware reset, also the only way out of deep sleep mode 1
    pub(crate) fn reset(&mut self) -> Result<(), DisplayError> {
        self.rst.set_high().map_err(|_| DisplayError::RSError)?;
        self.delay.delay_ms(RESET_SETTLE_MS);
        self.rst.set_low().map_err(|_| DisplayError::RSError)?;
        self.delay.delay_ms(RESET_PULSE_MS);
        self.rst.set_high().map_err(|_| DisplayError::RSError)?;
        self.delay.delay_ms(RESET_SETTLE_MS);
        Ok(())
    }

    /// Hardware reset followed by a software reset
    pub(crate) fn reset_all(&mut self) -> Result<(), DisplayError> {
        self.reset()?;
        self.cmd(Cmd::SW_RESET)?;
        self.wait_busy_low();
        Ok(())
    }
}
