//! ESP32 bindings for the wake cycle seams
//!
//! - [`RtcStore`] keeps the counter in RTC slow memory
//! - [`EspWake`] drives the ext1 wake source and deep sleep
//! - [`Face`] is the e-paper panel, or nothing if it failed to come up

use core::sync::atomic::{AtomicI32, AtomicU32, Ordering};

use anyhow::{Context, Result};
use esp_idf_svc::hal::delay::Delay;
use esp_idf_svc::hal::gpio::{self, PinDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::prelude::*;
use esp_idf_svc::hal::spi;
use esp_idf_svc::sys::{self, esp, EspError};
use log::{error, info, warn};

use wakeclock::clock::INITIAL_MINUTE;
use wakeclock::ssd1681::{DisplayError, Ssd1681};
use wakeclock::{
    ClockConfig, ClockState, EpaperClock, LineMask, PersistentStore, Pins, RenderSink, WakeCause,
    WakeConfig, WakeControl, WakeCycle, WakeLevel,
};

/// SPI clock for the panel, well inside the SSD1681 write limit
const SPI_BAUDRATE_MHZ: u32 = 4;

// RTC slow memory keeps these through deep sleep, a power loss brings back
// the initializers.
#[link_section = ".rtc.data"]
static BOOT_COUNT: AtomicU32 = AtomicU32::new(0);
#[link_section = ".rtc.data"]
static MINUTE_COUNT: AtomicI32 = AtomicI32::new(INITIAL_MINUTE);

/// Counter state in RTC memory
pub struct RtcStore;

impl PersistentStore for RtcStore {
    fn load(&self) -> ClockState {
        ClockState {
            boot_count: BOOT_COUNT.load(Ordering::Relaxed),
            minute_count: MINUTE_COUNT.load(Ordering::Relaxed),
        }
    }

    fn store(&mut self, state: &ClockState) {
        BOOT_COUNT.store(state.boot_count, Ordering::Relaxed);
        MINUTE_COUNT.store(state.minute_count, Ordering::Relaxed);
    }
}

/// Ext1 wake source and deep sleep
pub struct EspWake;

impl WakeControl for EspWake {
    type Error = EspError;

    fn arm(&mut self, config: &WakeConfig) -> Result<(), EspError> {
        let mode = match config.level {
            WakeLevel::AnyHigh => sys::esp_sleep_ext1_wakeup_mode_t_ESP_EXT1_WAKEUP_ANY_HIGH,
            WakeLevel::AllLow => sys::esp_sleep_ext1_wakeup_mode_t_ESP_EXT1_WAKEUP_ALL_LOW,
        };
        // Overwrites the previous ext1 setup, so arming twice is harmless
        esp!(unsafe { sys::esp_sleep_enable_ext1_wakeup(config.lines.bits(), mode) })
    }

    fn wake_cause(&self) -> WakeCause {
        match unsafe { sys::esp_sleep_get_wakeup_cause() } {
            sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_UNDEFINED => WakeCause::Undefined,
            sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_EXT0 => WakeCause::Ext0,
            sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_EXT1 => WakeCause::Ext1,
            sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_TIMER => WakeCause::Timer,
            sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_TOUCHPAD => WakeCause::Touchpad,
            sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_ULP => WakeCause::Ulp,
            sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_GPIO => WakeCause::Gpio,
            sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_UART => WakeCause::Uart,
            other => WakeCause::Other(other),
        }
    }

    fn triggering_lines(&self) -> LineMask {
        LineMask::from_bits(unsafe { sys::esp_sleep_get_ext1_wakeup_status() })
    }

    fn enter_deep_sleep(&mut self) -> ! {
        unsafe { sys::esp_deep_sleep_start() }
    }
}

type Panel = EpaperClock<
    spi::SpiDeviceDriver<'static, spi::SpiDriver<'static>>,
    PinDriver<'static, gpio::Gpio4, gpio::Input>,
    PinDriver<'static, gpio::Gpio17, gpio::Output>,
    PinDriver<'static, gpio::Gpio16, gpio::Output>,
    Delay,
>;

/// Whatever we have to show the time on
pub enum Face {
    Epaper(Panel),
    /// Display bring-up failed, the counter still runs
    Headless,
}

impl RenderSink for Face {
    type Error = DisplayError;

    fn render(&mut self, text: &str) -> Result<(), DisplayError> {
        match self {
            Face::Epaper(panel) => panel.render(text),
            Face::Headless => {
                warn!("No display, time would be {}", text);
                Ok(())
            }
        }
    }

    fn hibernate(&mut self) -> Result<(), DisplayError> {
        match self {
            Face::Epaper(panel) => panel.hibernate(),
            Face::Headless => Ok(()),
        }
    }
}

/// Wire up SPI and the control pins of the e-paper board
fn bring_up_display(peripherals: Peripherals, config: &ClockConfig) -> Result<Panel> {
    let pins = peripherals.pins;

    info!(
        "Configuring SPI: SCK {}, MOSI {}, CS {} at {} MHz",
        Pins::SCK,
        Pins::MOSI,
        Pins::CS,
        SPI_BAUDRATE_MHZ
    );
    let spi = spi::SpiDeviceDriver::new_single(
        peripherals.spi2,
        pins.gpio18,                    // SCK - Pins::SCK
        pins.gpio23,                    // MOSI - Pins::MOSI
        Option::<gpio::AnyIOPin>::None, // No MISO needed for display
        Some(pins.gpio5),               // CS - Pins::CS
        &spi::SpiDriverConfig::new(),
        &spi::SpiConfig::new().baudrate(SPI_BAUDRATE_MHZ.MHz().into()),
    )
    .context("Could not create SPI device driver")?;

    let busy = PinDriver::input(pins.gpio4).context("Failed to set busy pin as input")?; // Pins::BSY
    let dc = PinDriver::output(pins.gpio17).context("Failed to set dc pin as output")?; // Pins::DC
    let rst = PinDriver::output(pins.gpio16).context("Failed to set rst pin as output")?; // Pins::RST

    let panel = Ssd1681::new(spi, busy, dc, rst, Delay::default());
    Ok(EpaperClock::new(panel, config.rotation))
}

/// One full wake cycle, ends in deep sleep
pub fn run() -> ! {
    let config = ClockConfig::default();
    let mut store = RtcStore;
    let mut wake = EspWake;

    let mut face = match Peripherals::take()
        .context("Could not take peripherals")
        .and_then(|peripherals| bring_up_display(peripherals, &config))
    {
        Ok(panel) => Face::Epaper(panel),
        Err(e) => {
            error!("Display bring-up failed: {:?}", e);
            Face::Headless
        }
    };

    WakeCycle::new(&mut store, &mut wake, &mut face, config).run()
}
