//! Render sink drawing the time on the e-paper panel
//!
//! One call draws the whole picture: clear to white, place the text in the
//! middle of the panel, full refresh. The panel is then put to deep sleep,
//! the image stays visible without power.

use embedded_graphics::{
    mono_font::{iso_8859_15::FONT_10X20, MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::Rectangle,
    text::{Baseline, Text},
};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::cycle::RenderSink;
use crate::ssd1681::{DisplayError, DisplayRotation, FrameBuffer, Ssd1681};

/// Font for the time, scaled up by [`EpaperClock::with_scale`]
pub const TIME_FONT: &MonoFont<'static> = &FONT_10X20;

/// Default pixel scale, `HH:MM` ends up 150x60 pixels
pub const DEFAULT_SCALE: u32 = 3;

/// Top left corner that centers `bounds` inside `area`.
///
/// `bounds` is the text bounding box when drawn at the origin, so its
/// offset is subtracted back out.
pub fn centered_origin(bounds: Rectangle, area: Size) -> Point {
    let x = (area.width as i32 - bounds.size.width as i32) / 2 - bounds.top_left.x;
    let y = (area.height as i32 - bounds.size.height as i32) / 2 - bounds.top_left.y;
    Point::new(x, y)
}

/// Draw target adapter that blows every pixel up to a `scale` x `scale`
/// block, placed relative to `offset` in the inner target
struct Scaled<'a, T> {
    inner: &'a mut T,
    offset: Point,
    scale: u32,
}

impl<T: OriginDimensions> OriginDimensions for Scaled<'_, T> {
    fn size(&self) -> Size {
        self.inner.size() / self.scale
    }
}

impl<T> DrawTarget for Scaled<'_, T>
where
    T: DrawTarget<Color = BinaryColor> + OriginDimensions,
{
    type Color = BinaryColor;
    type Error = T::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let scale = self.scale;
        for Pixel(point, color) in pixels {
            let block = Rectangle::new(
                self.offset + point * scale as i32,
                Size::new(scale, scale),
            );
            self.inner.fill_solid(&block, color)?;
        }
        Ok(())
    }
}

/// The clock face: an SSD1681 panel plus its frame buffer
pub struct EpaperClock<SPI, BSY, DC, RST, DELAY> {
    panel: Ssd1681<SPI, BSY, DC, RST, DELAY>,
    frame: FrameBuffer,
    font: &'static MonoFont<'static>,
    scale: u32,
}

impl<SPI, BSY, DC, RST, DELAY> EpaperClock<SPI, BSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    RST: OutputPin,
    DC: OutputPin,
    BSY: InputPin,
    DELAY: DelayNs,
{
    pub fn new(panel: Ssd1681<SPI, BSY, DC, RST, DELAY>, rotation: DisplayRotation) -> Self {
        let mut frame = FrameBuffer::new();
        frame.set_rotation(rotation);
        EpaperClock {
            panel,
            frame,
            font: TIME_FONT,
            scale: DEFAULT_SCALE,
        }
    }

    /// Change the pixel scale, 1 draws the font at its native size
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale.max(1);
        self
    }

    /// Last frame that was sent to the panel
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn panel(&self) -> &Ssd1681<SPI, BSY, DC, RST, DELAY> {
        &self.panel
    }

    /// Draw `text` centered into the frame buffer, no bus traffic
    fn compose(&mut self, text: &str) {
        self.frame
            .clear(BinaryColor::Off)
            .unwrap_or_else(|e| match e {});

        let style = MonoTextStyle::new(self.font, BinaryColor::On);
        let label = Text::with_baseline(text, Point::zero(), style, Baseline::Top);
        let bounds = label.bounding_box();
        let scaled = Rectangle::new(bounds.top_left * self.scale as i32, bounds.size * self.scale);
        let origin = centered_origin(scaled, self.frame.size());
        log::debug!("Drawing '{}' at {:?} (x{})", text, origin, self.scale);

        let mut target = Scaled {
            inner: &mut self.frame,
            offset: origin,
            scale: self.scale,
        };
        label
            .draw(&mut target)
            .map(|_| ())
            .unwrap_or_else(|e| match e {});
    }
}

impl<SPI, BSY, DC, RST, DELAY> RenderSink for EpaperClock<SPI, BSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    RST: OutputPin,
    DC: OutputPin,
    BSY: InputPin,
    DELAY: DelayNs,
{
    type Error = DisplayError;

    fn render(&mut self, text: &str) -> Result<(), DisplayError> {
        self.panel.init()?;
        self.compose(text);
        self.panel.write_frame(self.frame.buffer())?;
        self.panel.refresh_full()
    }

    fn hibernate(&mut self) -> Result<(), DisplayError> {
        self.panel.sleep()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ClockState, ClockTime, INITIAL_MINUTE};
    use crate::config::ClockConfig;
    use crate::cycle::{WakeControl, WakeCycle};
    use crate::ssd1681::driver::tests::{mock_panel, Wire};
    use crate::store::{MemoryStore, PersistentStore};
    use crate::wake::{LineMask, WakeCause, WakeConfig};

    /// Smallest rectangle around every black pixel
    fn ink_bounds(frame: &FrameBuffer) -> Option<Rectangle> {
        let size = frame.size();
        let mut min = Point::new(i32::MAX, i32::MAX);
        let mut max = Point::new(i32::MIN, i32::MIN);
        let mut any = false;
        for y in 0..size.height as i32 {
            for x in 0..size.width as i32 {
                if frame.pixel(Point::new(x, y)) == Some(BinaryColor::On) {
                    any = true;
                    min = min.component_min(Point::new(x, y));
                    max = max.component_max(Point::new(x, y));
                }
            }
        }
        any.then(|| Rectangle::with_corners(min, max))
    }

    #[test]
    fn test_centered_origin() {
        let bounds = Rectangle::new(Point::new(0, -15), Size::new(50, 20));
        assert_eq!(
            centered_origin(bounds, Size::new(200, 200)),
            Point::new(75, 105)
        );

        let bounds = Rectangle::new(Point::zero(), Size::new(150, 60));
        assert_eq!(
            centered_origin(bounds, Size::new(200, 200)),
            Point::new(25, 70)
        );
    }

    #[test]
    fn test_render_draws_inside_centered_box() {
        let (panel, _bus) = mock_panel();
        let mut clock = EpaperClock::new(panel, DisplayRotation::Rotate270);
        clock.render("23:57").unwrap();

        // 5 glyphs of 10x20 at scale 3 make a 150x60 box centered on 200x200
        let ink = ink_bounds(clock.frame()).expect("time was drawn");
        let text_box = Rectangle::new(Point::new(25, 70), Size::new(150, 60));
        assert!(text_box.contains(ink.top_left));
        assert!(text_box.contains(ink.bottom_right().unwrap()));
    }

    #[test]
    fn test_render_native_scale() {
        let (panel, _bus) = mock_panel();
        let mut clock = EpaperClock::new(panel, DisplayRotation::Rotate0).with_scale(1);
        clock.render("00:00").unwrap();

        let ink = ink_bounds(clock.frame()).expect("time was drawn");
        let text_box = Rectangle::new(Point::new(75, 90), Size::new(50, 20));
        assert!(text_box.contains(ink.top_left));
        assert!(text_box.contains(ink.bottom_right().unwrap()));
    }

    #[test]
    fn test_render_sends_frame_then_refresh() {
        let (panel, bus) = mock_panel();
        let mut clock = EpaperClock::new(panel, DisplayRotation::Rotate270);
        clock.render("12:34").unwrap();
        clock.hibernate().unwrap();

        let wire = bus.borrow().wire.clone();
        let frame_pos = wire
            .iter()
            .position(|w| *w == Wire::Cmd(0x24))
            .expect("frame written");
        assert_eq!(
            wire.get(frame_pos + 1),
            Some(&Wire::Data(clock.frame().buffer().to_vec()))
        );
        assert_eq!(
            &wire[wire.len() - 5..],
            &[
                Wire::Cmd(0x22),
                Wire::Data(vec![0xF7]),
                Wire::Cmd(0x20),
                Wire::Cmd(0x10),
                Wire::Data(vec![0x01]),
            ]
        );
        assert!(clock.panel().is_asleep());
    }

    /// Wake hardware that reports one fixed wake
    struct FixedWake {
        cause: WakeCause,
        lines: LineMask,
        arms: usize,
    }

    impl WakeControl for FixedWake {
        type Error = ();

        fn arm(&mut self, _config: &WakeConfig) -> Result<(), ()> {
            self.arms += 1;
            Ok(())
        }

        fn wake_cause(&self) -> WakeCause {
            self.cause
        }

        fn triggering_lines(&self) -> LineMask {
            self.lines
        }

        fn enter_deep_sleep(&mut self) -> ! {
            panic!("deep sleep is not available in tests");
        }
    }

    /// Frame the panel shows for `text` in the default orientation
    fn expected_frame(text: &str) -> Vec<u8> {
        let (panel, _bus) = mock_panel();
        let mut clock = EpaperClock::new(panel, ClockConfig::default().rotation);
        clock.render(text).unwrap();
        clock.frame().buffer().to_vec()
    }

    #[test]
    fn test_cycle_drives_the_panel() {
        let (panel, bus) = mock_panel();
        let config = ClockConfig::default();
        let mut clock = EpaperClock::new(panel, config.rotation);
        let mut store = MemoryStore::new();
        let mut wake = FixedWake {
            cause: WakeCause::Undefined,
            lines: LineMask::EMPTY,
            arms: 0,
        };

        let armed = WakeCycle::new(&mut store, &mut wake, &mut clock, config).prepare();
        assert_eq!(armed.report().time, ClockTime::from_minute_of_day((INITIAL_MINUTE + 1) as u16));
        drop(armed);

        assert_eq!(wake.arms, 2);
        assert!(clock.panel().is_asleep());
        let text = ClockTime::from_minute_of_day((INITIAL_MINUTE + 1) as u16).to_string();
        assert_eq!(clock.frame().buffer(), &expected_frame(&text)[..]);
        assert_eq!(bus.borrow().wire.last(), Some(&Wire::Data(vec![0x01])));
    }

    #[test]
    fn test_zero_wake_shows_midnight_from_any_stored_minute() {
        let midnight = expected_frame("00:00");
        for stored in [-1, 1439, 1440, i32::MIN] {
            let (panel, _bus) = mock_panel();
            let config = ClockConfig::default();
            let mut clock = EpaperClock::new(panel, config.rotation);
            let mut store = MemoryStore::with_state(ClockState {
                boot_count: 0,
                minute_count: stored,
            });
            let mut wake = FixedWake {
                cause: WakeCause::Ext1,
                lines: LineMask::from_lines(&[config.zero_line]),
                arms: 0,
            };

            WakeCycle::new(&mut store, &mut wake, &mut clock, config).prepare();

            assert_eq!(store.load().minute_count, 0, "stored {}", stored);
            assert_eq!(clock.frame().buffer(), &midnight[..], "stored {}", stored);
        }
    }

    #[test]
    fn test_rerender_clears_previous_time() {
        let (panel, _bus) = mock_panel();
        let mut clock = EpaperClock::new(panel, DisplayRotation::Rotate0).with_scale(1);
        clock.render("88:88").unwrap();
        let first = clock.frame().buffer().to_vec();
        clock.render("11:11").unwrap();
        assert_ne!(clock.frame().buffer(), &first[..]);

        // Same text twice gives the same frame
        clock.render("88:88").unwrap();
        assert_eq!(clock.frame().buffer(), &first[..]);
    }
}
