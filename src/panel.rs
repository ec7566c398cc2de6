//! One handle for the whole panel.
//!
//! [`Panel`] owns the framebuffer, the brightness control, the quantizer and
//! the scan-out driver, and exposes the calls a firmware main loop makes:
//! draw pixels, change brightness, and call [`Panel::draw`] once per loop
//! iteration to refresh the LEDs.
//!
//! # Example
//! ```rust,ignore
//! use cosmic_unicorn_bcm::gamma::Gamma8;
//! use cosmic_unicorn_bcm::{Color, Panel, Pins, ScanConfig};
//! use embedded_graphics::prelude::*;
//!
//! let pins = Pins::new(clock, data, latch, blank, row0, row1, row2, row3);
//! let mut panel = Panel::<_, _, _, 8>::new(pins, delay, Gamma8, ScanConfig::new());
//! panel.init()?;
//!
//! panel.set_pixel(0, 0, 255, 0, 0);
//! panel.set_color(Point::new(31, 31), Color::new(0, 0, 255));
//! loop {
//!     if brightness_up_pressed() {
//!         panel.change_brightness(10);
//!     }
//!     panel.draw()?;
//! }
//! ```

use core::convert::Infallible;

use embedded_graphics::pixelcolor::RgbColor;
use embedded_graphics::prelude::{OriginDimensions, Point, Size};
use embedded_hal::delay::DelayNs;

use crate::encoder;
use crate::gamma::Quantizer;
use crate::scan::{ScanBus, ScanOut};
use crate::{BitPlaneFrameBuffer, Brightness, Color, ScanConfig, HEIGHT, WIDTH};

/// A 32×32 panel with `PLANES` bit-planes.
///
/// # Type Parameters
/// - `B`: Output bus (usually [`crate::Pins`])
/// - `D`: Delay provider used for all scan timing
/// - `Q`: Channel quantizer
/// - `PLANES`: Number of bit-planes (1-8)
pub struct Panel<B, D, Q, const PLANES: usize> {
    framebuffer: BitPlaneFrameBuffer<PLANES>,
    brightness: Brightness,
    quantizer: Q,
    scan: ScanOut<B, D>,
}

impl<B, D, Q, const PLANES: usize> Panel<B, D, Q, PLANES>
where
    B: ScanBus,
    D: DelayNs,
    Q: Quantizer,
{
    /// Create a panel with a cleared framebuffer at full brightness.
    #[must_use]
    pub fn new(bus: B, delay: D, quantizer: Q, config: ScanConfig) -> Self {
        debug!(
            "new panel with {} planes, quantizer depth {}, pass hold at full brightness {} ns",
            PLANES,
            Q::DEPTH,
            config.pass_hold_ns(PLANES, Brightness::MAX)
        );
        Self {
            framebuffer: BitPlaneFrameBuffer::new(),
            brightness: Brightness::default(),
            quantizer,
            scan: ScanOut::new(bus, delay, config),
        }
    }

    /// Configure the column drivers. Call once before the first draw.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the bus.
    pub fn init(&mut self) -> Result<(), B::Error> {
        self.scan.init()
    }

    /// Zero the framebuffer.
    pub fn clear(&mut self) {
        self.framebuffer.clear();
    }

    /// Set a pixel. Writes outside the panel are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) {
        encoder::set_pixel(
            &mut self.framebuffer,
            &self.quantizer,
            self.brightness.get(),
            x,
            y,
            r,
            g,
            b,
        );
    }

    /// Set a pixel from a colour. Writes outside the panel are ignored.
    pub fn set_color(&mut self, p: Point, color: Color) {
        self.set_pixel(p.x, p.y, color.r(), color.g(), color.b());
    }

    /// Add `delta` to the brightness, clamped to `0..=255`. Returns the new
    /// value.
    ///
    /// Hold times follow on the next draw. Pixels already in the framebuffer
    /// keep the brightness they were encoded with until they are redrawn.
    pub fn change_brightness(&self, delta: i32) -> u8 {
        self.brightness.change(delta)
    }

    /// The brightness control.
    #[must_use]
    pub fn brightness(&self) -> &Brightness {
        &self.brightness
    }

    /// The framebuffer being shown.
    #[must_use]
    pub fn framebuffer(&self) -> &BitPlaneFrameBuffer<PLANES> {
        &self.framebuffer
    }

    /// The scan-out driver.
    pub fn scan(&mut self) -> &mut ScanOut<B, D> {
        &mut self.scan
    }

    /// Refresh the LEDs once: one full pass over every plane and row.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the bus.
    pub fn draw(&mut self) -> Result<(), B::Error> {
        self.scan.draw(&self.framebuffer, self.brightness.get())
    }

    /// Give back the bus and delay provider.
    pub fn release(self) -> (B, D) {
        self.scan.release()
    }
}

impl<B, D, Q, const PLANES: usize> OriginDimensions for Panel<B, D, Q, PLANES> {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl<B, D, Q, const PLANES: usize> embedded_graphics::draw_target::DrawTarget
    for Panel<B, D, Q, PLANES>
where
    B: ScanBus,
    D: DelayNs,
    Q: Quantizer,
{
    type Color = Color;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = embedded_graphics::Pixel<Self::Color>>,
    {
        for pixel in pixels {
            self.set_color(pixel.0, pixel.1);
        }
        Ok(())
    }
}

impl<B, D, Q, const PLANES: usize> core::fmt::Debug for Panel<B, D, Q, PLANES>
where
    B: ScanBus,
    D: DelayNs,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Panel")
            .field("framebuffer", &self.framebuffer)
            .field("brightness", &self.brightness.get())
            .field("config", self.scan.config())
            .finish()
    }
}
