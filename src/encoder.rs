//! Pixel encoding.
//!
//! Turns an `(x, y, r, g, b)` write into bit-plane bits:
//! 1. discard the write if `(x, y)` is off the panel
//! 2. map `(x, y)` to a hardware pixel slot ([`HwAddress::from_logical`])
//! 3. per channel, scale by brightness ([`scale`]), quantize, stretch to
//!    8 bits and keep the top `PLANES` bits ([`encode_channel`])
//! 4. write bit `k` of the result into plane `k`
//!
//! [`Canvas`] wraps a framebuffer with a quantizer and a brightness so effect
//! code can draw with `embedded-graphics`.
//!
//! # Example
//! ```rust
//! use cosmic_unicorn_bcm::encoder::Canvas;
//! use cosmic_unicorn_bcm::gamma::Gamma8;
//! use cosmic_unicorn_bcm::{Color, DoubleBuffer};
//! use embedded_graphics::pixelcolor::RgbColor;
//! use embedded_graphics::prelude::*;
//! use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
//!
//! let mut framebuffer = DoubleBuffer::<8>::new();
//!
//! let mut canvas = Canvas::new(&mut framebuffer, &Gamma8, 255);
//! Rectangle::new(Point::new(4, 4), Size::new(8, 8))
//!     .into_styled(PrimitiveStyle::with_fill(Color::GREEN))
//!     .draw(&mut canvas)
//!     .unwrap();
//!
//! // show the finished frame
//! framebuffer.publish();
//! ```

use core::convert::Infallible;

use embedded_graphics::pixelcolor::RgbColor;
use embedded_graphics::prelude::{OriginDimensions, Point, Size};

use crate::gamma::{expand, planes_value, Quantizer};
use crate::{Channel, Color, HwAddress, MutableFrameBuffer, HEIGHT, WIDTH};

/// Scale a channel value by `brightness`.
///
/// `(value × (brightness + 1)) >> 8`: full brightness leaves the value
/// unchanged and zero brightness is black.
#[inline]
#[must_use]
pub const fn scale(value: u8, brightness: u8) -> u8 {
    ((value as u16 * (brightness as u16 + 1)) >> 8) as u8
}

/// Encode one channel value into a `planes`-bit value whose bit `k` belongs in
/// plane `k`.
#[inline]
#[must_use]
pub fn encode_channel<Q: Quantizer>(quantizer: &Q, value: u8, brightness: u8, planes: usize) -> u8 {
    let level = quantizer.quantize(scale(value, brightness));
    planes_value(expand(level, Q::DEPTH), planes)
}

/// Encode a pixel into `framebuffer`.
///
/// Writes outside the panel are silently discarded. Otherwise all planes of
/// the pixel's three channel slots are overwritten.
#[allow(clippy::too_many_arguments)]
pub fn set_pixel<F, Q>(
    framebuffer: &mut F,
    quantizer: &Q,
    brightness: u8,
    x: i32,
    y: i32,
    r: u8,
    g: u8,
    b: u8,
) where
    F: MutableFrameBuffer,
    Q: Quantizer,
{
    let Some(address) = HwAddress::from_logical(x, y) else {
        return;
    };
    for (channel, value) in [(Channel::Blue, b), (Channel::Green, g), (Channel::Red, r)] {
        let encoded = encode_channel(quantizer, value, brightness, F::PLANES);
        framebuffer.write_slot(address, channel, encoded);
    }
}

/// A drawing surface over a framebuffer.
///
/// Brightness is captured when the canvas is created; pixels drawn later with
/// a different brightness need a new canvas.
pub struct Canvas<'a, F, Q> {
    framebuffer: &'a mut F,
    quantizer: &'a Q,
    brightness: u8,
}

impl<'a, F, Q> Canvas<'a, F, Q>
where
    F: MutableFrameBuffer,
    Q: Quantizer,
{
    /// Create a canvas that encodes with `quantizer` at `brightness`.
    pub fn new(framebuffer: &'a mut F, quantizer: &'a Q, brightness: u8) -> Self {
        Self {
            framebuffer,
            quantizer,
            brightness,
        }
    }

    /// Zero every bit of the framebuffer.
    pub fn clear(&mut self) {
        self.framebuffer.clear();
    }

    /// Set a pixel from separate channel values.
    pub fn set_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) {
        set_pixel(&mut *self.framebuffer, self.quantizer, self.brightness, x, y, r, g, b);
    }

    /// Set a pixel from a colour.
    pub fn set_color(&mut self, p: Point, color: Color) {
        self.set_pixel(p.x, p.y, color.r(), color.g(), color.b());
    }
}

impl<F, Q> OriginDimensions for Canvas<'_, F, Q> {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl<F, Q> embedded_graphics::draw_target::DrawTarget for Canvas<'_, F, Q>
where
    F: MutableFrameBuffer,
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

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.framebuffer.clear();
        if color != Color::BLACK {
            for y in 0..HEIGHT as i32 {
                for x in 0..WIDTH as i32 {
                    self.set_color(Point::new(x, y), color);
                }
            }
        }
        Ok(())
    }
}
