//! Bit-plane framebuffer and scan-out driver for 32×32 RGB LED matrix panels
//! built from row-multiplexed shift-register column drivers.
//!
//! ## How the panel works
//!
//! The panel is scanned, not addressed: at any instant only one of 16 physical
//! rows is lit, and every physical row lights two logical rows at once (one in
//! the upper half of the panel, one in the lower half).
//!
//! ### Signal names
//! - **CLK** – Shift-register clock; every rising edge pushes one bit into the column driver chain
//! - **DATA** – Serial data for the bit being clocked in
//! - **LATCH** – Copies the shift-register contents to the driver outputs
//! - **BLANK** – Output blank (active HIGH): LEDs are dark while BLANK is HIGH
//! - **ROW0..ROW3** – Four row-address lines selecting one of the 16 physical rows
//!
//! ### Row layout
//! The column driver chain is 192 bits long: two blocks of 32 pixels × 3
//! channels. The first block drives the lower half of the panel, the second
//! the upper half. Within a pixel the channels are clocked blue, green, red.
//! Both axes are mirrored by the panel wiring, which the pixel encoder undoes.
//!
//! ### Brightness and colour depth (Binary Code Modulation)
//! Each LED can only be on or off. Colour depth comes from **Binary Code
//! Modulation (BCM)**: each channel value is split into `PLANES` bit-planes and
//! plane `k` is shown for `2^k` time units, so the accumulated on-time of a
//! pixel is proportional to its value. See [Batsocks – LED dimming using Binary
//! Code Modulation](https://www.batsocks.co.uk/readme/art_bcm_1.htm).
//!
//! ### Scan order
//! For every plane and every physical row: select the row address, shift the
//! 192 bits, latch, un-blank for the plane-weighted hold time, then blank again.
//! Address changes and latch pulses always happen while the output is blanked.
//!
//! ## Crate layout
//! - [`gamma`] – quantizers (gamma tables and the two-plane staircase)
//! - [`address`] – logical to hardware coordinate mapping
//! - [`framebuffer`] – bit-plane storage and the double-buffered variant
//! - [`encoder`] – pixel encoding into the bit-planes
//! - [`brightness`] – global brightness control
//! - [`config`] – scan timing and plane weighting
//! - [`scan`] – the scan-out driver and the pin bus
//! - [`panel`] – everything above bundled behind one handle
//!
//! ## Available Feature Flags
//!
//! ### `defmt` Feature
//! Implements `defmt::Format` for the public types and routes the crate's log
//! output through `defmt`.
//!
//! ### `log` Feature
//! Routes the crate's log output through the `log` facade. Ignored when
//! `defmt` is enabled.
#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

mod fmt;

pub mod address;
pub mod brightness;
pub mod config;
pub mod encoder;
pub mod framebuffer;
pub mod gamma;
pub mod panel;
pub mod scan;

use embedded_dma::ReadBuffer;
use embedded_graphics::pixelcolor::Rgb888;

pub use address::{Channel, Half, HwAddress};
pub use brightness::Brightness;
pub use config::{ScanConfig, Weighting};
pub use framebuffer::{BitPlaneFrameBuffer, DoubleBuffer};
pub use panel::Panel;
pub use scan::{Pins, ScanBus, ScanOut};

/// Color type accepted by the pixel encoder
pub type Color = Rgb888;

/// Logical panel width in pixels
pub const WIDTH: usize = 32;

/// Logical panel height in pixels
pub const HEIGHT: usize = 32;

/// Number of physical rows (the row-address space)
pub const ROWS: usize = 16;

/// Number of pixel slots in one shift-register row (two panel halves)
pub const ENTRIES_PER_ROW: usize = 2 * WIDTH;

/// Number of bits shifted out per physical row
pub const COLS_PER_ROW: usize = ENTRIES_PER_ROW * 3;

/// Computes the number of distinct levels per channel for a plane count
///
/// # Arguments
///
/// * `planes` - Number of bit-planes
///
/// # Returns
///
/// Number of intensity levels a channel can take
#[must_use]
pub const fn compute_levels(planes: usize) -> usize {
    1usize << planes
}

/// Computes the number of hold ticks per row for one pass over all planes
///
/// With binary weighting plane `k` holds `2^k` ticks, so a full pass holds
/// `2^planes - 1` ticks.
///
/// # Arguments
///
/// * `planes` - Number of bit-planes
///
/// # Returns
///
/// Total binary-weighted ticks per row per pass
#[must_use]
pub const fn compute_pass_ticks(planes: usize) -> usize {
    (1usize << planes) - 1
}

/// Trait for read-only bit-plane framebuffers
///
/// This is everything the scan-out driver needs: the plane count and random
/// access to the bit that is shifted out at a given position. The raw storage
/// is also exposed through [`ReadBuffer`] for DMA transports.
pub trait FrameBuffer: ReadBuffer {
    /// Number of bit-planes
    const PLANES: usize;

    /// Returns the bit shifted out at `index` (`0..COLS_PER_ROW`) of physical
    /// `row` (`0..ROWS`) in `plane`.
    fn bit(&self, plane: usize, row: usize, index: usize) -> bool;
}

/// Trait for framebuffers the pixel encoder can write to.
pub trait MutableFrameBuffer: FrameBuffer {
    /// Zero every bit in every plane.
    fn clear(&mut self);

    /// Store `value` for one channel of one pixel slot: bit `k` of `value`
    /// goes to plane `k`.
    fn write_slot(&mut self, address: HwAddress, channel: Channel, value: u8);
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::format;

    use super::*;
    use embedded_graphics::pixelcolor::RgbColor;

    #[test]
    fn test_geometry_constants() {
        assert_eq!(ROWS * 2, HEIGHT);
        assert_eq!(ENTRIES_PER_ROW, 64);
        assert_eq!(COLS_PER_ROW, 192);
    }

    #[test]
    fn test_compute_levels() {
        assert_eq!(compute_levels(1), 2);
        assert_eq!(compute_levels(2), 4);
        assert_eq!(compute_levels(6), 64);
        assert_eq!(compute_levels(8), 256);
    }

    #[test]
    fn test_compute_pass_ticks() {
        assert_eq!(compute_pass_ticks(1), 1);
        assert_eq!(compute_pass_ticks(2), 3);
        assert_eq!(compute_pass_ticks(6), 63);
        assert_eq!(compute_pass_ticks(8), 255);

        // each extra plane doubles the pass plus one tick
        for planes in 1..8 {
            assert_eq!(
                compute_pass_ticks(planes + 1),
                2 * compute_pass_ticks(planes) + 1
            );
        }
    }

    #[test]
    fn test_pass_ticks_match_binary_weights() {
        for planes in 1..=8 {
            let sum: u32 = (0..planes).map(|k| Weighting::Binary.ticks(k)).sum();
            assert_eq!(sum as usize, compute_pass_ticks(planes));
        }
    }

    #[test]
    fn test_helper_functions_const() {
        const PLANES: usize = 6;
        const LEVELS: usize = compute_levels(PLANES);
        const TICKS: usize = compute_pass_ticks(PLANES);

        assert_eq!(LEVELS, 64);
        assert_eq!(TICKS, 63);
    }

    #[test]
    fn test_color_type_alias() {
        let red_color: Color = Color::RED;
        let red_rgb888: Rgb888 = Rgb888::RED;

        assert_eq!(red_color, red_rgb888);
        assert_eq!(red_color.r(), 255);
        assert_eq!(red_color.g(), 0);
        assert_eq!(red_color.b(), 0);
        assert_eq!(format!("{:?}", Color::new(1, 2, 3)), format!("{:?}", Rgb888::new(1, 2, 3)));
    }
}
