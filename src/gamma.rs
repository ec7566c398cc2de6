//! Channel quantizers.
//!
//! A [`Quantizer`] maps a linear 8-bit channel value onto a level of its own
//! native bit depth. The pixel encoder then stretches that level back onto the
//! 8-bit domain with [`expand`] and keeps the top `PLANES` bits with
//! [`planes_value`], so that bit `k` of the result is shown in bit-plane `k`.
//!
//! Every quantizer here is monotonically non-decreasing and maps `0` to `0`
//! and `255` to its full-scale level. That is what makes full white light
//! every plane regardless of the plane count.

/// 8-bit gamma correction table (gamma ≈ 2.8).
///
/// Maps linear input values (e.g. 127 = half brightness) to the values that
/// produce that perceived brightness on the LED (e.g. 36).
pub const GAMMA8: [u8; 256] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 3, 4, 4, 4, 4, 4, 5, 5, 5,
    5, 6, 6, 6, 6, 7, 7, 7, 7, 8, 8, 8, 9, 9, 9, 10, 10, 10, 11, 11, 11, 12, 12, 13, 13, 13, 14,
    14, 15, 15, 16, 16, 17, 17, 18, 18, 19, 19, 20, 20, 21, 21, 22, 22, 23, 24, 24, 25, 25, 26, 27,
    27, 28, 29, 29, 30, 31, 32, 32, 33, 34, 35, 35, 36, 37, 38, 39, 39, 40, 41, 42, 43, 44, 45, 46,
    47, 48, 49, 50, 50, 51, 52, 54, 55, 56, 57, 58, 59, 60, 61, 62, 63, 64, 66, 67, 68, 69, 70, 72,
    73, 74, 75, 77, 78, 79, 81, 82, 83, 85, 86, 87, 89, 90, 92, 93, 95, 96, 98, 99, 101, 102, 104,
    105, 107, 109, 110, 112, 114, 115, 117, 119, 120, 122, 124, 126, 127, 129, 131, 133, 135, 137,
    138, 140, 142, 144, 146, 148, 150, 152, 154, 156, 158, 160, 162, 164, 167, 169, 171, 173, 175,
    177, 180, 182, 184, 186, 189, 191, 193, 196, 198, 200, 203, 205, 208, 210, 213, 215, 218, 220,
    223, 225, 228, 231, 233, 236, 239, 241, 244, 247, 249, 252, 255,
];

/// 6-bit gamma correction table (gamma ≈ 2.8), for six-plane configurations.
pub const GAMMA6: [u8; 256] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 4, 4, 4, 4, 4,
    4, 4, 4, 4, 5, 5, 5, 5, 5, 5, 5, 6, 6, 6, 6, 6, 6, 6, 7, 7, 7, 7, 7, 7, 8, 8, 8, 8, 8, 9, 9, 9,
    9, 9, 10, 10, 10, 10, 10, 11, 11, 11, 11, 12, 12, 12, 12, 12, 13, 13, 13, 13, 14, 14, 14, 15,
    15, 15, 15, 16, 16, 16, 16, 17, 17, 17, 18, 18, 18, 19, 19, 19, 20, 20, 20, 21, 21, 21, 22, 22,
    22, 23, 23, 23, 24, 24, 25, 25, 25, 26, 26, 26, 27, 27, 28, 28, 28, 29, 29, 30, 30, 31, 31, 31,
    32, 32, 33, 33, 34, 34, 35, 35, 36, 36, 37, 37, 38, 38, 39, 39, 40, 40, 41, 41, 42, 42, 43, 43,
    44, 44, 45, 45, 46, 47, 47, 48, 48, 49, 50, 50, 51, 51, 52, 53, 53, 54, 54, 55, 56, 56, 57, 58,
    58, 59, 60, 60, 61, 62, 62, 63,
];

/// Maps a linear 8-bit channel value to a level of native bit depth `DEPTH`.
pub trait Quantizer {
    /// Native bit depth of the levels returned by [`Quantizer::quantize`].
    const DEPTH: u8;

    /// Quantize `value`. The result is in `0..2^DEPTH`.
    fn quantize(&self, value: u8) -> u8;
}

/// Gamma correction through [`GAMMA8`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gamma8;

impl Quantizer for Gamma8 {
    const DEPTH: u8 = 8;

    #[inline]
    fn quantize(&self, value: u8) -> u8 {
        GAMMA8[value as usize]
    }
}

/// Gamma correction through [`GAMMA6`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gamma6;

impl Quantizer for Gamma6 {
    const DEPTH: u8 = 6;

    #[inline]
    fn quantize(&self, value: u8) -> u8 {
        GAMMA6[value as usize]
    }
}

/// No correction; the channel value is used as is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Linear;

impl Quantizer for Linear {
    const DEPTH: u8 = 8;

    #[inline]
    fn quantize(&self, value: u8) -> u8 {
        value
    }
}

/// Three-step staircase used by the two-plane mode.
///
/// Below a third of full scale the channel is off, below two thirds only
/// plane 1 is lit, above that both planes are lit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Threshold;

impl Threshold {
    const LOW: u8 = 255 / 3;
    const HIGH: u8 = 255 / 3 * 2;
}

impl Quantizer for Threshold {
    const DEPTH: u8 = 2;

    #[inline]
    fn quantize(&self, value: u8) -> u8 {
        if value < Self::LOW {
            0b00
        } else if value < Self::HIGH {
            0b10
        } else {
            0b11
        }
    }
}

/// Rescale a level of bit depth `depth` onto `0..=255`.
///
/// Full scale of the source depth maps exactly to 255.
#[must_use]
pub const fn expand(level: u8, depth: u8) -> u8 {
    if depth >= 8 {
        return level;
    }
    let max = (1u16 << depth) - 1;
    let level = if (level as u16) > max { max } else { level as u16 };
    (level * 255 / max) as u8
}

/// Keep the top `planes` bits of an 8-bit value.
#[must_use]
pub const fn planes_value(value: u8, planes: usize) -> u8 {
    value >> (8 - planes)
}
