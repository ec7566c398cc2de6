//! Global brightness control.
//!
//! Brightness is a single `u8` read by the pixel encoder (to scale channel
//! values before quantization) and by the scan-out driver (to scale hold
//! times). It is changed rarely, from input handling, and read continuously,
//! so it lives in an [`AtomicU8`]. Only plain loads and stores are used,
//! which every target supports, including those without atomic
//! read-modify-write instructions.
//!
//! [`crate::Panel`] owns its `Brightness`, so with a panel, brightness changes
//! go through [`crate::Panel::change_brightness`] from the draw loop. To change
//! brightness from an interrupt handler instead, put a `Brightness` in a
//! `static` and drive [`crate::encoder`] and [`crate::ScanOut::draw`] directly
//! with its [`Brightness::get`] value.

use core::sync::atomic::{AtomicU8, Ordering};

/// Process-wide brightness scalar in `0..=255`.
#[derive(Debug)]
pub struct Brightness(AtomicU8);

impl Brightness {
    /// Full brightness.
    pub const MAX: u8 = u8::MAX;

    /// Create a brightness control starting at `value`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(AtomicU8::new(value))
    }

    /// Current brightness.
    #[inline]
    #[must_use]
    pub fn get(&self) -> u8 {
        self.0.load(Ordering::Relaxed)
    }

    /// Set the brightness outright.
    pub fn set(&self, value: u8) {
        self.0.store(value, Ordering::Relaxed);
        debug!("brightness set to {}", value);
    }

    /// Add `delta` to the brightness, clamping the result to `0..=255`.
    ///
    /// Returns the new brightness. Assumes a single writer; concurrent
    /// readers always see either the old or the new value.
    pub fn change(&self, delta: i32) -> u8 {
        let old = self.get();
        let new = i32::from(old).saturating_add(delta).clamp(0, i32::from(Self::MAX)) as u8;
        self.0.store(new, Ordering::Relaxed);
        debug!("brightness {} -> {}", old, new);
        new
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::new(Self::MAX)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Brightness {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Brightness({})", self.get());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_full() {
        assert_eq!(Brightness::default().get(), 255);
    }

    #[test]
    fn test_change_clamps_high() {
        let brightness = Brightness::new(100);
        assert_eq!(brightness.change(1000), 255);
        assert_eq!(brightness.get(), 255);
    }

    #[test]
    fn test_change_clamps_low() {
        let brightness = Brightness::new(100);
        assert_eq!(brightness.change(-1000), 0);
        assert_eq!(brightness.get(), 0);
    }

    #[test]
    fn test_change_extremes_do_not_overflow() {
        let brightness = Brightness::new(200);
        assert_eq!(brightness.change(i32::MAX), 255);
        assert_eq!(brightness.change(i32::MIN), 0);
    }

    #[test]
    fn test_change_steps() {
        let brightness = Brightness::new(250);
        assert_eq!(brightness.change(-10), 240);
        assert_eq!(brightness.change(10), 250);
        assert_eq!(brightness.change(10), 255);
        assert_eq!(brightness.change(0), 255);
    }

    #[test]
    fn test_set() {
        let brightness = Brightness::default();
        brightness.set(42);
        assert_eq!(brightness.get(), 42);
    }

    #[test]
    fn test_shared_static() {
        static BRIGHTNESS: Brightness = Brightness::new(128);
        BRIGHTNESS.change(-28);
        assert_eq!(BRIGHTNESS.get(), 100);
    }
}
