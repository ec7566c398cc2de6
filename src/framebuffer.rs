//! Bit-plane framebuffer.
//!
//! The framebuffer holds `PLANES` bit-planes. Each plane is 16 physical rows
//! of 64 pixel slots, and each slot holds the blue, green and red bit of one
//! pixel in the order they are clocked into the column drivers. Read in row
//! order, slot order and channel order, a plane is exactly the serial bit
//! stream of a scan pass for that plane.
//!
//! # Memory Layout
//! One byte per pixel slot:
//! - Bit 0: Blue
//! - Bit 1: Green
//! - Bit 2: Red
//!
//! A plane is `ROWS × ENTRIES_PER_ROW` bytes (1 KiB); planes are stored one
//! after the other, plane 0 first. The whole buffer is exposed through
//! [`ReadBuffer`] so a DMA or PIO transport can stream it without copying.
//!
//! # Double buffering
//! [`BitPlaneFrameBuffer`] is written and read in place, so a scan pass that
//! overlaps a redraw can show a mix of the old and new image. [`DoubleBuffer`]
//! removes that: the encoder writes the back buffer and [`DoubleBuffer::publish`]
//! swaps it to the front between scan passes.
//!
//! # Example
//! ```rust
//! use cosmic_unicorn_bcm::{BitPlaneFrameBuffer, Channel, FrameBuffer, HwAddress, MutableFrameBuffer};
//!
//! let mut framebuffer = BitPlaneFrameBuffer::<6>::new();
//!
//! let address = HwAddress::from_logical(0, 0).unwrap();
//! framebuffer.write_slot(address, Channel::Red, 0b10_0001);
//!
//! let index = address.bit_index(Channel::Red);
//! assert!(framebuffer.bit(0, address.row() as usize, index));
//! assert!(!framebuffer.bit(1, address.row() as usize, index));
//! assert!(framebuffer.bit(5, address.row() as usize, index));
//!
//! framebuffer.clear();
//! assert!(!framebuffer.bit(5, address.row() as usize, index));
//! ```

use bitfield::bitfield;
use embedded_dma::ReadBuffer;

use crate::{Channel, FrameBuffer, HwAddress, MutableFrameBuffer, ENTRIES_PER_ROW, ROWS};

bitfield! {
    /// 8-bit word holding the channel bits of one pixel slot.
    ///
    /// The bit layout is as follows:
    /// - Bit 2: Red channel
    /// - Bit 1: Green channel
    /// - Bit 0: Blue channel
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    struct Entry(u8);
    impl Debug;
    pub red, set_red: 2;
    pub grn, set_grn: 1;
    pub blu, set_blu: 0;
}

impl Entry {
    pub const fn new() -> Self {
        Self(0)
    }

    fn channel(self, channel: Channel) -> bool {
        match channel {
            Channel::Blue => self.blu(),
            Channel::Green => self.grn(),
            Channel::Red => self.red(),
        }
    }

    fn set_channel(&mut self, channel: Channel, on: bool) {
        match channel {
            Channel::Blue => self.set_blu(on),
            Channel::Green => self.set_grn(on),
            Channel::Red => self.set_red(on),
        }
    }
}

/// One physical row of one plane: the full shift-register chain.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(C)]
struct Row {
    data: [Entry; ENTRIES_PER_ROW],
}

impl Row {
    pub const fn new() -> Self {
        Self {
            data: [Entry::new(); ENTRIES_PER_ROW],
        }
    }

    #[inline]
    fn bit(&self, index: usize) -> bool {
        self.data[index / 3].channel(Channel::from_slot(index))
    }
}

impl Default for Row {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(C)]
struct Plane {
    rows: [Row; ROWS],
}

impl Plane {
    pub const fn new() -> Self {
        Self {
            rows: [Row::new(); ROWS],
        }
    }

    fn set(&mut self, address: HwAddress, channel: Channel, on: bool) {
        self.rows[address.row() as usize].data[address.entry_index()].set_channel(channel, on);
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::new()
    }
}

/// Bit-plane framebuffer for the 32×32 panel.
///
/// # Type Parameters
/// - `PLANES`: Number of bit-planes (1-8). Plane `k` carries bit `k` of each
///   encoded channel value.
#[derive(Copy, Clone, PartialEq, Eq)]
#[repr(C)]
#[repr(align(4))]
pub struct BitPlaneFrameBuffer<const PLANES: usize> {
    planes: [Plane; PLANES],
}

impl<const PLANES: usize> BitPlaneFrameBuffer<PLANES> {
    const VALID_PLANES: () = assert!(PLANES >= 1 && PLANES <= 8, "PLANES must be in 1..=8");

    /// Create a framebuffer with every bit cleared.
    #[must_use]
    pub const fn new() -> Self {
        let () = Self::VALID_PLANES;
        Self {
            planes: [Plane::new(); PLANES],
        }
    }

    /// Zero every bit in every plane.
    pub fn clear(&mut self) {
        for plane in &mut self.planes {
            *plane = Plane::new();
        }
    }

    /// Returns the bit of `channel` at `address` in `plane`.
    #[must_use]
    pub fn bit_at(&self, plane: usize, address: HwAddress, channel: Channel) -> bool {
        self.planes[plane].rows[address.row() as usize].data[address.entry_index()].channel(channel)
    }

    /// Reassemble the encoded value of one channel from all planes.
    #[must_use]
    pub fn value_at(&self, address: HwAddress, channel: Channel) -> u8 {
        (0..PLANES).fold(0, |value, plane| {
            value | (u8::from(self.bit_at(plane, address, channel)) << plane)
        })
    }

    /// Size of the raw plane storage in bytes.
    #[must_use]
    pub const fn buffer_size_bytes() -> usize {
        core::mem::size_of::<[Plane; PLANES]>()
    }
}

impl<const PLANES: usize> Default for BitPlaneFrameBuffer<PLANES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const PLANES: usize> FrameBuffer for BitPlaneFrameBuffer<PLANES> {
    const PLANES: usize = PLANES;

    #[inline]
    fn bit(&self, plane: usize, row: usize, index: usize) -> bool {
        self.planes[plane].rows[row].bit(index)
    }
}

impl<const PLANES: usize> MutableFrameBuffer for BitPlaneFrameBuffer<PLANES> {
    fn clear(&mut self) {
        BitPlaneFrameBuffer::clear(self);
    }

    fn write_slot(&mut self, address: HwAddress, channel: Channel, value: u8) {
        for (k, plane) in self.planes.iter_mut().enumerate() {
            plane.set(address, channel, (value >> k) & 1 == 1);
        }
    }
}

unsafe impl<const PLANES: usize> ReadBuffer for BitPlaneFrameBuffer<PLANES> {
    type Word = u8;

    unsafe fn read_buffer(&self) -> (*const u8, usize) {
        let ptr = &self.planes as *const _ as *const u8;
        let len = core::mem::size_of_val(&self.planes);
        (ptr, len)
    }
}

impl<const PLANES: usize> core::fmt::Debug for BitPlaneFrameBuffer<PLANES> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BitPlaneFrameBuffer")
            .field("size", &core::mem::size_of_val(&self.planes))
            .field("plane_count", &self.planes.len())
            .field("plane_size", &core::mem::size_of::<Plane>())
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<const PLANES: usize> defmt::Format for BitPlaneFrameBuffer<PLANES> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "BitPlaneFrameBuffer<{}>", PLANES);
        defmt::write!(f, " size: {}", core::mem::size_of_val(&self.planes));
        defmt::write!(f, " plane_size: {}", core::mem::size_of::<Plane>());
    }
}

/// Two bit-plane framebuffers, one shown and one being drawn.
///
/// Writes through [`MutableFrameBuffer`] go to the back buffer; reads through
/// [`FrameBuffer`] and [`ReadBuffer`] come from the front buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct DoubleBuffer<const PLANES: usize> {
    buffers: [BitPlaneFrameBuffer<PLANES>; 2],
    front: usize,
}

impl<const PLANES: usize> DoubleBuffer<PLANES> {
    /// Create a double buffer with both buffers cleared.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffers: [BitPlaneFrameBuffer::new(), BitPlaneFrameBuffer::new()],
            front: 0,
        }
    }

    /// The buffer currently being shown.
    #[must_use]
    pub fn front(&self) -> &BitPlaneFrameBuffer<PLANES> {
        &self.buffers[self.front]
    }

    /// The buffer currently being drawn.
    #[must_use]
    pub fn back(&self) -> &BitPlaneFrameBuffer<PLANES> {
        &self.buffers[self.front ^ 1]
    }

    /// Mutable access to the buffer currently being drawn.
    pub fn back_mut(&mut self) -> &mut BitPlaneFrameBuffer<PLANES> {
        &mut self.buffers[self.front ^ 1]
    }

    /// Swap front and back. Call between scan passes.
    ///
    /// The new back buffer holds the frame before the one just published.
    pub fn publish(&mut self) {
        self.front ^= 1;
        trace!("published framebuffer {}", self.front);
    }

    /// Swap front and back, then copy the new front into the new back so that
    /// drawing can continue incrementally from what is shown.
    pub fn publish_and_copy(&mut self) {
        self.publish();
        self.buffers[self.front ^ 1] = self.buffers[self.front];
    }
}

impl<const PLANES: usize> Default for DoubleBuffer<PLANES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const PLANES: usize> FrameBuffer for DoubleBuffer<PLANES> {
    const PLANES: usize = PLANES;

    #[inline]
    fn bit(&self, plane: usize, row: usize, index: usize) -> bool {
        self.front().bit(plane, row, index)
    }
}

impl<const PLANES: usize> MutableFrameBuffer for DoubleBuffer<PLANES> {
    fn clear(&mut self) {
        self.back_mut().clear();
    }

    fn write_slot(&mut self, address: HwAddress, channel: Channel, value: u8) {
        self.back_mut().write_slot(address, channel, value);
    }
}

unsafe impl<const PLANES: usize> ReadBuffer for DoubleBuffer<PLANES> {
    type Word = u8;

    unsafe fn read_buffer(&self) -> (*const u8, usize) {
        self.front().read_buffer()
    }
}

impl<const PLANES: usize> core::fmt::Debug for DoubleBuffer<PLANES> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DoubleBuffer")
            .field("front", &self.front)
            .field("buffer", self.front())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::format;

    use super::*;
    use crate::{Half, COLS_PER_ROW};

    type TestFrameBuffer = BitPlaneFrameBuffer<6>;

    fn assert_all_clear<F: FrameBuffer>(fb: &F) {
        for plane in 0..F::PLANES {
            for row in 0..ROWS {
                for index in 0..COLS_PER_ROW {
                    assert!(!fb.bit(plane, row, index), "bit set at {plane}/{row}/{index}");
                }
            }
        }
    }

    #[test]
    fn test_entry_construction() {
        let entry = Entry::new();
        assert_eq!(entry.0, 0);
        assert!(!entry.red());
        assert!(!entry.grn());
        assert!(!entry.blu());
    }

    #[test]
    fn test_entry_channel_bits() {
        let mut entry = Entry::new();

        entry.set_channel(Channel::Blue, true);
        assert_eq!(entry.0, 0b001);
        entry.set_channel(Channel::Green, true);
        assert_eq!(entry.0, 0b011);
        entry.set_channel(Channel::Red, true);
        assert_eq!(entry.0, 0b111);

        entry.set_channel(Channel::Green, false);
        assert_eq!(entry.0, 0b101);
        assert!(entry.channel(Channel::Blue));
        assert!(!entry.channel(Channel::Green));
        assert!(entry.channel(Channel::Red));
    }

    #[test]
    fn test_row_serial_order() {
        let mut row = Row::new();
        row.data[1].set_channel(Channel::Red, true);
        row.data[63].set_channel(Channel::Blue, true);

        let set: std::vec::Vec<usize> = (0..COLS_PER_ROW).filter(|&i| row.bit(i)).collect();
        assert_eq!(set, [5, 189]);
    }

    #[test]
    fn test_new_is_clear() {
        let fb = TestFrameBuffer::new();
        assert_all_clear(&fb);
        assert_eq!(fb, TestFrameBuffer::default());
    }

    #[test]
    fn test_clear_after_writes() {
        let mut fb = TestFrameBuffer::new();
        for y in 0..32 {
            for x in 0..32 {
                let address = HwAddress::from_logical(x, y).unwrap();
                for channel in Channel::ALL {
                    fb.write_slot(address, channel, 0b11_1111);
                }
            }
        }
        assert!(fb.bit(0, 0, 0));

        MutableFrameBuffer::clear(&mut fb);
        assert_all_clear(&fb);
    }

    #[test]
    fn test_write_slot_spreads_bits_over_planes() {
        let mut fb = TestFrameBuffer::new();
        let address = HwAddress::new(3, Half::Upper, 7).unwrap();

        fb.write_slot(address, Channel::Green, 0b10_1101);

        let index = address.bit_index(Channel::Green);
        let expected = [true, false, true, true, false, true];
        for (plane, on) in expected.iter().enumerate() {
            assert_eq!(fb.bit(plane, 3, index), *on);
            assert_eq!(fb.bit_at(plane, address, Channel::Green), *on);
        }
        assert_eq!(fb.value_at(address, Channel::Green), 0b10_1101);
        assert_eq!(fb.value_at(address, Channel::Red), 0);
    }

    #[test]
    fn test_write_slot_overwrites() {
        let mut fb = TestFrameBuffer::new();
        let address = HwAddress::from_logical(10, 20).unwrap();

        fb.write_slot(address, Channel::Blue, 0b11_1111);
        fb.write_slot(address, Channel::Blue, 0b00_0010);
        assert_eq!(fb.value_at(address, Channel::Blue), 0b00_0010);
    }

    #[test]
    fn test_write_slot_touches_only_its_slot() {
        let mut fb = TestFrameBuffer::new();
        let address = HwAddress::from_logical(5, 5).unwrap();
        fb.write_slot(address, Channel::Red, 0b11_1111);

        let index = address.bit_index(Channel::Red);
        for plane in 0..6 {
            for row in 0..ROWS {
                for i in 0..COLS_PER_ROW {
                    let expected = row == address.row() as usize && i == index;
                    assert_eq!(fb.bit(plane, row, i), expected);
                }
            }
        }
    }

    #[test]
    fn test_halves_do_not_alias() {
        assert_eq!(HwAddress::new(0, Half::Lower, 40), None);
        assert_eq!(HwAddress::new(16, Half::Lower, 0), None);

        let mut fb = TestFrameBuffer::new();
        for column in 0..32 {
            let lower = HwAddress::new(0, Half::Lower, column).unwrap();
            fb.write_slot(lower, Channel::Red, 1);
        }
        for column in 0..32 {
            let upper = HwAddress::new(0, Half::Upper, column).unwrap();
            assert!(!fb.bit_at(0, upper, Channel::Red));
            let lower = HwAddress::new(0, Half::Lower, column).unwrap();
            assert!(fb.bit_at(0, lower, Channel::Red));
        }
    }

    #[test]
    fn test_read_buffer_layout() {
        let mut fb = TestFrameBuffer::new();
        let address = HwAddress::new(2, Half::Lower, 4).unwrap();
        fb.write_slot(address, Channel::Red, 0b00_0010);

        let (ptr, len) = unsafe { fb.read_buffer() };
        assert_eq!(len, TestFrameBuffer::buffer_size_bytes());
        assert_eq!(len, 6 * ROWS * ENTRIES_PER_ROW);

        let bytes = unsafe { core::slice::from_raw_parts(ptr, len) };
        let offset = ROWS * ENTRIES_PER_ROW + 2 * ENTRIES_PER_ROW + 4;
        assert_eq!(bytes[offset], 0b100);
        assert_eq!(bytes.iter().filter(|b| **b != 0).count(), 1);
    }

    #[test]
    fn test_memory_alignment() {
        let fb = TestFrameBuffer::new();
        let ptr = &fb as *const _ as usize;
        assert_eq!(ptr % 4, 0);
    }

    #[test]
    fn test_debug_formatting() {
        let fb = TestFrameBuffer::new();
        let debug_string = format!("{:?}", fb);
        assert!(debug_string.contains("BitPlaneFrameBuffer"));
        assert!(debug_string.contains("plane_count: 6"));
        assert!(debug_string.contains("plane_size: 1024"));
    }

    #[test]
    fn test_double_buffer_writes_back_reads_front() {
        let mut db = DoubleBuffer::<2>::new();
        let address = HwAddress::from_logical(0, 0).unwrap();
        let index = address.bit_index(Channel::Red);

        db.write_slot(address, Channel::Red, 0b11);
        assert!(!db.bit(0, 15, index));
        assert_eq!(db.back().value_at(address, Channel::Red), 0b11);

        db.publish();
        assert!(db.bit(0, 15, index));
        assert!(db.bit(1, 15, index));
        assert_all_clear(db.back());
    }

    #[test]
    fn test_double_buffer_publish_and_copy() {
        let mut db = DoubleBuffer::<2>::new();
        let address = HwAddress::from_logical(3, 30).unwrap();

        db.write_slot(address, Channel::Green, 0b01);
        db.publish_and_copy();
        assert_eq!(db.front().value_at(address, Channel::Green), 0b01);
        assert_eq!(db.back().value_at(address, Channel::Green), 0b01);

        MutableFrameBuffer::clear(&mut db);
        assert_all_clear(db.back());
        assert_eq!(db.front().value_at(address, Channel::Green), 0b01);
    }

    #[test]
    fn test_double_buffer_read_buffer_follows_front() {
        let mut db = DoubleBuffer::<1>::new();
        let (front_before, _) = unsafe { db.read_buffer() };
        db.publish();
        let (front_after, len) = unsafe { db.read_buffer() };
        assert_ne!(front_before, front_after);
        assert_eq!(len, BitPlaneFrameBuffer::<1>::buffer_size_bytes());
    }
}
