//! Mapping from logical pixel coordinates to the panel's shift-register
//! address space.
//!
//! The panel wiring mirrors both axes. After undoing that, logical rows 0..16
//! of the mirrored image land in the upper half (the second block of 32
//! pixel slots in the chain) and rows 16..32 in the lower half (the first
//! block), both addressed through the same 16 physical rows.

use crate::{ENTRIES_PER_ROW, HEIGHT, ROWS, WIDTH};

/// Which half of the panel a physical row slot drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Half {
    /// Lower half, the first block of the chain
    Lower,
    /// Upper half, the second block of the chain
    Upper,
}

impl Half {
    /// Index of the first pixel slot of this half within a row.
    #[must_use]
    pub const fn block_offset(self) -> usize {
        match self {
            Half::Lower => 0,
            Half::Upper => WIDTH,
        }
    }
}

/// A colour channel, named by its position in a pixel slot.
///
/// Channels are clocked out blue first, red last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Blue, first bit of a slot
    Blue = 0,
    /// Green, second bit of a slot
    Green = 1,
    /// Red, third bit of a slot
    Red = 2,
}

impl Channel {
    /// All channels in clock-out order.
    pub const ALL: [Channel; 3] = [Channel::Blue, Channel::Green, Channel::Red];

    /// Position of this channel within its pixel slot.
    #[must_use]
    pub const fn slot(self) -> usize {
        self as usize
    }

    /// Channel at a position within a pixel slot (`index % 3`).
    #[must_use]
    pub const fn from_slot(index: usize) -> Self {
        match index % 3 {
            0 => Channel::Blue,
            1 => Channel::Green,
            _ => Channel::Red,
        }
    }
}

/// A pixel slot in hardware space.
///
/// Always in range: built only by [`HwAddress::new`] or
/// [`HwAddress::from_logical`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HwAddress {
    row: u8,
    half: Half,
    column: u8,
}

impl HwAddress {
    /// A pixel slot from its hardware coordinates.
    ///
    /// Returns `None` unless `row < ROWS` and `column < WIDTH`.
    #[must_use]
    pub const fn new(row: u8, half: Half, column: u8) -> Option<Self> {
        if (row as usize) < ROWS && (column as usize) < WIDTH {
            Some(Self { row, half, column })
        } else {
            None
        }
    }

    /// Physical row, `0..ROWS`.
    #[must_use]
    pub const fn row(&self) -> u8 {
        self.row
    }

    /// Panel half driven by the slot.
    #[must_use]
    pub const fn half(&self) -> Half {
        self.half
    }

    /// Column within the half, `0..WIDTH`.
    #[must_use]
    pub const fn column(&self) -> u8 {
        self.column
    }

    /// Map logical coordinates to a pixel slot.
    ///
    /// Returns `None` when the point is outside the panel.
    #[must_use]
    pub fn from_logical(x: i32, y: i32) -> Option<Self> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= WIDTH || y >= HEIGHT {
            return None;
        }

        let x = WIDTH - 1 - x;
        let y = HEIGHT - 1 - y;
        let (half, row) = if y < ROWS {
            (Half::Upper, y)
        } else {
            (Half::Lower, y - ROWS)
        };

        Some(Self {
            row: row as u8,
            half,
            column: x as u8,
        })
    }

    /// Index of the pixel slot within its row, `0..ENTRIES_PER_ROW`.
    #[must_use]
    pub const fn entry_index(&self) -> usize {
        self.half.block_offset() + self.column as usize
    }

    /// Position of a channel bit in the row's serial bit sequence.
    #[must_use]
    pub const fn bit_index(&self, channel: Channel) -> usize {
        self.entry_index() * 3 + channel.slot()
    }
}

const _: () = assert!(2 * WIDTH == ENTRIES_PER_ROW);
