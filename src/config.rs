//! Scan timing and bit-plane weighting.
//!
//! All timing of a scan pass derives from [`ScanConfig`]. Plane `k` is held for
//! `weighting.ticks(k) × unit_time_ns` at full brightness; lower brightness
//! shortens every hold by the same fraction, so the ratios between planes (and
//! therefore colours) are preserved while dimming.

use crate::ROWS;

/// Hold-time weight of each bit-plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Weighting {
    /// Plane `k` holds `2^k` ticks. Accumulated on-time is linear in the
    /// encoded value.
    #[default]
    Binary,
    /// Plane `k` holds `2^(k + shift) + extra` ticks.
    ///
    /// A calibration variant: the additive term lengthens the short low-plane
    /// holds at the cost of linearity. `Offset { shift: 3, extra: 1 }` is the
    /// weighting some eight-plane firmware for this panel uses. Only use it
    /// with a measured reason.
    Offset {
        /// Extra doubling applied to every plane
        shift: u8,
        /// Ticks added to every plane
        extra: u32,
    },
}

impl Weighting {
    /// Number of unit ticks plane `plane` is held for, saturating at
    /// `u32::MAX`.
    #[must_use]
    pub const fn ticks(self, plane: usize) -> u32 {
        match self {
            Weighting::Binary => pow2(plane),
            Weighting::Offset { shift, extra } => {
                pow2(plane.saturating_add(shift as usize)).saturating_add(extra)
            }
        }
    }

    /// Whether the weighting is linear in the encoded value.
    #[must_use]
    pub const fn is_binary(self) -> bool {
        matches!(self, Weighting::Binary)
    }
}

const fn pow2(exp: usize) -> u32 {
    if exp >= u32::BITS as usize {
        u32::MAX
    } else {
        1 << exp
    }
}

/// Timing configuration for the scan-out driver. Builder methods override the
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanConfig {
    unit_time_ns: u32,
    clock_pulse_ns: u32,
    latch_settle_ns: u32,
    weighting: Weighting,
}

impl ScanConfig {
    /// Default hold time of one weight unit at full brightness.
    pub const DEFAULT_UNIT_TIME_NS: u32 = 1_000;

    /// Create the default configuration: 1 µs unit time, binary weighting and
    /// no extra clock or latch delay.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            unit_time_ns: Self::DEFAULT_UNIT_TIME_NS,
            clock_pulse_ns: 0,
            latch_settle_ns: 0,
            weighting: Weighting::Binary,
        }
    }

    /// Hold time of one weight unit at full brightness. This is the knob that
    /// trades refresh rate (flicker) against light output.
    #[must_use]
    pub const fn unit_time_ns(self, unit_time_ns: u32) -> Self {
        Self {
            unit_time_ns,
            ..self
        }
    }

    /// Time the clock line is held high for every shifted bit. Zero toggles
    /// as fast as the bus allows.
    #[must_use]
    pub const fn clock_pulse_ns(self, clock_pulse_ns: u32) -> Self {
        Self {
            clock_pulse_ns,
            ..self
        }
    }

    /// Time the latch line is held high.
    #[must_use]
    pub const fn latch_settle_ns(self, latch_settle_ns: u32) -> Self {
        Self {
            latch_settle_ns,
            ..self
        }
    }

    /// Plane weighting.
    #[must_use]
    pub const fn weighting(self, weighting: Weighting) -> Self {
        Self { weighting, ..self }
    }

    /// Configured unit time.
    #[must_use]
    pub const fn get_unit_time_ns(&self) -> u32 {
        self.unit_time_ns
    }

    /// Configured clock pulse width.
    #[must_use]
    pub const fn get_clock_pulse_ns(&self) -> u32 {
        self.clock_pulse_ns
    }

    /// Configured latch pulse width.
    #[must_use]
    pub const fn get_latch_settle_ns(&self) -> u32 {
        self.latch_settle_ns
    }

    /// Configured plane weighting.
    #[must_use]
    pub const fn get_weighting(&self) -> Weighting {
        self.weighting
    }

    /// Hold time of `plane` at `brightness`.
    ///
    /// `ticks × unit_time × (brightness + 1) / 256`, saturating at `u32::MAX`.
    #[must_use]
    pub const fn hold_ns(&self, plane: usize, brightness: u8) -> u32 {
        let ns = self.weighting.ticks(plane) as u128 * self.unit_time_ns as u128;
        let ns = (ns * (brightness as u128 + 1)) >> 8;
        if ns > u32::MAX as u128 {
            u32::MAX
        } else {
            ns as u32
        }
    }

    /// Total hold time of one scan pass over `planes` planes and every row.
    ///
    /// Excludes shifting, so it is a lower bound on the pass duration.
    #[must_use]
    pub fn pass_hold_ns(&self, planes: usize, brightness: u8) -> u64 {
        let per_row: u64 = (0..planes)
            .map(|plane| u64::from(self.hold_ns(plane, brightness)))
            .sum();
        per_row * ROWS as u64
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new()
    }
}
