//! Scan-out driver.
//!
//! [`ScanOut::draw`] renders a framebuffer onto the panel once. For every plane
//! (plane-major) and every physical row (row-minor) it:
//! 1. selects the row address
//! 2. shifts the row's 192 bits into the column drivers
//! 3. pulses LATCH
//! 4. re-asserts BLANK, then releases it
//! 5. holds for the plane-weighted time ([`ScanConfig::hold_ns`])
//! 6. asserts BLANK again
//!
//! BLANK is high whenever the row address changes or LATCH is pulsed, so the
//! panel never shows new row data on an old address or the other way round.
//!
//! The pass is best effort: a late hold only shows up as flicker, and a pin
//! error aborts the pass without retrying. Run `draw` from a context that is
//! not preempted during the shift loop.
//!
//! # Example
//! ```rust,ignore
//! use cosmic_unicorn_bcm::{BitPlaneFrameBuffer, Pins, ScanConfig, ScanOut};
//!
//! let pins = Pins::new(clock, data, latch, blank, row0, row1, row2, row3);
//! let mut scan = ScanOut::new(pins, delay, ScanConfig::new().unit_time_ns(800));
//! scan.init()?;
//!
//! let framebuffer = BitPlaneFrameBuffer::<8>::new();
//! loop {
//!     scan.draw(&framebuffer, 255)?;
//! }
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use crate::{FrameBuffer, ScanConfig, COLS_PER_ROW, ROWS};

/// Configuration word clocked into every column driver chip at start-up
/// (full output current).
pub const DRIVER_CONFIG: u16 = 0b1111_1111_1100_1110;

/// Number of 16-bit column driver chips in the chain.
pub const DRIVER_CHIPS: usize = COLS_PER_ROW / 16;

/// Bit of the last chip's configuration word after which LATCH is raised.
const DRIVER_CONFIG_LATCH_BIT: usize = 4;

/// Half period of the start-up configuration clock.
const INIT_CLOCK_US: u32 = 10;

/// Settle time after start-up before the first scan.
const INIT_SETTLE_MS: u32 = 100;

/// The signals the scan-out driver toggles.
///
/// Implemented by [`Pins`] for plain GPIO. Other transports (a bit-banging
/// peripheral, a recorder in tests) implement it to reuse the scan algorithm.
pub trait ScanBus {
    /// Error raised by the underlying outputs
    type Error;

    /// Drive the four row-address lines with the low four bits of `row`.
    fn set_row_address(&mut self, row: u8) -> Result<(), Self::Error>;

    /// Drive the serial data line.
    fn set_data(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Drive the shift clock.
    fn set_clock(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Drive the latch line.
    fn set_latch(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Blank (`true`) or enable (`false`) the LED outputs.
    fn set_blank(&mut self, blanked: bool) -> Result<(), Self::Error>;
}

/// The eight GPIO outputs that drive the panel.
///
/// All pins must share one error type; HALs whose pins cannot fail use
/// [`core::convert::Infallible`].
pub struct Pins<CLK, DAT, LAT, BLK, R0, R1, R2, R3> {
    /// Shift clock
    pub clock: CLK,
    /// Serial data
    pub data: DAT,
    /// Latch
    pub latch: LAT,
    /// Output blank, active high
    pub blank: BLK,
    /// Row address bit 0
    pub row0: R0,
    /// Row address bit 1
    pub row1: R1,
    /// Row address bit 2
    pub row2: R2,
    /// Row address bit 3
    pub row3: R3,
}

impl<CLK, DAT, LAT, BLK, R0, R1, R2, R3> Pins<CLK, DAT, LAT, BLK, R0, R1, R2, R3> {
    /// Bundle the panel's outputs.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        clock: CLK,
        data: DAT,
        latch: LAT,
        blank: BLK,
        row0: R0,
        row1: R1,
        row2: R2,
        row3: R3,
    ) -> Self {
        Self {
            clock,
            data,
            latch,
            blank,
            row0,
            row1,
            row2,
            row3,
        }
    }
}

impl<E, CLK, DAT, LAT, BLK, R0, R1, R2, R3> ScanBus for Pins<CLK, DAT, LAT, BLK, R0, R1, R2, R3>
where
    CLK: OutputPin<Error = E>,
    DAT: OutputPin<Error = E>,
    LAT: OutputPin<Error = E>,
    BLK: OutputPin<Error = E>,
    R0: OutputPin<Error = E>,
    R1: OutputPin<Error = E>,
    R2: OutputPin<Error = E>,
    R3: OutputPin<Error = E>,
{
    type Error = E;

    fn set_row_address(&mut self, row: u8) -> Result<(), E> {
        self.row0.set_state(PinState::from(row & 0b0001 != 0))?;
        self.row1.set_state(PinState::from(row & 0b0010 != 0))?;
        self.row2.set_state(PinState::from(row & 0b0100 != 0))?;
        self.row3.set_state(PinState::from(row & 0b1000 != 0))
    }

    #[inline]
    fn set_data(&mut self, high: bool) -> Result<(), E> {
        self.data.set_state(PinState::from(high))
    }

    #[inline]
    fn set_clock(&mut self, high: bool) -> Result<(), E> {
        self.clock.set_state(PinState::from(high))
    }

    fn set_latch(&mut self, high: bool) -> Result<(), E> {
        self.latch.set_state(PinState::from(high))
    }

    fn set_blank(&mut self, blanked: bool) -> Result<(), E> {
        self.blank.set_state(PinState::from(blanked))
    }
}

/// Scan-out driver. Owns the bus and the delay provider for its lifetime.
pub struct ScanOut<B, D> {
    bus: B,
    delay: D,
    config: ScanConfig,
}

impl<B, D> ScanOut<B, D>
where
    B: ScanBus,
    D: DelayNs,
{
    /// Create a driver. Call [`ScanOut::init`] once before the first draw.
    pub fn new(bus: B, delay: D, config: ScanConfig) -> Self {
        if !config.get_weighting().is_binary() {
            warn!("non-binary plane weighting in use; brightness is not linear in value");
        }
        debug!("scan unit {} ns", config.get_unit_time_ns());
        Self { bus, delay, config }
    }

    /// Current timing configuration.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Replace the timing configuration. Takes effect on the next draw.
    pub fn set_config(&mut self, config: ScanConfig) {
        self.config = config;
    }

    /// Give back the bus and delay provider.
    pub fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }

    /// Put the panel into a known dark state and configure the column driver
    /// chips.
    ///
    /// Selects row 15 with the outputs blanked, clocks [`DRIVER_CONFIG`] into
    /// each of the [`DRIVER_CHIPS`] chips (latching it with the last one),
    /// pulses BLANK once to clear residual glow and waits for the drivers to
    /// settle.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the bus.
    pub fn init(&mut self) -> Result<(), B::Error> {
        self.bus.set_clock(false)?;
        self.bus.set_data(false)?;
        self.bus.set_latch(false)?;
        self.bus.set_blank(true)?;
        self.bus.set_row_address(0b1111)?;

        for chip in 0..DRIVER_CHIPS {
            let last = chip == DRIVER_CHIPS - 1;
            for bit in 0..16 {
                let high = DRIVER_CONFIG & (1 << (15 - bit)) != 0;
                self.bus.set_data(high)?;
                self.delay.delay_us(INIT_CLOCK_US);
                self.bus.set_clock(true)?;
                self.delay.delay_us(INIT_CLOCK_US);
                self.bus.set_clock(false)?;

                if last && bit == DRIVER_CONFIG_LATCH_BIT {
                    self.bus.set_latch(true)?;
                }
            }
        }
        self.bus.set_latch(false)?;

        self.bus.set_blank(false)?;
        self.delay.delay_us(INIT_CLOCK_US);
        self.bus.set_blank(true)?;

        self.delay.delay_ms(INIT_SETTLE_MS);
        info!("column drivers configured ({} chips)", DRIVER_CHIPS);
        Ok(())
    }

    /// Render `framebuffer` once at `brightness`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the bus. The pass stops there and
    /// the outputs may be left un-blanked.
    pub fn draw<F: FrameBuffer>(&mut self, framebuffer: &F, brightness: u8) -> Result<(), B::Error> {
        self.bus.set_blank(true)?;
        for plane in 0..F::PLANES {
            let hold_ns = self.config.hold_ns(plane, brightness);
            for row in 0..ROWS {
                self.bus.set_row_address(row as u8)?;
                self.shift_row(framebuffer, plane, row)?;
                self.latch()?;
                self.show(hold_ns)?;
            }
        }
        Ok(())
    }

    #[inline]
    fn shift_row<F: FrameBuffer>(&mut self, framebuffer: &F, plane: usize, row: usize) -> Result<(), B::Error> {
        for index in 0..COLS_PER_ROW {
            self.bus.set_data(framebuffer.bit(plane, row, index))?;
            self.bus.set_clock(true)?;
            if self.config.get_clock_pulse_ns() > 0 {
                self.delay.delay_ns(self.config.get_clock_pulse_ns());
            }
            self.bus.set_clock(false)?;
        }
        self.bus.set_data(false)
    }

    fn latch(&mut self) -> Result<(), B::Error> {
        self.bus.set_latch(true)?;
        if self.config.get_latch_settle_ns() > 0 {
            self.delay.delay_ns(self.config.get_latch_settle_ns());
        }
        self.bus.set_latch(false)
    }

    fn show(&mut self, hold_ns: u32) -> Result<(), B::Error> {
        self.bus.set_blank(true)?;
        self.bus.set_blank(false)?;
        if hold_ns > 0 {
            self.delay.delay_ns(hold_ns);
        }
        self.bus.set_blank(true)
    }
}

#[cfg(feature = "defmt")]
impl<B, D> defmt::Format for ScanOut<B, D> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ScanOut config: {}", self.config);
    }
}
