// Run with:  cargo bench --bench draw
//
// Measures the CPU cost of one scan pass. The bus and delay do nothing, so
// this is the shifting overhead on top of the configured hold times.

use core::convert::Infallible;

use cosmic_unicorn_bcm::gamma::{Gamma6, Gamma8};
use cosmic_unicorn_bcm::{Color, Panel, ScanBus, ScanConfig, COLS_PER_ROW, ROWS};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use embedded_graphics::pixelcolor::RgbColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle};
use embedded_hal::delay::DelayNs;
use std::hint::black_box;

struct NullBus;

impl ScanBus for NullBus {
    type Error = Infallible;

    fn set_row_address(&mut self, row: u8) -> Result<(), Self::Error> {
        black_box(row);
        Ok(())
    }

    fn set_data(&mut self, high: bool) -> Result<(), Self::Error> {
        black_box(high);
        Ok(())
    }

    fn set_clock(&mut self, high: bool) -> Result<(), Self::Error> {
        black_box(high);
        Ok(())
    }

    fn set_latch(&mut self, high: bool) -> Result<(), Self::Error> {
        black_box(high);
        Ok(())
    }

    fn set_blank(&mut self, blanked: bool) -> Result<(), Self::Error> {
        black_box(blanked);
        Ok(())
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, ns: u32) {
        black_box(ns);
    }
}

fn draw(c: &mut Criterion) {
    let mut group = c.benchmark_group("draw");

    group.throughput(Throughput::Elements((8 * ROWS * COLS_PER_ROW) as u64));
    group.bench_function("gamma8_8_planes", |b| {
        let mut panel = Panel::<_, _, _, 8>::new(NullBus, NoDelay, Gamma8, ScanConfig::new());
        Circle::new(Point::new(2, 2), 28)
            .into_styled(PrimitiveStyle::with_fill(Color::MAGENTA))
            .draw(&mut panel)
            .unwrap();
        b.iter(|| black_box(&mut panel).draw().unwrap());
    });

    group.throughput(Throughput::Elements((6 * ROWS * COLS_PER_ROW) as u64));
    group.bench_function("gamma6_6_planes", |b| {
        let mut panel = Panel::<_, _, _, 6>::new(NullBus, NoDelay, Gamma6, ScanConfig::new());
        Circle::new(Point::new(2, 2), 28)
            .into_styled(PrimitiveStyle::with_fill(Color::GREEN))
            .draw(&mut panel)
            .unwrap();
        b.iter(|| black_box(&mut panel).draw().unwrap());
    });

    group.finish();
}

criterion_group!(benches, draw);
criterion_main!(benches);
