//! WS2812 blade strip behind the [`Strip`] trait.
//!
//! Double buffering lives here: `set_range` and `fill` touch only the local
//! frame, and `commit` streams it out over PIO DMA.

use core::ops::Range;

use embassy_rp::peripherals::PIO0;
use embassy_rp::pio_programs::ws2812::PioWs2812;

use crate::blade::Strip;
use crate::color::{BLACK, Rgb};

pub struct Ws2812Blade<'d, const N: usize> {
    driver: PioWs2812<'d, PIO0, 0, N>,
    frame: [Rgb; N],
}

impl<'d, const N: usize> Ws2812Blade<'d, N> {
    #[must_use]
    pub fn new(driver: PioWs2812<'d, PIO0, 0, N>) -> Self {
        Self {
            driver,
            frame: [BLACK; N],
        }
    }
}

impl<const N: usize> Strip for Ws2812Blade<'_, N> {
    fn len(&self) -> usize {
        N
    }

    fn set_range(&mut self, range: Range<usize>, color: Rgb) {
        for pixel in &mut self.frame[range] {
            *pixel = color;
        }
    }

    fn fill(&mut self, color: Rgb) {
        self.frame = [color; N];
    }

    async fn commit(&mut self) {
        self.driver.write(&self.frame).await;
    }
}
