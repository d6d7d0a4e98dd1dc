//! Strip-only demo: cycles the palette with grow and shrink sweeps.
#![allow(missing_docs)]
#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod firmware {
    use core::time::Duration;

    use embassy_executor::Spawner;
    use embassy_rp::pio::Pio;
    use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};
    use embassy_time::Timer;
    use {defmt_rtt as _, panic_probe as _};

    use pixelsaber::blade::{Sweep, power_sweep};
    use pixelsaber::clock::BootClock;
    use pixelsaber::color::{PALETTE, next_index};
    use pixelsaber::pio_irqs::Pio0Irqs;
    use pixelsaber::strip_ws2812::Ws2812Blade;

    const NUM_PIXELS: usize = 162;

    const GROW: Duration = Duration::from_millis(1_720);
    const SHRINK: Duration = Duration::from_millis(640);
    const COMPENSATION: Duration = Duration::from_micros(30);

    #[embassy_executor::main]
    async fn main(_spawner: Spawner) -> ! {
        let p = embassy_rp::init(Default::default());

        let mut pio0 = Pio::new(p.PIO0, Pio0Irqs);
        let strip_program = PioWs2812Program::new(&mut pio0.common);
        let driver = PioWs2812::new(&mut pio0.common, pio0.sm0, p.DMA_CH0, p.PIN_5, &strip_program);
        let mut strip = Ws2812Blade::<NUM_PIXELS>::new(driver);

        let clock = BootClock;
        let mut index = 0;
        loop {
            let color = PALETTE[index];
            power_sweep(&mut strip, &clock, Sweep::Grow, GROW, color, COMPENSATION).await;
            Timer::after_millis(750).await;
            power_sweep(&mut strip, &clock, Sweep::Shrink, SHRINK, color, COMPENSATION).await;
            Timer::after_millis(400).await;
            index = next_index(index);
        }
    }
}

#[cfg(not(target_os = "none"))]
fn main() {}
