//! PIO interrupt bindings, one per PIO block in use.

use embassy_rp::peripherals::{PIO0, PIO1};
use embassy_rp::pio::InterruptHandler;

embassy_rp::bind_interrupts! {
    /// PIO0 drives the LED strip.
    pub struct Pio0Irqs {
        PIO0_IRQ_0 => InterruptHandler<PIO0>;
    }
}

embassy_rp::bind_interrupts! {
    /// PIO1 drives the I2S audio output.
    pub struct Pio1Irqs {
        PIO1_IRQ_0 => InterruptHandler<PIO1>;
    }
}
