//! The full prop: button, accelerometer, audio, and blade wired together.
//!
//! Sounds are generated tones so the demo runs without audio assets; swap
//! the statics for real PCM data to get the film-grade experience.
#![allow(missing_docs)]
#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod firmware {
    use core::convert::Infallible;
    use core::panic;

    use embassy_executor::Spawner;
    use embassy_rp::flash::Flash;
    use embassy_rp::gpio::{Input, Level, Output, Pull};
    use embassy_rp::i2c::{self, I2c};
    use embassy_rp::pio::Pio;
    use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};
    use embassy_time::Timer;
    use {defmt_rtt as _, panic_probe as _};

    use pixelsaber::audio::{Clip, ClipSet, SAMPLE_RATE_HZ, samples_for_duration_ms, tone};
    use pixelsaber::clock::BootClock;
    use pixelsaber::controller::{Controls, Saber, SaberConfig, SoundBank};
    use pixelsaber::i2s_mixer;
    use pixelsaber::lis3dh::Lis3dh;
    use pixelsaber::pio_irqs::Pio0Irqs;
    use pixelsaber::rng::RoscRandom;
    use pixelsaber::settings::FlashSettings;
    use pixelsaber::strip_ws2812::Ws2812Blade;
    use pixelsaber::{Error, Result};

    /// 162 pixels: an 81-pixel blade, strip folded at the tip.
    const NUM_PIXELS: usize = 162;

    const TICK_MS: u64 = 4;

    const AMPLITUDE: i16 = 8_000;
    const POWER_ON_MS: u32 = 1_720;
    const POWER_OFF_MS: u32 = 640;

    static POWER_ON_TONE: [i16; samples_for_duration_ms(POWER_ON_MS, SAMPLE_RATE_HZ)] =
        tone(220, AMPLITUDE, SAMPLE_RATE_HZ);
    static POWER_OFF_TONE: [i16; samples_for_duration_ms(POWER_OFF_MS, SAMPLE_RATE_HZ)] =
        tone(165, AMPLITUDE, SAMPLE_RATE_HZ);
    static IDLE_TONE: [i16; samples_for_duration_ms(1_000, SAMPLE_RATE_HZ)] =
        tone(110, AMPLITUDE, SAMPLE_RATE_HZ);
    static SWING_TONE_A: [i16; samples_for_duration_ms(450, SAMPLE_RATE_HZ)] =
        tone(330, AMPLITUDE, SAMPLE_RATE_HZ);
    static SWING_TONE_B: [i16; samples_for_duration_ms(450, SAMPLE_RATE_HZ)] =
        tone(392, AMPLITUDE, SAMPLE_RATE_HZ);
    static HIT_TONE_A: [i16; samples_for_duration_ms(600, SAMPLE_RATE_HZ)] =
        tone(587, AMPLITUDE, SAMPLE_RATE_HZ);
    static HIT_TONE_B: [i16; samples_for_duration_ms(600, SAMPLE_RATE_HZ)] =
        tone(659, AMPLITUDE, SAMPLE_RATE_HZ);

    static POWER_ON_CLIPS: [Clip; 1] = [&POWER_ON_TONE];
    static POWER_OFF_CLIPS: [Clip; 1] = [&POWER_OFF_TONE];
    static IDLE_CLIPS: [Clip; 1] = [&IDLE_TONE];
    static SWING_CLIPS: [Clip; 2] = [&SWING_TONE_A, &SWING_TONE_B];
    static HIT_CLIPS: [Clip; 2] = [&HIT_TONE_A, &HIT_TONE_B];

    struct SaberControls<'d> {
        button: Input<'d>,
        power_rail: Output<'d>,
        status_led: Output<'d>,
    }

    impl Controls for SaberControls<'_> {
        fn button_pressed(&mut self) -> bool {
            // Pull-up wiring; pressed pulls the pin low.
            self.button.is_low()
        }

        fn set_power_rail(&mut self, on: bool) {
            self.power_rail.set_level(Level::from(on));
        }

        fn set_status_led(&mut self, on: bool) {
            self.status_led.set_level(Level::from(on));
        }
    }

    #[embassy_executor::main]
    async fn main(spawner: Spawner) -> ! {
        let err = inner_main(spawner).await.unwrap_err();
        panic!("{err}");
    }

    async fn inner_main(spawner: Spawner) -> Result<Infallible> {
        let p = embassy_rp::init(Default::default());

        let controls = SaberControls {
            button: Input::new(p.PIN_13, Pull::Up),
            power_rail: Output::new(p.PIN_11, Level::Low),
            status_led: Output::new(p.PIN_12, Level::Low),
        };

        let mut pio0 = Pio::new(p.PIO0, Pio0Irqs);
        let strip_program = PioWs2812Program::new(&mut pio0.common);
        let driver = PioWs2812::new(&mut pio0.common, pio0.sm0, p.DMA_CH0, p.PIN_5, &strip_program);
        let strip = Ws2812Blade::<NUM_PIXELS>::new(driver);

        let mixer = i2s_mixer::start(spawner, p.PIO1, p.DMA_CH1, p.PIN_8, p.PIN_9, p.PIN_10)?;

        let i2c = I2c::new_blocking(p.I2C0, p.PIN_3, p.PIN_2, i2c::Config::default());
        let mut accel = Lis3dh::new(i2c);
        accel.init().map_err(|_| Error::AccelInit)?;

        let settings = FlashSettings::new(Flash::new_blocking(p.FLASH));

        let bank = SoundBank {
            power_on: ClipSet::new(&POWER_ON_CLIPS)?,
            power_off: ClipSet::new(&POWER_OFF_CLIPS)?,
            idle: ClipSet::new(&IDLE_CLIPS)?,
            swing: ClipSet::new(&SWING_CLIPS)?,
            hit: ClipSet::new(&HIT_CLIPS)?,
        };

        let mut saber = Saber::new(
            BootClock,
            strip,
            mixer,
            accel,
            controls,
            settings,
            RoscRandom::new(),
            SaberConfig::default(),
            bank,
        );

        loop {
            saber.tick().await;
            Timer::after_millis(TICK_MS).await;
        }
    }
}

#[cfg(not(target_os = "none"))]
fn main() {}
