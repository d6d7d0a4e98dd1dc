//! The top-level mode state machine.
//!
//! One [`Saber`] instance owns every collaborator and all mutable state
//! (mode, colors, volume, trigger timestamp); the only mutation paths are the
//! transition methods here. The control loop calls [`Saber::tick`] once per
//! iteration at a fixed cadence.

use core::time::Duration;

use embassy_futures::yield_now;

use crate::audio::{AudioVoices, ClipSet, Voice};
use crate::blade::{self, Strip, Sweep};
use crate::clock::Clock;
use crate::color::{self, BladeColors, Rgb};
use crate::gesture::GestureDecoder;
use crate::motion::{Accelerometer, MotionClass, MotionThresholds, classify};
use crate::rng::RandomSource;
use crate::settings::SettingsStore;

#[cfg(all(test, not(target_os = "none")))]
mod host_tests;

/// Saber operating mode. Ordering matters: everything above `Idle` is an
/// active post-trigger state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Mode {
    Off,
    Idle,
    Swing,
    Hit,
}

/// Simple digital I/O collaborator: the button input plus the boolean
/// outputs the controller drives.
pub trait Controls {
    /// Raw (undebounced) button level; true while physically pressed.
    fn button_pressed(&mut self) -> bool;

    /// Enables or disables the blade power rail.
    fn set_power_rail(&mut self, on: bool);

    /// Drives the "powered" indicator LED.
    fn set_status_led(&mut self, on: bool);
}

/// Decoded button events for one loop iteration.
#[derive(Clone, Copy, Debug, Default)]
pub struct ButtonEvents {
    pub long_press: bool,
    pub short_count: u8,
}

/// Tunable constants, exposed so thresholds and timing can be recalibrated
/// per hardware revision without touching the state machine.
#[derive(Clone, Copy, Debug)]
pub struct SaberConfig {
    pub thresholds: MotionThresholds,
    pub power_on_duration: Duration,
    pub power_off_duration: Duration,
    pub default_volume: f32,
    /// Relative level of the idle hum, on top of the global volume.
    pub idle_sound_level: f32,
    /// Time the strip transfer steals per pixel; subtracted from the sweep
    /// start time after every commit.
    pub write_compensation_per_pixel: Duration,
}

impl Default for SaberConfig {
    fn default() -> Self {
        Self {
            thresholds: MotionThresholds::default(),
            power_on_duration: Duration::from_millis(1_720),
            power_off_duration: Duration::from_millis(640),
            default_volume: 1.0,
            idle_sound_level: 0.75,
            write_compensation_per_pixel: Duration::from_micros(30),
        }
    }
}

/// The fixed sound library, grouped by event.
#[derive(Clone, Copy, Debug)]
pub struct SoundBank {
    pub power_on: ClipSet,
    pub power_off: ClipSet,
    pub idle: ClipSet,
    pub swing: ClipSet,
    pub hit: ClipSet,
}

/// The saber controller; see the module docs.
pub struct Saber<C, S, V, A, IO, KV, R> {
    clock: C,
    strip: S,
    voices: V,
    accel: A,
    controls: IO,
    settings: KV,
    rng: R,
    config: SaberConfig,
    bank: SoundBank,
    gesture: GestureDecoder,
    mode: Mode,
    color_index: usize,
    colors: BladeColors,
    /// Color the post-trigger blend fades from; hit white or swing color.
    active_color: Rgb,
    volume: f32,
    trigger_time: Duration,
}

impl<C, S, V, A, IO, KV, R> Saber<C, S, V, A, IO, KV, R>
where
    C: Clock,
    S: Strip,
    V: AudioVoices,
    A: Accelerometer,
    IO: Controls,
    KV: SettingsStore,
    R: RandomSource,
{
    /// Builds the controller in the `Off` state.
    ///
    /// The persisted color index is restored (wrapped into range, defaulting
    /// to 0 on any settings fault); volume always starts at the configured
    /// default.
    #[allow(clippy::too_many_arguments, reason = "one-time wiring call")]
    pub fn new(
        clock: C,
        strip: S,
        voices: V,
        accel: A,
        controls: IO,
        mut settings: KV,
        rng: R,
        config: SaberConfig,
        bank: SoundBank,
    ) -> Self {
        let color_index = settings.color_index(0) % color::PALETTE.len();
        let colors = BladeColors::for_index(color_index);
        info!("restored color index {}", color_index);
        Self {
            clock,
            strip,
            voices,
            accel,
            controls,
            settings,
            rng,
            config,
            bank,
            gesture: GestureDecoder::new(),
            mode: Mode::Off,
            color_index,
            colors,
            active_color: colors.idle,
            volume: config.default_volume,
            trigger_time: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn color_index(&self) -> usize {
        self.color_index
    }

    #[must_use]
    pub fn volume(&self) -> f32 {
        self.volume
    }

    #[must_use]
    pub fn active_color(&self) -> Rgb {
        self.active_color
    }

    #[must_use]
    pub fn trigger_time(&self) -> Duration {
        self.trigger_time
    }

    /// One control-loop iteration: poll the button, then apply events.
    pub async fn tick(&mut self) {
        let now = self.clock.elapsed();
        let pressed = self.controls.button_pressed();
        self.gesture.update(pressed, now);
        let events = ButtonEvents {
            long_press: self.gesture.long_press(),
            short_count: self.gesture.short_count(),
        };
        self.apply(events).await;
    }

    /// Applies one iteration's decoded button events, then (if no gesture
    /// fired) the sensor-driven transitions. Gestures take priority over
    /// motion; the long press takes priority over everything.
    pub async fn apply(&mut self, events: ButtonEvents) {
        if events.long_press {
            if self.mode == Mode::Off {
                self.power_on().await;
            } else {
                self.power_off().await;
            }
        } else if events.short_count == 3 && self.mode != Mode::Off {
            // Volume change takes effect on the idle loop only through a
            // clean power cycle.
            let target = if self.volume == self.config.default_volume {
                0.0
            } else {
                self.config.default_volume
            };
            info!("volume toggled");
            self.power_off().await;
            self.volume = target;
            self.power_on().await;
        } else if events.short_count == 2 && self.mode != Mode::Off {
            self.power_off().await;
            self.cycle_color();
            self.power_on().await;
        } else if self.mode >= Mode::Idle {
            self.sense_motion();
            self.update_blend().await;
        }
    }

    /// Powers the blade up: rail on, grow sweep against the "on" stinger,
    /// then the looping idle hum.
    pub async fn power_on(&mut self) {
        self.controls.set_power_rail(true);
        self.controls.set_status_led(true);

        let stinger = self.bank.power_on;
        self.play_track(Voice::Background, stinger, 1.0, false);
        blade::power_sweep(
            &mut self.strip,
            &self.clock,
            Sweep::Grow,
            self.config.power_on_duration,
            self.colors.idle,
            self.config.write_compensation_per_pixel,
        )
        .await;
        self.wait_for_background().await;

        let idle = self.bank.idle;
        let idle_level = self.config.idle_sound_level;
        self.play_track(Voice::Background, idle, idle_level, true);
        self.mode = Mode::Idle;
        info!("powered on");
    }

    /// Powers the blade down: shrink sweep against the "off" stinger, then
    /// rail off.
    pub async fn power_off(&mut self) {
        self.controls.set_status_led(false);

        let stinger = self.bank.power_off;
        self.play_track(Voice::Background, stinger, 1.0, false);
        blade::power_sweep(
            &mut self.strip,
            &self.clock,
            Sweep::Shrink,
            self.config.power_off_duration,
            self.colors.idle,
            self.config.write_compensation_per_pixel,
        )
        .await;
        self.wait_for_background().await;

        self.mode = Mode::Off;
        self.controls.set_power_rail(false);
        info!("powered off");
    }

    /// Classifies the current accelerometer sample and applies the trigger
    /// transitions. A hit pre-empts anything, including an in-flight swing;
    /// a swing only starts from idle and never refreshes itself.
    fn sense_motion(&mut self) {
        let (ax, ay, az) = self.accel.read();
        match classify(ax, ay, az, self.config.thresholds) {
            MotionClass::Hit => {
                self.trigger_time = self.clock.elapsed();
                let sounds = self.bank.hit;
                self.play_track(Voice::Effect, sounds, 1.0, false);
                self.active_color = self.colors.hit;
                self.mode = Mode::Hit;
            }
            MotionClass::Swing if self.mode == Mode::Idle => {
                self.trigger_time = self.clock.elapsed();
                let sounds = self.bank.swing;
                self.play_track(Voice::Effect, sounds, 1.0, false);
                self.active_color = self.colors.swing;
                self.mode = Mode::Swing;
            }
            _ => {}
        }
    }

    /// While a trigger is active, fades the whole blade from the trigger
    /// color back to idle, anchored to the trigger timestamp. Falls back to
    /// idle once the effect sound finishes.
    async fn update_blend(&mut self) {
        if self.mode <= Mode::Idle {
            return;
        }

        if self.voices.is_playing(Voice::Effect) {
            let since_trigger = self
                .clock
                .elapsed()
                .saturating_sub(self.trigger_time)
                .as_secs_f32();
            let blend = if self.mode == Mode::Swing {
                // Envelope peaking at the half-second midpoint.
                libm::fabsf(0.5 - since_trigger) * 2.0
            } else {
                since_trigger
            };
            let frame_color = color::mix(self.active_color, self.colors.idle, blend);
            self.strip.fill(frame_color);
            self.strip.commit().await;
        } else {
            self.strip.fill(self.colors.idle);
            self.strip.commit().await;
            self.mode = Mode::Idle;
        }
    }

    /// Advances the palette index, persists it, and rederives the colors.
    fn cycle_color(&mut self) {
        let index = color::next_index(self.color_index);
        self.color_index = index;
        self.colors = BladeColors::for_index(index);
        self.active_color = self.colors.idle;
        self.settings.save_color_index(index);
        info!("color index set to {}", index);
    }

    /// Picks a clip from `set` and starts it at the effective level
    /// (per-call relative volume × global volume).
    fn play_track(&mut self, voice: Voice, set: ClipSet, relative_level: f32, looping: bool) {
        let clip = set.choose(&mut self.rng);
        self.voices.play(voice, clip, looping, relative_level * self.volume);
    }

    /// Deliberately stalls the whole control loop until the background voice
    /// finishes: power transitions are atomic from the user's perspective,
    /// so no input is observed during this window.
    async fn wait_for_background(&mut self) {
        while self.voices.is_playing(Voice::Background) {
            yield_now().await;
        }
    }
}
