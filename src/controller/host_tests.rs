//! End-to-end scenario tests for the mode state machine, run on the host
//! against fake collaborators. The fakes are shared references with interior
//! mutability so a test can keep inspecting them while the controller owns
//! its copies.

use core::cell::{Cell, RefCell};
use core::ops::Range;

use embassy_futures::block_on;

use super::*;
use crate::audio::Clip;
use crate::rng::XorShift32;

struct FakeClock {
    now: Cell<Duration>,
    /// Advance per `elapsed` call; zero freezes time.
    step: Cell<Duration>,
}

impl FakeClock {
    fn new() -> Self {
        Self {
            now: Cell::new(Duration::ZERO),
            step: Cell::new(Duration::from_millis(5)),
        }
    }

    fn freeze_at(&self, now: Duration) {
        self.now.set(now);
        self.step.set(Duration::ZERO);
    }
}

impl Clock for &FakeClock {
    fn elapsed(&self) -> Duration {
        let now = self.now.get();
        self.now.set(now + self.step.get());
        now
    }
}

struct FakeStrip {
    pixels: RefCell<Vec<Rgb>>,
    committed: RefCell<Vec<Vec<Rgb>>>,
}

impl FakeStrip {
    fn new(len: usize) -> Self {
        Self {
            pixels: RefCell::new(vec![crate::color::BLACK; len]),
            committed: RefCell::new(Vec::new()),
        }
    }

    fn last_commit(&self) -> Vec<Rgb> {
        self.committed.borrow().last().expect("no commits").clone()
    }
}

impl Strip for &FakeStrip {
    fn len(&self) -> usize {
        self.pixels.borrow().len()
    }

    fn set_range(&mut self, range: Range<usize>, color: Rgb) {
        for pixel in &mut self.pixels.borrow_mut()[range] {
            *pixel = color;
        }
    }

    fn fill(&mut self, color: Rgb) {
        let len = self.len();
        self.set_range(0..len, color);
    }

    async fn commit(&mut self) {
        self.committed.borrow_mut().push(self.pixels.borrow().clone());
    }
}

/// Non-looping clips report playing for a fixed number of `is_playing`
/// calls, then stop; looping clips play until replaced.
struct FakeVoices {
    plays: RefCell<Vec<(Voice, Clip, bool, f32)>>,
    remaining: [Cell<u32>; Voice::COUNT],
}

const NON_LOOPING_POLLS: u32 = 4;

impl FakeVoices {
    fn new() -> Self {
        Self {
            plays: RefCell::new(Vec::new()),
            remaining: [Cell::new(0), Cell::new(0)],
        }
    }

    fn stop(&self, voice: Voice) {
        self.remaining[voice.index()].set(0);
    }

    fn plays_on(&self, voice: Voice) -> Vec<(Clip, bool, f32)> {
        self.plays
            .borrow()
            .iter()
            .filter(|(v, ..)| *v == voice)
            .map(|(_, clip, looping, level)| (*clip, *looping, *level))
            .collect()
    }
}

impl AudioVoices for &FakeVoices {
    fn play(&mut self, voice: Voice, clip: Clip, looping: bool, level: f32) {
        self.plays.borrow_mut().push((voice, clip, looping, level));
        self.remaining[voice.index()].set(if looping {
            u32::MAX
        } else {
            NON_LOOPING_POLLS
        });
    }

    fn set_level(&mut self, _voice: Voice, _level: f32) {}

    fn is_playing(&self, voice: Voice) -> bool {
        let remaining = self.remaining[voice.index()].get();
        if remaining == 0 {
            return false;
        }
        if remaining != u32::MAX {
            self.remaining[voice.index()].set(remaining - 1);
        }
        true
    }
}

struct FakeControls {
    pressed: Cell<bool>,
    rail: Cell<bool>,
    status: Cell<bool>,
}

impl FakeControls {
    fn new() -> Self {
        Self {
            pressed: Cell::new(false),
            rail: Cell::new(false),
            status: Cell::new(false),
        }
    }
}

impl Controls for &FakeControls {
    fn button_pressed(&mut self) -> bool {
        self.pressed.get()
    }

    fn set_power_rail(&mut self, on: bool) {
        self.rail.set(on);
    }

    fn set_status_led(&mut self, on: bool) {
        self.status.set(on);
    }
}

struct FakeAccel {
    sample: Cell<(f32, f32, f32)>,
}

const QUIET: (f32, f32, f32) = (1.0, 0.0, 2.0);
const SWING_SAMPLE: (f32, f32, f32) = (12.0, 0.0, 5.0);
const HIT_SAMPLE: (f32, f32, f32) = (20.0, 0.0, 20.0);

impl Accelerometer for &FakeAccel {
    fn read(&mut self) -> (f32, f32, f32) {
        self.sample.get()
    }
}

struct FakeSettings {
    stored: Cell<usize>,
    saved: RefCell<Vec<usize>>,
}

impl SettingsStore for &FakeSettings {
    fn color_index(&mut self, _default: usize) -> usize {
        self.stored.get()
    }

    fn save_color_index(&mut self, index: usize) {
        self.stored.set(index);
        self.saved.borrow_mut().push(index);
    }
}

static ON_CLIP: [i16; 8] = [100; 8];
static OFF_CLIP: [i16; 8] = [-100; 8];
static IDLE_CLIP: [i16; 8] = [10; 8];
static SWING_CLIP: [i16; 8] = [20; 8];
static HIT_CLIP: [i16; 8] = [30; 8];

static ON_SET: [Clip; 1] = [&ON_CLIP];
static OFF_SET: [Clip; 1] = [&OFF_CLIP];
static IDLE_SET: [Clip; 1] = [&IDLE_CLIP];
static SWING_SET: [Clip; 1] = [&SWING_CLIP];
static HIT_SET: [Clip; 1] = [&HIT_CLIP];

fn test_bank() -> SoundBank {
    SoundBank {
        power_on: ClipSet::new(&ON_SET).unwrap(),
        power_off: ClipSet::new(&OFF_SET).unwrap(),
        idle: ClipSet::new(&IDLE_SET).unwrap(),
        swing: ClipSet::new(&SWING_SET).unwrap(),
        hit: ClipSet::new(&HIT_SET).unwrap(),
    }
}

fn test_config() -> SaberConfig {
    SaberConfig {
        // Short sweeps keep tests fast; the curve itself is covered elsewhere.
        power_on_duration: Duration::from_millis(100),
        power_off_duration: Duration::from_millis(60),
        ..SaberConfig::default()
    }
}

struct Rig {
    clock: FakeClock,
    strip: FakeStrip,
    voices: FakeVoices,
    accel: FakeAccel,
    controls: FakeControls,
    settings: FakeSettings,
}

type TestSaber<'a> = Saber<
    &'a FakeClock,
    &'a FakeStrip,
    &'a FakeVoices,
    &'a FakeAccel,
    &'a FakeControls,
    &'a FakeSettings,
    XorShift32,
>;

impl Rig {
    fn new() -> Self {
        Self {
            clock: FakeClock::new(),
            strip: FakeStrip::new(162),
            voices: FakeVoices::new(),
            accel: FakeAccel {
                sample: Cell::new(QUIET),
            },
            controls: FakeControls::new(),
            settings: FakeSettings {
                stored: Cell::new(0),
                saved: RefCell::new(Vec::new()),
            },
        }
    }

    fn saber(&self) -> TestSaber<'_> {
        Saber::new(
            &self.clock,
            &self.strip,
            &self.voices,
            &self.accel,
            &self.controls,
            &self.settings,
            XorShift32::new(1),
            test_config(),
            test_bank(),
        )
    }
}

const LONG_PRESS: ButtonEvents = ButtonEvents {
    long_press: true,
    short_count: 0,
};

const NO_EVENTS: ButtonEvents = ButtonEvents {
    long_press: false,
    short_count: 0,
};

fn taps(count: u8) -> ButtonEvents {
    ButtonEvents {
        long_press: false,
        short_count: count,
    }
}

#[test]
fn long_press_powers_on() {
    let rig = Rig::new();
    let mut saber = rig.saber();

    block_on(saber.apply(LONG_PRESS));

    assert_eq!(saber.mode(), Mode::Idle);
    assert!(rig.controls.rail.get());
    assert!(rig.controls.status.get());
    let frame = rig.strip.last_commit();
    assert!(frame.iter().all(|pixel| *pixel == color::PALETTE[0]));

    let background = rig.voices.plays_on(Voice::Background);
    assert_eq!(background.len(), 2, "stinger then idle loop");
    assert_eq!(background[0].0.as_ptr(), ON_CLIP.as_ptr());
    assert!(!background[0].1);
    assert_eq!(background[0].2, 1.0);
    assert_eq!(background[1].0.as_ptr(), IDLE_CLIP.as_ptr());
    assert!(background[1].1, "idle hum loops");
    assert_eq!(background[1].2, 0.75);
}

#[test]
fn long_press_powers_off_again() {
    let rig = Rig::new();
    let mut saber = rig.saber();

    block_on(saber.apply(LONG_PRESS));
    block_on(saber.apply(LONG_PRESS));

    assert_eq!(saber.mode(), Mode::Off);
    assert!(!rig.controls.rail.get());
    assert!(!rig.controls.status.get());
    let frame = rig.strip.last_commit();
    assert!(frame.iter().all(|pixel| *pixel == color::BLACK));
    let clips: Vec<_> = rig
        .voices
        .plays_on(Voice::Background)
        .iter()
        .map(|(clip, ..)| clip.as_ptr())
        .collect();
    assert_eq!(clips[2], OFF_CLIP.as_ptr());
}

#[test]
fn hit_from_idle_flashes_white() {
    let rig = Rig::new();
    let mut saber = rig.saber();
    block_on(saber.apply(LONG_PRESS));

    let trigger_at = Duration::from_secs(30);
    rig.clock.freeze_at(trigger_at);
    rig.accel.sample.set(HIT_SAMPLE);
    block_on(saber.apply(NO_EVENTS));

    assert_eq!(saber.mode(), Mode::Hit);
    assert_eq!(saber.trigger_time(), trigger_at);
    assert_eq!(saber.active_color(), color::WHITE);
    let effects = rig.voices.plays_on(Voice::Effect);
    assert_eq!(effects.len(), 1);
    assert_eq!(effects[0].0.as_ptr(), HIT_CLIP.as_ptr());
    // Blend weight is zero at the trigger instant, so the frame is pure white.
    let frame = rig.strip.last_commit();
    assert!(frame.iter().all(|pixel| *pixel == color::WHITE));
}

#[test]
fn hit_preempts_swing_and_resets_trigger() {
    let rig = Rig::new();
    let mut saber = rig.saber();
    block_on(saber.apply(LONG_PRESS));

    rig.clock.freeze_at(Duration::from_secs(30));
    rig.accel.sample.set(SWING_SAMPLE);
    block_on(saber.apply(NO_EVENTS));
    assert_eq!(saber.mode(), Mode::Swing);
    assert_eq!(saber.trigger_time(), Duration::from_secs(30));

    rig.clock.freeze_at(Duration::from_secs(31));
    rig.accel.sample.set(HIT_SAMPLE);
    block_on(saber.apply(NO_EVENTS));
    assert_eq!(saber.mode(), Mode::Hit);
    assert_eq!(saber.trigger_time(), Duration::from_secs(31));
    assert_eq!(rig.voices.plays_on(Voice::Effect).len(), 2);
}

#[test]
fn swing_does_not_retrigger_itself() {
    let rig = Rig::new();
    let mut saber = rig.saber();
    block_on(saber.apply(LONG_PRESS));

    rig.clock.freeze_at(Duration::from_secs(30));
    rig.accel.sample.set(SWING_SAMPLE);
    block_on(saber.apply(NO_EVENTS));
    let first_trigger = saber.trigger_time();

    // Still swinging hard; the timestamp and sound must not refresh.
    rig.clock.freeze_at(Duration::from_millis(30_200));
    block_on(saber.apply(NO_EVENTS));
    assert_eq!(saber.mode(), Mode::Swing);
    assert_eq!(saber.trigger_time(), first_trigger);
    assert_eq!(rig.voices.plays_on(Voice::Effect).len(), 1);
}

#[test]
fn finished_effect_falls_back_to_idle() {
    let rig = Rig::new();
    let mut saber = rig.saber();
    block_on(saber.apply(LONG_PRESS));

    rig.clock.freeze_at(Duration::from_secs(30));
    rig.accel.sample.set(HIT_SAMPLE);
    block_on(saber.apply(NO_EVENTS));
    assert_eq!(saber.mode(), Mode::Hit);

    rig.voices.stop(Voice::Effect);
    rig.accel.sample.set(QUIET);
    block_on(saber.apply(NO_EVENTS));
    assert_eq!(saber.mode(), Mode::Idle);
    let frame = rig.strip.last_commit();
    assert!(frame.iter().all(|pixel| *pixel == color::PALETTE[0]));
}

#[test]
fn double_press_cycles_and_persists_color() {
    let rig = Rig::new();
    let mut saber = rig.saber();
    block_on(saber.apply(LONG_PRESS));

    block_on(saber.apply(taps(2)));

    assert_eq!(saber.mode(), Mode::Idle);
    assert_eq!(saber.color_index(), 1);
    assert_eq!(*rig.settings.saved.borrow(), vec![1]);
    let frame = rig.strip.last_commit();
    assert!(frame.iter().all(|pixel| *pixel == color::PALETTE[1]));
}

#[test]
fn double_press_is_ignored_while_off() {
    let rig = Rig::new();
    let mut saber = rig.saber();

    block_on(saber.apply(taps(2)));

    assert_eq!(saber.mode(), Mode::Off);
    assert!(rig.voices.plays.borrow().is_empty());
    assert!(rig.settings.saved.borrow().is_empty());
}

#[test]
fn triple_press_toggles_volume_through_power_cycle() {
    let rig = Rig::new();
    let mut saber = rig.saber();
    block_on(saber.apply(LONG_PRESS));

    block_on(saber.apply(taps(3)));
    assert_eq!(saber.mode(), Mode::Idle);
    assert_eq!(saber.volume(), 0.0);
    let background = rig.voices.plays_on(Voice::Background);
    // The off stinger still plays at the old volume; the restart is muted.
    let (_, _, off_level) = background[background.len() - 3];
    assert_eq!(off_level, 1.0);
    let (_, looping, idle_level) = background[background.len() - 1];
    assert!(looping);
    assert_eq!(idle_level, 0.0);

    block_on(saber.apply(taps(3)));
    assert_eq!(saber.volume(), 1.0);
    let background = rig.voices.plays_on(Voice::Background);
    let (_, _, idle_level) = background[background.len() - 1];
    assert_eq!(idle_level, 0.75);
}

#[test]
fn stored_color_index_wraps_into_palette() {
    let rig = Rig::new();
    rig.settings.stored.set(color::PALETTE.len() + 2);
    let saber = rig.saber();
    assert_eq!(saber.color_index(), 2);
}

#[test]
fn held_button_powers_on_through_tick() {
    let rig = Rig::new();
    let mut saber = rig.saber();

    rig.controls.pressed.set(true);
    for _ in 0..300 {
        block_on(saber.tick());
        if saber.mode() != Mode::Off {
            break;
        }
    }
    assert_eq!(saber.mode(), Mode::Idle);
    assert!(rig.controls.rail.get());

    // Keeping it held must not toggle power again.
    for _ in 0..300 {
        block_on(saber.tick());
    }
    assert_eq!(saber.mode(), Mode::Idle);
}
