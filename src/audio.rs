//! Two-voice audio model: clips, named clip sets, and the voice collaborator
//! trait implemented by the hardware mixer.
//!
//! Clips are opaque, pre-decoded 22 050 Hz mono PCM slices. The const
//! [`tone`] and [`silence`] generators exist so firmware can carry a complete
//! sound bank without shipping audio assets.

use crate::rng::RandomSource;
use crate::{Error, Result};

/// Sample rate of every clip in the system.
pub const SAMPLE_RATE_HZ: u32 = 22_050;

/// One pre-decoded PCM clip.
pub type Clip = &'static [i16];

/// The two mixer voices.
///
/// Background carries continuous sounds (power stingers, idle hum) so a
/// transient effect on the other voice never disturbs them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Voice {
    Background,
    Effect,
}

impl Voice {
    pub const COUNT: usize = 2;

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Background => 0,
            Self::Effect => 1,
        }
    }
}

/// A non-empty named set of clips; playback picks one uniformly at random.
#[derive(Clone, Copy, Debug)]
pub struct ClipSet {
    clips: &'static [Clip],
}

impl ClipSet {
    /// Fails with [`Error::EmptyClipSet`] so a missing sound library is
    /// caught before the control loop starts.
    pub fn new(clips: &'static [Clip]) -> Result<Self> {
        if clips.is_empty() {
            return Err(Error::EmptyClipSet);
        }
        Ok(Self { clips })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Picks one clip, uniformly over the set.
    #[must_use]
    pub fn choose(&self, rng: &mut impl RandomSource) -> Clip {
        self.clips[rng.next_index(self.clips.len())]
    }
}

/// The audio collaborator: two independent voices mixed into one output.
///
/// `is_playing` becomes false asynchronously when a non-looping clip reaches
/// its end; a looping clip reports playing until it is replaced.
pub trait AudioVoices {
    /// Starts `clip` on `voice` at `level` (0.0–1.0), replacing whatever that
    /// voice was playing.
    fn play(&mut self, voice: Voice, clip: Clip, looping: bool, level: f32);

    /// Changes the gain of whatever `voice` is currently playing.
    fn set_level(&mut self, voice: Voice, level: f32);

    fn is_playing(&self, voice: Voice) -> bool;
}

/// Returns how many samples cover a duration in milliseconds.
///
/// Usable in const contexts to size static clip arrays.
#[must_use]
pub const fn samples_for_duration_ms(duration_ms: u32, sample_rate_hz: u32) -> usize {
    assert!(sample_rate_hz > 0, "sample_rate_hz must be > 0");
    ((duration_ms as u64 * sample_rate_hz as u64) / 1_000) as usize
}

/// Generates a silent PCM clip with `SAMPLE_COUNT` samples.
#[must_use]
pub const fn silence<const SAMPLE_COUNT: usize>() -> [i16; SAMPLE_COUNT] {
    [0; SAMPLE_COUNT]
}

/// Generates a sine-wave PCM clip with `SAMPLE_COUNT` samples.
///
/// `amplitude` is the peak sample value (0..=32767).
#[must_use]
pub const fn tone<const SAMPLE_COUNT: usize>(
    frequency_hz: u32,
    amplitude: i16,
    sample_rate_hz: u32,
) -> [i16; SAMPLE_COUNT] {
    assert!(sample_rate_hz > 0, "sample_rate_hz must be > 0");
    assert!(amplitude >= 0, "amplitude must be >= 0");

    let mut samples = [0_i16; SAMPLE_COUNT];
    let phase_step = (((frequency_hz as u64) << 32) / sample_rate_hz as u64) as u32;
    let mut phase = 0_u32;

    let mut index = 0;
    while index < SAMPLE_COUNT {
        samples[index] = sine_from_phase(phase, amplitude);
        phase = phase.wrapping_add(phase_step);
        index += 1;
    }

    samples
}

/// Bhaskara approximation on a normalized half-cycle:
/// sin(pi * t) ~= 16 t (1 - t) / (5 - 4 t (1 - t)), for t in [0, 1].
#[inline]
const fn sine_from_phase(phase: u32, amplitude: i16) -> i16 {
    let half_cycle = 1_u64 << 31;
    let one_q31 = 1_u64 << 31;
    let phase = phase as u64;
    let (half_phase, sign) = if phase < half_cycle {
        (phase, 1_i64)
    } else {
        (phase - half_cycle, -1_i64)
    };

    let product_q31 = (half_phase * (one_q31 - half_phase)) >> 31;
    let denominator_q31 = 5 * one_q31 - 4 * product_q31;
    let sine_q31 = ((16 * product_q31) << 31) / denominator_q31;

    (((sine_q31 as i64 * amplitude as i64) >> 31) * sign) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::XorShift32;

    static CLIP_A: [i16; 4] = [1, 2, 3, 4];
    static CLIP_B: [i16; 2] = [5, 6];
    static PAIR: [Clip; 2] = [&CLIP_A, &CLIP_B];

    #[test]
    fn empty_clip_set_is_a_fatal_error() {
        assert!(matches!(ClipSet::new(&[]), Err(Error::EmptyClipSet)));
    }

    #[test]
    fn choose_only_returns_members() {
        let set = ClipSet::new(&PAIR).unwrap();
        let mut rng = XorShift32::new(3);
        let mut seen = [false; 2];
        for _ in 0..64 {
            let clip = set.choose(&mut rng);
            let position = PAIR
                .iter()
                .position(|candidate| core::ptr::eq(*candidate, clip))
                .expect("clip must come from the set");
            seen[position] = true;
        }
        assert!(seen.iter().all(|s| *s), "both clips should be selected");
    }

    #[test]
    fn samples_for_duration_math() {
        assert_eq!(samples_for_duration_ms(1_000, SAMPLE_RATE_HZ), 22_050);
        assert_eq!(samples_for_duration_ms(0, SAMPLE_RATE_HZ), 0);
        assert_eq!(samples_for_duration_ms(1_720, SAMPLE_RATE_HZ), 37_926);
    }

    #[test]
    fn silence_is_all_zero() {
        let clip: [i16; 32] = silence();
        assert!(clip.iter().all(|sample| *sample == 0));
    }

    #[test]
    fn tone_oscillates_within_amplitude() {
        const AMPLITUDE: i16 = 8_000;
        let clip: [i16; 256] = tone(440, AMPLITUDE, SAMPLE_RATE_HZ);
        assert!(clip.iter().any(|sample| *sample > 0));
        assert!(clip.iter().any(|sample| *sample < 0));
        assert!(clip.iter().all(|sample| sample.unsigned_abs() <= AMPLITUDE as u16));
    }
}
