//! Blade strip collaborator trait and the power sweep animation.
//!
//! The strip is double-buffered: mutations touch only the logical frame, and
//! nothing reaches the LEDs until an explicit [`Strip::commit`].

use core::ops::Range;
use core::time::Duration;

use embassy_futures::yield_now;

use crate::clock::Clock;
use crate::color::{BLACK, Rgb};

/// Addressable pixel strip collaborator.
///
/// The logical buffer has a fixed length for the life of the program. The
/// core never reads strip state back.
pub trait Strip {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Paints `range` in the logical buffer.
    fn set_range(&mut self, range: Range<usize>, color: Rgb);

    /// Paints the whole logical buffer.
    fn fill(&mut self, color: Rgb);

    /// Transfers the logical buffer to the physical strip.
    ///
    /// Awaiting lets the audio device task keep running during the transfer;
    /// the control loop itself still treats the commit as a blocking step.
    async fn commit(&mut self);
}

/// Direction of a power sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Sweep {
    Grow,
    Shrink,
}

/// Animation progress for one instant, eased so the reveal starts fast and
/// slows near completion. A zero duration counts as already complete.
#[must_use]
pub fn eased_fraction(elapsed: Duration, duration: Duration, sweep: Sweep) -> f32 {
    let mut fraction = if duration.is_zero() {
        1.0
    } else {
        (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
    };
    if sweep == Sweep::Shrink {
        fraction = 1.0 - fraction;
    }
    libm::sqrtf(fraction)
}

/// Pixel index up to which one half of the blade is lit, rounded to nearest.
#[must_use]
pub fn lit_threshold(fraction: f32, half_len: usize) -> usize {
    (fraction * half_len as f32 + 0.5) as usize
}

/// Progressively reveals (or conceals) the blade over `duration`, in sync
/// with a concurrently started sound.
///
/// The blade is symmetric about its center: both mirrored halves move
/// together. Only newly crossed pixel ranges are painted, and the buffer is
/// committed once per change. Each commit briefly stalls the timing source,
/// so the start time is pulled back by `write_compensation_per_pixel × len`
/// after every transfer to keep the animation in step with the audio.
pub async fn power_sweep<S: Strip, C: Clock>(
    strip: &mut S,
    clock: &C,
    sweep: Sweep,
    duration: Duration,
    color: Rgb,
    write_compensation_per_pixel: Duration,
) {
    let len = strip.len();
    let half = len / 2;
    let paint = match sweep {
        Sweep::Grow => color,
        Sweep::Shrink => BLACK,
    };
    let compensation = write_compensation_per_pixel * len as u32;
    let mut previous = match sweep {
        Sweep::Grow => 0,
        Sweep::Shrink => half,
    };
    let mut start = clock.elapsed();

    while !duration.is_zero() {
        let elapsed = clock.elapsed().saturating_sub(start);
        if elapsed > duration {
            break;
        }

        let threshold = lit_threshold(eased_fraction(elapsed, duration, sweep), half);
        if threshold != previous {
            let (low, high) = if threshold > previous {
                (previous, threshold)
            } else {
                (threshold, previous)
            };
            strip.set_range(low..high, paint);
            // Mirrored half, growing inward from the far end.
            strip.set_range(len - high..len - low, paint);
            strip.commit().await;
            start = start.saturating_sub(compensation);
            previous = threshold;
        }

        // Keep the audio device task fed while we spin on the clock.
        yield_now().await;
    }

    // Force the final state; the incremental loop may exit mid-step.
    strip.fill(paint);
    strip.commit().await;
}
