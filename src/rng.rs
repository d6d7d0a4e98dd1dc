//! Pluggable random source for clip selection.
//!
//! The state machine only needs "pick one of N"; keeping the source behind a
//! trait lets tests inject a deterministic sequence.

/// Uniform-ish index source.
pub trait RandomSource {
    /// Returns a value in `0..bound`. `bound` must be non-zero.
    fn next_index(&mut self, bound: usize) -> usize;
}

/// Small xorshift generator; deterministic given its seed.
#[derive(Clone, Debug)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        // Xorshift has a fixed point at zero.
        Self {
            state: if seed == 0 { 0x6b8b_4567 } else { seed },
        }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

impl RandomSource for XorShift32 {
    fn next_index(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0);
        (self.next_u32() as usize) % bound
    }
}

/// Hardware entropy from the RP2040 ring oscillator.
#[cfg(target_os = "none")]
pub struct RoscRandom {
    rng: embassy_rp::clocks::RoscRng,
}

#[cfg(target_os = "none")]
impl RoscRandom {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rng: embassy_rp::clocks::RoscRng,
        }
    }
}

#[cfg(target_os = "none")]
impl Default for RoscRandom {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "none")]
impl RandomSource for RoscRandom {
    fn next_index(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0);
        (rand_core::RngCore::next_u32(&mut self.rng) as usize) % bound
    }
}
