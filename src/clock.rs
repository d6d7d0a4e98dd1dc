//! Monotonic time source, injected so timing logic is host-testable.

use core::time::Duration;

/// Monotonic elapsed time since boot.
pub trait Clock {
    fn elapsed(&self) -> Duration;
}

/// The hardware clock, backed by the embassy time driver.
#[cfg(target_os = "none")]
pub struct BootClock;

#[cfg(target_os = "none")]
impl Clock for BootClock {
    fn elapsed(&self) -> Duration {
        Duration::from_micros(embassy_time::Instant::now().as_micros())
    }
}
