//! Button gesture decoding: debounce, tap grouping, and long-press detection.
//!
//! [`GestureDecoder::update`] must be called once per control-loop iteration;
//! the [`long_press`](GestureDecoder::long_press) and
//! [`short_count`](GestureDecoder::short_count) queries are edge-triggered and
//! valid only for the iteration that follows. Each physical gesture produces
//! at most one logical event, no matter how noisy the raw input is.

use core::time::Duration;

/// Raw input must hold a new level this long before it is believed.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(10);

/// Quick taps closer together than this are grouped into one count.
pub const SHORT_GROUP_WINDOW: Duration = Duration::from_millis(200);

/// Holding the button this long is a long press.
pub const LONG_PRESS_HOLD: Duration = Duration::from_secs(1);

/// Tap counts above this are clamped; only 1, 2 and 3 mean anything.
pub const MAX_SHORT_COUNT: u8 = 3;

#[derive(Debug)]
pub struct GestureDecoder {
    stable: bool,
    candidate: bool,
    candidate_since: Duration,
    press_start: Duration,
    last_release: Duration,
    pending_taps: u8,
    long_reported: bool,
    long_press: bool,
    short_count: u8,
}

impl Default for GestureDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureDecoder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stable: false,
            candidate: false,
            candidate_since: Duration::ZERO,
            press_start: Duration::ZERO,
            last_release: Duration::ZERO,
            pending_taps: 0,
            long_reported: false,
            long_press: false,
            short_count: 0,
        }
    }

    /// Advances the decoder with the current raw input level.
    ///
    /// `now` is monotonic time since boot and must not go backwards.
    pub fn update(&mut self, raw_pressed: bool, now: Duration) {
        self.long_press = false;
        self.short_count = 0;

        if raw_pressed != self.candidate {
            self.candidate = raw_pressed;
            self.candidate_since = now;
        }

        if self.candidate != self.stable
            && now.saturating_sub(self.candidate_since) >= DEBOUNCE_WINDOW
        {
            self.stable = self.candidate;
            if self.stable {
                self.press_start = now;
                self.long_reported = false;
            } else {
                if !self.long_reported {
                    self.pending_taps = (self.pending_taps + 1).min(MAX_SHORT_COUNT);
                }
                self.last_release = now;
            }
        }

        // A long press is reported once, while the button is still held.
        // It consumes any tap group in progress.
        if self.stable
            && !self.long_reported
            && now.saturating_sub(self.press_start) >= LONG_PRESS_HOLD
        {
            self.long_press = true;
            self.long_reported = true;
            self.pending_taps = 0;
        }

        // A tap group is reported once its window closes with no new press.
        if !self.stable
            && self.pending_taps > 0
            && now.saturating_sub(self.last_release) > SHORT_GROUP_WINDOW
        {
            self.short_count = self.pending_taps;
            self.pending_taps = 0;
        }
    }

    /// True on exactly the iteration the hold threshold was crossed.
    #[must_use]
    pub fn long_press(&self) -> bool {
        self.long_press
    }

    /// Number of grouped quick taps (1–3), reported exactly once per group.
    #[must_use]
    pub fn short_count(&self) -> u8 {
        self.short_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feeds the decoder a raw level for `hold`, stepping 1 ms at a time,
    /// and returns the accumulated events plus the new time cursor.
    fn feed(
        decoder: &mut GestureDecoder,
        raw: bool,
        mut now: Duration,
        hold: Duration,
    ) -> (Duration, u32, u32) {
        let step = Duration::from_millis(1);
        let mut long_events = 0;
        let mut short_total = 0;
        let end = now + hold;
        while now < end {
            decoder.update(raw, now);
            long_events += u32::from(decoder.long_press());
            short_total += u32::from(decoder.short_count());
            now += step;
        }
        (now, long_events, short_total)
    }

    fn tap(decoder: &mut GestureDecoder, now: Duration) -> (Duration, u32) {
        let (now, _, s1) = feed(decoder, true, now, Duration::from_millis(50));
        let (now, _, s2) = feed(decoder, false, now, Duration::from_millis(50));
        (now, s1 + s2)
    }

    #[test]
    fn single_tap_reports_one_after_group_window() {
        let mut decoder = GestureDecoder::new();
        let (now, during) = tap(&mut decoder, Duration::ZERO);
        assert_eq!(during, 0, "no report while the group window is open");
        let (_, _, after) = feed(&mut decoder, false, now, Duration::from_millis(400));
        assert_eq!(after, 1);
    }

    #[test]
    fn triple_tap_reports_three_exactly_once() {
        let mut decoder = GestureDecoder::new();
        let mut now = Duration::ZERO;
        for _ in 0..3 {
            let (next, during) = tap(&mut decoder, now);
            assert_eq!(during, 0);
            now = next;
        }
        let (now, _, total) = feed(&mut decoder, false, now, Duration::from_millis(400));
        assert_eq!(total, 3);
        // Silence afterwards must not repeat the report.
        let (_, _, repeat) = feed(&mut decoder, false, now, Duration::from_secs(1));
        assert_eq!(repeat, 0);
    }

    #[test]
    fn fourth_rapid_tap_never_reports_four() {
        let mut decoder = GestureDecoder::new();
        let mut now = Duration::ZERO;
        for _ in 0..4 {
            let (next, _) = tap(&mut decoder, now);
            now = next;
        }
        let (_, _, total) = feed(&mut decoder, false, now, Duration::from_millis(400));
        assert_eq!(total, u32::from(MAX_SHORT_COUNT));
    }

    #[test]
    fn long_hold_reports_once_and_suppresses_taps() {
        let mut decoder = GestureDecoder::new();
        let (now, longs, shorts) =
            feed(&mut decoder, true, Duration::ZERO, Duration::from_millis(1_500));
        assert_eq!(longs, 1);
        assert_eq!(shorts, 0);
        // Releasing after a long press is not a tap.
        let (_, longs, shorts) = feed(&mut decoder, false, now, Duration::from_millis(500));
        assert_eq!(longs, 0);
        assert_eq!(shorts, 0);
    }

    #[test]
    fn bouncing_input_produces_no_events() {
        let mut decoder = GestureDecoder::new();
        let mut now = Duration::ZERO;
        let step = Duration::from_millis(1);
        // Raw input flips every millisecond, well inside the debounce window.
        for iteration in 0..2_000 {
            decoder.update(iteration % 2 == 0, now);
            assert!(!decoder.long_press());
            assert_eq!(decoder.short_count(), 0);
            now += step;
        }
    }

    #[test]
    fn slow_taps_form_separate_groups() {
        let mut decoder = GestureDecoder::new();
        let (now, first) = tap(&mut decoder, Duration::ZERO);
        let (now, _, gap) = feed(&mut decoder, false, now, Duration::from_millis(400));
        let (now, second) = tap(&mut decoder, now);
        let (_, _, tail) = feed(&mut decoder, false, now, Duration::from_millis(400));
        assert_eq!(first + gap, 1);
        assert_eq!(second + tail, 1);
    }
}
