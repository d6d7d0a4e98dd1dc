//! Blade palette and color blending.
//!
//! The palette is fixed at compile time; only the index into it is runtime
//! state (and the one thing persisted across restarts).

use smart_leds::RGB8;

/// RGB color type used for blade pixels.
pub type Rgb = RGB8;

pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

pub const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
pub const GREEN: Rgb = Rgb { r: 0, g: 255, b: 0 };
pub const BLUE: Rgb = Rgb { r: 0, g: 0, b: 255 };
pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };
pub const PURPLE: Rgb = Rgb { r: 128, g: 0, b: 255 };
pub const CYAN: Rgb = Rgb { r: 0, g: 100, b: 255 };
pub const YELLOW: Rgb = Rgb { r: 255, g: 255, b: 0 };
pub const ORANGE: Rgb = Rgb { r: 255, g: 80, b: 0 };

/// Selectable blade colors, cycled by the double-press gesture.
pub const PALETTE: [Rgb; 8] = [BLUE, GREEN, WHITE, YELLOW, CYAN, PURPLE, ORANGE, RED];

/// "Hit" flashes are always white, regardless of the selected blade color.
pub const HIT_COLOR: Rgb = WHITE;

/// Advances a palette index by one, wrapping.
#[must_use]
pub fn next_index(index: usize) -> usize {
    (index + 1) % PALETTE.len()
}

/// Colors derived from one palette entry.
///
/// Idle and swing are the palette color itself; the distinction is kept
/// because the swing blend fades from `swing` back to `idle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BladeColors {
    pub idle: Rgb,
    pub swing: Rgb,
    pub hit: Rgb,
}

impl BladeColors {
    #[must_use]
    pub fn for_index(index: usize) -> Self {
        let base = PALETTE[index % PALETTE.len()];
        Self {
            idle: base,
            swing: base,
            hit: HIT_COLOR,
        }
    }
}

/// Blends two colors: `weight` 0.0 returns `color_a`, 1.0 returns `color_b`.
///
/// The weight is clamped to [0, 1] and each channel is rounded to the nearest
/// integer value.
#[must_use]
pub fn mix(color_a: Rgb, color_b: Rgb, weight: f32) -> Rgb {
    let weight_b = weight.clamp(0.0, 1.0);
    let weight_a = 1.0 - weight_b;
    let channel =
        |a: u8, b: u8| (f32::from(a) * weight_a + f32::from(b) * weight_b + 0.5) as u8;
    Rgb {
        r: channel(color_a.r, color_b.r),
        g: channel(color_a.g, color_b.g),
        b: channel(color_a.b, color_b.b),
    }
}
