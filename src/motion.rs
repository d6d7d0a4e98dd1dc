//! Accelerometer sample classification.

/// Synchronous 3-axis accelerometer collaborator.
///
/// Each call returns a fresh sample in m/s². A read fault is fatal at the
/// implementation's discretion; classification assumes valid samples.
pub trait Accelerometer {
    fn read(&mut self) -> (f32, f32, f32);
}

/// Result of classifying one accelerometer sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum MotionClass {
    Quiet,
    Swing,
    Hit,
}

/// Squared-magnitude thresholds; smaller values are more sensitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionThresholds {
    pub swing: f32,
    pub hit: f32,
}

impl Default for MotionThresholds {
    fn default() -> Self {
        Self {
            swing: 125.0,
            hit: 700.0,
        }
    }
}

/// Classifies one sample against the thresholds.
///
/// Intensity is `ax² + az²`: the y axis is excluded because the board is
/// mounted sideways along the blade, and the squared magnitude is compared
/// against squared thresholds to skip the square root. Comparisons are
/// strict, so a value exactly at a threshold falls into the lower class.
#[must_use]
pub fn classify(ax: f32, _ay: f32, az: f32, thresholds: MotionThresholds) -> MotionClass {
    let intensity = ax * ax + az * az;
    if intensity > thresholds.hit {
        MotionClass::Hit
    } else if intensity > thresholds.swing {
        MotionClass::Swing
    } else {
        MotionClass::Quiet
    }
}
