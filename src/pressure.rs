//! Pressure normalization.
//!
//! Reported pressure is not comparable across devices: some report a
//! calibrated [0, 1] value, some use a wider device range, and many
//! capacitive panels report a constant. The normalizer maps a sample's
//! pressure onto [0, 1] according to the configured mode.

use serde::{Deserialize, Serialize};

use crate::types::TouchSample;

/// How a sample's pressure value is derived.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PressureMode {
    /// Use the reported value unchanged.
    #[default]
    Reported,
    /// Rescale from the device-reported range.
    Range { min: f32, max: f32 },
    /// Estimate from the contact ellipse area. Harder presses flatten the
    /// fingertip and widen the contact.
    ContactArea { min_area: f32, max_area: f32 },
}

/// Floor of the contact-area estimate (a very light touch).
pub const CONTACT_AREA_FLOOR: f32 = 0.1;

/// Default area (px²) at or below which the estimate is the floor.
pub const DEFAULT_MIN_CONTACT_AREA: f32 = 3.0;

/// Default area (px²) at or above which the estimate saturates at 1.0.
pub const DEFAULT_MAX_CONTACT_AREA: f32 = 50.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct PressureNormalizer {
    mode: PressureMode,
}

impl PressureNormalizer {
    pub fn new(mode: PressureMode) -> Self {
        Self { mode }
    }

    /// Normalized pressure for a sample.
    pub fn normalize(&self, sample: &TouchSample) -> f32 {
        match self.mode {
            PressureMode::Reported => sample.pressure,
            PressureMode::Range { min, max } => normalize_range(sample.pressure, min, max),
            PressureMode::ContactArea { min_area, max_area } => {
                estimate_from_area(sample.contact_area(), min_area, max_area)
            }
        }
    }
}

/// Rescales `raw` from [min, max] to [0, 1].
///
/// Ranges that are empty, inverted, or already end at 1.0 pass the raw
/// value through.
pub fn normalize_range(raw: f32, min: f32, max: f32) -> f32 {
    if max > min && max != 1.0 {
        (raw - min) / (max - min)
    } else {
        raw
    }
}

/// Maps a contact area to a pressure estimate in [0.1, 1.0].
///
/// The square root lifts mid-range presses so that a normal touch lands
/// around the middle of the scale.
pub fn estimate_from_area(area: f32, min_area: f32, max_area: f32) -> f32 {
    if area <= min_area {
        CONTACT_AREA_FLOOR
    } else if area >= max_area {
        1.0
    } else {
        let normalized = (area - min_area) / (max_area - min_area);
        CONTACT_AREA_FLOOR + normalized.sqrt() * (1.0 - CONTACT_AREA_FLOOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TouchAction;

    fn sample_with(pressure: f32, major: f32, minor: f32) -> TouchSample {
        TouchSample::new(TouchAction::Down, 0.0, 0.0, pressure, 0.1, 0, 0)
            .with_contact_axes(major, minor)
    }

    #[test]
    fn test_reported_passthrough() {
        let normalizer = PressureNormalizer::default();
        assert_eq!(normalizer.normalize(&sample_with(0.42, 0.0, 0.0)), 0.42);
    }

    #[test]
    fn test_range_normalization() {
        assert!((normalize_range(512.0, 0.0, 1024.0) - 0.5).abs() < 1e-6);
        assert!((normalize_range(3.0, 1.0, 5.0) - 0.5).abs() < 1e-6);
        // Max of 1.0 means already normalized
        assert_eq!(normalize_range(0.7, 0.0, 1.0), 0.7);
        // Degenerate range
        assert_eq!(normalize_range(0.7, 2.0, 2.0), 0.7);
    }

    #[test]
    fn test_area_estimate_clamps() {
        assert_eq!(estimate_from_area(0.0, 3.0, 50.0), CONTACT_AREA_FLOOR);
        assert_eq!(estimate_from_area(3.0, 3.0, 50.0), CONTACT_AREA_FLOOR);
        assert_eq!(estimate_from_area(50.0, 3.0, 50.0), 1.0);
        assert_eq!(estimate_from_area(500.0, 3.0, 50.0), 1.0);
    }

    #[test]
    fn test_area_estimate_curve() {
        // Quarter of the way through the range -> sqrt(0.25) = 0.5
        let area = 3.0 + 47.0 * 0.25;
        let estimate = estimate_from_area(area, 3.0, 50.0);
        assert!((estimate - (0.1 + 0.5 * 0.9)).abs() < 1e-5);

        let lighter = estimate_from_area(10.0, 3.0, 50.0);
        let harder = estimate_from_area(30.0, 3.0, 50.0);
        assert!(lighter < harder);
    }

    #[test]
    fn test_contact_area_mode() {
        let normalizer = PressureNormalizer::new(PressureMode::ContactArea {
            min_area: DEFAULT_MIN_CONTACT_AREA,
            max_area: DEFAULT_MAX_CONTACT_AREA,
        });
        // Tiny contact, reported pressure is ignored
        assert_eq!(normalizer.normalize(&sample_with(0.9, 1.0, 1.0)), CONTACT_AREA_FLOOR);
        // 10 x 10 ellipse is ~78.5 px², saturates
        assert_eq!(normalizer.normalize(&sample_with(0.1, 10.0, 10.0)), 1.0);
    }

    #[test]
    fn test_mode_serde_tagging() {
        let mode: PressureMode =
            serde_json::from_str(r#"{"mode":"range","min":0.0,"max":4096.0}"#).unwrap();
        assert_eq!(mode, PressureMode::Range { min: 0.0, max: 4096.0 });
    }
}
