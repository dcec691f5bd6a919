//! Feature extraction over collected touch patterns.
//!
//! Computes the `TouchCharacteristics` vector from the full pattern history
//! of a session. Every call recomputes from scratch; nothing is cached or
//! updated incrementally.
//!
//! Degenerate input never fails. An empty history yields an all-zero
//! vector. Missing drags or zero traveled distance fall back to the
//! "smooth" and "efficient" defaults.

use crate::types::{TouchCharacteristics, TouchPattern};

/// Patterns need more than this many positions to count as a drag for
/// smoothness.
pub const DRAG_MIN_POSITIONS: usize = 5;

/// Patterns need at least this many positions to have an interior point
/// for tremor.
pub const TREMOR_MIN_POSITIONS: usize = 3;

/// Stateless feature extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Computes characteristics over every pattern.
    pub fn extract(&self, patterns: &[TouchPattern]) -> TouchCharacteristics {
        if patterns.is_empty() {
            return TouchCharacteristics::default();
        }

        let pressures: Vec<f32> = patterns.iter().flat_map(|p| p.pressures.iter().copied()).collect();
        let speeds: Vec<f32> = patterns
            .iter()
            .flat_map(|p| p.velocities.iter())
            .map(|[vx, vy]| (vx * vx + vy * vy).sqrt())
            .collect();
        let sizes: Vec<f32> = patterns.iter().flat_map(|p| p.touch_sizes.iter().copied()).collect();

        let avg_tap_duration_ms = {
            let total: f64 = patterns.iter().map(|p| p.duration_ms as f64).sum();
            (total / patterns.len() as f64) as u64
        };

        let (total_distance, direct_distance) = distances(patterns);
        let path_efficiency = if total_distance > 0.0 {
            direct_distance / total_distance
        } else {
            1.0
        };

        TouchCharacteristics {
            avg_pressure: mean(&pressures),
            pressure_variance: variance(&pressures),
            avg_speed: mean(&speeds),
            max_speed: speeds.iter().copied().fold(0.0, f32::max),
            avg_touch_size: mean(&sizes),
            avg_tap_duration_ms,
            tremor: tremor(patterns),
            drag_smoothness: drag_smoothness(patterns),
            total_distance,
            direct_distance,
            path_efficiency,
            pattern_count: patterns.len(),
        }
    }
}

/// Arithmetic mean; zero for an empty slice.
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    (values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64) as f32
}

/// Population variance; zero for an empty slice.
pub fn variance(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values
        .iter()
        .map(|&v| {
            let d = (v - m) as f64;
            d * d
        })
        .sum();
    (sum_sq / values.len() as f64) as f32
}

/// Mean absolute bearing change at interior path points.
///
/// The raw difference of two `atan2` bearings is used, without wrapping
/// into (-π, π]. A path crossing the ±π seam therefore reads as a large
/// deviation.
pub fn tremor(patterns: &[TouchPattern]) -> f32 {
    let mut total = 0.0f64;
    let mut count = 0usize;

    for pattern in patterns.iter().filter(|p| p.positions.len() >= TREMOR_MIN_POSITIONS) {
        for triple in pattern.positions.windows(3) {
            let before = triple[0].bearing_to(&triple[1]);
            let after = triple[1].bearing_to(&triple[2]);
            total += (after - before).abs() as f64;
            count += 1;
        }
    }

    if count > 0 {
        (total / count as f64) as f32
    } else {
        0.0
    }
}

/// Mean step-uniformity over drag patterns.
///
/// Per drag: `1 / (1 + variance(steps) / mean(steps))`. Defaults to 1
/// when no pattern qualifies as a drag.
pub fn drag_smoothness(patterns: &[TouchPattern]) -> f32 {
    let drags: Vec<&TouchPattern> = patterns
        .iter()
        .filter(|p| p.positions.len() > DRAG_MIN_POSITIONS)
        .collect();
    if drags.is_empty() {
        return 1.0;
    }

    let total: f32 = drags
        .iter()
        .map(|pattern| {
            let steps: Vec<f32> = pattern
                .positions
                .windows(2)
                .map(|pair| pair[0].distance_to(&pair[1]))
                .collect();
            let step_mean = mean(&steps);
            if step_mean <= 0.0 {
                // Held in place: every step is identical.
                1.0
            } else {
                1.0 / (1.0 + variance(&steps) / step_mean)
            }
        })
        .sum();

    total / drags.len() as f32
}

/// Returns (total traveled, summed first-to-last) distance.
pub fn distances(patterns: &[TouchPattern]) -> (f32, f32) {
    patterns
        .iter()
        .filter(|p| p.positions.len() >= 2)
        .fold((0.0, 0.0), |(total, direct), p| {
            (total + p.path_length(), direct + p.direct_distance())
        })
}
