//! Elderly-interaction likelihood classifier.
//!
//! Maps a `TouchCharacteristics` vector to an `ElderlyTouchProfile` by
//! scoring six features independently on a fixed ladder (1.0 / 0.7 / 0.4 /
//! 0.0), averaging the scores into a confidence, and thresholding it.
//!
//! Simple rule-based classifier. Every input produces a profile; there is
//! no failure state.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{ElderlyTouchProfile, FeatureScores, TouchCharacteristics};

/// Score ladder values, strongest tier first.
pub const TIER_SCORES: [f32; 4] = [1.0, 0.7, 0.4, 0.0];

/// Which side of the threshold indicates an elderly interaction pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Values above the threshold score high (tap duration, tremor...).
    Higher,
    /// Values below the threshold score high (speed, path efficiency).
    Lower,
}

/// Scoring rule for one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRule {
    /// Base threshold for the 1.0 tier.
    pub threshold: f32,
    pub direction: Direction,
    /// Multipliers on `threshold` for the 0.7 and 0.4 tiers.
    pub tier_factors: [f32; 2],
    /// Advisories emitted when this feature scores above the advisory level.
    pub advisories: Vec<String>,
}

impl FeatureRule {
    fn new(threshold: f32, direction: Direction, tier_factors: [f32; 2], advisories: &[&str]) -> Self {
        Self {
            threshold,
            direction,
            tier_factors,
            advisories: advisories.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Ladder score for a value.
    pub fn score(&self, value: f32) -> f32 {
        let bounds = [
            self.threshold,
            self.threshold * self.tier_factors[0],
            self.threshold * self.tier_factors[1],
        ];
        let hit = |bound: f32| match self.direction {
            Direction::Higher => value > bound,
            Direction::Lower => value < bound,
        };
        bounds
            .iter()
            .position(|&bound| hit(bound))
            .map(|tier| TIER_SCORES[tier])
            .unwrap_or(TIER_SCORES[3])
    }
}

/// Configuration for the elderly classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Average speed in px/s.
    pub speed: FeatureRule,
    /// Average tap duration in ms.
    pub tap_duration: FeatureRule,
    /// Average normalized contact size.
    pub touch_size: FeatureRule,
    /// Mean bearing change in radians.
    pub tremor: FeatureRule,
    /// Direct over traveled distance.
    pub path_efficiency: FeatureRule,
    /// Population variance of pressure.
    pub pressure_variance: FeatureRule,

    /// A feature must score strictly above this to emit its advisories.
    pub advisory_score: f32,
    /// Confidence must be strictly above this to classify as elderly.
    pub elderly_confidence: f32,
    /// Advisories appended when the overall classification is elderly.
    pub general_advisories: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            speed: FeatureRule::new(
                100.0,
                Direction::Lower,
                [2.0, 3.0],
                &["Consider increasing touch target sizes for easier interaction"],
            ),
            tap_duration: FeatureRule::new(
                200.0,
                Direction::Higher,
                [0.75, 0.5],
                &["Extend tap recognition time to accommodate longer presses"],
            ),
            touch_size: FeatureRule::new(
                0.3,
                Direction::Higher,
                [0.8, 0.6],
                &["Adjust touch sensitivity for larger contact areas"],
            ),
            tremor: FeatureRule::new(
                0.5,
                Direction::Higher,
                [0.7, 0.5],
                &[
                    "Implement tremor filtering for more stable interactions",
                    "Consider gesture simplification",
                ],
            ),
            path_efficiency: FeatureRule::new(
                0.7,
                Direction::Lower,
                [1.2, 1.4],
                &["Enable gesture assistance for drag operations"],
            ),
            pressure_variance: FeatureRule::new(
                0.2,
                Direction::Higher,
                [0.7, 0.5],
                &["Normalize pressure sensitivity for consistent recognition"],
            ),
            advisory_score: 0.7,
            elderly_confidence: 0.6,
            general_advisories: [
                "Enable high contrast mode for better visibility",
                "Increase font sizes system-wide",
                "Reduce animation speeds",
                "Enable haptic feedback for touch confirmation",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Rule-based elderly classifier.
#[derive(Debug, Clone, Default)]
pub struct ElderlyClassifier {
    config: ClassifierConfig,
}

impl ElderlyClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Scores each feature on its ladder.
    pub fn score(&self, c: &TouchCharacteristics) -> FeatureScores {
        FeatureScores {
            speed: self.config.speed.score(c.avg_speed),
            tap_duration: self.config.tap_duration.score(c.avg_tap_duration_ms as f32),
            touch_size: self.config.touch_size.score(c.avg_touch_size),
            tremor: self.config.tremor.score(c.tremor),
            path_efficiency: self.config.path_efficiency.score(c.path_efficiency),
            pressure_variance: self.config.pressure_variance.score(c.pressure_variance),
        }
    }

    /// Produces a profile for a characteristics vector.
    ///
    /// Every vector is scored as given. A session without patterns has no
    /// vector to score; see `ElderlyTouchProfile::no_evidence`.
    pub fn classify(&self, characteristics: &TouchCharacteristics) -> ElderlyTouchProfile {
        let scores = self.score(characteristics);
        let confidence = scores.mean();
        let is_likely_elderly = confidence > self.config.elderly_confidence;

        let mut recommendations: Vec<String> = Vec::new();
        let rules = [
            (scores.speed, &self.config.speed),
            (scores.tap_duration, &self.config.tap_duration),
            (scores.touch_size, &self.config.touch_size),
            (scores.tremor, &self.config.tremor),
            (scores.path_efficiency, &self.config.path_efficiency),
            (scores.pressure_variance, &self.config.pressure_variance),
        ];
        for (score, rule) in rules {
            if score > self.config.advisory_score {
                recommendations.extend(rule.advisories.iter().cloned());
            }
        }
        if is_likely_elderly {
            recommendations.extend(self.config.general_advisories.iter().cloned());
        }

        debug!(confidence, is_likely_elderly, "touch profile classified");

        ElderlyTouchProfile {
            is_likely_elderly,
            confidence,
            scores,
            characteristics: *characteristics,
            recommendations: dedup_preserving_order(recommendations),
        }
    }
}

/// Removes repeated entries, keeping the first occurrence of each.
pub fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
