//! Core data types for the touch pattern engine.
//!
//! This module defines the fundamental types used throughout the touch
//! analysis pipeline: raw samples as they arrive from the host input system,
//! sealed gesture patterns, the derived characteristics vector, and the
//! final classification profile.
//!
//! Design principle: samples and sealed patterns are immutable values.
//! Characteristics and profiles are always recomputed from the full pattern
//! history, never patched in place.

use serde::{Deserialize, Serialize};

/// Action code attached to a touch sample.
///
/// Mirrors the masked action values reported by common mobile input stacks
/// (0 = down, 1 = up, 2 = move, 3 = cancel). Anything else is preserved as
/// `Other` and ignored by the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchAction {
    Down,
    Move,
    Up,
    Cancel,
    Other(i32),
}

impl TouchAction {
    /// Decode a raw action code. The pointer index bits are masked off.
    pub fn from_code(code: i32) -> Self {
        match code & 0xff {
            0 => TouchAction::Down,
            1 => TouchAction::Up,
            2 => TouchAction::Move,
            3 => TouchAction::Cancel,
            other => TouchAction::Other(other),
        }
    }

    /// Raw action code for this action.
    pub fn code(&self) -> i32 {
        match self {
            TouchAction::Down => 0,
            TouchAction::Up => 1,
            TouchAction::Move => 2,
            TouchAction::Cancel => 3,
            TouchAction::Other(code) => *code,
        }
    }

    /// Gesture lifecycle phase for this action, if it takes part in one.
    pub fn phase(&self) -> Option<GesturePhase> {
        match self {
            TouchAction::Down => Some(GesturePhase::Start),
            TouchAction::Move => Some(GesturePhase::Continue),
            TouchAction::Up => Some(GesturePhase::End),
            TouchAction::Cancel => Some(GesturePhase::Cancel),
            TouchAction::Other(_) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TouchAction::Down => "DOWN",
            TouchAction::Move => "MOVE",
            TouchAction::Up => "UP",
            TouchAction::Cancel => "CANCEL",
            TouchAction::Other(_) => "OTHER",
        }
    }
}

/// Abstract gesture lifecycle step derived from a sample's action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GesturePhase {
    /// Contact begins; a new pattern buffer opens.
    Start,
    /// Contact continues; the sample extends the open buffer.
    Continue,
    /// Contact ends; the open buffer is sealed into a pattern.
    End,
    /// Contact aborted by the host; the open buffer is discarded.
    Cancel,
}

/// Kind of tool producing the contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    #[default]
    Unknown,
    Finger,
    Stylus,
    Mouse,
    Eraser,
}

impl ToolType {
    /// Decode a raw tool type code (0 unknown, 1 finger, 2 stylus, 3 mouse, 4 eraser).
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => ToolType::Finger,
            2 => ToolType::Stylus,
            3 => ToolType::Mouse,
            4 => ToolType::Eraser,
            _ => ToolType::Unknown,
        }
    }
}

/// Screen edges touched by a contact, as a bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeFlags(pub u32);

impl EdgeFlags {
    pub const TOP: u32 = 0x01;
    pub const BOTTOM: u32 = 0x02;
    pub const LEFT: u32 = 0x04;
    pub const RIGHT: u32 = 0x08;

    pub fn contains(&self, flag: u32) -> bool {
        self.0 & flag != 0
    }

    /// Names of the touched edges, in top/bottom/left/right order.
    pub fn edges(&self) -> Vec<&'static str> {
        let mut edges = Vec::new();
        if self.contains(Self::TOP) {
            edges.push("top");
        }
        if self.contains(Self::BOTTOM) {
            edges.push("bottom");
        }
        if self.contains(Self::LEFT) {
            edges.push("left");
        }
        if self.contains(Self::RIGHT) {
            edges.push("right");
        }
        edges
    }
}

/// A point on the touch surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TouchPoint {
    pub x: f32,
    pub y: f32,
}

impl TouchPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &TouchPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Bearing of the segment from `self` to `other`, in radians.
    pub fn bearing_to(&self, other: &TouchPoint) -> f32 {
        let dx = (other.x - self.x) as f64;
        let dy = (other.y - self.y) as f64;
        dy.atan2(dx) as f32
    }
}

/// A single raw pointer-contact report.
///
/// This is the minimal input contract: position, contact geometry, and the
/// two timestamps the host reports for every event. Nothing here is
/// validated; out-of-order timestamps are accepted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchSample {
    pub x: f32,
    pub y: f32,

    /// Reported pressure. Usually [0, 1] but device ranges vary.
    #[serde(default)]
    pub pressure: f32,

    /// Length of the major axis of the contact ellipse, in pixels.
    #[serde(default)]
    pub touch_major: f32,

    /// Length of the minor axis of the contact ellipse, in pixels.
    #[serde(default)]
    pub touch_minor: f32,

    /// Normalized contact size reported by the device.
    #[serde(default)]
    pub size: f32,

    #[serde(default)]
    pub tool_type: ToolType,

    #[serde(default)]
    pub orientation: f32,

    /// Time of this event in milliseconds.
    pub event_time_ms: u64,

    /// Time the current contact went down, in milliseconds.
    pub down_time_ms: u64,

    pub action: TouchAction,

    #[serde(default = "default_pointer_count")]
    pub pointer_count: u32,

    #[serde(default)]
    pub edge_flags: EdgeFlags,
}

fn default_pointer_count() -> u32 {
    1
}

impl TouchSample {
    /// Creates a sample with position, pressure and size only.
    ///
    /// Geometry fields default to zero and the tool to `Finger`.
    pub fn new(
        action: TouchAction,
        x: f32,
        y: f32,
        pressure: f32,
        size: f32,
        event_time_ms: u64,
        down_time_ms: u64,
    ) -> Self {
        Self {
            x,
            y,
            pressure,
            touch_major: 0.0,
            touch_minor: 0.0,
            size,
            tool_type: ToolType::Finger,
            orientation: 0.0,
            event_time_ms,
            down_time_ms,
            action,
            pointer_count: 1,
            edge_flags: EdgeFlags::default(),
        }
    }

    /// Sets the contact ellipse axes.
    pub fn with_contact_axes(mut self, touch_major: f32, touch_minor: f32) -> Self {
        self.touch_major = touch_major;
        self.touch_minor = touch_minor;
        self
    }

    pub fn position(&self) -> TouchPoint {
        TouchPoint::new(self.x, self.y)
    }

    /// Approximate contact area in px², treating the contact as an ellipse.
    pub fn contact_area(&self) -> f32 {
        self.touch_major * self.touch_minor * std::f32::consts::PI / 4.0
    }
}

/// One complete down-to-up gesture.
///
/// Built incrementally by the collector and sealed at the up action. The
/// per-sample vectors `positions`, `pressures` and `touch_sizes` have one
/// entry per ingested sample; `velocities` has one entry per sample after
/// the seeding contact-start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchPattern {
    pub down_time_ms: u64,
    pub up_time_ms: u64,
    pub duration_ms: u64,

    /// Time since the previous pattern's down time, if there was one.
    pub tap_interval_ms: Option<u64>,

    pub positions: Vec<TouchPoint>,
    pub pressures: Vec<f32>,
    pub touch_sizes: Vec<f32>,

    /// Velocity vectors [vx, vy] in px/s.
    pub velocities: Vec<[f32; 2]>,
}

impl TouchPattern {
    /// Total traveled distance along the recorded path.
    pub fn path_length(&self) -> f32 {
        self.positions
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum()
    }

    /// Straight-line distance from the first to the last position.
    pub fn direct_distance(&self) -> f32 {
        match (self.positions.first(), self.positions.last()) {
            (Some(first), Some(last)) => first.distance_to(last),
            _ => 0.0,
        }
    }
}

/// Aggregate feature vector over every pattern of a session.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TouchCharacteristics {
    pub avg_pressure: f32,
    pub pressure_variance: f32,
    /// px/s
    pub avg_speed: f32,
    /// px/s
    pub max_speed: f32,
    pub avg_touch_size: f32,
    /// ms, truncated
    pub avg_tap_duration_ms: u64,
    /// Mean absolute bearing change, radians.
    pub tremor: f32,
    pub drag_smoothness: f32,
    pub total_distance: f32,
    pub direct_distance: f32,
    pub path_efficiency: f32,
    /// Number of patterns the vector was derived from.
    pub pattern_count: usize,
}

/// Per-feature scores on the 1.0 / 0.7 / 0.4 / 0.0 ladder.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureScores {
    pub speed: f32,
    pub tap_duration: f32,
    pub touch_size: f32,
    pub tremor: f32,
    pub path_efficiency: f32,
    pub pressure_variance: f32,
}

impl FeatureScores {
    pub fn as_array(&self) -> [f32; 6] {
        [
            self.speed,
            self.tap_duration,
            self.touch_size,
            self.tremor,
            self.path_efficiency,
            self.pressure_variance,
        ]
    }

    /// Unweighted mean of the six scores.
    pub fn mean(&self) -> f32 {
        let scores = self.as_array();
        scores.iter().sum::<f32>() / scores.len() as f32
    }
}

/// Classification result for one analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElderlyTouchProfile {
    pub is_likely_elderly: bool,
    /// Confidence in [0.0, 1.0].
    pub confidence: f32,
    pub scores: FeatureScores,
    pub characteristics: TouchCharacteristics,
    /// De-duplicated, in emission order.
    pub recommendations: Vec<String>,
}

impl ElderlyTouchProfile {
    /// Profile for a session that produced no patterns: confidence 0, not
    /// elderly, no recommendations.
    pub fn no_evidence() -> Self {
        Self {
            is_likely_elderly: false,
            confidence: 0.0,
            scores: FeatureScores::default(),
            characteristics: TouchCharacteristics::default(),
            recommendations: Vec::new(),
        }
    }
}
