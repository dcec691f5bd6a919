//! Touch Pattern Engine Library
//!
//! Infers whether the person operating a touchscreen is likely an older
//! adult from how they touch: how fast they move, how long they hold a tap,
//! how large and how steady the contact is, how direct their drags are and
//! how consistent their pressure is.
//!
//! # Pipeline
//!
//! - **Collection** (`collector`): touch samples are gated into a timed
//!   session and grouped into down-to-up patterns.
//! - **Feature extraction** (`features`): a session's patterns reduce to a
//!   `TouchCharacteristics` vector.
//! - **Classification** (`classifier`): each feature is scored on a graded
//!   ladder; the mean score is the confidence and drives the recommendations.
//!
//! `pipeline::TouchAnalysisPipeline` wires the three together. `ffi` exposes
//! the same session over a C ABI.
//!
//! # Example
//!
//! ```
//! use touch_pattern::{TouchAction, TouchAnalysisPipeline, TouchSample};
//!
//! let mut pipeline = TouchAnalysisPipeline::default();
//! pipeline.submit(&TouchSample::new(TouchAction::Down, 10.0, 10.0, 0.5, 0.2, 1000, 1000));
//! pipeline.submit(&TouchSample::new(TouchAction::Up, 10.0, 10.0, 0.5, 0.2, 1250, 1000));
//!
//! let profile = pipeline.stop();
//! assert_eq!(profile.characteristics.pattern_count, 1);
//! assert_eq!(profile.characteristics.avg_tap_duration_ms, 250);
//! ```

pub mod classifier;
pub mod collector;
pub mod config;
pub mod error;
pub mod export;
pub mod features;
pub mod ffi;
pub mod pipeline;
pub mod pressure;
pub mod report;
pub mod trace;
pub mod types;
pub mod velocity;


// Re-export commonly used types
pub use classifier::{ClassifierConfig, ElderlyClassifier};
pub use collector::{CollectorConfig, PatternCollector, SubmitOutcome};
pub use config::AnalyzerConfig;
pub use error::{Error, Result};
pub use features::FeatureExtractor;
pub use pipeline::TouchAnalysisPipeline;
pub use types::{
    ElderlyTouchProfile, FeatureScores, TouchAction, TouchCharacteristics, TouchPattern,
    TouchPoint, TouchSample,
};
