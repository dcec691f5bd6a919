//! Session export.
//!
//! Structured JSON output describing one analysis session: when it ran, the
//! characteristics it produced, the resulting profile and, optionally, the
//! raw patterns. The format is self-contained so a consumer needs nothing
//! else to interpret it.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{ElderlyTouchProfile, TouchCharacteristics, TouchPattern};

/// Schema version of the export document.
pub const EXPORT_SCHEMA_VERSION: u32 = 1;

/// Complete session data for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExport {
    pub schema_version: u32,
    /// Session identifier (device + start time).
    pub session_id: String,
    pub device_id: String,
    pub start_time_ms: u64,
    pub end_time_ms: u64,
    pub duration_ms: u64,
    pub pattern_count: usize,
    pub characteristics: TouchCharacteristics,
    pub profile: ElderlyTouchProfile,
    /// Raw patterns, only when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<TouchPattern>>,
}

impl SessionExport {
    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Builder for session exports.
#[derive(Debug, Clone)]
pub struct SessionExportBuilder {
    device_id: String,
    start_time_ms: u64,
    end_time_ms: u64,
    include_patterns: bool,
}

impl SessionExportBuilder {
    pub fn new(device_id: &str) -> Self {
        Self {
            device_id: if device_id.is_empty() {
                "unknown".to_string()
            } else {
                device_id.to_string()
            },
            start_time_ms: 0,
            end_time_ms: 0,
            include_patterns: false,
        }
    }

    pub fn span(mut self, start_time_ms: u64, end_time_ms: u64) -> Self {
        self.start_time_ms = start_time_ms;
        self.end_time_ms = end_time_ms;
        self
    }

    pub fn include_patterns(mut self, include: bool) -> Self {
        self.include_patterns = include;
        self
    }

    pub fn build(self, patterns: &[TouchPattern], profile: &ElderlyTouchProfile) -> SessionExport {
        SessionExport {
            schema_version: EXPORT_SCHEMA_VERSION,
            session_id: format!("{}-{}", self.device_id, self.start_time_ms),
            start_time_ms: self.start_time_ms,
            end_time_ms: self.end_time_ms,
            duration_ms: self.end_time_ms.saturating_sub(self.start_time_ms),
            pattern_count: patterns.len(),
            characteristics: profile.characteristics,
            profile: profile.clone(),
            patterns: self.include_patterns.then(|| patterns.to_vec()),
            device_id: self.device_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ElderlyClassifier;
    use crate::features::FeatureExtractor;
    use crate::types::TouchPoint;

    fn patterns() -> Vec<TouchPattern> {
        vec![TouchPattern {
            down_time_ms: 1000,
            up_time_ms: 1300,
            duration_ms: 300,
            tap_interval_ms: None,
            positions: vec![TouchPoint::new(0.0, 0.0), TouchPoint::new(4.0, 3.0)],
            pressures: vec![0.4, 0.6],
            touch_sizes: vec![0.3, 0.3],
            velocities: vec![[20.0, 15.0]],
        }]
    }

    fn build(include: bool) -> SessionExport {
        let patterns = patterns();
        let profile = ElderlyClassifier::default().classify(&FeatureExtractor::new().extract(&patterns));
        SessionExportBuilder::new("tablet")
            .span(1000, 4000)
            .include_patterns(include)
            .build(&patterns, &profile)
    }

    #[test]
    fn test_builder_fields() {
        let export = build(false);
        assert_eq!(export.session_id, "tablet-1000");
        assert_eq!(export.duration_ms, 3000);
        assert_eq!(export.pattern_count, 1);
        assert_eq!(export.schema_version, EXPORT_SCHEMA_VERSION);
        assert!(export.patterns.is_none());
    }

    #[test]
    fn test_empty_device_id() {
        let export = SessionExportBuilder::new("").build(&[], &ElderlyTouchProfile::no_evidence());
        assert_eq!(export.device_id, "unknown");
        assert_eq!(export.session_id, "unknown-0");
    }

    #[test]
    fn test_json_omits_patterns_unless_requested() {
        let json = build(false).to_json().unwrap();
        assert!(!json.contains("\"patterns\""));
        assert!(json.contains("\"session_id\":\"tablet-1000\""));

        let json = build(true).to_json().unwrap();
        assert!(json.contains("\"patterns\""));
    }

    #[test]
    fn test_json_parses_back() {
        let export = build(true);
        let parsed = SessionExport::from_json(&export.to_pretty_json().unwrap()).unwrap();
        assert_eq!(parsed, export);
    }

    #[test]
    fn test_json_value_shape() {
        let value: serde_json::Value = serde_json::from_str(&build(false).to_json().unwrap()).unwrap();
        assert!(value["profile"]["recommendations"].is_array());
        assert_eq!(value["characteristics"]["pattern_count"], 1);
        assert_eq!(value["characteristics"]["avg_tap_duration_ms"], 300);
    }
}
