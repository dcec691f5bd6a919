//! Analyzer configuration.
//!
//! Bundles the collector, pressure and classifier settings into a single
//! TOML-loadable document. Every section has working defaults, so an empty
//! file is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classifier::{ClassifierConfig, FeatureRule};
use crate::collector::CollectorConfig;
use crate::error::{Error, Result};
use crate::pressure::PressureMode;

/// Top-level analyzer configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Identifier used in exported session ids.
    pub device_id: String,
    pub collector: CollectorConfig,
    pub classifier: ClassifierConfig,
}

impl AnalyzerConfig {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.collector.velocity.horizon_ms == 0 {
            return Err(Error::Config("velocity.horizon_ms must be > 0".to_string()));
        }
        if self.collector.velocity.max_samples < 2 {
            return Err(Error::Config(format!(
                "velocity.max_samples must be >= 2, got {}",
                self.collector.velocity.max_samples
            )));
        }
        match self.collector.pressure {
            PressureMode::Range { min, max } if !(max > min) => {
                return Err(Error::Config(format!(
                    "pressure range must have max > min, got [{}, {}]",
                    min, max
                )));
            }
            PressureMode::ContactArea { min_area, max_area } if !(max_area > min_area) || min_area < 0.0 => {
                return Err(Error::Config(format!(
                    "contact area range must satisfy 0 <= min < max, got [{}, {}]",
                    min_area, max_area
                )));
            }
            _ => {}
        }

        let classifier = &self.classifier;
        for (name, rule) in [
            ("speed", &classifier.speed),
            ("tap_duration", &classifier.tap_duration),
            ("touch_size", &classifier.touch_size),
            ("tremor", &classifier.tremor),
            ("path_efficiency", &classifier.path_efficiency),
            ("pressure_variance", &classifier.pressure_variance),
        ] {
            validate_rule(name, rule)?;
        }
        if !(0.0..=1.0).contains(&classifier.advisory_score) {
            return Err(Error::Config(format!(
                "advisory_score must be in [0, 1], got {}",
                classifier.advisory_score
            )));
        }
        if !(0.0..=1.0).contains(&classifier.elderly_confidence) {
            return Err(Error::Config(format!(
                "elderly_confidence must be in [0, 1], got {}",
                classifier.elderly_confidence
            )));
        }
        Ok(())
    }

    /// Load config from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse config from a TOML string. Does not validate.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

fn validate_rule(name: &str, rule: &FeatureRule) -> Result<()> {
    if !rule.threshold.is_finite() || rule.threshold <= 0.0 {
        return Err(Error::Config(format!(
            "{}.threshold must be finite and > 0, got {}",
            name, rule.threshold
        )));
    }
    if rule.tier_factors.iter().any(|f| !f.is_finite() || *f <= 0.0) {
        return Err(Error::Config(format!(
            "{}.tier_factors must be finite and > 0, got {:?}",
            name, rule.tier_factors
        )));
    }
    Ok(())
}
