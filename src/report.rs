//! Plain-text reports for touch profiles.
//!
//! Percentages are truncated toward zero, not rounded.

use std::fmt;

use crate::types::ElderlyTouchProfile;

/// Full multi-section report: assessment, characteristics, recommendations.
pub struct DetailedReport<'a>(pub &'a ElderlyTouchProfile);

impl fmt::Display for DetailedReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let profile = self.0;
        let c = &profile.characteristics;

        writeln!(f, "=== Touch Pattern Analysis Report ===")?;
        writeln!(f)?;
        writeln!(f, "Overall Assessment:")?;
        writeln!(
            f,
            "- Elderly User Likelihood: {}",
            if profile.is_likely_elderly { "High" } else { "Low" }
        )?;
        writeln!(f, "- Confidence Score: {}%", percent(profile.confidence))?;
        writeln!(f)?;
        writeln!(f, "Touch Characteristics:")?;
        writeln!(f, "- Average Touch Speed: {} px/s", c.avg_speed as i64)?;
        writeln!(f, "- Average Tap Duration: {} ms", c.avg_tap_duration_ms)?;
        writeln!(f, "- Average Touch Size: {:.2}", c.avg_touch_size)?;
        writeln!(f, "- Tremor Level: {:.2}", c.tremor)?;
        writeln!(f, "- Path Efficiency: {}%", percent(c.path_efficiency))?;
        writeln!(f, "- Pressure Variance: {:.2}", c.pressure_variance)?;
        writeln!(f)?;
        writeln!(f, "Recommendations:")?;
        for (index, recommendation) in profile.recommendations.iter().enumerate() {
            writeln!(f, "{}. {}", index + 1, recommendation)?;
        }
        Ok(())
    }
}

/// Short summary shown when a collection session ends.
pub struct Summary<'a>(pub &'a ElderlyTouchProfile);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let profile = self.0;
        let c = &profile.characteristics;

        writeln!(f, "Analysis Complete!")?;
        writeln!(
            f,
            "Elderly User: {}",
            if profile.is_likely_elderly { "Yes" } else { "No" }
        )?;
        writeln!(f, "Confidence: {}%", percent(profile.confidence))?;
        writeln!(f)?;
        writeln!(f, "Key Metrics:")?;
        writeln!(f, "Speed: {} px/s", c.avg_speed as i64)?;
        writeln!(f, "Tap Duration: {} ms", c.avg_tap_duration_ms)?;
        writeln!(f, "Tremor: {:.2}", c.tremor)
    }
}

pub fn detailed_report(profile: &ElderlyTouchProfile) -> String {
    DetailedReport(profile).to_string()
}

pub fn summary(profile: &ElderlyTouchProfile) -> String {
    Summary(profile).to_string()
}

fn percent(fraction: f32) -> i64 {
    (fraction * 100.0) as i64
}
