/// Touch analysis pipeline integrating collection, feature extraction and
/// classification behind one session object.
///
/// # Architecture
///
/// 1. **Collection**: `PatternCollector` gates samples into sessions and
///    seals gestures into patterns
/// 2. **Feature extraction**: `FeatureExtractor` reduces the session's
///    patterns to `TouchCharacteristics`
/// 3. **Classification**: `ElderlyClassifier` scores the characteristics
///    into an `ElderlyTouchProfile`
///
/// A profile is produced whenever a session finishes, either because its
/// time limit elapsed or because the host stopped it. Nothing here can
/// fail; degenerate input yields a default profile.
use tracing::info;

use crate::classifier::ElderlyClassifier;
use crate::collector::{PatternCollector, SubmitOutcome};
use crate::config::AnalyzerConfig;
use crate::export::{SessionExport, SessionExportBuilder};
use crate::features::FeatureExtractor;
use crate::report;
use crate::types::{ElderlyTouchProfile, TouchCharacteristics, TouchPattern, TouchSample};

/// Session-scoped touch analysis.
pub struct TouchAnalysisPipeline {
    config: AnalyzerConfig,

    // Processing stages
    collector: PatternCollector,
    extractor: FeatureExtractor,
    classifier: ElderlyClassifier,

    // Session span
    session_start_ms: Option<u64>,
    last_event_ms: u64,

    // Diagnostics
    sessions_completed: u64,
}

impl TouchAnalysisPipeline {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            collector: PatternCollector::new(config.collector),
            extractor: FeatureExtractor::new(),
            classifier: ElderlyClassifier::new(config.classifier.clone()),
            config,
            session_start_ms: None,
            last_event_ms: 0,
            sessions_completed: 0,
        }
    }

    /// Feeds one sample.
    ///
    /// Returns the finished profile when this sample arrives after the
    /// session time limit. The sample itself is then handled against the
    /// closed session, so a contact start opens the next one.
    pub fn submit(&mut self, sample: &TouchSample) -> Option<ElderlyTouchProfile> {
        let finished = if self.collector.poll(sample.event_time_ms) {
            Some(self.finish("expired"))
        } else {
            None
        };

        let outcome = self.collector.submit(sample);
        if outcome == SubmitOutcome::SessionStarted {
            self.session_start_ms = self.collector.session_started_ms();
        }
        if self.collector.is_collecting() {
            self.last_event_ms = self.last_event_ms.max(sample.event_time_ms);
        }
        finished
    }

    /// Checks the session deadline at `now_ms` without a sample.
    pub fn poll(&mut self, now_ms: u64) -> Option<ElderlyTouchProfile> {
        if self.collector.poll(now_ms) {
            Some(self.finish("expired"))
        } else {
            None
        }
    }

    /// Stops collection and returns the profile of the collected patterns.
    ///
    /// Stopping an idle pipeline returns the profile of the most recent
    /// session again.
    pub fn stop(&mut self) -> ElderlyTouchProfile {
        if self.collector.stop() {
            self.finish("stopped")
        } else {
            self.profile()
        }
    }

    /// Drops all collected patterns and returns to idle.
    pub fn reset(&mut self) {
        self.collector.reset();
        self.session_start_ms = None;
        self.last_event_ms = 0;
    }

    /// Characteristics of the current (or most recent) session.
    pub fn characteristics(&self) -> TouchCharacteristics {
        self.extractor.extract(self.collector.patterns())
    }

    /// Profile of the current (or most recent) session.
    ///
    /// A session without sealed patterns carries no evidence and yields
    /// `ElderlyTouchProfile::no_evidence`.
    pub fn profile(&self) -> ElderlyTouchProfile {
        if self.collector.patterns().is_empty() {
            return ElderlyTouchProfile::no_evidence();
        }
        self.classifier.classify(&self.characteristics())
    }

    /// Detailed plain-text report.
    pub fn report(&self) -> String {
        report::detailed_report(&self.profile())
    }

    /// Short plain-text summary.
    pub fn summary(&self) -> String {
        report::summary(&self.profile())
    }

    /// Structured export of the current (or most recent) session.
    pub fn export(&self, include_patterns: bool) -> SessionExport {
        let start = self.session_start_ms.unwrap_or(0);
        SessionExportBuilder::new(&self.config.device_id)
            .span(start, self.last_event_ms.max(start))
            .include_patterns(include_patterns)
            .build(self.collector.patterns(), &self.profile())
    }

    pub fn patterns(&self) -> &[TouchPattern] {
        self.collector.patterns()
    }

    pub fn is_collecting(&self) -> bool {
        self.collector.is_collecting()
    }

    pub fn collector(&self) -> &PatternCollector {
        &self.collector
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn sessions_completed(&self) -> u64 {
        self.sessions_completed
    }

    fn finish(&mut self, reason: &str) -> ElderlyTouchProfile {
        let profile = self.profile();
        self.sessions_completed += 1;
        info!(
            reason,
            patterns = self.collector.patterns().len(),
            elderly = profile.is_likely_elderly,
            confidence = profile.confidence,
            "touch session finished"
        );
        profile
    }
}

impl Default for TouchAnalysisPipeline {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TouchAction;

    fn config(limit_ms: u64) -> AnalyzerConfig {
        let mut config = AnalyzerConfig::default();
        config.device_id = "test".to_string();
        config.collector.session_limit_ms = limit_ms;
        config
    }

    fn tap(pipeline: &mut TouchAnalysisPipeline, x: f32, t: u64, hold_ms: u64) -> Option<ElderlyTouchProfile> {
        let first = pipeline.submit(&TouchSample::new(TouchAction::Down, x, 100.0, 0.5, 0.2, t, t));
        let second = pipeline.submit(&TouchSample::new(TouchAction::Up, x, 100.0, 0.5, 0.2, t + hold_ms, t));
        first.or(second)
    }

    #[test]
    fn test_new_pipeline_is_idle() {
        let pipeline = TouchAnalysisPipeline::default();
        assert!(!pipeline.is_collecting());
        assert!(pipeline.patterns().is_empty());
        let profile = pipeline.profile();
        assert!(!profile.is_likely_elderly);
        assert_eq!(profile.confidence, 0.0);
    }

    #[test]
    fn test_session_without_patterns_has_no_evidence() {
        let mut pipeline = TouchAnalysisPipeline::new(config(0));
        // A contact that is cancelled never seals a pattern.
        pipeline.submit(&TouchSample::new(TouchAction::Down, 10.0, 10.0, 0.5, 0.2, 100, 100));
        pipeline.submit(&TouchSample::new(TouchAction::Cancel, 10.0, 10.0, 0.5, 0.2, 150, 100));

        assert_eq!(pipeline.characteristics(), TouchCharacteristics::default());
        let profile = pipeline.stop();
        assert_eq!(profile, ElderlyTouchProfile::no_evidence());
        assert_eq!(profile.confidence, 0.0);
        assert!(pipeline.report().contains("- Confidence Score: 0%"));
    }

    #[test]
    fn test_stop_returns_profile() {
        let mut pipeline = TouchAnalysisPipeline::new(config(0));
        tap(&mut pipeline, 10.0, 1000, 300);
        tap(&mut pipeline, 20.0, 2000, 300);
        assert!(pipeline.is_collecting());

        let profile = pipeline.stop();
        assert!(!pipeline.is_collecting());
        assert_eq!(profile.characteristics.pattern_count, 2);
        assert_eq!(profile.characteristics.avg_tap_duration_ms, 300);
        assert_eq!(pipeline.sessions_completed(), 1);

        // Idle stop re-reports the same session.
        let again = pipeline.stop();
        assert_eq!(again, profile);
        assert_eq!(pipeline.sessions_completed(), 1);
    }

    #[test]
    fn test_submit_returns_profile_on_expiry() {
        let mut pipeline = TouchAnalysisPipeline::new(config(1000));
        assert!(tap(&mut pipeline, 10.0, 0, 100).is_none());
        assert!(tap(&mut pipeline, 20.0, 400, 100).is_none());

        // Next contact starts after the deadline.
        let finished = tap(&mut pipeline, 30.0, 1500, 100).expect("session should expire");
        assert_eq!(finished.characteristics.pattern_count, 2);

        // The late contact opened a fresh session.
        assert!(pipeline.is_collecting());
        assert_eq!(pipeline.patterns().len(), 1);
        assert_eq!(pipeline.collector().session_started_ms(), Some(1500));
    }

    #[test]
    fn test_poll_expiry() {
        let mut pipeline = TouchAnalysisPipeline::new(config(1000));
        tap(&mut pipeline, 10.0, 0, 100);
        assert!(pipeline.poll(500).is_none());
        let finished = pipeline.poll(1000).expect("deadline reached");
        assert_eq!(finished.characteristics.pattern_count, 1);
        assert!(!pipeline.is_collecting());
        assert!(pipeline.poll(5000).is_none());
    }

    #[test]
    fn test_reset_clears_session() {
        let mut pipeline = TouchAnalysisPipeline::new(config(0));
        tap(&mut pipeline, 10.0, 1000, 300);
        pipeline.reset();
        assert!(!pipeline.is_collecting());
        assert!(pipeline.patterns().is_empty());
        assert_eq!(pipeline.characteristics().pattern_count, 0);
    }

    #[test]
    fn test_export_span() {
        let mut pipeline = TouchAnalysisPipeline::new(config(0));
        tap(&mut pipeline, 10.0, 1000, 300);
        tap(&mut pipeline, 20.0, 2000, 250);
        pipeline.stop();

        let export = pipeline.export(true);
        assert_eq!(export.session_id, "test-1000");
        assert_eq!(export.start_time_ms, 1000);
        assert_eq!(export.end_time_ms, 2250);
        assert_eq!(export.pattern_count, 2);
        assert_eq!(export.patterns.map(|p| p.len()), Some(2));
    }

    #[test]
    fn test_report_and_summary_text() {
        let mut pipeline = TouchAnalysisPipeline::new(config(0));
        tap(&mut pipeline, 10.0, 1000, 300);
        pipeline.stop();
        assert!(pipeline.report().starts_with("=== Touch Pattern Analysis Report ==="));
        assert!(pipeline.summary().contains("Tap Duration: 300 ms"));
    }
}
