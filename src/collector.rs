//! Touch pattern collection.
//!
//! Converts a serial stream of touch samples into sealed touch patterns.
//!
//! Design: two small state machines.
//! - The session gate (`CollectorState`) decides whether samples are
//!   ingested at all: *idle* until a contact starts, *collecting* until an
//!   explicit stop or the session time limit.
//! - The gesture lifecycle (start/continue/end/cancel) drives a single open
//!   pattern buffer, which is sealed into an immutable `TouchPattern` on
//!   contact end.
//!
//! Patterns accumulate across the whole session. Starting a new session
//! clears them.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::pressure::{PressureMode, PressureNormalizer};
use crate::types::{GesturePhase, TouchPattern, TouchPoint, TouchSample};
use crate::velocity::{VelocityConfig, VelocityTracker};

/// Configuration for pattern collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Session time limit in milliseconds, measured from the contact that
    /// opened the session. Zero collects until stopped. Typical: 10 000.
    pub session_limit_ms: u64,

    /// Velocity estimation window.
    pub velocity: VelocityConfig,

    /// How per-sample pressure is derived.
    pub pressure: PressureMode,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            session_limit_ms: 10_000,
            velocity: VelocityConfig::default(),
            pressure: PressureMode::default(),
        }
    }
}

impl CollectorConfig {
    /// The session time limit, if one is set.
    pub fn session_limit(&self) -> Option<u64> {
        (self.session_limit_ms > 0).then_some(self.session_limit_ms)
    }
}

/// Session gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    /// Not collecting. The next contact start opens a session.
    Idle,
    /// Accumulating patterns since `started_ms`.
    Collecting { started_ms: u64 },
}

/// Input to the session gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorInput {
    /// A sample with a gesture phase arrived.
    Contact(GesturePhase),
    /// The host asked to stop.
    Stop,
    /// Time passed with no sample.
    Tick,
}

impl CollectorState {
    /// Pure transition function for the session gate.
    ///
    /// The time limit is checked before the input is applied, so a sample
    /// arriving after the deadline closes the session and is not ingested
    /// into it. A contact start arriving at that point opens the next
    /// session instead.
    pub fn next(self, input: CollectorInput, now_ms: u64, limit_ms: Option<u64>) -> CollectorState {
        let current = match (self, limit_ms) {
            (CollectorState::Collecting { started_ms }, Some(limit))
                if now_ms.saturating_sub(started_ms) >= limit =>
            {
                CollectorState::Idle
            }
            (state, _) => state,
        };

        match (current, input) {
            (_, CollectorInput::Stop) => CollectorState::Idle,
            (CollectorState::Idle, CollectorInput::Contact(GesturePhase::Start))
                if self == CollectorState::Idle =>
            {
                CollectorState::Collecting { started_ms: now_ms }
            }
            (state, _) => state,
        }
    }

    pub fn is_collecting(&self) -> bool {
        matches!(self, CollectorState::Collecting { .. })
    }
}

/// What happened to a submitted sample.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The sample was not ingested (idle, or not part of a gesture).
    Ignored,
    /// A new session opened and its first pattern buffer started.
    SessionStarted,
    /// The sample opened a pattern or extended the open one.
    Recorded,
    /// The sample closed a gesture; the sealed pattern is attached.
    PatternSealed(TouchPattern),
    /// The open gesture was cancelled and discarded.
    GestureCancelled,
    /// The session time limit elapsed before this sample.
    SessionExpired,
}

/// Pattern buffer for the gesture currently in contact.
#[derive(Debug, Clone)]
struct PatternBuilder {
    down_time_ms: u64,
    tap_interval_ms: Option<u64>,
    positions: Vec<TouchPoint>,
    pressures: Vec<f32>,
    touch_sizes: Vec<f32>,
    velocities: Vec<[f32; 2]>,
}

impl PatternBuilder {
    fn open(down_time_ms: u64, tap_interval_ms: Option<u64>) -> Self {
        Self {
            down_time_ms,
            tap_interval_ms,
            positions: Vec::new(),
            pressures: Vec::new(),
            touch_sizes: Vec::new(),
            velocities: Vec::new(),
        }
    }

    fn push(&mut self, point: TouchPoint, pressure: f32, size: f32) {
        self.positions.push(point);
        self.pressures.push(pressure);
        self.touch_sizes.push(size);
    }

    fn seal(self, up_time_ms: u64, duration_ms: u64) -> TouchPattern {
        TouchPattern {
            down_time_ms: self.down_time_ms,
            up_time_ms,
            duration_ms,
            tap_interval_ms: self.tap_interval_ms,
            positions: self.positions,
            pressures: self.pressures,
            touch_sizes: self.touch_sizes,
            velocities: self.velocities,
        }
    }
}

/// Collects touch patterns for one session at a time.
#[derive(Debug, Clone)]
pub struct PatternCollector {
    config: CollectorConfig,
    state: CollectorState,
    normalizer: PressureNormalizer,
    velocity: VelocityTracker,
    open: Option<PatternBuilder>,
    patterns: Vec<TouchPattern>,

    // Diagnostics
    samples_ingested: u64,
    sessions_started: u64,
}

impl PatternCollector {
    pub fn new(config: CollectorConfig) -> Self {
        Self {
            normalizer: PressureNormalizer::new(config.pressure),
            velocity: VelocityTracker::new(config.velocity),
            config,
            state: CollectorState::Idle,
            open: None,
            patterns: Vec::new(),
            samples_ingested: 0,
            sessions_started: 0,
        }
    }

    /// Ingests one sample.
    pub fn submit(&mut self, sample: &TouchSample) -> SubmitOutcome {
        let now = sample.event_time_ms;

        if self.expire_if_due(now) {
            // A contact start right after expiry may open the next session,
            // so fall through for it; everything else is dropped.
            if sample.action.phase() != Some(GesturePhase::Start) {
                return SubmitOutcome::SessionExpired;
            }
        }

        let Some(phase) = sample.action.phase() else {
            return SubmitOutcome::Ignored;
        };

        let previous = self.state;
        self.state = previous.next(
            CollectorInput::Contact(phase),
            now,
            self.config.session_limit(),
        );

        let session_started = !previous.is_collecting() && self.state.is_collecting();
        if session_started {
            self.begin_session(now);
        }
        if !self.state.is_collecting() {
            return SubmitOutcome::Ignored;
        }

        self.samples_ingested += 1;
        let outcome = self.apply_phase(phase, sample);

        match outcome {
            SubmitOutcome::Recorded if session_started => SubmitOutcome::SessionStarted,
            other => other,
        }
    }

    /// Checks the session deadline without a sample.
    ///
    /// Returns true if this call closed the session.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        self.expire_if_due(now_ms)
    }

    /// Stops collection. Patterns are kept for analysis until the next
    /// session starts. An open gesture is discarded.
    ///
    /// Returns false if the collector was already idle.
    pub fn stop(&mut self) -> bool {
        let was_collecting = self.state.is_collecting();
        self.state = self
            .state
            .next(CollectorInput::Stop, 0, self.config.session_limit());
        self.discard_open("stopped");
        if was_collecting {
            info!(patterns = self.patterns.len(), "touch session stopped");
        }
        was_collecting
    }

    /// Returns to idle and drops all collected patterns.
    pub fn reset(&mut self) {
        self.state = CollectorState::Idle;
        self.open = None;
        self.patterns.clear();
        self.velocity.clear();
        self.samples_ingested = 0;
    }

    pub fn state(&self) -> CollectorState {
        self.state
    }

    pub fn is_collecting(&self) -> bool {
        self.state.is_collecting()
    }

    /// True while a gesture is in contact.
    pub fn has_open_gesture(&self) -> bool {
        self.open.is_some()
    }

    /// Sealed patterns of the current (or most recent) session.
    pub fn patterns(&self) -> &[TouchPattern] {
        &self.patterns
    }

    /// Start time of the current session, if collecting.
    pub fn session_started_ms(&self) -> Option<u64> {
        match self.state {
            CollectorState::Collecting { started_ms } => Some(started_ms),
            CollectorState::Idle => None,
        }
    }

    pub fn samples_ingested(&self) -> u64 {
        self.samples_ingested
    }

    pub fn sessions_started(&self) -> u64 {
        self.sessions_started
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    fn expire_if_due(&mut self, now_ms: u64) -> bool {
        if !self.state.is_collecting() {
            return false;
        }
        self.state = self
            .state
            .next(CollectorInput::Tick, now_ms, self.config.session_limit());
        if self.state.is_collecting() {
            return false;
        }
        self.discard_open("session expired");
        info!(patterns = self.patterns.len(), now_ms, "touch session expired");
        true
    }

    fn begin_session(&mut self, now_ms: u64) {
        self.patterns.clear();
        self.open = None;
        self.velocity.clear();
        self.samples_ingested = 0;
        self.sessions_started += 1;
        info!(started_ms = now_ms, "touch session started");
    }

    fn apply_phase(&mut self, phase: GesturePhase, sample: &TouchSample) -> SubmitOutcome {
        let point = sample.position();
        let pressure = self.normalizer.normalize(sample);

        match phase {
            GesturePhase::Start => {
                if self.open.is_some() {
                    // A second down without an up; the earlier gesture never finished.
                    self.discard_open("superseded by new contact");
                }
                let tap_interval_ms = self
                    .patterns
                    .last()
                    .map(|prev| sample.down_time_ms.saturating_sub(prev.down_time_ms));

                debug!(
                    action = sample.action.label(),
                    tool = ?sample.tool_type,
                    edges = ?sample.edge_flags.edges(),
                    tap_interval_ms,
                    "gesture opened"
                );
                let mut builder = PatternBuilder::open(sample.down_time_ms, tap_interval_ms);
                builder.push(point, pressure, sample.size);
                self.velocity.seed(sample.event_time_ms, point);
                self.open = Some(builder);
                SubmitOutcome::Recorded
            }
            GesturePhase::Continue => {
                let Some(builder) = self.open.as_mut() else {
                    debug!(action = sample.action.label(), "sample outside gesture ignored");
                    return SubmitOutcome::Ignored;
                };
                self.velocity.add_movement(sample.event_time_ms, point);
                builder.push(point, pressure, sample.size);
                builder.velocities.push(self.velocity.velocity());
                SubmitOutcome::Recorded
            }
            GesturePhase::End => {
                let Some(mut builder) = self.open.take() else {
                    debug!(action = sample.action.label(), "sample outside gesture ignored");
                    return SubmitOutcome::Ignored;
                };
                self.velocity.add_movement(sample.event_time_ms, point);
                builder.push(point, pressure, sample.size);
                builder.velocities.push(self.velocity.velocity());

                let duration_ms = sample.event_time_ms.saturating_sub(sample.down_time_ms);
                let pattern = builder.seal(sample.event_time_ms, duration_ms);
                debug!(
                    index = self.patterns.len(),
                    points = pattern.positions.len(),
                    duration_ms,
                    "touch pattern sealed"
                );
                self.patterns.push(pattern.clone());
                SubmitOutcome::PatternSealed(pattern)
            }
            GesturePhase::Cancel => {
                if self.open.is_none() {
                    return SubmitOutcome::Ignored;
                }
                self.discard_open("cancelled");
                SubmitOutcome::GestureCancelled
            }
        }
    }

    fn discard_open(&mut self, reason: &str) {
        if let Some(builder) = self.open.take() {
            debug!(points = builder.positions.len(), reason, "open gesture discarded");
        }
        self.velocity.clear();
    }
}

impl Default for PatternCollector {
    fn default() -> Self {
        Self::new(CollectorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EdgeFlags, TouchAction};

    fn down(x: f32, y: f32, t: u64) -> TouchSample {
        TouchSample::new(TouchAction::Down, x, y, 0.5, 0.2, t, t)
    }

    fn mv(x: f32, y: f32, t: u64, down_t: u64) -> TouchSample {
        TouchSample::new(TouchAction::Move, x, y, 0.5, 0.2, t, down_t)
    }

    fn up(x: f32, y: f32, t: u64, down_t: u64) -> TouchSample {
        TouchSample::new(TouchAction::Up, x, y, 0.5, 0.2, t, down_t)
    }

    fn tap(collector: &mut PatternCollector, x: f32, y: f32, t: u64, hold_ms: u64) {
        collector.submit(&down(x, y, t));
        collector.submit(&up(x, y, t + hold_ms, t));
    }

    #[test]
    fn test_state_transitions() {
        let limit = Some(1000);
        let idle = CollectorState::Idle;

        assert_eq!(
            idle.next(CollectorInput::Contact(GesturePhase::Continue), 5, limit),
            CollectorState::Idle
        );
        let collecting = idle.next(CollectorInput::Contact(GesturePhase::Start), 5, limit);
        assert_eq!(collecting, CollectorState::Collecting { started_ms: 5 });

        // Another start keeps the original session start
        assert_eq!(
            collecting.next(CollectorInput::Contact(GesturePhase::Start), 100, limit),
            collecting
        );
        assert_eq!(collecting.next(CollectorInput::Stop, 100, limit), CollectorState::Idle);
        assert_eq!(collecting.next(CollectorInput::Tick, 1004, limit), collecting);
        assert_eq!(collecting.next(CollectorInput::Tick, 1005, limit), CollectorState::Idle);
        // No limit, never expires
        assert_eq!(collecting.next(CollectorInput::Tick, u64::MAX, None), collecting);
    }

    #[test]
    fn test_expired_start_does_not_reopen_in_same_step() {
        let collecting = CollectorState::Collecting { started_ms: 0 };
        let next = collecting.next(CollectorInput::Contact(GesturePhase::Start), 2000, Some(1000));
        assert_eq!(next, CollectorState::Idle);
    }

    #[test]
    fn test_idle_ignores_non_start() {
        let mut collector = PatternCollector::default();
        assert_eq!(collector.submit(&mv(1.0, 1.0, 10, 0)), SubmitOutcome::Ignored);
        assert_eq!(collector.submit(&up(1.0, 1.0, 20, 0)), SubmitOutcome::Ignored);
        assert!(!collector.is_collecting());
    }

    #[test]
    fn test_tap_produces_pattern() {
        let mut collector = PatternCollector::default();
        assert_eq!(collector.submit(&down(10.0, 20.0, 100)), SubmitOutcome::SessionStarted);
        assert!(collector.has_open_gesture());

        let outcome = collector.submit(&up(10.0, 20.0, 250, 100));
        let SubmitOutcome::PatternSealed(pattern) = outcome else {
            panic!("expected sealed pattern, got {:?}", outcome);
        };
        assert_eq!(pattern.down_time_ms, 100);
        assert_eq!(pattern.up_time_ms, 250);
        assert_eq!(pattern.duration_ms, 150);
        assert_eq!(pattern.tap_interval_ms, None);
        assert_eq!(pattern.positions.len(), 2);
        assert_eq!(pattern.pressures.len(), 2);
        assert_eq!(pattern.touch_sizes.len(), 2);
        assert_eq!(pattern.velocities.len(), 1);
        assert!(!collector.has_open_gesture());
        assert_eq!(collector.patterns().len(), 1);
    }

    #[test]
    fn test_drag_records_every_sample() {
        let mut collector = PatternCollector::default();
        collector.submit(&down(0.0, 0.0, 0));
        for i in 1..10u64 {
            assert_eq!(
                collector.submit(&mv(i as f32, 0.0, i * 10, 0)),
                SubmitOutcome::Recorded
            );
        }
        collector.submit(&up(10.0, 0.0, 100, 0));

        let pattern = &collector.patterns()[0];
        assert_eq!(pattern.positions.len(), 11);
        assert_eq!(pattern.velocities.len(), 10);
        // 1 px / 10 ms
        let [vx, vy] = pattern.velocities[pattern.velocities.len() - 1];
        assert!((vx - 100.0).abs() < 0.1, "vx = {}", vx);
        assert!(vy.abs() < 1e-3);
    }

    #[test]
    fn test_tap_interval_from_previous_down() {
        let mut collector = PatternCollector::default();
        tap(&mut collector, 0.0, 0.0, 1000, 100);
        tap(&mut collector, 5.0, 5.0, 1600, 100);
        tap(&mut collector, 5.0, 5.0, 2000, 100);

        let intervals: Vec<_> = collector.patterns().iter().map(|p| p.tap_interval_ms).collect();
        assert_eq!(intervals, vec![None, Some(600), Some(400)]);
    }

    #[test]
    fn test_patterns_accumulate_across_gestures() {
        let mut collector = PatternCollector::default();
        for i in 0..5u64 {
            tap(&mut collector, 0.0, 0.0, i * 500, 80);
        }
        assert_eq!(collector.patterns().len(), 5);
        assert!(collector.is_collecting());
        assert_eq!(collector.sessions_started(), 1);
    }

    #[test]
    fn test_cancel_discards_open_gesture() {
        let mut collector = PatternCollector::default();
        collector.submit(&down(0.0, 0.0, 0));
        collector.submit(&mv(5.0, 0.0, 10, 0));
        let cancel = TouchSample::new(TouchAction::Cancel, 5.0, 0.0, 0.5, 0.2, 20, 0);
        assert_eq!(collector.submit(&cancel), SubmitOutcome::GestureCancelled);
        assert!(!collector.has_open_gesture());
        assert!(collector.patterns().is_empty());
        // A later up has nothing to close
        assert_eq!(collector.submit(&up(5.0, 0.0, 30, 0)), SubmitOutcome::Ignored);
    }

    #[test]
    fn test_stray_samples_between_gestures_ignored() {
        let mut collector = PatternCollector::default();
        tap(&mut collector, 0.0, 0.0, 0, 50);
        assert_eq!(collector.submit(&mv(3.0, 3.0, 60, 0)), SubmitOutcome::Ignored);
        assert_eq!(collector.submit(&up(3.0, 3.0, 70, 0)), SubmitOutcome::Ignored);

        let mut edge_down = down(0.0, 10.0, 100);
        edge_down.edge_flags = EdgeFlags(EdgeFlags::LEFT);
        assert_eq!(collector.submit(&edge_down), SubmitOutcome::Recorded);
        assert!(collector.has_open_gesture());
        assert_eq!(collector.patterns().len(), 1);
    }

    #[test]
    fn test_other_actions_ignored() {
        let mut collector = PatternCollector::default();
        collector.submit(&down(0.0, 0.0, 0));
        let pointer_down = TouchSample::new(TouchAction::Other(5), 50.0, 50.0, 0.5, 0.2, 10, 0);
        assert_eq!(collector.submit(&pointer_down), SubmitOutcome::Ignored);
        collector.submit(&up(0.0, 0.0, 20, 0));
        assert_eq!(collector.patterns()[0].positions.len(), 2);
    }

    #[test]
    fn test_session_expiry_and_restart() {
        let mut collector = PatternCollector::new(CollectorConfig {
            session_limit_ms: 1000,
            ..Default::default()
        });
        tap(&mut collector, 0.0, 0.0, 0, 100);
        tap(&mut collector, 0.0, 0.0, 400, 100);
        assert_eq!(collector.patterns().len(), 2);

        // A move after the deadline closes the session and is dropped
        assert_eq!(collector.submit(&mv(1.0, 1.0, 1200, 1100)), SubmitOutcome::SessionExpired);
        assert!(!collector.is_collecting());
        // History survives until the next session starts
        assert_eq!(collector.patterns().len(), 2);

        assert_eq!(collector.submit(&down(3.0, 3.0, 1500)), SubmitOutcome::SessionStarted);
        assert!(collector.patterns().is_empty());
        assert_eq!(collector.sessions_started(), 2);
        assert_eq!(collector.session_started_ms(), Some(1500));
    }

    #[test]
    fn test_start_after_deadline_opens_next_session() {
        let mut collector = PatternCollector::new(CollectorConfig {
            session_limit_ms: 1000,
            ..Default::default()
        });
        tap(&mut collector, 0.0, 0.0, 0, 100);
        assert_eq!(collector.submit(&down(0.0, 0.0, 5000)), SubmitOutcome::SessionStarted);
        assert_eq!(collector.session_started_ms(), Some(5000));
        assert!(collector.patterns().is_empty());
    }

    #[test]
    fn test_poll_expires_session() {
        let mut collector = PatternCollector::new(CollectorConfig {
            session_limit_ms: 1000,
            ..Default::default()
        });
        collector.submit(&down(0.0, 0.0, 0));
        assert!(!collector.poll(999));
        assert!(collector.poll(1000));
        assert!(!collector.has_open_gesture());
        assert!(!collector.poll(2000));
    }

    #[test]
    fn test_stop_discards_open_gesture_and_keeps_patterns() {
        let mut collector = PatternCollector::default();
        tap(&mut collector, 0.0, 0.0, 0, 100);
        collector.submit(&down(1.0, 1.0, 300));
        assert!(collector.stop());
        assert!(!collector.is_collecting());
        assert!(!collector.has_open_gesture());
        assert_eq!(collector.patterns().len(), 1);
        assert!(!collector.stop());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut collector = PatternCollector::default();
        tap(&mut collector, 0.0, 0.0, 0, 100);
        collector.reset();
        assert!(!collector.is_collecting());
        assert!(collector.patterns().is_empty());
        assert_eq!(collector.samples_ingested(), 0);
    }

    #[test]
    fn test_out_of_order_timestamps_saturate() {
        let mut collector = PatternCollector::default();
        collector.submit(&down(0.0, 0.0, 500));
        // Up reported before its own down time
        collector.submit(&up(0.0, 0.0, 400, 500));
        assert_eq!(collector.patterns()[0].duration_ms, 0);
    }

    #[test]
    fn test_pressure_mode_applied() {
        let mut collector = PatternCollector::new(CollectorConfig {
            pressure: PressureMode::Range { min: 0.0, max: 200.0 },
            ..Default::default()
        });
        let mut sample = down(0.0, 0.0, 0);
        sample.pressure = 100.0;
        collector.submit(&sample);
        collector.submit(&up(0.0, 0.0, 50, 0));
        assert!((collector.patterns()[0].pressures[0] - 0.5).abs() < 1e-6);
    }
}
