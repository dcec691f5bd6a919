//! Pointer velocity estimation.
//!
//! A sliding-window estimator over recent pointer positions. Every sample is
//! pushed with its event time; samples older than the horizon (relative to
//! the newest one) fall out of the window. Velocity is the least-squares
//! slope of position over time across the window, reported in px/s.
//!
//! Design: the window holds at most `max_samples` entries, so each update is
//! O(window) with a small fixed bound and no growth over long drags.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::types::TouchPoint;

/// Configuration for the velocity estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityConfig {
    /// Only samples within this many milliseconds of the newest sample
    /// contribute. Typical: 100 ms.
    pub horizon_ms: u64,

    /// Upper bound on retained samples. Typical: 20.
    pub max_samples: usize,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            horizon_ms: 100,
            max_samples: 20,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Movement {
    time_ms: u64,
    point: TouchPoint,
}

/// Least-squares velocity tracker for a single pointer.
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    config: VelocityConfig,
    movements: VecDeque<Movement>,
}

impl VelocityTracker {
    pub fn new(config: VelocityConfig) -> Self {
        Self {
            movements: VecDeque::with_capacity(config.max_samples.max(1)),
            config,
        }
    }

    /// Drops all history. Called when a new contact starts.
    pub fn clear(&mut self) {
        self.movements.clear();
    }

    /// Clears history and seeds the window with the contact-start position.
    pub fn seed(&mut self, time_ms: u64, point: TouchPoint) {
        self.clear();
        self.add_movement(time_ms, point);
    }

    /// Adds a position and evicts anything outside the horizon.
    pub fn add_movement(&mut self, time_ms: u64, point: TouchPoint) {
        self.movements.push_back(Movement { time_ms, point });

        while self.movements.len() > self.config.max_samples.max(1) {
            self.movements.pop_front();
        }

        let horizon = self.config.horizon_ms;
        while let Some(oldest) = self.movements.front() {
            if time_ms.saturating_sub(oldest.time_ms) > horizon {
                self.movements.pop_front();
            } else {
                break;
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.movements.len()
    }

    /// Current velocity [vx, vy] in px/s.
    ///
    /// Returns zero with fewer than two samples or when all samples share a
    /// timestamp.
    pub fn velocity(&self) -> [f32; 2] {
        let n = self.movements.len();
        if n < 2 {
            return [0.0, 0.0];
        }

        // Times relative to the newest sample keep the sums well conditioned.
        let newest = self.movements.back().map(|m| m.time_ms).unwrap_or(0);
        let rel_time = |m: &Movement| -((newest.saturating_sub(m.time_ms)) as f64);

        let n_f = n as f64;
        let t_mean = self.movements.iter().map(rel_time).sum::<f64>() / n_f;
        let x_mean = self.movements.iter().map(|m| m.point.x as f64).sum::<f64>() / n_f;
        let y_mean = self.movements.iter().map(|m| m.point.y as f64).sum::<f64>() / n_f;

        let mut s_tt = 0.0;
        let mut s_tx = 0.0;
        let mut s_ty = 0.0;
        for m in &self.movements {
            let dt = rel_time(m) - t_mean;
            s_tt += dt * dt;
            s_tx += dt * (m.point.x as f64 - x_mean);
            s_ty += dt * (m.point.y as f64 - y_mean);
        }

        if s_tt <= f64::EPSILON {
            return [0.0, 0.0];
        }

        // Slope is px/ms; scale to px/s.
        [
            (s_tx / s_tt * 1000.0) as f32,
            (s_ty / s_tt * 1000.0) as f32,
        ]
    }
}

impl Default for VelocityTracker {
    fn default() -> Self {
        Self::new(VelocityConfig::default())
    }
}
