//! Bounded, newest-first orientation history.

use std::collections::VecDeque;

use chrono::Utc;
use thiserror::Error;

/// Errors raised when recording orientation samples.
#[derive(Debug, Error)]
pub enum OrientationError {
    /// The sample carried a non-finite yaw or pitch.
    #[error("orientation sample is not finite: yaw={yaw_deg}, pitch={pitch_deg}")]
    NotFinite { yaw_deg: f64, pitch_deg: f64 },
}

/// A single head orientation sample.
///
/// Yaw and pitch are in degrees; yaw 0 = content centre, positive east.
/// `capture_time_ms` is wall-clock milliseconds since the Unix epoch,
/// stamped at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationSample {
    /// Viewing yaw in degrees.
    pub yaw_deg: f64,
    /// Viewing pitch in degrees.
    pub pitch_deg: f64,
    /// When this sample was captured (Unix epoch milliseconds).
    pub capture_time_ms: i64,
    /// Optional presentation timestamp the sample was reported against.
    pub pts: Option<i64>,
}

impl OrientationSample {
    /// Create a new sample stamped with the current wall-clock time.
    pub fn new(yaw_deg: f64, pitch_deg: f64) -> Self {
        Self {
            yaw_deg,
            pitch_deg,
            capture_time_ms: Utc::now().timestamp_millis(),
            pts: None,
        }
    }

    /// Create a sample with an explicit capture time (for testing and replay).
    pub fn with_capture_time(yaw_deg: f64, pitch_deg: f64, capture_time_ms: i64) -> Self {
        Self {
            yaw_deg,
            pitch_deg,
            capture_time_ms,
            pts: None,
        }
    }

    /// Attach a presentation timestamp to this sample.
    pub fn with_pts(mut self, pts: i64) -> Self {
        self.pts = Some(pts);
        self
    }

    /// Whether both angles are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.yaw_deg.is_finite() && self.pitch_deg.is_finite()
    }
}

/// Bounded history of orientation samples, newest first.
///
/// Capacity is fixed at construction; recording past capacity evicts the
/// oldest sample. All operations are O(1)-O(N) and never block beyond the
/// caller's lock acquisition.
#[derive(Debug)]
pub struct OrientationHistory {
    /// Recent samples, newest at the front.
    samples: VecDeque<OrientationSample>,
    /// Maximum number of samples to retain.
    capacity: usize,
}

impl OrientationHistory {
    /// Create a history retaining at most `capacity` samples (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a new sample, evicting the oldest once past capacity.
    ///
    /// Rejects samples with non-finite angles.
    pub fn record(&mut self, sample: OrientationSample) -> Result<(), OrientationError> {
        if !sample.is_finite() {
            return Err(OrientationError::NotFinite {
                yaw_deg: sample.yaw_deg,
                pitch_deg: sample.pitch_deg,
            });
        }

        self.samples.push_front(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_back();
        }
        Ok(())
    }

    /// Remove and return the newest sample.
    pub fn pop_newest(&mut self) -> Option<OrientationSample> {
        self.samples.pop_front()
    }

    /// Peek at the newest sample without consuming it.
    pub fn newest(&self) -> Option<&OrientationSample> {
        self.samples.front()
    }

    /// Copy of the history ordered oldest first, the order prediction
    /// plugins consume.
    pub fn snapshot_oldest_first(&self) -> Vec<OrientationSample> {
        self.samples.iter().rev().copied().collect()
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of samples retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Discard all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
