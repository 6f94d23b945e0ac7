//! Prediction plugin interface and the built-in linear predictor.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::orientation::OrientationSample;

/// Default interval between samples fed to a plugin, in milliseconds.
const DEFAULT_SAMPLE_INTERVAL_MS: u32 = 40;

/// Default number of history samples a plugin considers.
const DEFAULT_HISTORY_DEPTH: usize = 25;

/// Default prediction horizon, in milliseconds.
const DEFAULT_PREDICTION_HORIZON_MS: u32 = 1000;

/// Errors raised by plugin loading and configuration.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The plugin module could not be resolved or bound.
    #[error("failed to load prediction plugin '{name}' from {}: {reason}", path.display())]
    LoadFailure {
        name: String,
        path: PathBuf,
        reason: String,
    },

    /// No plugin is registered under the given name.
    #[error("no prediction plugin registered under '{0}'")]
    Unknown(String),

    /// The plugin rejected its configuration.
    #[error("prediction plugin initialization failed: {0}")]
    Initialize(String),
}

/// Whether the plugin predicts for one target viewpoint or several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictMode {
    /// One active viewpoint (extractor granularity).
    SingleTarget,
    /// Multiple viewpoints (tile granularity).
    MultiTarget,
}

/// Configuration forwarded to a plugin at initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictOptions {
    /// Expected interval between fed samples, in milliseconds.
    pub sample_interval_ms: u32,
    /// Number of history samples the plugin should consider.
    pub history_depth: usize,
    /// How far into the future to predict, in milliseconds.
    pub prediction_horizon_ms: u32,
    /// Single- or multi-target prediction.
    pub mode: PredictMode,
    /// Whether the plugin should adjust itself from fed-back viewports.
    pub feedback_adjustment: bool,
}

impl Default for PredictOptions {
    fn default() -> Self {
        Self {
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            history_depth: DEFAULT_HISTORY_DEPTH,
            prediction_horizon_ms: DEFAULT_PREDICTION_HORIZON_MS,
            mode: PredictMode::SingleTarget,
            feedback_adjustment: true,
        }
    }
}

impl PredictOptions {
    /// Default options for extractor-granularity selection.
    pub fn single_target() -> Self {
        Self::default()
    }

    /// Default options for tile-granularity selection.
    pub fn multi_target() -> Self {
        Self {
            mode: PredictMode::MultiTarget,
            ..Self::default()
        }
    }
}

/// A predicted future viewing orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictedOrientation {
    /// Predicted yaw in degrees, wrapped to [-180, 180).
    pub yaw_deg: f64,
    /// Predicted pitch in degrees, clamped to [-90, 90].
    pub pitch_deg: f64,
}

/// Polymorphic orientation-prediction plugin.
///
/// Lifecycle: `initialize` once after loading, `feed` on every fresh sample
/// (independent of decision cycles), `predict` per decision cycle, `destroy`
/// at teardown. `destroy` never fails; plugins log their own teardown
/// problems.
pub trait PredictPlugin: Send {
    /// Configure the plugin. Called once after loading; may be called again
    /// to reconfigure.
    fn initialize(&mut self, options: &PredictOptions) -> Result<(), PluginError>;

    /// Feed the freshest orientation sample.
    fn feed(&mut self, sample: &OrientationSample);

    /// Predict a future orientation from the history, oldest first.
    ///
    /// `None` means the plugin judges its input insufficient (for example
    /// fewer than two samples) - a normal outcome, not an error.
    fn predict(&mut self, history: &[OrientationSample]) -> Option<PredictedOrientation>;

    /// Release plugin resources.
    fn destroy(&mut self);
}

/// Built-in predictor extrapolating yaw/pitch linearly from the two newest
/// samples across the prediction horizon.
#[derive(Debug)]
pub struct LinearPredictor {
    options: PredictOptions,
    last_fed: Option<OrientationSample>,
}

impl Default for LinearPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearPredictor {
    /// Create a predictor with default options.
    pub fn new() -> Self {
        Self {
            options: PredictOptions::default(),
            last_fed: None,
        }
    }
}

impl PredictPlugin for LinearPredictor {
    fn initialize(&mut self, options: &PredictOptions) -> Result<(), PluginError> {
        if options.history_depth < 2 {
            return Err(PluginError::Initialize(
                "linear predictor needs a history depth of at least 2".into(),
            ));
        }
        self.options = options.clone();
        Ok(())
    }

    fn feed(&mut self, sample: &OrientationSample) {
        if self.options.feedback_adjustment {
            self.last_fed = Some(*sample);
        }
    }

    fn predict(&mut self, history: &[OrientationSample]) -> Option<PredictedOrientation> {
        let depth = self.options.history_depth.min(history.len());
        if depth < 2 {
            return None;
        }
        let window = &history[history.len() - depth..];
        let older = window[window.len() - 2];
        let newest = window[window.len() - 1];

        let mut dt_ms = (newest.capture_time_ms - older.capture_time_ms) as f64;
        if dt_ms <= 0.0 {
            // Samples without usable timestamps fall back to the nominal rate.
            dt_ms = f64::from(self.options.sample_interval_ms);
        }
        let horizon_ms = f64::from(self.options.prediction_horizon_ms);

        let yaw_rate = wrap_delta_deg(newest.yaw_deg - older.yaw_deg) / dt_ms;
        let pitch_rate = (newest.pitch_deg - older.pitch_deg) / dt_ms;

        let yaw_deg = wrap_yaw_deg(newest.yaw_deg + yaw_rate * horizon_ms);
        let pitch_deg = (newest.pitch_deg + pitch_rate * horizon_ms).clamp(-90.0, 90.0);

        trace!(yaw_deg, pitch_deg, "linear prediction");
        Some(PredictedOrientation { yaw_deg, pitch_deg })
    }

    fn destroy(&mut self) {
        self.last_fed = None;
    }
}

/// Wrap an angular delta into [-180, 180) so motion across the antimeridian
/// extrapolates along the short way round.
fn wrap_delta_deg(delta: f64) -> f64 {
    wrap_yaw_deg(delta)
}

/// Wrap a yaw angle into [-180, 180).
fn wrap_yaw_deg(yaw: f64) -> f64 {
    let wrapped = (yaw + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == 180.0 {
        -180.0
    } else {
        wrapped
    }
}
