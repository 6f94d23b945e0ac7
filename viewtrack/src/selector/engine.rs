//! The selection engine's decision cycle.

use std::collections::BTreeSet;
use std::path::Path;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::catalog::{Candidate, CoverageIndex, TrackCatalog, TrackId};
use crate::geometry::{GeometryAdapter, GeometryEngineFactory, HeadsetInfo, ViewportConfig};
use crate::orientation::OrientationSample;
use crate::predict::{PluginManager, PluginResolver, PredictOptions, PredictedOrientation};

use super::error::SelectorError;
use super::state::EngineShared;
use super::strategy::CandidateResolver;

/// Default orientation history capacity.
const DEFAULT_HISTORY_CAPACITY: usize = 30;

/// Default hysteresis threshold in degrees.
const DEFAULT_HYSTERESIS_DEG: f64 = 1e-3;

/// Selection engine tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Maximum orientation samples retained.
    pub history_capacity: usize,
    /// History length at which predictive mode stops falling back to direct
    /// selection when a prediction is unavailable.
    pub onboarding_threshold: usize,
    /// Orientation delta below which re-evaluation is suppressed.
    pub hysteresis_deg: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            onboarding_threshold: DEFAULT_HISTORY_CAPACITY,
            hysteresis_deg: DEFAULT_HYSTERESIS_DEG,
        }
    }
}

/// What one decision cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No unconsumed orientation sample; nothing to decide.
    Idle,
    /// Hysteresis suppressed re-evaluation; selection kept.
    Suppressed,
    /// The cycle degraded (no prediction past onboarding, geometry failure,
    /// or empty search result); selection kept.
    Kept,
    /// A candidate set was adopted; `switched` is false for the first
    /// adoption.
    Adopted { switched: bool },
}

/// Downstream segment pipeline notified on selection changes.
pub trait DownstreamPipeline: Send + Sync {
    /// Called with the new active track set before it is relied upon, so the
    /// pipeline can evict buffered data for deactivated tracks.
    fn notify_active_set_changed(&self, tracks: &[TrackId]);

    /// Informs the pipeline which candidates to fetch next.
    fn publish_active_set(&self, candidates: &[Candidate]);
}

/// Outcome of the predictive path before evaluation.
enum PredictStep {
    /// A prediction was produced; evaluate it.
    Predicted(PredictedOrientation),
    /// No prediction and onboarding is complete; keep the selection.
    KeepCurrent,
    /// Not enough history for prediction; use the direct path.
    FallThrough,
}

/// Orchestrates history, geometry, the coverage index, and prediction into
/// per-cycle selection decisions.
///
/// The engine is `Send + Sync`: orientation recording (and plugin feeding)
/// may run concurrently with an in-flight decision cycle, while all
/// decision-cycle work is serialized on the consumer side. Geometry and
/// plugin calls never happen under the shared-state lock.
pub struct SelectionEngine {
    config: SelectionConfig,
    shared: Mutex<EngineShared>,
    geometry: Mutex<Option<GeometryAdapter>>,
    plugins: Mutex<PluginManager>,
    /// Name of the active prediction plugin, if predictive mode is enabled.
    prediction: Mutex<Option<String>>,
    factory: Box<dyn GeometryEngineFactory>,
    index: CoverageIndex,
    resolver: Box<dyn CandidateResolver>,
    pipeline: Box<dyn DownstreamPipeline>,
}

impl SelectionEngine {
    /// Create an engine over a pre-resolved candidate catalog.
    pub fn new(
        config: SelectionConfig,
        factory: Box<dyn GeometryEngineFactory>,
        catalog: &dyn TrackCatalog,
        resolver: Box<dyn CandidateResolver>,
        pipeline: Box<dyn DownstreamPipeline>,
        plugin_resolver: Box<dyn PluginResolver>,
    ) -> Self {
        let shared = EngineShared::with_history_capacity(config.history_capacity);
        Self {
            shared: Mutex::new(shared),
            geometry: Mutex::new(None),
            plugins: Mutex::new(PluginManager::new(plugin_resolver)),
            prediction: Mutex::new(None),
            factory,
            index: CoverageIndex::from_catalog(catalog),
            resolver,
            pipeline,
            config,
        }
    }

    /// Validate the viewport, construct the geometry engine, and run the
    /// initial orientation through one evaluation cycle so a selection
    /// exists before any live update arrives.
    pub fn configure_viewport(
        &self,
        headset: &HeadsetInfo,
        config: ViewportConfig,
    ) -> Result<(), SelectorError> {
        config
            .validate()
            .map_err(|e| SelectorError::InvalidArgument(e.to_string()))?;

        let adapter = GeometryAdapter::new(self.factory.as_ref(), config)?;
        *self.geometry.lock() = Some(adapter);

        let initial = OrientationSample::new(headset.initial_yaw_deg, headset.initial_pitch_deg);
        self.record_orientation(initial)?;
        let outcome = self.select_once()?;
        debug!(?outcome, "initial selection cycle");
        Ok(())
    }

    /// Enable predictive selection with the named plugin.
    ///
    /// A load or configure failure leaves predictive mode disabled for the
    /// session; the engine continues with direct selection.
    pub fn enable_prediction(
        &self,
        name: &str,
        library_dir: &Path,
        single_target: bool,
    ) -> Result<(), SelectorError> {
        let mut plugins = self.plugins.lock();
        plugins.load(name, library_dir)?;

        let options = if single_target {
            PredictOptions::single_target()
        } else {
            PredictOptions::multi_target()
        };
        if let Err(e) = plugins.configure(name, &options) {
            plugins.unload(name);
            return Err(e.into());
        }
        drop(plugins);

        *self.prediction.lock() = Some(name.to_string());
        info!(plugin = name, single_target, "predictive selection enabled");
        Ok(())
    }

    /// Whether predictive mode is currently enabled.
    pub fn prediction_enabled(&self) -> bool {
        self.prediction.lock().is_some()
    }

    /// Record a fresh orientation sample.
    ///
    /// Pushes into the bounded history and feeds the active prediction
    /// plugin (outside the shared-state lock). Safe to call from the
    /// producer thread while a decision cycle is in flight.
    pub fn record_orientation(&self, sample: OrientationSample) -> Result<(), SelectorError> {
        self.shared
            .lock()
            .history
            .record(sample)
            .map_err(|e| SelectorError::InvalidArgument(e.to_string()))?;

        let active = self.prediction.lock().clone();
        if let Some(name) = active {
            self.plugins.lock().feed(&name, &sample);
        }
        Ok(())
    }

    /// Run one decision cycle.
    ///
    /// Fails fast at any step, always leaving the previous selection intact.
    pub fn select_once(&self) -> Result<CycleOutcome, SelectorError> {
        if self.geometry.lock().is_none() {
            return Err(SelectorError::NotConfigured);
        }

        let active = self.prediction.lock().clone();
        if let Some(name) = active {
            match self.predict_step(&name) {
                PredictStep::Predicted(predicted) => return self.evaluate(Some(predicted)),
                PredictStep::KeepCurrent => {
                    trace!("prediction unavailable past onboarding, keeping selection");
                    return Ok(CycleOutcome::Kept);
                }
                PredictStep::FallThrough => {}
            }
        }
        self.evaluate(None)
    }

    /// Tear the engine down, destroying all loaded prediction plugins.
    pub fn shutdown(&self) {
        *self.prediction.lock() = None;
        self.plugins.lock().shutdown();
    }

    /// The currently active candidate set (empty until the first adoption).
    pub fn current_selection(&self) -> Vec<Candidate> {
        self.shared.lock().selection.current.clone()
    }

    /// Number of unconsumed samples in the history.
    pub fn history_len(&self) -> usize {
        self.shared.lock().history.len()
    }

    /// Name of the configured candidate resolution strategy.
    pub fn resolver_name(&self) -> &'static str {
        self.resolver.name()
    }

    /// Ask the active plugin for a prediction, without consuming history.
    ///
    /// The prediction request runs before any sample is popped, matching the
    /// observed ordering: a missed prediction past onboarding leaves the
    /// history untouched.
    fn predict_step(&self, name: &str) -> PredictStep {
        let history = {
            let shared = self.shared.lock();
            if shared.history.len() <= 1 {
                return PredictStep::FallThrough;
            }
            shared.history.snapshot_oldest_first()
        };

        match self.plugins.lock().predict(name, &history) {
            Some(predicted) => PredictStep::Predicted(predicted),
            None if history.len() < self.config.onboarding_threshold => PredictStep::FallThrough,
            None => PredictStep::KeepCurrent,
        }
    }

    /// Consume the newest sample and evaluate the candidate orientation
    /// (predicted if given, otherwise the consumed sample itself).
    fn evaluate(
        &self,
        predicted: Option<PredictedOrientation>,
    ) -> Result<CycleOutcome, SelectorError> {
        // Pop and hysteresis bookkeeping under the shared lock; geometry and
        // search run outside it.
        let (observed, previous, remaining) = {
            let mut shared = self.shared.lock();
            let Some(sample) = shared.history.pop_newest() else {
                return Ok(CycleOutcome::Idle);
            };
            let previous = shared.selection.previous_orientation.replace(sample);
            (sample, previous, shared.history.len())
        };

        let (target_yaw, target_pitch) = match predicted {
            Some(p) => (p.yaw_deg, p.pitch_deg),
            None => (observed.yaw_deg, observed.pitch_deg),
        };

        if let Some(prev) = previous {
            let yaw_delta = (target_yaw - prev.yaw_deg).abs();
            let pitch_delta = (target_pitch - prev.pitch_deg).abs();
            if yaw_delta < self.config.hysteresis_deg
                && pitch_delta < self.config.hysteresis_deg
                && remaining > 1
            {
                trace!("orientation unchanged, suppressing re-evaluation");
                return Ok(CycleOutcome::Suppressed);
            }
        }

        let coverage = {
            let mut geometry = self.geometry.lock();
            let adapter = geometry.as_mut().ok_or(SelectorError::NotConfigured)?;
            match adapter.compute_coverage(target_yaw, target_pitch) {
                Ok(coverage) => coverage,
                Err(e) => {
                    warn!(error = %e, "coverage computation failed, keeping selection");
                    return Ok(CycleOutcome::Kept);
                }
            }
        };

        let resolved = self.resolver.resolve(&coverage, &self.index);
        if resolved.is_empty() {
            trace!("no candidate resolved, keeping selection");
            return Ok(CycleOutcome::Kept);
        }

        if let Some(prev) = previous {
            debug!(
                from = ?(prev.yaw_deg, prev.pitch_deg),
                to = ?(target_yaw, target_pitch),
                candidates = resolved.len(),
                "orientation changed"
            );
        }

        Ok(self.adopt(resolved))
    }

    /// Adopt the resolved set, signaling the pipeline on switch or first
    /// adoption.
    fn adopt(&self, resolved: Vec<Candidate>) -> CycleOutcome {
        let (first, switched) = {
            let mut shared = self.shared.lock();
            let first = !shared.selection.has_selection();
            let switched = !first && !same_id_set(&shared.selection.current, &resolved);
            shared.selection.current = resolved.clone();
            (first, switched)
        };

        if first || switched {
            let tracks: Vec<TrackId> = resolved.iter().map(|c| c.track).collect();
            info!(?tracks, switched, "active candidate set changed");
            // Notify before the pipeline relies on the new set, so buffered
            // data for deactivated tracks can be evicted.
            self.pipeline.notify_active_set_changed(&tracks);
            self.pipeline.publish_active_set(&resolved);
        }

        CycleOutcome::Adopted { switched }
    }
}

impl std::fmt::Debug for SelectionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionEngine")
            .field("config", &self.config)
            .field("strategy", &self.resolver.name())
            .field("candidates", &self.index.len())
            .finish_non_exhaustive()
    }
}

/// Whether two candidate sets contain the same candidate ids.
fn same_id_set(a: &[Candidate], b: &[Candidate]) -> bool {
    let lhs: BTreeSet<u32> = a.iter().map(|c| c.id).collect();
    let rhs: BTreeSet<u32> = b.iter().map(|c| c.id).collect();
    lhs == rhs
}
