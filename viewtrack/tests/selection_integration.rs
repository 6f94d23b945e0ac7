//! Integration tests for the selection engine.
//!
//! These tests verify the complete selection flow including:
//! - Viewport configuration and the initial evaluation cycle
//! - Direct and predictive decision paths with hysteresis
//! - Switch detection and downstream notification ordering
//! - Plugin lifecycle failures falling back to direct selection
//!
//! Run with: `cargo test --test selection_integration`

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use viewtrack::catalog::{Candidate, TrackCatalog};
use viewtrack::geometry::{
    ContentCoverage, GeometryEngine, GeometryEngineFactory, GeometryError, HeadsetInfo,
    Projection, ViewportConfig,
};
use viewtrack::orientation::OrientationSample;
use viewtrack::predict::{
    LibraryPathResolver, PluginError, PredictOptions, PredictPlugin, PredictedOrientation,
};
use viewtrack::selector::{
    CycleOutcome, DownstreamPipeline, NearestCandidateResolver, SelectionConfig, SelectionEngine,
    SelectorError,
};
use viewtrack::service::SelectionService;

// ============================================================================
// Test Collaborators
// ============================================================================

/// Geometry engine that centres coverage on the last set orientation.
struct CentredEngine {
    yaw: f64,
    pitch: f64,
    fail: Arc<AtomicBool>,
}

impl GeometryEngine for CentredEngine {
    fn set_orientation(&mut self, yaw_deg: f64, pitch_deg: f64) -> Result<(), GeometryError> {
        self.yaw = yaw_deg;
        self.pitch = pitch_deg;
        Ok(())
    }

    fn compute_region(&mut self) -> Result<(), GeometryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GeometryError::ComputeRegion("injected failure".into()));
        }
        Ok(())
    }

    fn read_coverage(&self) -> Result<ContentCoverage, GeometryError> {
        Ok(ContentCoverage::new(self.yaw, self.pitch, 90.0, 90.0))
    }
}

/// Factory counting engine constructions, with an injectable failure flag.
struct CentredFactory {
    fail: Arc<AtomicBool>,
    init_calls: Arc<AtomicUsize>,
}

impl CentredFactory {
    fn new() -> (Self, Arc<AtomicBool>, Arc<AtomicUsize>) {
        let fail = Arc::new(AtomicBool::new(false));
        let init_calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                fail: fail.clone(),
                init_calls: init_calls.clone(),
            },
            fail,
            init_calls,
        )
    }
}

impl GeometryEngineFactory for CentredFactory {
    fn init(&self, _config: &ViewportConfig) -> Result<Box<dyn GeometryEngine>, GeometryError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CentredEngine {
            yaw: 0.0,
            pitch: 0.0,
            fail: self.fail.clone(),
        }))
    }
}

/// Catalog serving a fixed candidate list.
struct StaticCatalog(Vec<Candidate>);

impl TrackCatalog for StaticCatalog {
    fn list_candidates(&self) -> Vec<Candidate> {
        self.0.clone()
    }
}

/// Pipeline recording every notification and publication.
#[derive(Default)]
struct RecordingPipeline {
    notified: Mutex<Vec<Vec<u32>>>,
    published: Mutex<Vec<Vec<u32>>>,
}

impl RecordingPipeline {
    fn notified(&self) -> Vec<Vec<u32>> {
        self.notified.lock().clone()
    }

    fn published_ids(&self) -> Vec<Vec<u32>> {
        self.published.lock().clone()
    }
}

/// Newtype so the foreign `DownstreamPipeline` trait can be implemented for a
/// shared `RecordingPipeline` handle without violating the orphan rule.
struct PipelineHandle(Arc<RecordingPipeline>);

impl DownstreamPipeline for PipelineHandle {
    fn notify_active_set_changed(&self, tracks: &[u32]) {
        self.0.notified.lock().push(tracks.to_vec());
    }

    fn publish_active_set(&self, candidates: &[Candidate]) {
        self.0
            .published
            .lock()
            .push(candidates.iter().map(|c| c.id).collect());
    }
}

/// Prediction plugin that never produces a prediction.
struct HoldPlugin;

impl PredictPlugin for HoldPlugin {
    fn initialize(&mut self, _options: &PredictOptions) -> Result<(), PluginError> {
        Ok(())
    }
    fn feed(&mut self, _sample: &OrientationSample) {}
    fn predict(&mut self, _history: &[OrientationSample]) -> Option<PredictedOrientation> {
        None
    }
    fn destroy(&mut self) {}
}

/// Prediction plugin that always predicts a fixed orientation.
struct JumpPlugin {
    yaw_deg: f64,
    pitch_deg: f64,
}

impl PredictPlugin for JumpPlugin {
    fn initialize(&mut self, _options: &PredictOptions) -> Result<(), PluginError> {
        Ok(())
    }
    fn feed(&mut self, _sample: &OrientationSample) {}
    fn predict(&mut self, _history: &[OrientationSample]) -> Option<PredictedOrientation> {
        Some(PredictedOrientation {
            yaw_deg: self.yaw_deg,
            pitch_deg: self.pitch_deg,
        })
    }
    fn destroy(&mut self) {}
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Front (0°) and east (90°) candidates, the fixture most tests use.
fn front_and_east() -> Vec<Candidate> {
    vec![
        Candidate::new(1, 101, ContentCoverage::new(0.0, 0.0, 90.0, 90.0)),
        Candidate::new(2, 202, ContentCoverage::new(90.0, 0.0, 90.0, 90.0)),
    ]
}

fn viewport() -> ViewportConfig {
    ViewportConfig {
        width: 1920,
        height: 1080,
        horizontal_fov_deg: 80.0,
        vertical_fov_deg: 80.0,
        projection: Projection::Equirectangular {
            tile_rows: 6,
            tile_cols: 12,
        },
    }
}

fn headset(yaw_deg: f64, pitch_deg: f64) -> HeadsetInfo {
    HeadsetInfo {
        initial_yaw_deg: yaw_deg,
        initial_pitch_deg: pitch_deg,
    }
}

struct Harness {
    engine: Arc<SelectionEngine>,
    pipeline: Arc<RecordingPipeline>,
    geometry_fail: Arc<AtomicBool>,
    init_calls: Arc<AtomicUsize>,
    /// Library directory holding module files for the registered plugins.
    library: tempfile::TempDir,
}

/// Build an engine over the given candidates with recording collaborators
/// and the `hold`/`jump` test plugins registered.
fn harness(config: SelectionConfig, candidates: Vec<Candidate>) -> Harness {
    let (factory, geometry_fail, init_calls) = CentredFactory::new();
    let pipeline = Arc::new(RecordingPipeline::default());

    let mut resolver = LibraryPathResolver::new();
    resolver.register("hold", || Box::new(HoldPlugin));
    resolver.register("jump", || {
        Box::new(JumpPlugin {
            yaw_deg: 90.0,
            pitch_deg: 0.0,
        })
    });

    let library = tempfile::tempdir().unwrap();
    std::fs::write(library.path().join("hold"), b"").unwrap();
    std::fs::write(library.path().join("jump"), b"").unwrap();

    let engine = Arc::new(SelectionEngine::new(
        config,
        Box::new(factory),
        &StaticCatalog(candidates),
        Box::new(NearestCandidateResolver),
        Box::new(PipelineHandle(pipeline.clone())),
        Box::new(resolver),
    ));

    Harness {
        engine,
        pipeline,
        geometry_fail,
        init_calls,
        library,
    }
}

fn record(engine: &SelectionEngine, yaw_deg: f64, pitch_deg: f64) {
    engine
        .record_orientation(OrientationSample::new(yaw_deg, pitch_deg))
        .unwrap();
}

// ============================================================================
// Scenario Tests
// ============================================================================

/// Scenario A: identical orientations never switch after the first adoption.
#[test]
fn test_identical_orientations_no_switch_after_first_adoption() {
    let config = SelectionConfig {
        history_capacity: 3,
        ..SelectionConfig::default()
    };
    let h = harness(config, front_and_east());

    h.engine
        .configure_viewport(&headset(0.0, 0.0), viewport())
        .unwrap();
    assert_eq!(h.pipeline.notified().len(), 1);

    for _ in 0..2 {
        record(&h.engine, 0.0, 0.0);
        let outcome = h.engine.select_once().unwrap();
        assert_eq!(outcome, CycleOutcome::Adopted { switched: false });
    }

    // First adoption only; the zero deltas never fire a switch.
    assert_eq!(h.pipeline.notified().len(), 1);
    assert_eq!(h.pipeline.notified()[0], vec![101]);
}

/// Scenario B: a yaw sweep from the front to the east candidate fires one
/// switch notifying the new active track set.
#[test]
fn test_yaw_sweep_switches_candidate() {
    let config = SelectionConfig {
        history_capacity: 5,
        ..SelectionConfig::default()
    };
    let h = harness(config, front_and_east());

    h.engine
        .configure_viewport(&headset(2.0, 0.0), viewport())
        .unwrap();
    assert_eq!(h.engine.current_selection()[0].id, 1);

    record(&h.engine, 88.0, 0.0);
    let outcome = h.engine.select_once().unwrap();
    assert_eq!(outcome, CycleOutcome::Adopted { switched: true });
    assert_eq!(h.engine.current_selection()[0].id, 2);

    // Eviction notification carries the new active track set, then the new
    // candidate set is published.
    assert_eq!(h.pipeline.notified(), vec![vec![101], vec![202]]);
    assert_eq!(h.pipeline.published_ids(), vec![vec![1], vec![2]]);
}

/// Scenario C: prediction misses past the onboarding threshold keep the
/// selection unchanged, with no direct fallback.
#[test]
fn test_prediction_miss_past_onboarding_keeps_selection() {
    let config = SelectionConfig {
        history_capacity: 5,
        onboarding_threshold: 2,
        ..SelectionConfig::default()
    };
    let h = harness(config, front_and_east());

    h.engine
        .configure_viewport(&headset(0.0, 0.0), viewport())
        .unwrap();
    h.engine
        .enable_prediction("hold", h.library.path(), true)
        .unwrap();

    record(&h.engine, 10.0, 0.0);
    record(&h.engine, 20.0, 0.0);
    record(&h.engine, 30.0, 0.0);

    for _ in 0..3 {
        let outcome = h.engine.select_once().unwrap();
        assert_eq!(outcome, CycleOutcome::Kept);
        assert_eq!(h.engine.current_selection()[0].id, 1);
    }

    // The onboarded predictive path consumes no history and fires nothing.
    assert_eq!(h.engine.history_len(), 3);
    assert_eq!(h.pipeline.notified().len(), 1);
}

/// Scenario D: zero horizontal FOV for equirectangular fails immediately and
/// no geometry engine instance is created.
#[test]
fn test_zero_fov_rejected_before_engine_creation() {
    let h = harness(SelectionConfig::default(), front_and_east());

    let mut config = viewport();
    config.horizontal_fov_deg = 0.0;

    let result = h.engine.configure_viewport(&headset(0.0, 0.0), config);
    assert!(matches!(result, Err(SelectorError::InvalidArgument(_))));
    assert_eq!(h.init_calls.load(Ordering::SeqCst), 0);
    assert!(h.pipeline.notified().is_empty());
}

/// Scenario E: unresolvable plugin path fails the load, predictive mode
/// stays disabled, and subsequent cycles use the direct path exclusively.
#[test]
fn test_plugin_load_failure_falls_back_to_direct_mode() {
    let config = SelectionConfig {
        history_capacity: 5,
        ..SelectionConfig::default()
    };
    let h = harness(config, front_and_east());

    h.engine
        .configure_viewport(&headset(2.0, 0.0), viewport())
        .unwrap();

    let missing = tempfile::tempdir().unwrap();
    let result = h.engine.enable_prediction("hold", missing.path(), true);
    assert!(matches!(
        result,
        Err(SelectorError::Plugin(PluginError::LoadFailure { .. }))
    ));
    assert!(!h.engine.prediction_enabled());

    // Direct selection still works.
    record(&h.engine, 88.0, 0.0);
    let outcome = h.engine.select_once().unwrap();
    assert_eq!(outcome, CycleOutcome::Adopted { switched: true });
    assert_eq!(h.engine.current_selection()[0].id, 2);
}

// ============================================================================
// Hysteresis, Stickiness, Prediction
// ============================================================================

/// Identical consecutive orientations with history length > 1 at each
/// evaluation yield at most one switch notification.
#[test]
fn test_hysteresis_suppresses_reevaluation() {
    let config = SelectionConfig {
        history_capacity: 8,
        ..SelectionConfig::default()
    };
    let h = harness(config, front_and_east());

    h.engine
        .configure_viewport(&headset(88.0, 0.0), viewport())
        .unwrap();
    assert_eq!(h.pipeline.notified(), vec![vec![202]]);

    // Several identical updates queued so more than one sample remains at
    // each evaluation.
    for _ in 0..4 {
        record(&h.engine, 88.0, 0.0);
    }
    let first = h.engine.select_once().unwrap();
    let second = h.engine.select_once().unwrap();
    assert_eq!(first, CycleOutcome::Suppressed);
    assert_eq!(second, CycleOutcome::Suppressed);

    assert_eq!(h.pipeline.notified().len(), 1);
}

/// A failing geometry cycle degrades to "no decision" and never clears an
/// adopted selection.
#[test]
fn test_failing_geometry_keeps_selection() {
    let h = harness(SelectionConfig::default(), front_and_east());

    h.engine
        .configure_viewport(&headset(2.0, 0.0), viewport())
        .unwrap();
    assert_eq!(h.engine.current_selection()[0].id, 1);

    h.geometry_fail.store(true, Ordering::SeqCst);
    record(&h.engine, 88.0, 0.0);
    let outcome = h.engine.select_once().unwrap();
    assert_eq!(outcome, CycleOutcome::Kept);
    assert_eq!(h.engine.current_selection()[0].id, 1);
    assert_eq!(h.pipeline.notified().len(), 1);
}

/// A catalog without coverage data yields no decisions and no pipeline
/// traffic.
#[test]
fn test_uncovered_catalog_never_selects() {
    let candidates = vec![
        Candidate::without_coverage(1, 101),
        Candidate::without_coverage(2, 202),
    ];
    let h = harness(SelectionConfig::default(), candidates);

    h.engine
        .configure_viewport(&headset(0.0, 0.0), viewport())
        .unwrap();
    record(&h.engine, 45.0, 0.0);
    let outcome = h.engine.select_once().unwrap();
    assert_eq!(outcome, CycleOutcome::Kept);
    assert!(h.engine.current_selection().is_empty());
    assert!(h.pipeline.notified().is_empty());
}

/// With an empty history the direct path makes no decision.
#[test]
fn test_empty_history_is_idle() {
    let h = harness(SelectionConfig::default(), front_and_east());
    h.engine
        .configure_viewport(&headset(0.0, 0.0), viewport())
        .unwrap();

    // configure_viewport consumed the initial sample.
    assert_eq!(h.engine.select_once().unwrap(), CycleOutcome::Idle);
}

/// The predicted orientation, not the raw one, drives coverage and search.
#[test]
fn test_predicted_orientation_drives_selection() {
    let h = harness(SelectionConfig::default(), front_and_east());

    h.engine
        .configure_viewport(&headset(0.0, 0.0), viewport())
        .unwrap();
    h.engine
        .enable_prediction("jump", h.library.path(), true)
        .unwrap();

    // Raw samples stay near the front candidate; the plugin predicts 90°.
    record(&h.engine, 1.0, 0.0);
    record(&h.engine, 2.0, 0.0);
    let outcome = h.engine.select_once().unwrap();
    assert_eq!(outcome, CycleOutcome::Adopted { switched: true });
    assert_eq!(h.engine.current_selection()[0].id, 2);
}

/// Selecting without a configured viewport is an error, not a crash.
#[test]
fn test_select_before_configure_is_not_configured() {
    let h = harness(SelectionConfig::default(), front_and_east());
    assert!(matches!(
        h.engine.select_once(),
        Err(SelectorError::NotConfigured)
    ));
}

/// Random orientation storms never overflow the history or clear the
/// selection.
#[test]
fn test_random_orientation_storm() {
    use rand::Rng;

    let config = SelectionConfig {
        history_capacity: 8,
        ..SelectionConfig::default()
    };
    let h = harness(config, front_and_east());
    h.engine
        .configure_viewport(&headset(0.0, 0.0), viewport())
        .unwrap();

    let mut rng = rand::rng();
    for i in 0..200 {
        let yaw = rng.random_range(-180.0..180.0);
        let pitch = rng.random_range(-90.0..90.0);
        record(&h.engine, yaw, pitch);
        assert!(h.engine.history_len() <= 8);
        if i % 5 == 0 {
            h.engine.select_once().unwrap();
            assert!(!h.engine.current_selection().is_empty());
        }
    }
}

// ============================================================================
// Service Loop
// ============================================================================

/// Samples flow from the producer channel through the engine, and
/// cancellation stops the loop and tears plugins down.
#[tokio::test]
async fn test_service_records_selects_and_shuts_down() {
    let config = SelectionConfig {
        history_capacity: 5,
        ..SelectionConfig::default()
    };
    let h = harness(config, front_and_east());

    h.engine
        .configure_viewport(&headset(2.0, 0.0), viewport())
        .unwrap();
    h.engine
        .enable_prediction("hold", h.library.path(), true)
        .unwrap();
    assert!(h.engine.prediction_enabled());

    let (tx, rx) = mpsc::channel(16);
    let token = CancellationToken::new();
    let service = SelectionService::new(h.engine.clone(), Duration::from_millis(5));
    let handle = tokio::spawn(service.run(rx, token.clone()));

    tx.send(OrientationSample::new(88.0, 0.0)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    token.cancel();
    handle.await.unwrap();

    // The east candidate was adopted and plugins were torn down on exit.
    assert_eq!(h.engine.current_selection()[0].id, 2);
    assert!(!h.engine.prediction_enabled());
}
