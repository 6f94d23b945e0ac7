//! Adapter owning one external geometry engine instance.

use tracing::debug;

use super::engine::{GeometryEngine, GeometryEngineFactory};
use super::types::{ContentCoverage, GeometryError, ViewportConfig};

/// Owns one stateful geometry engine, constructed once from a viewport
/// configuration.
///
/// Not safe for concurrent invocation; the selection engine serializes all
/// calls behind its geometry lock.
pub struct GeometryAdapter {
    engine: Box<dyn GeometryEngine>,
    config: ViewportConfig,
}

impl GeometryAdapter {
    /// Construct the engine via the factory.
    ///
    /// The configuration must already be validated; the engine may still
    /// reject it with [`GeometryError::InitializationFailed`].
    pub fn new(
        factory: &dyn GeometryEngineFactory,
        config: ViewportConfig,
    ) -> Result<Self, GeometryError> {
        let engine = factory.init(&config)?;
        debug!(?config.projection, "geometry engine initialized");
        Ok(Self { engine, config })
    }

    /// The viewport configuration this adapter was built from.
    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Compute the content coverage for a viewing orientation.
    ///
    /// Runs the engine's set-orientation, compute-region, and read-coverage
    /// steps in order. Any failing step surfaces as a [`GeometryError`],
    /// which callers treat as "no decision this cycle".
    pub fn compute_coverage(
        &mut self,
        yaw_deg: f64,
        pitch_deg: f64,
    ) -> Result<ContentCoverage, GeometryError> {
        self.engine.set_orientation(yaw_deg, pitch_deg)?;
        self.engine.compute_region()?;
        self.engine.read_coverage()
    }
}

impl std::fmt::Debug for GeometryAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryAdapter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
