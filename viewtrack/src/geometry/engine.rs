//! Black-box interface of the external projection geometry engine.

use super::types::{ContentCoverage, GeometryError, ViewportConfig};

/// Stateful external geometry engine.
///
/// One instance is constructed per configured viewport. Computing coverage is
/// a three-step sequence: set the viewing orientation, run the engine's
/// region-computation step, read back the coverage descriptor. Each step can
/// fail independently; failure is non-fatal for the caller's cycle.
///
/// Implementations are not required to tolerate concurrent calls; the caller
/// must serialize access.
pub trait GeometryEngine: Send {
    /// Set the engine's current viewing direction.
    fn set_orientation(&mut self, yaw_deg: f64, pitch_deg: f64) -> Result<(), GeometryError>;

    /// Run the engine's viewport region computation for the current direction.
    fn compute_region(&mut self) -> Result<(), GeometryError>;

    /// Read back the coverage descriptor produced by the last computation.
    fn read_coverage(&self) -> Result<ContentCoverage, GeometryError>;
}

/// Factory seam that constructs geometry engine instances.
///
/// Decouples the selection engine from the concrete projection library: the
/// factory receives a validated viewport configuration and returns a boxed
/// engine, or [`GeometryError::InitializationFailed`] for configurations the
/// engine itself rejects.
pub trait GeometryEngineFactory: Send + Sync {
    /// Construct an engine for the given viewport configuration.
    fn init(&self, config: &ViewportConfig) -> Result<Box<dyn GeometryEngine>, GeometryError>;
}
