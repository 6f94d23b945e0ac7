//! Selection engine errors.

use thiserror::Error;

use crate::geometry::GeometryError;
use crate::predict::PluginError;

/// Errors surfaced by the selection engine's operations.
///
/// Per-cycle degradations (geometry failure, empty search result) are not
/// errors: the cycle reports a [`CycleOutcome`](super::CycleOutcome) and the
/// previous selection stands.
#[derive(Debug, Error)]
pub enum SelectorError {
    /// Missing or zero required configuration, or a malformed input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The viewport has not been configured yet.
    #[error("viewport has not been configured")]
    NotConfigured,

    /// Geometry engine construction failed.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Plugin loading or configuration failed; predictive mode stays
    /// disabled for the session.
    #[error(transparent)]
    Plugin(#[from] PluginError),
}
