//! The selection engine: direct and predictive decision paths, hysteresis,
//! switch detection, and downstream notification.
//!
//! Two sibling granularities share the same orientation/prediction machinery:
//!
//! - **Extractor granularity**: exactly one active candidate, resolved by
//!   [`NearestCandidateResolver`].
//! - **Tile granularity**: a set of active candidates, resolved by a
//!   projection-specific [`CandidateResolver`] implementation; switch
//!   detection generalizes via set difference.
//!
//! A cycle runs to completion or fails fast at any step, always leaving the
//! previous selection intact: once adopted, the current selection is never
//! reset to empty by a failed cycle.

mod engine;
mod error;
mod state;
mod strategy;

pub use engine::{CycleOutcome, DownstreamPipeline, SelectionConfig, SelectionEngine};
pub use error::SelectorError;
pub use state::SelectionState;
pub use strategy::{CandidateResolver, NearestCandidateResolver};
