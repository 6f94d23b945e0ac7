//! Head orientation samples and bounded history.
//!
//! Maintains a capacity-bounded ring of recent head orientation samples,
//! newest first. The history is the single cross-thread input to the
//! selection engine: a head-tracking producer records samples while the
//! decision loop consumes them, both serialized by the engine's lock.
//!
//! # Design
//!
//! - Samples are plain `Copy` values; eviction is a container pop, no manual
//!   release bookkeeping.
//! - The newest sample is consumed at most once by the direct selection path
//!   ([`OrientationHistory::pop_newest`]).
//! - Prediction plugins receive the history oldest first
//!   ([`OrientationHistory::snapshot_oldest_first`]).

mod history;

pub use history::{OrientationError, OrientationHistory, OrientationSample};
