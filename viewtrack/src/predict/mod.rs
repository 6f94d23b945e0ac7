//! Orientation prediction plugins.
//!
//! Predictive selection is pluggable: a [`PredictPlugin`] consumes the
//! orientation history (oldest first) and proposes where the viewer will be
//! looking one prediction horizon from now. Plugins are named, resolved from
//! a library directory through the [`PluginResolver`] seam, and owned by the
//! [`PluginManager`] with an explicit load/configure/teardown lifecycle.
//!
//! Failure semantics: a load or initialize failure disables predictive mode
//! for the session (the engine continues with direct selection); a `predict`
//! call returning `None` is a normal per-call miss, not an error.

mod manager;
mod plugin;

pub use manager::{LibraryPathResolver, PluginManager, PluginResolver};
pub use plugin::{
    LinearPredictor, PluginError, PredictMode, PredictOptions, PredictedOrientation,
    PredictPlugin,
};
