//! Viewtrack - viewport-driven track selection for tiled omnidirectional video
//!
//! This library decides, in real time, which transport-level video candidates
//! (one pre-packaged extractor stream or a set of tiled sub-streams) a
//! tile-based 360° video client should actively fetch, driven by the viewer's
//! live head orientation.
//!
//! # High-Level API
//!
//! The [`selector::SelectionEngine`] is the core: it owns the bounded
//! orientation history, drives direct and predictive decision paths, applies
//! hysteresis, searches the candidate coverage index, and notifies the
//! downstream pipeline on selection changes. The [`service`] module wires the
//! engine into an async producer/consumer loop:
//!
//! ```ignore
//! use std::sync::Arc;
//! use viewtrack::selector::{SelectionConfig, SelectionEngine, NearestCandidateResolver};
//! use viewtrack::service::SelectionService;
//!
//! let engine = Arc::new(SelectionEngine::new(
//!     SelectionConfig::default(),
//!     geometry_factory,
//!     &catalog,
//!     Box::new(NearestCandidateResolver),
//!     pipeline,
//!     plugin_resolver,
//! ));
//! engine.configure_viewport(&headset, viewport)?;
//!
//! let service = SelectionService::new(engine, cycle_interval);
//! tokio::spawn(service.run(sample_rx, cancellation_token));
//! ```

pub mod catalog;
pub mod geometry;
pub mod logging;
pub mod orientation;
pub mod predict;
pub mod selector;
pub mod service;

/// Version of the viewtrack library.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
