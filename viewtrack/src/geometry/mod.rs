//! Viewport geometry: configuration, the external engine ABI, and the adapter.
//!
//! The projection mathematics that turns a viewing orientation into a content
//! coverage region lives in an external, stateful engine. This module only
//! defines its black-box interface ([`GeometryEngine`]), the factory seam the
//! selection engine uses to construct one ([`GeometryEngineFactory`]), and the
//! [`GeometryAdapter`] that owns the instance and runs the three-step
//! set-orientation / compute-region / read-coverage sequence.
//!
//! The adapter is not safe for concurrent invocation; the selection engine
//! serializes all calls on the decision-loop side.

mod adapter;
mod engine;
mod types;

pub use adapter::GeometryAdapter;
pub use engine::{GeometryEngine, GeometryEngineFactory};
pub use types::{
    ContentCoverage, GeometryError, HeadsetInfo, Projection, TileGrid, ViewportConfig,
};
