//! Candidate resolution strategies.
//!
//! The engine is parameterized by a pluggable "resolve candidates for
//! coverage" strategy rather than by selector subtypes. The shipped
//! [`NearestCandidateResolver`] implements extractor granularity (a
//! singleton set); tile-granularity strategies implement the same trait and
//! return the candidate set covering the viewport region.

use crate::catalog::{Candidate, CoverageIndex};
use crate::geometry::ContentCoverage;

/// Strategy resolving the active candidate set for a coverage region.
pub trait CandidateResolver: Send + Sync {
    /// Resolve the candidates to activate for the target coverage.
    ///
    /// An empty result means no decision could be made; the engine keeps the
    /// previous selection.
    fn resolve(&self, target: &ContentCoverage, index: &CoverageIndex) -> Vec<Candidate>;

    /// Human-readable strategy name.
    fn name(&self) -> &'static str;

    /// One-line description of the strategy.
    fn description(&self) -> &'static str;
}

/// Extractor-granularity strategy: the single candidate whose coverage
/// centre is nearest to the target's.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestCandidateResolver;

impl CandidateResolver for NearestCandidateResolver {
    fn resolve(&self, target: &ContentCoverage, index: &CoverageIndex) -> Vec<Candidate> {
        index.nearest(target).cloned().into_iter().collect()
    }

    fn name(&self) -> &'static str {
        "nearest"
    }

    fn description(&self) -> &'static str {
        "single nearest-coverage candidate (extractor granularity)"
    }
}
