//! Candidate catalog and coverage index.
//!
//! Candidates are the selectable transport tracks: either pre-packaged
//! extractor streams or individual tiled sub-streams, each with static
//! content coverage resolved by the manifest layer before the selection
//! engine ever sees them. The engine only references candidates, it never
//! creates or destroys them.
//!
//! The [`CoverageIndex`] performs the nearest-candidate search: planar
//! Euclidean distance between coverage centres. All candidates are assumed
//! to share equal azimuth/elevation ranges, so centre distance alone ranks
//! overlap; this is a documented simplification, not general polygon
//! intersection.

use crate::geometry::ContentCoverage;

/// Transport track identifier.
pub type TrackId = u32;

/// A selectable transport track with known static coverage.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Stable candidate identifier, unique within the catalog.
    pub id: u32,
    /// Transport track number the downstream pipeline fetches.
    pub track: TrackId,
    /// Static content coverage, if the catalog resolved one.
    pub coverage: Option<ContentCoverage>,
}

impl Candidate {
    /// Create a candidate with resolved coverage.
    pub fn new(id: u32, track: TrackId, coverage: ContentCoverage) -> Self {
        Self {
            id,
            track,
            coverage: Some(coverage),
        }
    }

    /// Create a candidate the catalog could not resolve coverage for.
    pub fn without_coverage(id: u32, track: TrackId) -> Self {
        Self {
            id,
            track,
            coverage: None,
        }
    }
}

/// Read-only catalog collaborator supplying the candidate list.
///
/// Candidates are returned in catalog order; the order is the tie-break for
/// the nearest-candidate search.
pub trait TrackCatalog: Send + Sync {
    /// The full candidate list, coverage pre-resolved, in catalog order.
    fn list_candidates(&self) -> Vec<Candidate>;
}

/// Static per-candidate coverage metadata with nearest-candidate search.
#[derive(Debug, Clone, Default)]
pub struct CoverageIndex {
    candidates: Vec<Candidate>,
}

impl CoverageIndex {
    /// Build an index over candidates in catalog order.
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    /// Build an index from the catalog collaborator.
    pub fn from_catalog(catalog: &dyn TrackCatalog) -> Self {
        Self::new(catalog.list_candidates())
    }

    /// The indexed candidates in catalog order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Number of indexed candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the index holds no candidates.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidate whose coverage centre is nearest to the target's.
    ///
    /// Scans in catalog order keeping the first candidate with a strictly
    /// smaller distance than all previously seen, so ties break toward the
    /// earliest catalog entry. Candidates without coverage are skipped.
    ///
    /// `None` means no candidate carries coverage data (or the set is
    /// empty) - a normal "keep previous selection" signal, not an error.
    pub fn nearest(&self, target: &ContentCoverage) -> Option<&Candidate> {
        let mut best: Option<(&Candidate, f64)> = None;
        for candidate in &self.candidates {
            let Some(coverage) = &candidate.coverage else {
                continue;
            };
            let distance = coverage.centre_distance(target);
            match best {
                Some((_, least)) if distance >= least => {}
                _ => best = Some((candidate, distance)),
            }
        }
        best.map(|(candidate, _)| candidate)
    }
}
