//! View lifecycle state machine
//!
//! The view moves through a small set of phases; rendering and input
//! handling both branch on the current phase rather than on ad-hoc flags.

/// Where the view is in its load/compute/render lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewPhase {
    /// Catalog request is in flight; the form shows a spinner
    #[default]
    LoadingParameters,
    /// Catalog request failed; only a retry is offered
    CatalogFailed(String),
    /// Catalog loaded, no computation in flight
    Ready,
    /// A computation with this generation is in flight. Responses carrying
    /// any other generation are stale and must be dropped.
    AwaitingComputation { generation: u64 },
    /// Curves are on screen (and a new computation may be submitted)
    Rendered,
}

impl ViewPhase {
    /// Whether parameter controls should be disabled
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            ViewPhase::LoadingParameters | ViewPhase::AwaitingComputation { .. }
        )
    }

    /// Whether a compute response with `generation` is the one we are
    /// waiting for
    pub fn accepts_generation(&self, generation: u64) -> bool {
        matches!(self, ViewPhase::AwaitingComputation { generation: g } if *g == generation)
    }
}
