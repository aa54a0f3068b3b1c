//! Per-dimension discussion coverage tracking.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::Dimension;

/// Tracks which friction dimensions have been sufficiently discussed.
///
/// # Invariants
///
/// - Coverage flags transition false -> true only; there is no reset.
/// - Backed by a fixed-size array keyed by [`Dimension`], so "all covered"
///   is exhaustive over the closed dimension set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DimensionCoverage {
    covered: [bool; Dimension::COUNT],
}

impl DimensionCoverage {
    /// Creates a tracker with no dimensions covered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a dimension as covered.
    ///
    /// Returns true if the dimension was newly covered, false if it
    /// was already marked.
    pub fn mark_covered(&mut self, dimension: Dimension) -> bool {
        let slot = &mut self.covered[dimension.index()];
        let newly = !*slot;
        *slot = true;
        newly
    }

    /// Returns true if the given dimension has been covered.
    pub fn is_covered(&self, dimension: Dimension) -> bool {
        self.covered[dimension.index()]
    }

    /// Returns true once every dimension has been covered.
    pub fn is_complete(&self) -> bool {
        self.covered.iter().all(|c| *c)
    }

    /// Returns the covered dimensions in canonical order.
    pub fn covered(&self) -> Vec<Dimension> {
        Dimension::ALL
            .into_iter()
            .filter(|d| self.is_covered(*d))
            .collect()
    }

    /// Returns the dimensions still to be explored, in canonical order.
    pub fn remaining(&self) -> Vec<Dimension> {
        Dimension::ALL
            .into_iter()
            .filter(|d| !self.is_covered(*d))
            .collect()
    }

    /// Returns the coverage state as a dimension-keyed map.
    pub fn to_map(&self) -> BTreeMap<Dimension, bool> {
        Dimension::ALL
            .into_iter()
            .map(|d| (d, self.is_covered(d)))
            .collect()
    }

    /// Rebuilds the tracker from a dimension-keyed map.
    ///
    /// Missing dimensions default to uncovered.
    pub fn from_map(map: &BTreeMap<Dimension, bool>) -> Self {
        let mut coverage = Self::new();
        for (dim, covered) in map {
            if *covered {
                coverage.mark_covered(*dim);
            }
        }
        coverage
    }
}
