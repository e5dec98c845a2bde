//! Contig records carried through binning.

use crate::bins::BinId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ----------------------------------------------------------------------------
// Contig State
// ----------------------------------------------------------------------------

/// The propagation state of a contig.
///
/// `Seed` and `Final` are the settled states. `Propagated` and `Conflicted` only exist while a
/// propagation round is being resolved.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ContigState {
    #[default]
    Unbinned,
    Seed,
    Propagated,
    Conflicted,
    Final,
}

impl ContigState {
    /// Returns true if the contig has a settled bin that can no longer change.
    ///
    /// ```rust
    /// use metacoag::contig::ContigState;
    /// assert!(ContigState::Seed.is_settled());
    /// assert!(ContigState::Final.is_settled());
    /// assert!(!ContigState::Conflicted.is_settled());
    /// ```
    pub fn is_settled(&self) -> bool {
        matches!(self, ContigState::Seed | ContigState::Final)
    }
}

// ----------------------------------------------------------------------------
// Contig Node
// ----------------------------------------------------------------------------

/// A profiled contig: its features, marker genes, and binning state.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ContigNode {
    /// Contig name, as it appears in the assembly.
    pub name: String,
    /// Sequence length in bases.
    pub length: usize,
    /// Normalized canonical tetranucleotide frequencies.
    pub composition: Option<Vec<f64>>,
    /// Mean coverage per sample.
    pub coverage: Option<Vec<f64>>,
    /// All marker genes detected on the contig.
    pub markers: BTreeSet<String>,
    /// Marker genes with enough of the model covered to be used as single-copy evidence.
    pub trusted: BTreeSet<String>,
    pub bin: Option<BinId>,
    pub state: ContigState,
    /// Hops from the seed or anchor the bin reached this contig through.
    pub distance: Option<usize>,
}

impl ContigNode {
    /// Returns a new unbinned [`ContigNode`] with no features.
    pub fn new(name: &str, length: usize) -> Self {
        ContigNode { name: name.to_string(), length, ..Default::default() }
    }

    /// Returns true if both the composition and coverage profiles are known.
    pub fn has_features(&self) -> bool {
        self.composition.is_some() && self.coverage.is_some()
    }

    /// Returns true if the contig is long enough and has the features to take part in binning.
    ///
    /// ```rust
    /// use metacoag::contig::ContigNode;
    /// let mut contig = ContigNode::new("NODE_1", 1500);
    /// assert!(!contig.is_eligible(1000));
    /// contig.composition = Some(vec![1.0]);
    /// contig.coverage = Some(vec![10.0]);
    /// assert!(contig.is_eligible(1000));
    /// assert!(!contig.is_eligible(2000));
    /// ```
    pub fn is_eligible(&self, min_length: usize) -> bool {
        self.length >= min_length && self.has_features()
    }

    /// Returns the composition and coverage profiles, if both are known.
    pub fn features(&self) -> Option<(&[f64], &[f64])> {
        match (&self.composition, &self.coverage) {
            (Some(composition), Some(coverage)) => Some((composition, coverage)),
            _ => None,
        }
    }
}
