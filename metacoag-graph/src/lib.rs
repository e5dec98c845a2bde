#![doc = include_str!("../README.md")]

use color_eyre::eyre::{Report, Result};

mod assembly;
pub mod examples;
pub mod parse;

#[doc(inline)]
pub use assembly::AssemblyGraph;

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Returns an object created from a normalized edge list [`str`], one `source target` pair per line.
pub trait FromEdgeList {
    fn from_edge_list(edge_list: &str) -> Result<Self, Report>
    where
        Self: Sized;
}

/// Returns an object created from a [GFA](https://gfa-spec.github.io/GFA-spec/GFA1.html) [`str`].
pub trait FromGfa {
    fn from_gfa(gfa: &str) -> Result<Self, Report>
    where
        Self: Sized;
}
