//! `metacoag` bins metagenomic contigs using the **assembly graph**, coverage, composition and
//! single-copy **marker genes**.
//!
//! ## How it works
//!
//! 1. Every contig is [profiled](profile) into a tetranucleotide composition and a per-sample
//!    coverage vector.
//!
//! 1. Contigs carrying the same single-copy marker gene cannot share a genome. The
//!    [seeder](seed) walks through the marker genes and matches their carriers to bins with a
//!    maximum-weight bipartite matching, starting one bin per unmatched carrier.
//!
//! 1. Every link of the assembly graph is [classified](classify) by the probability that its
//!    two contigs come from the same genome.
//!
//! 1. Bin labels [propagate](propagate) along confident links, in synchronous rounds, until no
//!    contig changes. Conflicting proposals are resolved by probability, then distance from the
//!    seed, so the result does not depend on the number of threads.
//!
//! 1. The [bins] are assembled into the output tables.
//!
//! ## Examples
//!
//! ```rust
//! use metacoag::{toy, Binner, Config};
//!
//! let output = Binner::new(&Config::default()).bin(&toy::two_genomes())?;
//! assert_eq!(output.bins.get_bin("NODE_2"), output.bins.get_bin("NODE_1"));
//! assert_ne!(output.bins.get_bin("NODE_4"), output.bins.get_bin("NODE_1"));
//! # Ok::<(), color_eyre::eyre::Report>(())
//! ```

pub mod bins;
pub mod classify;
pub mod cli;
pub mod config;
pub mod contig;
pub mod dataset;
pub mod engine;
pub mod profile;
pub mod propagate;
pub mod run;
pub mod seed;
pub mod toy;
pub mod utils;

#[doc(inline)]
pub use crate::cli::Cli;
#[doc(inline)]
pub use crate::config::Config;
#[doc(inline)]
pub use crate::dataset::Dataset;
#[doc(inline)]
pub use crate::engine::Binner;
#[doc(inline)]
pub use crate::run::RunArgs;
#[doc(inline)]
pub use utils::verbosity::Verbosity;
