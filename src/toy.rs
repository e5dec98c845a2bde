//! Small synthetic contigs and datasets used in documentation and tests.

use crate::contig::ContigNode;
use crate::dataset::{ContigRecord, Dataset, MarkerHit};
use metacoag_graph::AssemblyGraph;

/// Composition profile shared by every contig of genome `A`.
pub const COMPOSITION_A: [f64; 4] = [0.25, 0.25, 0.25, 0.25];

/// Composition profile of genome `B`, far from [`COMPOSITION_A`].
pub const COMPOSITION_B: [f64; 4] = [0.7, 0.1, 0.1, 0.1];

/// Returns a profiled 5 kb [`ContigNode`] with a single coverage sample and trusted markers.
///
/// ```rust
/// use metacoag::toy;
/// let contig = toy::contig("NODE_1", &toy::COMPOSITION_A, 10.0, &["COG0012"]);
/// assert!(contig.is_eligible(1000));
/// assert!(contig.trusted.contains("COG0012"));
/// ```
pub fn contig(name: &str, composition: &[f64], coverage: f64, markers: &[&str]) -> ContigNode {
    let mut contig = ContigNode::new(name, 5000);
    contig.composition = Some(composition.to_vec());
    contig.coverage = Some(vec![coverage]);
    contig.markers = markers.iter().map(|m| m.to_string()).collect();
    contig.trusted = contig.markers.clone();
    contig
}

/// Returns a short contig (500 bp) with features, which never takes part in binning by default.
pub fn short_contig(name: &str) -> ContigNode {
    let mut contig = contig(name, &COMPOSITION_A, 10.0, &[]);
    contig.length = 500;
    contig
}

/// Returns a sequence of `length` bases made by repeating `unit`.
///
/// ```rust
/// assert_eq!(metacoag::toy::sequence("ACG", 7), "ACGACGA");
/// ```
pub fn sequence(unit: &str, length: usize) -> String {
    unit.chars().cycle().take(length).collect()
}

/// Returns a [`ContigRecord`] with one coverage sample and fully covered marker hits.
pub fn record(name: &str, sequence: &str, coverage: f64, markers: &[&str]) -> ContigRecord {
    ContigRecord {
        name: name.to_string(),
        sequence: sequence.as_bytes().to_vec(),
        coverage: Some(vec![coverage]),
        markers: markers.iter().map(|m| MarkerHit { marker: m.to_string(), fraction: 1.0 }).collect(),
    }
}

/// Returns a dataset of two genomes, each a path of three contigs joined by one bridging link.
///
/// ```mermaid
/// graph LR;
///   NODE_1---NODE_2;
///   NODE_2---NODE_3;
///   NODE_3---NODE_4;
///   NODE_4---NODE_5;
///   NODE_5---NODE_6;
/// ```
///
/// - `NODE_1` to `NODE_3` come from genome `A` (coverage 10), `NODE_4` to `NODE_6` from genome `B`
///   (coverage 50).
/// - `NODE_1` and `NODE_6` carry the same single-copy marker `COG0012`.
/// - `NODE_7` is a short contig from genome `A` with no links.
///
/// ```rust
/// let dataset = metacoag::toy::two_genomes();
/// assert_eq!(dataset.contigs.len(), 7);
/// assert_eq!(dataset.graph.link_count(), 5);
/// ```
pub fn two_genomes() -> Dataset {
    let a = sequence("ACGTTGCAAGGCTTAC", 4000);
    let b = sequence("AAAAATTTTC", 4000);
    let contigs = vec![
        record("NODE_1", &a, 10.0, &["COG0012"]),
        record("NODE_2", &a, 10.0, &[]),
        record("NODE_3", &a, 10.0, &[]),
        record("NODE_4", &b, 50.0, &[]),
        record("NODE_5", &b, 50.0, &[]),
        record("NODE_6", &b, 50.0, &["COG0012"]),
        record("NODE_7", &a[0..500], 10.0, &[]),
    ];
    let mut graph = AssemblyGraph::new();
    contigs.iter().for_each(|c| {
        graph.add_node(c.name.clone());
    });
    (1..6).for_each(|i| {
        graph.add_link(format!("NODE_{i}"), format!("NODE_{}", i + 1));
    });
    Dataset { contigs, graph }
}
