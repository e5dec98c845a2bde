//! Composition and coverage profiles of contigs.

use crate::config::Config;
use crate::contig::ContigNode;
use crate::dataset::ContigRecord;
use crate::utils;
use color_eyre::eyre::{Report, Result};
use indicatif::ParallelProgressIterator;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Number of canonical tetranucleotides (a tetramer and its reverse complement are counted together).
pub const NUM_TETRAMERS: usize = 136;

// ----------------------------------------------------------------------------
// Composition
// ----------------------------------------------------------------------------

fn encode(base: u8) -> Option<usize> {
    match base.to_ascii_uppercase() {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

fn reverse_complement(code: usize) -> usize {
    (0..4).fold(0, |rc, i| (rc << 2) | (3 - ((code >> (2 * i)) & 3)))
}

/// Returns the canonical index (0 to 135) of each of the 256 two-bit encoded tetramers.
///
/// ```rust
/// use metacoag::profile::canonical_tetramers;
/// let table = canonical_tetramers();
/// // AAAA (0) and TTTT (255) are reverse complements
/// assert_eq!(table[0], table[255]);
/// assert_eq!(table.iter().max(), Some(&135));
/// ```
pub fn canonical_tetramers() -> [usize; 256] {
    let mut codes = [0; 256];
    codes.iter_mut().enumerate().for_each(|(code, c)| *c = code.min(reverse_complement(code)));
    let ids: BTreeMap<usize, usize> =
        codes.iter().copied().collect::<BTreeSet<_>>().into_iter().enumerate().map(|(i, c)| (c, i)).collect();
    codes.map(|c| ids[&c])
}

/// Returns the normalized canonical tetranucleotide frequencies of a sequence.
///
/// Windows that contain anything other than `ACGT` (case-insensitive) are skipped. Returns
/// [`None`] if the sequence has no valid window.
///
/// ## Examples
///
/// ```rust
/// use metacoag::profile::{canonical_tetramers, tetramer_profile};
/// let table = canonical_tetramers();
///
/// let profile = tetramer_profile(b"AAAAnTTTT", &table).unwrap();
/// assert_eq!(profile[table[0]], 1.0);
///
/// assert_eq!(tetramer_profile(b"ACG", &table), None);
/// ```
pub fn tetramer_profile(sequence: &[u8], table: &[usize; 256]) -> Option<Vec<f64>> {
    let mut counts = vec![0_usize; NUM_TETRAMERS];
    let mut code = 0;
    let mut valid = 0;
    for base in sequence {
        let Some(b) = encode(*base) else {
            valid = 0;
            continue;
        };
        code = ((code << 2) | b) & 0xff;
        valid += 1;
        if valid >= 4 {
            counts[table[code]] += 1;
        }
    }
    let total: usize = counts.iter().sum();
    (total > 0).then(|| counts.iter().map(|c| *c as f64 / total as f64).collect())
}

// ----------------------------------------------------------------------------
// Profiler
// ----------------------------------------------------------------------------

/// Returns the coverage vector if it is usable: `samples` long, finite, and non-negative.
fn valid_coverage(coverage: Option<&Vec<f64>>, samples: usize) -> Option<Vec<f64>> {
    coverage
        .filter(|c| c.len() == samples && c.iter().all(|x| x.is_finite() && *x >= 0.0))
        .cloned()
}

/// Profiles every contig in parallel, preserving the input order.
///
/// - Composition comes from the sequence, coverage from the abundance vector.
/// - The number of samples is taken from the first contig with a usable coverage vector. Vectors
///   of any other length are treated as missing.
/// - Marker hits covering at least `mg_threshold` of the marker model are trusted.
///
/// ## Examples
///
/// ```rust
/// use metacoag::{profile, toy, Config};
/// let dataset = toy::two_genomes();
/// let contigs = profile::profile(&dataset.contigs, &Config::default())?;
/// assert_eq!(contigs.len(), 7);
/// assert!(contigs[0].is_eligible(1000));
/// assert!(!contigs[6].is_eligible(1000));
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn profile(records: &[ContigRecord], config: &Config) -> Result<Vec<ContigNode>, Report> {
    let table = canonical_tetramers();
    let samples = records
        .iter()
        .filter_map(|r| r.coverage.as_ref())
        .find(|c| !c.is_empty())
        .map(|c| c.len())
        .unwrap_or_default();

    let progress_bar = utils::progress_bar(records.len() as u64, config.progress, "Profiling")?;
    let contigs: Vec<ContigNode> = records
        .par_iter()
        .progress_with(progress_bar.clone())
        .map(|record| {
            let mut contig = ContigNode::new(&record.name, record.sequence.len());
            contig.composition = tetramer_profile(&record.sequence, &table);
            contig.coverage = valid_coverage(record.coverage.as_ref(), samples);
            for hit in &record.markers {
                contig.markers.insert(hit.marker.clone());
                if hit.fraction >= config.mg_threshold {
                    contig.trusted.insert(hit.marker.clone());
                }
            }
            contig
        })
        .collect();
    progress_bar.finish_and_clear();

    let mut missing = 0;
    let mut short = 0;
    for contig in &contigs {
        if !contig.has_features() {
            debug!(
                "Contig {} is missing features (composition: {}, coverage: {}).",
                contig.name,
                contig.composition.is_some(),
                contig.coverage.is_some()
            );
            missing += 1;
        } else if contig.length < config.min_length {
            short += 1;
        }
        if !contig.markers.is_empty() && contig.trusted.is_empty() {
            debug!("Contig {} has no trusted marker hits, it cannot seed a bin.", contig.name);
        }
    }
    if missing > 0 {
        warn!("{missing} contigs are missing composition or coverage and will not be binned.");
    }
    let eligible = contigs.iter().filter(|c| c.is_eligible(config.min_length)).count();
    info!(
        "Profiled {} contigs over {samples} samples: {eligible} eligible, {short} shorter than {} bp.",
        contigs.len(),
        config.min_length
    );

    Ok(contigs)
}

#[cfg(test)]
mod tests;
