//! Initial bins founded on single-copy marker genes.

pub mod matching;

use crate::bins::{Bin, BinId};
use crate::config::Config;
use crate::contig::ContigNode;
use color_eyre::eyre::{Report, Result};
use itertools::Itertools;
use log::{debug, info};
use std::collections::BTreeMap;

/// Returns the weight of placing a contig in a bin: its same-genome probability against the bin
/// centroid, or 0 if the pair is incompatible or below `p_intra`.
fn similarity(contig: &ContigNode, bin: &Bin, config: &Config) -> f64 {
    if !bin.is_compatible(contig) {
        return 0.0;
    }
    let (Some(a), Some(b)) = (contig.features(), bin.centroid.features()) else {
        return 0.0;
    };
    let probability = config.model.probability(a, b);
    match probability >= config.p_intra {
        true => probability,
        false => 0.0,
    }
}

/// Founds the initial bins from contigs carrying trusted single-copy marker genes.
///
/// ## Algorithm
///
/// 1. Eligible contigs are grouped by trusted marker gene.
/// 2. Markers with fewer carriers than `seed_mg_threshold` times the most carried marker are
///    skipped. Rare markers would otherwise split genomes into extra bins.
/// 3. Markers are processed by number of carriers (descending), then by name.
/// 4. Carriers not placed yet are matched one-to-one against the existing bins, maximizing the
///    total same-genome probability against the bin centroids. A pair is only accepted if the bin
///    holds none of the contig's trusted markers and the probability reaches `p_intra`.
/// 5. Every carrier left unmatched founds its own bin, in contig order. Two carriers of the same
///    marker can therefore never share a bin.
///
/// Bins are numbered from 1 in the order they are founded. Contigs without trusted markers never
/// seed a bin.
///
/// ## Examples
///
/// ```rust
/// use metacoag::{seed, toy, Config};
///
/// let contigs = vec![
///     toy::contig("NODE_1", &toy::COMPOSITION_A, 10.0, &["COG0012", "COG0016"]),
///     toy::contig("NODE_2", &toy::COMPOSITION_B, 40.0, &["COG0012"]),
///     toy::contig("NODE_3", &toy::COMPOSITION_B, 40.0, &["COG0016"]),
/// ];
/// let bins = seed::seed(&contigs, &Config::default())?;
///
/// // NODE_3 matches the centroid of NODE_2, not NODE_1
/// let members: Vec<Vec<usize>> = bins.iter().map(|b| b.members.iter().copied().collect()).collect();
/// assert_eq!(members, [vec![0], vec![1, 2]]);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn seed(contigs: &[ContigNode], config: &Config) -> Result<Vec<Bin>, Report> {
    let mut carriers: BTreeMap<&String, Vec<usize>> = BTreeMap::new();
    contigs.iter().enumerate().filter(|(_, c)| c.is_eligible(config.min_length)).for_each(|(i, c)| {
        c.trusted.iter().for_each(|marker| carriers.entry(marker).or_default().push(i));
    });
    let num_markers = carriers.len();
    let max_carriers = carriers.values().map(|c| c.len()).max().unwrap_or_default();
    let min_carriers = config.seed_mg_threshold * max_carriers as f64;
    let carriers = carriers
        .into_iter()
        .filter(|(marker, c)| {
            let keep = c.len() as f64 >= min_carriers;
            if !keep {
                debug!("Marker {marker} has {} carriers (minimum {min_carriers:.1}), it does not seed bins.", c.len());
            }
            keep
        })
        .sorted_by(|(m1, c1), (m2, c2)| c2.len().cmp(&c1.len()).then_with(|| m1.cmp(m2)))
        .collect_vec();
    let num_seed_markers = carriers.len();

    let mut bins: Vec<Bin> = Vec::new();
    let mut placed = vec![false; contigs.len()];

    for (marker, contig_indices) in carriers {
        let candidates = contig_indices.into_iter().filter(|i| !placed[*i]).collect_vec();
        if candidates.is_empty() {
            continue;
        }

        if !bins.is_empty() {
            let weights: Vec<Vec<f64>> = candidates
                .iter()
                .map(|i| bins.iter().map(|bin| similarity(&contigs[*i], bin, config)).collect())
                .collect();
            let assignment = matching::max_weight_assignment(&weights)?;
            for (row, col) in assignment.into_iter().enumerate() {
                let Some(col) = col else { continue };
                if weights[row][col] <= 0.0 {
                    continue;
                }
                let i = candidates[row];
                debug!(
                    "Marker {marker}: contig {} joins bin {} (probability {:.4}).",
                    contigs[i].name, bins[col].id, weights[row][col]
                );
                bins[col].add(i, &contigs[i]);
                placed[i] = true;
            }
        }

        for i in candidates {
            if placed[i] {
                continue;
            }
            let id = BinId(bins.len() + 1);
            debug!("Marker {marker}: contig {} founds bin {id}.", contigs[i].name);
            bins.push(Bin::new(id, i, &contigs[i]));
            placed[i] = true;
        }
    }

    let num_seeds: usize = bins.iter().map(|b| b.members.len()).sum();
    info!("Seeded {} bins with {num_seeds} contigs from {num_seed_markers} of {num_markers} marker genes.", bins.len());
    Ok(bins)
}
