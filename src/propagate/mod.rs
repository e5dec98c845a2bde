//! Round-based label propagation of bins along merge links.

use crate::bins::{BinId, BinStore};
use crate::classify::{ClassifiedLink, EdgeClass};
use crate::config::Config;
use crate::contig::ContigState;
use crate::utils;
use color_eyre::eyre::{Report, Result};
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

// ----------------------------------------------------------------------------
// Proposal
// ----------------------------------------------------------------------------

/// An offer from a bin member to pull an unbinned neighbor into its bin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Proposal {
    pub target: usize,
    pub bin: BinId,
    /// Probability of the merge link the offer travels along.
    pub probability: f64,
    /// Hop distance the target would have from its bin's seed.
    pub distance: usize,
    /// Index of the proposing member.
    pub source: usize,
}

impl Proposal {
    /// Orders proposals best first: higher probability, shorter distance, lower bin id, lower source.
    ///
    /// ```rust
    /// use metacoag::bins::BinId;
    /// use metacoag::propagate::Proposal;
    /// use std::cmp::Ordering;
    ///
    /// let a = Proposal { target: 2, bin: BinId(1), probability: 0.9, distance: 1, source: 0 };
    /// let b = Proposal { bin: BinId(2), source: 1, ..a };
    /// assert_eq!(a.priority(&b), Ordering::Less);
    /// let c = Proposal { probability: 0.95, ..b };
    /// assert_eq!(a.priority(&c), Ordering::Greater);
    /// ```
    pub fn priority(&self, other: &Self) -> Ordering {
        other
            .probability
            .total_cmp(&self.probability)
            .then_with(|| self.distance.cmp(&other.distance))
            .then_with(|| self.bin.cmp(&other.bin))
            .then_with(|| self.source.cmp(&other.source))
    }
}

// ----------------------------------------------------------------------------
// Round Stats
// ----------------------------------------------------------------------------

/// What happened in one propagation round.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct RoundStats {
    pub round: usize,
    /// Proposals made by frontier members.
    pub proposals: usize,
    /// Contigs committed to a bin.
    pub assigned: usize,
    /// Contigs proposed to by two or more bins.
    pub conflicts: usize,
    /// Proposals rejected because the target's markers were already in the bin.
    pub rejected: usize,
}

// ----------------------------------------------------------------------------
// Propagation
// ----------------------------------------------------------------------------

/// Merge link neighbors of every contig: (neighbor, probability, hops).
fn merge_adjacency(links: &[ClassifiedLink], num_contigs: usize) -> Vec<Vec<(usize, f64, usize)>> {
    let mut adjacency = vec![Vec::new(); num_contigs];
    links.iter().filter(|l| l.class == EdgeClass::Merge).for_each(|l| {
        adjacency[l.link.a].push((l.link.b, l.probability, l.link.hops));
        adjacency[l.link.b].push((l.link.a, l.probability, l.link.hops));
    });
    adjacency
}

/// Returns the proposals of one frontier member, to unbinned merge neighbors within `d_limit`.
fn propose(
    store: &BinStore,
    adjacency: &[Vec<(usize, f64, usize)>],
    source: usize,
    d_limit: usize,
) -> Vec<Proposal> {
    let contig = &store.contigs[source];
    let (Some(bin), Some(distance)) = (contig.bin, contig.distance) else {
        return Vec::new();
    };
    adjacency[source]
        .iter()
        .filter(|(target, _, hops)| store.contigs[*target].state == ContigState::Unbinned && distance + hops <= d_limit)
        .map(|(target, probability, hops)| Proposal {
            target: *target,
            bin,
            probability: *probability,
            distance: distance + hops,
            source,
        })
        .collect()
}

/// Spreads bins from their settled members to unbinned neighbors along merge links.
///
/// Each round:
///
/// 1. Every frontier member proposes its bin to its unbinned merge neighbors within `d_limit` hops
///    (in parallel, on a read-only view).
/// 2. Proposals are grouped by target. A target reached by several bins is conflicted, and its
///    proposals are ranked by [`Proposal::priority`].
/// 3. Targets are committed in index order, each to its best proposal whose bin does not already
///    hold one of the target's trusted markers.
///
/// The first frontier is every settled member. Later frontiers are the contigs committed in the
/// previous round. Propagation stops when a round commits nothing, or after `depth` rounds.
///
/// ## Examples
///
/// ```rust
/// use metacoag::bins::{Bin, BinId, BinStore};
/// use metacoag::classify::{ClassifiedLink, EdgeClass, Link};
/// use metacoag::{propagate, toy, Config};
///
/// let contigs = vec![
///     toy::contig("NODE_1", &toy::COMPOSITION_A, 10.0, &["COG0012"]),
///     toy::contig("NODE_2", &toy::COMPOSITION_A, 10.0, &[]),
/// ];
/// let mut store = BinStore::new(contigs);
/// store.insert_bin(Bin::new(BinId(1), 0, &store.contigs[0]))?;
///
/// let link = ClassifiedLink { link: Link { a: 0, b: 1, hops: 1 }, probability: 0.9, class: EdgeClass::Merge };
/// let rounds = propagate::propagate(&mut store, &[link], &Config::default())?;
/// assert_eq!(store.contigs[1].bin, Some(BinId(1)));
/// assert_eq!(store.contigs[1].distance, Some(1));
/// assert_eq!(rounds.len(), 1);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn propagate(store: &mut BinStore, links: &[ClassifiedLink], config: &Config) -> Result<Vec<RoundStats>, Report> {
    let adjacency = merge_adjacency(links, store.contigs.len());
    let mut frontier: Vec<usize> = store
        .contigs
        .iter()
        .enumerate()
        .filter(|(_, c)| c.state.is_settled() && c.distance.is_some())
        .map(|(i, _)| i)
        .collect();

    let progress_bar = utils::progress_bar(config.depth as u64, config.progress, "Propagating")?;
    let mut rounds = Vec::new();

    for round in 1..=config.depth {
        if frontier.is_empty() {
            break;
        }
        let view: &BinStore = store;
        let proposals: Vec<Proposal> =
            frontier.par_iter().flat_map_iter(|source| propose(view, &adjacency, *source, config.d_limit)).collect();
        if proposals.is_empty() {
            break;
        }

        let mut stats = RoundStats { round, proposals: proposals.len(), ..Default::default() };
        let mut by_target: BTreeMap<usize, Vec<Proposal>> = BTreeMap::new();
        proposals.into_iter().for_each(|p| by_target.entry(p.target).or_default().push(p));

        // tentative states, visible only until the round is committed
        for (target, proposals) in by_target.iter_mut() {
            proposals.sort_by(|a, b| a.priority(b));
            let conflicted = proposals.iter().any(|p| p.bin != proposals[0].bin);
            store.contigs[*target].state = match conflicted {
                true => {
                    stats.conflicts += 1;
                    ContigState::Conflicted
                }
                false => ContigState::Propagated,
            };
        }

        let mut committed = Vec::new();
        for (target, proposals) in by_target {
            let state = store.contigs[target].state;
            store.contigs[target].state = ContigState::Unbinned;
            let mut accepted = None;
            for proposal in proposals {
                match store.is_compatible(target, proposal.bin)? {
                    true => {
                        accepted = Some(proposal);
                        break;
                    }
                    false => {
                        debug!(
                            "Round {round}: bin {} already holds a marker of contig {}.",
                            proposal.bin, store.contigs[target].name
                        );
                        stats.rejected += 1;
                    }
                }
            }
            if let Some(proposal) = accepted {
                if state == ContigState::Conflicted {
                    debug!(
                        "Round {round}: conflicted contig {} goes to bin {} (probability {:.4}, distance {}).",
                        store.contigs[target].name, proposal.bin, proposal.probability, proposal.distance
                    );
                }
                store.assign(target, proposal.bin, state, proposal.distance)?;
                committed.push(target);
            }
        }

        // settle the round
        committed.iter().for_each(|i| store.contigs[*i].state = ContigState::Final);
        stats.assigned = committed.len();
        debug!("{stats:?}");
        progress_bar.inc(1);
        rounds.push(stats);
        frontier = committed;
    }
    progress_bar.finish_and_clear();

    let assigned: usize = rounds.iter().map(|r| r.assigned).sum();
    info!("Propagated bins to {assigned} contigs in {} rounds.", rounds.len());
    Ok(rounds)
}

// ----------------------------------------------------------------------------
// Rescue
// ----------------------------------------------------------------------------

/// Places unbinned eligible contigs in the bin with the most similar centroid.
///
/// Candidates are scored in parallel against every bin. Each takes the best bin (higher
/// probability, then lower bin id) that reaches `p_intra` and holds none of its trusted markers.
/// Rescued contigs are final at distance 0, so they act as anchors for further propagation.
///
/// Returns the number of rescued contigs.
pub fn rescue(store: &mut BinStore, config: &Config) -> Result<usize, Report> {
    let view: &BinStore = store;
    let candidates: Vec<(usize, Vec<(BinId, f64)>)> = view
        .contigs
        .par_iter()
        .enumerate()
        .filter(|(_, c)| c.bin.is_none() && c.is_eligible(config.min_length))
        .map(|(i, contig)| {
            let mut scores: Vec<(BinId, f64)> = view
                .bins
                .iter()
                .filter_map(|bin| {
                    let probability = config.model.probability(contig.features()?, bin.centroid.features()?);
                    (probability >= config.p_intra).then_some((bin.id, probability))
                })
                .collect();
            scores.sort_by(|(b1, p1), (b2, p2)| p2.total_cmp(p1).then_with(|| b1.cmp(b2)));
            (i, scores)
        })
        .collect();

    let mut rescued = 0;
    for (i, scores) in candidates {
        for (bin, probability) in scores {
            if store.is_compatible(i, bin)? {
                debug!("Rescued contig {} into bin {bin} (probability {probability:.4}).", store.contigs[i].name);
                store.assign(i, bin, ContigState::Final, 0)?;
                rescued += 1;
                break;
            }
        }
    }
    info!("Rescued {rescued} contigs by bin centroid similarity.");
    Ok(rescued)
}
