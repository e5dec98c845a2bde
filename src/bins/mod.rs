//! Bins, the shared binning state, and the final bin assembly.

use crate::config::Config;
use crate::contig::{ContigNode, ContigState};
use color_eyre::eyre::{eyre, Report, Result};
use itertools::Itertools;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ----------------------------------------------------------------------------
// Bin Id
// ----------------------------------------------------------------------------

/// A bin identifier, numbered from 1 in the order bins are created.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct BinId(pub usize);

impl fmt::Display for BinId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ----------------------------------------------------------------------------
// Centroid
// ----------------------------------------------------------------------------

/// Running mean of the composition and coverage profiles of a bin's members.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Centroid {
    pub composition: Vec<f64>,
    pub coverage: Vec<f64>,
    pub count: usize,
}

impl Centroid {
    /// Adds one member's profiles to the mean.
    ///
    /// ```rust
    /// use metacoag::bins::Centroid;
    /// let mut centroid = Centroid::default();
    /// centroid.add(&[0.2, 0.8], &[10.0]);
    /// centroid.add(&[0.4, 0.6], &[20.0]);
    /// assert_eq!(centroid.count, 2);
    /// assert!((centroid.composition[0] - 0.3).abs() < 1e-12);
    /// assert!((centroid.coverage[0] - 15.0).abs() < 1e-12);
    /// ```
    pub fn add(&mut self, composition: &[f64], coverage: &[f64]) {
        self.count += 1;
        if self.count == 1 {
            self.composition = composition.to_vec();
            self.coverage = coverage.to_vec();
            return;
        }
        let n = self.count as f64;
        self.composition.iter_mut().zip(composition).for_each(|(c, x)| *c += (x - *c) / n);
        self.coverage.iter_mut().zip(coverage).for_each(|(c, x)| *c += (x - *c) / n);
    }

    /// Returns the mean profiles, or [`None`] if no member had features.
    pub fn features(&self) -> Option<(&[f64], &[f64])> {
        (self.count > 0).then_some((&self.composition, &self.coverage))
    }
}

// ----------------------------------------------------------------------------
// Bin
// ----------------------------------------------------------------------------

/// A group of contigs believed to come from the same genome.
#[derive(Clone, Debug, PartialEq)]
pub struct Bin {
    pub id: BinId,
    /// Index of the contig that founded the bin.
    pub seed: usize,
    /// Indices of all member contigs, including the seed.
    pub members: BTreeSet<usize>,
    /// Union of the trusted marker genes of all members.
    pub markers: BTreeSet<String>,
    pub centroid: Centroid,
}

impl Bin {
    /// Returns a new [`Bin`] founded by the contig at index `seed`.
    pub fn new(id: BinId, seed: usize, contig: &ContigNode) -> Self {
        let mut bin = Bin {
            id,
            seed,
            members: BTreeSet::new(),
            markers: BTreeSet::new(),
            centroid: Centroid::default(),
        };
        bin.add(seed, contig);
        bin
    }

    /// Adds the contig at `index` to the members, markers, and centroid.
    pub fn add(&mut self, index: usize, contig: &ContigNode) {
        self.members.insert(index);
        self.markers.extend(contig.trusted.iter().cloned());
        if let Some((composition, coverage)) = contig.features() {
            self.centroid.add(composition, coverage);
        }
    }

    /// Returns true if none of the contig's trusted markers is already in the bin.
    ///
    /// ```rust
    /// use metacoag::bins::{Bin, BinId};
    /// use metacoag::contig::ContigNode;
    ///
    /// let mut seed = ContigNode::new("NODE_1", 5000);
    /// seed.trusted.insert("COG0012".to_string());
    /// let bin = Bin::new(BinId(1), 0, &seed);
    ///
    /// let mut other = ContigNode::new("NODE_2", 5000);
    /// assert!(bin.is_compatible(&other));
    /// other.trusted.insert("COG0012".to_string());
    /// assert!(!bin.is_compatible(&other));
    /// ```
    pub fn is_compatible(&self, contig: &ContigNode) -> bool {
        self.markers.is_disjoint(&contig.trusted)
    }
}

// ----------------------------------------------------------------------------
// Bin Store
// ----------------------------------------------------------------------------

/// The shared binning state: every contig and every bin.
///
/// All assignments go through [`BinStore`], which guarantees that a contig belongs to at most
/// one bin and that settled assignments are never changed.
#[derive(Clone, Debug, Default)]
pub struct BinStore {
    pub contigs: Vec<ContigNode>,
    /// Bins in creation order, `bins[i]` has id `i + 1`.
    pub bins: Vec<Bin>,
}

impl BinStore {
    pub fn new(contigs: Vec<ContigNode>) -> Self {
        BinStore { contigs, bins: Vec::new() }
    }

    pub fn get_contig(&self, index: usize) -> Result<&ContigNode, Report> {
        self.contigs.get(index).ok_or_else(|| eyre!("Contig index {index} is out of range."))
    }

    pub fn get_bin(&self, id: BinId) -> Result<&Bin, Report> {
        id.0.checked_sub(1)
            .and_then(|i| self.bins.get(i))
            .ok_or_else(|| eyre!("Bin {id} does not exist."))
    }

    /// Returns the id the next created bin will have.
    pub fn next_id(&self) -> BinId {
        BinId(self.bins.len() + 1)
    }

    /// Returns true if the contig could join the bin without duplicating a trusted marker.
    pub fn is_compatible(&self, index: usize, id: BinId) -> Result<bool, Report> {
        Ok(self.get_bin(id)?.is_compatible(self.get_contig(index)?))
    }

    /// Adds a bin built outside the store (ex. by the seeder) and marks its members as seeds.
    pub fn insert_bin(&mut self, bin: Bin) -> Result<BinId, Report> {
        if bin.id != self.next_id() {
            Err(eyre!("Expected bin {} but got bin {}.", self.next_id(), bin.id))?;
        }
        for index in &bin.members {
            let contig = self.get_contig(*index)?;
            if contig.bin.is_some() {
                Err(eyre!("Contig {} is already in bin {:?}.", contig.name, contig.bin))?;
            }
        }
        for index in &bin.members {
            let contig = &mut self.contigs[*index];
            contig.bin = Some(bin.id);
            contig.state = ContigState::Seed;
            contig.distance = Some(0);
        }
        let id = bin.id;
        self.bins.push(bin);
        Ok(id)
    }

    /// Assigns an unbinned contig to an existing bin.
    ///
    /// ## Errors
    ///
    /// - The contig or bin does not exist.
    /// - The contig already belongs to a bin.
    pub fn assign(&mut self, index: usize, id: BinId, state: ContigState, distance: usize) -> Result<(), Report> {
        let contig = self.get_contig(index)?;
        if let Some(current) = contig.bin {
            Err(eyre!("Contig {} is already in bin {current}, it cannot move to bin {id}.", contig.name))?;
        }
        // borrow the bins and contigs separately, so the contig is not copied
        let bin = id.0.checked_sub(1)
            .and_then(|i| self.bins.get_mut(i))
            .ok_or_else(|| eyre!("Bin {id} does not exist."))?;
        bin.add(index, &self.contigs[index]);

        let contig = &mut self.contigs[index];
        contig.bin = Some(id);
        contig.state = state;
        contig.distance = Some(distance);
        Ok(())
    }

    /// Returns the number of contigs with a bin.
    pub fn num_assigned(&self) -> usize {
        self.contigs.iter().filter(|c| c.bin.is_some()).count()
    }

    /// Returns the distinct trusted markers found on any eligible contig.
    pub fn trusted_markers(&self, min_length: usize) -> BTreeSet<&String> {
        self.contigs.iter().filter(|c| c.is_eligible(min_length)).flat_map(|c| c.trusted.iter()).collect()
    }
}

// ----------------------------------------------------------------------------
// Binning
// ----------------------------------------------------------------------------

/// One contig to bin assignment.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Assignment {
    pub contig: String,
    pub bin: BinId,
}

/// The contents and quality of one output bin.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BinSummary {
    pub id: BinId,
    /// Name of the founding contig.
    pub seed: String,
    pub members: Vec<String>,
    /// Total length of the members in bases.
    pub length: usize,
    pub markers: BTreeSet<String>,
    /// True if the bin has fewer markers than the configured fraction of all markers.
    pub low_quality: bool,
}

/// The reported result of binning.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Binning {
    /// Assignments in contig input order.
    pub assignments: Vec<Assignment>,
    /// Contigs with no bin (including those excluded from binning), in input order.
    pub unbinned: Vec<String>,
    /// Bins in ascending id order, empty bins removed.
    pub bins: Vec<BinSummary>,
}

impl Binning {
    /// Assembles the reported [`Binning`] from the binning state.
    ///
    /// - Members shorter than `min_length` are dropped and reported as unbinned.
    /// - Bins left with no members are dropped.
    ///
    /// Only bins with a settled state contribute, tentative assignments never reach the output.
    pub fn assemble(store: &BinStore, config: &Config) -> Result<Self, Report> {
        let total_markers = store.trusted_markers(config.min_length).len();
        let mut binning = Binning::default();
        let mut reported = BTreeSet::new();

        for bin in &store.bins {
            let members = bin
                .members
                .iter()
                .map(|i| store.get_contig(*i).map(|c| (*i, c)))
                .collect::<Result<Vec<_>, Report>>()?
                .into_iter()
                .filter(|(_, c)| c.length >= config.min_length && c.state.is_settled())
                .collect_vec();
            if members.is_empty() {
                debug!("Dropping bin {} with no members of at least {} bp.", bin.id, config.min_length);
                continue;
            }
            let markers: BTreeSet<String> = members.iter().flat_map(|(_, c)| c.trusted.iter().cloned()).collect();
            let low_quality = (markers.len() as f64) < config.bin_mg_threshold * total_markers as f64;
            reported.extend(members.iter().map(|(i, _)| *i));
            binning.bins.push(BinSummary {
                id: bin.id,
                seed: store.get_contig(bin.seed)?.name.clone(),
                members: members.iter().map(|(_, c)| c.name.clone()).collect(),
                length: members.iter().map(|(_, c)| c.length).sum(),
                markers,
                low_quality,
            });
        }

        for (i, contig) in store.contigs.iter().enumerate() {
            match (contig.bin, reported.contains(&i)) {
                (Some(bin), true) => binning.assignments.push(Assignment { contig: contig.name.clone(), bin }),
                _ => binning.unbinned.push(contig.name.clone()),
            }
        }

        info!(
            "Assembled {} bins containing {} contigs, {} contigs are unbinned.",
            binning.bins.len(),
            binning.assignments.len(),
            binning.unbinned.len()
        );
        Ok(binning)
    }

    /// Returns the bin of a contig, if it has one.
    pub fn get_bin(&self, contig: &str) -> Option<BinId> {
        self.assignments.iter().find(|a| a.contig == contig).map(|a| a.bin)
    }
}

#[cfg(test)]
mod tests;
