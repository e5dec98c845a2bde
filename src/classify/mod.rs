//! Same-genome probability of contig pairs, and classification of graph links.

use crate::config::{Config, ShortContigs};
use crate::contig::ContigNode;
use color_eyre::eyre::{eyre, ContextCompat, Report, Result};
use color_eyre::Help;
use log::{debug, info};
use metacoag_graph::AssemblyGraph;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ----------------------------------------------------------------------------
// Probability Model
// ----------------------------------------------------------------------------

/// Converts composition and coverage distances into a same-genome probability.
///
/// ## Composition
///
/// Distances between tetranucleotide profiles of contigs from the same genome follow a narrow
/// normal centered on 0, distances between genomes a wider normal centered on `mu_inter`. The
/// composition probability is the posterior of the intra-genome component, which decreases
/// monotonically with distance.
///
/// ## Coverage
///
/// Log-scaled coverage differences are scored with a gaussian kernel of width `sigma_coverage`.
///
/// ## Examples
///
/// ```rust
/// use metacoag::classify::ProbabilityModel;
/// let model = ProbabilityModel::default();
/// assert!(model.composition_probability(0.0) > 0.95);
/// assert!(model.composition_probability(0.02) < 0.05);
/// assert_eq!(model.coverage_probability(0.0), 1.0);
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ProbabilityModel {
    pub sigma_intra: f64,
    pub mu_inter: f64,
    pub sigma_inter: f64,
    pub sigma_coverage: f64,
}

impl Default for ProbabilityModel {
    fn default() -> Self {
        ProbabilityModel {
            sigma_intra: 0.01037897 / 2.0,
            mu_inter: 0.0676654,
            sigma_inter: 0.03419337,
            sigma_coverage: 0.5,
        }
    }
}

/// Natural log of the normal density at `x`.
fn ln_normal(x: f64, mu: f64, sigma: f64) -> f64 {
    let z = (x - mu) / sigma;
    -sigma.ln() - 0.5 * (2.0 * std::f64::consts::PI).ln() - 0.5 * z * z
}

impl ProbabilityModel {
    pub fn validate(&self) -> Result<(), Report> {
        let sigmas = [
            ("sigma_intra", self.sigma_intra),
            ("sigma_inter", self.sigma_inter),
            ("sigma_coverage", self.sigma_coverage),
        ];
        for (name, sigma) in sigmas {
            if !sigma.is_finite() || sigma <= 0.0 {
                Err(eyre!("Invalid {name}: {sigma}").suggestion("Standard deviations must be positive."))?;
            }
        }
        if self.sigma_intra >= self.sigma_inter {
            Err(eyre!("Invalid probability model: sigma_intra must be less than sigma_inter.")
                .suggestion("Otherwise the composition probability does not decrease with distance."))?;
        }
        Ok(())
    }

    /// Returns the probability that two contigs at composition distance `d` share a genome.
    pub fn composition_probability(&self, d: f64) -> f64 {
        let ln_intra = ln_normal(d, 0.0, self.sigma_intra);
        let ln_inter = ln_normal(d, self.mu_inter, self.sigma_inter);
        1.0 / (1.0 + (ln_inter - ln_intra).exp())
    }

    /// Returns the probability that two contigs at coverage distance `d` share a genome.
    pub fn coverage_probability(&self, d: f64) -> f64 {
        (-(d * d) / (2.0 * self.sigma_coverage * self.sigma_coverage)).exp()
    }

    /// Returns the same-genome probability of two (composition, coverage) profiles.
    ///
    /// ```rust
    /// use metacoag::classify::ProbabilityModel;
    /// let model = ProbabilityModel::default();
    /// let composition = vec![0.5, 0.5];
    /// let (low, high) = (vec![10.0], vec![100.0]);
    /// let a = (composition.as_slice(), low.as_slice());
    /// let b = (composition.as_slice(), high.as_slice());
    /// assert!(model.probability(a, a) > 0.95);
    /// assert!(model.probability(a, b) < 0.01);
    /// ```
    pub fn probability(&self, a: (&[f64], &[f64]), b: (&[f64], &[f64])) -> f64 {
        let p_comp = self.composition_probability(composition_distance(a.0, b.0));
        let p_cov = self.coverage_probability(coverage_distance(a.1, b.1));
        p_comp * p_cov
    }
}

/// Euclidean distance between two composition profiles.
pub fn composition_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt()
}

/// Root mean square of the per-sample log coverage differences.
///
/// ```rust
/// use metacoag::classify::coverage_distance;
/// assert_eq!(coverage_distance(&[3.0, 7.0], &[3.0, 7.0]), 0.0);
/// let d = coverage_distance(&[0.0], &[std::f64::consts::E - 1.0]);
/// assert!((d - 1.0).abs() < 1e-12);
/// ```
pub fn coverage_distance(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x.ln_1p() - y.ln_1p()).powi(2)).sum();
    (sum / n as f64).sqrt()
}

// ----------------------------------------------------------------------------
// Links
// ----------------------------------------------------------------------------

/// An undirected link between two eligible contigs, `a < b`.
///
/// `hops` is the number of assembly graph edges the link stands for. It is 1 for a direct edge,
/// and longer when the link passes through short contigs.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub hops: usize,
}

/// Returns the links between eligible contigs, in ascending (`a`, `b`) order.
///
/// - Graph nodes with no matching contig are ignored.
/// - Contigs missing features are removed with their edges.
/// - Short contigs are removed with their edges ([`ShortContigs::Prune`]) or connect their
///   neighbors with longer links ([`ShortContigs::PassThrough`]).
pub fn get_links(graph: &AssemblyGraph<String>, contigs: &[ContigNode], config: &Config) -> Result<Vec<Link>, Report> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    contigs.iter().enumerate().for_each(|(i, c)| {
        index.entry(c.name.as_str()).or_insert(i);
    });

    let eligible = |i: usize| contigs[i].is_eligible(config.min_length);
    let limit = match config.short_contigs {
        ShortContigs::Prune => 1,
        ShortContigs::PassThrough => config.d_limit,
    };
    let through = |name: &String| match config.short_contigs {
        ShortContigs::Prune => false,
        ShortContigs::PassThrough => index.get(name.as_str()).is_some_and(|i| contigs[*i].length < config.min_length),
    };

    let mut links: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    let mut unknown = 0;
    for node in graph.get_nodes() {
        let Some(&a) = index.get(node.as_str()) else {
            unknown += 1;
            continue;
        };
        if !eligible(a) {
            continue;
        }
        for (other, hops) in graph.get_reachable(node, limit, through)? {
            let Some(&b) = index.get(other.as_str()) else { continue };
            if b > a && eligible(b) {
                // reachable nodes come nearest first, so the first hop count is the shortest
                links.entry((a, b)).or_insert(hops);
            }
        }
    }
    if unknown > 0 {
        debug!("Ignored {unknown} graph nodes that do not match any contig.");
    }

    let links = links.into_iter().map(|((a, b), hops)| Link { a, b, hops }).collect::<Vec<_>>();
    info!("Found {} links between eligible contigs ({} short contigs).", links.len(), config.short_contigs);
    Ok(links)
}

// ----------------------------------------------------------------------------
// Edge Class
// ----------------------------------------------------------------------------

/// Whether a link is evidence that its endpoints share a bin.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum EdgeClass {
    Merge,
    Split,
    Uncertain,
}

impl EdgeClass {
    /// Classifies a same-genome probability with the configured thresholds.
    ///
    /// ```rust
    /// use metacoag::classify::EdgeClass;
    /// use metacoag::Config;
    /// let config = Config::default();
    /// assert_eq!(EdgeClass::from_probability(0.1, &config), EdgeClass::Merge);
    /// assert_eq!(EdgeClass::from_probability(0.05, &config), EdgeClass::Uncertain);
    /// assert_eq!(EdgeClass::from_probability(0.01, &config), EdgeClass::Split);
    /// ```
    pub fn from_probability(probability: f64, config: &Config) -> Self {
        if probability >= config.p_intra {
            EdgeClass::Merge
        } else if probability <= config.p_inter {
            EdgeClass::Split
        } else {
            EdgeClass::Uncertain
        }
    }
}

/// A [`Link`] with its same-genome probability and class.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct ClassifiedLink {
    pub link: Link,
    pub probability: f64,
    pub class: EdgeClass,
}

/// Classifies every link in parallel, preserving the input order.
pub fn classify(links: &[Link], contigs: &[ContigNode], config: &Config) -> Result<Vec<ClassifiedLink>, Report> {
    let features = |i: usize| {
        contigs
            .get(i)
            .and_then(|c| c.features())
            .wrap_err_with(|| format!("Contig index {i} has no features to classify."))
    };

    let classified = links
        .par_iter()
        .map(|link| {
            let probability = config.model.probability(features(link.a)?, features(link.b)?);
            let class = EdgeClass::from_probability(probability, config);
            Ok(ClassifiedLink { link: *link, probability, class })
        })
        .collect::<Result<Vec<_>, Report>>()?;

    let count = |class: EdgeClass| classified.iter().filter(|c| c.class == class).count();
    info!(
        "Classified {} links: {} merge, {} split, {} uncertain.",
        classified.len(),
        count(EdgeClass::Merge),
        count(EdgeClass::Split),
        count(EdgeClass::Uncertain)
    );
    Ok(classified)
}

#[cfg(test)]
mod tests;
