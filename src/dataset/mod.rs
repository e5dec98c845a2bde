//! Read contigs, abundances, marker genes, and the assembly graph from disk.

use crate::utils;
use color_eyre::eyre::{eyre, ContextCompat, Report, Result, WrapErr};
use color_eyre::Help;
use log::{debug, info, warn};
use metacoag_graph::AssemblyGraph;
use noodles::fasta;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// ----------------------------------------------------------------------------
// Records
// ----------------------------------------------------------------------------

/// A marker gene hit on a contig.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MarkerHit {
    /// Marker gene identifier (ex. `COG0012`, `TIGR00001`).
    pub marker: String,
    /// Fraction of the marker model covered by the hit.
    pub fraction: f64,
}

/// A contig as it was read from disk, before profiling.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContigRecord {
    pub name: String,
    pub sequence: Vec<u8>,
    /// Mean coverage per sample, if known.
    pub coverage: Option<Vec<f64>>,
    pub markers: Vec<MarkerHit>,
}

// ----------------------------------------------------------------------------
// Dataset
// ----------------------------------------------------------------------------

/// Everything the binning engine consumes: contigs and the graph that connects them.
///
/// The graph holds exactly one node per contig, in contig order.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub contigs: Vec<ContigRecord>,
    pub graph: AssemblyGraph<String>,
}

impl Dataset {
    pub fn new() -> Self {
        Dataset::default()
    }

    /// Reads a [`Dataset`] from its input files.
    ///
    /// ## Arguments
    ///
    /// - `contigs` - FASTA of assembled contigs.
    /// - `graph` - Assembly graph as a GFA (`.gfa`) or edge list.
    /// - `abundance` - Optional per-sample coverage table. Without it, coverage is parsed from
    ///   SPAdes contig names.
    /// - `markers` - Optional marker gene hits, as a table or HMMER domain table.
    pub fn read(
        contigs: &Path,
        graph: &Path,
        abundance: Option<&Path>,
        markers: Option<&Path>,
    ) -> Result<Self, Report> {
        let mut dataset = Dataset { contigs: read_contigs(&contigs)?, ..Default::default() };

        if let Some(path) = abundance {
            dataset.set_abundance(read_abundance(&path)?);
        }
        match markers {
            Some(path) => dataset.set_markers(read_markers(&path)?),
            None => warn!("No marker genes were provided, no bins can be seeded."),
        }
        dataset.set_graph(&AssemblyGraph::read(&graph)?)?;

        info!(
            "Read {} contigs and {} links between them.",
            dataset.contigs.len(),
            dataset.graph.link_count()
        );
        Ok(dataset)
    }

    /// Replaces the coverage of every contig with its row in an abundance table.
    ///
    /// Contigs missing from the table lose their coverage.
    pub fn set_abundance(&mut self, mut abundance: HashMap<String, Vec<f64>>) {
        let mut missing = 0;
        for contig in &mut self.contigs {
            contig.coverage = abundance.remove(&contig.name);
            if contig.coverage.is_none() {
                debug!("Contig {} has no abundance.", contig.name);
                missing += 1;
            }
        }
        if missing > 0 {
            warn!("{missing} contigs are missing from the abundance table.");
        }
        if !abundance.is_empty() {
            warn!("Ignoring {} abundance rows that do not match any contig.", abundance.len());
        }
    }

    /// Attaches marker gene hits to their contigs.
    pub fn set_markers(&mut self, mut markers: HashMap<String, Vec<MarkerHit>>) {
        for contig in &mut self.contigs {
            contig.markers = markers.remove(&contig.name).unwrap_or_default();
        }
        if !markers.is_empty() {
            warn!("Ignoring marker hits on {} unknown contigs.", markers.len());
        }
        let carriers = self.contigs.iter().filter(|c| !c.markers.is_empty()).count();
        info!("{carriers} contigs carry marker gene hits.");
    }

    /// Rebuilds the graph with one node per contig, keeping only links between known contigs.
    ///
    /// Graph nodes that are SPAdes path pieces (`<contig>_<n>`) are mapped back to their contig.
    /// Links between pieces of the same contig are dropped.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use metacoag::{toy, Dataset};
    /// use metacoag_graph::AssemblyGraph;
    ///
    /// let mut dataset = Dataset::new();
    /// dataset.contigs = vec![toy::record("NODE_1", "ACGT", 1.0, &[]), toy::record("NODE_2", "ACGT", 1.0, &[])];
    ///
    /// let graph = AssemblyGraph::from([("NODE_1", "NODE_2"), ("NODE_2", "NODE_9")].map(|(a, b)| (a.to_string(), b.to_string())));
    /// dataset.set_graph(&graph)?;
    /// assert_eq!(dataset.graph.node_count(), 2);
    /// assert_eq!(dataset.graph.link_count(), 1);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn set_graph(&mut self, graph: &AssemblyGraph<String>) -> Result<(), Report> {
        let mut normalized = AssemblyGraph::new();
        self.contigs.iter().for_each(|c| {
            normalized.add_node(c.name.clone());
        });
        let mut unknown = 0;
        for (source, target) in graph.get_links()? {
            match (resolve_contig(&normalized, source), resolve_contig(&normalized, target)) {
                (Some(source), Some(target)) => {
                    normalized.add_link(source, target);
                }
                _ => unknown += 1,
            }
        }
        if unknown > 0 {
            warn!("Ignoring {unknown} graph links to unknown contigs.");
        }
        self.graph = normalized;
        Ok(())
    }
}

/// Returns the contig a graph node refers to: the node itself, or the contig a SPAdes path piece
/// (`<contig>_<n>`) belongs to.
fn resolve_contig(contigs: &AssemblyGraph<String>, node: &String) -> Option<String> {
    if contigs.contains(node) {
        return Some(node.clone());
    }
    let (contig, piece) = node.rsplit_once('_')?;
    let contig = contig.to_string();
    let is_piece = !piece.is_empty() && piece.chars().all(|c| c.is_ascii_digit());
    (is_piece && contigs.contains(&contig)).then_some(contig)
}

// ----------------------------------------------------------------------------
// Contigs
// ----------------------------------------------------------------------------

/// Returns the coverage encoded in a SPAdes contig name (`NODE_<n>_length_<l>_cov_<c>`).
///
/// ```rust
/// use metacoag::dataset::parse_spades_coverage;
/// assert_eq!(parse_spades_coverage("NODE_1_length_5000_cov_12.5"), Some(12.5));
/// assert_eq!(parse_spades_coverage("NODE_1_length_5000_cov_12.5_ID_3"), Some(12.5));
/// assert_eq!(parse_spades_coverage("contig_1"), None);
/// ```
pub fn parse_spades_coverage(name: &str) -> Option<f64> {
    let (_, coverage) = name.split_once("_cov_")?;
    coverage.split('_').next()?.parse().ok()
}

/// Reads contigs from a FASTA file, in file order.
///
/// Coverage is parsed from the contig names where possible. Duplicate names are an error.
pub fn read_contigs<P>(path: &P) -> Result<Vec<ContigRecord>, Report>
where
    P: AsRef<Path> + Debug,
{
    let mut reader = File::open(path)
        .map(BufReader::new)
        .map(fasta::Reader::new)
        .wrap_err_with(|| format!("Failed to read contigs: {path:?}"))?;

    let mut contigs = Vec::new();
    let mut names = HashSet::new();
    for result in reader.records() {
        let record = result.wrap_err_with(|| format!("Failed to parse FASTA record in {path:?}"))?;
        let name: &[u8] = record.name().as_ref();
        let name = String::from_utf8_lossy(name).to_string();
        if !names.insert(name.clone()) {
            Err(eyre!("Duplicate contig name {name:?} in {path:?}")
                .suggestion("Contig names must be unique."))?;
        }
        let sequence: &[u8] = record.sequence().as_ref();
        let sequence = sequence.to_vec();
        let coverage = parse_spades_coverage(&name).map(|c| vec![c]);
        contigs.push(ContigRecord { name, sequence, coverage, markers: Vec::new() });
    }
    if contigs.is_empty() {
        Err(eyre!("No contigs found in {path:?}"))?;
    }
    Ok(contigs)
}

// ----------------------------------------------------------------------------
// Abundance
// ----------------------------------------------------------------------------

/// Reads a per-sample coverage table: a header row, then one row per contig with the contig name
/// in the first column and one coverage value per sample.
pub fn read_abundance<P>(path: &P) -> Result<HashMap<String, Vec<f64>>, Report>
where
    P: AsRef<Path> + Debug,
{
    let delimiter = utils::get_delimiter(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(utils::delimiter_to_byte(delimiter)?)
        .has_headers(true)
        .from_path(path)
        .wrap_err_with(|| format!("Failed to read abundance: {path:?}"))?;

    let mut abundance = HashMap::new();
    for (i, result) in reader.records().enumerate() {
        let line = i + 2;
        let record = result.wrap_err_with(|| format!("Failed to parse line {line} of {path:?}"))?;
        let mut fields = record.iter();
        let name = fields.next().wrap_err_with(|| format!("Missing contig name on line {line} of {path:?}"))?;
        let coverage = fields
            .map(|value| {
                value
                    .trim()
                    .parse::<f64>()
                    .wrap_err_with(|| format!("Failed to parse coverage {value:?} on line {line} of {path:?}"))
            })
            .collect::<Result<Vec<_>, Report>>()?;
        abundance.insert(name.to_string(), coverage);
    }
    Ok(abundance)
}

// ----------------------------------------------------------------------------
// Markers
// ----------------------------------------------------------------------------

fn default_fraction() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
struct MarkerRow {
    contig: String,
    marker: String,
    #[serde(default = "default_fraction")]
    fraction: f64,
}

/// Returns the contig a FragGeneScan gene was called on (`<contig>_<start>_<end>_<strand>`).
///
/// ```rust
/// use metacoag::dataset::gene_to_contig;
/// assert_eq!(gene_to_contig("NODE_1_length_5000_cov_12.5_1_1200_+"), "NODE_1_length_5000_cov_12.5");
/// assert_eq!(gene_to_contig("NODE_1"), "NODE_1");
/// ```
pub fn gene_to_contig(gene: &str) -> String {
    let fields: Vec<&str> = gene.split('_').collect();
    match fields.len() > 3 {
        true => fields[..fields.len() - 3].join("_"),
        false => gene.to_string(),
    }
}

/// Parses HMMER domain table output (`--domtblout`) into (contig, hit) pairs.
///
/// The fraction of each hit is `(hmm_to - hmm_from) / qlen`.
///
/// ```rust
/// use metacoag::dataset::parse_domtblout;
/// let line = "NODE_1_1_900_+ - 300 COG0012 - 200 1e-50 100.0 0.0 1 1 1e-50 1e-50 100.0 0.0 21 181 1 160 1 300 0.99 -";
/// let hits = parse_domtblout(&format!("# comment\n{line}\n"))?;
/// assert_eq!(hits[0].0, "NODE_1");
/// assert_eq!(hits[0].1.marker, "COG0012");
/// assert!((hits[0].1.fraction - 0.8).abs() < 1e-12);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn parse_domtblout(text: &str) -> Result<Vec<(String, MarkerHit)>, Report> {
    let mut hits = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 17 {
            Err(eyre!("Failed to parse domain table line {}: expected at least 17 columns.", i + 1)
                .suggestion("Marker hits should be HMMER --domtblout output."))?;
        }
        let number = |column: usize| {
            fields[column]
                .parse::<f64>()
                .wrap_err_with(|| format!("Failed to parse column {} on line {}: {:?}", column + 1, i + 1, fields[column]))
        };
        let (qlen, hmm_from, hmm_to) = (number(5)?, number(15)?, number(16)?);
        if qlen <= 0.0 {
            Err(eyre!("Invalid query length on line {}: {qlen}", i + 1))?;
        }
        let hit = MarkerHit { marker: fields[3].to_string(), fraction: (hmm_to - hmm_from) / qlen };
        hits.push((gene_to_contig(fields[0]), hit));
    }
    Ok(hits)
}

/// Reads marker gene hits, grouped by contig.
///
/// - `.hmmout` and `.domtblout` files are parsed with [`parse_domtblout`].
/// - Anything else is a delimited table with the columns `contig`, `marker`, and optionally
///   `fraction` (default 1.0).
pub fn read_markers<P>(path: &P) -> Result<HashMap<String, Vec<MarkerHit>>, Report>
where
    P: AsRef<Path> + Debug,
{
    let ext = path.as_ref().extension().and_then(|e| e.to_str()).unwrap_or_default();
    let hits: Vec<(String, MarkerHit)> = match ext {
        "hmmout" | "domtblout" => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("Failed to read markers: {path:?}"))?;
            parse_domtblout(&text).wrap_err_with(|| format!("Failed to parse markers: {path:?}"))?
        }
        _ => {
            let delimiter = utils::get_delimiter(path)?;
            let mut reader = csv::ReaderBuilder::new()
                .delimiter(utils::delimiter_to_byte(delimiter)?)
                .has_headers(true)
                .from_path(path)
                .wrap_err_with(|| format!("Failed to read markers: {path:?}"))?;
            reader
                .deserialize::<MarkerRow>()
                .map(|row| {
                    let row = row.wrap_err_with(|| format!("Failed to parse markers: {path:?}"))?;
                    Ok((row.contig, MarkerHit { marker: row.marker, fraction: row.fraction }))
                })
                .collect::<Result<Vec<_>, Report>>()?
        }
    };

    let num_hits = hits.len();
    let mut markers: HashMap<String, Vec<MarkerHit>> = HashMap::new();
    hits.into_iter().for_each(|(contig, hit)| markers.entry(contig).or_default().push(hit));
    debug!("Read {num_hits} marker hits on {} contigs from {path:?}", markers.len());
    Ok(markers)
}

#[cfg(test)]
mod tests;
