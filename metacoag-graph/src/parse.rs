//! Parsers that normalize assembler graph text into contig names and links.

use color_eyre::eyre::{eyre, Report, Result};
use color_eyre::Help;
use itertools::Itertools;
use log::debug;
use std::collections::BTreeMap;

/// Returns the links (`source`, `target`) described by a normalized edge list.
///
/// - One link per line, with the two contig names separated by a tab, comma, or spaces.
/// - Blank lines and lines beginning with `#` are skipped.
/// - Any columns after the first two are ignored (ex. edge weights).
///
/// ## Examples
///
/// ```rust
/// use metacoag_graph::parse;
/// let links = parse::edge_list_to_vec("# comment\nNODE_1\tNODE_2\n\nNODE_2,NODE_3,0.9\n")?;
/// assert_eq!(links, [("NODE_1".to_string(), "NODE_2".to_string()), ("NODE_2".to_string(), "NODE_3".to_string())]);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
///
/// A line with a single contig is an error.
///
/// ```rust
/// # use metacoag_graph::parse;
/// assert!(parse::edge_list_to_vec("NODE_1\n").is_err());
/// ```
pub fn edge_list_to_vec(edge_list: &str) -> Result<Vec<(String, String)>, Report> {
    let mut links = Vec::new();

    for (i, line) in edge_list.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> =
            line.split(|c: char| c == '\t' || c == ',' || c == ' ').filter(|f| !f.is_empty()).collect();
        match fields.as_slice() {
            [source, target, ..] => links.push((source.to_string(), target.to_string())),
            _ => Err(eyre!("Failed to parse edge list line {}: {line:?}", i + 1)
                .suggestion("Each line should contain two contig names."))?,
        }
    }

    Ok(links)
}

// ----------------------------------------------------------------------------
// GFA
// ----------------------------------------------------------------------------

/// Orientation of a segment in a GFA path.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Orientation {
    Forward,
    Backward,
}

/// A GFA `P` line: a named walk through segments.
///
/// SPAdes writes one path per contig, over the unitigs (segments) the contig was built from.
#[derive(Clone, Debug, PartialEq)]
pub struct GfaPath {
    pub path_name: String,
    pub segment_names: Vec<(String, Orientation)>,
}

impl GfaPath {
    /// Returns the first and last segments of the path.
    pub fn ends(&self) -> Option<(&str, &str)> {
        let (first, _) = self.segment_names.first()?;
        let (last, _) = self.segment_names.last()?;
        Some((first.as_str(), last.as_str()))
    }
}

/// The records of a GFA (v1) file that describe connectivity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Gfa {
    /// `S` line names, in order of appearance.
    pub segments: Vec<String>,
    /// `L` lines as (`source`, `target`), orientation is discarded.
    pub links: Vec<(String, String)>,
    /// `P` lines, in order of appearance.
    pub paths: Vec<GfaPath>,
}

impl Gfa {
    /// Returns the links between paths (contigs), in order of first appearance.
    ///
    /// Two paths are linked when they end on the same segment, or when an end segment of one is
    /// linked to an end segment of the other. Inner segments do not connect paths.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use metacoag_graph::parse;
    /// let gfa = "\
    /// S\t1\t*\nS\t2\t*\nS\t3\t*\nS\t4\t*
    /// L\t2\t+\t3\t+\t0M
    /// P\tNODE_1\t1+,2+\t*
    /// P\tNODE_2\t3+\t*
    /// P\tNODE_3\t4+,1-\t*
    /// ";
    /// let links = parse::parse_gfa(gfa)?.path_links();
    /// assert_eq!(links, [("NODE_1".to_string(), "NODE_3".to_string()), ("NODE_1".to_string(), "NODE_2".to_string())]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn path_links(&self) -> Vec<(String, String)> {
        let mut ends: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, path) in self.paths.iter().enumerate() {
            let Some((first, last)) = path.ends() else { continue };
            ends.entry(first).or_default().push(i);
            if last != first {
                ends.entry(last).or_default().push(i);
            }
        }

        let mut pairs: Vec<(usize, usize)> = Vec::new();
        // shared end segments
        for paths in ends.values() {
            paths.iter().tuple_combinations().for_each(|(a, b)| pairs.push((*a, *b)));
        }
        // linked end segments
        for (source, target) in &self.links {
            let (Some(sources), Some(targets)) = (ends.get(source.as_str()), ends.get(target.as_str())) else {
                continue;
            };
            sources.iter().cartesian_product(targets).for_each(|(a, b)| pairs.push((*a, *b)));
        }

        pairs
            .into_iter()
            .filter(|(a, b)| a != b)
            .map(|(a, b)| (a.min(b), a.max(b)))
            .unique()
            .map(|(a, b)| (self.paths[a].path_name.clone(), self.paths[b].path_name.clone()))
            .collect()
    }
}

fn parse_orientation(orientation: &str) -> Option<Orientation> {
    match orientation {
        "+" => Some(Orientation::Forward),
        "-" => Some(Orientation::Backward),
        _ => None,
    }
}

/// Returns the segments, links and paths described by a GFA (v1) [`str`].
///
/// - `S` lines become segments, in order of appearance.
/// - `L` lines become links, orientation is discarded.
/// - `P` lines become paths of oriented segments (ex. `1+,2-`).
/// - All other record types (`H`, `C`, ...) are skipped.
///
/// ## Examples
///
/// ```rust
/// use metacoag_graph::parse;
/// let gfa = "H\tVN:Z:1.0\nS\tcontig_1\t*\nS\tcontig_2\t*\nL\tcontig_1\t+\tcontig_2\t-\t0M\n";
/// let gfa = parse::parse_gfa(gfa)?;
/// assert_eq!(gfa.segments, ["contig_1", "contig_2"]);
/// assert_eq!(gfa.links, [("contig_1".to_string(), "contig_2".to_string())]);
/// assert!(gfa.paths.is_empty());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
///
/// Paths keep the orientation of each segment.
///
/// ```rust
/// use metacoag_graph::parse::{self, Orientation};
/// let gfa = parse::parse_gfa("S\t1\t*\nS\t2\t*\nP\tNODE_1_length_90_cov_2.5_1\t1+,2-\t*\n")?;
/// assert_eq!(gfa.paths[0].path_name, "NODE_1_length_90_cov_2.5_1");
/// assert_eq!(gfa.paths[0].segment_names[1], ("2".to_string(), Orientation::Backward));
///
/// assert!(parse::parse_gfa("P\tNODE_1\t1+,2\t*\n").is_err());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn parse_gfa(gfa: &str) -> Result<Gfa, Report> {
    let mut parsed = Gfa::default();

    for (i, line) in gfa.lines().enumerate() {
        let fields: Vec<&str> = line.split('\t').collect();
        match fields[0] {
            "S" => match fields.get(1) {
                Some(name) => parsed.segments.push(name.to_string()),
                None => Err(eyre!("Failed to parse GFA segment on line {}: {line:?}", i + 1))?,
            },
            "L" => match (fields.get(1), fields.get(3)) {
                (Some(source), Some(target)) => parsed.links.push((source.to_string(), target.to_string())),
                _ => Err(eyre!("Failed to parse GFA link on line {}: {line:?}", i + 1))?,
            },
            "P" => {
                let (Some(name), Some(steps)) = (fields.get(1), fields.get(2)) else {
                    return Err(eyre!("Failed to parse GFA path on line {}: {line:?}", i + 1));
                };
                let segment_names = steps
                    .split(',')
                    .map(|step| {
                        let (segment, orientation) = step.split_at(step.len().saturating_sub(1));
                        match (segment.is_empty(), parse_orientation(orientation)) {
                            (false, Some(orientation)) => Ok((segment.to_string(), orientation)),
                            _ => Err(eyre!("Failed to parse GFA path step {step:?} on line {}", i + 1)
                                .suggestion("Path steps are segment names followed by + or -, separated by commas.")),
                        }
                    })
                    .collect::<Result<Vec<_>, Report>>()?;
                parsed.paths.push(GfaPath { path_name: name.to_string(), segment_names });
            }
            "" => continue,
            record => debug!("Skipping GFA record type {record:?} on line {}", i + 1),
        }
    }

    Ok(parsed)
}
