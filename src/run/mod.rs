//! Run the binning engine on input files and write the bins.

use crate::bins::Binning;
use crate::config::{Config, ShortContigs};
use crate::dataset::Dataset;
use crate::engine::{Binner, Output};
use crate::utils;
use clap::Parser;
use color_eyre::eyre::{Report, Result, WrapErr};
use indoc::formatdoc;
use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// Bin contigs and write the results to the output directory.
///
/// ## Outputs
///
/// - `bins.csv`: contig, bin.
/// - `seed_bins.csv`: contig, bin right after seeding.
/// - `propagated_bins.csv`: contig, bin after propagation and before rescue (`--rescue` only).
/// - `unbinned.txt`: one contig per line.
/// - `bin_markers.tsv`: bin, seed, members, length, markers, low_quality.
/// - `run_args.json`: the arguments of the run.
///
/// All file names are preceded by `--prefix`.
pub fn run(args: &RunArgs) -> Result<Output, Report> {
    let config = Config::try_from(args)?;
    info!("Binning with {} threads.", config.threads);

    let dataset = Dataset::read(&args.contigs, &args.graph, args.abundance.as_deref(), args.markers.as_deref())?;
    let output = Binner::new(&config).bin(&dataset)?;

    let outputs = [
        (args.output_path("bins.csv"), Some(&output.bins)),
        (args.output_path("seed_bins.csv"), Some(&output.seeds)),
        (args.output_path("propagated_bins.csv"), output.propagated.as_ref()),
    ];
    for (path, binning) in outputs {
        if let Some(binning) = binning {
            write_assignments(&path, binning, args.delimiter)?;
        }
    }
    write_unbinned(&args.output_path("unbinned.txt"), &output.bins)?;
    write_bin_markers(&args.output_path("bin_markers.tsv"), &output.bins)?;
    args.write(&args.output_path("run_args.json"))?;

    let low_quality = output.bins.bins.iter().filter(|b| b.low_quality).count();
    let summary = formatdoc!(
        "
        Binning summary:
          bins:        {}
          low quality: {low_quality}
          binned:      {}
          unbinned:    {}
          output:      {:?}",
        output.bins.bins.len(),
        output.bins.assignments.len(),
        output.bins.unbinned.len(),
        args.output_dir,
    );
    info!("{summary}");
    Ok(output)
}

/// Writes the contig to bin table.
pub fn write_assignments<P>(path: &P, binning: &Binning, delimiter: char) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    let rows = binning.assignments.iter().map(|a| vec![a.contig.clone(), a.bin.to_string()]).collect();
    utils::write_table(path, &["contig", "bin"], rows, delimiter)
}

/// Writes the unbinned contigs, one per line.
pub fn write_unbinned<P>(path: &P, binning: &Binning) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    utils::create_parent_dir(path)?;
    let mut output = binning.unbinned.join("\n");
    if !output.is_empty() {
        output.push('\n');
    }
    std::fs::write(path, output).wrap_err_with(|| format!("Failed to write unbinned contigs: {path:?}"))
}

/// Writes one row per bin, with comma-separated members and markers.
pub fn write_bin_markers<P>(path: &P, binning: &Binning) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    let headers = ["bin", "seed", "members", "length", "markers", "low_quality"];
    let rows = binning
        .bins
        .iter()
        .map(|b| {
            vec![
                b.id.to_string(),
                b.seed.clone(),
                b.members.join(","),
                b.length.to_string(),
                b.markers.iter().join(","),
                b.low_quality.to_string(),
            ]
        })
        .collect();
    utils::write_table(path, &headers, rows, '\t')
}

// ----------------------------------------------------------------------------
// RunArgs
// ----------------------------------------------------------------------------

/// Bin metagenomic contigs using the assembly graph and single-copy marker genes.
#[derive(Clone, Debug, Deserialize, Parser, PartialEq, Serialize)]
pub struct RunArgs {
    /// Assembled contigs (FASTA).
    #[clap(short = 'c', long, required = true)]
    pub contigs: PathBuf,

    /// Assembly graph, as GFA (.gfa) or an edge list of contig names.
    #[clap(short = 'g', long, required = true)]
    pub graph: PathBuf,

    /// Per-sample contig coverage table (.tsv or .csv).
    ///
    /// Without it, coverage is parsed from SPAdes contig names.
    #[clap(short = 'a', long)]
    pub abundance: Option<PathBuf>,

    /// Marker gene hits, as a table (contig, marker, fraction) or HMMER domain table (.hmmout).
    #[clap(short = 'm', long)]
    pub markers: Option<PathBuf>,

    /// Output directory.
    ///
    /// If the directory does not exist, it will be created.
    #[clap(short = 'o', long, required = true)]
    pub output_dir: PathBuf,

    /// Prefix of the output file names.
    #[clap(long, default_value_t = RunArgs::default().prefix)]
    pub prefix: String,

    /// Minimum length (bp) of contigs to bin.
    #[clap(short = 'l', long, default_value_t = RunArgs::default().min_length)]
    pub min_length: usize,

    /// Minimum probability for a link to join two contigs.
    #[clap(long, default_value_t = RunArgs::default().p_intra)]
    pub p_intra: f64,

    /// Maximum probability for a link to separate two contigs.
    #[clap(long, default_value_t = RunArgs::default().p_inter)]
    pub p_inter: f64,

    /// Minimum fraction of a marker gene model a hit must cover.
    #[clap(long, default_value_t = RunArgs::default().mg_threshold)]
    pub mg_threshold: f64,

    /// Fraction of the most carried marker gene's contigs a marker gene needs to seed bins.
    #[clap(long, default_value_t = RunArgs::default().seed_mg_threshold)]
    pub seed_mg_threshold: f64,

    /// Fraction of all marker genes below which a bin is flagged as low quality.
    #[clap(long, default_value_t = RunArgs::default().bin_mg_threshold)]
    pub bin_mg_threshold: f64,

    /// Maximum number of propagation rounds.
    #[clap(long, default_value_t = RunArgs::default().depth)]
    pub depth: usize,

    /// Maximum number of hops between a contig and its bin's seed.
    #[clap(long, default_value_t = RunArgs::default().d_limit)]
    pub d_limit: usize,

    /// Delimiter of the contig to bin tables.
    #[clap(long, default_value_t = RunArgs::default().delimiter)]
    pub delimiter: char,

    /// How contigs shorter than --min-length are treated in the assembly graph.
    #[clap(long, value_enum, default_value_t = RunArgs::default().short_contigs)]
    pub short_contigs: ShortContigs,

    /// Place contigs left unbinned after propagation in the most similar bin.
    #[clap(long)]
    pub rescue: bool,

    /// Display progress bars.
    #[clap(long)]
    #[serde(skip)]
    pub progress: bool,

    /// Number of CPU threads to use.
    #[clap(short = 't', long, default_value_t = RunArgs::default().threads)]
    pub threads: usize,
}

impl Default for RunArgs {
    fn default() -> Self {
        let config = Config::default();
        RunArgs {
            contigs: PathBuf::new(),
            graph: PathBuf::new(),
            abundance: None,
            markers: None,
            output_dir: PathBuf::new(),
            prefix: String::new(),
            min_length: config.min_length,
            p_intra: config.p_intra,
            p_inter: config.p_inter,
            mg_threshold: config.mg_threshold,
            seed_mg_threshold: config.seed_mg_threshold,
            bin_mg_threshold: config.bin_mg_threshold,
            depth: config.depth,
            d_limit: config.d_limit,
            delimiter: ',',
            short_contigs: config.short_contigs,
            rescue: config.rescue,
            progress: config.progress,
            threads: config.threads,
        }
    }
}

impl RunArgs {
    /// Returns the path of an output file, in the output directory and with the prefix.
    ///
    /// ```rust
    /// use metacoag::RunArgs;
    /// use std::path::PathBuf;
    /// let args = RunArgs { output_dir: PathBuf::from("out"), prefix: "sample1_".to_string(), ..Default::default() };
    /// assert_eq!(args.output_path("bins.csv"), PathBuf::from("out/sample1_bins.csv"));
    /// ```
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{}{name}", self.prefix))
    }

    /// Reads [`RunArgs`] from a JSON file.
    pub fn read<P>(path: &P) -> Result<RunArgs, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let input = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read run arguments: {path:?}."))?;
        let run_args = serde_json::from_str(&input)
            .wrap_err_with(|| format!("Failed to deserialize run arguments: {input}"))?;
        Ok(run_args)
    }

    /// Write [`RunArgs`] to a JSON file.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use metacoag::RunArgs;
    /// let dir = tempfile::tempdir()?;
    /// let path = dir.path().join("run_args.json");
    /// RunArgs::default().write(&path)?;
    /// assert_eq!(RunArgs::read(&path)?, RunArgs::default());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn write<P>(&self, path: &P) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        utils::create_parent_dir(path)?;
        let output = serde_json::to_string_pretty(self)
            .wrap_err_with(|| format!("Failed to serialize run arguments: {self:?}"))?;
        std::fs::write(path, output).wrap_err_with(|| format!("Failed to write run arguments: {path:?}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
