//! Validated binning parameters.

use crate::classify::ProbabilityModel;
use crate::run::RunArgs;
use clap::ValueEnum;
use color_eyre::eyre::{eyre, Report, Result};
use color_eyre::Help;
use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Short Contigs
// ----------------------------------------------------------------------------

/// How contigs shorter than the minimum length are treated in the assembly graph.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, ValueEnum, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ShortContigs {
    /// Remove short contigs and their links from the graph.
    #[default]
    Prune,
    /// Connect the neighbors of short contigs through them, counting every hop.
    PassThrough,
}

// ----------------------------------------------------------------------------
// Config
// ----------------------------------------------------------------------------

/// Parameters shared by every stage of the binning engine.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Config {
    /// Minimum contig length (bp) to take part in binning.
    pub min_length: usize,
    /// Links with a probability of at least `p_intra` are merge evidence.
    pub p_intra: f64,
    /// Links with a probability of at most `p_inter` are split evidence.
    pub p_inter: f64,
    /// Minimum fraction of a marker model a hit must cover to be trusted.
    pub mg_threshold: f64,
    /// Markers carried by fewer contigs than this fraction of the most carried marker do not seed bins.
    pub seed_mg_threshold: f64,
    /// Bins with fewer markers than this fraction of all markers are flagged as low quality.
    pub bin_mg_threshold: f64,
    /// Maximum number of propagation rounds.
    pub depth: usize,
    /// Maximum hop distance between a contig and the seed of its bin.
    pub d_limit: usize,
    pub threads: usize,
    pub short_contigs: ShortContigs,
    /// Try to place contigs left unbinned by propagation using bin centroids.
    pub rescue: bool,
    pub progress: bool,
    pub model: ProbabilityModel,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            min_length: 1000,
            p_intra: 0.1,
            p_inter: 0.01,
            mg_threshold: 0.5,
            seed_mg_threshold: 0.333333,
            bin_mg_threshold: 0.33333,
            depth: 10,
            d_limit: 20,
            threads: 8,
            short_contigs: ShortContigs::default(),
            rescue: false,
            progress: false,
            model: ProbabilityModel::default(),
        }
    }
}

impl Config {
    /// Checks that the parameters are consistent.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use metacoag::Config;
    /// assert!(Config::default().validate().is_ok());
    ///
    /// let config = Config { p_inter: 0.5, ..Default::default() };
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), Report> {
        let probabilities = [("p_intra", self.p_intra), ("p_inter", self.p_inter), ("mg_threshold", self.mg_threshold)];
        for (name, value) in probabilities {
            if !(value > 0.0 && value <= 1.0) {
                Err(eyre!("Invalid {name}: {value}").suggestion("Probabilities and thresholds must be greater than 0 and at most 1."))?;
            }
        }
        let fractions = [("seed_mg_threshold", self.seed_mg_threshold), ("bin_mg_threshold", self.bin_mg_threshold)];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                Err(eyre!("Invalid {name}: {value}").suggestion("Use a fraction between 0 and 1."))?;
            }
        }
        if self.p_inter >= self.p_intra {
            Err(eyre!("Invalid thresholds: p_inter ({}) must be less than p_intra ({}).", self.p_inter, self.p_intra)
                .suggestion("Links between p_inter and p_intra are treated as uncertain, so this range cannot be empty."))?;
        }
        if self.depth == 0 {
            Err(eyre!("Invalid depth: 0").suggestion("Use a depth of at least 1 propagation round."))?;
        }
        if self.d_limit == 0 {
            Err(eyre!("Invalid d_limit: 0").suggestion("Use a d_limit of at least 1 hop."))?;
        }
        if self.threads == 0 {
            Err(eyre!("Invalid threads: 0").suggestion("Use at least 1 thread."))?;
        }
        self.model.validate()?;
        Ok(())
    }
}

impl TryFrom<&RunArgs> for Config {
    type Error = Report;

    /// Returns a validated [`Config`] from command-line arguments.
    ///
    /// ```rust
    /// use metacoag::{Config, RunArgs};
    /// let args = RunArgs { depth: 3, ..Default::default() };
    /// let config = Config::try_from(&args)?;
    /// assert_eq!(config.depth, 3);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    fn try_from(args: &RunArgs) -> Result<Self, Report> {
        let config = Config {
            min_length: args.min_length,
            p_intra: args.p_intra,
            p_inter: args.p_inter,
            mg_threshold: args.mg_threshold,
            seed_mg_threshold: args.seed_mg_threshold,
            bin_mg_threshold: args.bin_mg_threshold,
            depth: args.depth,
            d_limit: args.d_limit,
            threads: args.threads,
            short_contigs: args.short_contigs,
            rescue: args.rescue,
            progress: args.progress,
            model: ProbabilityModel::default(),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests;
