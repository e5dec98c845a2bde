//! The binning engine: profile, seed, classify, propagate, assemble.

use crate::bins::{BinStore, Binning};
use crate::classify;
use crate::config::Config;
use crate::dataset::Dataset;
use crate::profile;
use crate::propagate::{self, RoundStats};
use crate::seed;
use color_eyre::eyre::{Report, Result, WrapErr};
use log::info;

/// Everything a binning run produces.
#[derive(Clone, Debug)]
pub struct Output {
    /// Bins right after seeding, before propagation.
    pub seeds: Binning,
    /// Bins after propagation and before rescue, only when rescue is enabled.
    pub propagated: Option<Binning>,
    /// Final bins.
    pub bins: Binning,
    /// Statistics of every propagation round, numbered on through the rounds after rescue.
    pub rounds: Vec<RoundStats>,
    /// Final binning state of every contig.
    pub store: BinStore,
}

/// Bins the contigs of a [`Dataset`] with a fixed [`Config`].
///
/// ## Examples
///
/// ```rust
/// use metacoag::{toy, Binner, Config};
///
/// let config = Config { threads: 2, ..Default::default() };
/// let output = Binner::new(&config).bin(&toy::two_genomes())?;
///
/// assert_eq!(output.bins.bins.len(), 2);
/// assert_eq!(output.bins.bins[0].members, ["NODE_1", "NODE_2", "NODE_3"]);
/// assert_eq!(output.bins.bins[1].members, ["NODE_4", "NODE_5", "NODE_6"]);
/// assert_eq!(output.bins.unbinned, ["NODE_7"]);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub struct Binner<'c> {
    config: &'c Config,
}

impl<'c> Binner<'c> {
    pub fn new(config: &'c Config) -> Self {
        Binner { config }
    }

    /// Runs the whole engine on a dedicated thread pool of `config.threads` threads.
    pub fn bin(&self, dataset: &Dataset) -> Result<Output, Report> {
        self.config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
            .wrap_err_with(|| format!("Failed to create a thread pool of {} threads.", self.config.threads))?;
        pool.install(|| self.run(dataset))
    }

    fn run(&self, dataset: &Dataset) -> Result<Output, Report> {
        let config = self.config;

        // ------------------------------------------------------------------------
        // Features

        let contigs = profile::profile(&dataset.contigs, config)?;
        let links = classify::get_links(&dataset.graph, &contigs, config)?;

        // ------------------------------------------------------------------------
        // Seeds and Links

        let (bins, classified) =
            rayon::join(|| seed::seed(&contigs, config), || classify::classify(&links, &contigs, config));
        let (bins, classified) = (bins?, classified?);

        let mut store = BinStore::new(contigs);
        for bin in bins {
            store.insert_bin(bin)?;
        }
        let seeds = Binning::assemble(&store, config)?;

        // ------------------------------------------------------------------------
        // Propagation

        let mut rounds = propagate::propagate(&mut store, &classified, config)?;
        let mut propagated = None;
        if config.rescue {
            propagated = Some(Binning::assemble(&store, config)?);
            if propagate::rescue(&mut store, config)? > 0 {
                let offset = rounds.len();
                let rescued = propagate::propagate(&mut store, &classified, config)?;
                rounds.extend(rescued.into_iter().map(|r| RoundStats { round: r.round + offset, ..r }));
            }
        }
        rounds.iter().for_each(|r| {
            info!(
                "Round {}: {} proposals, {} assigned, {} conflicts, {} rejected.",
                r.round, r.proposals, r.assigned, r.conflicts, r.rejected
            )
        });

        let bins = Binning::assemble(&store, config)?;
        Ok(Output { seeds, propagated, bins, rounds, store })
    }
}
