//! [Command-line interface](Cli) (CLI) of the main binary.

use crate::run::RunArgs;
use crate::Verbosity;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// CLI Entry Point
// ----------------------------------------------------------------------------

/// The command-line interface (CLI).
/// ---
/// The CLI is intended for parsing user input from the command-line in the main function. This is achieved with the `parse` function, which parses the command line arguments from [`std::env::args`](https://doc.rust-lang.org/std/env/fn.args.html).
/// ```no_run
/// use clap::Parser;
/// let args = metacoag::Cli::parse();
/// ```
/// Here is a manual example of setting the command-line input:
/// ```rust
/// use clap::Parser;
/// use metacoag::cli::Command;
///
/// let input = ["metacoag", "run", "-c", "contigs.fasta", "-g", "graph.gfa", "-o", "output", "-v", "debug"];
/// let args = metacoag::Cli::parse_from(input);
/// assert_eq!(args.verbosity, metacoag::Verbosity::Debug);
/// match args.command {
///     Command::Run(run_args) => assert_eq!(run_args.min_length, 1000),
/// }
/// ```
#[derive(Debug, Deserialize, Parser, Serialize)]
#[clap(name = "metacoag", author, version)]
#[clap(about = "metacoag bins metagenomic contigs using the assembly graph, coverage, composition and single-copy marker genes.")]
pub struct Cli {
    /// Pass CLI arguments to a particular [Command].
    #[clap(subcommand)]
    #[clap(help = "Set the command.")]
    pub command: Command,

    /// Set the output [Verbosity] level.
    #[clap(short = 'v', long)]
    #[clap(value_enum, default_value_t = Verbosity::default())]
    #[clap(hide_possible_values = false)]
    #[clap(global = true)]
    #[clap(help = "Set the output verbosity level.")]
    pub verbosity: Verbosity,
}

/// CLI [commands](#variants).
#[derive(Debug, Deserialize, Serialize, Subcommand)]
pub enum Command {
    /// Pass CLI arguments to [run](crate::run::run).
    #[clap(about = "Bin contigs and write the bins to the output directory.")]
    Run(RunArgs),
}
