use clap::ValueEnum;
use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// Verbosity
// -----------------------------------------------------------------------------

/// The output verbosity level, from quietest to loudest.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, ValueEnum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Verbosity {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl Verbosity {
    /// Returns the `RUST_LOG` filter for this level.
    ///
    /// The level applies to the binning crates, dependencies only report warnings and errors.
    ///
    /// ```rust
    /// use metacoag::Verbosity;
    /// assert_eq!(Verbosity::Debug.to_string(), "debug");
    /// assert_eq!(Verbosity::Debug.filter(), "warn,metacoag=debug,metacoag_graph=debug");
    /// assert_eq!(Verbosity::Error.filter(), "error");
    /// ```
    pub fn filter(&self) -> String {
        match self {
            Verbosity::Error | Verbosity::Warn => self.to_string(),
            _ => format!("warn,metacoag={self},metacoag_graph={self}"),
        }
    }
}
