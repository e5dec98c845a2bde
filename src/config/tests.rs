use crate::config::{Config, ShortContigs};
use crate::RunArgs;
use color_eyre::eyre::{Report, Result};

#[test]
fn defaults_are_valid() -> Result<(), Report> {
    let config = Config::default();
    config.validate()?;
    assert_eq!(config.min_length, 1000);
    assert_eq!(config.depth, 10);
    assert_eq!(config.d_limit, 20);
    assert_eq!(config.short_contigs, ShortContigs::Prune);
    assert!(!config.rescue);
    assert!((config.seed_mg_threshold - 0.333333).abs() < 1e-12);
    Ok(())
}

#[test]
fn run_args_defaults_match() -> Result<(), Report> {
    let config = Config::try_from(&RunArgs::default())?;
    assert_eq!(config, Config::default());
    Ok(())
}

#[test]
fn thresholds_out_of_order() {
    let config = Config { p_intra: 0.05, p_inter: 0.05, ..Default::default() };
    assert!(config.validate().is_err());
}

#[test]
fn thresholds_out_of_range() {
    let config = Config { p_intra: 1.5, ..Default::default() };
    assert!(config.validate().is_err());

    let config = Config { mg_threshold: -0.1, ..Default::default() };
    assert!(config.validate().is_err());

    let config = Config { p_inter: 0.0, ..Default::default() };
    assert!(config.validate().is_err());

    let config = Config { seed_mg_threshold: 1.5, ..Default::default() };
    assert!(config.validate().is_err());

    // bins may be reported regardless of their marker count
    let config = Config { bin_mg_threshold: 0.0, ..Default::default() };
    assert!(config.validate().is_ok());
}

#[test]
fn zero_limits() {
    assert!(Config { depth: 0, ..Default::default() }.validate().is_err());
    assert!(Config { d_limit: 0, ..Default::default() }.validate().is_err());
    assert!(Config { threads: 0, ..Default::default() }.validate().is_err());
}

#[test]
fn invalid_args_rejected() {
    let args = RunArgs { p_inter: 0.2, ..Default::default() };
    assert!(Config::try_from(&args).is_err());
}

#[test]
fn short_contigs_display() {
    assert_eq!(ShortContigs::Prune.to_string(), "prune");
    assert_eq!(ShortContigs::PassThrough.to_string(), "pass-through");
}
