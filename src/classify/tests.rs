use crate::classify::{classify, get_links, EdgeClass, Link, ProbabilityModel};
use crate::config::{Config, ShortContigs};
use crate::toy;
use color_eyre::eyre::{Report, Result};
use metacoag_graph::examples;

#[test]
fn composition_probability_decreases() -> Result<(), Report> {
    let model = ProbabilityModel::default();
    let distances = [0.0, 0.005, 0.01, 0.015, 0.02, 0.05, 0.1];
    let probabilities: Vec<f64> = distances.iter().map(|d| model.composition_probability(*d)).collect();
    assert!(probabilities.windows(2).all(|w| w[0] > w[1]));
    assert!((probabilities[0] - 0.979).abs() < 0.001);
    Ok(())
}

#[test]
fn coverage_probability_kernel() -> Result<(), Report> {
    let model = ProbabilityModel::default();
    // one sigma away
    let p = model.coverage_probability(0.5);
    assert!((p - (-0.5_f64).exp()).abs() < 1e-12);
    Ok(())
}

#[test]
fn invalid_model() {
    let model = ProbabilityModel { sigma_intra: 0.1, ..Default::default() };
    assert!(model.validate().is_err());
    let model = ProbabilityModel { sigma_coverage: 0.0, ..Default::default() };
    assert!(model.validate().is_err());
}

#[test]
fn classify_thresholds() -> Result<(), Report> {
    let config = Config::default();
    let contigs = vec![
        toy::contig("NODE_1", &toy::COMPOSITION_A, 10.0, &[]),
        toy::contig("NODE_2", &toy::COMPOSITION_A, 10.0, &[]),
        toy::contig("NODE_3", &toy::COMPOSITION_B, 10.0, &[]),
        // log coverage difference of ~1.22 leaves the pair between the thresholds
        toy::contig("NODE_4", &toy::COMPOSITION_A, 2.25, &[]),
    ];
    let links = [Link { a: 0, b: 1, hops: 1 }, Link { a: 0, b: 2, hops: 1 }, Link { a: 0, b: 3, hops: 1 }];
    let classified = classify(&links, &contigs, &config)?;

    let classes: Vec<EdgeClass> = classified.iter().map(|c| c.class).collect();
    assert_eq!(classes, [EdgeClass::Merge, EdgeClass::Split, EdgeClass::Uncertain]);
    assert_eq!(classified[2].link, links[2]);
    Ok(())
}

#[test]
fn classify_missing_features() {
    let config = Config::default();
    let mut contigs = vec![
        toy::contig("NODE_1", &toy::COMPOSITION_A, 10.0, &[]),
        toy::contig("NODE_2", &toy::COMPOSITION_A, 10.0, &[]),
    ];
    contigs[1].coverage = None;
    assert!(classify(&[Link { a: 0, b: 1, hops: 1 }], &contigs, &config).is_err());
}

#[test]
fn links_prune_short() -> Result<(), Report> {
    let config = Config::default();
    let graph = examples::path(4);
    let contigs = vec![
        toy::contig("NODE_1", &toy::COMPOSITION_A, 10.0, &[]),
        toy::short_contig("NODE_2"),
        toy::contig("NODE_3", &toy::COMPOSITION_A, 10.0, &[]),
        toy::contig("NODE_4", &toy::COMPOSITION_A, 10.0, &[]),
    ];
    let links = get_links(&graph, &contigs, &config)?;
    assert_eq!(links, [Link { a: 2, b: 3, hops: 1 }]);
    Ok(())
}

#[test]
fn links_pass_through_short() -> Result<(), Report> {
    let config = Config { short_contigs: ShortContigs::PassThrough, ..Default::default() };
    let graph = examples::path(5);
    let contigs = vec![
        toy::contig("NODE_1", &toy::COMPOSITION_A, 10.0, &[]),
        toy::short_contig("NODE_2"),
        toy::short_contig("NODE_3"),
        toy::contig("NODE_4", &toy::COMPOSITION_A, 10.0, &[]),
        toy::contig("NODE_5", &toy::COMPOSITION_A, 10.0, &[]),
    ];
    let links = get_links(&graph, &contigs, &config)?;
    // the chain through two short contigs is three graph edges long
    assert_eq!(links, [Link { a: 0, b: 3, hops: 3 }, Link { a: 3, b: 4, hops: 1 }]);
    Ok(())
}

#[test]
fn links_missing_features_pruned() -> Result<(), Report> {
    let config = Config { short_contigs: ShortContigs::PassThrough, ..Default::default() };
    let graph = examples::path(3);
    let mut contigs = vec![
        toy::contig("NODE_1", &toy::COMPOSITION_A, 10.0, &[]),
        toy::contig("NODE_2", &toy::COMPOSITION_A, 10.0, &[]),
        toy::contig("NODE_3", &toy::COMPOSITION_A, 10.0, &[]),
    ];
    contigs[1].composition = None;
    let links = get_links(&graph, &contigs, &config)?;
    assert!(links.is_empty());
    Ok(())
}

#[test]
fn links_unknown_nodes_ignored() -> Result<(), Report> {
    let config = Config::default();
    let graph = examples::path(3);
    let contigs = vec![
        toy::contig("NODE_2", &toy::COMPOSITION_A, 10.0, &[]),
        toy::contig("NODE_3", &toy::COMPOSITION_A, 10.0, &[]),
    ];
    let links = get_links(&graph, &contigs, &config)?;
    assert_eq!(links, [Link { a: 0, b: 1, hops: 1 }]);
    Ok(())
}
