use crate::config::Config;
use crate::dataset::MarkerHit;
use crate::profile::{canonical_tetramers, profile, tetramer_profile, NUM_TETRAMERS};
use crate::toy;
use color_eyre::eyre::{Report, Result};
use std::collections::BTreeSet;

#[test]
fn canonical_count() -> Result<(), Report> {
    let table = canonical_tetramers();
    let distinct: BTreeSet<usize> = table.iter().copied().collect();
    assert_eq!(distinct.len(), NUM_TETRAMERS);
    Ok(())
}

#[test]
fn reverse_complement_identical() -> Result<(), Report> {
    let table = canonical_tetramers();
    let forward = tetramer_profile(b"ACGGTTACCAGT", &table);
    let reverse = tetramer_profile(b"ACTGGTAACCGT", &table);
    assert!(forward.is_some());
    assert_eq!(forward, reverse);
    Ok(())
}

#[test]
fn profile_is_normalized() -> Result<(), Report> {
    let table = canonical_tetramers();
    let sequence = toy::sequence("ACGTTGCAAGGCTTAC", 2000);
    let profile = tetramer_profile(sequence.as_bytes(), &table).unwrap_or_default();
    assert_eq!(profile.len(), NUM_TETRAMERS);
    assert!((profile.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn lowercase_and_ambiguous() -> Result<(), Report> {
    let table = canonical_tetramers();
    assert_eq!(tetramer_profile(b"acgt", &table), tetramer_profile(b"ACGT", &table));
    assert_eq!(tetramer_profile(b"ACGNNACG", &table), None);
    Ok(())
}

#[test]
fn marker_trust() -> Result<(), Report> {
    let config = Config::default();
    let mut record = toy::record("NODE_1", &toy::sequence("ACGT", 2000), 10.0, &[]);
    record.markers = vec![
        MarkerHit { marker: "COG0012".to_string(), fraction: 0.9 },
        MarkerHit { marker: "COG0016".to_string(), fraction: 0.2 },
    ];
    let contigs = profile(&[record], &config)?;
    assert_eq!(contigs[0].markers.len(), 2);
    assert_eq!(contigs[0].trusted, BTreeSet::from(["COG0012".to_string()]));
    Ok(())
}

#[test]
fn marker_trust_at_threshold() -> Result<(), Report> {
    let config = Config { mg_threshold: 0.5, ..Default::default() };
    let mut record = toy::record("NODE_1", &toy::sequence("ACGT", 2000), 10.0, &[]);
    record.markers = vec![
        MarkerHit { marker: "COG0012".to_string(), fraction: 0.5 },
        MarkerHit { marker: "COG0016".to_string(), fraction: 0.4999 },
    ];
    let contigs = profile(&[record], &config)?;
    // a hit covering exactly the threshold is trusted
    assert_eq!(contigs[0].trusted, BTreeSet::from(["COG0012".to_string()]));
    Ok(())
}

#[test]
fn coverage_dimensions() -> Result<(), Report> {
    let config = Config::default();
    let sequence = toy::sequence("ACGT", 2000);
    let mut records = vec![
        toy::record("NODE_1", &sequence, 10.0, &[]),
        toy::record("NODE_2", &sequence, 10.0, &[]),
        toy::record("NODE_3", &sequence, 10.0, &[]),
        toy::record("NODE_4", &sequence, 10.0, &[]),
    ];
    records[0].coverage = Some(vec![10.0, 20.0]);
    records[1].coverage = Some(vec![10.0, 20.0]);
    // wrong number of samples
    records[2].coverage = Some(vec![10.0]);
    records[3].coverage = Some(vec![f64::NAN, 20.0]);

    let contigs = profile(&records, &config)?;
    let has_coverage: Vec<bool> = contigs.iter().map(|c| c.coverage.is_some()).collect();
    assert_eq!(has_coverage, [true, true, false, false]);
    assert!(!contigs[2].is_eligible(config.min_length));
    Ok(())
}

#[test]
fn missing_coverage() -> Result<(), Report> {
    let config = Config::default();
    let mut record = toy::record("NODE_1", &toy::sequence("ACGT", 2000), 10.0, &["COG0012"]);
    record.coverage = None;
    let contigs = profile(&[record], &config)?;
    assert!(contigs[0].coverage.is_none());
    // demoted, not dropped
    assert_eq!(contigs[0].name, "NODE_1");
    Ok(())
}
