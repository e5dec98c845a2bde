use crate::bins::{Assignment, Bin, BinId, BinStore, Binning};
use crate::config::Config;
use crate::contig::ContigState;
use crate::toy;
use color_eyre::eyre::{Report, Result};
use std::collections::BTreeSet;

fn store() -> Result<BinStore, Report> {
    let contigs = vec![
        toy::contig("NODE_1", &toy::COMPOSITION_A, 10.0, &["COG0012", "COG0016", "COG0018"]),
        toy::contig("NODE_2", &toy::COMPOSITION_A, 10.0, &[]),
        toy::short_contig("NODE_3"),
        toy::contig("NODE_4", &toy::COMPOSITION_B, 50.0, &[]),
        toy::contig("NODE_5", &toy::COMPOSITION_B, 50.0, &[]),
    ];
    let mut store = BinStore::new(contigs);
    let bin = Bin::new(store.next_id(), 0, &store.contigs[0]);
    store.insert_bin(bin)?;
    store.assign(1, BinId(1), ContigState::Final, 1)?;
    store.assign(2, BinId(1), ContigState::Final, 2)?;
    let bin = Bin::new(store.next_id(), 3, &store.contigs[3]);
    store.insert_bin(bin)?;
    Ok(store)
}

#[test]
fn assemble_tables() -> Result<(), Report> {
    let binning = Binning::assemble(&store()?, &Config::default())?;

    let expected = vec![
        Assignment { contig: "NODE_1".to_string(), bin: BinId(1) },
        Assignment { contig: "NODE_2".to_string(), bin: BinId(1) },
        Assignment { contig: "NODE_4".to_string(), bin: BinId(2) },
    ];
    assert_eq!(binning.assignments, expected);
    // the short member is dropped
    assert_eq!(binning.unbinned, ["NODE_3", "NODE_5"]);
    assert_eq!(binning.bins[0].members, ["NODE_1", "NODE_2"]);
    assert_eq!(binning.bins[0].length, 10_000);
    assert_eq!(binning.bins[0].seed, "NODE_1");
    Ok(())
}

#[test]
fn low_quality_flag() -> Result<(), Report> {
    let binning = Binning::assemble(&store()?, &Config::default())?;
    assert!(!binning.bins[0].low_quality);
    assert_eq!(binning.bins[0].markers.len(), 3);
    // no markers at all
    assert!(binning.bins[1].low_quality);
    Ok(())
}

#[test]
fn empty_bins_dropped() -> Result<(), Report> {
    let config = Config { min_length: 6000, ..Default::default() };
    let binning = Binning::assemble(&store()?, &config)?;
    assert!(binning.bins.is_empty());
    assert!(binning.assignments.is_empty());
    assert_eq!(binning.unbinned.len(), 5);
    Ok(())
}

#[test]
fn contigs_never_move() -> Result<(), Report> {
    let mut store = store()?;
    assert!(store.assign(1, BinId(2), ContigState::Final, 1).is_err());
    assert!(store.assign(4, BinId(3), ContigState::Final, 1).is_err());

    let bin = Bin::new(store.next_id(), 0, &store.contigs[0]);
    assert!(store.insert_bin(bin).is_err());
    // ids must follow creation order
    let bin = Bin::new(BinId(7), 4, &store.contigs[4]);
    assert!(store.insert_bin(bin).is_err());
    Ok(())
}

#[test]
fn marker_union() -> Result<(), Report> {
    let mut store = store()?;
    store.contigs[4].trusted.insert("COG0099".to_string());
    store.assign(4, BinId(2), ContigState::Final, 1)?;
    assert_eq!(store.get_bin(BinId(2))?.markers, BTreeSet::from(["COG0099".to_string()]));
    assert!(!store.is_compatible(0, BinId(1))?);
    assert_eq!(store.num_assigned(), 5);
    Ok(())
}

#[test]
fn centroid_tracks_members() -> Result<(), Report> {
    let store = store()?;
    let centroid = &store.get_bin(BinId(1))?.centroid;
    // the short contig has features too, all three are averaged
    assert_eq!(centroid.count, 3);
    assert_eq!(centroid.coverage, [10.0]);
    Ok(())
}
