use crate::config::ShortContigs;
use crate::run::{run, RunArgs};
use crate::toy;
use clap::Parser;
use color_eyre::eyre::{Report, Result};
use std::path::Path;

/// Writes the two genomes toy dataset as input files and returns the matching [`RunArgs`].
fn toy_inputs(dir: &Path) -> Result<RunArgs, Report> {
    let dataset = toy::two_genomes();

    let mut fasta = String::new();
    let mut abundance = String::from("contig,sample_1\n");
    let mut markers = String::from("contig\tmarker\tfraction\n");
    for contig in &dataset.contigs {
        fasta += &format!(">{}\n{}\n", contig.name, String::from_utf8_lossy(&contig.sequence));
        let coverage = contig.coverage.as_ref().map(|c| c[0]).unwrap_or_default();
        abundance += &format!("{},{coverage}\n", contig.name);
        for hit in &contig.markers {
            markers += &format!("{}\t{}\t{}\n", contig.name, hit.marker, hit.fraction);
        }
    }
    let graph: String = dataset.graph.get_links()?.iter().map(|(a, b)| format!("{a}\t{b}\n")).collect();

    let args = RunArgs {
        contigs: dir.join("contigs.fasta"),
        graph: dir.join("graph.tsv"),
        abundance: Some(dir.join("abundance.csv")),
        markers: Some(dir.join("markers.tsv")),
        output_dir: dir.join("output"),
        threads: 2,
        ..Default::default()
    };
    std::fs::write(&args.contigs, fasta)?;
    std::fs::write(&args.graph, graph)?;
    std::fs::write(dir.join("abundance.csv"), abundance)?;
    std::fs::write(dir.join("markers.tsv"), markers)?;
    Ok(args)
}

#[test]
fn run_toy() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let args = toy_inputs(dir.path())?;
    let output = run(&args)?;
    assert_eq!(output.bins.bins.len(), 2);

    let bins = std::fs::read_to_string(args.output_path("bins.csv"))?;
    let mut lines: Vec<&str> = bins.lines().collect();
    assert_eq!(lines.remove(0), "contig,bin");
    lines.sort();
    assert_eq!(lines, ["NODE_1,1", "NODE_2,1", "NODE_3,1", "NODE_4,2", "NODE_5,2", "NODE_6,2"]);

    let seeds = std::fs::read_to_string(args.output_path("seed_bins.csv"))?;
    assert_eq!(seeds.lines().count(), 3);
    assert!(!args.output_path("propagated_bins.csv").exists());

    let unbinned = std::fs::read_to_string(args.output_path("unbinned.txt"))?;
    assert_eq!(unbinned, "NODE_7\n");

    let markers = std::fs::read_to_string(args.output_path("bin_markers.tsv"))?;
    let lines: Vec<&str> = markers.lines().collect();
    assert_eq!(lines[0], "bin\tseed\tmembers\tlength\tmarkers\tlow_quality");
    assert_eq!(lines[1], "1\tNODE_1\tNODE_1,NODE_2,NODE_3\t12000\tCOG0012\tfalse");

    assert_eq!(RunArgs::read(&args.output_path("run_args.json"))?, args);
    Ok(())
}

#[test]
fn run_prefix_and_delimiter() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let args = RunArgs { prefix: "sample1_".to_string(), delimiter: '\t', ..toy_inputs(dir.path())? };
    run(&args)?;

    let bins = std::fs::read_to_string(dir.path().join("output").join("sample1_bins.csv"))?;
    assert!(bins.starts_with("contig\tbin\n"));
    assert!(dir.path().join("output").join("sample1_unbinned.txt").exists());
    Ok(())
}

#[test]
fn run_rescue_writes_propagated() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let args = RunArgs { rescue: true, ..toy_inputs(dir.path())? };
    run(&args)?;

    let propagated = std::fs::read_to_string(args.output_path("propagated_bins.csv"))?;
    let mut lines: Vec<&str> = propagated.lines().collect();
    assert_eq!(lines.remove(0), "contig,bin");
    lines.sort();
    assert_eq!(lines, ["NODE_1,1", "NODE_2,1", "NODE_3,1", "NODE_4,2", "NODE_5,2", "NODE_6,2"]);
    Ok(())
}

#[test]
fn run_missing_input() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let args = RunArgs { contigs: dir.path().join("missing.fasta"), ..toy_inputs(dir.path())? };
    assert!(run(&args).is_err());
    assert!(!args.output_path("bins.csv").exists());
    Ok(())
}

#[test]
fn run_invalid_config() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let args = RunArgs { p_inter: 0.5, ..toy_inputs(dir.path())? };
    assert!(run(&args).is_err());
    Ok(())
}

#[test]
fn parse_defaults() {
    let args = RunArgs::parse_from(["run", "--contigs", "c.fasta", "--graph", "g.gfa", "--output-dir", "out"]);
    let expected = RunArgs {
        contigs: "c.fasta".into(),
        graph: "g.gfa".into(),
        output_dir: "out".into(),
        ..Default::default()
    };
    assert_eq!(args, expected);
}

#[test]
fn parse_options() {
    let args = RunArgs::parse_from([
        "run",
        "-c",
        "c.fasta",
        "-g",
        "g.tsv",
        "-o",
        "out",
        "--short-contigs",
        "pass-through",
        "--rescue",
        "--depth",
        "3",
        "--delimiter",
        "\t",
    ]);
    assert_eq!(args.short_contigs, ShortContigs::PassThrough);
    assert!(args.rescue);
    assert_eq!(args.depth, 3);
    assert_eq!(args.delimiter, '\t');
}
