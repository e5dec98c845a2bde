use crate::dataset::{read_abundance, read_contigs, read_markers, Dataset, MarkerHit};
use color_eyre::eyre::{Report, Result};
use std::path::{Path, PathBuf};

fn write(dir: &Path, name: &str, content: &str) -> Result<PathBuf, Report> {
    let path = dir.join(name);
    std::fs::write(&path, content)?;
    Ok(path)
}

const FASTA: &str = "\
>NODE_1_length_8_cov_10.5
ACGTACGT
>NODE_2_length_8_cov_3.0 some description
ACGTTTTT
>contig_3
ACGT
";

#[test]
fn contigs_from_fasta() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let path = write(dir.path(), "contigs.fasta", FASTA)?;
    let contigs = read_contigs(&path)?;

    let names: Vec<&str> = contigs.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["NODE_1_length_8_cov_10.5", "NODE_2_length_8_cov_3.0", "contig_3"]);
    assert_eq!(contigs[1].sequence, b"ACGTTTTT");
    assert_eq!(contigs[0].coverage, Some(vec![10.5]));
    assert_eq!(contigs[2].coverage, None);
    Ok(())
}

#[test]
fn duplicate_contigs() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let path = write(dir.path(), "contigs.fasta", ">NODE_1\nACGT\n>NODE_1\nACGT\n")?;
    assert!(read_contigs(&path).is_err());
    Ok(())
}

#[test]
fn abundance_table() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let path = write(dir.path(), "abundance.tsv", "contig\tsample_1\tsample_2\nNODE_1\t1.5\t2\ncontig_3\t0\t4.25\n")?;
    let abundance = read_abundance(&path)?;
    assert_eq!(abundance["NODE_1"], [1.5, 2.0]);
    assert_eq!(abundance["contig_3"], [0.0, 4.25]);

    let path = write(dir.path(), "bad.csv", "contig,sample_1\nNODE_1,high\n")?;
    assert!(read_abundance(&path).is_err());
    Ok(())
}

#[test]
fn marker_table() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let path = write(dir.path(), "markers.csv", "contig,marker,fraction\nNODE_1,COG0012,0.4\nNODE_1,COG0016,0.9\n")?;
    let markers = read_markers(&path)?;
    assert_eq!(markers["NODE_1"][0], MarkerHit { marker: "COG0012".to_string(), fraction: 0.4 });
    assert_eq!(markers["NODE_1"].len(), 2);

    // fraction is optional
    let path = write(dir.path(), "markers.tsv", "contig\tmarker\ncontig_3\tCOG0012\n")?;
    let markers = read_markers(&path)?;
    assert_eq!(markers["contig_3"][0].fraction, 1.0);
    Ok(())
}

#[test]
fn marker_domtblout() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let text = "\
#                                                                            --- full sequence --- -------------- this domain -------------   hmm coord   ali coord   env coord
# target name        accession   tlen query name           accession   qlen   E-value  score  bias   #  of  c-Evalue  i-Evalue  score  bias  from    to  from    to  from    to  acc description of target
NODE_1_length_8_cov_10.5_1_900_+ -    300 COG0012              -            200   1.2e-50  170.1   0.1   1   1   1.5e-53   1.5e-50  169.8   0.1     1   200     1   200     1   200 0.99 -
contig_3_5_100_-     -     32 COG0016              -            100   1.2e-05   20.1   0.1   1   1   1.5e-08   1.5e-05   19.8   0.1    10    40     1    30     1    32 0.90 -
";
    let path = write(dir.path(), "markers.hmmout", text)?;
    let markers = read_markers(&path)?;
    assert!((markers["NODE_1_length_8_cov_10.5"][0].fraction - 0.995).abs() < 1e-9);
    assert!((markers["contig_3"][0].fraction - 0.3).abs() < 1e-9);

    let path = write(dir.path(), "truncated.domtblout", "contig_3_5_100_- - 32 COG0016\n")?;
    assert!(read_markers(&path).is_err());
    Ok(())
}

#[test]
fn read_dataset() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let contigs = write(dir.path(), "contigs.fasta", FASTA)?;
    let abundance = write(dir.path(), "abundance.csv", "contig,sample_1\nNODE_1_length_8_cov_10.5,7\ncontig_3,2\n")?;
    let markers = write(dir.path(), "markers.tsv", "contig\tmarker\ncontig_3\tCOG0012\nunknown\tCOG0016\n")?;
    let graph = write(
        dir.path(),
        "graph.tsv",
        "NODE_1_length_8_cov_10.5\tcontig_3\ncontig_3\tNODE_1_length_8_cov_10.5\ncontig_3\tNODE_99\n",
    )?;

    let dataset = Dataset::read(&contigs, &graph, Some(abundance.as_path()), Some(markers.as_path()))?;
    assert_eq!(dataset.contigs.len(), 3);
    // the abundance table replaces coverage parsed from names
    assert_eq!(dataset.contigs[0].coverage, Some(vec![7.0]));
    assert_eq!(dataset.contigs[1].coverage, None);
    assert_eq!(dataset.contigs[2].markers.len(), 1);
    assert_eq!(dataset.graph.node_count(), 3);
    assert_eq!(dataset.graph.link_count(), 1);
    Ok(())
}

#[test]
fn read_dataset_gfa() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let contigs = write(dir.path(), "contigs.fasta", FASTA)?;
    let graph = write(
        dir.path(),
        "graph.gfa",
        "S\tNODE_2_length_8_cov_3.0\t*\nS\tcontig_3\t*\nL\tNODE_2_length_8_cov_3.0\t+\tcontig_3\t-\t0M\n",
    )?;
    let dataset = Dataset::read(&contigs, &graph, None, None)?;
    assert_eq!(dataset.contigs[1].coverage, Some(vec![3.0]));
    assert_eq!(dataset.graph.get_neighbors(&"contig_3".to_string())?, [&"NODE_2_length_8_cov_3.0".to_string()]);
    Ok(())
}

#[test]
fn read_dataset_spades_gfa() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let contigs = write(dir.path(), "contigs.fasta", FASTA)?;
    // unitig segments, contigs are paths (`NODE_2` is split into two pieces)
    let graph = write(
        dir.path(),
        "graph.gfa",
        "\
H\tVN:Z:1.0
S\t1\t*
S\t2\t*
S\t3\t*
S\t4\t*
S\t5\t*
L\t2\t+\t3\t+\t0M
L\t3\t+\t5\t+\t0M
P\tNODE_1_length_8_cov_10.5_1\t1+,2+\t*
P\tNODE_2_length_8_cov_3.0_1\t3+\t*
P\tNODE_2_length_8_cov_3.0_2\t5+\t*
P\tcontig_3\t4+,1-\t*
",
    )?;
    let dataset = Dataset::read(&contigs, &graph, None, None)?;
    assert_eq!(dataset.graph.node_count(), 3);
    assert_eq!(dataset.graph.link_count(), 2);

    let node_1 = "NODE_1_length_8_cov_10.5".to_string();
    let neighbors = dataset.graph.get_neighbors(&node_1)?;
    assert_eq!(neighbors, [&"NODE_2_length_8_cov_3.0".to_string(), &"contig_3".to_string()]);
    assert!(!dataset.graph.is_isolated(&"NODE_2_length_8_cov_3.0".to_string())?);
    Ok(())
}
