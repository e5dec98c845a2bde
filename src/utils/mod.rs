pub mod verbosity;

use color_eyre::eyre::{eyre, ContextCompat, Report, Result, WrapErr};
use color_eyre::Help;
use indicatif::{style::ProgressStyle, ProgressBar};
use std::fmt::Debug;
use std::path::Path;

/// Create the parent directory of a file path, if it doesn't exist yet.
///
/// ## Examples
///
/// ```rust
/// use metacoag::utils::create_parent_dir;
/// let dir = tempfile::tempdir()?;
/// let path = dir.path().join("a").join("b").join("bins.csv");
/// create_parent_dir(&path)?;
/// assert!(dir.path().join("a").join("b").exists());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn create_parent_dir<P>(path: &P) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create directory: {parent:?}"))?;
        }
    }
    Ok(())
}

/// Returns the delimiter implied by a table's file extension.
///
/// ## Examples
///
/// ```rust
/// use metacoag::utils::get_delimiter;
/// assert_eq!(get_delimiter(&"abundance.tsv")?, '\t');
/// assert_eq!(get_delimiter(&"abundance.csv")?, ',');
/// assert!(get_delimiter(&"abundance.xlsx").is_err());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn get_delimiter<P>(path: &P) -> Result<char, Report>
where
    P: AsRef<Path> + Debug,
{
    let ext = path
        .as_ref()
        .extension()
        .wrap_err_with(|| format!("Failed to get file extension: {path:?}"))?
        .to_str()
        .wrap_err_with(|| format!("Failed to convert file extension to str: {path:?}"))?;
    // convert extension to the expected delimiter
    match ext {
        "tsv" | "txt" | "abund" => Ok('\t'),
        "csv" => Ok(','),
        _ext => Err(eyre!("Unknown file extension: {_ext:?}").suggestion("Options: tsv, csv, or txt")),
    }
}

/// Converts a delimiter [`char`] to the single byte the [`csv`] crate expects.
pub fn delimiter_to_byte(delimiter: char) -> Result<u8, Report> {
    u8::try_from(delimiter)
        .ok()
        .filter(|b| b.is_ascii())
        .ok_or_else(|| eyre!("Delimiter must be a single ASCII character: {delimiter:?}"))
}

/// Writes rows of a table to a delimited text file, creating the parent directory if needed.
///
/// ## Examples
///
/// ```rust
/// use metacoag::utils::write_table;
/// let dir = tempfile::tempdir()?;
/// let path = dir.path().join("bins.tsv");
/// write_table(&path, &["contig", "bin"], vec![vec!["NODE_1".to_string(), "1".to_string()]], '\t')?;
/// assert_eq!(std::fs::read_to_string(&path)?, "contig\tbin\nNODE_1\t1\n");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn write_table<P>(path: &P, headers: &[&str], rows: Vec<Vec<String>>, delimiter: char) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    create_parent_dir(path)?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter_to_byte(delimiter)?)
        .from_path(path)
        .wrap_err_with(|| format!("Failed to create file: {path:?}"))?;
    if !headers.is_empty() {
        writer.write_record(headers).wrap_err_with(|| format!("Failed to write headers: {path:?}"))?;
    }
    for row in rows {
        writer.write_record(&row).wrap_err_with(|| format!("Failed to write row {row:?}: {path:?}"))?;
    }
    writer.flush().wrap_err_with(|| format!("Failed to flush: {path:?}"))?;
    Ok(())
}

/// Returns a [`ProgressBar`] of length `len`, hidden unless `progress` is true.
pub fn progress_bar(len: u64, progress: bool, message: &'static str) -> Result<ProgressBar, Report> {
    if !progress {
        return Ok(ProgressBar::hidden());
    }
    let style = ProgressStyle::with_template(
        "{msg:>12} {bar:40} {pos}/{len} ({percent}%) | Elapsed: {elapsed_precise}",
    )
    .wrap_err("Failed to create progress bar from template.")?;
    Ok(ProgressBar::new(len).with_style(style).with_message(message))
}
