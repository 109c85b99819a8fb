use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use glob::glob;

/// Returns `true` if stderr is a terminal (interactive).
pub fn stderr_is_tty() -> bool {
    io::stderr().is_terminal()
}

/// Expand a mix of literal paths and glob patterns into a file list.
///
/// A pattern matching nothing is tolerated (a batch directory may simply be
/// empty); an input that is neither an existing file nor a valid pattern is
/// an error.
pub fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let path = Path::new(input);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        let matches =
            glob(input).with_context(|| format!("Invalid input pattern: '{}'", input))?;
        for entry in matches {
            let path = entry.with_context(|| format!("Unreadable match for '{}'", input))?;
            if path.is_file() {
                files.push(path);
            }
        }
    }
    if files.is_empty() {
        bail!("No input files matched");
    }
    Ok(files)
}

/// Read a whole text file as lines.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    BufReader::new(file)
        .lines()
        .collect::<io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Open the batch report file: created if absent, appended to otherwise, so
/// interleaved batch runs funnel into one artifact.
pub fn open_report(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open report file: {}", path.display()))
}
