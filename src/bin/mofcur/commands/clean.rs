use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context as _, Result, bail};
use log::warn;
use rayon::prelude::*;
use tempfile::NamedTempFile;

use mof_curate::io::cif::writer;
use mof_curate::normalize::{self, NormalizeOptions};

use crate::cli::CleanArgs;
use crate::display::{Context, batch_bar};
use crate::io::{expand_inputs, read_lines};

pub fn run_clean(args: CleanArgs, ctx: Context) -> Result<()> {
    super::configure_threads(args.batch.threads)?;

    let files = expand_inputs(&args.batch.inputs)?;
    let opts = NormalizeOptions {
        allowed_labels: read_allow_list(args.atoms.as_deref())?,
        remove_disorder: args.remove_disorder,
    };
    if let Some(dir) = &args.out_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    let bar = batch_bar(ctx.interactive, files.len() as u64);
    let failures = AtomicUsize::new(0);

    // One structure per task, nothing shared but the counters; completion
    // order is unspecified and a bad record only costs itself.
    files.par_iter().for_each(|path| {
        if let Err(e) = clean_one(path, &args, &opts) {
            warn!("{} | failed to convert to P1: {e:#}", path.display());
            failures.fetch_add(1, Ordering::Relaxed);
        }
        bar.inc(1);
    });
    bar.finish_and_clear();

    let failed = failures.load(Ordering::Relaxed);
    let cleaned = files.len() - failed;
    if ctx.interactive {
        eprintln!("  cleaned {cleaned}/{} structures", files.len());
    }
    if cleaned == 0 {
        bail!("All {} structures failed to clean", files.len());
    }
    Ok(())
}

fn clean_one(path: &Path, args: &CleanArgs, opts: &NormalizeOptions) -> Result<()> {
    let stem = record_stem(path);
    let dest_dir = match &args.out_dir {
        Some(dir) => dir.clone(),
        None => path.parent().unwrap_or(Path::new(".")).to_path_buf(),
    };
    let final_path = dest_dir.join(format!("{stem}{}", args.suffix));

    let structure = normalize::normalize_path(path, opts)?;

    if args.keep_original {
        fs::copy(path, dest_dir.join(format!("{stem}_original.cif")))
            .context("Failed to copy the original record")?;
    }

    // Serialize into a sibling temp file and persist only on success, so a
    // failure at any point leaves no partial output behind.
    let mut tmp = NamedTempFile::new_in(&dest_dir)
        .with_context(|| format!("Failed to create temp file in {}", dest_dir.display()))?;
    writer::write(&mut tmp, &structure, &stem)?;
    tmp.persist(&final_path)
        .with_context(|| format!("Failed to write {}", final_path.display()))?;

    Ok(())
}

/// The record name: file stem without the `.cif` extension.
fn record_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "structure".to_string())
}

fn read_allow_list(path: Option<&Path>) -> Result<Option<Vec<String>>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let labels: Vec<String> = read_lines(path)?
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();
    if labels.is_empty() {
        bail!("Allow-list {} contains no labels", path.display());
    }
    Ok(Some(labels))
}
