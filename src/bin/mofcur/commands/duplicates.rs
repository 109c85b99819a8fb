use anyhow::{Result, bail};
use log::warn;

use mof_curate::formula::find_multiples;
use mof_curate::io::cif::reader;
use mof_curate::model::structure::Structure;

use crate::cli::DuplicatesArgs;
use crate::display::Context;
use crate::io::{expand_inputs, read_lines};

pub fn run_duplicates(args: DuplicatesArgs, _ctx: Context) -> Result<()> {
    let formulas = collect_formulas(&args)?;
    if formulas.is_empty() {
        bail!("No formulas to compare");
    }

    let mut hits = 0usize;
    for formula in &formulas {
        let multiples = find_multiples(formula, &formulas);
        if !multiples.is_empty() {
            println!("Multiples of {}: {}", formula, multiples.join(", "));
            hits += 1;
        }
    }
    if hits == 0 {
        eprintln!("No formula multiples found among {} formulas", formulas.len());
    }
    Ok(())
}

/// Formulas come from a text file (one per line) or are computed as formula
/// sums from CIF inputs; an unreadable record is skipped with a warning.
fn collect_formulas(args: &DuplicatesArgs) -> Result<Vec<String>> {
    if let Some(path) = &args.formulas {
        return Ok(read_lines(path)?
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect());
    }

    if args.inputs.is_empty() {
        bail!("Provide CIF inputs or --formulas <FILE>");
    }

    let mut formulas = Vec::new();
    for path in expand_inputs(&args.inputs)? {
        let lines = match read_lines(&path) {
            Ok(lines) => lines,
            Err(e) => {
                warn!("{} | skipped: {e:#}", path.display());
                continue;
            }
        };
        match reader::parse_record(&lines, None) {
            Ok(record) => {
                let structure = Structure::new(record.lattice, record.sites);
                formulas.push(structure.formula_sum().replace(' ', ""));
            }
            Err(e) => warn!("{} | skipped: {e:#}", path.display()),
        }
    }
    Ok(formulas)
}
