use std::io::{self, Write};

use anyhow::Error;

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    for line in wrap(&err.to_string(), 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    let mut source = err.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 59) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
        source = cause.source();
    }

    if let Some(hints) = collect_hints(err) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

fn collect_hints(err: &Error) -> Option<Vec<String>> {
    use mof_curate::io::error::Error as CifError;
    use mof_curate::normalize::{Cause, Error as NormalizeError};
    use mof_curate::symmetry::Error as SymmetryError;

    let mut hints = Vec::new();

    if let Some(norm_err) = err.downcast_ref::<NormalizeError>() {
        match &norm_err.source {
            Cause::Record(cif) => collect_cif_hints(cif, &mut hints),
            Cause::Symmetry(sym) => collect_symmetry_hints(sym, &mut hints),
        }
    } else if let Some(cif_err) = err.downcast_ref::<CifError>() {
        collect_cif_hints(cif_err, &mut hints);
    } else if let Some(sym_err) = err.downcast_ref::<SymmetryError>() {
        collect_symmetry_hints(sym_err, &mut hints);
    } else {
        collect_fallback_hints(err, &mut hints);
    }

    if hints.is_empty() { None } else { Some(hints) }
}

fn collect_cif_hints(err: &mof_curate::io::error::Error, hints: &mut Vec<String>) {
    use mof_curate::io::error::Error;

    match err {
        Error::Io { source } => match source.kind() {
            io::ErrorKind::NotFound => {
                hints.push("File or directory not found".into());
                hints.push("Check the path spelling and ensure the file exists".into());
            }
            io::ErrorKind::PermissionDenied => {
                hints.push("Permission denied accessing the file".into());
                hints.push("Check file permissions with `ls -la`".into());
            }
            _ => {
                hints.push("I/O operation failed".into());
                hints.push("Check file path, permissions, and disk space".into());
            }
        },

        Error::MissingField { field } => {
            hints.push(format!("The record never declares {}", field));
            hints.push("Re-export the structure with full cell and symmetry data".into());
        }

        Error::BlockNotFound { keyword } => {
            hints.push(format!("No loop_ block with '{}' fields was found", keyword));
            hints.push("Check that the record is a complete CIF, not a fragment".into());
        }

        Error::Malformed { .. } => {
            hints.push("Inspect the record around the reported line".into());
            hints.push("Disordered sites can be dropped with --remove-disorder".into());
        }

        Error::UnknownElement(_) => {
            hints.push("A type symbol does not name a known element".into());
            hints.push("Deuterium labels (D) and custom symbols are not supported".into());
        }
    }
}

fn collect_symmetry_hints(err: &mof_curate::symmetry::Error, hints: &mut Vec<String>) {
    use mof_curate::symmetry::Error;

    match err {
        Error::UnparseableOperation { .. } => {
            hints.push("Symmetry operations must look like '-x+1/2, y, z'".into());
            hints.push("Remove stray annotation from the symmetry loop".into());
        }
        Error::SpaceGroupNumber { .. } => {
            hints.push("The International Tables number must be 1-230".into());
        }
    }
}

fn collect_fallback_hints(err: &Error, hints: &mut Vec<String>) {
    let msg = err.to_string().to_lowercase();

    if msg.contains("no such file") || msg.contains("not found") || msg.contains("no input") {
        hints.push("Check that the input paths or glob patterns are correct".into());
        hints.push("Quote glob patterns so the shell does not expand them first".into());
    } else if msg.contains("permission denied") {
        hints.push("Check file permissions with `ls -la`".into());
    }
}
