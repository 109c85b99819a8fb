//! The P1 normalization pipeline.
//!
//! One invocation takes a raw CIF record through a fixed stage sequence:
//! fetch → parse → expand → deduplicate → serialize. Any stage can fail;
//! the error carries the stage it failed in, and callers running batches log
//! the record reference and continue with the next input. No partial output
//! survives a failed run — serialization goes through a temporary file that
//! is only persisted on success.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;
use thiserror::Error;

use crate::io::cif::{filter, reader};
use crate::model::structure::Structure;
use crate::symmetry;

/// Coincident-site detection rounds coordinates to two decimal places.
/// Downstream consumers match reference outputs bit-for-bit only at this
/// exact tolerance.
const DEDUP_SCALE: f64 = 100.0;

/// Pipeline stages. `Serialized` and `Failed` are terminal; `Failed` is
/// reachable from every other stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Parsing,
    Expanding,
    Deduplicating,
    Serialized,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Fetching => "fetching the record",
            Stage::Parsing => "parsing the record",
            Stage::Expanding => "expanding symmetry",
            Stage::Deduplicating => "removing duplicate sites",
            Stage::Serialized => "serialized",
            Stage::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
#[error("normalization failed while {stage}: {source}")]
pub struct Error {
    pub stage: Stage,
    #[source]
    pub source: Cause,
}

#[derive(Debug, Error)]
pub enum Cause {
    #[error(transparent)]
    Record(#[from] crate::io::error::Error),

    #[error(transparent)]
    Symmetry(#[from] symmetry::Error),
}

impl Error {
    fn at(stage: Stage, source: impl Into<Cause>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    /// Asymmetric-unit labels to keep. `None` keeps every declared site.
    pub allowed_labels: Option<Vec<String>>,
    /// Drop disordered/partially occupied site lines before parsing.
    pub remove_disorder: bool,
}

/// Run the pipeline over a record already in memory.
pub fn normalize(lines: &[String], opts: &NormalizeOptions) -> Result<Structure, Error> {
    let fail_parse = |e| Error::at(Stage::Parsing, e);

    let filtered;
    let lines = if opts.remove_disorder {
        filtered = filter::filter_disorder(lines);
        filtered.as_slice()
    } else {
        lines
    };

    let record = reader::parse_record(lines, opts.allowed_labels.as_deref())
        .map_err(|e| fail_parse(Cause::Record(e)))?;
    symmetry::check_int_tables_number(record.int_tables_number)
        .map_err(|e| fail_parse(Cause::Symmetry(e)))?;
    debug!(
        "parsed record: {} asymmetric-unit sites, {} operations, space group {}",
        record.sites.len(),
        record.symmetry_xyz.len(),
        record.int_tables_number
    );

    let ops = symmetry::parse_operations(&record.symmetry_xyz)
        .map_err(|e| Error::at(Stage::Expanding, Cause::Symmetry(e)))?;
    let expanded = symmetry::expand(&ops, &record.sites);
    debug!("expanded to {} sites before deduplication", expanded.len());

    let mut structure = Structure::new(record.lattice, expanded);
    structure.wrap_to_cell();
    dedup_sites(&mut structure);
    debug!("{} sites after deduplication", structure.site_count());

    Ok(structure)
}

/// Run the pipeline over a record on disk.
pub fn normalize_path(path: &Path, opts: &NormalizeOptions) -> Result<Structure, Error> {
    let fail_fetch = |e: std::io::Error| {
        Error::at(Stage::Fetching, Cause::Record(crate::io::error::Error::from(e)))
    };
    let file = File::open(path).map_err(fail_fetch)?;
    let lines = BufReader::new(file)
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .map_err(fail_fetch)?;
    normalize(&lines, opts)
}

fn round2(x: f64) -> f64 {
    (x * DEDUP_SCALE).round() / DEDUP_SCALE
}

/// Remove sites whose rounded fractional coordinates coincide with an
/// already-kept site.
///
/// Coordinates are first remapped so that any axis rounding to 1.00 becomes
/// 0.00 (sites on opposite cell faces are the same site). The scan keeps the
/// first occurrence in input order — expansion emits operations in
/// declaration order, and that tie-break is preserved deliberately. Never
/// fails, and running it on its own output is a no-op.
pub fn dedup_sites(structure: &mut Structure) {
    for site in &mut structure.sites {
        for x in &mut site.frac {
            if round2(*x) == 1.0 {
                *x = 0.0;
            }
        }
    }

    let mut seen: Vec<[i64; 3]> = Vec::with_capacity(structure.site_count());
    let mut bad_indices = Vec::new();
    for (num, site) in structure.sites.iter().enumerate() {
        let key = [
            (site.frac[0] * DEDUP_SCALE).round() as i64,
            (site.frac[1] * DEDUP_SCALE).round() as i64,
            (site.frac[2] * DEDUP_SCALE).round() as i64,
        ];
        if seen.contains(&key) {
            bad_indices.push(num);
        } else {
            seen.push(key);
        }
    }
    structure.remove_sites(&bad_indices);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::AtomSite;
    use crate::model::lattice::Lattice;
    use crate::model::types::Element;

    fn record(symmetry_ops: &str, atoms: &str) -> Vec<String> {
        format!(
            "data_TEST\n\
             _symmetry_Int_Tables_number 2\n\
             _cell_length_a 10.0\n\
             _cell_length_b 10.0\n\
             _cell_length_c 10.0\n\
             _cell_angle_alpha 90.0\n\
             _cell_angle_beta 90.0\n\
             _cell_angle_gamma 90.0\n\
             loop_\n\
             _symmetry_equiv_pos_as_xyz\n\
             {symmetry_ops}\n\
             loop_\n\
             _atom_site_label\n\
             _atom_site_type_symbol\n\
             _atom_site_fract_x\n\
             _atom_site_fract_y\n\
             _atom_site_fract_z\n\
             {atoms}\n"
        )
        .lines()
        .map(String::from)
        .collect()
    }

    fn site(label: &str, el: Element, frac: [f64; 3]) -> AtomSite {
        AtomSite::new(label, el, frac)
    }

    fn cubic() -> Lattice {
        Lattice::from_parameters(10.0, 10.0, 10.0, 90.0, 90.0, 90.0)
    }

    #[test]
    fn identity_only_returns_unit_unchanged() {
        let lines = record("x,y,z", "C1 C 0.10 0.20 0.30");
        let s = normalize(&lines, &NormalizeOptions::default()).unwrap();
        assert_eq!(s.site_count(), 1);
        assert!((s.sites[0].frac[0] - 0.1).abs() < 1e-12);
        assert!((s.sites[0].frac[2] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn inversion_pair_yields_both_images() {
        // P-1: identity plus inversion; (0.1, 0.2, 0.3) maps to the wrapped
        // image (0.9, 0.8, 0.7) and neither collides with the other.
        let lines = record("x,y,z\n-x,-y,-z", "C1 C 0.10 0.20 0.30");
        let s = normalize(&lines, &NormalizeOptions::default()).unwrap();
        assert_eq!(s.site_count(), 2);
        assert!((s.sites[1].frac[0] - 0.9).abs() < 1e-12);
        assert!((s.sites[1].frac[1] - 0.8).abs() < 1e-12);
        assert!((s.sites[1].frac[2] - 0.7).abs() < 1e-12);
    }

    #[test]
    fn special_position_collapses_to_one_site() {
        // A site fixed by the inversion center appears once.
        let lines = record("x,y,z\n-x,-y,-z", "Zn1 Zn 0.00 0.50 0.50");
        let s = normalize(&lines, &NormalizeOptions::default()).unwrap();
        assert_eq!(s.site_count(), 1);
    }

    #[test]
    fn disorder_filter_removes_marked_sites() {
        let lines = record("x,y,z", "C1 C 0.10 0.20 0.30\nC2* C 0.40 0.50 0.60");
        let opts = NormalizeOptions {
            remove_disorder: true,
            ..Default::default()
        };
        let s = normalize(&lines, &opts).unwrap();
        assert_eq!(s.site_count(), 1);
        assert_eq!(s.sites[0].label, "C1");
    }

    #[test]
    fn bad_space_group_number_fails_in_parsing() {
        let mut lines = record("x,y,z", "C1 C 0.1 0.2 0.3");
        for line in &mut lines {
            if line.contains("Int_Tables") {
                *line = "_symmetry_Int_Tables_number 231".to_string();
            }
        }
        let err = normalize(&lines, &NormalizeOptions::default()).unwrap_err();
        assert_eq!(err.stage, Stage::Parsing);
        assert!(matches!(
            err.source,
            Cause::Symmetry(symmetry::Error::SpaceGroupNumber { number: 231 })
        ));
    }

    #[test]
    fn unparseable_operation_fails_in_expansion() {
        let lines = record("x,y,q", "C1 C 0.1 0.2 0.3");
        let err = normalize(&lines, &NormalizeOptions::default()).unwrap_err();
        assert_eq!(err.stage, Stage::Expanding);
    }

    #[test]
    fn wrap_remaps_each_axis_independently() {
        let mut s = Structure::new(
            cubic(),
            vec![site("H1", Element::H, [1.00, 0.5, 0.3])],
        );
        dedup_sites(&mut s);
        assert_eq!(s.sites[0].frac, [0.0, 0.5, 0.3]);

        // 0.999 rounds to 1.00 at two decimals and wraps too.
        let mut s = Structure::new(
            cubic(),
            vec![site("H1", Element::H, [0.999, 0.5, 0.3])],
        );
        dedup_sites(&mut s);
        assert_eq!(s.sites[0].frac[0], 0.0);
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let mut s = Structure::new(
            cubic(),
            vec![
                site("A", Element::C, [0.100, 0.2, 0.3]),
                site("B", Element::C, [0.104, 0.2, 0.3]),
                site("C", Element::C, [0.5, 0.5, 0.5]),
            ],
        );
        dedup_sites(&mut s);
        assert_eq!(s.site_count(), 2);
        assert_eq!(s.sites[0].label, "A");
        assert_eq!(s.sites[1].label, "C");
    }

    #[test]
    fn missing_file_fails_in_fetching() {
        let err = normalize_path(
            std::path::Path::new("/nonexistent/NOPE.cif"),
            &NormalizeOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.stage, Stage::Fetching);
    }

    #[test]
    fn dedup_is_idempotent() {
        let mut s = Structure::new(
            cubic(),
            vec![
                site("A", Element::C, [0.1, 0.2, 0.3]),
                site("B", Element::C, [0.1, 0.2, 0.3]),
                site("C", Element::O, [0.9, 0.8, 0.7]),
                site("D", Element::O, [0.995, 0.5, 0.5]),
            ],
        );
        dedup_sites(&mut s);
        let once = s.clone();
        dedup_sites(&mut s);
        assert_eq!(s, once);
    }
}
