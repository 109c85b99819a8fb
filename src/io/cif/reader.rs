use std::io::BufRead;
use std::str::FromStr;

use crate::io::cif::blocks::{self, FieldTable, LineKind};
use crate::io::error::Error;
use crate::model::atom::AtomSite;
use crate::model::lattice::Lattice;
use crate::model::types::Element;

/// Everything the normalization pipeline needs out of one raw CIF record:
/// cell geometry, the declared space-group table number, the record's own
/// symmetry-operation expressions (still unparsed), and the allow-listed
/// asymmetric-unit sites in declaration order.
#[derive(Debug, Clone)]
pub struct CifRecord {
    pub lattice: Lattice,
    pub int_tables_number: u16,
    pub symmetry_xyz: Vec<String>,
    pub sites: Vec<AtomSite>,
}

pub fn read<R: BufRead>(reader: R, allowed: Option<&[String]>) -> Result<CifRecord, Error> {
    let lines = collect_lines(reader)?;
    parse_record(&lines, allowed)
}

pub fn collect_lines<R: BufRead>(reader: R) -> Result<Vec<String>, Error> {
    reader
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| Error::Io { source: e })
}

/// Assemble a [`CifRecord`] from a record's full line sequence.
///
/// Rows of the atom-site table whose label is outside `allowed` are skipped
/// silently; `None` keeps all sites.
pub fn parse_record(lines: &[String], allowed: Option<&[String]>) -> Result<CifRecord, Error> {
    let mut cell: [Option<f64>; 6] = [None; 6];
    let mut int_tables: Option<&str> = None;
    let mut symmetry_block: Option<Vec<&str>> = None;
    let mut atom_block: Option<Vec<&str>> = None;

    for (num, line) in lines.iter().enumerate() {
        match blocks::classify(line) {
            LineKind::LoopMarker => {
                let Some((decl_idx, key)) = first_decl_after(lines, num + 1) else {
                    continue;
                };
                // Anisotropic displacement tables share the atom_site prefix
                // and must not shadow the positional table.
                if key.starts_with("atom_site") && !key.starts_with("atom_site_aniso") {
                    atom_block = Some(blocks::extract_block(lines, "atom_site", decl_idx));
                } else if key.starts_with("symmetry") {
                    symmetry_block = Some(blocks::extract_block(lines, "symmetry", decl_idx));
                }
            }
            LineKind::FieldDecl(key) => {
                if key == "symmetry_Int_Tables_number" {
                    int_tables = line.split_whitespace().last();
                } else if let Some(idx) = CELL_FIELDS.iter().position(|f| *f == key) {
                    cell[idx] = Some(parse_numeric_field(line, num, key)?);
                }
            }
            _ => {}
        }
    }

    let lattice = {
        let mut vals = [0.0; 6];
        for (idx, v) in cell.iter().enumerate() {
            vals[idx] = v.ok_or_else(|| Error::missing_field(format!("_{}", CELL_FIELDS[idx])))?;
        }
        Lattice::from_parameters(vals[0], vals[1], vals[2], vals[3], vals[4], vals[5])
    };

    let int_tables_number = int_tables
        .ok_or_else(|| Error::missing_field("_symmetry_Int_Tables_number"))?
        .parse::<u16>()
        .map_err(|_| Error::missing_field("_symmetry_Int_Tables_number"))?;

    let symmetry_block = symmetry_block.ok_or(Error::BlockNotFound {
        keyword: "symmetry",
    })?;
    let atom_block = atom_block.ok_or(Error::BlockNotFound {
        keyword: "atom_site",
    })?;

    let symmetry_xyz = symmetry_block
        .iter()
        .filter(|l| matches!(blocks::classify(l), LineKind::Data))
        .map(|l| l.trim().to_string())
        .collect();

    let sites = parse_sites(&atom_block, allowed)?;

    Ok(CifRecord {
        lattice,
        int_tables_number,
        symmetry_xyz,
        sites,
    })
}

const CELL_FIELDS: [&str; 6] = [
    "cell_length_a",
    "cell_length_b",
    "cell_length_c",
    "cell_angle_alpha",
    "cell_angle_beta",
    "cell_angle_gamma",
];

fn first_decl_after(lines: &[String], start: usize) -> Option<(usize, &str)> {
    for (offset, line) in lines[start.min(lines.len())..].iter().enumerate() {
        match blocks::classify(line) {
            LineKind::Blank => continue,
            LineKind::FieldDecl(key) => return Some((start + offset, key)),
            _ => return None,
        }
    }
    None
}

fn parse_numeric_field(line: &str, num: usize, key: &str) -> Result<f64, Error> {
    let token = line
        .split_whitespace()
        .last()
        .ok_or_else(|| Error::missing_field(format!("_{}", key)))?;
    blocks::strip_uncertainty(token)
        .parse::<f64>()
        .map_err(|_| Error::malformed(num + 1, format!("non-numeric value for _{}", key)))
}

fn parse_sites(block: &[&str], allowed: Option<&[String]>) -> Result<Vec<AtomSite>, Error> {
    let table = FieldTable::parse(block, allowed, "_atom_site_label")?;

    let column = |field: &str| -> Result<&[String], Error> {
        table
            .column(field)
            .ok_or_else(|| Error::missing_field(field))
    };

    let labels = column("_atom_site_label")?;
    let symbols = column("_atom_site_type_symbol")?;
    let xs = column("_atom_site_fract_x")?;
    let ys = column("_atom_site_fract_y")?;
    let zs = column("_atom_site_fract_z")?;

    let coord = |tok: &String| -> Result<f64, Error> {
        tok.parse::<f64>()
            .map_err(|_| Error::malformed(0, format!("non-numeric fractional coordinate '{tok}'")))
    };

    let mut sites = Vec::with_capacity(labels.len());
    for i in 0..labels.len() {
        let element = Element::from_str(bare_symbol(&symbols[i]))?;
        sites.push(AtomSite::new(
            labels[i].clone(),
            element,
            [coord(&xs[i])?, coord(&ys[i])?, coord(&zs[i])?],
        ));
    }
    Ok(sites)
}

/// Strip an oxidation-state suffix from a type symbol (`"Cu2+"` → `"Cu"`).
fn bare_symbol(symbol: &str) -> &str {
    symbol.trim_end_matches(|c: char| c.is_ascii_digit() || c == '+' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
data_TEST01
_symmetry_cell_setting triclinic
_symmetry_space_group_name_H-M 'P -1'
_symmetry_Int_Tables_number 2
_cell_length_a 10.000(2)
_cell_length_b 11.50
_cell_length_c 12.25
_cell_angle_alpha 90.0
_cell_angle_beta 95.5
_cell_angle_gamma 90.0
loop_
_symmetry_equiv_pos_site_id
_symmetry_equiv_pos_as_xyz
1 x,y,z
2 -x,-y,-z
loop_
_atom_site_label
_atom_site_type_symbol
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Zn1 Zn 0.2500 0.2500(3) 0.2500
C1 C 0.1000 0.2000 0.3000
C2 C 0.4000 0.5000 0.6000
loop_
_atom_site_aniso_label
_atom_site_aniso_U_11
Zn1 0.01
";

    #[test]
    fn parses_complete_record() {
        let rec = read(Cursor::new(SAMPLE), None).unwrap();
        assert_eq!(rec.int_tables_number, 2);
        assert!((rec.lattice.a - 10.0).abs() < 1e-12);
        assert!((rec.lattice.beta - 95.5).abs() < 1e-12);
        assert_eq!(rec.symmetry_xyz, vec!["1 x,y,z", "2 -x,-y,-z"]);
        assert_eq!(rec.sites.len(), 3);
        assert_eq!(rec.sites[0].label, "Zn1");
        assert_eq!(rec.sites[0].element, Element::Zn);
        assert!((rec.sites[1].frac[2] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn allow_list_restricts_sites() {
        let allowed = vec!["C1".to_string()];
        let rec = read(Cursor::new(SAMPLE), Some(&allowed)).unwrap();
        assert_eq!(rec.sites.len(), 1);
        assert_eq!(rec.sites[0].label, "C1");
    }

    #[test]
    fn aniso_table_does_not_shadow_atom_sites() {
        // The aniso loop comes after the positional table; if it were
        // allowed to match "atom_site" it would replace the real block.
        let rec = read(Cursor::new(SAMPLE), None).unwrap();
        assert_eq!(rec.sites.len(), 3);
    }

    #[test]
    fn missing_cell_length_is_reported() {
        let broken = SAMPLE.replace("_cell_length_b 11.50\n", "");
        let err = read(Cursor::new(broken), None).unwrap_err();
        assert!(matches!(err, Error::MissingField { ref field } if field == "_cell_length_b"));
    }

    #[test]
    fn missing_symmetry_block_is_reported() {
        let broken = SAMPLE.replace(
            "loop_\n_symmetry_equiv_pos_site_id\n_symmetry_equiv_pos_as_xyz\n1 x,y,z\n2 -x,-y,-z\n",
            "",
        );
        let err = read(Cursor::new(broken), None).unwrap_err();
        assert!(matches!(err, Error::BlockNotFound { keyword: "symmetry" }));
    }

    #[test]
    fn unknown_element_symbol_is_reported() {
        let broken = SAMPLE.replace("Zn1 Zn", "Zn1 Xx");
        let err = read(Cursor::new(broken), None).unwrap_err();
        assert!(matches!(err, Error::UnknownElement(_)));
    }

    #[test]
    fn oxidation_suffixes_are_tolerated() {
        let record = SAMPLE.replace("Zn1 Zn", "Zn1 Zn2+");
        let rec = read(Cursor::new(record), None).unwrap();
        assert_eq!(rec.sites[0].element, Element::Zn);
    }
}
