use std::io::Write;

use crate::io::error::Error;
use crate::model::structure::Structure;

/// Serialize a structure as a P1 CIF: every site listed explicitly under the
/// identity operation, space group 'P 1', table number 1.
pub fn write<W: Write>(mut writer: W, structure: &Structure, name: &str) -> Result<(), Error> {
    let lat = &structure.lattice;

    writeln!(writer, "# P1 cell written by mof-curate")?;
    writeln!(writer, "data_{}", name)?;
    writeln!(writer, "_symmetry_space_group_name_H-M   'P 1'")?;
    writeln!(writer, "_cell_length_a   {:.8}", lat.a)?;
    writeln!(writer, "_cell_length_b   {:.8}", lat.b)?;
    writeln!(writer, "_cell_length_c   {:.8}", lat.c)?;
    writeln!(writer, "_cell_angle_alpha   {:.8}", lat.alpha)?;
    writeln!(writer, "_cell_angle_beta   {:.8}", lat.beta)?;
    writeln!(writer, "_cell_angle_gamma   {:.8}", lat.gamma)?;
    writeln!(writer, "_symmetry_Int_Tables_number   1")?;
    writeln!(writer, "_chemical_formula_sum   '{}'", structure.formula_sum())?;
    writeln!(writer, "_cell_volume   {:.8}", lat.volume())?;
    writeln!(writer, "loop_")?;
    writeln!(writer, " _symmetry_equiv_pos_site_id")?;
    writeln!(writer, " _symmetry_equiv_pos_as_xyz")?;
    writeln!(writer, "  1  'x, y, z'")?;
    writeln!(writer, "loop_")?;
    writeln!(writer, " _atom_site_type_symbol")?;
    writeln!(writer, " _atom_site_label")?;
    writeln!(writer, " _atom_site_fract_x")?;
    writeln!(writer, " _atom_site_fract_y")?;
    writeln!(writer, " _atom_site_fract_z")?;
    writeln!(writer, " _atom_site_occupancy")?;

    // Labels are regenerated per element; asymmetric-unit labels stop being
    // unique once symmetry images are materialized.
    let mut counts = std::collections::HashMap::new();
    for site in &structure.sites {
        let n = counts.entry(site.element).or_insert(0usize);
        *n += 1;
        writeln!(
            writer,
            "  {}  {}{}  {:.8}  {:.8}  {:.8}  1",
            site.element.symbol(),
            site.element.symbol(),
            n,
            site.frac[0],
            site.frac[1],
            site.frac[2]
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::cif::reader;
    use crate::model::atom::AtomSite;
    use crate::model::lattice::Lattice;
    use crate::model::types::Element;
    use std::io::Cursor;

    #[test]
    fn writes_and_reads_back() {
        let structure = Structure::new(
            Lattice::from_parameters(10.0, 11.0, 12.0, 90.0, 95.0, 101.5),
            vec![
                AtomSite::new("Zn1", Element::Zn, [0.25, 0.25, 0.25]),
                AtomSite::new("O1", Element::O, [0.0, 0.5, 0.5]),
                AtomSite::new("O2", Element::O, [0.5, 0.0, 0.5]),
            ],
        );

        let mut buf = Vec::new();
        write(&mut buf, &structure, "TEST01").expect("write cif");
        let rec = reader::read(Cursor::new(buf), None).expect("read cif");

        assert_eq!(rec.int_tables_number, 1);
        assert_eq!(rec.symmetry_xyz, vec!["1  'x, y, z'"]);
        assert_eq!(rec.sites.len(), 3);
        assert_eq!(rec.sites[0].label, "Zn1");
        assert_eq!(rec.sites[1].label, "O1");
        assert_eq!(rec.sites[2].label, "O2");
        for (a, b) in structure.sites.iter().zip(rec.sites.iter()) {
            assert_eq!(a.element, b.element);
            for k in 0..3 {
                assert!((a.frac[k] - b.frac[k]).abs() < 1e-8);
            }
        }
        assert!((rec.lattice.gamma - 101.5).abs() < 1e-8);
    }
}
