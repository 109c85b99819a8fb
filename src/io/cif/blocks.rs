//! Line-level segmentation of a CIF record.
//!
//! A record is a flat line sequence in which `loop_` markers open tabular
//! blocks: a run of field declarations (`_atom_site_label`, ...) followed by
//! positional data rows. Rather than re-testing string prefixes at every use
//! site, each line is classified once into a [`LineKind`] and the block
//! extractor and field-table parser consume the tagged sequence.

use std::collections::HashMap;

use crate::io::error::Error;

/// Classification of a single CIF line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// A `loop_` marker opening a new tabular block.
    LoopMarker,
    /// A field declaration; carries the key with the leading `_` stripped,
    /// e.g. `atom_site_label`.
    FieldDecl(&'a str),
    /// A positional data row.
    Data,
    Blank,
}

pub fn classify(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if trimmed.starts_with("loop_") {
        return LineKind::LoopMarker;
    }
    if let Some(rest) = trimmed.strip_prefix('_') {
        let key = rest.split_whitespace().next().unwrap_or(rest);
        return LineKind::FieldDecl(key);
    }
    LineKind::Data
}

/// Drop a trailing parenthesized uncertainty, `"0.3334(12)"` → `"0.3334"`.
pub fn strip_uncertainty(token: &str) -> &str {
    token.split('(').next().unwrap_or(token)
}

/// Extract the contiguous block belonging to `keyword`, scanning forward from
/// `start` (the line after the block's `loop_` marker).
///
/// The block ends at a field declaration whose key does not share the keyword
/// prefix, or at the next `loop_` marker. Reaching end of input is not an
/// error: the block simply extends to the end, untruncated. Marker lines are
/// excluded from the returned slice.
pub fn extract_block<'a>(lines: &'a [String], keyword: &str, start: usize) -> Vec<&'a str> {
    let mut block = Vec::new();
    for line in &lines[start.min(lines.len())..] {
        match classify(line) {
            LineKind::LoopMarker => break,
            LineKind::FieldDecl(key) if !key.starts_with(keyword) => break,
            LineKind::Blank => continue,
            _ => block.push(line.as_str()),
        }
    }
    block
}

/// A parsed loop block: every declared field name mapped to the column of
/// values across the rows whose identifying-key value was allow-listed.
#[derive(Debug, Default)]
pub struct FieldTable {
    columns: HashMap<String, Vec<String>>,
    fields: Vec<String>,
    rows_kept: usize,
}

impl FieldTable {
    /// Parse a block's lines.
    ///
    /// * `allowed` – identifying-key values to retain; rows keyed outside the
    ///   list are silently skipped (that is the selection mechanism, not an
    ///   error). `None` keeps every row.
    /// * `key_field` – the declared field used as the identifying key.
    ///
    /// Parenthesized uncertainty suffixes (`1.234(5)`) are stripped from row
    /// values before storage.
    pub fn parse(
        block: &[&str],
        allowed: Option<&[String]>,
        key_field: &str,
    ) -> Result<Self, Error> {
        let mut fields = Vec::new();
        let mut data_rows = Vec::new();

        for (num, line) in block.iter().enumerate() {
            match classify(line) {
                LineKind::FieldDecl(key) if data_rows.is_empty() => {
                    fields.push(format!("_{}", key));
                }
                LineKind::Data => data_rows.push((num, *line)),
                _ => {}
            }
        }

        let key_idx = fields
            .iter()
            .position(|f| f == key_field)
            .ok_or_else(|| Error::missing_field(key_field))?;

        let mut columns: HashMap<String, Vec<String>> =
            fields.iter().map(|f| (f.clone(), Vec::new())).collect();
        let mut rows_kept = 0;

        for (num, row) in data_rows {
            let values: Vec<String> = row
                .split_whitespace()
                .map(|tok| strip_uncertainty(tok).to_string())
                .collect();
            if values.len() < fields.len() {
                return Err(Error::malformed(
                    num + 1,
                    format!(
                        "row has {} values but {} fields are declared",
                        values.len(),
                        fields.len()
                    ),
                ));
            }
            if let Some(allowed) = allowed {
                if !allowed.iter().any(|l| l == &values[key_idx]) {
                    continue;
                }
            }
            for (field, value) in fields.iter().zip(values) {
                columns.get_mut(field).unwrap().push(value);
            }
            rows_kept += 1;
        }

        Ok(Self {
            columns,
            fields,
            rows_kept,
        })
    }

    pub fn column(&self, field: &str) -> Option<&[String]> {
        self.columns.get(field).map(|v| v.as_slice())
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows_kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(String::from).collect()
    }

    #[test]
    fn classify_kinds() {
        assert_eq!(classify("loop_"), LineKind::LoopMarker);
        assert_eq!(classify("_cell_length_a 10.0"), LineKind::FieldDecl("cell_length_a"));
        assert_eq!(classify("C1 C 0.1 0.2 0.3"), LineKind::Data);
        assert_eq!(classify("   "), LineKind::Blank);
    }

    #[test]
    fn block_stops_at_unrelated_field() {
        // A symmetry block immediately followed by an unrelated field (no
        // intervening loop_) must exclude that field's line.
        let cif = lines(
            "_symmetry_equiv_pos_as_xyz\n\
             x,y,z\n\
             -x,-y,-z\n\
             _cell_length_a 12.5",
        );
        let block = extract_block(&cif, "symmetry", 0);
        assert_eq!(block, vec!["_symmetry_equiv_pos_as_xyz", "x,y,z", "-x,-y,-z"]);
    }

    #[test]
    fn block_stops_at_loop_marker() {
        let cif = lines(
            "_geom_bond_atom_site_label_1\n\
             C1 C2 1.54\n\
             loop_\n\
             _atom_site_label",
        );
        let block = extract_block(&cif, "geom", 0);
        assert_eq!(block, vec!["_geom_bond_atom_site_label_1", "C1 C2 1.54"]);
    }

    #[test]
    fn block_extends_to_end_of_input() {
        let cif = lines("_atom_site_label\n_atom_site_fract_x\nC1 0.5");
        let block = extract_block(&cif, "atom_site", 0);
        assert_eq!(block.len(), 3);
    }

    #[test]
    fn field_table_respects_allow_list() {
        let block = vec![
            "_atom_site_label",
            "_atom_site_type_symbol",
            "_atom_site_fract_x",
            "C1 C 0.10",
            "H1 H 0.20",
            "C2 C 0.35",
        ];
        let allowed = vec!["C1".to_string(), "C2".to_string()];
        let table = FieldTable::parse(&block, Some(&allowed), "_atom_site_label").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("_atom_site_label").unwrap(), ["C1", "C2"]);
        assert_eq!(table.column("_atom_site_fract_x").unwrap(), ["0.10", "0.35"]);
    }

    #[test]
    fn field_table_strips_uncertainty_suffixes() {
        let block = vec![
            "_atom_site_label",
            "_atom_site_fract_x",
            "O1 0.3334(12)",
        ];
        let table = FieldTable::parse(&block, None, "_atom_site_label").unwrap();
        assert_eq!(table.column("_atom_site_fract_x").unwrap(), ["0.3334"]);
    }

    #[test]
    fn field_table_rejects_short_rows() {
        let block = vec!["_atom_site_label", "_atom_site_fract_x", "O1"];
        let err = FieldTable::parse(&block, None, "_atom_site_label").unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }
}
