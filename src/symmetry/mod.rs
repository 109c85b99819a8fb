//! Crystallographic symmetry operations.
//!
//! Operations arrive as the human-readable coordinate-transform shorthand
//! found in CIF symmetry loops (`"-x+1/2, y, z-1/2"`) and become affine
//! transforms: a 3×3 linear part plus a translation. A space group owns an
//! ordered, irreducible set of these; expansion applies them in declaration
//! order so downstream deduplication is reproducible.

use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

use crate::model::atom::AtomSite;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("cannot parse symmetry operation '{expr}'")]
    UnparseableOperation { expr: String },

    #[error("space-group table number {number} is outside 1-230")]
    SpaceGroupNumber { number: u16 },
}

/// The International Tables define space groups 1 through 230; anything else
/// in `_symmetry_Int_Tables_number` is a lookup failure.
pub fn check_int_tables_number(number: u16) -> Result<u16, Error> {
    if (1..=230).contains(&number) {
        Ok(number)
    } else {
        Err(Error::SpaceGroupNumber { number })
    }
}

/// One symmetry operation: x' = R·x + t in fractional coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmOp {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl SymmOp {
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Parse the crystallographic shorthand.
    ///
    /// Accepts linear combinations of x, y, z with optional fractional or
    /// decimal offsets in any term order (`"-x+1/2"`, `"0.5-y"`, `"x-y"`).
    /// A numbering prefix on the whole expression (`"1 x,y,z"`, as written
    /// by site-id symmetry loops) is stripped, as are surrounding quotes.
    pub fn parse(expr: &str) -> Result<Self, Error> {
        let bad = || Error::UnparseableOperation {
            expr: expr.to_string(),
        };

        let cleaned = expr.trim().trim_matches(|c| c == '\'' || c == '"');
        // Per comma-separated component, keep only the last whitespace token;
        // that discards "1" from "1 x,y,z" without touching plain operators.
        let components: Vec<&str> = cleaned
            .split(',')
            .map(|piece| piece.split_whitespace().last().unwrap_or(""))
            .collect();
        if components.len() != 3 {
            return Err(bad());
        }

        let mut rotation = Matrix3::zeros();
        let mut translation = Vector3::zeros();
        for (row, comp) in components.iter().enumerate() {
            let (coeffs, offset) = parse_component(comp).ok_or_else(bad)?;
            for (col, c) in coeffs.iter().enumerate() {
                rotation[(row, col)] = *c;
            }
            translation[row] = offset;
        }

        Ok(Self {
            rotation,
            translation,
        })
    }

    /// Apply to a fractional coordinate triple.
    pub fn apply(&self, frac: [f64; 3]) -> [f64; 3] {
        let v = self.rotation * Vector3::from(frac) + self.translation;
        [v.x, v.y, v.z]
    }
}

/// Parse one component (`"-x+1/2"`) into per-axis coefficients plus offset.
fn parse_component(comp: &str) -> Option<([f64; 3], f64)> {
    if comp.is_empty() {
        return None;
    }

    let mut coeffs = [0.0; 3];
    let mut offset = 0.0;

    // "a-b" and "a+b" become "a", "-b" / "b" term lists.
    let marked = comp.to_ascii_lowercase().replace('-', "+-");
    for term in marked.split('+').filter(|t| !t.is_empty()) {
        let (sign, body) = match term.strip_prefix('-') {
            Some(rest) => (-1.0, rest),
            None => (1.0, term),
        };
        if body.is_empty() {
            return None;
        }

        if let Some(axis) = "xyz".find(body.chars().last().unwrap()) {
            let coeff_str = &body[..body.len() - 1];
            let coeff = if coeff_str.is_empty() {
                1.0
            } else {
                parse_number(coeff_str)?
            };
            coeffs[axis] += sign * coeff;
        } else {
            offset += sign * parse_number(body)?;
        }
    }

    Some((coeffs, offset))
}

/// A plain decimal or a fraction `a/b`.
fn parse_number(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num = num.parse::<f64>().ok()?;
        let den = den.parse::<f64>().ok()?;
        if den == 0.0 {
            return None;
        }
        Some(num / den)
    } else {
        s.parse::<f64>().ok()
    }
}

/// Parse an ordered list of operation expressions.
pub fn parse_operations(exprs: &[String]) -> Result<Vec<SymmOp>, Error> {
    exprs.iter().map(|e| SymmOp::parse(e)).collect()
}

/// Apply every operation to every site: operations in declaration order,
/// sites in asymmetric-unit order within each operation, so the product is
/// reproducible for a given input.
///
/// A degenerate, empty operation set yields the input unchanged.
pub fn expand(ops: &[SymmOp], sites: &[AtomSite]) -> Vec<AtomSite> {
    if ops.is_empty() {
        return sites.to_vec();
    }

    let mut expanded = Vec::with_capacity(ops.len() * sites.len());
    for op in ops {
        for site in sites {
            expanded.push(AtomSite::new(
                site.label.clone(),
                site.element,
                op.apply(site.frac),
            ));
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::Element;

    fn close(a: [f64; 3], b: [f64; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-12)
    }

    #[test]
    fn parses_identity() {
        let op = SymmOp::parse("x, y, z").unwrap();
        assert_eq!(op, SymmOp::identity());
    }

    #[test]
    fn parses_fractional_offsets() {
        let op = SymmOp::parse("-x+1/2, y, z-1/2").unwrap();
        assert!(close(op.apply([0.2, 0.3, 0.4]), [0.3, 0.3, -0.1]));
    }

    #[test]
    fn parses_decimal_offsets_and_leading_constants() {
        let op = SymmOp::parse("0.5-x, y+0.25, z").unwrap();
        assert!(close(op.apply([0.1, 0.1, 0.1]), [0.4, 0.35, 0.1]));
    }

    #[test]
    fn parses_mixed_axis_terms() {
        // Hexagonal settings use two-axis components.
        let op = SymmOp::parse("x-y, x, z+1/2").unwrap();
        assert!(close(op.apply([0.3, 0.1, 0.0]), [0.2, 0.3, 0.5]));
    }

    #[test]
    fn strips_numbering_prefix_and_quotes() {
        let op = SymmOp::parse("2 -x,-y,-z").unwrap();
        assert!(close(op.apply([0.1, 0.2, 0.3]), [-0.1, -0.2, -0.3]));

        let op = SymmOp::parse("'x, y, z'").unwrap();
        assert_eq!(op, SymmOp::identity());
    }

    #[test]
    fn rejects_garbage() {
        assert!(SymmOp::parse("x, y").is_err());
        assert!(SymmOp::parse("x, y, w").is_err());
        assert!(SymmOp::parse("x, y, z/0").is_err());
        assert!(SymmOp::parse("").is_err());
    }

    #[test]
    fn table_number_bounds() {
        assert!(check_int_tables_number(1).is_ok());
        assert!(check_int_tables_number(230).is_ok());
        assert!(matches!(
            check_int_tables_number(0),
            Err(Error::SpaceGroupNumber { number: 0 })
        ));
        assert!(check_int_tables_number(231).is_err());
    }

    #[test]
    fn expansion_is_operations_times_sites() {
        let ops = parse_operations(&[
            "x,y,z".to_string(),
            "-x,-y,-z".to_string(),
            "x+1/2,y,z".to_string(),
        ])
        .unwrap();
        let sites = vec![
            AtomSite::new("C1", Element::C, [0.1, 0.1, 0.1]),
            AtomSite::new("O1", Element::O, [0.2, 0.2, 0.2]),
        ];
        let expanded = expand(&ops, &sites);
        assert_eq!(expanded.len(), ops.len() * sites.len());
        // Declaration order outer, unit order inner.
        assert_eq!(expanded[0].label, "C1");
        assert_eq!(expanded[1].label, "O1");
        assert!(close(expanded[2].frac, [-0.1, -0.1, -0.1]));
        assert!(close(expanded[4].frac, [0.6, 0.1, 0.1]));
    }

    #[test]
    fn empty_operation_set_is_degenerate() {
        let sites = vec![AtomSite::new("C1", Element::C, [0.1, 0.2, 0.3])];
        let expanded = expand(&[], &sites);
        assert_eq!(expanded, sites);
    }
}
