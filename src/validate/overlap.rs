use log::debug;

use super::Error;
use crate::model::structure::Structure;

/// Two sites overlap when closer than this fraction of their radius sum.
pub const OVERLAP_CRITERIA: f64 = 0.7;

/// Pairs farther apart than this (Å) are never overlap candidates; twice the
/// largest tabulated radius with headroom.
pub const DISTANCE_CUTOFF: f64 = 3.65;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapReport {
    pub site_count: usize,
    pub problem_pairs: usize,
}

impl OverlapReport {
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.problem_pairs == 0
    }
}

/// Count site pairs whose periodic minimum-image distance falls below
/// [`OVERLAP_CRITERIA`] times their Cordero radius sum.
///
/// A site whose element has no tabulated radius makes the whole structure
/// unjudgeable and is reported as an error, not as a verdict.
pub fn check_overlap(structure: &Structure) -> Result<OverlapReport, Error> {
    let radii = structure
        .sites
        .iter()
        .map(|site| {
            site.element.covalent_radius().ok_or(Error::MissingRadius {
                element: site.element,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let n = structure.site_count();
    let mut problem_pairs = 0;
    for i in 0..n.saturating_sub(1) {
        for j in (i + 1)..n {
            let distance = structure.distance(i, j);
            if distance > DISTANCE_CUTOFF {
                continue;
            }
            if distance < OVERLAP_CRITERIA * (radii[i] + radii[j]) {
                debug!(
                    "overlap: {} and {} at {:.3} A",
                    structure.sites[i].label, structure.sites[j].label, distance
                );
                problem_pairs += 1;
            }
        }
    }

    Ok(OverlapReport {
        site_count: n,
        problem_pairs,
    })
}
