use std::collections::HashMap;

use log::debug;

use super::Error;
use super::overlap::DISTANCE_CUTOFF;
use crate::model::structure::Structure;
use crate::model::types::Element;

/// Two sites are bonded when their min-image distance is at most this factor
/// times their Cordero radius sum.
pub const BOND_TOLERANCE: f64 = 1.25;

/// Highest plausible neighbor count for the elements with hard valence
/// limits. Elements outside this table are never flagged.
fn max_neighbors(element: Element) -> Option<usize> {
    match element {
        Element::H => Some(1),
        Element::C => Some(4),
        Element::O => Some(2),
        Element::F | Element::Cl | Element::Br | Element::I => Some(1),
        _ => None,
    }
}

/// Deterministic per-element site labels: Zn1, Zn2, C1, ...
///
/// One labeler per check call; counts are never shared across invocations.
#[derive(Debug, Default)]
pub struct SiteLabeler {
    counts: HashMap<&'static str, usize>,
}

impl SiteLabeler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, element: Element) -> String {
        let n = self.counts.entry(element.symbol()).or_insert(0);
        *n += 1;
        format!("{}{}", element.symbol(), n)
    }
}

/// Find hypervalent non-metal sites.
///
/// Metal sites are excluded entirely (framework metals legitimately exceed
/// organic valence counts); the remaining sites get a covalent-radius
/// neighbor list, and any H, C, O, or halogen with more neighbors than its
/// element allows is reported under its generated label.
pub fn check_valence(structure: &Structure) -> Result<Vec<String>, Error> {
    let mut labeler = SiteLabeler::new();
    let labels: Vec<String> = structure
        .sites
        .iter()
        .map(|site| labeler.next(site.element))
        .collect();

    let organic: Vec<usize> = structure
        .sites
        .iter()
        .enumerate()
        .filter(|(_, site)| !site.element.is_metal())
        .map(|(idx, _)| idx)
        .collect();

    let radius = |idx: usize| -> Result<f64, Error> {
        let element = structure.sites[idx].element;
        element
            .covalent_radius()
            .ok_or(Error::MissingRadius { element })
    };

    let mut neighbor_counts: HashMap<usize, usize> = HashMap::new();
    for (pos, &i) in organic.iter().enumerate() {
        for &j in &organic[pos + 1..] {
            let distance = structure.distance(i, j);
            if distance > DISTANCE_CUTOFF {
                continue;
            }
            if distance <= BOND_TOLERANCE * (radius(i)? + radius(j)?) {
                *neighbor_counts.entry(i).or_insert(0) += 1;
                *neighbor_counts.entry(j).or_insert(0) += 1;
            }
        }
    }

    let mut bad = Vec::new();
    for &idx in &organic {
        let element = structure.sites[idx].element;
        if let Some(limit) = max_neighbors(element) {
            let count = neighbor_counts.get(&idx).copied().unwrap_or(0);
            if count > limit {
                debug!("hypervalent site {}: {} neighbors", labels[idx], count);
                bad.push(labels[idx].clone());
            }
        }
    }
    Ok(bad)
}
