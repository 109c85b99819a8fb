use std::collections::BTreeMap;

use nalgebra::Vector3;

use super::atom::AtomSite;
use super::lattice::Lattice;

/// A crystal structure: unit-cell geometry plus an ordered site list.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub lattice: Lattice,
    pub sites: Vec<AtomSite>,
}

impl Structure {
    pub fn new(lattice: Lattice, sites: Vec<AtomSite>) -> Self {
        Self { lattice, sites }
    }

    #[inline]
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Wrap every fractional coordinate into [0, 1).
    pub fn wrap_to_cell(&mut self) {
        for site in &mut self.sites {
            for x in &mut site.frac {
                *x -= x.floor();
            }
        }
    }

    /// Remove sites by index. Indices may repeat and arrive in any order.
    pub fn remove_sites(&mut self, indices: &[usize]) {
        if indices.is_empty() {
            return;
        }
        let mut drop = vec![false; self.sites.len()];
        for &idx in indices {
            if idx < drop.len() {
                drop[idx] = true;
            }
        }
        let mut keep = drop.iter();
        self.sites.retain(|_| !keep.next().unwrap());
    }

    /// Minimum-image distance in Å between two sites.
    ///
    /// Scans the 27 neighboring cell translations, which is exact for the
    /// cell shapes that survive curation (all pairs of interest are well
    /// under one cell edge apart).
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        let m = self.lattice.matrix().transpose();
        let fi = Vector3::from(self.sites[i].frac);
        let fj = Vector3::from(self.sites[j].frac);

        let mut best = f64::INFINITY;
        for da in -1..=1 {
            for db in -1..=1 {
                for dc in -1..=1 {
                    let shift = Vector3::new(da as f64, db as f64, dc as f64);
                    let d = (m * (fj - fi + shift)).norm();
                    if d < best {
                        best = d;
                    }
                }
            }
        }
        best
    }

    /// Element counts keyed by symbol, in alphabetical order.
    pub fn composition(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for site in &self.sites {
            *counts.entry(site.element.symbol()).or_insert(0) += 1;
        }
        counts
    }

    /// Formula sum string, e.g. `"C8 H12 O4 Zn2"`.
    pub fn formula_sum(&self) -> String {
        self.composition()
            .iter()
            .map(|(sym, n)| format!("{}{}", sym, n))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
