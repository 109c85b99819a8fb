//! Curation toolkit for MOF crystal structures retrieved from
//! crystallographic databases.
//!
//! The central operation is P1 normalization: a raw CIF record carrying an
//! asymmetric unit plus a space-group symmetry description becomes a fully
//! expanded, duplicate-free unit cell with no implied symmetry, ready for
//! downstream featurization. Around it sit the plausibility checks used to
//! triage parsed structures (overlapping sites, hypervalent atoms) and a
//! formula-based duplicate screen.
//!
//! # Quick start
//!
//! ```
//! use mof_curate::normalize::{normalize, NormalizeOptions};
//!
//! let record: Vec<String> = "\
//! data_EXAMPLE
//! _symmetry_Int_Tables_number 2
//! _cell_length_a 10.0
//! _cell_length_b 10.0
//! _cell_length_c 10.0
//! _cell_angle_alpha 90.0
//! _cell_angle_beta 90.0
//! _cell_angle_gamma 90.0
//! loop_
//! _symmetry_equiv_pos_as_xyz
//! x,y,z
//! -x,-y,-z
//! loop_
//! _atom_site_label
//! _atom_site_type_symbol
//! _atom_site_fract_x
//! _atom_site_fract_y
//! _atom_site_fract_z
//! C1 C 0.10 0.20 0.30
//! ".lines().map(String::from).collect();
//!
//! let p1 = normalize(&record, &NormalizeOptions::default())?;
//!
//! // The inversion image survives deduplication alongside the original.
//! assert_eq!(p1.site_count(), 2);
//! assert_eq!(p1.formula_sum(), "C2");
//! # Ok::<(), mof_curate::normalize::Error>(())
//! ```
//!
//! # Module organization
//!
//! - [`model`] — Elements, sites, lattices, structures.
//! - [`io`] — CIF block segmentation, record reading, P1 writing.
//! - [`symmetry`] — Operation parsing and asymmetric-unit expansion.
//! - [`normalize`] — The fetch → parse → expand → dedup pipeline driver.
//! - [`validate`] — Overlap and valence plausibility checks.
//! - [`formula`] — Formula-multiple duplicate screening.

pub mod formula;
pub mod io;
pub mod model;
pub mod normalize;
pub mod symmetry;
pub mod validate;

pub use model::atom::AtomSite;
pub use model::lattice::Lattice;
pub use model::structure::Structure;
pub use model::types::{Element, ParseElementError};

pub use normalize::{NormalizeOptions, dedup_sites, normalize, normalize_path};
pub use symmetry::SymmOp;
