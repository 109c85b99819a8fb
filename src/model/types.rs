use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid or unsupported element symbol: '{0}'")]
pub struct ParseElementError(pub String);

/// Element symbols indexed by atomic number minus one.
const SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn",
    "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Atomic numbers of the non-metallic elements (noble gases and halogens
/// included). Everything else counts as a metal for curation purposes.
const NONMETALS: [u8; 23] = [
    1, 2, 5, 6, 7, 8, 9, 10, 14, 15, 16, 17, 18, 32, 33, 34, 35, 36, 52, 53, 54, 85, 86,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Element {
    H = 1,
    He,
    Li,
    Be,
    B,
    C,
    N,
    O,
    F,
    Ne,
    Na,
    Mg,
    Al,
    Si,
    P,
    S,
    Cl,
    Ar,
    K,
    Ca,
    Sc,
    Ti,
    V,
    Cr,
    Mn,
    Fe,
    Co,
    Ni,
    Cu,
    Zn,
    Ga,
    Ge,
    As,
    Se,
    Br,
    Kr,
    Rb,
    Sr,
    Y,
    Zr,
    Nb,
    Mo,
    Tc,
    Ru,
    Rh,
    Pd,
    Ag,
    Cd,
    In,
    Sn,
    Sb,
    Te,
    I,
    Xe,
    Cs,
    Ba,
    La,
    Ce,
    Pr,
    Nd,
    Pm,
    Sm,
    Eu,
    Gd,
    Tb,
    Dy,
    Ho,
    Er,
    Tm,
    Yb,
    Lu,
    Hf,
    Ta,
    W,
    Re,
    Os,
    Ir,
    Pt,
    Au,
    Hg,
    Tl,
    Pb,
    Bi,
    Po,
    At,
    Rn,
    Fr,
    Ra,
    Ac,
    Th,
    Pa,
    U,
    Np,
    Pu,
    Am,
    Cm,
    Bk,
    Cf,
    Es,
    Fm,
    Md,
    No,
    Lr,
    Rf,
    Db,
    Sg,
    Bh,
    Hs,
    Mt,
    Ds,
    Rg,
    Cn,
    Nh,
    Fl,
    Mc,
    Lv,
    Ts,
    Og = 118,
}

impl Element {
    #[inline]
    pub fn atomic_number(&self) -> u8 {
        *self as u8
    }

    pub fn symbol(&self) -> &'static str {
        SYMBOLS[(*self as u8 - 1) as usize]
    }

    /// `true` for every element outside the non-metal set.
    pub fn is_metal(&self) -> bool {
        !NONMETALS.contains(&self.atomic_number())
    }

    /// Cordero covalent radius in Å (DOI:10.1039/B801115J).
    ///
    /// `None` past Cm, which the reference table does not cover. C uses the
    /// sp³ value; Mn/Fe/Co use the high-spin values.
    pub fn covalent_radius(&self) -> Option<f64> {
        let r = match self {
            Element::H => 0.31,
            Element::He => 0.28,
            Element::Li => 1.28,
            Element::Be => 0.96,
            Element::B => 0.84,
            Element::C => 0.76,
            Element::N => 0.71,
            Element::O => 0.66,
            Element::F => 0.57,
            Element::Ne => 0.58,
            Element::Na => 1.66,
            Element::Mg => 1.41,
            Element::Al => 1.21,
            Element::Si => 1.11,
            Element::P => 1.07,
            Element::S => 1.05,
            Element::Cl => 1.02,
            Element::Ar => 1.06,
            Element::K => 2.03,
            Element::Ca => 1.76,
            Element::Sc => 1.7,
            Element::Ti => 1.6,
            Element::V => 1.53,
            Element::Cr => 1.39,
            Element::Mn => 1.61,
            Element::Fe => 1.52,
            Element::Co => 1.5,
            Element::Ni => 1.24,
            Element::Cu => 1.32,
            Element::Zn => 1.22,
            Element::Ga => 1.22,
            Element::Ge => 1.2,
            Element::As => 1.19,
            Element::Se => 1.2,
            Element::Br => 1.2,
            Element::Kr => 1.16,
            Element::Rb => 2.2,
            Element::Sr => 1.95,
            Element::Y => 1.9,
            Element::Zr => 1.75,
            Element::Nb => 1.64,
            Element::Mo => 1.54,
            Element::Tc => 1.47,
            Element::Ru => 1.46,
            Element::Rh => 1.42,
            Element::Pd => 1.39,
            Element::Ag => 1.45,
            Element::Cd => 1.44,
            Element::In => 1.42,
            Element::Sn => 1.39,
            Element::Sb => 1.39,
            Element::Te => 1.38,
            Element::I => 1.39,
            Element::Xe => 1.4,
            Element::Cs => 2.44,
            Element::Ba => 2.15,
            Element::La => 2.07,
            Element::Ce => 2.04,
            Element::Pr => 2.03,
            Element::Nd => 2.01,
            Element::Pm => 1.99,
            Element::Sm => 1.98,
            Element::Eu => 1.98,
            Element::Gd => 1.96,
            Element::Tb => 1.94,
            Element::Dy => 1.92,
            Element::Ho => 1.92,
            Element::Er => 1.89,
            Element::Tm => 1.9,
            Element::Yb => 1.87,
            Element::Lu => 1.87,
            Element::Hf => 1.75,
            Element::Ta => 1.7,
            Element::W => 1.62,
            Element::Re => 1.51,
            Element::Os => 1.44,
            Element::Ir => 1.41,
            Element::Pt => 1.36,
            Element::Au => 1.36,
            Element::Hg => 1.32,
            Element::Tl => 1.45,
            Element::Pb => 1.46,
            Element::Bi => 1.48,
            Element::Po => 1.4,
            Element::At => 1.5,
            Element::Rn => 1.5,
            Element::Fr => 2.6,
            Element::Ra => 2.21,
            Element::Ac => 2.15,
            Element::Th => 2.06,
            Element::Pa => 2.0,
            Element::U => 1.96,
            Element::Np => 1.9,
            Element::Pu => 1.87,
            Element::Am => 1.8,
            Element::Cm => 1.69,
            _ => return None,
        };
        Some(r)
    }

    fn from_atomic_number(z: u8) -> Option<Self> {
        if (1..=118).contains(&z) {
            // Discriminants are contiguous atomic numbers.
            Some(unsafe { std::mem::transmute::<u8, Element>(z) })
        } else {
            None
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SYMBOLS
            .iter()
            .position(|sym| *sym == s)
            .and_then(|idx| Element::from_atomic_number((idx + 1) as u8))
            .ok_or_else(|| ParseElementError(s.to_string()))
    }
}
