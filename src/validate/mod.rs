//! Chemical-plausibility checks for parsed structures.
//!
//! Both checks are heuristics over periodic distances and the Cordero radius
//! table: [`overlap`] flags site pairs packed closer than a fraction of
//! their radius sum, [`valence`] flags non-metal sites with more neighbors
//! than their element can bond. A structure failing either check is reported,
//! never repaired.

pub mod overlap;
pub mod valence;

use crate::model::types::Element;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("no covalent radius tabulated for element '{element}'")]
    MissingRadius { element: Element },
}
