use super::types::Element;

/// One atomic site in fractional coordinates.
///
/// Labels are unique within a single asymmetric unit only; symmetry expansion
/// copies the label onto every generated image.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomSite {
    pub label: String,
    pub element: Element,
    pub frac: [f64; 3],
}

impl AtomSite {
    pub fn new(label: impl Into<String>, element: Element, frac: [f64; 3]) -> Self {
        Self {
            label: label.into(),
            element,
            frac,
        }
    }
}
