use nalgebra::{Matrix3, Vector3};

/// Unit-cell geometry: the six cell parameters, immutable once parsed.
///
/// Angles are stored in degrees as they appear in the CIF record; the row
/// lattice matrix (a, b, c as rows) is derived on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl Lattice {
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        Self {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
        }
    }

    /// Row-vector lattice matrix with a along x and b in the xy plane.
    pub fn matrix(&self) -> Matrix3<f64> {
        let (alpha, beta, gamma) = (
            self.alpha.to_radians(),
            self.beta.to_radians(),
            self.gamma.to_radians(),
        );

        let cx = self.c * beta.cos();
        let cy = self.c * (alpha.cos() - beta.cos() * gamma.cos()) / gamma.sin();
        let cz = (self.c * self.c - cx * cx - cy * cy).max(0.0).sqrt();

        Matrix3::new(
            self.a,
            0.0,
            0.0,
            self.b * gamma.cos(),
            self.b * gamma.sin(),
            0.0,
            cx,
            cy,
            cz,
        )
    }

    pub fn volume(&self) -> f64 {
        self.matrix().determinant().abs()
    }

    /// Fractional to Cartesian: Cartesian = Latticeᵀ × frac.
    pub fn frac_to_cart(&self, frac: [f64; 3]) -> [f64; 3] {
        let cart = self.matrix().transpose() * Vector3::from(frac);
        [cart.x, cart.y, cart.z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_cell() {
        let lat = Lattice::from_parameters(5.0, 5.0, 5.0, 90.0, 90.0, 90.0);
        let cart = lat.frac_to_cart([0.5, 0.5, 0.5]);
        assert!((cart[0] - 2.5).abs() < 1e-10);
        assert!((cart[1] - 2.5).abs() < 1e-10);
        assert!((cart[2] - 2.5).abs() < 1e-10);
        assert!((lat.volume() - 125.0).abs() < 1e-9);
    }

    #[test]
    fn hexagonal_cell_volume() {
        // V = a²·c·sin(120°)
        let lat = Lattice::from_parameters(3.0, 3.0, 5.0, 90.0, 90.0, 120.0);
        let expected = 3.0 * 3.0 * 5.0 * 120.0_f64.to_radians().sin();
        assert!((lat.volume() - expected).abs() < 1e-9);
    }

    #[test]
    fn triclinic_matrix_row_lengths() {
        let lat = Lattice::from_parameters(6.1, 7.2, 8.3, 75.0, 85.0, 95.0);
        let m = lat.matrix();
        assert!((m.row(0).norm() - 6.1).abs() < 1e-9);
        assert!((m.row(1).norm() - 7.2).abs() < 1e-9);
        assert!((m.row(2).norm() - 8.3).abs() < 1e-9);
    }
}
