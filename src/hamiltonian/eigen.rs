use crate::hamiltonian::{hconj, HamiltonianError};
use ndarray::prelude::*;
use ndarray_linalg::{c64, Eigh, UPLO};

// overlap eigenvalues below this value make the Loewdin transform useless
const SINGULAR_OVERLAP_THRESHOLD: f64 = 1.0e-12;

/// Solves the generalized Hermitian eigenproblem H . U = S . U . E for a
/// Hermitian `h` and a Hermitian positive-definite overlap `s`.
///
/// The problem is reduced to an ordinary eigenproblem by Loewdin
/// orthogonalization: with X = S^(-1/2) one diagonalizes H' = X^H . H . X
/// and back-transforms the eigenvectors, U = X . C'. The returned columns
/// satisfy U^H . S . U = I and the eigenvalues are sorted in ascending
/// order.
pub fn solve_eigen(
    h: ArrayView2<c64>,
    s: ArrayView2<c64>,
) -> Result<(Array1<f64>, Array2<c64>), HamiltonianError> {
    let (s_vals, s_vecs): (Array1<f64>, Array2<c64>) = s.eigh(UPLO::Upper)?;
    if s_vals.iter().any(|&val| val < SINGULAR_OVERLAP_THRESHOLD) {
        return Err(HamiltonianError::SingularOverlap);
    }
    let inv_sqrt: Array1<c64> = s_vals.mapv(|val| c64::new(1.0 / val.sqrt(), 0.0));
    let x: Array2<c64> = s_vecs
        .dot(&Array2::from_diag(&inv_sqrt))
        .dot(&hconj(s_vecs.view()));

    let h_prime: Array2<c64> = hconj(x.view()).dot(&h).dot(&x);
    let (energies, coeffs): (Array1<f64>, Array2<c64>) = h_prime.eigh(UPLO::Upper)?;
    let u: Array2<c64> = x.dot(&coeffs);

    Ok((energies, u))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn hermitian_3x3() -> Array2<c64> {
        array![
            [c64::new(0.5, 0.0), c64::new(0.1, 0.2), c64::new(0.0, -0.1)],
            [c64::new(0.1, -0.2), c64::new(-0.3, 0.0), c64::new(0.2, 0.0)],
            [c64::new(0.0, 0.1), c64::new(0.2, 0.0), c64::new(0.8, 0.0)],
        ]
    }

    fn overlap_3x3() -> Array2<c64> {
        array![
            [c64::new(1.0, 0.0), c64::new(0.1, 0.0), c64::new(0.0, 0.0)],
            [c64::new(0.1, 0.0), c64::new(1.0, 0.0), c64::new(0.05, 0.0)],
            [c64::new(0.0, 0.0), c64::new(0.05, 0.0), c64::new(1.0, 0.0)],
        ]
    }

    #[test]
    fn eigenvectors_are_generalized_orthonormal() {
        let h = hermitian_3x3();
        let s = overlap_3x3();
        let (energies, u) = solve_eigen(h.view(), s.view()).unwrap();

        // U^H . S . U = I
        let ortho = hconj(u.view()).dot(&s).dot(&u);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(ortho[[i, j]].re, expected, epsilon = 1e-10);
                assert_abs_diff_eq!(ortho[[i, j]].im, 0.0, epsilon = 1e-10);
            }
        }

        // H . U = S . U . E
        let lhs = h.dot(&u);
        let rhs = s.dot(&u).dot(&Array2::from_diag(
            &energies.mapv(|val| c64::new(val, 0.0)),
        ));
        for i in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(lhs[[i, j]].re, rhs[[i, j]].re, epsilon = 1e-10);
                assert_abs_diff_eq!(lhs[[i, j]].im, rhs[[i, j]].im, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn eigenvalues_are_sorted() {
        let h = hermitian_3x3();
        let s = overlap_3x3();
        let (energies, _) = solve_eigen(h.view(), s.view()).unwrap();
        assert!(energies[0] <= energies[1] && energies[1] <= energies[2]);
    }

    #[test]
    fn singular_overlap_is_rejected() {
        let h = hermitian_3x3();
        let mut s = overlap_3x3();
        // make the overlap rank-deficient
        s[[2, 2]] = c64::new(0.0, 0.0);
        s[[1, 2]] = c64::new(0.0, 0.0);
        s[[2, 1]] = c64::new(0.0, 0.0);
        match solve_eigen(h.view(), s.view()) {
            Err(HamiltonianError::SingularOverlap) => {}
            other => panic!("expected SingularOverlap, got {:?}", other.map(|_| ())),
        }
    }
}
