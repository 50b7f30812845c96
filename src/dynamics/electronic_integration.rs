use crate::hamiltonian::HamiltonianNode;
use crate::interface::{ElectronicPropagator, Representation};
use ndarray::prelude::*;
use ndarray_linalg::{c64, Eig, Inverse};

/// Propagates the electronic coefficients with the exact matrix
/// exponential of the vibronic Hamiltonian,
/// C(t + dt) = exp(-i . hvib . dt) . C(t), built from the
/// eigendecomposition of -i . hvib . dt.
pub struct MatrixExponentialPropagator;

impl ElectronicPropagator for MatrixExponentialPropagator {
    fn propagate(
        &mut self,
        dt: f64,
        c: &mut Array2<c64>,
        node: &HamiltonianNode,
        rep: Representation,
    ) {
        let hvib: &Array2<c64> = match rep {
            Representation::Diabatic => &node.hvib_dia,
            Representation::Adiabatic => &node.hvib_adi,
        };
        let mat: Array2<c64> = hvib.mapv(|val| -c64::new(0.0, 1.0) * val * dt);
        let (eig, eig_vec): (Array1<c64>, Array2<c64>) = mat.eig().unwrap();
        let diag: Array1<c64> = eig.mapv(|val| val.exp());
        let propagator: Array2<c64> = eig_vec
            .dot(&Array2::from_diag(&diag))
            .dot(&eig_vec.inv().unwrap());

        *c = propagator.dot(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hamiltonian::{hconj, trace};
    use approx::assert_abs_diff_eq;

    #[test]
    fn propagation_preserves_the_norm() {
        let mut node = HamiltonianNode::new(2, 2, 1);
        node.ham_adi = array![
            [c64::new(-0.2, 0.0), c64::new(0.0, 0.0)],
            [c64::new(0.0, 0.0), c64::new(0.3, 0.0)],
        ];
        node.nac_adi = array![
            [c64::new(0.0, 0.0), c64::new(0.05, 0.0)],
            [c64::new(-0.05, 0.0), c64::new(0.0, 0.0)],
        ];
        node.compute_hvib_adi();

        let mut c: Array2<c64> = Array2::zeros((2, 2));
        c[[0, 0]] = c64::new(1.0, 0.0);
        let mut propagator = MatrixExponentialPropagator;
        for _ in 0..50 {
            propagator.propagate(0.05, &mut c, &node, Representation::Adiabatic);
        }
        let norm = trace(hconj(c.view()).dot(&c).view()).re;
        assert_abs_diff_eq!(norm, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn single_state_picks_up_a_pure_phase() {
        let mut node = HamiltonianNode::new(1, 1, 1);
        node.ham_adi[[0, 0]] = c64::new(0.5, 0.0);
        node.compute_hvib_adi();

        let mut c: Array2<c64> = Array2::zeros((1, 1));
        c[[0, 0]] = c64::new(1.0, 0.0);
        let mut propagator = MatrixExponentialPropagator;
        propagator.propagate(0.1, &mut c, &node, Representation::Adiabatic);

        // exp(-i * 0.5 * 0.1)
        assert_abs_diff_eq!(c[[0, 0]].re, f64::cos(0.05), epsilon = 1e-12);
        assert_abs_diff_eq!(c[[0, 0]].im, -f64::sin(0.05), epsilon = 1e-12);
    }
}
