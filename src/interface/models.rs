use crate::defaults;
use crate::interface::{DiabaticBundle, ElectronicStructureProvider};
use ndarray::prelude::*;
use ndarray_linalg::c64;

/// Uncoupled harmonic diabatic surface: a single electronic state with
/// V(q) = sum_n 1/2 k_n q_n^2. With all force constants zero this is a
/// free particle. Mostly useful as a deterministic reference system.
pub struct HarmonicProvider {
    pub force_constants: Array1<f64>,
}

impl HarmonicProvider {
    pub fn new(force_constants: Array1<f64>) -> HarmonicProvider {
        HarmonicProvider { force_constants }
    }

    pub fn free_particle(nnucl: usize) -> HarmonicProvider {
        HarmonicProvider {
            force_constants: Array1::zeros(nnucl),
        }
    }
}

impl ElectronicStructureProvider for HarmonicProvider {
    fn compute(&mut self, q: ArrayView2<f64>, _node_path: &[usize]) -> DiabaticBundle {
        let nnucl = self.force_constants.len();
        let mut ham_dia: Array2<c64> = Array2::zeros((1, 1));
        let mut d1ham_dia: Vec<Array2<c64>> = vec![Array2::zeros((1, 1)); nnucl];

        let mut energy: f64 = 0.0;
        for n in 0..nnucl {
            let k = self.force_constants[n];
            energy += 0.5 * k * q[[n, 0]] * q[[n, 0]];
            d1ham_dia[n][[0, 0]] = c64::new(k * q[[n, 0]], 0.0);
        }
        ham_dia[[0, 0]] = c64::new(energy, 0.0);

        DiabaticBundle {
            ham_dia: Some(ham_dia),
            d1ham_dia: Some(d1ham_dia),
            dc1_dia: Some(vec![Array2::zeros((1, 1)); nnucl]),
            ..DiabaticBundle::default()
        }
    }
}

/// Two-state single-crossing model (Tully's simple avoided crossing):
///
///   H11 = A (1 - exp(-B x))  for x >= 0,  -A (1 - exp(B x))  for x < 0
///   H22 = -H11
///   H12 = H21 = C exp(-D x^2)
///
/// The diabatic basis is smooth, so the diabatic derivative couplings
/// vanish and the interstate coupling lives entirely in H12.
pub struct SimpleAvoidedCrossing {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl SimpleAvoidedCrossing {
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> SimpleAvoidedCrossing {
        SimpleAvoidedCrossing { a, b, c, d }
    }
}

impl Default for SimpleAvoidedCrossing {
    fn default() -> SimpleAvoidedCrossing {
        SimpleAvoidedCrossing::new(
            defaults::SAC_A,
            defaults::SAC_B,
            defaults::SAC_C,
            defaults::SAC_D,
        )
    }
}

impl ElectronicStructureProvider for SimpleAvoidedCrossing {
    fn compute(&mut self, q: ArrayView2<f64>, _node_path: &[usize]) -> DiabaticBundle {
        let x = q[[0, 0]];

        let h11 = if x >= 0.0 {
            self.a * (1.0 - f64::exp(-self.b * x))
        } else {
            -self.a * (1.0 - f64::exp(self.b * x))
        };
        let h12 = self.c * f64::exp(-self.d * x * x);
        let dh11 = self.a * self.b * f64::exp(-self.b * x.abs());
        let dh12 = -2.0 * self.d * x * h12;

        let ham_dia: Array2<c64> = array![
            [c64::new(h11, 0.0), c64::new(h12, 0.0)],
            [c64::new(h12, 0.0), c64::new(-h11, 0.0)],
        ];
        let grad: Array2<c64> = array![
            [c64::new(dh11, 0.0), c64::new(dh12, 0.0)],
            [c64::new(dh12, 0.0), c64::new(-dh11, 0.0)],
        ];

        DiabaticBundle {
            ham_dia: Some(ham_dia),
            d1ham_dia: Some(vec![grad]),
            dc1_dia: Some(vec![Array2::zeros((2, 2))]),
            ..DiabaticBundle::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn harmonic_energy_and_gradient() {
        let mut provider = HarmonicProvider::new(array![2.0, 0.5]);
        let q: Array2<f64> = array![[1.5], [-2.0]];
        let bundle = provider.compute(q.view(), &[0]);

        let ham = bundle.ham_dia.unwrap();
        let grads = bundle.d1ham_dia.unwrap();
        assert_abs_diff_eq!(ham[[0, 0]].re, 0.5 * 2.0 * 2.25 + 0.5 * 0.5 * 4.0);
        assert_abs_diff_eq!(grads[0][[0, 0]].re, 2.0 * 1.5);
        assert_abs_diff_eq!(grads[1][[0, 0]].re, 0.5 * -2.0);
    }

    #[test]
    fn avoided_crossing_gradient_matches_finite_differences() {
        let mut provider = SimpleAvoidedCrossing::default();
        let h = 1e-6;
        for &x in [-1.3, -0.2, 0.0, 0.4, 2.1].iter() {
            let fwd = provider.compute(array![[x + h]].view(), &[0]).ham_dia.unwrap();
            let bwd = provider.compute(array![[x - h]].view(), &[0]).ham_dia.unwrap();
            let grad = provider.compute(array![[x]].view(), &[0]).d1ham_dia.unwrap();
            for i in 0..2 {
                for j in 0..2 {
                    let numeric = (fwd[[i, j]].re - bwd[[i, j]].re) / (2.0 * h);
                    assert_abs_diff_eq!(grad[0][[i, j]].re, numeric, epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn avoided_crossing_is_antisymmetric_in_the_diagonal() {
        let mut provider = SimpleAvoidedCrossing::default();
        let bundle = provider.compute(array![[0.7]].view(), &[0]);
        let ham = bundle.ham_dia.unwrap();
        assert_abs_diff_eq!(ham[[0, 0]].re, -ham[[1, 1]].re);
        assert_abs_diff_eq!(ham[[0, 1]].re, ham[[1, 0]].re);
    }
}
