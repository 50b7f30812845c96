use crate::hamiltonian::{expectation, hconj, trace, HamiltonianError, HamiltonianNode};
use ndarray::prelude::*;
use ndarray_linalg::c64;

impl HamiltonianNode {
    /// Scalar nonadiabatic coupling in the diabatic basis,
    /// nac = sum_n dc1_dia[n] . (p[n] / m[n]).
    pub fn compute_nac_dia(
        &mut self,
        p: ArrayView1<f64>,
        inv_m: ArrayView1<f64>,
    ) -> Result<(), HamiltonianError> {
        self.validate(1)?;
        let mut nac: Array2<c64> = Array2::zeros((self.ndia, self.ndia));
        for (n, dc1) in self.dc1_dia.iter().enumerate() {
            nac.scaled_add(c64::new(p[n] * inv_m[n], 0.0), dc1);
        }
        self.nac_dia = nac;
        Ok(())
    }

    /// Scalar nonadiabatic coupling in the adiabatic basis.
    pub fn compute_nac_adi(
        &mut self,
        p: ArrayView1<f64>,
        inv_m: ArrayView1<f64>,
    ) -> Result<(), HamiltonianError> {
        self.validate(1)?;
        let mut nac: Array2<c64> = Array2::zeros((self.nadi, self.nadi));
        for (n, dc1) in self.dc1_adi.iter().enumerate() {
            nac.scaled_add(c64::new(p[n] * inv_m[n], 0.0), dc1);
        }
        self.nac_adi = nac;
        Ok(())
    }

    /// Vibronic Hamiltonian hvib = H - i . nac in the diabatic basis.
    pub fn compute_hvib_dia(&mut self) {
        self.hvib_dia = &self.ham_dia - &self.nac_dia.mapv(|val| c64::new(0.0, 1.0) * val);
    }

    /// Vibronic Hamiltonian in the adiabatic basis.
    pub fn compute_hvib_adi(&mut self) {
        self.hvib_adi = &self.ham_adi - &self.nac_adi.mapv(|val| c64::new(0.0, 1.0) * val);
    }

    /// Ehrenfest force in the diabatic representation: for each nuclear
    /// DOF the expectation value of the Hamiltonian gradient under the
    /// current electronic state `c`, normalized by the electronic norm.
    pub fn ehrenfest_forces_dia(
        &self,
        c: ArrayView2<c64>,
    ) -> Result<Array1<f64>, HamiltonianError> {
        self.ehrenfest_forces(c, &self.ham_dia, &self.d1ham_dia, &self.dc1_dia)
    }

    /// Ehrenfest force in the adiabatic representation.
    pub fn ehrenfest_forces_adi(
        &self,
        c: ArrayView2<c64>,
    ) -> Result<Array1<f64>, HamiltonianError> {
        self.ehrenfest_forces(c, &self.ham_adi, &self.d1ham_adi, &self.dc1_adi)
    }

    fn ehrenfest_forces(
        &self,
        c: ArrayView2<c64>,
        ham: &Array2<c64>,
        d1ham: &[Array2<c64>],
        dc1: &[Array2<c64>],
    ) -> Result<Array1<f64>, HamiltonianError> {
        self.validate(1)?;
        let norm: f64 = trace(hconj(c).dot(&c).view()).re;

        let mut forces: Array1<f64> = Array1::zeros(self.nnucl);
        for n in 0..self.nnucl {
            let mut grad: Array2<c64> = d1ham[n].clone();
            // derivative-coupling contribution, symmetrized the same way
            // as in the adiabatic transform
            let dtilda: Array2<c64> = hconj(dc1[n].view()).dot(ham);
            grad -= &(&dtilda + &hconj(dtilda.view()));
            forces[n] = -expectation(c, grad.view()).re / norm;
        }
        Ok(forces)
    }
}
