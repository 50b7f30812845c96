use crate::defaults::DEGENERACY_THRESHOLD;
use crate::hamiltonian::{hconj, solve_eigen, HamiltonianError, HamiltonianNode, HamiltonianTree};
use crate::interface::ElectronicStructureProvider;
use log::warn;
use ndarray::prelude::*;
use ndarray_linalg::c64;

impl HamiltonianTree {
    /// Computes the diabatic-to-adiabatic transform at every node of the
    /// requested hierarchy level, starting the dispatch at the root.
    ///
    /// `der_lvl == 0` computes only the basis transform and the adiabatic
    /// energies, `der_lvl >= 1` additionally builds the adiabatic gradients
    /// and derivative couplings.
    pub fn compute_adiabatic(
        &mut self,
        der_lvl: usize,
        target_level: usize,
    ) -> Result<(), HamiltonianError> {
        self.compute_adiabatic_at(0, der_lvl, target_level)
    }

    /// Dispatch rule: compute locally when the node sits at `target_level`,
    /// fan out to all children when the target is deeper, and warn without
    /// touching any storage when the target lies above the node. The last
    /// case can be reached by generic traversal code and is deliberately
    /// not an error.
    pub fn compute_adiabatic_at(
        &mut self,
        idx: usize,
        der_lvl: usize,
        target_level: usize,
    ) -> Result<(), HamiltonianError> {
        let level = self.node(idx).level;
        if level == target_level {
            self.node_mut(idx).compute_adiabatic_local(der_lvl)
        } else if target_level > level {
            for child in self.node(idx).children.clone() {
                self.compute_adiabatic_at(child, der_lvl, target_level)?;
            }
            Ok(())
        } else {
            warn!(
                "compute_adiabatic: cannot evaluate level {} from a node at level {}",
                target_level, level
            );
            Ok(())
        }
    }

    /// Delegates the adiabatic properties to an external provider at the
    /// requested level, with the same dispatch rule as [compute_adiabatic].
    /// Fields absent from the returned bundle leave the node storage
    /// unmodified.
    pub fn compute_adiabatic_with(
        &mut self,
        provider: &mut dyn ElectronicStructureProvider,
        q: ArrayView2<f64>,
        target_level: usize,
    ) {
        self.compute_adiabatic_with_at(0, provider, q, target_level)
    }

    fn compute_adiabatic_with_at(
        &mut self,
        idx: usize,
        provider: &mut dyn ElectronicStructureProvider,
        q: ArrayView2<f64>,
        target_level: usize,
    ) {
        let level = self.node(idx).level;
        if level == target_level {
            let path = self.full_id(idx);
            let col = self.trajectory_column(&path);
            let bundle = provider.compute_adiabatic(q.slice(s![.., col..col + 1]), &path);
            self.node_mut(idx).apply_adiabatic(bundle);
        } else if target_level > level {
            for child in self.node(idx).children.clone() {
                self.compute_adiabatic_with_at(child, provider, q, target_level);
            }
        } else {
            warn!(
                "compute_adiabatic: cannot evaluate level {} from a node at level {}",
                target_level, level
            );
        }
    }
}

impl HamiltonianNode {
    /// Local diabatic-to-adiabatic transform of a single node.
    ///
    /// Solves H_dia . U = S_dia . U . H_adi for the basis transform U and
    /// the diagonal adiabatic Hamiltonian. The 1-state case bypasses the
    /// eigensolver: no rotation is meaningful there.
    ///
    /// The internal transform requires `nadi == ndia`; rectangular
    /// transforms only enter through external provider bundles.
    pub fn compute_adiabatic_local(&mut self, der_lvl: usize) -> Result<(), HamiltonianError> {
        debug_assert_eq!(
            self.nadi, self.ndia,
            "the internal adiabatic transform requires a square problem"
        );
        self.validate(der_lvl)?;

        if self.nadi == 1 && self.ndia == 1 {
            self.ham_adi.assign(&self.ham_dia);
            self.basis_transform[[0, 0]] = c64::new(1.0, 0.0);
        } else {
            let (energies, u) = solve_eigen(self.ham_dia.view(), self.ovlp_dia.view())?;
            self.basis_transform.assign(&u);
            self.ham_adi.fill(c64::new(0.0, 0.0));
            for (i, energy) in energies.iter().enumerate() {
                self.ham_adi[[i, i]] = c64::new(*energy, 0.0);
            }
        }

        if der_lvl >= 1 {
            self.compute_adiabatic_derivatives();
        }
        Ok(())
    }

    /// Derivative pass: transforms the diabatic gradients into the
    /// adiabatic basis and splits them into state-diagonal forces and
    /// off-diagonal derivative couplings.
    fn compute_adiabatic_derivatives(&mut self) {
        let u = &self.basis_transform;
        let uh = hconj(u.view());

        for n in 0..self.nnucl {
            let mut tmp: Array2<c64> = uh.dot(&self.d1ham_dia[n]).dot(u);

            let dtilda: Array2<c64> = u
                .dot(&hconj(self.dc1_dia[n].view()))
                .dot(&uh)
                .dot(&self.ham_adi);
            let dtilda: Array2<c64> = &dtilda + &hconj(dtilda.view());
            tmp -= &dtilda;

            // only the state-diagonal entries carry a physical force
            self.d1ham_adi[n].fill(c64::new(0.0, 0.0));
            for i in 0..self.nadi {
                self.d1ham_adi[n][[i, i]] = tmp[[i, i]];
            }

            self.dc1_adi[n].fill(c64::new(0.0, 0.0));
            for i in 0..self.nadi {
                for j in 0..self.nadi {
                    if i == j {
                        continue;
                    }
                    let de: f64 = (self.ham_adi[[j, j]] - self.ham_adi[[i, i]]).re;
                    if de.abs() < DEGENERACY_THRESHOLD {
                        // the coupling diverges at an exact crossing; it is
                        // discarded there rather than divided by a vanishing gap
                        self.dc1_adi[n][[i, j]] = c64::new(0.0, 0.0);
                    } else {
                        self.dc1_adi[n][[i, j]] = tmp[[i, j]] / de;
                    }
                }
            }
        }
    }
}
