use crate::hamiltonian::{HamiltonianError, HamiltonianNode, HamiltonianTree};
use crate::interface::{ElectronicPropagator, ElectronicStructureProvider, Representation};
use ndarray::prelude::*;
use ndarray_linalg::c64;
use rayon::prelude::*;

/// One step of the Ehrenfest algorithm for the electron-nuclear DOFs of a
/// single trajectory.
///
/// The scheme is a symmetric Strang splitting: electronic half-step, force
/// half-kick, full position update, refresh of the electronic structure at
/// the new geometry, second force half-kick, electronic half-step. `q` and
/// `p` are Ndof x 1 matrices, `c` the electronic coefficient matrix in the
/// representation selected by `rep`.
pub fn ehrenfest_step0(
    dt: f64,
    q: &mut Array2<f64>,
    p: &mut Array2<f64>,
    inv_m: ArrayView1<f64>,
    c: &mut Array2<c64>,
    tree: &mut HamiltonianTree,
    provider: &mut dyn ElectronicStructureProvider,
    propagator: &mut dyn ElectronicPropagator,
    rep: Representation,
) -> Result<(), HamiltonianError> {
    let ndof = q.nrows();

    // electronic propagation
    update_couplings(tree.root_mut(), p.column(0), inv_m, rep)?;
    propagator.propagate(0.5 * dt, c, tree.root(), rep);

    // nuclear propagation
    let forces = ehrenfest_forces(tree.root(), c.view(), rep)?;
    for dof in 0..ndof {
        p[[dof, 0]] += forces[dof] * 0.5 * dt;
    }
    for dof in 0..ndof {
        q[[dof, 0]] += inv_m[dof] * p[[dof, 0]] * dt;
    }

    tree.compute_diabatic(provider, q.view(), 0);
    tree.compute_adiabatic(1, 0)?;

    let forces = ehrenfest_forces(tree.root(), c.view(), rep)?;
    for dof in 0..ndof {
        p[[dof, 0]] += forces[dof] * 0.5 * dt;
    }

    // electronic propagation
    update_couplings(tree.root_mut(), p.column(0), inv_m, rep)?;
    propagator.propagate(0.5 * dt, c, tree.root(), rep);

    Ok(())
}

/// One step of the Ehrenfest algorithm for an ensemble of independent
/// trajectories sharing one Hamiltonian tree.
///
/// Each trajectory owns one column of `q`/`p`, its coefficient matrix
/// `c[traj]` and the corresponding child node of the tree. The forces of
/// all trajectories are assembled into one Ndof x Ntraj matrix so that the
/// momentum update stays vectorized over the columns; the diabatic refresh
/// and the adiabatic recompute reach all children through the tree's
/// fan-out dispatch in a single call each.
pub fn ehrenfest_step1(
    dt: f64,
    q: &mut Array2<f64>,
    p: &mut Array2<f64>,
    inv_m: ArrayView1<f64>,
    c: &mut [Array2<c64>],
    tree: &mut HamiltonianTree,
    provider: &mut dyn ElectronicStructureProvider,
    propagator: &mut dyn ElectronicPropagator,
    rep: Representation,
) -> Result<(), HamiltonianError> {
    let ndof = q.nrows();
    let ntraj = q.ncols();

    // electronic propagation
    for traj in 0..ntraj {
        let idx = tree.child_of_root(traj);
        update_couplings(tree.node_mut(idx), p.column(traj), inv_m, rep)?;
    }
    for (traj, c_traj) in c.iter_mut().enumerate() {
        propagator.propagate(0.5 * dt, c_traj, tree.node(tree.child_of_root(traj)), rep);
    }

    // nuclear propagation
    let forces = gather_forces(tree, c, rep)?;
    p.scaled_add(0.5 * dt, &forces);

    for traj in 0..ntraj {
        for dof in 0..ndof {
            q[[dof, traj]] += inv_m[dof] * p[[dof, traj]] * dt;
        }
    }

    tree.compute_diabatic_batched(provider, q.view());
    tree.compute_adiabatic(1, 1)?;

    let forces = gather_forces(tree, c, rep)?;
    p.scaled_add(0.5 * dt, &forces);

    // electronic propagation
    for traj in 0..ntraj {
        let idx = tree.child_of_root(traj);
        update_couplings(tree.node_mut(idx), p.column(traj), inv_m, rep)?;
    }
    for (traj, c_traj) in c.iter_mut().enumerate() {
        propagator.propagate(0.5 * dt, c_traj, tree.node(tree.child_of_root(traj)), rep);
    }

    Ok(())
}

fn update_couplings(
    node: &mut HamiltonianNode,
    p: ArrayView1<f64>,
    inv_m: ArrayView1<f64>,
    rep: Representation,
) -> Result<(), HamiltonianError> {
    match rep {
        Representation::Diabatic => {
            node.compute_nac_dia(p, inv_m)?;
            node.compute_hvib_dia();
        }
        Representation::Adiabatic => {
            node.compute_nac_adi(p, inv_m)?;
            node.compute_hvib_adi();
        }
    }
    Ok(())
}

fn ehrenfest_forces(
    node: &HamiltonianNode,
    c: ArrayView2<c64>,
    rep: Representation,
) -> Result<Array1<f64>, HamiltonianError> {
    match rep {
        Representation::Diabatic => node.ehrenfest_forces_dia(c),
        Representation::Adiabatic => node.ehrenfest_forces_adi(c),
    }
}

/// Assembles the per-trajectory Ehrenfest forces into one Ndof x Ntraj
/// matrix. The trajectories are independent, so the evaluation is
/// data-parallel over the columns.
fn gather_forces(
    tree: &HamiltonianTree,
    c: &[Array2<c64>],
    rep: Representation,
) -> Result<Array2<f64>, HamiltonianError> {
    let ntraj = c.len();
    let ndof = tree.root().nnucl;

    let columns: Vec<Array1<f64>> = (0..ntraj)
        .into_par_iter()
        .map(|traj| ehrenfest_forces(tree.node(tree.child_of_root(traj)), c[traj].view(), rep))
        .collect::<Result<Vec<Array1<f64>>, HamiltonianError>>()?;

    let mut forces: Array2<f64> = Array2::zeros((ndof, ntraj));
    for (traj, column) in columns.iter().enumerate() {
        forces.column_mut(traj).assign(column);
    }
    Ok(forces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::MatrixExponentialPropagator;
    use crate::hamiltonian::expectation;
    use crate::interface::{HarmonicProvider, SimpleAvoidedCrossing};
    use approx::assert_abs_diff_eq;

    fn initialized_tree(
        provider: &mut dyn ElectronicStructureProvider,
        q: &Array2<f64>,
        ndia: usize,
        nnucl: usize,
        ntraj: usize,
    ) -> HamiltonianTree {
        let (mut tree, level) = if ntraj == 1 {
            (HamiltonianTree::single(ndia, ndia, nnucl), 0)
        } else {
            (HamiltonianTree::ensemble(ndia, ndia, nnucl, ntraj), 1)
        };
        tree.compute_diabatic(provider, q.view(), level);
        tree.compute_adiabatic(1, level).unwrap();
        tree
    }

    fn pure_state(nstates: usize, state: usize) -> Array2<c64> {
        let mut c: Array2<c64> = Array2::zeros((nstates, nstates));
        c[[state, state]] = c64::new(1.0, 0.0);
        c
    }

    #[test]
    fn zero_forces_give_free_particle_drift() {
        let mut provider = HarmonicProvider::free_particle(2);
        let mut q: Array2<f64> = array![[0.3], [-1.1]];
        let mut p: Array2<f64> = array![[1.7], [0.4]];
        let inv_m = array![1.0, 0.25];
        let mut c = pure_state(1, 0);
        let mut tree = initialized_tree(&mut provider, &q, 1, 2, 1);
        let mut propagator = MatrixExponentialPropagator;

        let dt = 0.05;
        let nsteps = 100;
        for _ in 0..nsteps {
            ehrenfest_step0(
                dt,
                &mut q,
                &mut p,
                inv_m.view(),
                &mut c,
                &mut tree,
                &mut provider,
                &mut propagator,
                Representation::Adiabatic,
            )
            .unwrap();
        }

        // momenta are untouched, coordinates drift linearly
        assert_eq!(p[[0, 0]], 1.7);
        assert_eq!(p[[1, 0]], 0.4);
        assert_abs_diff_eq!(
            q[[0, 0]],
            0.3 + 1.0 * 1.7 * dt * nsteps as f64,
            epsilon = 1e-10
        );
        assert_abs_diff_eq!(
            q[[1, 0]],
            -1.1 + 0.25 * 0.4 * dt * nsteps as f64,
            epsilon = 1e-10
        );
    }

    #[test]
    fn harmonic_oscillator_conserves_the_total_energy() {
        let mut provider = HarmonicProvider::new(array![1.0]);
        let mut q: Array2<f64> = array![[1.0]];
        let mut p: Array2<f64> = array![[0.0]];
        let inv_m = array![1.0];
        let mut c = pure_state(1, 0);
        let mut tree = initialized_tree(&mut provider, &q, 1, 1, 1);
        let mut propagator = MatrixExponentialPropagator;

        let dt = 0.01;
        let initial_energy = 0.5 * p[[0, 0]] * p[[0, 0]] + tree.root().ham_adi[[0, 0]].re;
        for _ in 0..1000 {
            ehrenfest_step0(
                dt,
                &mut q,
                &mut p,
                inv_m.view(),
                &mut c,
                &mut tree,
                &mut provider,
                &mut propagator,
                Representation::Adiabatic,
            )
            .unwrap();

            let kinetic = 0.5 * p[[0, 0]] * p[[0, 0]];
            let potential = tree.root().ham_adi[[0, 0]].re;
            // leapfrog energy error stays bounded at O(dt^2)
            assert_abs_diff_eq!(kinetic + potential, initial_energy, epsilon = 1e-4);
        }
    }

    #[test]
    fn ensemble_of_identical_trajectories_matches_single_runs() {
        let ntraj = 4;
        let dt = 0.1;
        let nsteps = 10;
        let q0 = -3.0;
        let p0 = 10.0;
        let inv_m = array![1.0 / 2000.0];

        // ensemble run
        let mut provider = SimpleAvoidedCrossing::default();
        let mut q: Array2<f64> = Array2::from_elem((1, ntraj), q0);
        let mut p: Array2<f64> = Array2::from_elem((1, ntraj), p0);
        let mut c: Vec<Array2<c64>> = (0..ntraj).map(|_| pure_state(2, 0)).collect();
        let mut tree = initialized_tree(&mut provider, &q, 2, 1, ntraj);
        let mut propagator = MatrixExponentialPropagator;
        for _ in 0..nsteps {
            ehrenfest_step1(
                dt,
                &mut q,
                &mut p,
                inv_m.view(),
                &mut c,
                &mut tree,
                &mut provider,
                &mut propagator,
                Representation::Adiabatic,
            )
            .unwrap();
        }

        // four independent single-trajectory runs
        for traj in 0..ntraj {
            let mut provider = SimpleAvoidedCrossing::default();
            let mut q1: Array2<f64> = array![[q0]];
            let mut p1: Array2<f64> = array![[p0]];
            let mut c1 = pure_state(2, 0);
            let mut tree1 = initialized_tree(&mut provider, &q1, 2, 1, 1);
            for _ in 0..nsteps {
                ehrenfest_step0(
                    dt,
                    &mut q1,
                    &mut p1,
                    inv_m.view(),
                    &mut c1,
                    &mut tree1,
                    &mut provider,
                    &mut propagator,
                    Representation::Adiabatic,
                )
                .unwrap();
            }

            assert_abs_diff_eq!(q[[0, traj]], q1[[0, 0]], epsilon = 1e-12);
            assert_abs_diff_eq!(p[[0, traj]], p1[[0, 0]], epsilon = 1e-12);
            for i in 0..2 {
                for j in 0..2 {
                    assert_abs_diff_eq!(c[traj][[i, j]].re, c1[[i, j]].re, epsilon = 1e-12);
                    assert_abs_diff_eq!(c[traj][[i, j]].im, c1[[i, j]].im, epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn avoided_crossing_transfers_population() {
        let mut provider = SimpleAvoidedCrossing::default();
        let mut q: Array2<f64> = array![[-4.0]];
        let mut p: Array2<f64> = array![[15.0]];
        let inv_m = array![1.0 / 2000.0];
        let mut c = pure_state(2, 0);
        let mut tree = initialized_tree(&mut provider, &q, 2, 1, 1);
        let mut propagator = MatrixExponentialPropagator;

        // run until the trajectory has passed the crossing region
        for _ in 0..12000 {
            ehrenfest_step0(
                0.1,
                &mut q,
                &mut p,
                inv_m.view(),
                &mut c,
                &mut tree,
                &mut provider,
                &mut propagator,
                Representation::Adiabatic,
            )
            .unwrap();
        }
        assert!(q[[0, 0]] > 1.0);

        // some population must have leaked into the upper state and the
        // electronic norm must survive the trip
        let norm = expectation(c.view(), Array2::eye(2).view()).re;
        assert_abs_diff_eq!(norm, 1.0, epsilon = 1e-6);
        let lower = c[[0, 0]].norm_sqr() + c[[0, 1]].norm_sqr();
        assert!(lower < 1.0);
        assert!(lower > 0.0);
    }
}
