use crate::constants;
use crate::dynamics::MatrixExponentialPropagator;
use crate::hamiltonian::HamiltonianTree;
use crate::initialization::{DynamicsConfiguration, SystemData};
use crate::interface::Representation;
use ndarray::prelude::*;
use ndarray_linalg::c64;

pub struct Simulation {
    pub stepsize: f64,
    pub config: DynamicsConfiguration,
    pub rep: Representation,
    pub ndof: usize,
    pub ntraj: usize,
    pub coordinates: Array2<f64>,
    pub momenta: Array2<f64>,
    pub inv_masses: Array1<f64>,
    pub coefficients: Vec<Array2<c64>>,
    pub tree: HamiltonianTree,
    pub kinetic_energy: f64,
    pub propagator: MatrixExponentialPropagator,
}

impl Simulation {
    pub fn new(system: &SystemData) -> Simulation {
        let config = system.config.clone();
        let stepsize_au: f64 = config.stepsize * constants::FS_TO_AU;
        let nstates = config.nstates;

        // every trajectory starts as a pure state on the initial surface
        let coefficients: Vec<Array2<c64>> = (0..system.ntraj)
            .map(|_| {
                let mut c: Array2<c64> = Array2::zeros((nstates, nstates));
                c[[config.initial_state, config.initial_state]] = c64::new(1.0, 0.0);
                c
            })
            .collect();

        let tree: HamiltonianTree = if system.ntraj == 1 {
            HamiltonianTree::single(nstates, nstates, system.ndof)
        } else {
            HamiltonianTree::ensemble(nstates, nstates, system.ndof, system.ntraj)
        };

        Simulation {
            stepsize: stepsize_au,
            rep: config.representation,
            config,
            ndof: system.ndof,
            ntraj: system.ntraj,
            coordinates: system.coordinates.clone(),
            momenta: system.momenta.clone(),
            inv_masses: system.inv_masses.clone(),
            coefficients,
            tree,
            kinetic_energy: 0.0,
            propagator: MatrixExponentialPropagator,
        }
    }

    /// Hierarchy level the dynamics operates on: the root for a single
    /// trajectory, the children for an ensemble.
    pub fn target_level(&self) -> usize {
        if self.ntraj == 1 {
            0
        } else {
            1
        }
    }
}
