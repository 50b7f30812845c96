pub use models::*;

pub mod models;

use crate::hamiltonian::HamiltonianNode;
use ndarray::prelude::*;
use ndarray_linalg::c64;
use serde::{Deserialize, Serialize};

/// Which matrix family drives the force and coupling evaluation of a run.
#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    Diabatic,
    Adiabatic,
}

/// Diabatic data returned by an electronic-structure provider. Every field
/// is optional: a provider may update only part of the node storage.
#[derive(Default)]
pub struct DiabaticBundle {
    pub ham_dia: Option<Array2<c64>>,
    pub ovlp_dia: Option<Array2<c64>>,
    pub d1ham_dia: Option<Vec<Array2<c64>>>,
    pub dc1_dia: Option<Vec<Array2<c64>>>,
}

/// Precomputed adiabatic data, for providers that bypass the internal
/// diabatic-to-adiabatic transform.
#[derive(Default)]
pub struct AdiabaticBundle {
    pub ham_adi: Option<Array2<c64>>,
    pub d1ham_adi: Option<Vec<Array2<c64>>>,
    pub dc1_adi: Option<Vec<Array2<c64>>>,
}

/// Supplies the diabatic Hamiltonian and its nuclear derivatives for the
/// current geometry. `q` holds the coordinates of the requesting node as a
/// single column; `node_path` identifies that node in the Hamiltonian
/// hierarchy so that ensemble calculations can be routed per trajectory.
pub trait ElectronicStructureProvider {
    fn compute(&mut self, q: ArrayView2<f64>, node_path: &[usize]) -> DiabaticBundle;

    /// Batched variant for ensembles: `q` carries one column per
    /// trajectory and the result holds one bundle per column. The default
    /// implementation loops over the columns.
    fn compute_batched(&mut self, q: ArrayView2<f64>) -> Vec<DiabaticBundle> {
        (0..q.ncols())
            .map(|traj| self.compute(q.slice(s![.., traj..traj + 1]), &[0, traj]))
            .collect()
    }

    /// Providers that produce adiabatic data directly may override this;
    /// the default returns an empty bundle, leaving the node unmodified.
    fn compute_adiabatic(&mut self, _q: ArrayView2<f64>, _node_path: &[usize]) -> AdiabaticBundle {
        AdiabaticBundle::default()
    }
}

/// Advances the electronic coefficient matrix over a half-step using the
/// node's current vibronic Hamiltonian in the chosen representation.
pub trait ElectronicPropagator {
    fn propagate(
        &mut self,
        dt: f64,
        c: &mut Array2<c64>,
        node: &HamiltonianNode,
        rep: Representation,
    );
}
