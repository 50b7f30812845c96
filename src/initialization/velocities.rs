use crate::constants;
use ndarray::prelude::*;
use rand_distr::{Distribution, Normal};

/// Samples initial momenta from a Boltzmann distribution: every momentum
/// component is drawn as p ~ N(0, sqrt(m k_B T)).
pub fn initialize_momenta(
    masses: ArrayView1<f64>,
    temperature: f64,
    ntraj: usize,
) -> Array2<f64> {
    let dist = Normal::new(0.0, f64::sqrt(constants::K_BOLTZMANN * temperature))
        .expect("Error regarding the distribution!");
    let ndof = masses.len();

    let mut momenta: Array2<f64> = Array2::zeros((ndof, ntraj));
    for traj in 0..ntraj {
        for dof in 0..ndof {
            momenta[[dof, traj]] =
                f64::sqrt(masses[dof]) * dist.sample(&mut rand::thread_rng());
        }
    }
    momenta
}
