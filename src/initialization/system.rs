use crate::initialization::velocities::initialize_momenta;
use crate::initialization::DynamicsConfiguration;
use ndarray::prelude::*;

/// Nuclear setup of a simulation: masses and the initial phase space of
/// all trajectories, expanded from the configuration lists.
pub struct SystemData {
    pub config: DynamicsConfiguration,
    pub ndof: usize,
    pub ntraj: usize,
    pub masses: Array1<f64>,
    pub inv_masses: Array1<f64>,
    pub coordinates: Array2<f64>,
    pub momenta: Array2<f64>,
}

impl From<DynamicsConfiguration> for SystemData {
    fn from(config: DynamicsConfiguration) -> Self {
        let ndof = config.ndof;
        let ntraj = config.ntraj;

        let masses: Array1<f64> = if config.masses.len() == ndof {
            Array::from(config.masses.clone())
        } else {
            Array1::ones(ndof)
        };
        let inv_masses: Array1<f64> = masses.mapv(|mass| 1.0 / mass);

        let coordinates: Array2<f64> = expand_columns(&config.initial_coordinates, ndof, ntraj);
        let momenta: Array2<f64> = if config.boltzmann_momenta {
            initialize_momenta(masses.view(), config.temperature, ntraj)
        } else {
            expand_columns(&config.initial_momenta, ndof, ntraj)
        };

        SystemData {
            config,
            ndof,
            ntraj,
            masses,
            inv_masses,
            coordinates,
            momenta,
        }
    }
}

/// Expands a flat input list into an ndof x ntraj matrix: ndof values are
/// broadcast to every trajectory column, ndof * ntraj values fill the
/// columns one trajectory at a time, anything else gives zeros.
fn expand_columns(values: &[f64], ndof: usize, ntraj: usize) -> Array2<f64> {
    let mut matrix: Array2<f64> = Array2::zeros((ndof, ntraj));
    if values.len() == ndof {
        for traj in 0..ntraj {
            for dof in 0..ndof {
                matrix[[dof, traj]] = values[dof];
            }
        }
    } else if values.len() == ndof * ntraj {
        for traj in 0..ntraj {
            for dof in 0..ndof {
                matrix[[dof, traj]] = values[traj * ndof + dof];
            }
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_initial_conditions_are_broadcast() {
        let matrix = expand_columns(&[0.5, -1.0], 2, 3);
        for traj in 0..3 {
            assert_eq!(matrix[[0, traj]], 0.5);
            assert_eq!(matrix[[1, traj]], -1.0);
        }
    }

    #[test]
    fn per_trajectory_initial_conditions_fill_columns() {
        let matrix = expand_columns(&[1.0, 2.0, 3.0, 4.0], 2, 2);
        assert_eq!(matrix[[0, 0]], 1.0);
        assert_eq!(matrix[[1, 0]], 2.0);
        assert_eq!(matrix[[0, 1]], 3.0);
        assert_eq!(matrix[[1, 1]], 4.0);
    }
}
