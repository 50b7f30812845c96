use crate::dynamics::{ehrenfest_step0, ehrenfest_step1};
use crate::hamiltonian::{expectation, HamiltonianNode};
use crate::initialization::Simulation;
use crate::interface::{ElectronicStructureProvider, Representation};
use crate::output::*;
use anyhow::Context;
use log::info;
use ndarray::prelude::*;
use ndarray_linalg::c64;

impl Simulation {
    /// Runs the full Ehrenfest dynamics: an initial electronic-structure
    /// evaluation followed by `nstep` leapfrog steps with per-step energy
    /// bookkeeping and output.
    pub fn ehrenfest_dynamics(
        &mut self,
        provider: &mut dyn ElectronicStructureProvider,
    ) -> anyhow::Result<()> {
        self.initialize_ehrenfest(provider)
            .context("initial electronic structure evaluation failed")?;

        let mut time: f64 = 0.0;
        self.write_output(time);

        for step in 1..=self.config.nstep {
            self.ehrenfest_step(provider)
                .with_context(|| format!("Ehrenfest step {} failed", step))?;
            time += self.stepsize;

            self.kinetic_energy = self.get_kinetic_energy();
            let potential: f64 = self.get_potential_energy();
            info!(
                "step {:6}  E_kin = {:14.10}  E_pot = {:14.10}  E_tot = {:14.10}",
                step,
                self.kinetic_energy,
                potential,
                self.kinetic_energy + potential
            );
            self.write_output(time);
        }
        Ok(())
    }

    /// First evaluation of the diabatic matrices and the adiabatic
    /// transform at the initial geometry.
    pub fn initialize_ehrenfest(
        &mut self,
        provider: &mut dyn ElectronicStructureProvider,
    ) -> anyhow::Result<()> {
        let level = self.target_level();
        self.tree
            .compute_diabatic(provider, self.coordinates.view(), level);
        self.tree.compute_adiabatic(1, level)?;
        self.kinetic_energy = self.get_kinetic_energy();
        Ok(())
    }

    pub fn ehrenfest_step(
        &mut self,
        provider: &mut dyn ElectronicStructureProvider,
    ) -> anyhow::Result<()> {
        if self.ntraj == 1 {
            ehrenfest_step0(
                self.stepsize,
                &mut self.coordinates,
                &mut self.momenta,
                self.inv_masses.view(),
                &mut self.coefficients[0],
                &mut self.tree,
                provider,
                &mut self.propagator,
                self.rep,
            )?;
        } else {
            ehrenfest_step1(
                self.stepsize,
                &mut self.coordinates,
                &mut self.momenta,
                self.inv_masses.view(),
                &mut self.coefficients,
                &mut self.tree,
                provider,
                &mut self.propagator,
                self.rep,
            )?;
        }
        Ok(())
    }

    pub fn get_kinetic_energy(&self) -> f64 {
        let mut energy: f64 = 0.0;
        for traj in 0..self.ntraj {
            for dof in 0..self.ndof {
                energy +=
                    0.5 * self.momenta[[dof, traj]] * self.momenta[[dof, traj]]
                        * self.inv_masses[dof];
            }
        }
        energy / self.ntraj as f64
    }

    /// Trajectory-averaged electronic energy, the expectation value of the
    /// Hamiltonian in the active representation under the current
    /// coefficients.
    pub fn get_potential_energy(&self) -> f64 {
        let mut energy: f64 = 0.0;
        for traj in 0..self.ntraj {
            let node = self.trajectory_node(traj);
            let ham: &Array2<c64> = match self.rep {
                Representation::Diabatic => &node.ham_dia,
                Representation::Adiabatic => &node.ham_adi,
            };
            let c = &self.coefficients[traj];
            let norm: f64 = expectation(c.view(), Array2::eye(ham.nrows()).view()).re;
            energy += expectation(c.view(), ham.view()).re / norm;
        }
        energy / self.ntraj as f64
    }

    fn trajectory_node(&self, traj: usize) -> &HamiltonianNode {
        if self.ntraj == 1 {
            self.tree.root()
        } else {
            self.tree.node(self.tree.child_of_root(traj))
        }
    }

    fn write_output(&self, time: f64) {
        if self.config.print_energies {
            let energies = EnergyOutput::new(
                time,
                self.kinetic_energy,
                self.get_potential_energy(),
            );
            write_energies(&energies);
        }
        if self.config.print_coordinates {
            write_coordinates(time, self.coordinates.view());
        }
        if self.config.print_restart {
            let restart = RestartOutput::new(
                self.coordinates.view(),
                self.momenta.view(),
                &self.coefficients,
            );
            write_restart(&restart);
        }
    }
}
