use crate::defaults::*;
use crate::interface::Representation;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_verbose() -> i8 {
    VERBOSE
}
fn default_nstep() -> usize {
    NSTEP
}
fn default_stepsize() -> f64 {
    STEPSIZE
}
fn default_ndof() -> usize {
    NDOF
}
fn default_ntraj() -> usize {
    NTRAJ
}
fn default_nstates() -> usize {
    NSTATES
}
fn default_initial_state() -> usize {
    INITIAL_STATE
}
fn default_representation() -> Representation {
    Representation::Adiabatic
}
fn default_model() -> String {
    String::from(MODEL)
}
fn default_temperature() -> f64 {
    TEMPERATURE
}
fn default_boltzmann_momenta() -> bool {
    USE_BOLTZMANN_MOMENTA
}
fn default_masses() -> Vec<f64> {
    Vec::new()
}
fn default_initial_coordinates() -> Vec<f64> {
    Vec::new()
}
fn default_initial_momenta() -> Vec<f64> {
    Vec::new()
}
fn default_force_constants() -> Vec<f64> {
    vec![1.0]
}
fn default_print_restart() -> bool {
    PRINT_RESTART
}
fn default_print_coordinates() -> bool {
    PRINT_COORDINATES
}
fn default_print_energies() -> bool {
    PRINT_ENERGIES
}

#[derive(Serialize, Deserialize, Clone)]
pub struct DynamicsConfiguration {
    #[serde(default = "default_verbose")]
    pub verbose: i8,
    #[serde(default = "default_nstep")]
    pub nstep: usize,
    #[serde(default = "default_stepsize")]
    pub stepsize: f64,
    #[serde(default = "default_ndof")]
    pub ndof: usize,
    #[serde(default = "default_ntraj")]
    pub ntraj: usize,
    #[serde(default = "default_nstates")]
    pub nstates: usize,
    #[serde(default = "default_initial_state")]
    pub initial_state: usize,
    #[serde(default = "default_representation")]
    pub representation: Representation,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_boltzmann_momenta")]
    pub boltzmann_momenta: bool,
    /// masses per nuclear DOF; an empty list means unit masses
    #[serde(default = "default_masses")]
    pub masses: Vec<f64>,
    /// initial coordinates, either ndof values shared by all trajectories
    /// or ndof * ntraj values in column-major trajectory order
    #[serde(default = "default_initial_coordinates")]
    pub initial_coordinates: Vec<f64>,
    #[serde(default = "default_initial_momenta")]
    pub initial_momenta: Vec<f64>,
    /// force constants of the harmonic model
    #[serde(default = "default_force_constants")]
    pub force_constants: Vec<f64>,
    #[serde(default = "default_print_restart")]
    pub print_restart: bool,
    #[serde(default = "default_print_coordinates")]
    pub print_coordinates: bool,
    #[serde(default = "default_print_energies")]
    pub print_energies: bool,
}

impl DynamicsConfiguration {
    /// Reads the configuration file from the working directory. If it does
    /// not exist the default settings are used and written to disk so the
    /// user can see all available options.
    pub fn new() -> Self {
        let config_file_path: &Path = Path::new(CONFIG_FILE_NAME);
        let mut config_string: String = if config_file_path.exists() {
            fs::read_to_string(config_file_path).expect("Unable to read config file")
        } else {
            String::from("")
        };
        let config: Self = toml::from_str(&config_string).unwrap();
        if !config_file_path.exists() {
            config_string = toml::to_string(&config).unwrap();
            fs::write(config_file_path, config_string).expect("Unable to write config file");
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_falls_back_to_defaults() {
        let config: DynamicsConfiguration = toml::from_str("").unwrap();
        assert_eq!(config.nstep, NSTEP);
        assert_eq!(config.ntraj, NTRAJ);
        assert_eq!(config.representation, Representation::Adiabatic);
        assert!(config.masses.is_empty());
    }

    #[test]
    fn representation_parses_from_lowercase() {
        let config: DynamicsConfiguration =
            toml::from_str("representation = \"diabatic\"").unwrap();
        assert_eq!(config.representation, Representation::Diabatic);
    }
}
