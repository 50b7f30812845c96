use crate::constants;
use crate::defaults::RESTART_FILE_NAME;
use ndarray::prelude::*;
use ndarray_linalg::c64;
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Serialize, Deserialize, Clone)]
pub struct EnergyOutput {
    pub time: f64,
    pub kinetic_energy: f64,
    pub potential_energy: f64,
    pub total_energy: f64,
}

impl EnergyOutput {
    pub fn new(time: f64, kinetic_energy: f64, potential_energy: f64) -> EnergyOutput {
        EnergyOutput {
            time: time / constants::FS_TO_AU,
            kinetic_energy,
            potential_energy,
            total_energy: kinetic_energy + potential_energy,
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct RestartOutput {
    pub coordinates: Array2<f64>,
    pub momenta: Array2<f64>,
    pub coefficients_real: Vec<Array2<f64>>,
    pub coefficients_imag: Vec<Array2<f64>>,
}

impl RestartOutput {
    pub fn new(
        coordinates: ArrayView2<f64>,
        momenta: ArrayView2<f64>,
        coefficients: &[Array2<c64>],
    ) -> RestartOutput {
        RestartOutput {
            coordinates: coordinates.to_owned(),
            momenta: momenta.to_owned(),
            coefficients_real: coefficients.iter().map(|c| c.mapv(|val| val.re)).collect(),
            coefficients_imag: coefficients.iter().map(|c| c.mapv(|val| val.im)).collect(),
        }
    }
}

fn append_or_create(file_path: &Path, content: &str) {
    if file_path.exists() {
        let file = OpenOptions::new().append(true).open(file_path).unwrap();
        let mut stream = BufWriter::new(file);
        stream.write_fmt(format_args!("{}", content)).unwrap();
        stream.flush().unwrap();
    } else {
        fs::write(file_path, content).expect("Unable to write output file");
    }
}

pub fn write_energies(energies: &EnergyOutput) {
    let file_path: &Path = Path::new("energies.dat");
    let mut string: String = energies.time.to_string();
    string.push_str("\t");
    string.push_str(&energies.kinetic_energy.to_string());
    string.push_str("\t");
    string.push_str(&energies.potential_energy.to_string());
    string.push_str("\t");
    string.push_str(&energies.total_energy.to_string());
    string.push_str("\n");
    append_or_create(file_path, &string);
}

pub fn write_coordinates(time: f64, coordinates: ArrayView2<f64>) {
    let file_path: &Path = Path::new("coordinates.dat");
    let mut string: String = (time / constants::FS_TO_AU).to_string();
    for traj in 0..coordinates.ncols() {
        for dof in 0..coordinates.nrows() {
            string.push_str("\t");
            string.push_str(&coordinates[[dof, traj]].to_string());
        }
    }
    string.push_str("\n");
    append_or_create(file_path, &string);
}

pub fn write_restart(restart: &RestartOutput) {
    let file_path: &Path = Path::new(RESTART_FILE_NAME);
    let restart: String = toml::to_string(restart).unwrap();
    fs::write(file_path, restart).expect("Unable to write restart file");
}
