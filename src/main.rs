use anyhow::bail;
use clap::App;
use env_logger::Builder;
use log::LevelFilter;
use ndarray::prelude::*;
use std::io::Write;

use rusty_ehrenfest::initialization::{DynamicsConfiguration, Simulation, SystemData};
use rusty_ehrenfest::interface::{
    ElectronicStructureProvider, HarmonicProvider, SimpleAvoidedCrossing,
};

#[macro_use]
extern crate clap;

fn main() -> anyhow::Result<()> {
    let _matches = App::new(crate_name!())
        .version(crate_version!())
        .about("mixed quantum-classical Ehrenfest dynamics on model Hamiltonians")
        .get_matches();

    // read the dynamics configuration file, if it does not exist in the
    // directory the program initializes the default settings and writes a
    // configuration file to the directory
    let config: DynamicsConfiguration = DynamicsConfiguration::new();

    let log_level: LevelFilter = match config.verbose {
        2 => LevelFilter::Trace,
        1 => LevelFilter::Debug,
        0 => LevelFilter::Info,
        -1 => LevelFilter::Warn,
        -2 => LevelFilter::Error,
        _ => LevelFilter::Info,
    };
    Builder::new()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .filter(None, log_level)
        .init();

    let mut provider: Box<dyn ElectronicStructureProvider> = match config.model.as_str() {
        "harmonic" => Box::new(HarmonicProvider::new(Array::from(
            config.force_constants.clone(),
        ))),
        "sac" => Box::new(SimpleAvoidedCrossing::default()),
        other => bail!("unknown model Hamiltonian '{}'", other),
    };

    let system: SystemData = SystemData::from(config);
    let mut simulation: Simulation = Simulation::new(&system);
    simulation.ehrenfest_dynamics(provider.as_mut())?;

    Ok(())
}
