// config file
pub const CONFIG_FILE_NAME: &str = "ehrenfest.toml";
// restart file
pub const RESTART_FILE_NAME: &str = "dynamics_restart.out";
// print level
pub const VERBOSE: i8 = 0;
// number of nuclear steps
pub const NSTEP: usize = 1000;
// nuclear stepsize in fs
pub const STEPSIZE: f64 = 0.1;
// number of nuclear degrees of freedom
pub const NDOF: usize = 1;
// number of independent trajectories
pub const NTRAJ: usize = 1;
// number of diabatic/adiabatic electronic states
pub const NSTATES: usize = 2;
// initial electronic state
pub const INITIAL_STATE: usize = 0;
// model Hamiltonian used by the binary: "harmonic" or "sac"
pub const MODEL: &str = "sac";
// temperature (K) for Boltzmann sampling of the initial momenta
pub const TEMPERATURE: f64 = 300.0;
// sample initial momenta from a Boltzmann distribution instead of the input values
pub const USE_BOLTZMANN_MOMENTA: bool = false;
// parameters of the simple-avoided-crossing model (Tully I)
pub const SAC_A: f64 = 0.01;
pub const SAC_B: f64 = 1.6;
pub const SAC_C: f64 = 0.005;
pub const SAC_D: f64 = 1.0;

pub const PRINT_RESTART: bool = true;
pub const PRINT_COORDINATES: bool = true;
pub const PRINT_ENERGIES: bool = true;

// Energy gaps below this threshold are treated as degenerate when the
// adiabatic derivative couplings are assembled. The coupling is ill-defined
// at an exact crossing, so the corresponding entry is set to zero there.
pub const DEGENERACY_THRESHOLD: f64 = 1.0e-10;
