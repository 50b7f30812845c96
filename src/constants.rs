// conversion from femtoseconds to atomic time units
pub const FS_TO_AU: f64 = 41.341374575751;
// Boltzmann constant in Hartree / K
pub const K_BOLTZMANN: f64 = 3.166811563e-6;
