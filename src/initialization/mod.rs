pub use io::*;
pub use simulation::*;
pub use system::*;

pub mod io;
pub mod simulation;
pub mod system;
pub mod velocities;
