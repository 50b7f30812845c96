pub use ehrenfest::*;
pub use electronic_integration::*;

pub mod ehrenfest;
pub mod electronic_integration;
pub mod simulation;
