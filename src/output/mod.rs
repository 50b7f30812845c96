pub use write_data::*;

pub mod write_data;
