#![allow(dead_code)]

pub mod constants;
pub mod defaults;
pub mod dynamics;
pub mod hamiltonian;
pub mod initialization;
pub mod interface;
pub mod output;
