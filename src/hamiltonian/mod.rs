pub use adiabatic::*;
pub use couplings::*;
pub use eigen::*;
pub use node::*;
pub use tree::*;

pub mod adiabatic;
pub mod couplings;
pub mod eigen;
pub mod node;
pub mod tree;

use ndarray::prelude::*;
use ndarray_linalg::c64;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HamiltonianError {
    /// A derivative or coupling array that a computation needs was not
    /// allocated when the node was built. This is a setup bug and the
    /// driver treats it as unrecoverable.
    #[error("matrix storage `{field}` is not allocated for nuclear DOF {dof}")]
    NotAllocated { field: &'static str, dof: usize },
    /// The diabatic overlap matrix has a (near-)zero eigenvalue and cannot
    /// define a generalized-orthonormal adiabatic basis.
    #[error("the diabatic overlap matrix is singular")]
    SingularOverlap,
    #[error("eigensolver failed: {0}")]
    Eigensolver(#[from] ndarray_linalg::error::LinalgError),
}

/// Hermitian conjugate of a complex matrix.
pub fn hconj(mat: ArrayView2<c64>) -> Array2<c64> {
    mat.t().mapv(|val| val.conj())
}

pub fn trace(mat: ArrayView2<c64>) -> c64 {
    mat.diag().sum()
}

/// Expectation value Tr(C^H . A . C) of the operator `a` under the
/// electronic coefficient matrix `c`.
pub fn expectation(c: ArrayView2<c64>, a: ArrayView2<c64>) -> c64 {
    trace(hconj(c).dot(&a).dot(&c).view())
}
