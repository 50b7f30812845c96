use crate::hamiltonian::HamiltonianError;
use crate::interface::{AdiabaticBundle, DiabaticBundle};
use ndarray::prelude::*;
use ndarray_linalg::c64;

/// A single node of the Hamiltonian hierarchy. The root node (level 0)
/// describes either a single trajectory or the common topology of an
/// ensemble; each child (level 1) holds the electronic-structure data of
/// one trajectory. Parent/child links are arena indices managed by
/// [HamiltonianTree](crate::hamiltonian::HamiltonianTree).
pub struct HamiltonianNode {
    pub level: usize,
    /// number of adiabatic states
    pub nadi: usize,
    /// number of diabatic states
    pub ndia: usize,
    /// number of nuclear degrees of freedom
    pub nnucl: usize,
    /// diabatic Hamiltonian (ndia x ndia)
    pub ham_dia: Array2<c64>,
    /// overlap of the diabatic states (ndia x ndia)
    pub ovlp_dia: Array2<c64>,
    /// adiabatic Hamiltonian, diagonal after the transform (nadi x nadi)
    pub ham_adi: Array2<c64>,
    /// diabatic-to-adiabatic transform U with U^H . ovlp_dia . U = I
    pub basis_transform: Array2<c64>,
    /// derivatives of ham_dia w.r.t. each nuclear DOF
    pub d1ham_dia: Vec<Array2<c64>>,
    /// derivatives of ham_adi w.r.t. each nuclear DOF (state-diagonal)
    pub d1ham_adi: Vec<Array2<c64>>,
    /// derivative couplings in the diabatic basis
    pub dc1_dia: Vec<Array2<c64>>,
    /// derivative couplings in the adiabatic basis, zero on the diagonal
    pub dc1_adi: Vec<Array2<c64>>,
    /// scalar time-derivative couplings dc1 . (p / m)
    pub nac_dia: Array2<c64>,
    pub nac_adi: Array2<c64>,
    /// vibronic Hamiltonians ham - i . nac
    pub hvib_dia: Array2<c64>,
    pub hvib_adi: Array2<c64>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

impl HamiltonianNode {
    /// Creates a node with all electronic and derivative storage allocated.
    pub fn new(ndia: usize, nadi: usize, nnucl: usize) -> HamiltonianNode {
        let mut node = HamiltonianNode::electronic_only(ndia, nadi, nnucl);
        node.d1ham_dia = vec![Array2::zeros((ndia, ndia)); nnucl];
        node.d1ham_adi = vec![Array2::zeros((nadi, nadi)); nnucl];
        node.dc1_dia = vec![Array2::zeros((ndia, ndia)); nnucl];
        node.dc1_adi = vec![Array2::zeros((nadi, nadi)); nnucl];
        node
    }

    /// Creates a node without the per-DOF derivative and coupling arrays.
    /// Such a node can run the basis transform (`der_lvl == 0`) but fails
    /// validation for any derivative-level computation.
    pub fn electronic_only(ndia: usize, nadi: usize, nnucl: usize) -> HamiltonianNode {
        let mut ovlp_dia: Array2<c64> = Array2::zeros((ndia, ndia));
        for i in 0..ndia {
            ovlp_dia[[i, i]] = c64::new(1.0, 0.0);
        }

        HamiltonianNode {
            level: 0,
            nadi,
            ndia,
            nnucl,
            ham_dia: Array2::zeros((ndia, ndia)),
            ovlp_dia,
            ham_adi: Array2::zeros((nadi, nadi)),
            basis_transform: Array2::zeros((ndia, nadi)),
            d1ham_dia: Vec::new(),
            d1ham_adi: Vec::new(),
            dc1_dia: Vec::new(),
            dc1_adi: Vec::new(),
            nac_dia: Array2::zeros((ndia, ndia)),
            nac_adi: Array2::zeros((nadi, nadi)),
            hvib_dia: Array2::zeros((ndia, ndia)),
            hvib_adi: Array2::zeros((nadi, nadi)),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Checks that every matrix a computation at the requested derivative
    /// level touches is allocated. The electronic matrices are guaranteed
    /// by construction; only the per-DOF arrays can be missing.
    pub fn validate(&self, der_lvl: usize) -> Result<(), HamiltonianError> {
        if der_lvl >= 1 {
            if self.d1ham_dia.len() != self.nnucl {
                return Err(HamiltonianError::NotAllocated {
                    field: "d1ham_dia",
                    dof: self.d1ham_dia.len(),
                });
            }
            if self.d1ham_adi.len() != self.nnucl {
                return Err(HamiltonianError::NotAllocated {
                    field: "d1ham_adi",
                    dof: self.d1ham_adi.len(),
                });
            }
            if self.dc1_dia.len() != self.nnucl {
                return Err(HamiltonianError::NotAllocated {
                    field: "dc1_dia",
                    dof: self.dc1_dia.len(),
                });
            }
            if self.dc1_adi.len() != self.nnucl {
                return Err(HamiltonianError::NotAllocated {
                    field: "dc1_adi",
                    dof: self.dc1_adi.len(),
                });
            }
        }
        Ok(())
    }

    /// Copies the fields present in a diabatic bundle into the node.
    /// Absent fields leave the corresponding storage unmodified.
    pub fn apply_diabatic(&mut self, bundle: DiabaticBundle) {
        if let Some(ham_dia) = bundle.ham_dia {
            self.ham_dia = ham_dia;
        }
        if let Some(ovlp_dia) = bundle.ovlp_dia {
            self.ovlp_dia = ovlp_dia;
        }
        if let Some(d1ham_dia) = bundle.d1ham_dia {
            self.d1ham_dia = d1ham_dia;
        }
        if let Some(dc1_dia) = bundle.dc1_dia {
            self.dc1_dia = dc1_dia;
        }
    }

    /// Copies the fields present in an adiabatic bundle into the node.
    pub fn apply_adiabatic(&mut self, bundle: AdiabaticBundle) {
        if let Some(ham_adi) = bundle.ham_adi {
            self.ham_adi = ham_adi;
        }
        if let Some(d1ham_adi) = bundle.d1ham_adi {
            self.d1ham_adi = d1ham_adi;
        }
        if let Some(dc1_adi) = bundle.dc1_adi {
            self.dc1_adi = dc1_adi;
        }
    }
}
