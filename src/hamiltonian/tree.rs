use crate::hamiltonian::HamiltonianNode;
use crate::interface::ElectronicStructureProvider;
use itertools::Itertools;
use log::warn;
use ndarray::prelude::*;

/// Arena holding the Hamiltonian hierarchy. Nodes refer to each other by
/// index; the root sits at index 0. For an ensemble the root carries one
/// child per trajectory at level 1.
pub struct HamiltonianTree {
    nodes: Vec<HamiltonianNode>,
}

impl HamiltonianTree {
    /// A tree with a single root node, for one-trajectory dynamics.
    pub fn single(ndia: usize, nadi: usize, nnucl: usize) -> HamiltonianTree {
        HamiltonianTree {
            nodes: vec![HamiltonianNode::new(ndia, nadi, nnucl)],
        }
    }

    /// A root with `ntraj` children of identical dimensions, one per
    /// trajectory of an ensemble.
    pub fn ensemble(ndia: usize, nadi: usize, nnucl: usize, ntraj: usize) -> HamiltonianTree {
        let mut nodes: Vec<HamiltonianNode> = Vec::with_capacity(ntraj + 1);
        nodes.push(HamiltonianNode::new(ndia, nadi, nnucl));
        for traj in 0..ntraj {
            let mut child = HamiltonianNode::new(ndia, nadi, nnucl);
            child.level = 1;
            child.parent = Some(0);
            nodes.push(child);
            nodes[0].children.push(traj + 1);
        }
        HamiltonianTree { nodes }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, idx: usize) -> &HamiltonianNode {
        &self.nodes[idx]
    }

    pub fn node_mut(&mut self, idx: usize) -> &mut HamiltonianNode {
        &mut self.nodes[idx]
    }

    pub fn root(&self) -> &HamiltonianNode {
        &self.nodes[0]
    }

    pub fn root_mut(&mut self) -> &mut HamiltonianNode {
        &mut self.nodes[0]
    }

    /// Arena index of the root's child handling trajectory `traj`.
    pub fn child_of_root(&self, traj: usize) -> usize {
        self.nodes[0].children[traj]
    }

    /// Path of a node in the hierarchy: the root ordinal followed by the
    /// child position at every level down to the node. Passed to external
    /// providers so that ensemble calculations can be routed per child.
    pub fn full_id(&self, idx: usize) -> Vec<usize> {
        let mut path: Vec<usize> = Vec::new();
        let mut cur = idx;
        while let Some(parent) = self.nodes[cur].parent {
            let pos = self.nodes[parent]
                .children
                .iter()
                .position(|&child| child == cur)
                .expect("arena parent/child links are inconsistent");
            path.push(pos);
            cur = parent;
        }
        path.push(0);
        path.reverse();
        path
    }

    /// Which column of the phase-space matrices belongs to the node with
    /// the given path: the root reads column 0, a child its trajectory.
    pub(crate) fn trajectory_column(&self, path: &[usize]) -> usize {
        if path.len() < 2 {
            0
        } else {
            path[path.len() - 1]
        }
    }

    /// Refreshes the diabatic matrices at the requested hierarchy level by
    /// calling the external provider once per target node. Each node
    /// receives its own column of `q` and its path in the hierarchy.
    pub fn compute_diabatic(
        &mut self,
        provider: &mut dyn ElectronicStructureProvider,
        q: ArrayView2<f64>,
        target_level: usize,
    ) {
        self.compute_diabatic_at(0, provider, q, target_level)
    }

    fn compute_diabatic_at(
        &mut self,
        idx: usize,
        provider: &mut dyn ElectronicStructureProvider,
        q: ArrayView2<f64>,
        target_level: usize,
    ) {
        let level = self.nodes[idx].level;
        if level == target_level {
            let path = self.full_id(idx);
            let col = self.trajectory_column(&path);
            let bundle = provider.compute(q.slice(s![.., col..col + 1]), &path);
            self.nodes[idx].apply_diabatic(bundle);
        } else if target_level > level {
            for child in self.nodes[idx].children.clone() {
                self.compute_diabatic_at(child, provider, q, target_level);
            }
        } else {
            warn!(
                "compute_diabatic: cannot evaluate level {} from a node at level {}",
                target_level, level
            );
        }
    }

    /// Batched diabatic refresh for an ensemble: one provider call fills
    /// all level-1 children, `q` carrying one column per trajectory.
    pub fn compute_diabatic_batched(
        &mut self,
        provider: &mut dyn ElectronicStructureProvider,
        q: ArrayView2<f64>,
    ) {
        let bundles = provider.compute_batched(q);
        let children = self.nodes[0].children.clone();
        for (child, bundle) in children.into_iter().zip_eq(bundles) {
            self.nodes[child].apply_diabatic(bundle);
        }
    }
}
