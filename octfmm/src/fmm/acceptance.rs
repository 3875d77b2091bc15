//! Acceptance criteria deciding when a box may be replaced by its expansion.
use crate::{fmm::types::AcceptanceCriterion, traits::tree::FmmTree};

impl AcceptanceCriterion {
    /// Size of a box as measured by this criterion.
    fn extent<Tree: FmmTree>(&self, tree: &Tree, index: usize) -> Tree::Scalar {
        match self {
            AcceptanceCriterion::BarnesHut => tree.side_length(index),
            AcceptanceCriterion::Radii => tree.radius(index),
        }
    }

    /// Distance between the circumscribing spheres of two boxes, zero or negative when they
    /// overlap.
    fn gap<Tree: FmmTree>(tree: &Tree, source: usize, target: usize) -> Tree::Scalar {
        (tree.centre(target) - tree.centre(source)).norm()
            - tree.radius(source)
            - tree.radius(target)
    }

    /// Whether a source box and a target box are well separated enough to interact through a
    /// multipole to local translation.
    ///
    /// # Arguments
    /// * `tree` - Tree both boxes belong to.
    /// * `theta` - Acceptance threshold.
    /// * `source` - Index of the source box.
    /// * `target` - Index of the target box.
    pub fn accept_m2l<Tree: FmmTree>(
        &self,
        tree: &Tree,
        theta: Tree::Scalar,
        source: usize,
        target: usize,
    ) -> bool {
        let gap = Self::gap(tree, source, target);
        if gap <= num::zero() {
            return false;
        }

        let size = self.extent(tree, source) + self.extent(tree, target);
        size / gap < theta
    }

    /// Whether the multipole expansion of a source box converges fast enough at every body
    /// of a target box.
    ///
    /// # Arguments
    /// * `tree` - Tree both boxes belong to.
    /// * `theta` - Acceptance threshold.
    /// * `source` - Index of the source box.
    /// * `target` - Index of the target box.
    pub fn accept_m2p<Tree: FmmTree>(
        &self,
        tree: &Tree,
        theta: Tree::Scalar,
        source: usize,
        target: usize,
    ) -> bool {
        let gap = Self::gap(tree, source, target);
        if gap <= num::zero() {
            return false;
        }

        self.extent(tree, source) / gap < theta
    }
}
