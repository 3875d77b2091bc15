//! Tree Traits
use std::ops::Range;

use crate::{
    traits::general::Scalar,
    tree::types::{Body, OctreeBox, Point},
};

/// Interface for the cubic computational domain a tree is defined over.
pub trait Domain {
    /// Scalar type
    type Scalar: Scalar;

    /// Lower left corner of the domain.
    fn origin(&self) -> &[Self::Scalar; 3];

    /// Extent of the domain along each axis.
    fn side_length(&self) -> &[Self::Scalar; 3];
}

/// Interface for a node of a hierarchical tree, addressed independently of any storage.
pub trait TreeNode
where
    Self: Sized,
{
    /// Copy of the raw encoded node.
    fn raw(&self) -> u64;

    /// Level of the node, the root is at level 0.
    fn level(&self) -> u64;

    /// Parent of the node.
    fn parent(&self) -> Self;

    /// Children of the node, in sorted order.
    fn children(&self) -> Vec<Self>;

    /// Physical centre of the node with respect to a domain.
    fn centre<D: Domain>(&self, domain: &D) -> Point<D::Scalar>;

    /// Physical side length of the node with respect to a cubic domain.
    fn side_length<D: Domain>(&self, domain: &D) -> D::Scalar;
}

/// Read only interface of a flat tree used during evaluation.
///
/// Boxes are addressed by their position in a flat array stored in level then Morton order, so
/// that parents always precede their children. Bodies are addressed by their position in the
/// tree's sorted body array.
pub trait FmmTree {
    /// Scalar type
    type Scalar: Scalar;

    /// Charge carried by each body.
    type Charge;

    /// Node type addressing boxes.
    type Node: TreeNode;

    /// Domain type of the tree.
    type Domain: Domain<Scalar = Self::Scalar>;

    /// Index of the root box.
    fn root(&self) -> usize;

    /// Total number of boxes.
    fn n_boxes(&self) -> usize;

    /// Number of leaf boxes.
    fn n_leaves(&self) -> usize;

    /// Total number of bodies.
    fn n_bodies(&self) -> usize;

    /// Deepest level reached by any box.
    fn depth(&self) -> u64;

    /// Domain the tree is defined over.
    fn domain(&self) -> &Self::Domain;

    /// Box at a given index.
    ///
    /// # Arguments
    /// * `index` - Index of the box being queried.
    fn node(&self, index: usize) -> Option<&OctreeBox>;

    /// All boxes in level then Morton order.
    fn all_nodes(&self) -> &[OctreeBox];

    /// Key of a box at a given index.
    fn key(&self, index: usize) -> Option<&Self::Node>;

    /// Indices of the children of a box, empty for leaves.
    fn children(&self, index: usize) -> Range<usize>;

    /// Whether a box is a leaf.
    fn is_leaf(&self, index: usize) -> bool {
        self.children(index).is_empty()
    }

    /// Indices of the boxes at a given level.
    fn level(&self, level: u64) -> Option<Range<usize>>;

    /// Bodies contained in a box, for internal boxes the bodies of the whole subtree.
    fn bodies(&self, index: usize) -> &[Body<Self::Scalar, Self::Charge>];

    /// Range of body indices contained in a box.
    fn body_range(&self, index: usize) -> Range<usize>;

    /// All bodies in sorted order.
    fn all_bodies(&self) -> &[Body<Self::Scalar, Self::Charge>];

    /// Physical centre of a box.
    fn centre(&self, index: usize) -> Point<Self::Scalar>;

    /// Physical side length of a box.
    fn side_length(&self, index: usize) -> Self::Scalar;

    /// Radius of the sphere circumscribing a box.
    fn radius(&self, index: usize) -> Self::Scalar;
}
