//! # Adaptive Octrees
//!
//! Bodies are sorted along a Morton (Z-order) curve and bucketed into an adaptive octree stored
//! as a flat array of boxes in level then Morton order. Trees can be built top-down, by
//! recursively splitting boxes that hold more than `n_crit` bodies, or bottom-up, by bucketing
//! bodies on the finest level and merging siblings. Both produce identical trees.
//!
//! # Example Usage
//! ```
//! use octfmm::tree::types::{Octree, Point, TreeConstruction};
//!
//! let points = vec![Point([0.1, 0.2, 0.3]), Point([0.9, 0.8, 0.7]), Point([0.4, 0.4, 0.4])];
//! let charges = vec![1.0, 1.0, 1.0];
//!
//! let tree = Octree::from_points(&points, &charges, TreeConstruction::TopDown, 1, 10).unwrap();
//! assert_eq!(tree.n_leaves, 3);
//! ```
pub mod constants;
pub mod types;

mod bounding_box;
mod domain;
pub mod morton;
mod octree;
mod point;
