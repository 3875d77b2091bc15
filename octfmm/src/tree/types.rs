//! Data structures for adaptive octrees.
use std::{fmt, ops::Range};

/// A point in three dimensional space.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point<T>(pub [T; 3]);

/// Axis aligned box spanned by the componentwise extrema of a point set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingBox<T> {
    /// Componentwise minimum.
    pub min: Point<T>,

    /// Componentwise maximum.
    pub max: Point<T>,
}

/// Represents a three-dimensional box characterized by its origin and side-length along the Cartesian axes.
///
/// Domains derived from a [`BoundingBox`] are always cubic.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Domain<T> {
    /// The lower left corner of the domain, minimum of x, y, z values.
    pub origin: [T; 3],

    /// The extent of the domain along the x, y, z axes respectively.
    pub side_length: [T; 3],
}

/// Represents a Morton key associated with a node within an octree structure.
///
/// A Morton key, or Z-order curve value, encodes the position of a box into a single integer
/// while preserving locality. The key is stored alongside its 'anchor', the integer coordinates
/// of the lower left corner of the box with respect to the deepest level of the octree. The
/// lowest bits of the key store its level.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct MortonKey {
    /// The anchor is the index coordinate of the key, with respect to the origin of the Domain.
    pub anchor: [u64; 3],

    /// The Morton encoded anchor.
    pub morton: u64,
}

/// A point carrying a charge, together with its position in the input.
#[derive(Debug, Clone)]
pub struct Body<T, C> {
    /// Position of the body.
    pub point: Point<T>,

    /// Source strength of the body.
    pub charge: C,

    /// Position of the body in the user supplied input.
    pub index: usize,

    /// Key of the box on the deepest level enclosing this body.
    pub key: MortonKey,
}

/// A box of an octree, stored in a flat array.
#[derive(Debug, Clone, PartialEq)]
pub struct OctreeBox {
    /// Position of this box in the flat box array.
    pub index: usize,

    /// Morton key of the box.
    pub key: MortonKey,

    /// Index of the parent, `None` for the root.
    pub parent: Option<usize>,

    /// Indices of the children, empty iff the box is a leaf.
    pub children: Range<usize>,

    /// Indices of the bodies contained in this box and its descendants.
    pub bodies: Range<usize>,
}

/// Strategy used to build an octree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TreeConstruction {
    /// Recursively split boxes with too many bodies.
    #[default]
    TopDown,

    /// Bucket bodies on the finest level and merge siblings upwards.
    BottomUp,
}

impl fmt::Display for TreeConstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeConstruction::TopDown => write!(f, "top-down"),
            TreeConstruction::BottomUp => write!(f, "bottom-up"),
        }
    }
}

/// An adaptive octree over a set of bodies.
///
/// The tree owns its bodies, sorted in Morton order, and a flat array of boxes in level then
/// Morton order. Boxes refer to their parent, children and bodies by index.
///
/// # Fields
/// - `bounding_box` - Bounding box the tree was created over.
///
/// - `domain` - Cubic domain derived from the bounding box, used for Morton encoding.
///
/// - `bodies` - Bodies sorted by the Morton key of their enclosing box on the deepest level.
///
/// - `boxes` - All boxes, the root is always at index 0.
///
/// - `levels` - For each level, the range of box indices at that level.
///
/// - `depth` - Deepest level reached by any box.
///
/// - `n_leaves` - Number of leaf boxes.
///
/// - `n_crit` - Maximum number of bodies per leaf, unless the maximum level is reached.
///
/// - `max_level` - Level beyond which boxes are never split.
///
/// - `construction` - How the tree was built, `None` until `construct` has been called.
#[derive(Debug, Clone)]
pub struct Octree<T, C> {
    /// Bounding box the tree was created over.
    pub bounding_box: BoundingBox<T>,

    /// Cubic domain used for Morton encoding.
    pub domain: Domain<T>,

    /// Bodies in Morton order.
    pub bodies: Vec<Body<T, C>>,

    /// Boxes in level then Morton order.
    pub boxes: Vec<OctreeBox>,

    /// Box index range of each level.
    pub levels: Vec<Range<usize>>,

    /// Deepest level reached.
    pub depth: u64,

    /// Number of leaves.
    pub n_leaves: usize,

    /// Maximum number of bodies per leaf.
    pub n_crit: usize,

    /// Maximum refinement level.
    pub max_level: u64,

    /// Construction mode, set once the tree has been built.
    pub construction: Option<TreeConstruction>,
}
