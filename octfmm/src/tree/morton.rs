//! Implementations of constructors and transformation methods for Morton keys.
use std::{
    cmp::Ordering,
    collections::HashSet,
    hash::{Hash, Hasher},
};

use itertools::izip;

use crate::{
    traits::{
        general::Scalar,
        tree::{Domain as DomainTrait, TreeNode},
    },
    tree::{
        constants::{
            BYTE_DISPLACEMENT, BYTE_MASK, DEEPEST_LEVEL, LEVEL_DISPLACEMENT, LEVEL_MASK,
            LEVEL_SIZE, NINE_BIT_MASK, X_LOOKUP_DECODE, X_LOOKUP_ENCODE, Y_LOOKUP_DECODE,
            Y_LOOKUP_ENCODE, Z_LOOKUP_DECODE, Z_LOOKUP_ENCODE,
        },
        types::{Domain, MortonKey, Point},
    },
};

impl PartialEq for MortonKey {
    fn eq(&self, other: &Self) -> bool {
        self.morton == other.morton
    }
}

impl Eq for MortonKey {}

impl Ord for MortonKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.morton.cmp(&other.morton)
    }
}

impl PartialOrd for MortonKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for MortonKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.morton.hash(state);
    }
}

/// Helper function for decoding keys.
fn decode_key_helper(key: u64, lookup_table: &[u64; 512]) -> u64 {
    const N_LOOPS: u64 = 6; // 48 bits of anchor, in chunks of 9
    let mut coord: u64 = 0;

    for index in 0..N_LOOPS {
        coord |= lookup_table[((key >> (index * 9)) & NINE_BIT_MASK) as usize] << (3 * index);
    }

    coord
}

/// Decodes a Morton key to retrieve its spatial anchor point.
///
/// # Arguments
/// - `morton` - The Morton key to be decoded.
fn decode_key(morton: u64) -> [u64; 3] {
    let key = morton >> LEVEL_DISPLACEMENT;

    let x = decode_key_helper(key, &X_LOOKUP_DECODE);
    let y = decode_key_helper(key, &Y_LOOKUP_DECODE);
    let z = decode_key_helper(key, &Z_LOOKUP_DECODE);

    [x, y, z]
}

/// Map a point to the anchor of the enclosing box.
///
/// Points on the upper boundary of the domain are clamped into the last box along each axis.
///
/// # Arguments
/// * `point` - The (x, y, z) coordinates of the point to map.
/// * `level` - The level of the tree at which the point will be mapped.
/// * `domain` - The computational domain defined by the point set.
fn point_to_anchor<T: Scalar>(
    point: &Point<T>,
    level: u64,
    domain: &Domain<T>,
) -> Result<[u64; 3], std::io::Error> {
    if !point.is_finite() || !domain.contains(point) {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Point {:?} not in Domain", point.0),
        ));
    }

    let n_boxes = 1u64 << level;
    let scaling_factor = 1u64 << (DEEPEST_LEVEL - level);
    let mut anchor = [0u64; 3];

    for (a, &p, &o, &s) in izip!(&mut anchor, &point.0, &domain.origin, &domain.side_length) {
        let scaled = ((p - o) / s * T::real(n_boxes as f64)).floor();
        let index = scaled.to_u64().unwrap_or(0).min(n_boxes - 1);
        *a = index * scaling_factor;
    }

    Ok(anchor)
}

/// Encode an anchor.
/// Returns the Morton key associated with the given anchor.
///
/// # Arguments
/// * `anchor` - A vector with 3 elements defining the integer coordinates.
/// * `level` - The level of the tree the anchor is encoded to.
pub fn encode_anchor(anchor: &[u64; 3], level: u64) -> u64 {
    let x = anchor[0];
    let y = anchor[1];
    let z = anchor[2];

    let key: u64 = X_LOOKUP_ENCODE[((x >> BYTE_DISPLACEMENT) & BYTE_MASK) as usize]
        | Y_LOOKUP_ENCODE[((y >> BYTE_DISPLACEMENT) & BYTE_MASK) as usize]
        | Z_LOOKUP_ENCODE[((z >> BYTE_DISPLACEMENT) & BYTE_MASK) as usize];

    let key = (key << 24)
        | X_LOOKUP_ENCODE[(x & BYTE_MASK) as usize]
        | Y_LOOKUP_ENCODE[(y & BYTE_MASK) as usize]
        | Z_LOOKUP_ENCODE[(z & BYTE_MASK) as usize];

    let key = key << LEVEL_DISPLACEMENT;
    key | level
}

impl MortonKey {
    /// Constructor for Morton key
    pub fn new(anchor: &[u64; 3], morton: u64) -> Self {
        Self {
            anchor: *anchor,
            morton,
        }
    }

    /// The Morton key corresponding to an octree root node
    pub fn root() -> Self {
        Self::new(&[0, 0, 0], 0)
    }

    /// Construct a `MortonKey` type from a Morton index
    pub fn from_morton(morton: u64) -> Self {
        let anchor = decode_key(morton);
        Self::new(&anchor, morton)
    }

    /// Construct a `MortonKey` type from the anchor at a given level
    pub fn from_anchor(anchor: &[u64; 3], level: u64) -> Self {
        let morton = encode_anchor(anchor, level);
        Self::new(anchor, morton)
    }

    /// Construct a `MortonKey` associated with the box that encloses the point on a given level.
    ///
    /// # Arguments
    /// * `point` - Cartesian coordinate for a given point.
    /// * `domain` - Domain associated with a given tree encoding.
    /// * `level` - level of octree on which to find the encoding.
    pub fn from_point<T: Scalar>(
        point: &Point<T>,
        domain: &Domain<T>,
        level: u64,
    ) -> Result<Self, std::io::Error> {
        if level > DEEPEST_LEVEL {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Cannot encode keys below level {:?}", DEEPEST_LEVEL),
            ));
        }
        let anchor = point_to_anchor(point, level, domain)?;
        Ok(MortonKey::from_anchor(&anchor, level))
    }

    /// The anchor corresponding to this key.
    pub fn anchor(&self) -> &[u64; 3] {
        &self.anchor
    }

    /// The Morton Key in index form.
    pub fn morton(&self) -> u64 {
        self.morton
    }

    /// The level of this key.
    pub fn level(&self) -> u64 {
        self.morton & LEVEL_MASK
    }

    /// Return the ancestor of this key at `level`, or the key itself if it is not deeper than `level`.
    pub fn ancestor(&self, level: u64) -> Self {
        if level >= self.level() {
            return *self;
        }

        let shift = 3 * (DEEPEST_LEVEL - level);
        let morton = ((self.morton >> LEVEL_DISPLACEMENT) >> shift) << shift;
        let mask = !((1u64 << (DEEPEST_LEVEL - level)) - 1);

        Self::new(
            &self.anchor.map(|a| a & mask),
            (morton << LEVEL_DISPLACEMENT) | level,
        )
    }

    /// Return the parent of a Morton Key, the root is its own parent.
    pub fn parent(&self) -> Self {
        self.ancestor(self.level().saturating_sub(1))
    }

    /// Return all children of a Morton Key in sorted order, keys on the deepest level have none.
    pub fn children(&self) -> Vec<MortonKey> {
        let level = self.level();
        if level >= DEEPEST_LEVEL {
            return Vec::new();
        }

        let morton = self.morton() >> LEVEL_DISPLACEMENT;
        let bit_shift = 3 * (DEEPEST_LEVEL - level - 1);

        let mut children = (0..8u64)
            .map(|index| {
                let child = (morton | (index << bit_shift)) << LEVEL_DISPLACEMENT;
                MortonKey::from_morton(child | (level + 1))
            })
            .collect::<Vec<_>>();

        children.sort();
        children
    }

    /// Return all children of the parent of this Morton Key.
    pub fn siblings(&self) -> Vec<MortonKey> {
        if self.level() == 0 {
            return vec![*self];
        }
        self.parent().children()
    }

    /// Check if the key is a strict ancestor of `other`.
    pub fn is_ancestor(&self, other: &MortonKey) -> bool {
        other.level() > self.level() && other.ancestor(self.level()) == *self
    }

    /// Return set of all ancestors of this Morton Key, including the key itself.
    pub fn ancestors(&self) -> HashSet<MortonKey> {
        (0..=self.level()).map(|level| self.ancestor(level)).collect()
    }

    /// Position of this key among its siblings, in 0..8.
    pub fn octant(&self) -> usize {
        let level = self.level();
        if level == 0 {
            return 0;
        }
        let shift = 3 * (DEEPEST_LEVEL - level) + LEVEL_DISPLACEMENT as u64;
        ((self.morton >> shift) & 7) as usize
    }

    /// The physical diameter of a box specified by this Morton Key, calculated with respect to
    /// a Domain. Returns a stack allocated array for the size of the box width in each corresponding
    /// dimension.
    ///
    /// # Arguments
    /// `domain` - The physical domain with which we calculate the diameter with respect to.
    pub fn diameter<T: Scalar>(&self, domain: &Domain<T>) -> [T; 3] {
        let scale = T::real(0.5).powi(self.level() as i32);
        domain.side_length.map(|x| x * scale)
    }

    /// Return the coordinates of the anchor for this Morton Key.
    ///
    /// # Arguments
    /// * `domain` - The domain with which we are calculating with respect to.
    pub fn to_coordinates<T: Scalar>(&self, domain: &Domain<T>) -> [T; 3] {
        let mut coord = [T::zero(); 3];
        let level_size = T::real(LEVEL_SIZE as f64);

        for (anchor_value, coord_ref, origin_value, side_value) in
            izip!(self.anchor, &mut coord, &domain.origin, &domain.side_length)
        {
            *coord_ref = *origin_value + *side_value * T::real(anchor_value as f64) / level_size;
        }

        coord
    }

    /// The physical centre of a box specified by this Morton Key, calculated with respect to
    /// a Domain.
    ///
    /// # Arguments
    /// * `domain` - The physical domain with which we calculate the centre with respect to.
    pub fn centre<T: Scalar>(&self, domain: &Domain<T>) -> Point<T> {
        let anchor_coordinate = self.to_coordinates(domain);
        let diameter = self.diameter(domain);
        let two = T::real(2.0);

        let mut result = Point::zero();
        for (i, (c, d)) in anchor_coordinate.iter().zip(diameter).enumerate() {
            result[i] = *c + d / two;
        }

        result
    }

    /// Whether a point lies in the closed box specified by this key, up to a relative tolerance.
    pub fn contains<T: Scalar>(&self, point: &Point<T>, domain: &Domain<T>) -> bool {
        let lower = self.to_coordinates(domain);
        let diameter = self.diameter(domain);
        let tol = T::real(1e-10) * domain.side_length[0];

        (0..3).all(|i| lower[i] - tol <= point[i] && point[i] <= lower[i] + diameter[i] + tol)
    }
}

impl TreeNode for MortonKey {
    fn raw(&self) -> u64 {
        self.morton
    }

    fn level(&self) -> u64 {
        self.level()
    }

    fn parent(&self) -> Self {
        self.parent()
    }

    fn children(&self) -> Vec<Self> {
        self.children()
    }

    fn centre<D: DomainTrait>(&self, domain: &D) -> Point<D::Scalar> {
        MortonKey::centre(self, &Domain::new(domain.origin(), domain.side_length()))
    }

    fn side_length<D: DomainTrait>(&self, domain: &D) -> D::Scalar {
        self.diameter(&Domain::new(domain.origin(), domain.side_length()))[0]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fmm::helpers::points_fixture;

    #[test]
    fn test_encoding_decoding() {
        let anchor: [u64; 3] = [65535, 65535, 65535];

        let actual = decode_key(encode_anchor(&anchor, DEEPEST_LEVEL));

        assert_eq!(anchor, actual);

        let anchor: [u64; 3] = [12345, 0, 40000];
        let key = MortonKey::from_anchor(&anchor, DEEPEST_LEVEL);
        assert_eq!(MortonKey::from_morton(key.morton).anchor, anchor);
        assert_eq!(key.level(), DEEPEST_LEVEL);
    }

    #[test]
    fn test_siblings() {
        // Test that we get the same siblings for a pair of siblings
        let a = MortonKey::from_anchor(&[0, 0, 0], DEEPEST_LEVEL);
        let b = MortonKey::from_anchor(&[1, 1, 1], DEEPEST_LEVEL);
        assert_eq!(a.siblings(), b.siblings());
        assert_eq!(a.siblings().len(), 8);
        assert_eq!(MortonKey::root().siblings(), vec![MortonKey::root()]);
    }

    #[test]
    fn test_sorting_matches_z_order() {
        let domain = Domain::<f64>::new(&[0., 0., 0.], &[1., 1., 1.]);
        let points = points_fixture::<f64>(1000, None, None, Some(0));

        let mut keys = points
            .iter()
            .map(|p| MortonKey::from_point(p, &domain, 3).unwrap())
            .collect::<Vec<_>>();
        keys.sort();

        // Sorted keys at a level are grouped by parent, and parents are themselves sorted
        for pair in keys.windows(2) {
            assert!(pair[0].parent() <= pair[1].parent());
        }
    }

    #[test]
    fn test_find_children() {
        let root = MortonKey::root();
        let displacement = 1 << (DEEPEST_LEVEL - root.level() - 1);

        let expected: Vec<MortonKey> = vec![
            MortonKey::new(&[0, 0, 0], 1),
            MortonKey::new(
                &[displacement, 0, 0],
                0b100000000000000000000000000000000000000000000000000000000000001,
            ),
            MortonKey::new(
                &[0, displacement, 0],
                0b10000000000000000000000000000000000000000000000000000000000001,
            ),
            MortonKey::new(
                &[0, 0, displacement],
                0b1000000000000000000000000000000000000000000000000000000000001,
            ),
            MortonKey::new(
                &[displacement, displacement, 0],
                0b110000000000000000000000000000000000000000000000000000000000001,
            ),
            MortonKey::new(
                &[displacement, 0, displacement],
                0b101000000000000000000000000000000000000000000000000000000000001,
            ),
            MortonKey::new(
                &[0, displacement, displacement],
                0b11000000000000000000000000000000000000000000000000000000000001,
            ),
            MortonKey::new(
                &[displacement, displacement, displacement],
                0b111000000000000000000000000000000000000000000000000000000000001,
            ),
        ];

        let children = root.children();
        assert_eq!(children.len(), 8);

        for child in &children {
            assert!(expected.contains(child));
            assert_eq!(child.parent(), root);
            // Anchors are consistent with the encoded index
            assert_eq!(*child, MortonKey::from_anchor(child.anchor(), 1));
        }

        for (octant, child) in children.iter().enumerate() {
            assert_eq!(child.octant(), octant);
        }
    }

    #[test]
    fn test_ancestors() {
        let domain = Domain::<f64>::new(&[0., 0., 0.], &[1., 1., 1.]);
        let point = Point([0.5, 0.5, 0.5]);

        let key = MortonKey::from_point(&point, &domain, DEEPEST_LEVEL).unwrap();

        let mut ancestors: Vec<MortonKey> = key.ancestors().into_iter().collect();
        ancestors.sort();

        // Test that all ancestors found
        for (current_level, &ancestor) in ancestors.iter().enumerate() {
            assert_eq!(ancestor.level(), current_level as u64);
            assert_eq!(ancestor, key.ancestor(current_level as u64));
        }

        // Test that the ancestors include the key at the leaf level
        assert!(ancestors.contains(&key));

        // The ancestor at a level is the key of the point encoded at that level
        for level in 0..=DEEPEST_LEVEL {
            let expected = MortonKey::from_point(&point, &domain, level).unwrap();
            assert_eq!(key.ancestor(level), expected);
            assert_eq!(key.ancestor(level).anchor, expected.anchor);
        }
    }

    #[test]
    fn test_is_ancestor() {
        let root = MortonKey::root();
        let child = root.children()[3];
        let grandchild = child.children()[5];

        assert!(root.is_ancestor(&child));
        assert!(root.is_ancestor(&grandchild));
        assert!(child.is_ancestor(&grandchild));
        assert!(!child.is_ancestor(&child));
        assert!(!grandchild.is_ancestor(&child));
        assert!(!root.children()[2].is_ancestor(&grandchild));
    }

    #[test]
    fn test_point_to_anchor() {
        let domain = Domain::<f64>::new(&[0., 0., 0.], &[1., 1., 1.]);

        // Test points in the domain
        let point = Point([0.5, 0.5, 0.5]);
        let level = 2;
        let anchor = point_to_anchor(&point, level, &domain).unwrap();
        let expected = [2 << (DEEPEST_LEVEL - level); 3];
        assert_eq!(anchor, expected);

        // Points on the upper boundary are clamped to the last box
        let point = Point([1.0, 0.0, 1.0]);
        let anchor = point_to_anchor(&point, 1, &domain).unwrap();
        assert_eq!(anchor, [1 << (DEEPEST_LEVEL - 1), 0, 1 << (DEEPEST_LEVEL - 1)]);
    }

    #[test]
    fn test_point_to_anchor_fails() {
        let domain = Domain::<f64>::new(&[0., 0., 0.], &[1., 1., 1.]);

        // Test a point not in the domain
        let point = Point([0.9, 0.9, 1.9]);
        assert!(point_to_anchor(&point, 2, &domain).is_err());

        let point = Point([f64::NAN, 0.5, 0.5]);
        assert!(MortonKey::from_point(&point, &domain, 2).is_err());

        let point = Point([0.5, 0.5, 0.5]);
        assert!(MortonKey::from_point(&point, &domain, DEEPEST_LEVEL + 1).is_err());
    }

    #[test]
    fn test_point_to_anchor_fails_negative_domain() {
        let domain = Domain::<f64>::new(&[-0.5, -0.5, -0.5], &[1., 1., 1.]);

        // Test a point not in the domain
        let point = Point([-0.5, -0.5, -0.6]);
        assert!(point_to_anchor(&point, 2, &domain).is_err());
    }

    #[test]
    fn test_centre_and_diameter() {
        let domain = Domain::<f64>::new(&[-1., -1., -1.], &[2., 2., 2.]);
        let root = MortonKey::root();
        assert_eq!(root.centre(&domain), Point([0.0, 0.0, 0.0]));
        assert_eq!(root.diameter(&domain), [2.0; 3]);

        let last = *root.children().last().unwrap();
        assert_eq!(last.centre(&domain), Point([0.5, 0.5, 0.5]));
        assert_eq!(last.diameter(&domain), [1.0; 3]);
        assert!(last.contains(&Point([0.9, 0.1, 0.5]), &domain));
        assert!(!last.contains(&Point([-0.1, 0.1, 0.5]), &domain));
    }

    #[test]
    fn test_encoding_is_always_absolute() {
        let a = MortonKey::from_anchor(&[65535, 65535, 65535], 1);
        let b = MortonKey::from_anchor(&[65535, 65535, 65535], 2);
        assert_ne!(a, b);
        assert_eq!(a.anchor, b.anchor);
    }
}
