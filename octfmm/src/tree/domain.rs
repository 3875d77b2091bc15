//! Constructor for a cubic Domain.
use log::warn;

use crate::{
    traits::{general::Scalar, tree::Domain as DomainTrait},
    tree::types::{BoundingBox, Domain, Point},
};

impl<T> Domain<T>
where
    T: Scalar,
{
    /// Compute the cubic domain enclosing a bounding box. The domain adds a small threshold such
    /// that no points lie on the actual edge of the domain to ensure correct Morton encoding.
    ///
    /// A degenerate bounding box, of zero extent, is padded to a unit cube about its centre.
    ///
    /// # Arguments
    /// * `bounding_box` - Extrema of the point set.
    pub fn from_bounding_box(bounding_box: &BoundingBox<T>) -> Domain<T> {
        // Want a cubic box to place everything in
        let side_length = bounding_box.side_length();

        if side_length <= T::zero() {
            warn!(
                "Degenerate bounding box at {:?}, padding to a unit cube",
                bounding_box.min.0
            );
            let half = T::real(0.5);
            let centre = bounding_box.centre();
            return Domain {
                origin: [centre[0] - half, centre[1] - half, centre[2] - half],
                side_length: [T::one(); 3],
            };
        }

        // Increase size of bounding box by 1% along each dimension to capture all points
        let err = side_length * T::real(0.005);
        let two = T::real(2.0);
        let padded = side_length + two * err;

        // The origin is defined by the minimum point
        let min = bounding_box.min;
        let origin = [min[0] - err, min[1] - err, min[2] - err];

        Domain {
            origin,
            side_length: [padded; 3],
        }
    }

    /// Construct a domain a user specified origin and side length.
    ///
    /// # Arguments
    /// * `origin` - The point from which to construct a cuboid domain.
    /// * `side_length` - The extent along each axis of the domain.
    pub fn new(origin: &[T; 3], side_length: &[T; 3]) -> Self {
        Domain {
            origin: *origin,
            side_length: *side_length,
        }
    }

    /// Whether a point lies inside the closed domain.
    pub fn contains(&self, point: &Point<T>) -> bool {
        (0..3).all(|i| {
            self.origin[i] <= point[i] && point[i] <= self.origin[i] + self.side_length[i]
        })
    }
}

impl<T> DomainTrait for Domain<T>
where
    T: Scalar,
{
    type Scalar = T;

    fn side_length(&self) -> &[T; 3] {
        &self.side_length
    }

    fn origin(&self) -> &[T; 3] {
        &self.origin
    }
}
