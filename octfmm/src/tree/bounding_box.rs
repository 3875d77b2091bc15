//! Bounding boxes of point sets.
use crate::{
    traits::general::Scalar,
    tree::types::{BoundingBox, Point},
};

impl<T> BoundingBox<T>
where
    T: Scalar,
{
    /// Construct a bounding box from its corners.
    ///
    /// # Arguments
    /// * `min` - Componentwise minimum, must not exceed `max` along any axis.
    /// * `max` - Componentwise maximum.
    pub fn new(min: Point<T>, max: Point<T>) -> Result<Self, std::io::Error> {
        if !min.is_finite() || !max.is_finite() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Bounding box corners must be finite",
            ));
        }

        if (0..3).any(|i| min[i] > max[i]) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Bounding box minimum exceeds maximum",
            ));
        }

        Ok(BoundingBox { min, max })
    }

    /// The unit cube [0, 1]^3.
    pub fn unit() -> Self {
        BoundingBox {
            min: Point::zero(),
            max: Point([T::one(); 3]),
        }
    }

    /// Compute the bounding box of a non-empty set of points in a single pass.
    ///
    /// # Arguments
    /// * `points` - Points to be enclosed, all coordinates must be finite.
    pub fn from_points(points: &[Point<T>]) -> Result<Self, std::io::Error> {
        let Some(first) = points.first() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Cannot compute the bounding box of an empty point set",
            ));
        };

        let mut min = *first;
        let mut max = *first;

        for point in points.iter() {
            if !point.is_finite() {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("Non-finite coordinate in point {:?}", point.0),
                ));
            }
            min = min.min(point);
            max = max.max(point);
        }

        Ok(BoundingBox { min, max })
    }

    /// Centre of the box.
    pub fn centre(&self) -> Point<T> {
        (self.min + self.max) / T::real(2.0)
    }

    /// Extent of the box along each axis.
    pub fn extents(&self) -> Point<T> {
        self.max - self.min
    }

    /// Largest extent of the box.
    pub fn side_length(&self) -> T {
        let extents = self.extents();
        extents[0].max(extents[1]).max(extents[2])
    }

    /// Whether a point lies inside the closed box.
    pub fn contains(&self, point: &Point<T>) -> bool {
        (0..3).all(|i| self.min[i] <= point[i] && point[i] <= self.max[i])
    }

    /// Whether the box has zero extent along every axis.
    pub fn is_degenerate(&self) -> bool {
        self.side_length() <= T::zero()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fmm::helpers::points_fixture;

    #[test]
    fn test_from_points() {
        let points = points_fixture::<f64>(1000, Some(-1.0), Some(2.0), Some(0));
        let bounding_box = BoundingBox::from_points(&points).unwrap();

        for point in points.iter() {
            assert!(bounding_box.contains(point));
        }

        for i in 0..3 {
            assert!(points.iter().any(|p| p[i] == bounding_box.min[i]));
            assert!(points.iter().any(|p| p[i] == bounding_box.max[i]));
        }
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let points: Vec<Point<f64>> = Vec::new();
        let result = BoundingBox::from_points(&points);
        assert_eq!(
            result.unwrap_err().kind(),
            std::io::ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        let points = vec![Point([0.0, 0.0, 0.0]), Point([f64::INFINITY, 1.0, 1.0])];
        assert!(BoundingBox::from_points(&points).is_err());

        let points = vec![Point([f64::NAN, 0.0, 0.0])];
        assert!(BoundingBox::from_points(&points).is_err());
    }

    #[test]
    fn test_degenerate() {
        let points = vec![Point([0.5, 0.5, 0.5]); 10];
        let bounding_box = BoundingBox::from_points(&points).unwrap();
        assert!(bounding_box.is_degenerate());
        assert_eq!(bounding_box.centre(), Point([0.5, 0.5, 0.5]));
        assert!(!BoundingBox::<f64>::unit().is_degenerate());
    }

    #[test]
    fn test_new() {
        let min = Point([0.0, 0.0, 0.0]);
        let max = Point([1.0, 2.0, 3.0]);
        let bounding_box = BoundingBox::new(min, max).unwrap();
        assert_eq!(bounding_box.side_length(), 3.0);
        assert_eq!(bounding_box.centre(), Point([0.5, 1.0, 1.5]));
        assert!(BoundingBox::new(max, min).is_err());
    }
}
