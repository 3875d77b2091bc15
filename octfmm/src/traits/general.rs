//! Traits that are useful across modules
use std::{
    fmt::{Debug, Display},
    iter::Sum,
};

use num::{traits::NumAssignOps, Float};

/// Real scalar type used for coordinates, box geometry and acceptance tests.
pub trait Scalar
where
    Self: Float + NumAssignOps + Sum + Debug + Display + Default + Send + Sync + 'static,
{
    /// Convert a double precision literal into this type.
    fn real(value: f64) -> Self;
}

impl Scalar for f32 {
    fn real(value: f64) -> Self {
        value as f32
    }
}

impl Scalar for f64 {
    fn real(value: f64) -> Self {
        value
    }
}
