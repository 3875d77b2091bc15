//! Arithmetic on points.
use std::ops::{Add, Div, Index, IndexMut, Mul, Neg, Sub};

use crate::{traits::general::Scalar, tree::types::Point};

impl<T> Point<T>
where
    T: Scalar,
{
    /// Construct a point from its coordinates.
    pub fn new(x: T, y: T, z: T) -> Self {
        Point([x, y, z])
    }

    /// The origin.
    pub fn zero() -> Self {
        Point([T::zero(); 3])
    }

    /// Euclidean inner product.
    pub fn dot(&self, other: &Self) -> T {
        self.0[0] * other.0[0] + self.0[1] * other.0[1] + self.0[2] * other.0[2]
    }

    /// Squared Euclidean norm.
    pub fn norm_squared(&self) -> T {
        self.dot(self)
    }

    /// Euclidean norm.
    pub fn norm(&self) -> T {
        self.norm_squared().sqrt()
    }

    /// Whether every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|x| x.is_finite())
    }

    /// Componentwise minimum.
    pub fn min(&self, other: &Self) -> Self {
        Point([
            self.0[0].min(other.0[0]),
            self.0[1].min(other.0[1]),
            self.0[2].min(other.0[2]),
        ])
    }

    /// Componentwise maximum.
    pub fn max(&self, other: &Self) -> Self {
        Point([
            self.0[0].max(other.0[0]),
            self.0[1].max(other.0[1]),
            self.0[2].max(other.0[2]),
        ])
    }
}

impl<T: Scalar> Add for Point<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Point([self.0[0] + rhs.0[0], self.0[1] + rhs.0[1], self.0[2] + rhs.0[2]])
    }
}

impl<T: Scalar> Sub for Point<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Point([self.0[0] - rhs.0[0], self.0[1] - rhs.0[1], self.0[2] - rhs.0[2]])
    }
}

impl<T: Scalar> Neg for Point<T> {
    type Output = Self;

    fn neg(self) -> Self {
        Point([-self.0[0], -self.0[1], -self.0[2]])
    }
}

impl<T: Scalar> Mul<T> for Point<T> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        Point([self.0[0] * rhs, self.0[1] * rhs, self.0[2] * rhs])
    }
}

impl<T: Scalar> Div<T> for Point<T> {
    type Output = Self;

    fn div(self, rhs: T) -> Self {
        Point([self.0[0] / rhs, self.0[1] / rhs, self.0[2] / rhs])
    }
}

impl<T> Index<usize> for Point<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.0[index]
    }
}

impl<T> IndexMut<usize> for Point<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.0[index]
    }
}

impl<T> From<[T; 3]> for Point<T> {
    fn from(value: [T; 3]) -> Self {
        Point(value)
    }
}
