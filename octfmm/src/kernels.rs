//! # Reference Kernels
//!
//! Kernels implementing [`crate::Kernel`], used to exercise and validate the evaluators.
//!
//! - [`Laplace3dKernel`] - The 1/|x - y| potential with Cartesian Taylor expansions of arbitrary
//!   order.
//! - [`UnitKernel`] - A constant kernel whose expansions are exact, every body receives the total
//!   charge of all other bodies regardless of how interactions are evaluated.
mod laplace;
mod unit;

pub use laplace::{n_coeffs, Laplace3dKernel};
pub use unit::UnitKernel;
