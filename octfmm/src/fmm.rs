//! Treecode and fast multipole evaluation over an octree.
//!
//! A [`crate::Kernel`] supplies the expansion operators, the dispatch layer unpacks box geometry
//! and expansion storage to call them, and an evaluator drives the upward, interaction and
//! downward passes. Evaluators are selected at runtime from [`types::FmmOptions`].
mod acceptance;
mod builder;
pub mod dispatch;
mod fast_multipole;
pub mod helpers;
mod options;
mod treecode;
pub mod types;

pub use builder::{create_evaluator, DynEvaluator};
pub use types::{Fmm, Treecode};
