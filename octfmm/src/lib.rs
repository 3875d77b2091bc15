//! # Octree Treecodes and Fast Multipole Methods (octfmm)
//!
//! Approximate the pairwise interactions among N points, \sum_j K(x_i, y_j) q_j, in better than O(N^2)
//! time by combining an adaptive octree with multipole and local series expansions.
//!
//! Notable features of this library are:
//! * Adaptive octrees addressed by Morton keys, built either top-down or bottom-up with identical results.
//! * A trait based kernel contract, any type implementing [`Kernel`] can be evaluated without touching the core.
//! * Two evaluation strategies behind a single interface: a Barnes-Hut style treecode and a full FMM
//!   with multipole to local translations.
//!
//! ## Example
//! ```
//! use octfmm::{
//!     fmm::helpers::{charges_fixture, points_fixture},
//!     kernels::Laplace3dKernel,
//!     FmmOptions, FmmPlanBuilder,
//! };
//!
//! let points = points_fixture::<f64>(500, None, None, Some(0));
//! let charges = charges_fixture::<f64>(500, Some(1));
//!
//! let plan = FmmPlanBuilder::new()
//!     .tree(&points, &charges)
//!     .unwrap()
//!     .parameters(Laplace3dKernel::new(4), FmmOptions::default())
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let potentials = plan.execute().unwrap();
//! assert_eq!(potentials.len(), 500);
//! ```
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod fmm;
pub mod kernels;
pub mod traits;
pub mod tree;

// Public API
#[doc(inline)]
pub use fmm::types::EvaluatorKind;
#[doc(inline)]
pub use fmm::types::FmmOptions;
#[doc(inline)]
pub use fmm::types::FmmPlan;
#[doc(inline)]
pub use fmm::types::FmmPlanBuilder;
#[doc(inline)]
pub use fmm::create_evaluator;
#[doc(inline)]
pub use traits::fmm::Evaluate;
#[doc(inline)]
pub use traits::kernel::Kernel;
#[doc(inline)]
pub use traits::types::FmmError;
#[doc(inline)]
pub use tree::types::{BoundingBox, Octree, Point, TreeConstruction};
