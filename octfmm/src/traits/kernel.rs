//! Kernel capability contract.
use std::fmt::Debug;

use crate::{traits::general::Scalar, tree::types::Point};

/// The capabilities a numerical kernel must provide to be evaluated by a treecode or FMM.
///
/// A kernel fixes the value types that flow through an evaluation: coordinates, charges, the
/// per body result (range) and the multipole and local expansions stored per box. Every
/// translation operator accumulates into its output argument, so callers are responsible for
/// initialising outputs.
///
/// `init_multipole` and `init_local` are optional. A kernel that does not provide them gets
/// `Default::default()` expansions, which must be neutral with respect to accumulation.
///
/// Translation vectors follow a fixed convention:
/// * `m2m` and `l2l` receive `r = child centre - parent centre`,
/// * `m2l` receives `r0 = target centre - source centre`.
pub trait Kernel
where
    Self: Send + Sync,
{
    /// Coordinate type.
    type Scalar: Scalar;

    /// Source strength carried by each body.
    type Charge: Clone + Debug + Send + Sync;

    /// Result accumulated at each body, as well as the value of a single kernel evaluation.
    type Range: Clone + Debug + Default + Send + Sync;

    /// Multipole expansion stored per box.
    type Multipole: Clone + Debug + Default + Send + Sync;

    /// Local expansion stored per box.
    type Local: Clone + Debug + Default + Send + Sync;

    /// Spatial dimension of the kernel.
    const DIMENSION: usize = 3;

    /// Human readable name of this kernel.
    fn name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }

    /// Order of the series expansions, kernels without a notion of order report 1.
    fn expansion_order(&self) -> usize {
        1
    }

    /// Kernel value K(t, s).
    fn eval(&self, target: &Point<Self::Scalar>, source: &Point<Self::Scalar>) -> Self::Range;

    /// One sided direct interaction, `r += K(t, s) c`.
    fn p2p(
        &self,
        target: &Point<Self::Scalar>,
        source: &Point<Self::Scalar>,
        charge: &Self::Charge,
        result: &mut Self::Range,
    );

    /// Symmetric direct interaction, updating both results from a single kernel evaluation.
    #[allow(clippy::too_many_arguments)]
    fn p2p_symmetric(
        &self,
        point_a: &Point<Self::Scalar>,
        charge_a: &Self::Charge,
        result_a: &mut Self::Range,
        point_b: &Point<Self::Scalar>,
        charge_b: &Self::Charge,
        result_b: &mut Self::Range,
    );

    /// Accumulate a single body into the multipole expansion about `centre`.
    fn p2m(
        &self,
        point: &Point<Self::Scalar>,
        charge: &Self::Charge,
        centre: &Point<Self::Scalar>,
        multipole: &mut Self::Multipole,
    );

    /// Shift a child multipole by `r` and accumulate into its parent.
    fn m2m(
        &self,
        child: &Self::Multipole,
        r: &Point<Self::Scalar>,
        parent: &mut Self::Multipole,
    );

    /// Convert a source multipole into a local expansion displaced by `r0`.
    fn m2l(&self, multipole: &Self::Multipole, r0: &Point<Self::Scalar>, local: &mut Self::Local);

    /// Shift a parent local expansion by `r` and accumulate into a child.
    fn l2l(&self, parent: &Self::Local, r: &Point<Self::Scalar>, child: &mut Self::Local);

    /// Evaluate a local expansion about `centre` at a body.
    fn l2p(
        &self,
        local: &Self::Local,
        centre: &Point<Self::Scalar>,
        point: &Point<Self::Scalar>,
        result: &mut Self::Range,
    );

    /// Evaluate a multipole expansion about `centre` at a body.
    fn m2p(
        &self,
        multipole: &Self::Multipole,
        centre: &Point<Self::Scalar>,
        point: &Point<Self::Scalar>,
        result: &mut Self::Range,
    );

    /// Initial multipole expansion of a box with the given side length.
    fn init_multipole(&self, _side_length: Self::Scalar) -> Self::Multipole {
        Self::Multipole::default()
    }

    /// Initial local expansion of a box with the given side length.
    fn init_local(&self, _side_length: Self::Scalar) -> Self::Local {
        Self::Local::default()
    }
}
