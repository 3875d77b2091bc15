//! Data structures for treecode and FMM evaluation.
use std::fmt;

use crate::{
    traits::{kernel::Kernel, types::FmmOperatorTime},
    tree::types::{BoundingBox, Octree, Point, TreeConstruction},
};

/// Evaluation strategy.
///
/// # Variants
///
/// - `Treecode`: Every far field interaction is a multipole to particle (M2P) evaluation, no local
///   expansions are formed.
///
/// - `Fmm`: Far field interactions between well separated boxes are translated into local
///   expansions (M2L), which are passed down the tree and evaluated at the bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvaluatorKind {
    /// Barnes-Hut style treecode.
    Treecode,

    /// Fast multipole method with a dual tree traversal.
    #[default]
    Fmm,
}

impl fmt::Display for EvaluatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluatorKind::Treecode => write!(f, "Treecode"),
            EvaluatorKind::Fmm => write!(f, "FMM"),
        }
    }
}

/// Policy deciding whether two boxes are far enough apart to interact through an expansion.
///
/// Boxes are compared by their size over the gap `g = d - r_S - r_T` between their
/// circumscribing spheres, with `d` the distance between centres and `r` the radii. A source
/// `S` and target `T` are well separated for M2L when `(e_S + e_T) / g < theta`, and for M2P
/// when `e_S / g < theta`. The extent `e` is the side length for `BarnesHut` and the radius
/// for `Radii`.
///
/// Either test only accepts expansions that converge, and accepts a pair exactly when the
/// convergence ratio of its series, `(r_S + r_T) / d` or `r_S / (d - r_T)`, lies below a bound
/// growing with `theta`. Lowering `theta` therefore only ever replaces an expansion by finer,
/// faster converging ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AcceptanceCriterion {
    /// Measure boxes by their side length.
    #[default]
    BarnesHut,

    /// Measure boxes by their circumscribing radius.
    Radii,
}

/// Runtime options of an evaluation.
///
/// # Fields
///
/// - `tree` - Octree construction mode.
///
/// - `evaluator` - Treecode or FMM.
///
/// - `theta` - Acceptance threshold, must be positive. Smaller values are more accurate and
///   slower, as `theta` tends to zero every interaction is evaluated directly.
///
/// - `acceptance` - Acceptance criterion policy.
///
/// - `n_crit` - Maximum number of bodies per leaf box.
///
/// - `max_level` - Level beyond which boxes are never split.
///
/// - `timed` - Record timings of each evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FmmOptions<T> {
    /// Tree construction mode
    pub tree: TreeConstruction,

    /// Evaluation strategy
    pub evaluator: EvaluatorKind,

    /// Acceptance threshold
    pub theta: T,

    /// Acceptance criterion
    pub acceptance: AcceptanceCriterion,

    /// Maximum number of bodies per leaf
    pub n_crit: usize,

    /// Maximum refinement level
    pub max_level: u64,

    /// Whether to time each pass
    pub timed: bool,
}

/// Barnes-Hut style treecode.
///
/// Every target leaf walks the tree from the root, evaluating sufficiently distant source boxes
/// through their multipole expansions and nearby leaves directly.
pub struct Treecode<'a, K>
where
    K: Kernel,
{
    /// Tree, constructed before the evaluator
    pub tree: &'a Octree<K::Scalar, K::Charge>,

    /// Associated kernel
    pub kernel: &'a K,

    /// Acceptance threshold
    pub theta: K::Scalar,

    /// Acceptance criterion
    pub acceptance: AcceptanceCriterion,

    /// Whether to time each pass
    pub timed: bool,

    /// Multipole expansion of each box
    pub multipoles: Vec<K::Multipole>,

    /// Result at each body, in tree order
    pub results: Vec<K::Range>,

    /// Timings of the last evaluation
    pub operator_times: Vec<FmmOperatorTime>,
}

/// Fast multipole method.
///
/// Interactions are found with a dual traversal of the tree over pairs of boxes. Well separated
/// pairs are translated into local expansions (M2L), which are shifted down the tree and
/// evaluated at the bodies of each leaf.
pub struct Fmm<'a, K>
where
    K: Kernel,
{
    /// Tree, constructed before the evaluator
    pub tree: &'a Octree<K::Scalar, K::Charge>,

    /// Associated kernel
    pub kernel: &'a K,

    /// Acceptance threshold
    pub theta: K::Scalar,

    /// Acceptance criterion
    pub acceptance: AcceptanceCriterion,

    /// Whether to time each pass
    pub timed: bool,

    /// Multipole expansion of each box
    pub multipoles: Vec<K::Multipole>,

    /// Local expansion of each box
    pub locals: Vec<K::Local>,

    /// Result at each body, in tree order
    pub results: Vec<K::Range>,

    /// Timings of the last evaluation
    pub operator_times: Vec<FmmOperatorTime>,
}

/// A fully specified evaluation: bodies, the octree built over them, a kernel and options.
///
/// Created with a [`FmmPlanBuilder`].
pub struct FmmPlan<K>
where
    K: Kernel,
{
    /// Bounding box of the bodies
    pub bounding_box: BoundingBox<K::Scalar>,

    /// Octree built over the bodies
    pub tree: Octree<K::Scalar, K::Charge>,

    /// Associated kernel
    pub kernel: K,

    /// Evaluation options
    pub options: FmmOptions<K::Scalar>,
}

/// A builder for constructing an [`FmmPlan`].
///
/// The builder is configured step by step: bodies are attached with `tree`, the kernel and
/// options with `parameters`, and the octree is built by `build`.
///
/// # Example
/// ```
/// use octfmm::{
///     fmm::helpers::{charges_fixture, points_fixture},
///     fmm::types::{AcceptanceCriterion, EvaluatorKind},
///     kernels::Laplace3dKernel,
///     FmmOptions, FmmPlanBuilder, TreeConstruction,
/// };
///
/// let points = points_fixture::<f64>(1000, None, None, Some(0));
/// let charges = charges_fixture::<f64>(1000, Some(1));
///
/// let options = FmmOptions {
///     tree: TreeConstruction::BottomUp,
///     evaluator: EvaluatorKind::Treecode,
///     theta: 0.4,
///     acceptance: AcceptanceCriterion::Radii,
///     ..FmmOptions::default()
/// };
///
/// let plan = FmmPlanBuilder::new()
///     .tree(&points, &charges)
///     .unwrap()
///     .parameters(Laplace3dKernel::new(6), options)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(plan.evaluator_name().unwrap(), "Treecode [bottom-up]");
/// let potentials = plan.execute().unwrap();
/// ```
pub struct FmmPlanBuilder<K>
where
    K: Kernel,
{
    /// Body positions
    pub points: Option<Vec<Point<K::Scalar>>>,

    /// Body charges
    pub charges: Option<Vec<K::Charge>>,

    /// Bounding box of the bodies
    pub bounding_box: Option<BoundingBox<K::Scalar>>,

    /// Kernel
    pub kernel: Option<K>,

    /// Options
    pub options: Option<FmmOptions<K::Scalar>>,
}
