//! Fast multipole method with a dual tree traversal.
use log::trace;

use crate::{
    fmm::{
        dispatch::{ExpansionContext, InitL, L2L, L2P, M2L, M2P, P2P},
        helpers::optionally_time,
        treecode::upward_pass,
        types::{AcceptanceCriterion, Fmm, FmmOptions},
    },
    traits::{
        fmm::Evaluate,
        kernel::Kernel,
        tree::FmmTree,
        types::{FmmError, FmmOperatorTime, FmmOperatorType},
    },
    tree::types::Octree,
};

impl<'a, K> Fmm<'a, K>
where
    K: Kernel,
{
    /// Constructor, expansions and results are allocated by [`Evaluate::evaluate`].
    ///
    /// # Arguments
    /// * `tree` - A constructed octree.
    /// * `kernel` - Kernel to evaluate.
    /// * `options` - Acceptance threshold, criterion and timing options.
    pub fn new(
        tree: &'a Octree<K::Scalar, K::Charge>,
        kernel: &'a K,
        options: &FmmOptions<K::Scalar>,
    ) -> Self {
        Fmm {
            tree,
            kernel,
            theta: options.theta,
            acceptance: options.acceptance,
            timed: options.timed,
            multipoles: Vec::new(),
            locals: Vec::new(),
            results: Vec::new(),
            operator_times: Vec::new(),
        }
    }
}

fn init_locals<K: Kernel>(kernel: &K, context: &mut ExpansionContext<'_, K>) {
    for index in 0..context.tree.n_boxes() {
        InitL::eval(kernel, context, index);
    }
}

/// Traverse pairs of boxes starting from the root paired with itself. Well separated pairs
/// interact through M2L, or M2P when only the source can be expanded. Pairs of leaves that are
/// too close interact directly, any other pair is refined by splitting the larger box.
fn interaction_pass<K: Kernel>(
    kernel: &K,
    context: &mut ExpansionContext<'_, K>,
    theta: K::Scalar,
    acceptance: AcceptanceCriterion,
) {
    let tree = context.tree;
    let mut stack = vec![(tree.root(), tree.root())];

    while let Some((source, target)) = stack.pop() {
        if source == target {
            if tree.is_leaf(source) {
                P2P::eval(kernel, context, source, target);
            } else {
                let children = tree.children(source);
                for s in children.clone() {
                    stack.extend(children.clone().map(|t| (s, t)));
                }
            }
        } else if acceptance.accept_m2l(tree, theta, source, target) {
            M2L::eval(kernel, context, source, target);
        } else if tree.is_leaf(target) && acceptance.accept_m2p(tree, theta, source, target) {
            M2P::eval(kernel, context, source, target);
        } else if tree.is_leaf(source) && tree.is_leaf(target) {
            P2P::eval(kernel, context, source, target);
        } else if tree.is_leaf(target)
            || (!tree.is_leaf(source) && tree.side_length(source) >= tree.side_length(target))
        {
            stack.extend(tree.children(source).map(|s| (s, target)));
        } else {
            stack.extend(tree.children(target).map(|t| (source, t)));
        }
    }
}

/// Shift local expansions to children, parents first, and evaluate them at the bodies of
/// each leaf.
fn downward_pass<K: Kernel>(kernel: &K, context: &mut ExpansionContext<'_, K>) {
    let tree = context.tree;
    for index in 0..tree.n_boxes() {
        if tree.is_leaf(index) {
            L2P::eval(kernel, context, index);
        } else {
            for child in tree.children(index) {
                L2L::eval(kernel, context, index, child);
            }
        }
    }
}

impl<'a, K> Evaluate for Fmm<'a, K>
where
    K: Kernel,
{
    type Kernel = K;
    type Tree = Octree<K::Scalar, K::Charge>;

    fn name(&self) -> String {
        match self.tree.construction {
            Some(construction) => format!("FMM [{}]", construction),
            None => "FMM".to_string(),
        }
    }

    fn kernel(&self) -> &Self::Kernel {
        self.kernel
    }

    fn tree(&self) -> &Self::Tree {
        self.tree
    }

    fn evaluate(&mut self) -> Result<(), FmmError> {
        let tree = self.tree;
        let kernel = self.kernel;
        let (theta, acceptance, timed) = (self.theta, self.acceptance, self.timed);

        if !tree.is_constructed() {
            return Err(FmmError::Failed(
                "Cannot evaluate over an unconstructed tree".to_string(),
            ));
        }

        self.multipoles = vec![K::Multipole::default(); tree.n_boxes()];
        self.locals = vec![K::Local::default(); tree.n_boxes()];
        self.results = vec![K::Range::default(); tree.n_bodies()];

        let mut context = ExpansionContext {
            tree,
            multipoles: &mut self.multipoles,
            locals: &mut self.locals,
            results: &mut self.results,
        };

        let mut durations = Vec::with_capacity(4);

        trace!("{}: initialising {} local expansions", kernel.name(), tree.n_boxes());
        let ((), duration) = optionally_time(timed, || init_locals(kernel, &mut context));
        durations.push((FmmOperatorType::Init, duration));

        trace!("{}: upward pass over {} boxes", kernel.name(), tree.n_boxes());
        let ((), duration) = optionally_time(timed, || upward_pass(kernel, &mut context));
        durations.push((FmmOperatorType::Upward, duration));

        trace!("{}: dual tree traversal", kernel.name());
        let ((), duration) = optionally_time(timed, || {
            interaction_pass(kernel, &mut context, theta, acceptance)
        });
        durations.push((FmmOperatorType::Interaction, duration));

        trace!("{}: downward pass over {} boxes", kernel.name(), tree.n_boxes());
        let ((), duration) = optionally_time(timed, || downward_pass(kernel, &mut context));
        durations.push((FmmOperatorType::Downward, duration));

        self.operator_times = durations
            .into_iter()
            .filter_map(|(operator, duration)| {
                duration.map(|d| FmmOperatorTime::from_duration(operator, d))
            })
            .collect();

        Ok(())
    }

    fn results(&self) -> &[K::Range] {
        &self.results
    }

    fn multipole(&self, index: usize) -> Option<&K::Multipole> {
        self.multipoles.get(index)
    }

    fn local(&self, index: usize) -> Option<&K::Local> {
        self.locals.get(index)
    }

    fn operator_times(&self) -> &[FmmOperatorTime] {
        &self.operator_times
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        fmm::{
            helpers::{charges_fixture, direct_evaluate, l2_error, points_fixture},
            types::Treecode,
        },
        kernels::{Laplace3dKernel, UnitKernel},
        tree::types::{BoundingBox, Point, TreeConstruction},
    };
    use approx::assert_relative_eq;

    fn options(theta: f64, acceptance: AcceptanceCriterion) -> FmmOptions<f64> {
        FmmOptions {
            theta,
            acceptance,
            ..FmmOptions::default()
        }
    }

    #[test]
    fn test_fmm_laplace() {
        let n = 3000;
        let points = points_fixture::<f64>(n, None, None, Some(0));
        let charges = charges_fixture::<f64>(n, Some(1));
        let kernel = Laplace3dKernel::new(6);
        let expected = direct_evaluate(&kernel, &points, &charges);

        for construction in [TreeConstruction::TopDown, TreeConstruction::BottomUp] {
            let tree = Octree::from_points(&points, &charges, construction, 32, 10).unwrap();
            let options = options(0.4, AcceptanceCriterion::Radii);
            let mut fmm = Fmm::new(&tree, &kernel, &options);
            fmm.evaluate().unwrap();

            assert!(l2_error(&fmm.potentials(), &expected) < 1e-2);
            assert_eq!(fmm.local(tree.root()).map(|l| l.len()), Some(84));
            assert!(fmm.local(tree.n_boxes()).is_none());
        }
    }

    #[test]
    fn test_fmm_agrees_with_treecode() {
        let n = 1000;
        let points = points_fixture::<f64>(n, Some(-2.0), Some(2.0), Some(5));
        let charges = charges_fixture::<f64>(n, Some(6));
        let kernel = Laplace3dKernel::new(8);
        let tree = Octree::from_points(&points, &charges, TreeConstruction::TopDown, 16, 10).unwrap();
        let options = options(0.3, AcceptanceCriterion::Radii);

        let mut fmm = Fmm::new(&tree, &kernel, &options);
        fmm.evaluate().unwrap();
        let mut treecode = Treecode::new(&tree, &kernel, &options);
        treecode.evaluate().unwrap();

        assert!(l2_error(fmm.results(), treecode.results()) < 1e-4);
    }

    #[test]
    fn test_unit_kernel_is_exact() {
        let n = 2000;
        let points = points_fixture::<f64>(n, Some(-1.0), Some(1.0), Some(2));
        let charges = charges_fixture::<f64>(n, Some(3));
        let total: f64 = charges.iter().sum();
        let kernel = UnitKernel::new();

        for construction in [TreeConstruction::TopDown, TreeConstruction::BottomUp] {
            let tree = Octree::from_points(&points, &charges, construction, 24, 10).unwrap();
            for acceptance in [AcceptanceCriterion::BarnesHut, AcceptanceCriterion::Radii] {
                let mut fmm = Fmm::new(&tree, &kernel, &options(0.5, acceptance));
                fmm.evaluate().unwrap();

                for (result, charge) in fmm.potentials().iter().zip(charges.iter()) {
                    assert_relative_eq!(*result, total - charge, max_relative = 1e-10);
                }
            }
        }
    }

    #[test]
    fn test_construction_mode_does_not_change_results() {
        let n = 1500;
        let points = points_fixture::<f64>(n, None, None, Some(9));
        let charges = charges_fixture::<f64>(n, Some(10));
        let kernel = Laplace3dKernel::new(4);
        let options = options(0.5, AcceptanceCriterion::BarnesHut);

        let top_down = Octree::from_points(&points, &charges, TreeConstruction::TopDown, 20, 10).unwrap();
        let bottom_up = Octree::from_points(&points, &charges, TreeConstruction::BottomUp, 20, 10).unwrap();

        let mut a = Fmm::new(&top_down, &kernel, &options);
        a.evaluate().unwrap();
        let mut b = Fmm::new(&bottom_up, &kernel, &options);
        b.evaluate().unwrap();

        assert_eq!(a.results(), b.results());
        assert_eq!(a.name(), "FMM [top-down]");
        assert_eq!(b.name(), "FMM [bottom-up]");
    }

    #[test]
    fn test_timed_evaluation() {
        let points = points_fixture::<f64>(800, None, None, Some(0));
        let charges = charges_fixture::<f64>(800, Some(1));
        let kernel = Laplace3dKernel::new(3);
        let tree = Octree::from_points(&points, &charges, TreeConstruction::TopDown, 16, 10).unwrap();

        let untimed = options(0.5, AcceptanceCriterion::BarnesHut);
        let mut fmm = Fmm::new(&tree, &kernel, &untimed);
        fmm.evaluate().unwrap();
        assert!(fmm.operator_times().is_empty());

        let timed = FmmOptions { timed: true, ..untimed };
        let mut fmm = Fmm::new(&tree, &kernel, &timed);
        fmm.evaluate().unwrap();
        fmm.evaluate().unwrap();

        let stages = fmm
            .operator_times()
            .iter()
            .map(|t| t.operator)
            .collect::<Vec<_>>();
        assert_eq!(
            stages,
            vec![
                FmmOperatorType::Init,
                FmmOperatorType::Upward,
                FmmOperatorType::Interaction,
                FmmOperatorType::Downward
            ]
        );
    }

    #[test]
    fn test_no_bodies() {
        let mut tree = Octree::<f64, f64>::new(BoundingBox::unit());
        tree.construct(&[], &[], TreeConstruction::BottomUp, 8, 10).unwrap();
        let kernel = Laplace3dKernel::new(3);

        let mut fmm = Fmm::new(&tree, &kernel, &FmmOptions::default());
        fmm.evaluate().unwrap();
        assert!(fmm.results().is_empty());

        let mut treecode = Treecode::new(&tree, &kernel, &FmmOptions::default());
        treecode.evaluate().unwrap();
        assert!(treecode.results().is_empty());
    }

    #[test]
    fn test_unconstructed_tree() {
        let tree = Octree::<f64, f64>::new(BoundingBox::unit());
        let kernel = UnitKernel::new();
        let mut fmm = Fmm::new(&tree, &kernel, &FmmOptions::default());
        assert!(matches!(fmm.evaluate(), Err(FmmError::Failed(_))));
    }

    #[test]
    fn test_single_body() {
        let points = vec![Point([0.7, 0.1, 0.3])];
        let charges = vec![2.0];
        let tree = Octree::from_points(&points, &charges, TreeConstruction::BottomUp, 1, 10).unwrap();
        let kernel = Laplace3dKernel::new(2);

        let mut fmm = Fmm::new(&tree, &kernel, &FmmOptions::default());
        fmm.evaluate().unwrap();
        assert_eq!(fmm.results(), &[0.0]);
    }

    #[test]
    fn test_two_bodies() {
        let d = 0.8 * 3f64.sqrt();
        let points = vec![Point([0.1, 0.1, 0.1]), Point([0.9, 0.9, 0.9])];
        let charges = vec![1.0, 1.0];

        // Direct evaluation
        let tree = Octree::from_points(&points, &charges, TreeConstruction::TopDown, 1, 10).unwrap();
        let kernel = Laplace3dKernel::new(1);
        let mut fmm = Fmm::new(&tree, &kernel, &options(1e-6, AcceptanceCriterion::BarnesHut));
        fmm.evaluate().unwrap();
        for result in fmm.results() {
            assert_relative_eq!(*result, 1.0 / d, max_relative = 1e-14);
        }

        // Touching leaves always interact directly, so for an expansion to be used a third
        // body refines the tree around the first. All three lie on a diagonal, and the last
        // only sees the multipole expansion of the box holding the other two, which converges
        // to the exact value as the order grows.
        let points = vec![
            Point([0.1, 0.1, 0.1]),
            Point([0.15, 0.15, 0.15]),
            Point([0.9, 0.9, 0.9]),
        ];
        let charges = vec![1.0, 1.0, 1.0];
        let exact = 1.0 / (0.8 * 3f64.sqrt()) + 1.0 / (0.75 * 3f64.sqrt());
        let tree = Octree::from_points(&points, &charges, TreeConstruction::TopDown, 1, 10).unwrap();

        let mut previous = f64::INFINITY;
        for order in 1..=4 {
            let kernel = Laplace3dKernel::new(order);
            let mut treecode =
                Treecode::new(&tree, &kernel, &options(2.0, AcceptanceCriterion::BarnesHut));
            treecode.evaluate().unwrap();

            let error = (treecode.potentials()[2] - exact).abs();
            assert!(error < previous);
            assert!(error > 0.0);
            previous = error;
        }
        assert!(previous < 5e-3);
    }
}
