//! Builder objects to construct evaluators
use log::debug;

use crate::{
    fmm::types::{EvaluatorKind, Fmm, FmmOptions, FmmPlan, FmmPlanBuilder, Treecode},
    traits::{fmm::Evaluate, kernel::Kernel, types::FmmError},
    tree::types::{BoundingBox, Octree, Point},
};

/// Evaluator trait object over an octree, as returned by [`create_evaluator`].
pub type DynEvaluator<'a, K> = Box<
    dyn Evaluate<
            Kernel = K,
            Tree = Octree<<K as Kernel>::Scalar, <K as Kernel>::Charge>,
        > + 'a,
>;

/// Create an evaluator of the kind selected by `options`.
///
/// # Arguments
/// * `tree` - An octree constructed in the mode selected by `options`.
/// * `kernel` - Kernel to evaluate.
/// * `options` - Evaluation options, validated against the kernel.
pub fn create_evaluator<'a, K>(
    tree: &'a Octree<K::Scalar, K::Charge>,
    kernel: &'a K,
    options: &FmmOptions<K::Scalar>,
) -> Result<DynEvaluator<'a, K>, FmmError>
where
    K: Kernel + 'a,
{
    options.validate_with(kernel)?;

    let Some(construction) = tree.construction else {
        return Err(FmmError::Failed(
            "Evaluators can only be created over a constructed tree".to_string(),
        ));
    };

    if construction != options.tree {
        return Err(FmmError::InvalidConfig(format!(
            "Tree was constructed {} but options select {}",
            construction, options.tree
        )));
    }

    let evaluator: DynEvaluator<'a, K> = match options.evaluator {
        EvaluatorKind::Treecode => Box::new(Treecode::new(tree, kernel, options)),
        EvaluatorKind::Fmm => Box::new(Fmm::new(tree, kernel, options)),
    };

    debug!(
        "Created {} evaluator for {} of order {}, theta={} ({:?})",
        evaluator.name(),
        kernel.name(),
        kernel.expansion_order(),
        options.theta,
        options.acceptance
    );

    Ok(evaluator)
}

impl<K> Default for FmmPlanBuilder<K>
where
    K: Kernel,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> FmmPlanBuilder<K>
where
    K: Kernel,
{
    /// Initialise an empty plan builder
    pub fn new() -> Self {
        Self {
            points: None,
            charges: None,
            bounding_box: None,
            kernel: None,
            options: None,
        }
    }

    /// Attach bodies to the builder, and compute their bounding box.
    ///
    /// An empty set of bodies is accepted and is placed in a unit bounding box.
    ///
    /// # Arguments
    /// * `points` - Body positions, must be finite.
    /// * `charges` - Body charges, one per point.
    pub fn tree(
        mut self,
        points: &[Point<K::Scalar>],
        charges: &[K::Charge],
    ) -> Result<Self, FmmError> {
        if points.len() != charges.len() {
            return Err(FmmError::InvalidConfig(format!(
                "Number of points ({}) does not match number of charges ({})",
                points.len(),
                charges.len()
            )));
        }

        let bounding_box = if points.is_empty() {
            BoundingBox::unit()
        } else {
            BoundingBox::from_points(points)?
        };

        self.points = Some(points.to_vec());
        self.charges = Some(charges.to_vec());
        self.bounding_box = Some(bounding_box);
        Ok(self)
    }

    /// Set the kernel and evaluation options.
    ///
    /// # Arguments
    /// * `kernel` - Kernel to evaluate.
    /// * `options` - Evaluation options, validated against the kernel.
    pub fn parameters(
        mut self,
        kernel: K,
        options: FmmOptions<K::Scalar>,
    ) -> Result<Self, FmmError> {
        if self.points.is_none() {
            return Err(FmmError::Failed(
                "Must attach bodies with `tree` before setting parameters".to_string(),
            ));
        }

        options.validate_with(&kernel)?;
        self.kernel = Some(kernel);
        self.options = Some(options);
        Ok(self)
    }

    /// Construct the octree and finalise the plan.
    pub fn build(self) -> Result<FmmPlan<K>, FmmError> {
        let (Some(points), Some(charges), Some(bounding_box)) =
            (self.points, self.charges, self.bounding_box)
        else {
            return Err(FmmError::Failed(
                "Must attach bodies with `tree` before building".to_string(),
            ));
        };

        let (Some(kernel), Some(options)) = (self.kernel, self.options) else {
            return Err(FmmError::Failed(
                "Must set a kernel and options with `parameters` before building".to_string(),
            ));
        };

        let mut tree = Octree::new(bounding_box);
        tree.construct(
            &points,
            &charges,
            options.tree,
            options.n_crit,
            options.max_level,
        )?;

        Ok(FmmPlan {
            bounding_box,
            tree,
            kernel,
            options,
        })
    }
}

impl<K> FmmPlan<K>
where
    K: Kernel,
{
    /// Create the evaluator selected by the options of this plan.
    pub fn evaluator(&self) -> Result<DynEvaluator<'_, K>, FmmError> {
        create_evaluator(&self.tree, &self.kernel, &self.options)
    }

    /// Name of the evaluation strategy and tree construction mode, e.g. `FMM [top-down]`.
    pub fn evaluator_name(&self) -> Result<String, FmmError> {
        Ok(self.evaluator()?.name())
    }

    /// Run an evaluation, returning the result at each body in the order the points were
    /// supplied in.
    pub fn execute(&self) -> Result<Vec<K::Range>, FmmError> {
        let mut evaluator = self.evaluator()?;
        evaluator.evaluate()?;
        Ok(evaluator.potentials())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        fmm::{
            helpers::{charges_fixture, direct_evaluate, l2_error, points_fixture},
            types::AcceptanceCriterion,
        },
        kernels::{Laplace3dKernel, UnitKernel},
        traits::tree::FmmTree,
        tree::types::TreeConstruction,
    };
    use approx::assert_relative_eq;

    #[test]
    fn test_evaluator_selection() {
        let points = points_fixture::<f64>(300, None, None, Some(0));
        let charges = charges_fixture::<f64>(300, Some(1));
        let kernel = UnitKernel::new();

        let expected = [
            (TreeConstruction::TopDown, EvaluatorKind::Treecode, "Treecode [top-down]"),
            (TreeConstruction::BottomUp, EvaluatorKind::Treecode, "Treecode [bottom-up]"),
            (TreeConstruction::TopDown, EvaluatorKind::Fmm, "FMM [top-down]"),
            (TreeConstruction::BottomUp, EvaluatorKind::Fmm, "FMM [bottom-up]"),
        ];

        for (tree, evaluator, name) in expected {
            let options = FmmOptions {
                tree,
                evaluator,
                n_crit: 16,
                ..FmmOptions::default()
            };
            let octree = Octree::from_points(&points, &charges, tree, 16, 10).unwrap();
            let mut evaluator = create_evaluator(&octree, &kernel, &options).unwrap();
            assert_eq!(evaluator.name(), name);

            evaluator.evaluate().unwrap();
            assert_eq!(evaluator.results().len(), 300);
            assert_eq!(evaluator.local(0).is_some(), options.evaluator == EvaluatorKind::Fmm);
        }
    }

    #[test]
    fn test_accuracy_improves_as_theta_decreases() {
        let n = 2000;
        let points = points_fixture::<f64>(n, None, None, Some(0));
        let charges = charges_fixture::<f64>(n, Some(1));
        let kernel = Laplace3dKernel::new(3);
        let expected = direct_evaluate(&kernel, &points, &charges);
        let tree = Octree::from_points(&points, &charges, TreeConstruction::TopDown, 32, 10).unwrap();
        let thetas = (2..=10).rev().map(|i| i as f64 / 10.0).collect::<Vec<_>>();

        for evaluator in [EvaluatorKind::Treecode, EvaluatorKind::Fmm] {
            for acceptance in [AcceptanceCriterion::BarnesHut, AcceptanceCriterion::Radii] {
                let errors = thetas
                    .iter()
                    .map(|&theta| {
                        let options = FmmOptions {
                            evaluator,
                            theta,
                            acceptance,
                            n_crit: 32,
                            ..FmmOptions::default()
                        };
                        let mut fmm = create_evaluator(&tree, &kernel, &options).unwrap();
                        fmm.evaluate().unwrap();
                        l2_error(&fmm.potentials(), &expected)
                    })
                    .collect::<Vec<_>>();

                for (theta, pair) in thetas.iter().skip(1).zip(errors.windows(2)) {
                    assert!(
                        pair[1] <= pair[0],
                        "{evaluator} {acceptance:?}: error {:e} at theta={theta} exceeds {:e}",
                        pair[1],
                        pair[0]
                    );
                }
                assert!(errors[errors.len() - 1] < errors[0]);
            }
        }
    }

    #[test]
    fn test_create_evaluator_errors() {
        let kernel = Laplace3dKernel::<f64>::new(3);

        let unconstructed = Octree::<f64, f64>::new(BoundingBox::unit());
        assert!(matches!(
            create_evaluator(&unconstructed, &kernel, &FmmOptions::default()),
            Err(FmmError::Failed(_))
        ));

        let points = points_fixture::<f64>(10, None, None, None);
        let charges = vec![1.0; 10];
        let tree = Octree::from_points(&points, &charges, TreeConstruction::TopDown, 4, 5).unwrap();
        let options = FmmOptions {
            theta: -1.0,
            ..FmmOptions::default()
        };
        assert!(matches!(
            create_evaluator(&tree, &kernel, &options),
            Err(FmmError::InvalidConfig(_))
        ));

        // The tree must have been built in the selected mode
        let options = FmmOptions {
            tree: TreeConstruction::BottomUp,
            ..FmmOptions::default()
        };
        assert!(matches!(
            create_evaluator(&tree, &kernel, &options),
            Err(FmmError::InvalidConfig(_))
        ));
        let bottom_up = Octree::from_points(&points, &charges, TreeConstruction::BottomUp, 4, 5).unwrap();
        let evaluator = create_evaluator(&bottom_up, &kernel, &options).unwrap();
        assert_eq!(evaluator.name(), "FMM [bottom-up]");
    }

    #[test]
    fn test_plan_execute() {
        let n = 1000;
        let points = points_fixture::<f64>(n, Some(-3.0), Some(5.0), Some(4));
        let charges = charges_fixture::<f64>(n, Some(5));
        let kernel = Laplace3dKernel::new(6);
        let expected = direct_evaluate(&kernel, &points, &charges);

        for evaluator in [EvaluatorKind::Treecode, EvaluatorKind::Fmm] {
            let options = FmmOptions {
                evaluator,
                theta: 0.4,
                acceptance: AcceptanceCriterion::Radii,
                n_crit: 20,
                ..FmmOptions::default()
            };

            let plan = FmmPlanBuilder::new()
                .tree(&points, &charges)
                .unwrap()
                .parameters(kernel.clone(), options)
                .unwrap()
                .build()
                .unwrap();

            assert_eq!(plan.tree.n_bodies(), n);
            let potentials = plan.execute().unwrap();
            assert!(l2_error(&potentials, &expected) < 1e-2);
        }
    }

    #[test]
    fn test_plan_of_no_bodies() {
        let plan = FmmPlanBuilder::<Laplace3dKernel<f64>>::new()
            .tree(&[], &[])
            .unwrap()
            .parameters(Laplace3dKernel::new(2), FmmOptions::default())
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(plan.bounding_box, BoundingBox::unit());
        assert!(plan.execute().unwrap().is_empty());
    }

    #[test]
    fn test_two_body_plan() {
        let points = vec![Point([0.0, 0.0, 0.0]), Point([0.0, 0.0, 0.5])];
        let charges = vec![1.0, 1.0];

        let plan = FmmPlanBuilder::new()
            .tree(&points, &charges)
            .unwrap()
            .parameters(Laplace3dKernel::<f64>::new(1), FmmOptions::default())
            .unwrap()
            .build()
            .unwrap();

        for potential in plan.execute().unwrap() {
            assert_relative_eq!(potential, 2.0, max_relative = 1e-14);
        }
    }

    #[test]
    fn test_builder_errors() {
        let points = points_fixture::<f64>(10, None, None, None);
        let charges = vec![1.0; 9];

        let result = FmmPlanBuilder::<UnitKernel<f64>>::new().tree(&points, &charges);
        assert!(matches!(result, Err(FmmError::InvalidConfig(_))));

        let result =
            FmmPlanBuilder::new().parameters(UnitKernel::<f64>::new(), FmmOptions::default());
        assert!(matches!(result, Err(FmmError::Failed(_))));

        let result = FmmPlanBuilder::<UnitKernel<f64>>::new()
            .tree(&points, &[1.0; 10])
            .unwrap()
            .build();
        assert!(matches!(result, Err(FmmError::Failed(_))));

        let bad = vec![Point([f64::NAN, 0.0, 0.0])];
        let result = FmmPlanBuilder::<UnitKernel<f64>>::new().tree(&bad, &[1.0]);
        assert!(matches!(result, Err(FmmError::Io(_))));

        let options = FmmOptions {
            n_crit: 0,
            ..FmmOptions::default()
        };
        let result = FmmPlanBuilder::new()
            .tree(&points, &[1.0; 10])
            .unwrap()
            .parameters(Laplace3dKernel::new(2), options);
        assert!(matches!(result, Err(FmmError::InvalidConfig(_))));
    }
}
