//! Validation of evaluation options.
use crate::{
    fmm::types::{AcceptanceCriterion, EvaluatorKind, FmmOptions},
    traits::{general::Scalar, kernel::Kernel, types::FmmError},
    tree::{constants::DEEPEST_LEVEL, types::TreeConstruction},
};

impl<T> Default for FmmOptions<T>
where
    T: Scalar,
{
    fn default() -> Self {
        FmmOptions {
            tree: TreeConstruction::TopDown,
            evaluator: EvaluatorKind::Fmm,
            theta: T::real(0.5),
            acceptance: AcceptanceCriterion::BarnesHut,
            n_crit: 64,
            max_level: 10,
            timed: false,
        }
    }
}

impl<T> FmmOptions<T>
where
    T: Scalar,
{
    /// Check that the options describe a valid evaluation.
    pub fn validate(&self) -> Result<(), FmmError> {
        if !self.theta.is_finite() || self.theta <= T::zero() {
            return Err(FmmError::InvalidConfig(format!(
                "theta must be positive and finite, found {}",
                self.theta
            )));
        }

        if self.n_crit == 0 {
            return Err(FmmError::InvalidConfig(
                "n_crit must be positive".to_string(),
            ));
        }

        if self.max_level > DEEPEST_LEVEL {
            return Err(FmmError::InvalidConfig(format!(
                "max_level={} exceeds the deepest level representable by a Morton key ({})",
                self.max_level, DEEPEST_LEVEL
            )));
        }

        Ok(())
    }

    /// Check the options together with the kernel they will be used with.
    pub fn validate_with<K>(&self, kernel: &K) -> Result<(), FmmError>
    where
        K: Kernel<Scalar = T>,
    {
        self.validate()?;

        if kernel.expansion_order() < 1 {
            return Err(FmmError::InvalidConfig(format!(
                "expansion order of {} must be at least 1",
                kernel.name()
            )));
        }

        Ok(())
    }
}
