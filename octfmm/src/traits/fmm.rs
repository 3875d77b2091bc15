//! FMM traits
use crate::traits::{
    kernel::Kernel,
    tree::FmmTree,
    types::{FmmError, FmmOperatorTime},
};

/// Interface shared by every evaluation strategy.
///
/// Evaluators are created by [`crate::create_evaluator`] from a constructed tree, a kernel and
/// a set of options, and are used through this trait object.
pub trait Evaluate {
    /// Kernel associated with this evaluator
    type Kernel: Kernel;

    /// Tree associated with this evaluator
    type Tree: FmmTree<
        Scalar = <Self::Kernel as Kernel>::Scalar,
        Charge = <Self::Kernel as Kernel>::Charge,
    >;

    /// Name of the evaluation strategy and tree construction mode
    fn name(&self) -> String;

    /// Get the kernel associated with this evaluator
    fn kernel(&self) -> &Self::Kernel;

    /// Get the tree associated with this evaluator
    fn tree(&self) -> &Self::Tree;

    /// Run the evaluation, overwriting any previous results.
    fn evaluate(&mut self) -> Result<(), FmmError>;

    /// Results for each body, in the sorted body order of the tree
    fn results(&self) -> &[<Self::Kernel as Kernel>::Range];

    /// Get the multipole expansion associated with a box
    ///
    /// # Arguments
    /// * `index` - Index of the box.
    fn multipole(&self, index: usize) -> Option<&<Self::Kernel as Kernel>::Multipole>;

    /// Get the local expansion associated with a box, evaluators without local expansions return `None`.
    ///
    /// # Arguments
    /// * `index` - Index of the box.
    fn local(&self, index: usize) -> Option<&<Self::Kernel as Kernel>::Local>;

    /// Timings recorded during the last evaluation, empty unless timing was requested
    fn operator_times(&self) -> &[FmmOperatorTime];

    /// Results permuted back into the order the points were supplied in
    fn potentials(&self) -> Vec<<Self::Kernel as Kernel>::Range> {
        let bodies = self.tree().all_bodies();
        let mut potentials = vec![<Self::Kernel as Kernel>::Range::default(); bodies.len()];
        for (body, result) in bodies.iter().zip(self.results()) {
            potentials[body.index] = result.clone();
        }
        potentials
    }
}
