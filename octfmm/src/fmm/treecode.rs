//! Barnes-Hut style treecode.
use log::trace;

use crate::{
    fmm::{
        dispatch::{ExpansionContext, InitM, M2M, M2P, P2M, P2P},
        helpers::optionally_time,
        types::{AcceptanceCriterion, FmmOptions, Treecode},
    },
    traits::{
        fmm::Evaluate,
        kernel::Kernel,
        tree::FmmTree,
        types::{FmmError, FmmOperatorTime, FmmOperatorType},
    },
    tree::types::Octree,
};

impl<'a, K> Treecode<'a, K>
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
        Treecode {
            tree,
            kernel,
            theta: options.theta,
            acceptance: options.acceptance,
            timed: options.timed,
            multipoles: Vec::new(),
            results: Vec::new(),
            operator_times: Vec::new(),
        }
    }
}

/// Form the multipole expansion of every box, children before their parents.
pub(crate) fn upward_pass<K: Kernel>(kernel: &K, context: &mut ExpansionContext<'_, K>) {
    let tree = context.tree;

    // Boxes are stored in level order, so a reverse sweep visits children first
    for index in (0..tree.n_boxes()).rev() {
        InitM::eval(kernel, context, index);
        if tree.is_leaf(index) {
            P2M::eval(kernel, context, index);
        } else {
            for child in tree.children(index) {
                M2M::eval(kernel, context, child, index);
            }
        }
    }
}

/// Walk the tree from the root for every target leaf.
fn interaction_pass<K: Kernel>(
    kernel: &K,
    context: &mut ExpansionContext<'_, K>,
    theta: K::Scalar,
    acceptance: AcceptanceCriterion,
) {
    let tree = context.tree;
    let root = tree.root();
    let mut stack = Vec::new();

    for target in (0..tree.n_boxes()).filter(|&index| tree.is_leaf(index)) {
        let target_key = tree.boxes[target].key;
        stack.push(root);

        while let Some(source) = stack.pop() {
            if source == target {
                P2P::eval(kernel, context, source, target);
            } else if tree.boxes[source].key.is_ancestor(&target_key) {
                stack.extend(tree.children(source));
            } else if acceptance.accept_m2p(tree, theta, source, target) {
                M2P::eval(kernel, context, source, target);
            } else if tree.is_leaf(source) {
                P2P::eval(kernel, context, source, target);
            } else {
                stack.extend(tree.children(source));
            }
        }
    }
}

impl<'a, K> Evaluate for Treecode<'a, K>
where
    K: Kernel,
{
    type Kernel = K;
    type Tree = Octree<K::Scalar, K::Charge>;

    fn name(&self) -> String {
        match self.tree.construction {
            Some(construction) => format!("Treecode [{}]", construction),
            None => "Treecode".to_string(),
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

        self.operator_times.clear();
        self.multipoles = vec![K::Multipole::default(); tree.n_boxes()];
        self.results = vec![K::Range::default(); tree.n_bodies()];

        let mut no_locals: Vec<K::Local> = Vec::new();
        let mut context = ExpansionContext {
            tree,
            multipoles: &mut self.multipoles,
            locals: &mut no_locals,
            results: &mut self.results,
        };

        trace!("{}: upward pass over {} boxes", kernel.name(), tree.n_boxes());
        let ((), duration) = optionally_time(timed, || upward_pass(kernel, &mut context));
        if let Some(d) = duration {
            self.operator_times
                .push(FmmOperatorTime::from_duration(FmmOperatorType::Upward, d));
        }

        trace!("{}: interaction pass over {} leaves", kernel.name(), tree.n_leaves());
        let ((), duration) = optionally_time(timed, || {
            interaction_pass(kernel, &mut context, theta, acceptance)
        });
        if let Some(d) = duration {
            self.operator_times.push(FmmOperatorTime::from_duration(
                FmmOperatorType::Interaction,
                d,
            ));
        }

        Ok(())
    }

    fn results(&self) -> &[K::Range] {
        &self.results
    }

    fn multipole(&self, index: usize) -> Option<&K::Multipole> {
        self.multipoles.get(index)
    }

    fn local(&self, _index: usize) -> Option<&K::Local> {
        None
    }

    fn operator_times(&self) -> &[FmmOperatorTime] {
        &self.operator_times
    }
}
