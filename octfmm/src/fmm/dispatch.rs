//! Per operator dispatch.
//!
//! Each dispatcher unpacks box geometry, body ranges and expansion storage from an
//! [`ExpansionContext`] and forwards to the corresponding [`Kernel`] operator. Optional kernel
//! operators resolve to the trait's default bodies at compile time.
use crate::{
    traits::{kernel::Kernel, tree::FmmTree},
    tree::types::Octree,
};

/// Mutable state of an evaluation, borrowed for the duration of a pass.
pub struct ExpansionContext<'a, K>
where
    K: Kernel,
{
    /// Tree being evaluated over
    pub tree: &'a Octree<K::Scalar, K::Charge>,

    /// Multipole expansion of each box
    pub multipoles: &'a mut [K::Multipole],

    /// Local expansion of each box, empty for evaluators without local expansions
    pub locals: &'a mut [K::Local],

    /// Result at each body, in tree order
    pub results: &'a mut [K::Range],
}

/// Borrow one element of a slice immutably and another mutably.
///
/// # Panics
/// If `read == write`.
fn pair_mut<T>(data: &mut [T], read: usize, write: usize) -> (&T, &mut T) {
    assert_ne!(read, write, "cannot alias an expansion with itself");
    if read < write {
        let (head, tail) = data.split_at_mut(write);
        (&head[read], &mut tail[0])
    } else {
        let (head, tail) = data.split_at_mut(read);
        (&tail[0], &mut head[write])
    }
}

/// Initialise the multipole expansion of a box.
pub struct InitM;

impl InitM {
    /// Overwrite the multipole expansion of `index` with the kernel's initial value.
    pub fn eval<K: Kernel>(kernel: &K, context: &mut ExpansionContext<'_, K>, index: usize) {
        let side_length = context.tree.side_length(index);
        context.multipoles[index] = kernel.init_multipole(side_length);
    }
}

/// Initialise the local expansion of a box.
pub struct InitL;

impl InitL {
    /// Overwrite the local expansion of `index` with the kernel's initial value.
    pub fn eval<K: Kernel>(kernel: &K, context: &mut ExpansionContext<'_, K>, index: usize) {
        let side_length = context.tree.side_length(index);
        context.locals[index] = kernel.init_local(side_length);
    }
}

/// Particle to multipole.
pub struct P2M;

impl P2M {
    /// Accumulate every body of `index` into its multipole expansion.
    pub fn eval<K: Kernel>(kernel: &K, context: &mut ExpansionContext<'_, K>, index: usize) {
        let tree = context.tree;
        let centre = tree.centre(index);
        let multipole = &mut context.multipoles[index];

        for body in tree.bodies(index) {
            kernel.p2m(&body.point, &body.charge, &centre, multipole);
        }
    }
}

/// Multipole to multipole.
pub struct M2M;

impl M2M {
    /// Shift the multipole expansion of `child` into `parent`.
    pub fn eval<K: Kernel>(
        kernel: &K,
        context: &mut ExpansionContext<'_, K>,
        child: usize,
        parent: usize,
    ) {
        let r = context.tree.centre(child) - context.tree.centre(parent);
        let (source, target) = pair_mut(&mut *context.multipoles, child, parent);
        kernel.m2m(source, &r, target);
    }
}

/// Multipole to local.
pub struct M2L;

impl M2L {
    /// Translate the multipole expansion of `source` into the local expansion of `target`.
    pub fn eval<K: Kernel>(
        kernel: &K,
        context: &mut ExpansionContext<'_, K>,
        source: usize,
        target: usize,
    ) {
        let r0 = context.tree.centre(target) - context.tree.centre(source);
        kernel.m2l(&context.multipoles[source], &r0, &mut context.locals[target]);
    }
}

/// Local to local.
pub struct L2L;

impl L2L {
    /// Shift the local expansion of `parent` into `child`.
    pub fn eval<K: Kernel>(
        kernel: &K,
        context: &mut ExpansionContext<'_, K>,
        parent: usize,
        child: usize,
    ) {
        let r = context.tree.centre(child) - context.tree.centre(parent);
        let (source, target) = pair_mut(&mut *context.locals, parent, child);
        kernel.l2l(source, &r, target);
    }
}

/// Local to particle.
pub struct L2P;

impl L2P {
    /// Evaluate the local expansion of `index` at each of its bodies.
    pub fn eval<K: Kernel>(kernel: &K, context: &mut ExpansionContext<'_, K>, index: usize) {
        let tree = context.tree;
        let centre = tree.centre(index);
        let local = &context.locals[index];
        let range = tree.body_range(index);

        for (body, result) in tree.bodies(index).iter().zip(&mut context.results[range]) {
            kernel.l2p(local, &centre, &body.point, result);
        }
    }
}

/// Multipole to particle.
pub struct M2P;

impl M2P {
    /// Evaluate the multipole expansion of `source` at each body of `target`.
    pub fn eval<K: Kernel>(
        kernel: &K,
        context: &mut ExpansionContext<'_, K>,
        source: usize,
        target: usize,
    ) {
        let tree = context.tree;
        let centre = tree.centre(source);
        let multipole = &context.multipoles[source];
        let range = tree.body_range(target);

        for (body, result) in tree.bodies(target).iter().zip(&mut context.results[range]) {
            kernel.m2p(multipole, &centre, &body.point, result);
        }
    }
}

/// Particle to particle.
pub struct P2P;

impl P2P {
    /// Direct interaction of the bodies of `source` with the bodies of `target`.
    ///
    /// A box interacting with itself visits each unordered pair of distinct bodies once, through
    /// the kernel's symmetric operator. Otherwise only the results of `target` are updated. A
    /// body is never paired with itself.
    pub fn eval<K: Kernel>(
        kernel: &K,
        context: &mut ExpansionContext<'_, K>,
        source: usize,
        target: usize,
    ) {
        let tree = context.tree;
        let bodies = tree.all_bodies();

        if source == target {
            let range = tree.body_range(target);
            for j in range.clone() {
                for i in range.start..j {
                    let (head, tail) = context.results.split_at_mut(j);
                    kernel.p2p_symmetric(
                        &bodies[i].point,
                        &bodies[i].charge,
                        &mut head[i],
                        &bodies[j].point,
                        &bodies[j].charge,
                        &mut tail[0],
                    );
                }
            }
        } else {
            let sources = tree.body_range(source);
            for i in tree.body_range(target) {
                let result = &mut context.results[i];
                for j in sources.clone() {
                    if i != j {
                        kernel.p2p(&bodies[i].point, &bodies[j].point, &bodies[j].charge, result);
                    }
                }
            }
        }
    }
}
