//! Constant kernel with exact scalar expansions.
use std::marker::PhantomData;

use crate::{traits::general::Scalar, traits::kernel::Kernel, tree::types::Point};

/// The kernel K(x, y) = 1.
///
/// Multipole and local expansions are single scalars holding the charge they summarise, and
/// every translation passes that value on unchanged. Expansions therefore carry no truncation
/// error, and any correct evaluation gives each body the total charge of all other bodies.
///
/// The kernel relies on the default `init_multipole` and `init_local`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitKernel<T> {
    _marker: PhantomData<T>,
}

impl<T> UnitKernel<T>
where
    T: Scalar,
{
    /// Constructor
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Kernel for UnitKernel<T>
where
    T: Scalar,
{
    type Scalar = T;
    type Charge = T;
    type Range = T;
    type Multipole = T;
    type Local = T;

    fn name(&self) -> String {
        "UnitKernel".to_string()
    }

    fn eval(&self, _target: &Point<T>, _source: &Point<T>) -> T {
        T::one()
    }

    fn p2p(&self, _target: &Point<T>, _source: &Point<T>, charge: &T, result: &mut T) {
        *result += *charge;
    }

    fn p2p_symmetric(
        &self,
        _point_a: &Point<T>,
        charge_a: &T,
        result_a: &mut T,
        _point_b: &Point<T>,
        charge_b: &T,
        result_b: &mut T,
    ) {
        *result_a += *charge_b;
        *result_b += *charge_a;
    }

    fn p2m(&self, _point: &Point<T>, charge: &T, _centre: &Point<T>, multipole: &mut T) {
        *multipole += *charge;
    }

    fn m2m(&self, child: &T, _r: &Point<T>, parent: &mut T) {
        *parent += *child;
    }

    fn m2l(&self, multipole: &T, _r0: &Point<T>, local: &mut T) {
        *local += *multipole;
    }

    fn l2l(&self, parent: &T, _r: &Point<T>, child: &mut T) {
        *child += *parent;
    }

    fn l2p(&self, local: &T, _centre: &Point<T>, _point: &Point<T>, result: &mut T) {
        *result += *local;
    }

    fn m2p(&self, multipole: &T, _centre: &Point<T>, _point: &Point<T>, result: &mut T) {
        *result += *multipole;
    }
}
