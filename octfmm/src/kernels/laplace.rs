//! Laplace kernel with Cartesian Taylor expansions.
use crate::{traits::general::Scalar, traits::kernel::Kernel, tree::types::Point};

/// Number of coefficients of an expansion of a given order, the number of multi-indices
/// `k = (kx, ky, kz)` with `|k| <= order`.
pub fn n_coeffs(order: usize) -> usize {
    (order + 1) * (order + 2) * (order + 3) / 6
}

/// Multi-indices with `|k| <= degree`, graded by degree and lexicographically descending
/// within a degree.
fn graded_indices(degree: usize) -> Vec<[usize; 3]> {
    let mut indices = Vec::with_capacity(n_coeffs(degree));
    for n in 0..=degree {
        for kx in (0..=n).rev() {
            for ky in (0..=n - kx).rev() {
                indices.push([kx, ky, n - kx - ky]);
            }
        }
    }
    indices
}

/// Powers `v_d^e` for each axis `d` and `0 <= e <= degree`.
fn powers<T: Scalar>(v: &Point<T>, degree: usize) -> [Vec<T>; 3] {
    let axis = |d: usize| {
        let mut p = Vec::with_capacity(degree + 1);
        let mut acc = T::one();
        for _ in 0..=degree {
            p.push(acc);
            acc *= v[d];
        }
        p
    };
    [axis(0), axis(1), axis(2)]
}

fn monomial<T: Scalar>(powers: &[Vec<T>; 3], k: &[usize; 3]) -> T {
    powers[0][k[0]] * powers[1][k[1]] * powers[2][k[2]]
}

/// The Laplace kernel in three dimensions, K(x, y) = 1 / |x - y|.
///
/// Expansions are Cartesian Taylor series truncated at total degree `order`, stored as one
/// coefficient per multi-index in graded order, see [`n_coeffs`].
///
/// - The multipole of a box about its centre `c` holds the moments `M_k = sum_j q_j (y_j - c)^k`.
/// - The local expansion holds coefficients `L_n` such that the potential near `c` is
///   `sum_n L_n (x - c)^n`.
///
/// Far field evaluation uses the Taylor coefficients `a_k(z) = D^k (1/|z|) / k!` computed with
/// the recurrence
///
/// `n |z|^2 a_k + (2n - 1) sum_d z_d a_{k - e_d} + (n - 1) sum_d a_{k - 2e_d} = 0`, `n = |k|`.
///
/// An empty expansion is treated as the zero expansion.
#[derive(Debug, Clone)]
pub struct Laplace3dKernel<T> {
    order: usize,

    n_coeffs: usize,

    /// Multi-indices up to degree `2 * order`, needed by M2L
    indices: Vec<[usize; 3]>,

    /// Dense map from a multi-index to its position in `indices`
    lookup: Vec<usize>,

    /// Width of each axis of `lookup`
    width: usize,

    /// Binomial coefficients up to `2 * order`
    pascal: Vec<Vec<T>>,

    /// For each local coefficient `n`, the terms `(k, k + n, (-1)^|k| C(k + n, n))` of M2L
    m2l_terms: Vec<Vec<(usize, usize, T)>>,
}

impl<T> Laplace3dKernel<T>
where
    T: Scalar,
{
    /// Constructor
    ///
    /// # Arguments
    /// * `order` - Truncation degree of the expansions.
    pub fn new(order: usize) -> Self {
        let max_degree = 2 * order;
        let width = max_degree + 1;
        let indices = graded_indices(max_degree);

        let mut lookup = vec![0; width * width * width];
        for (i, k) in indices.iter().enumerate() {
            lookup[(k[0] * width + k[1]) * width + k[2]] = i;
        }

        let mut pascal = vec![vec![T::zero(); width]; width];
        for n in 0..width {
            pascal[n][0] = T::one();
            for m in 1..=n {
                pascal[n][m] = pascal[n - 1][m - 1] + pascal[n - 1][m];
            }
        }

        let mut kernel = Self {
            order,
            n_coeffs: n_coeffs(order),
            indices,
            lookup,
            width,
            pascal,
            m2l_terms: Vec::new(),
        };

        let m2l_terms = kernel.indices[..kernel.n_coeffs]
            .iter()
            .map(|n| {
                kernel.indices[..kernel.n_coeffs]
                    .iter()
                    .map(|k| {
                        let kn = [k[0] + n[0], k[1] + n[1], k[2] + n[2]];
                        let sign = if (k[0] + k[1] + k[2]) % 2 == 0 {
                            T::one()
                        } else {
                            -T::one()
                        };
                        (
                            kernel.index(k),
                            kernel.index(&kn),
                            sign * kernel.binomial(&kn, n),
                        )
                    })
                    .collect()
            })
            .collect();
        kernel.m2l_terms = m2l_terms;

        kernel
    }

    fn index(&self, k: &[usize; 3]) -> usize {
        self.lookup[(k[0] * self.width + k[1]) * self.width + k[2]]
    }

    /// Multi-index binomial coefficient C(k, j), requires `j <= k` componentwise.
    fn binomial(&self, k: &[usize; 3], j: &[usize; 3]) -> T {
        self.pascal[k[0]][j[0]] * self.pascal[k[1]][j[1]] * self.pascal[k[2]][j[2]]
    }

    /// Taylor coefficients `a_k(z)` for `|k| <= degree`, in graded order.
    fn taylor_coefficients(&self, z: &Point<T>, degree: usize) -> Vec<T> {
        let n_terms = n_coeffs(degree);
        let mut a = vec![T::zero(); n_terms];

        let r2 = z.norm_squared();
        if r2 <= T::zero() {
            return a;
        }
        a[0] = T::one() / r2.sqrt();

        for (i, k) in self.indices[..n_terms].iter().enumerate().skip(1) {
            let n = k[0] + k[1] + k[2];
            let mut first = T::zero();
            let mut second = T::zero();

            for d in 0..3 {
                if k[d] >= 1 {
                    let mut km = *k;
                    km[d] -= 1;
                    first += z[d] * a[self.index(&km)];
                    if k[d] >= 2 {
                        km[d] -= 1;
                        second += a[self.index(&km)];
                    }
                }
            }

            a[i] = -(T::real((2 * n - 1) as f64) * first + T::real((n - 1) as f64) * second)
                / (T::real(n as f64) * r2);
        }

        a
    }

    fn reserve(&self, expansion: &mut Vec<T>) {
        if expansion.len() < self.n_coeffs {
            expansion.resize(self.n_coeffs, T::zero());
        }
    }
}

impl<T> Kernel for Laplace3dKernel<T>
where
    T: Scalar,
{
    type Scalar = T;
    type Charge = T;
    type Range = T;
    type Multipole = Vec<T>;
    type Local = Vec<T>;

    fn name(&self) -> String {
        "Laplace3dKernel".to_string()
    }

    fn expansion_order(&self) -> usize {
        self.order
    }

    fn eval(&self, target: &Point<T>, source: &Point<T>) -> T {
        let r2 = (*target - *source).norm_squared();
        if r2 > T::zero() {
            T::one() / r2.sqrt()
        } else {
            T::zero()
        }
    }

    fn p2p(&self, target: &Point<T>, source: &Point<T>, charge: &T, result: &mut T) {
        *result += self.eval(target, source) * *charge;
    }

    fn p2p_symmetric(
        &self,
        point_a: &Point<T>,
        charge_a: &T,
        result_a: &mut T,
        point_b: &Point<T>,
        charge_b: &T,
        result_b: &mut T,
    ) {
        let k = self.eval(point_a, point_b);
        *result_a += k * *charge_b;
        *result_b += k * *charge_a;
    }

    fn p2m(&self, point: &Point<T>, charge: &T, centre: &Point<T>, multipole: &mut Vec<T>) {
        self.reserve(multipole);
        let p = powers(&(*point - *centre), self.order);
        for (m, k) in multipole.iter_mut().zip(&self.indices[..self.n_coeffs]) {
            *m += *charge * monomial(&p, k);
        }
    }

    fn m2m(&self, child: &Vec<T>, r: &Point<T>, parent: &mut Vec<T>) {
        if child.is_empty() {
            return;
        }
        self.reserve(parent);
        let p = powers(r, self.order);

        // M'_k = sum_{j <= k} C(k, j) r^{k - j} M_j
        for (m, k) in parent.iter_mut().zip(&self.indices[..self.n_coeffs]) {
            for jx in 0..=k[0] {
                for jy in 0..=k[1] {
                    for jz in 0..=k[2] {
                        let j = [jx, jy, jz];
                        let d = [k[0] - jx, k[1] - jy, k[2] - jz];
                        *m += self.binomial(k, &j) * monomial(&p, &d) * child[self.index(&j)];
                    }
                }
            }
        }
    }

    fn m2l(&self, multipole: &Vec<T>, r0: &Point<T>, local: &mut Vec<T>) {
        if multipole.is_empty() || r0.norm_squared() <= T::zero() {
            return;
        }
        self.reserve(local);
        let a = self.taylor_coefficients(r0, 2 * self.order);

        for (l, terms) in local.iter_mut().zip(&self.m2l_terms) {
            for &(k, kn, coefficient) in terms {
                *l += coefficient * multipole[k] * a[kn];
            }
        }
    }

    fn l2l(&self, parent: &Vec<T>, r: &Point<T>, child: &mut Vec<T>) {
        if parent.is_empty() {
            return;
        }
        self.reserve(child);
        let p = powers(r, self.order);

        // L'_m = sum_{n >= m} C(n, m) r^{n - m} L_n
        for (l, m) in child.iter_mut().zip(&self.indices[..self.n_coeffs]) {
            let remainder = self.order - (m[0] + m[1] + m[2]);
            for dx in 0..=remainder {
                for dy in 0..=remainder - dx {
                    for dz in 0..=remainder - dx - dy {
                        let d = [dx, dy, dz];
                        let n = [m[0] + dx, m[1] + dy, m[2] + dz];
                        *l += self.binomial(&n, m) * monomial(&p, &d) * parent[self.index(&n)];
                    }
                }
            }
        }
    }

    fn l2p(&self, local: &Vec<T>, centre: &Point<T>, point: &Point<T>, result: &mut T) {
        let p = powers(&(*point - *centre), self.order);
        for (l, n) in local.iter().zip(&self.indices[..self.n_coeffs]) {
            *result += *l * monomial(&p, n);
        }
    }

    fn m2p(&self, multipole: &Vec<T>, centre: &Point<T>, point: &Point<T>, result: &mut T) {
        let z = *point - *centre;
        if multipole.is_empty() || z.norm_squared() <= T::zero() {
            return;
        }
        let a = self.taylor_coefficients(&z, self.order);

        for ((m, k), a_k) in multipole.iter().zip(&self.indices[..self.n_coeffs]).zip(&a) {
            if (k[0] + k[1] + k[2]) % 2 == 0 {
                *result += *a_k * *m;
            } else {
                *result -= *a_k * *m;
            }
        }
    }

    fn init_multipole(&self, _side_length: T) -> Vec<T> {
        vec![T::zero(); self.n_coeffs]
    }

    fn init_local(&self, _side_length: T) -> Vec<T> {
        vec![T::zero(); self.n_coeffs]
    }
}
