use log::debug;

use crate::error::{NumboxError, Result};
use crate::matrix::Matrix;
use crate::ops;
use crate::vector::Vector;

/// Householder QR factorization `A = Q * R` of an `m x n` matrix with `m >= n`.
///
/// Each reflector is kept as its vector `v_k` (acting on rows `k..m`) and its
/// scale `tau_k`, so that `H_k = I - tau_k * v_k * v_k^T`.
#[derive(Debug, Clone)]
pub struct QrDecomp {
    r: Matrix,
    reflectors: Vec<(Vec<f64>, f64)>,
    tolerance: f64,
}

impl QrDecomp {
    pub const DEFAULT_TOLERANCE: f64 = 1e-12;

    pub fn new(a: &Matrix) -> Result<Self> {
        Self::with_tolerance(a, Self::DEFAULT_TOLERANCE)
    }

    /// # Errors
    /// `DimensionMismatch` if `a` has fewer rows than columns, `InvalidSize`
    /// for a negative or NaN tolerance.
    pub fn with_tolerance(a: &Matrix, tolerance: f64) -> Result<Self> {
        if tolerance.is_nan() || tolerance < 0.0 {
            return Err(NumboxError::InvalidSize(format!(
                "rank tolerance must be non-negative, got {}",
                tolerance
            )));
        }
        let (m, n) = a.dims();
        if m < n {
            return Err(NumboxError::DimensionMismatch(format!(
                "QR needs at least as many rows as columns, got {}x{}",
                m, n
            )));
        }

        let mut r = a.clone();
        let mut reflectors = Vec::with_capacity(n);
        let data = r.as_mut_slice();

        for k in 0..n {
            let mut v: Vec<f64> = (k..m).map(|i| data[i * n + k]).collect();
            let norm = ops::norm2(&v);
            if norm == 0.0 {
                reflectors.push((v, 0.0));
                continue;
            }
            let alpha = if v[0] > 0.0 { -norm } else { norm };
            v[0] -= alpha;
            let vv = ops::dot(&v, &v);
            let tau = if vv == 0.0 { 0.0 } else { 2.0 / vv };

            for j in k..n {
                let s: f64 = v
                    .iter()
                    .enumerate()
                    .map(|(i, vi)| vi * data[(k + i) * n + j])
                    .sum();
                for (i, vi) in v.iter().enumerate() {
                    data[(k + i) * n + j] -= tau * s * vi;
                }
            }
            for i in k + 1..m {
                data[i * n + k] = 0.0;
            }
            reflectors.push((v, tau));
        }

        debug!("QR factorization of {}x{} matrix done", m, n);
        Ok(Self {
            r,
            reflectors,
            tolerance,
        })
    }

    pub fn dims(&self) -> (usize, usize) {
        self.r.dims()
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// The `m x n` upper-trapezoidal factor.
    pub fn r(&self) -> Matrix {
        self.r.clone()
    }

    /// The full `m x m` orthogonal factor.
    pub fn q(&self) -> Result<Matrix> {
        let m = self.r.rows();
        let mut data = vec![0.0; m * m];
        for j in 0..m {
            let mut e = vec![0.0; m];
            e[j] = 1.0;
            for (k, (v, tau)) in self.reflectors.iter().enumerate().rev() {
                reflect(&mut e[k..], v, *tau);
            }
            for (i, val) in e.into_iter().enumerate() {
                data[i * m + j] = val;
            }
        }
        Matrix::from_row_major(m, m, data)
    }

    /// `Q^T * b` in place.
    fn apply_qt(&self, b: &mut [f64]) {
        for (k, (v, tau)) in self.reflectors.iter().enumerate() {
            reflect(&mut b[k..], v, *tau);
        }
    }

    /// True if a diagonal entry of `R` is within the tolerance of zero.
    pub fn is_rank_deficient(&self) -> bool {
        let n = self.r.cols();
        (0..n).any(|i| self.r[(i, i)].abs() <= self.tolerance)
    }

    /// Least-squares solution minimizing `|A * x - b|_2`.
    ///
    /// # Errors
    /// * `DimensionMismatch` unless `b.len()` equals the row count.
    /// * `SingularMatrix` if `A` is rank deficient.
    pub fn lstsq(&self, b: &Vector) -> Result<Vector> {
        let (m, n) = self.r.dims();
        if b.len() != m {
            return Err(NumboxError::DimensionMismatch(format!(
                "right-hand side of length {} for a {}x{} system",
                b.len(),
                m,
                n
            )));
        }
        if self.is_rank_deficient() {
            return Err(NumboxError::SingularMatrix);
        }
        let mut y = b.to_vec();
        self.apply_qt(&mut y);

        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let mut s = y[i];
            for j in i + 1..n {
                s -= self.r[(i, j)] * x[j];
            }
            x[i] = s / self.r[(i, i)];
        }
        Ok(Vector::from(x))
    }

    /// Exact solve of a square system.
    pub fn solve(&self, b: &Vector) -> Result<Vector> {
        let (m, n) = self.r.dims();
        if m != n {
            return Err(NumboxError::NotSquare { rows: m, cols: n });
        }
        self.lstsq(b)
    }
}

fn reflect(x: &mut [f64], v: &[f64], tau: f64) {
    if tau == 0.0 {
        return;
    }
    let s = ops::dot(v, x);
    ops::axpy(-tau * s, v, x);
}
