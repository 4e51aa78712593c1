use log::{debug, trace, warn};

use crate::error::{NumboxError, Result};
use crate::matrix::Matrix;
use crate::vector::Vector;

/// LU factorization `P * A = L * U` of a square matrix, with partial pivoting.
///
/// The factors live in one combined working matrix: `U` on and above the
/// diagonal, the multipliers of the unit-diagonal `L` below it. The source
/// matrix is copied at construction, so later changes to it never show up here.
///
/// Construction succeeds for singular matrices. [`LuDecomp::det`] then reports
/// zero while [`LuDecomp::solve`] and [`LuDecomp::inv`] fail with `SingularMatrix`.
#[derive(Debug, Clone)]
pub struct LuDecomp {
    lu: Matrix,
    perm: Vec<usize>,
    sign: i32,
    tolerance: f64,
}

impl LuDecomp {
    /// Pivots with magnitude at or below this are treated as zero.
    pub const DEFAULT_TOLERANCE: f64 = 1e-12;

    pub fn new(a: &Matrix) -> Result<Self> {
        Self::with_tolerance(a, Self::DEFAULT_TOLERANCE)
    }

    /// Factorizes `a` with a custom singularity tolerance.
    ///
    /// # Errors
    /// * `NotSquare` if `a` is not square.
    /// * `InvalidSize` if `tolerance` is negative or NaN.
    pub fn with_tolerance(a: &Matrix, tolerance: f64) -> Result<Self> {
        if tolerance.is_nan() || tolerance < 0.0 {
            return Err(NumboxError::InvalidSize(format!(
                "pivot tolerance must be non-negative, got {}",
                tolerance
            )));
        }
        if !a.is_square() {
            return Err(NumboxError::NotSquare {
                rows: a.rows(),
                cols: a.cols(),
            });
        }

        let n = a.rows();
        let mut lu = a.clone();
        let mut perm: Vec<usize> = (0..n).collect();
        let mut sign = 1;
        let data = lu.as_mut_slice();

        for k in 0..n {
            // Largest magnitude in column k at or below the diagonal; the lowest
            // row index wins a tie.
            let mut p = k;
            let mut max = data[k * n + k].abs();
            for i in k + 1..n {
                let v = data[i * n + k].abs();
                if v > max {
                    max = v;
                    p = i;
                }
            }

            if p != k {
                for j in 0..n {
                    data.swap(k * n + j, p * n + j);
                }
                perm.swap(k, p);
                sign = -sign;
                debug!("LU step {}: swapped rows {} and {}", k, k, p);
            }

            if max <= tolerance {
                debug!("LU step {}: pivot {:e} within tolerance, column skipped", k, max);
                continue;
            }

            let pivot = data[k * n + k];
            trace!("LU step {}: eliminating below pivot {:e}", k, pivot);
            for i in k + 1..n {
                let m = data[i * n + k] / pivot;
                data[i * n + k] = m;
                if m != 0.0 {
                    for j in k + 1..n {
                        data[i * n + j] -= m * data[k * n + j];
                    }
                }
            }
        }

        debug!(
            "LU factorization of {}x{} matrix done, permutation sign {}",
            n, n, sign
        );
        Ok(Self {
            lu,
            perm,
            sign,
            tolerance,
        })
    }

    pub fn order(&self) -> usize {
        self.lu.rows()
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Parity of the row permutation, `+1` or `-1`.
    pub fn sign(&self) -> i32 {
        self.sign
    }

    /// `permutation()[i]` is the source row that ended up in row `i`.
    pub fn permutation(&self) -> &[usize] {
        &self.perm
    }

    /// Combined `L\U` working matrix.
    pub fn factors(&self) -> &Matrix {
        &self.lu
    }

    fn at(&self, i: usize, j: usize) -> f64 {
        self.lu.as_slice()[i * self.order() + j]
    }

    pub fn lower(&self) -> Matrix {
        let mut l = self.lu.clone();
        l.map_in_place(|_| 0.0);
        let n = self.order();
        let data = l.as_mut_slice();
        for i in 0..n {
            for j in 0..i {
                data[i * n + j] = self.at(i, j);
            }
            data[i * n + i] = 1.0;
        }
        l
    }

    pub fn upper(&self) -> Matrix {
        let mut u = self.lu.clone();
        let n = self.order();
        let data = u.as_mut_slice();
        for i in 1..n {
            for j in 0..i {
                data[i * n + j] = 0.0;
            }
        }
        u
    }

    /// True if some pivot of `U` is within the tolerance of zero.
    pub fn is_singular(&self) -> bool {
        (0..self.order()).any(|i| self.at(i, i).abs() <= self.tolerance)
    }

    /// Determinant of the source matrix; `0.0` when singular.
    pub fn det(&self) -> f64 {
        if self.is_singular() {
            warn!("Determinant of a singular {0}x{0} matrix", self.order());
            return 0.0;
        }
        (0..self.order()).fold(f64::from(self.sign), |acc, i| acc * self.at(i, i))
    }

    /// Solves `A * x = b`.
    ///
    /// # Errors
    /// * `DimensionMismatch` if `b.len()` is not the matrix order.
    /// * `SingularMatrix` if the matrix is singular.
    pub fn solve(&self, b: &Vector) -> Result<Vector> {
        let n = self.order();
        if b.len() != n {
            return Err(NumboxError::DimensionMismatch(format!(
                "right-hand side of length {} for a system of order {}",
                b.len(),
                n
            )));
        }
        if self.is_singular() {
            return Err(NumboxError::SingularMatrix);
        }
        let mut x: Vector = self.perm.iter().map(|&p| b[p]).collect();
        self.substitute(x.as_mut_slice());
        Ok(x)
    }

    // Forward then backward substitution on an already permuted right-hand side.
    fn substitute(&self, y: &mut [f64]) {
        let n = self.order();
        for i in 0..n {
            let mut s = y[i];
            for j in 0..i {
                s -= self.at(i, j) * y[j];
            }
            y[i] = s;
        }
        for i in (0..n).rev() {
            let mut s = y[i];
            for j in i + 1..n {
                s -= self.at(i, j) * y[j];
            }
            y[i] = s / self.at(i, i);
        }
    }

    /// Inverse of the source matrix, built column by column.
    pub fn inv(&self) -> Result<Matrix> {
        if self.is_singular() {
            return Err(NumboxError::SingularMatrix);
        }
        let n = self.order();
        let mut inv = Matrix::new(n, n)?;
        for j in 0..n {
            let col = self.solve(&Vector::basis(n, j)?)?;
            inv.set_col(j, &col)?;
        }
        Ok(inv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{matrix, vector};

    #[test]
    fn test_inverse_of_two_by_two() {
        let lu = matrix![[1, 2], [4, 5]].unwrap().lu().unwrap();
        let inv = lu.inv().unwrap();
        let expected = [-5.0 / 3.0, 2.0 / 3.0, 4.0 / 3.0, -1.0 / 3.0];
        for (got, want) in inv.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{:?}", inv);
        }
        assert!((lu.det() + 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_non_square() {
        let m = Matrix::new(2, 3).unwrap();
        assert_eq!(
            LuDecomp::new(&m).unwrap_err(),
            NumboxError::NotSquare { rows: 2, cols: 3 }
        );
    }

    #[test]
    fn test_rejects_bad_tolerance() {
        let m = Matrix::identity(2).unwrap();
        assert!(matches!(
            LuDecomp::with_tolerance(&m, -1.0),
            Err(NumboxError::InvalidSize(_))
        ));
        assert!(LuDecomp::with_tolerance(&m, f64::NAN).is_err());
    }

    #[test]
    fn test_singular_matrix() {
        let lu = matrix![[1, 2, 3], [2, 4, 6], [1, 0, 1]].unwrap().lu().unwrap();
        assert!(lu.is_singular());
        assert_eq!(lu.det(), 0.0);
        assert_eq!(lu.solve(&vector![1, 2, 3]).unwrap_err(), NumboxError::SingularMatrix);
        assert_eq!(lu.inv().unwrap_err(), NumboxError::SingularMatrix);
    }

    #[test]
    fn test_tolerance_controls_singularity() {
        let m = matrix![[1e-9, 0], [0, 1]].unwrap();
        assert!(!m.lu().unwrap().is_singular());
        assert!(m.lu_with_tolerance(1e-6).unwrap().is_singular());
    }

    #[test]
    fn test_snapshot_survives_source_mutation() {
        let mut m = matrix![[2, 1], [1, 3]].unwrap();
        let lu = m.lu().unwrap();
        m.fill(0.0);
        assert!((lu.det() - 5.0).abs() < 1e-12);
        let x = lu.solve(&vector![3, 4]).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pivot_tie_keeps_lowest_row() {
        let lu = matrix![[1, 2], [-1, 3]].unwrap().lu().unwrap();
        assert_eq!(lu.permutation(), &[0, 1]);
        assert_eq!(lu.sign(), 1);
    }

    #[test]
    fn test_sign_tracks_row_swaps() {
        let lu = matrix![[0, 1], [1, 0]].unwrap().lu().unwrap();
        assert_eq!(lu.permutation(), &[1, 0]);
        assert_eq!(lu.sign(), -1);
        assert_eq!(lu.det(), -1.0);
    }

    #[test]
    fn test_factors_reproduce_permuted_source() {
        let a = matrix![[2, 1, 1], [4, -6, 0], [-2, 7, 2]].unwrap();
        let lu = a.lu().unwrap();
        let product = lu.lower().mul(&lu.upper()).unwrap();
        for (i, &p) in lu.permutation().iter().enumerate() {
            let expected = a.row(p).unwrap();
            let got = product.row(i).unwrap();
            for (x, y) in got.iter().zip(expected.iter()) {
                assert!((x - y).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_solve_rhs_mismatch() {
        let lu = Matrix::identity(3).unwrap().lu().unwrap();
        assert!(matches!(
            lu.solve(&vector![1, 2]),
            Err(NumboxError::DimensionMismatch(_))
        ));
    }
}
