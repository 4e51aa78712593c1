use std::cmp::Ordering;
use std::fmt;
use std::ops::{Index, IndexMut};

use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{NumboxError, Result};
use crate::format::{self, NumberFormat};
use crate::lu::LuDecomp;
use crate::operand::{ArithOp, Operand, Value};
use crate::ops;
use crate::qr::QrDecomp;
use crate::traits::MatrixLike;
use crate::vector::Vector;

/// Dense `rows x cols` matrix of `f64`, stored row-major in one contiguous buffer.
///
/// Both dimensions are at least one and never change after construction,
/// except through [`Matrix::transpose_in_place`] on a square matrix.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
    format: NumberFormat,
}

impl Matrix {
    /// Creates a zero-filled matrix.
    ///
    /// # Errors
    /// `InvalidSize` if either dimension is zero.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        Self::check_dims(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
            format: NumberFormat::default(),
        })
    }

    fn check_dims(rows: usize, cols: usize) -> Result<()> {
        if rows == 0 || cols == 0 {
            return Err(NumboxError::InvalidSize(format!(
                "matrix dimensions must be positive, got {}x{}",
                rows, cols
            )));
        }
        Ok(())
    }

    /// Wraps an existing row-major buffer.
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        Self::check_dims(rows, cols)?;
        if data.len() != rows * cols {
            return Err(NumboxError::DimensionMismatch(format!(
                "buffer of length {} cannot hold a {}x{} matrix",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self {
            rows,
            cols,
            data,
            format: NumberFormat::default(),
        })
    }

    /// Builds a matrix from a sequence of equal-length rows.
    ///
    /// # Errors
    /// * `DimensionMismatch` if a row's length differs from the first row's,
    ///   checked before anything else.
    /// * `InvalidSize` for no rows, or rows that are all empty.
    /// * `TypeError` if an entry has no `f64` representation.
    pub fn from_rows<T, R>(rows: &[R]) -> Result<Self>
    where
        T: ToPrimitive,
        R: AsRef<[T]>,
    {
        let cols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if let Some(i) = rows.iter().position(|r| r.as_ref().len() != cols) {
            return Err(NumboxError::DimensionMismatch(format!(
                "row {} has {} entries, expected {}",
                i,
                rows[i].as_ref().len(),
                cols
            )));
        }
        Self::check_dims(rows.len(), cols)?;

        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            for (j, v) in row.as_ref().iter().enumerate() {
                let v = v.to_f64().ok_or_else(|| {
                    NumboxError::TypeError(format!("Non-numeric entry at ({}, {})", i, j))
                })?;
                data.push(v);
            }
        }
        Self::from_row_major(rows.len(), cols, data)
    }

    pub fn identity(n: usize) -> Result<Self> {
        let mut m = Self::new(n, n)?;
        m.set_identity()?;
        Ok(m)
    }

    /// Matrix with entries drawn uniformly from `[0, 1)`.
    pub fn random(rows: usize, cols: usize) -> Result<Self> {
        let mut m = Self::new(rows, cols)?;
        m.fill_random();
        Ok(m)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.cols).map(|r| r.to_vec()).collect()
    }

    // --- Element access ---

    fn offset(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(NumboxError::index2(row, col, self.rows, self.cols));
        }
        Ok(row * self.cols + col)
    }

    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        Ok(self.data[self.offset(row, col)?])
    }

    /// Sets element `(row, col)` and returns the stored value.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<f64> {
        let k = self.offset(row, col)?;
        self.data[k] = value;
        Ok(value)
    }

    fn row_unchecked(&self, i: usize) -> Vector {
        Vector::from(&self.data[i * self.cols..(i + 1) * self.cols])
    }

    fn col_unchecked(&self, j: usize) -> Vector {
        (0..self.rows).map(|i| self.data[i * self.cols + j]).collect()
    }

    /// Copy of row `i`.
    pub fn row(&self, i: usize) -> Result<Vector> {
        if i >= self.rows {
            return Err(NumboxError::index(i, self.rows));
        }
        Ok(self.row_unchecked(i))
    }

    /// Copy of column `j`.
    pub fn col(&self, j: usize) -> Result<Vector> {
        if j >= self.cols {
            return Err(NumboxError::index(j, self.cols));
        }
        Ok(self.col_unchecked(j))
    }

    pub fn set_row(&mut self, i: usize, values: &Vector) -> Result<&mut Self> {
        if i >= self.rows {
            return Err(NumboxError::index(i, self.rows));
        }
        if values.len() != self.cols {
            return Err(NumboxError::DimensionMismatch(format!(
                "row of length {} for a matrix with {} columns",
                values.len(),
                self.cols
            )));
        }
        self.data[i * self.cols..(i + 1) * self.cols].copy_from_slice(values.as_slice());
        Ok(self)
    }

    pub fn set_col(&mut self, j: usize, values: &Vector) -> Result<&mut Self> {
        if j >= self.cols {
            return Err(NumboxError::index(j, self.cols));
        }
        if values.len() != self.rows {
            return Err(NumboxError::DimensionMismatch(format!(
                "column of length {} for a matrix with {} rows",
                values.len(),
                self.rows
            )));
        }
        for (i, &v) in values.iter().enumerate() {
            self.data[i * self.cols + j] = v;
        }
        Ok(self)
    }

    pub fn fill(&mut self, value: f64) -> &mut Self {
        self.data.fill(value);
        self
    }

    pub fn set_zero(&mut self) -> &mut Self {
        self.fill(0.0)
    }

    pub fn set_identity(&mut self) -> Result<&mut Self> {
        if !self.is_square() {
            return Err(NumboxError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        self.data.fill(0.0);
        for i in 0..self.rows {
            self.data[i * self.cols + i] = 1.0;
        }
        Ok(self)
    }

    pub fn fill_random(&mut self) -> &mut Self {
        for v in self.data.iter_mut() {
            *v = fastrand::f64();
        }
        self
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) -> Result<&mut Self> {
        for i in [a, b] {
            if i >= self.rows {
                return Err(NumboxError::index(i, self.rows));
            }
        }
        if a != b {
            for j in 0..self.cols {
                self.data.swap(a * self.cols + j, b * self.cols + j);
            }
        }
        Ok(self)
    }

    pub fn swap_cols(&mut self, a: usize, b: usize) -> Result<&mut Self> {
        for j in [a, b] {
            if j >= self.cols {
                return Err(NumboxError::index(j, self.cols));
            }
        }
        if a != b {
            for i in 0..self.rows {
                self.data.swap(i * self.cols + a, i * self.cols + b);
            }
        }
        Ok(self)
    }

    // --- Extrema ---

    fn position(&self, k: usize) -> (usize, usize) {
        (k / self.cols, k % self.cols)
    }

    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn min(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// `(row, col)` of the largest entry, first in row-major order on ties.
    pub fn max_index(&self) -> (usize, usize) {
        self.position(ops::arg_max(&self.data).unwrap_or(0))
    }

    pub fn min_index(&self) -> (usize, usize) {
        self.position(ops::arg_min(&self.data).unwrap_or(0))
    }

    // --- Arithmetic ---

    fn check_same_dims(&self, other: &Matrix, op: &str) -> Result<()> {
        if self.dims() != other.dims() {
            return Err(NumboxError::DimensionMismatch(format!(
                "Matrix dimensions for {} mismatch: {}x{} != {}x{}",
                op, self.rows, self.cols, other.rows, other.cols
            )));
        }
        Ok(())
    }

    fn zip_in_place<F>(&mut self, other: &Matrix, op: &str, f: F) -> Result<&mut Self>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.check_same_dims(other, op)?;
        ops::zip_in_place(&mut self.data, &other.data, f);
        Ok(self)
    }

    pub fn add_in_place(&mut self, other: &Matrix) -> Result<&mut Self> {
        self.zip_in_place(other, "add", |a, b| a + b)
    }

    pub fn sub_in_place(&mut self, other: &Matrix) -> Result<&mut Self> {
        self.zip_in_place(other, "sub", |a, b| a - b)
    }

    pub fn mul_elements_in_place(&mut self, other: &Matrix) -> Result<&mut Self> {
        self.zip_in_place(other, "mul_elements", |a, b| a * b)
    }

    pub fn div_elements_in_place(&mut self, other: &Matrix) -> Result<&mut Self> {
        self.zip_in_place(other, "div_elements", |a, b| a / b)
    }

    pub fn scale_in_place(&mut self, factor: f64) -> &mut Self {
        ops::scale(&mut self.data, factor);
        self
    }

    pub fn add_scalar_in_place(&mut self, offset: f64) -> &mut Self {
        ops::add_constant(&mut self.data, offset);
        self
    }

    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        let mut out = self.clone();
        out.add_in_place(other)?;
        Ok(out)
    }

    pub fn sub(&self, other: &Matrix) -> Result<Matrix> {
        let mut out = self.clone();
        out.sub_in_place(other)?;
        Ok(out)
    }

    pub fn mul_elements(&self, other: &Matrix) -> Result<Matrix> {
        let mut out = self.clone();
        out.mul_elements_in_place(other)?;
        Ok(out)
    }

    pub fn div_elements(&self, other: &Matrix) -> Result<Matrix> {
        let mut out = self.clone();
        out.div_elements_in_place(other)?;
        Ok(out)
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        let mut out = self.clone();
        out.scale_in_place(factor);
        out
    }

    pub fn add_scalar(&self, offset: f64) -> Matrix {
        let mut out = self.clone();
        out.add_scalar_in_place(offset);
        out
    }

    /// Matrix product `self * other`.
    ///
    /// # Errors
    /// `DimensionMismatch` unless `self.cols() == other.rows()`.
    pub fn mul(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(NumboxError::DimensionMismatch(format!(
                "cannot multiply {}x{} by {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let mut out = Matrix::new(self.rows, other.cols)?;
        ops::gemm(
            &self.data,
            self.rows,
            self.cols,
            &other.data,
            other.cols,
            &mut out.data,
        );
        Ok(out)
    }

    /// Matrix-vector product `self * v`.
    pub fn mul_vector(&self, v: &Vector) -> Result<Vector> {
        if v.len() != self.cols {
            return Err(NumboxError::DimensionMismatch(format!(
                "cannot multiply {}x{} matrix by vector of length {}",
                self.rows,
                self.cols,
                v.len()
            )));
        }
        let mut out = Vector::new(self.rows);
        ops::gemv(&self.data, self.rows, self.cols, v.as_slice(), out.as_mut_slice());
        Ok(out)
    }

    /// Applies `op` with a matrix, vector or scalar right-hand side.
    ///
    /// | op  | Matrix          | Vector | Scalar      |
    /// |-----|-----------------|--------|-------------|
    /// | `+` `-` | elementwise | -      | broadcast   |
    /// | `*` | product         | `A*v`  | scale       |
    /// | `/` | elementwise     | -      | scale `1/k` |
    ///
    /// Combinations marked `-` fail with `TypeError`.
    pub fn apply<'a>(&self, op: ArithOp, rhs: impl Into<Operand<'a>>) -> Result<Value> {
        let value = match (op, rhs.into()) {
            (ArithOp::Add, Operand::Matrix(m)) => Value::Matrix(self.add(m)?),
            (ArithOp::Sub, Operand::Matrix(m)) => Value::Matrix(self.sub(m)?),
            (ArithOp::Mul, Operand::Matrix(m)) => Value::Matrix(self.mul(m)?),
            (ArithOp::Div, Operand::Matrix(m)) => Value::Matrix(self.div_elements(m)?),
            (ArithOp::Mul, Operand::Vector(v)) => Value::Vector(self.mul_vector(v)?),
            (ArithOp::Add, Operand::Scalar(k)) => Value::Matrix(self.add_scalar(k)),
            (ArithOp::Sub, Operand::Scalar(k)) => Value::Matrix(self.add_scalar(-k)),
            (ArithOp::Mul, Operand::Scalar(k)) => Value::Matrix(self.scale(k)),
            (ArithOp::Div, Operand::Scalar(k)) => Value::Matrix(self.scale(1.0 / k)),
            (op, other) => return Err(op.unsupported("Matrix", &other)),
        };
        Ok(value)
    }

    // --- Structure ---

    /// Returns a new `cols x rows` matrix.
    pub fn transpose(&self) -> Matrix {
        let mut data = vec![0.0; self.data.len()];
        ops::transpose(&self.data, self.rows, self.cols, &mut data);
        Matrix {
            rows: self.cols,
            cols: self.rows,
            data,
            format: self.format.clone(),
        }
    }

    /// Transposes a square matrix in place.
    pub fn transpose_in_place(&mut self) -> Result<&mut Self> {
        if !self.is_square() {
            return Err(NumboxError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        let n = self.rows;
        for i in 0..n {
            for j in i + 1..n {
                self.data.swap(i * n + j, j * n + i);
            }
        }
        Ok(self)
    }

    /// Replaces every element, visited in row-major order, with `f(element)`.
    pub fn map_in_place<F>(&mut self, mut f: F) -> &mut Self
    where
        F: FnMut(f64) -> f64,
    {
        self.data.iter_mut().for_each(|v| *v = f(*v));
        self
    }

    pub fn map<F>(&self, f: F) -> Matrix
    where
        F: FnMut(f64) -> f64,
    {
        let mut out = self.clone();
        out.map_in_place(f);
        out
    }

    /// Orders matrices by element count only.
    pub fn size_cmp(&self, other: &Matrix) -> Ordering {
        self.data.len().cmp(&other.data.len())
    }

    // --- Iteration ---

    /// Elements in row-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.data.iter()
    }

    /// `(row, col, value)` in row-major order.
    pub fn indexed_iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let cols = self.cols;
        self.data
            .iter()
            .enumerate()
            .map(move |(k, &v)| (k / cols, k % cols, v))
    }

    /// `(i, row_i)` pairs, each row copied into a fresh vector.
    pub fn iter_rows(&self) -> impl Iterator<Item = (usize, Vector)> + '_ {
        (0..self.rows).map(move |i| (i, self.row_unchecked(i)))
    }

    pub fn iter_cols(&self) -> impl Iterator<Item = (usize, Vector)> + '_ {
        (0..self.cols).map(move |j| (j, self.col_unchecked(j)))
    }

    // --- Decompositions ---

    /// LU decomposition with the default pivot tolerance.
    pub fn lu(&self) -> Result<LuDecomp> {
        LuDecomp::new(self)
    }

    pub fn lu_with_tolerance(&self, tolerance: f64) -> Result<LuDecomp> {
        LuDecomp::with_tolerance(self, tolerance)
    }

    /// Determinant; `0.0` for a singular matrix.
    pub fn det(&self) -> Result<f64> {
        Ok(self.lu()?.det())
    }

    pub fn inv(&self) -> Result<Matrix> {
        self.lu()?.inv()
    }

    pub fn qr(&self) -> Result<QrDecomp> {
        QrDecomp::new(self)
    }

    // --- Display ---

    pub fn format(&self) -> &NumberFormat {
        &self.format
    }

    pub fn set_format(&mut self, spec: &str) -> Result<&mut Self> {
        self.format = NumberFormat::parse(spec)?;
        Ok(self)
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.dims() == other.dims() && self.data == other.data
    }
}

impl MatrixLike for Matrix {
    type Value = f64;

    fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    /// # Panics
    /// Panics on an out-of-range index; [`Matrix::get`] is the checked form.
    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(row < self.rows && col < self.cols, "matrix index out of range");
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(row < self.rows && col < self.cols, "matrix index out of range");
        &mut self.data[row * self.cols + col]
    }
}

impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = NumboxError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        Matrix::from_rows(&rows[..])
    }
}

impl From<Matrix> for Vec<Vec<f64>> {
    fn from(m: Matrix) -> Self {
        m.to_rows()
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{:?}", self.to_rows())
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths = vec![0usize; self.cols];
        for (_, j, v) in self.indexed_iter() {
            widths[j] = widths[j].max(self.format.rendered_width(v));
        }
        let lines: Vec<String> = self
            .data
            .chunks(self.cols)
            .map(|row| {
                row.iter()
                    .zip(&widths)
                    .map(|(&v, &w)| format!("{:>w$}", self.format.render(v), w = w))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        f.write_str(&format::boxed(&lines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Opaque;
    use crate::{matrix, vector};

    fn assert_close(a: &Matrix, b: &Matrix, tol: f64) {
        assert_eq!(a.dims(), b.dims());
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < tol, "{:?} != {:?}", a, b);
        }
    }

    // Cofactor expansion along the first row.
    fn cofactor_det(m: &Matrix) -> f64 {
        let n = m.rows();
        if n == 1 {
            return m[(0, 0)];
        }
        let mut det = 0.0;
        for j in 0..n {
            let minor: Vec<Vec<f64>> = (1..n)
                .map(|i| (0..n).filter(|&c| c != j).map(|c| m[(i, c)]).collect())
                .collect();
            let minor = Matrix::from_rows(&minor[..]).unwrap();
            let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
            det += sign * m[(0, j)] * cofactor_det(&minor);
        }
        det
    }

    #[test]
    fn test_new_rejects_zero_dims() {
        assert!(matches!(Matrix::new(0, 3), Err(NumboxError::InvalidSize(_))));
        assert!(matches!(Matrix::new(3, 0), Err(NumboxError::InvalidSize(_))));
        let m = Matrix::new(2, 3).unwrap();
        assert_eq!(m.dims(), (2, 3));
        assert!(m.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_from_rows_shapes() {
        let m = Matrix::from_rows(&[vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(m.dims(), (2, 3));
        assert_eq!(m.get(1, 2), Ok(6.0));
        assert!(matches!(
            Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]),
            Err(NumboxError::DimensionMismatch(_))
        ));
        let empty: [Vec<f64>; 0] = [];
        assert!(matches!(
            Matrix::from_rows(&empty),
            Err(NumboxError::InvalidSize(_))
        ));
        assert!(matches!(
            Matrix::from_rows(&[vec![], vec![1.0]]),
            Err(NumboxError::DimensionMismatch(_))
        ));
        assert!(matches!(
            Matrix::from_rows(&[Vec::<f64>::new(), Vec::new()]),
            Err(NumboxError::InvalidSize(_))
        ));
    }

    #[test]
    fn test_from_rows_rejects_non_numeric() {
        let rows = [
            [Opaque::num(1.0), Opaque::num(2.0)],
            [Opaque::num(3.0), Opaque::NONE],
        ];
        match Matrix::from_rows(&rows) {
            Err(NumboxError::TypeError(msg)) => assert!(msg.contains("(1, 1)")),
            other => panic!("Expected TypeError, got {:?}", other),
        }
    }

    #[test]
    fn test_get_set_bounds() {
        let mut m = Matrix::new(2, 2).unwrap();
        assert_eq!(m.set(1, 0, 5.0), Ok(5.0));
        assert_eq!(m[(1, 0)], 5.0);
        assert!(matches!(m.get(2, 0), Err(NumboxError::IndexOutOfBounds(_))));
        assert!(matches!(m.set(0, 2, 1.0), Err(NumboxError::IndexOutOfBounds(_))));
    }

    #[test]
    fn test_product_scenario() {
        let a = matrix![[1, 2, 3], [4, 5, 6]].unwrap();
        let b = matrix![[1, 2], [3, 4], [5, 6]].unwrap();
        assert_eq!(a.mul(&b).unwrap(), matrix![[22, 28], [49, 64]].unwrap());
        assert!(matches!(a.mul(&a), Err(NumboxError::DimensionMismatch(_))));
    }

    #[test]
    fn test_elementwise_and_scalar() {
        let a = matrix![[1, 2], [3, 4]].unwrap();
        let b = matrix![[2, 2], [2, 2]].unwrap();
        assert_eq!(a.add(&b).unwrap(), matrix![[3, 4], [5, 6]].unwrap());
        assert_eq!(a.sub(&b).unwrap(), matrix![[-1, 0], [1, 2]].unwrap());
        assert_eq!(a.mul_elements(&b).unwrap(), matrix![[2, 4], [6, 8]].unwrap());
        assert_eq!(a.div_elements(&b).unwrap(), matrix![[0.5, 1], [1.5, 2]].unwrap());
        assert_eq!(a.add_scalar(1.0), matrix![[2, 3], [4, 5]].unwrap());
        assert_eq!(a.scale(-1.0), matrix![[-1, -2], [-3, -4]].unwrap());
        assert!(a.add(&Matrix::new(2, 3).unwrap()).is_err());
    }

    #[test]
    fn test_mismatch_does_not_mutate() {
        let mut a = matrix![[1, 2], [3, 4]].unwrap();
        let before = a.clone();
        assert!(a.add_in_place(&Matrix::new(3, 2).unwrap()).is_err());
        assert_eq!(a, before);
    }

    #[test]
    fn test_mul_vector() {
        let a = matrix![[1, 2, 3], [4, 5, 6]].unwrap();
        assert_eq!(a.mul_vector(&vector![1, 2, 3]).unwrap(), vector![14, 32]);
        assert!(a.mul_vector(&vector![1, 2]).is_err());
    }

    #[test]
    fn test_transpose_twice_is_identity() {
        let a = matrix![[1, 2, 3], [4, 5, 6]].unwrap();
        let t = a.transpose();
        assert_eq!(t.dims(), (3, 2));
        assert_eq!(t.get(2, 1), Ok(6.0));
        assert_eq!(t.transpose(), a);
    }

    #[test]
    fn test_transpose_in_place() {
        let mut a = matrix![[1, 2], [3, 4]].unwrap();
        a.transpose_in_place().unwrap();
        assert_eq!(a, matrix![[1, 3], [2, 4]].unwrap());
        let mut r = Matrix::new(2, 3).unwrap();
        assert_eq!(
            r.transpose_in_place().unwrap_err(),
            NumboxError::NotSquare { rows: 2, cols: 3 }
        );
    }

    #[test]
    fn test_rows_and_cols() {
        let mut m = matrix![[1, 2], [3, 4], [5, 6]].unwrap();
        assert_eq!(m.row(1).unwrap(), vector![3, 4]);
        assert_eq!(m.col(1).unwrap(), vector![2, 4, 6]);
        assert!(m.row(3).is_err());
        m.set_row(0, &vector![9, 9]).unwrap();
        m.set_col(1, &vector![0, 0, 0]).unwrap();
        assert_eq!(m, matrix![[9, 0], [3, 0], [5, 0]].unwrap());
        assert!(m.set_row(0, &vector![1, 2, 3]).is_err());
        let rows: Vec<usize> = m.iter_rows().map(|(i, _)| i).collect();
        assert_eq!(rows, vec![0, 1, 2]);
        assert_eq!(m.iter_cols().count(), 2);
    }

    #[test]
    fn test_swaps_and_identity() {
        let mut m = matrix![[1, 2], [3, 4]].unwrap();
        m.swap_rows(0, 1).unwrap();
        assert_eq!(m, matrix![[3, 4], [1, 2]].unwrap());
        m.swap_cols(0, 1).unwrap();
        assert_eq!(m, matrix![[4, 3], [2, 1]].unwrap());
        assert!(m.swap_rows(0, 2).is_err());
        assert_eq!(Matrix::identity(2).unwrap(), matrix![[1, 0], [0, 1]].unwrap());
        assert!(Matrix::new(2, 3).unwrap().set_identity().is_err());
    }

    #[test]
    fn test_extrema_positions() {
        let m = matrix![[1, 9], [9, -4]].unwrap();
        assert_eq!(m.max(), 9.0);
        assert_eq!(m.max_index(), (0, 1));
        assert_eq!(m.min(), -4.0);
        assert_eq!(m.min_index(), (1, 1));
    }

    #[test]
    fn test_map_in_place() {
        let mut m = matrix![[1, -2], [3, -4]].unwrap();
        m.map_in_place(f64::abs);
        assert_eq!(m, matrix![[1, 2], [3, 4]].unwrap());
        assert_eq!(m.map(|v| v * v), matrix![[1, 4], [9, 16]].unwrap());

        let mut seen = 0.0;
        let running = m.map(|v| {
            seen += v;
            seen
        });
        assert_eq!(running, matrix![[1, 3], [6, 10]].unwrap());
    }

    #[test]
    fn test_indexed_iter_row_major() {
        let m = matrix![[1, 2], [3, 4]].unwrap();
        let items: Vec<(usize, usize, f64)> = m.indexed_iter().collect();
        assert_eq!(
            items,
            vec![(0, 0, 1.0), (0, 1, 2.0), (1, 0, 3.0), (1, 1, 4.0)]
        );
    }

    #[test]
    fn test_det_matches_cofactor_expansion() {
        let m = matrix![[2, -1, 0, 3], [1, 4, 2, -2], [0, 5, -3, 1], [7, 1, 1, 1]].unwrap();
        let expected = cofactor_det(&m);
        assert!((m.det().unwrap() - expected).abs() < 1e-9 * expected.abs().max(1.0));
        assert_eq!(matrix![[1, 2], [2, 4]].unwrap().det(), Ok(0.0));
    }

    #[test]
    fn test_inverse_times_matrix_is_identity() {
        let m = matrix![[4, 7, 2], [3, 6, 1], [2, 5, 3]].unwrap();
        let inv = m.inv().unwrap();
        assert_close(&inv.mul(&m).unwrap(), &Matrix::identity(3).unwrap(), 1e-9);
        assert_eq!(
            matrix![[1, 2], [2, 4]].unwrap().inv().unwrap_err(),
            NumboxError::SingularMatrix
        );
    }

    #[test]
    fn test_random_in_unit_interval() {
        let m = Matrix::random(4, 5).unwrap();
        assert!(m.iter().all(|&v| (0.0..1.0).contains(&v)));
    }

    #[test]
    fn test_size_cmp_and_equality() {
        let a = Matrix::new(2, 3).unwrap();
        let b = Matrix::new(3, 2).unwrap();
        assert_eq!(a.size_cmp(&b), Ordering::Equal);
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_aligns_columns() {
        let mut m = matrix![[1, 200], [30, 4]].unwrap();
        m.set_format("%g").unwrap();
        let shown = m.to_string();
        let lines: Vec<&str> = shown.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains(" 1 200"));
        assert!(lines[2].contains("30   4"));
        assert_eq!(format!("{:?}", m), "M[[1.0, 200.0], [30.0, 4.0]]");
    }

    #[test]
    fn test_serde_as_rows() {
        let m = matrix![[1, 2], [3, 4]].unwrap();
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "[[1.0,2.0],[3.0,4.0]]");
        let back: Matrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
        assert!(serde_json::from_str::<Matrix>("[[1.0],[2.0,3.0]]").is_err());
    }
}
