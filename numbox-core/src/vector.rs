use std::cmp::Ordering;
use std::fmt;
use std::ops::{Index, IndexMut};

use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{NumboxError, Result};
use crate::format::{self, NumberFormat};
use crate::matrix::Matrix;
use crate::operand::{ArithOp, Operand};
use crate::ops;
use crate::traits::VectorLike;

/// A fixed-length sequence of `f64` values.
///
/// The length is set at construction and never changes. Arithmetic comes in two
/// families: `*_in_place` methods mutate the receiver, the plain methods return a
/// fresh copy. Both go through the same elementwise kernel.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "Vec<f64>", into = "Vec<f64>")]
pub struct Vector {
    data: Vec<f64>,
    format: NumberFormat,
}

impl Vector {
    /// Creates a zero-filled vector of length `len`.
    pub fn new(len: usize) -> Self {
        Self {
            data: vec![0.0; len],
            format: NumberFormat::default(),
        }
    }

    /// Creates a vector from any numeric values, converted to `f64`.
    ///
    /// # Errors
    /// `TypeError` if a value has no `f64` representation.
    pub fn from_values<T: ToPrimitive>(values: &[T]) -> Result<Self> {
        let data = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.to_f64().ok_or_else(|| {
                    NumboxError::TypeError(format!("Non-numeric entry at position {}", i))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        Ok(Self::from(data))
    }

    /// Unit vector of length `len` with a one at `index`.
    pub fn basis(len: usize, index: usize) -> Result<Self> {
        let mut v = Self::new(len);
        v.set_basis(index)?;
        Ok(v)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Raw native-endian bytes of the element storage.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.data.clone()
    }

    // --- Element access ---

    pub fn get(&self, index: usize) -> Result<f64> {
        self.data
            .get(index)
            .copied()
            .ok_or_else(|| NumboxError::index(index, self.len()))
    }

    /// Sets element `index` and returns the stored value.
    pub fn set(&mut self, index: usize, value: f64) -> Result<f64> {
        let len = self.len();
        let slot = self
            .data
            .get_mut(index)
            .ok_or_else(|| NumboxError::index(index, len))?;
        *slot = value;
        Ok(value)
    }

    pub fn fill(&mut self, value: f64) -> &mut Self {
        self.data.fill(value);
        self
    }

    pub fn set_zero(&mut self) -> &mut Self {
        self.fill(0.0)
    }

    /// Turns this vector into the unit vector along `index`.
    pub fn set_basis(&mut self, index: usize) -> Result<&mut Self> {
        if index >= self.len() {
            return Err(NumboxError::index(index, self.len()));
        }
        self.data.fill(0.0);
        self.data[index] = 1.0;
        Ok(self)
    }

    pub fn swap(&mut self, i: usize, j: usize) -> Result<&mut Self> {
        let len = self.len();
        for idx in [i, j] {
            if idx >= len {
                return Err(NumboxError::index(idx, len));
            }
        }
        self.data.swap(i, j);
        Ok(self)
    }

    pub fn reverse(&mut self) -> &mut Self {
        self.data.reverse();
        self
    }

    // --- Elementwise arithmetic ---

    fn check_len(&self, other: &Vector, op: &str) -> Result<()> {
        if self.len() != other.len() {
            return Err(NumboxError::DimensionMismatch(format!(
                "Vector lengths for {} mismatch: {} != {}",
                op,
                self.len(),
                other.len()
            )));
        }
        Ok(())
    }

    fn zip_in_place<F>(&mut self, other: &Vector, op: &str, f: F) -> Result<&mut Self>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.check_len(other, op)?;
        ops::zip_in_place(&mut self.data, &other.data, f);
        Ok(self)
    }

    pub fn add_in_place(&mut self, other: &Vector) -> Result<&mut Self> {
        self.zip_in_place(other, "add", |a, b| a + b)
    }

    pub fn sub_in_place(&mut self, other: &Vector) -> Result<&mut Self> {
        self.zip_in_place(other, "sub", |a, b| a - b)
    }

    /// Elementwise (Hadamard) product.
    pub fn mul_in_place(&mut self, other: &Vector) -> Result<&mut Self> {
        self.zip_in_place(other, "mul", |a, b| a * b)
    }

    pub fn div_in_place(&mut self, other: &Vector) -> Result<&mut Self> {
        self.zip_in_place(other, "div", |a, b| a / b)
    }

    pub fn scale_in_place(&mut self, factor: f64) -> &mut Self {
        ops::scale(&mut self.data, factor);
        self
    }

    pub fn add_scalar_in_place(&mut self, offset: f64) -> &mut Self {
        ops::add_constant(&mut self.data, offset);
        self
    }

    pub fn add(&self, other: &Vector) -> Result<Vector> {
        let mut out = self.clone();
        out.add_in_place(other)?;
        Ok(out)
    }

    pub fn sub(&self, other: &Vector) -> Result<Vector> {
        let mut out = self.clone();
        out.sub_in_place(other)?;
        Ok(out)
    }

    pub fn mul(&self, other: &Vector) -> Result<Vector> {
        let mut out = self.clone();
        out.mul_in_place(other)?;
        Ok(out)
    }

    pub fn div(&self, other: &Vector) -> Result<Vector> {
        let mut out = self.clone();
        out.div_in_place(other)?;
        Ok(out)
    }

    pub fn scale(&self, factor: f64) -> Vector {
        let mut out = self.clone();
        out.scale_in_place(factor);
        out
    }

    pub fn add_scalar(&self, offset: f64) -> Vector {
        let mut out = self.clone();
        out.add_scalar_in_place(offset);
        out
    }

    /// Applies `op` with a vector or scalar right-hand side.
    ///
    /// Vectors combine elementwise, scalars broadcast. A matrix operand fails
    /// with `TypeError`.
    pub fn apply<'a>(&self, op: ArithOp, rhs: impl Into<Operand<'a>>) -> Result<Vector> {
        match (op, rhs.into()) {
            (ArithOp::Add, Operand::Vector(v)) => self.add(v),
            (ArithOp::Sub, Operand::Vector(v)) => self.sub(v),
            (ArithOp::Mul, Operand::Vector(v)) => self.mul(v),
            (ArithOp::Div, Operand::Vector(v)) => self.div(v),
            (ArithOp::Add, Operand::Scalar(k)) => Ok(self.add_scalar(k)),
            (ArithOp::Sub, Operand::Scalar(k)) => Ok(self.add_scalar(-k)),
            (ArithOp::Mul, Operand::Scalar(k)) => Ok(self.scale(k)),
            (ArithOp::Div, Operand::Scalar(k)) => Ok(self.scale(1.0 / k)),
            (op, other) => Err(op.unsupported("Vector", &other)),
        }
    }

    /// Sum of elementwise products.
    pub fn dot(&self, other: &Vector) -> Result<f64> {
        self.check_len(other, "dot")?;
        Ok(ops::dot(&self.data, &other.data))
    }

    // --- Reductions ---

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    fn non_empty(&self, what: &str) -> Result<()> {
        if self.is_empty() {
            return Err(NumboxError::InvalidSize(format!(
                "{} of an empty vector",
                what
            )));
        }
        Ok(())
    }

    pub fn mean(&self) -> Result<f64> {
        self.non_empty("mean")?;
        Ok(self.sum() / self.len() as f64)
    }

    /// Value below which a fraction `f` of the sorted elements falls, with
    /// linear interpolation between neighbouring order statistics.
    pub fn quantile(&self, f: f64) -> Result<f64> {
        self.non_empty("quantile")?;
        if !(0.0..=1.0).contains(&f) {
            return Err(NumboxError::InvalidSize(format!(
                "quantile fraction {} not in [0, 1]",
                f
            )));
        }
        let mut sorted = self.data.clone();
        sorted.sort_by(f64::total_cmp);

        let rank = f * (sorted.len() - 1) as f64;
        let lhs = rank.floor() as usize;
        let delta = rank - lhs as f64;
        if lhs + 1 >= sorted.len() {
            return Ok(sorted[lhs]);
        }
        Ok((1.0 - delta) * sorted[lhs] + delta * sorted[lhs + 1])
    }

    pub fn median(&self) -> Result<f64> {
        self.quantile(0.5)
    }

    pub fn max(&self) -> Result<f64> {
        Ok(self.data[self.max_index()?])
    }

    pub fn min(&self) -> Result<f64> {
        Ok(self.data[self.min_index()?])
    }

    /// Index of the largest element (first one on ties).
    pub fn max_index(&self) -> Result<usize> {
        ops::arg_max(&self.data)
            .ok_or_else(|| NumboxError::InvalidSize("max of an empty vector".to_string()))
    }

    pub fn min_index(&self) -> Result<usize> {
        ops::arg_min(&self.data)
            .ok_or_else(|| NumboxError::InvalidSize("min of an empty vector".to_string()))
    }

    /// Orders vectors by length only, never by content.
    /// Use `==` for value comparison.
    pub fn size_cmp(&self, other: &Vector) -> Ordering {
        self.len().cmp(&other.len())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.data.iter()
    }

    // --- Conversions ---

    /// Copies this vector into a `len x 1` column matrix.
    pub fn to_matrix(&self) -> Result<Matrix> {
        Matrix::from_row_major(self.len(), 1, self.data.clone())
    }

    /// Copies this vector into a `1 x len` row matrix.
    pub fn transpose(&self) -> Result<Matrix> {
        Matrix::from_row_major(1, self.len(), self.data.clone())
    }

    // --- Display ---

    pub fn format(&self) -> &NumberFormat {
        &self.format
    }

    /// Sets the printf-style format used by `Display`, e.g. `"%8.2f"`.
    pub fn set_format(&mut self, spec: &str) -> Result<&mut Self> {
        self.format = NumberFormat::parse(spec)?;
        Ok(self)
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl VectorLike for Vector {
    type Value = f64;

    fn len(&self) -> usize {
        self.data.len()
    }

    fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

impl Index<usize> for Vector {
    type Output = f64;

    /// # Panics
    /// Panics if `index` is out of bounds; use [`Vector::get`] for a checked read.
    fn index(&self, index: usize) -> &f64 {
        &self.data[index]
    }
}

impl IndexMut<usize> for Vector {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.data[index]
    }
}

impl From<Vec<f64>> for Vector {
    fn from(data: Vec<f64>) -> Self {
        Self {
            data,
            format: NumberFormat::default(),
        }
    }
}

impl From<&[f64]> for Vector {
    fn from(data: &[f64]) -> Self {
        Self::from(data.to_vec())
    }
}

impl From<Vector> for Vec<f64> {
    fn from(v: Vector) -> Self {
        v.data
    }
}

impl FromIterator<f64> for Vector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<f64>>())
    }
}

impl<'a> IntoIterator for &'a Vector {
    type Item = &'a f64;
    type IntoIter = std::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl IntoIterator for Vector {
    type Item = f64;
    type IntoIter = std::vec::IntoIter<f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl fmt::Debug for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{:?}", self.data)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.data.iter().map(|&v| self.format.render(v)).collect();
        f.write_str(&format::boxed(&lines))
    }
}
