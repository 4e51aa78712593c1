use crate::error::{NumboxError, Result};
use crate::ops;
use crate::traits::{MatrixLike, VectorLike};

/// Marker trait for execution devices.
/// Solver algorithms are generic over the device they run on.
pub trait Device: std::fmt::Debug {}

/// Represents a CPU execution device running the dense kernels in `ops`.
#[derive(Debug, Clone, Default)]
pub struct CpuDevice {}
impl Device for CpuDevice {}

impl CpuDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculates the dot product `x^T * y`.
    pub fn dot(&self, x: &[f64], y: &[f64]) -> Result<f64> {
        if x.len() != y.len() {
            return Err(NumboxError::DimensionMismatch(format!(
                "Vector sizes for dot product mismatch: {} != {}",
                x.len(),
                y.len()
            )));
        }
        Ok(ops::dot(x, y))
    }

    /// Performs `y = alpha * x + y`.
    pub fn axpy(&self, alpha: f64, x: &[f64], y: &mut [f64]) -> Result<()> {
        if x.len() != y.len() {
            return Err(NumboxError::DimensionMismatch(format!(
                "Vector sizes for axpy mismatch: {} != {}",
                x.len(),
                y.len()
            )));
        }
        ops::axpy(alpha, x, y);
        Ok(())
    }

    /// Performs the dense matrix-vector multiplication `y = a * x`.
    pub fn gemv<M>(&self, a: &M, x: &[f64], y: &mut [f64]) -> Result<()>
    where
        M: MatrixLike<Value = f64>,
    {
        let (rows, cols) = a.dims();
        if x.len() != cols || y.len() != rows {
            return Err(NumboxError::DimensionMismatch(format!(
                "gemv with {}x{} matrix needs x of {} and y of {}, got {} and {}",
                rows,
                cols,
                cols,
                rows,
                x.len(),
                y.len()
            )));
        }
        ops::gemv(a.as_slice(), rows, cols, x, y);
        Ok(())
    }

    /// Residual `b - a * x`.
    pub fn residual<M>(&self, a: &M, x: &[f64], b: &[f64]) -> Result<Vec<f64>>
    where
        M: MatrixLike<Value = f64>,
    {
        let mut ax = vec![0.0; a.rows()];
        self.gemv(a, x, &mut ax)?;
        if b.len() != ax.len() {
            return Err(NumboxError::DimensionMismatch(format!(
                "Residual needs b of length {}, got {}",
                ax.len(),
                b.len()
            )));
        }
        ops::zip_in_place(&mut ax, b, |axi, bi| bi - axi);
        Ok(ax)
    }

    /// Infinity norm of a vector.
    pub fn norm_inf<V>(&self, v: &V) -> f64
    where
        V: VectorLike<Value = f64>,
    {
        ops::norm_inf(v.as_slice())
    }

    /// Euclidean norm of a slice.
    pub fn norm2(&self, x: &[f64]) -> f64 {
        ops::norm2(x)
    }
}
