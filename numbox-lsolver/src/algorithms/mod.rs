use numbox_core::{device::Device, MatrixLike, NumboxError, Result};
use num_traits::Float;

/// Solution of `A x = b` together with algorithm-specific metadata.
#[derive(Debug, Clone)]
pub struct SolveResult<V: Float, M> {
    pub x: Vec<V>,   // Solution vector
    pub metadata: M, // Metadata about the solve process
}

// --- Algorithm Trait Definition ---
/// Trait representing a specific linear system solving algorithm.
/// Generic over the Device and Matrix type it supports.
pub trait SolveAlgorithm<D: Device, M: MatrixLike> {
    /// The numeric type the algorithm operates on.
    /// Must match the MatrixLike::Value type.
    type Value: Float + Copy + std::fmt::Debug + Default + bytemuck::Pod;
    type Metadata: std::fmt::Debug;

    /// Solves the linear system Ax = b for x.
    ///
    /// # Arguments
    ///
    /// * `device` - The execution device.
    /// * `a` - The coefficient matrix A.
    /// * `b` - The right-hand side vector b.
    fn solve(
        &self,
        device: &D,
        a: &M,
        b: &[Self::Value],
    ) -> Result<SolveResult<Self::Value, Self::Metadata>>;

    /// Default validation: square `a` whose row count matches `b`.
    fn validate_inputs(&self, a: &M, b: &[Self::Value]) -> Result<()> {
        let (rows, cols) = a.dims();
        if !a.is_square() {
            return Err(NumboxError::NotSquare { rows, cols });
        }
        if rows != b.len() {
            return Err(NumboxError::DimensionMismatch(format!(
                "Matrix A rows ({}) must match RHS vector b length ({})",
                rows,
                b.len()
            )));
        }
        Ok(())
    }
}

// --- Algorithm Implementations ---
pub mod cpu_dense_lu; // LU with partial pivoting and iterative refinement
pub mod cpu_dense_qr; // Householder QR least squares

// --- Algorithm Struct Definitions ---

/// Direct LU solve followed by iterative refinement.
#[derive(Debug, Clone)]
pub struct DirectLu {
    pub tolerance: f64, // Pivot magnitude treated as zero
    pub max_refinements: usize,
    pub refinement_tolerance: f64, // Stop once |b - Ax|_inf is below this
}

impl Default for DirectLu {
    fn default() -> Self {
        Self {
            tolerance: numbox_core::LuDecomp::DEFAULT_TOLERANCE,
            max_refinements: 3,
            refinement_tolerance: 1e-10,
        }
    }
}

impl DirectLu {
    /// Creates a new instance with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(tolerance: f64, max_refinements: usize, refinement_tolerance: f64) -> Self {
        Self {
            tolerance,
            max_refinements,
            refinement_tolerance,
        }
    }
}

/// Least-squares solve through a Householder QR factorization.
/// Accepts tall systems (`rows >= cols`).
#[derive(Debug, Clone)]
pub struct DirectQr {
    pub tolerance: f64, // Smallest |R_ii| accepted as full rank
}

impl Default for DirectQr {
    fn default() -> Self {
        Self {
            tolerance: numbox_core::QrDecomp::DEFAULT_TOLERANCE,
        }
    }
}

impl DirectQr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(tolerance: f64) -> Self {
        Self { tolerance }
    }
}
