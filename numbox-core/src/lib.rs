//! Dense numeric containers: vectors, matrices, a fixed-capacity ring buffer,
//! and LU/QR decompositions over row-major `f64` storage.
//!
//! ```
//! use numbox_core::{matrix, vector};
//!
//! let a = matrix![[4, 3], [6, 3]].unwrap();
//! let x = a.lu().unwrap().solve(&vector![10, 12]).unwrap();
//! assert!((x[0] - 1.0).abs() < 1e-12 && (x[1] - 2.0).abs() < 1e-12);
//! ```

pub mod buffer;
pub mod device;
pub mod error;
pub mod format;
pub mod lu;
pub mod matrix;
pub mod operand;
pub(crate) mod ops;
pub mod qr;
pub mod traits;
pub mod vector;

#[cfg(test)]
pub(crate) mod testing;

pub use buffer::CircularBuffer;
pub use device::{CpuDevice, Device};
pub use error::{NumboxError, Result};
pub use format::NumberFormat;
pub use lu::LuDecomp;
pub use matrix::Matrix;
pub use operand::{ArithOp, Operand, Value};
pub use qr::QrDecomp;
pub use traits::{MatrixLike, VectorLike};
pub use vector::Vector;

/// Builds a [`Vector`] from numeric literals or expressions.
///
/// `vector![]` is the empty vector.
#[macro_export]
macro_rules! vector {
    () => {
        $crate::Vector::new(0)
    };
    ($($x:expr),+ $(,)?) => {
        $crate::Vector::from(vec![$(($x) as f64),+])
    };
}

/// Builds a [`Matrix`] from bracketed rows, returning `Result<Matrix>`.
///
/// Ragged rows yield `DimensionMismatch`.
#[macro_export]
macro_rules! matrix {
    ($([$($x:expr),* $(,)?]),+ $(,)?) => {
        $crate::Matrix::from_rows(&[$(vec![$(($x) as f64),*]),+])
    };
}
