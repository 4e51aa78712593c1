//! `numbox-lsolver`: direct dense solvers for `Ax = b` on top of `numbox-core`.
//!
//! Algorithms are parameter structs implementing [`algorithms::SolveAlgorithm`]
//! for a device and matrix type, so the call site picks both explicitly.

pub mod algorithms;

// Re-export from numbox_core
pub use numbox_core::{device::CpuDevice, Matrix, MatrixLike, NumboxError, Vector};
