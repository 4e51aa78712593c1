use log::info;
use numbox_core::{device::CpuDevice, Matrix, NumboxError, QrDecomp, Result, Vector};

use super::{DirectQr, SolveAlgorithm, SolveResult};

#[derive(Debug, Clone, Copy)]
pub struct DirectQrMetadata {
    pub residual_norm: f64, // Euclidean norm of b - Ax
}

impl SolveAlgorithm<CpuDevice, Matrix> for DirectQr {
    type Value = f64;
    type Metadata = DirectQrMetadata;

    fn solve(
        &self,
        device: &CpuDevice,
        a: &Matrix,
        b: &[f64],
    ) -> Result<SolveResult<Self::Value, Self::Metadata>> {
        self.validate_inputs(a, b)?;

        let qr = QrDecomp::with_tolerance(a, self.tolerance)?;
        let x = qr.lstsq(&Vector::from(b))?;
        let residual = device.residual(a, x.as_slice(), b)?;
        let residual_norm = device.norm2(&residual);

        info!(
            "DirectQr solved {}x{} system (residual {:e})",
            a.rows(),
            a.cols(),
            residual_norm
        );

        Ok(SolveResult {
            x: x.into(),
            metadata: DirectQrMetadata { residual_norm },
        })
    }

    // Least squares only needs a tall matrix.
    fn validate_inputs(&self, a: &Matrix, b: &[f64]) -> Result<()> {
        let (rows, cols) = a.dims();
        if rows != b.len() {
            return Err(NumboxError::DimensionMismatch(format!(
                "Matrix A rows ({}) must match RHS vector b length ({})",
                rows,
                b.len()
            )));
        }
        if rows < cols {
            return Err(NumboxError::DimensionMismatch(format!(
                "Least squares needs rows >= cols, got {}x{}",
                rows, cols
            )));
        }
        Ok(())
    }
}
