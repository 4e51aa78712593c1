use log::{debug, info, warn};
use numbox_core::{device::CpuDevice, Matrix, Result, Vector};

use super::{DirectLu, SolveAlgorithm, SolveResult};

#[derive(Debug, Clone, Copy)]
pub struct DirectLuMetadata {
    pub determinant: f64,
    pub refinements: usize,
    pub residual_norm: f64, // Infinity norm of b - Ax
}

impl SolveAlgorithm<CpuDevice, Matrix> for DirectLu {
    type Value = f64;
    type Metadata = DirectLuMetadata;

    fn solve(
        &self,
        device: &CpuDevice,
        a: &Matrix,
        b: &[f64],
    ) -> Result<SolveResult<Self::Value, Self::Metadata>> {
        self.validate_inputs(a, b)?;

        let lu = a.lu_with_tolerance(self.tolerance)?;
        let mut x = lu.solve(&Vector::from(b))?;

        let mut residual = Vector::from(device.residual(a, x.as_slice(), b)?);
        let mut residual_norm = device.norm_inf(&residual);
        debug!("DirectLu initial residual norm: {:e}", residual_norm);

        let mut refinements = 0;
        while residual_norm > self.refinement_tolerance && refinements < self.max_refinements {
            let correction = lu.solve(&residual)?;
            device.axpy(1.0, correction.as_slice(), x.as_mut_slice())?;
            residual = Vector::from(device.residual(a, x.as_slice(), b)?);
            residual_norm = device.norm_inf(&residual);
            refinements += 1;
            debug!(
                "DirectLu refinement {}: residual norm {:e}",
                refinements, residual_norm
            );
        }

        if residual_norm > self.refinement_tolerance {
            warn!(
                "DirectLu residual {:e} still above {:e} after {} refinements",
                residual_norm, self.refinement_tolerance, refinements
            );
        }

        info!(
            "DirectLu solved {}x{} system ({} refinements, residual {:e})",
            a.rows(),
            a.cols(),
            refinements,
            residual_norm
        );

        Ok(SolveResult {
            x: x.into(),
            metadata: DirectLuMetadata {
                determinant: lu.det(),
                refinements,
                residual_norm,
            },
        })
    }
}
