use std::error::Error;

use numbox_core::{vector, CircularBuffer, Matrix, Vector};
use numbox_lsolver::{
    algorithms::{DirectQr, SolveAlgorithm},
    CpuDevice,
};

const DEFAULT_CAPACITY: usize = 32;
const DEFAULT_SAMPLES: usize = 100;

// Trend of the simulated signal
const INTERCEPT: f64 = 1.5;
const SLOPE: f64 = 0.25;
const NOISE: f64 = 0.2;

fn env_usize(name: &str, default: usize) -> Result<usize, Box<dyn Error>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<usize>()
            .map_err(|e| format!("{} must be a positive integer, got {:?}: {}", name, raw, e).into()),
        Err(_) => Ok(default),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let capacity = env_usize("NUMBOX_CAPACITY", DEFAULT_CAPACITY)?;
    let samples = env_usize("NUMBOX_SAMPLES", DEFAULT_SAMPLES)?;
    log::info!("Window capacity {}, {} samples", capacity, samples);

    let mut window = CircularBuffer::new(capacity)?;
    for t in 0..samples {
        let noise = (fastrand::f64() - 0.5) * 2.0 * NOISE;
        window.push(INTERCEPT + SLOPE * t as f64 + noise)?;
    }
    log::info!("Window storage: {} bytes", window.as_vector().as_bytes().len());

    // Samples still in the window, oldest first, with their time stamps.
    let retained = capacity.min(samples);
    if retained < 2 {
        log::warn!("Need at least two samples to fit a line, got {}", retained);
        return Ok(());
    }
    let first_t = samples - retained;
    let y: Vector = window.iter().skip(capacity - retained).collect();
    let mut design = Matrix::new(retained, 2)?;
    for (i, t) in (first_t..samples).enumerate() {
        design.set_row(i, &vector![1.0, t as f64])?;
    }

    let device = CpuDevice::new();
    let fit = DirectQr::default().solve(&device, &design, y.as_slice())?;
    println!(
        "Fitted y = {:.4} + {:.4} t (true {} + {} t), residual {:.4}",
        fit.x[0], fit.x[1], INTERCEPT, SLOPE, fit.metadata.residual_norm
    );
    println!("Window mean {:.4}, median {:.4}", y.mean()?, y.median()?);

    let normal = design.transpose().mul(&design)?;
    log::info!("Normal equations matrix:\n{}", normal);
    log::info!("det(X^T X) = {:.4}", normal.det()?);

    Ok(())
}
