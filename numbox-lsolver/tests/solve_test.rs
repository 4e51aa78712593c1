use numbox_core::matrix;
use numbox_lsolver::{
    algorithms::{DirectLu, DirectQr, SolveAlgorithm},
    CpuDevice, Matrix, NumboxError,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// Helper for float comparison in tests
fn assert_approx_eq_vec(a: &[f64], b: &[f64], tolerance: f64) {
    assert_eq!(a.len(), b.len(), "Vector lengths differ");
    for i in 0..a.len() {
        let diff = (a[i] - b[i]).abs();
        assert!(
            diff <= tolerance,
            "Verification failed at index {}: expected {}, got {}, diff {}",
            i,
            b[i],
            a[i],
            diff
        );
    }
}

#[test]
fn test_direct_lu_tridiagonal() -> Result<(), NumboxError> {
    init_logger();
    let device = CpuDevice::new();
    let a = matrix![[4.0, -1.0, 0.0], [-1.0, 4.0, -1.0], [0.0, -1.0, 4.0]]?;
    let b = vec![1.0, 2.0, 3.0];

    let result = DirectLu::default().solve(&device, &a, &b)?;

    assert_approx_eq_vec(&result.x, &[13.0 / 28.0, 6.0 / 7.0, 27.0 / 28.0], 1e-12);
    assert!((result.metadata.determinant - 56.0).abs() < 1e-9);
    assert!(result.metadata.residual_norm <= 1e-10);
    Ok(())
}

#[test]
fn test_direct_lu_lower_triangular() -> Result<(), NumboxError> {
    init_logger();
    let device = CpuDevice::new();
    let a = matrix![[1.0, 0.0, 0.0], [-237.0, 1.0, 0.0], [0.0, -2.5, 1.0]]?;
    let b = vec![1.0, 0.0, 0.0];

    let result = DirectLu::new().solve(&device, &a, &b)?;

    assert_approx_eq_vec(&result.x, &[1.0, 237.0, 592.5], 1e-9);
    Ok(())
}

#[test]
fn test_direct_lu_random_diagonally_dominant() -> Result<(), NumboxError> {
    init_logger();
    let n = 20;
    let mut rng = fastrand::Rng::with_seed(42);
    let mut a = Matrix::new(n, n)?;
    for i in 0..n {
        let mut off_diagonal = 0.0;
        for j in 0..n {
            if i != j {
                let v = rng.f64() - 0.5;
                a.set(i, j, v)?;
                off_diagonal += v.abs();
            }
        }
        a.set(i, i, off_diagonal + 1.0)?;
    }
    let x_true: Vec<f64> = (0..n).map(|_| rng.f64() * 10.0).collect();
    let b: Vec<f64> = a.mul_vector(&x_true.clone().into())?.into();

    let algorithm = DirectLu::with_params(1e-12, 5, 1e-12);
    let result = algorithm.solve(&CpuDevice::new(), &a, &b)?;

    assert_approx_eq_vec(&result.x, &x_true, 1e-9);
    assert!(result.metadata.refinements <= 5);
    Ok(())
}

#[test]
fn test_direct_lu_singular() {
    init_logger();
    let a = matrix![[1.0, 2.0], [2.0, 4.0]].unwrap();
    let err = DirectLu::default()
        .solve(&CpuDevice::new(), &a, &[1.0, 2.0])
        .unwrap_err();
    assert_eq!(err, NumboxError::SingularMatrix);
}

#[test]
fn test_direct_lu_validation() {
    init_logger();
    let device = CpuDevice::new();
    let wide = Matrix::new(2, 3).unwrap();
    assert_eq!(
        DirectLu::default().solve(&device, &wide, &[1.0, 2.0]).unwrap_err(),
        NumboxError::NotSquare { rows: 2, cols: 3 }
    );
    let square = Matrix::identity(2).unwrap();
    assert!(matches!(
        DirectLu::default().solve(&device, &square, &[1.0]),
        Err(NumboxError::DimensionMismatch(_))
    ));
}

#[test]
fn test_direct_qr_exact_line() -> Result<(), NumboxError> {
    init_logger();
    let a = matrix![[1, 0], [1, 1], [1, 2], [1, 3], [1, 4]]?;
    let b = vec![2.0, 2.5, 3.0, 3.5, 4.0];

    let result = DirectQr::default().solve(&CpuDevice::new(), &a, &b)?;

    assert_approx_eq_vec(&result.x, &[2.0, 0.5], 1e-12);
    assert!(result.metadata.residual_norm < 1e-12);
    Ok(())
}

#[test]
fn test_direct_qr_residual_norm() -> Result<(), NumboxError> {
    init_logger();
    let a = matrix![[1, 0], [1, 1], [1, 2]]?;
    let b = vec![0.0, 2.0, 1.0];

    let result = DirectQr::new().solve(&CpuDevice::new(), &a, &b)?;

    // Fitted values 0.5, 1.0, 1.5 leave residuals -0.5, 1.0, -0.5
    assert_approx_eq_vec(&result.x, &[0.5, 0.5], 1e-12);
    assert!((result.metadata.residual_norm - 1.5f64.sqrt()).abs() < 1e-12);
    Ok(())
}

#[test]
fn test_direct_qr_validation() {
    init_logger();
    let device = CpuDevice::new();
    let wide = Matrix::new(2, 3).unwrap();
    assert!(matches!(
        DirectQr::default().solve(&device, &wide, &[1.0, 2.0]),
        Err(NumboxError::DimensionMismatch(_))
    ));
    let tall = Matrix::new(3, 2).unwrap();
    assert!(matches!(
        DirectQr::default().solve(&device, &tall, &[1.0, 2.0]),
        Err(NumboxError::DimensionMismatch(_))
    ));
    // Zero matrix is rank deficient
    assert_eq!(
        DirectQr::default()
            .solve(&device, &tall, &[1.0, 2.0, 3.0])
            .unwrap_err(),
        NumboxError::SingularMatrix
    );
}
