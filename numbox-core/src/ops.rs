// This module contains the dense numeric kernels.
// Vector, Matrix and the decompositions call only these functions for
// storage-level arithmetic. All slices are contiguous f64 buffers; matrices
// are row-major (`data[row * cols + col]`). Callers check dimensions first,
// the kernels only debug-assert them.

/// Internal implementation for `dst[i] = f(dst[i], src[i])`.
/// Shared by every elementwise operation, in-place or copy-returning.
pub(crate) fn zip_in_place<F>(dst: &mut [f64], src: &[f64], f: F)
where
    F: Fn(f64, f64) -> f64,
{
    debug_assert_eq!(dst.len(), src.len());
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = f(*d, s);
    }
}

/// Internal implementation for `x = alpha * x`.
pub(crate) fn scale(x: &mut [f64], alpha: f64) {
    for v in x.iter_mut() {
        *v *= alpha;
    }
}

/// Internal implementation for `x = x + offset` (broadcast).
pub(crate) fn add_constant(x: &mut [f64], offset: f64) {
    for v in x.iter_mut() {
        *v += offset;
    }
}

/// Internal implementation for `y = alpha * x + y`.
pub(crate) fn axpy(alpha: f64, x: &[f64], y: &mut [f64]) {
    debug_assert_eq!(x.len(), y.len());
    zip_in_place(y, x, |yi, xi| yi + alpha * xi);
}

/// Internal implementation for `x^T * y`.
pub(crate) fn dot(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    x.iter().zip(y).map(|(a, b)| a * b).sum()
}

/// Internal implementation for `y = A * x`, with `A` of `rows x cols`.
pub(crate) fn gemv(a: &[f64], rows: usize, cols: usize, x: &[f64], y: &mut [f64]) {
    debug_assert_eq!(a.len(), rows * cols);
    debug_assert_eq!(x.len(), cols);
    debug_assert_eq!(y.len(), rows);
    for (i, yi) in y.iter_mut().enumerate() {
        *yi = dot(&a[i * cols..(i + 1) * cols], x);
    }
}

/// Internal implementation for `C = A * B`, with `A` of `m x k` and `B` of `k x n`.
/// Plain row-by-column contraction, summed in ascending `k`.
pub(crate) fn gemm(a: &[f64], m: usize, k: usize, b: &[f64], n: usize, c: &mut [f64]) {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);
    debug_assert_eq!(c.len(), m * n);
    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.0;
            for p in 0..k {
                sum += a[i * k + p] * b[p * n + j];
            }
            c[i * n + j] = sum;
        }
    }
}

/// Internal implementation for `dst = src^T`, with `src` of `rows x cols`.
pub(crate) fn transpose(src: &[f64], rows: usize, cols: usize, dst: &mut [f64]) {
    debug_assert_eq!(src.len(), rows * cols);
    debug_assert_eq!(dst.len(), rows * cols);
    for i in 0..rows {
        for j in 0..cols {
            dst[j * rows + i] = src[i * cols + j];
        }
    }
}

/// Index of the largest element, first occurrence wins. `None` for an empty slice.
pub(crate) fn arg_max(x: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &v) in x.iter().enumerate() {
        match best {
            Some(b) if v <= x[b] => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Index of the smallest element, first occurrence wins. `None` for an empty slice.
pub(crate) fn arg_min(x: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &v) in x.iter().enumerate() {
        match best {
            Some(b) if v >= x[b] => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Euclidean norm.
pub(crate) fn norm2(x: &[f64]) -> f64 {
    dot(x, x).sqrt()
}

/// Largest absolute value; 0 for an empty slice.
pub(crate) fn norm_inf(x: &[f64]) -> f64 {
    x.iter().fold(0.0, |acc, v| acc.max(v.abs()))
}
