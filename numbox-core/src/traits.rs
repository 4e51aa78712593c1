use bytemuck::{Pod, Zeroable};
use std::fmt::Debug;

/// Generic trait representing a dense matrix with row-major storage.
pub trait MatrixLike: Debug {
    /// The underlying numeric type of the matrix elements.
    type Value: Copy + Debug + Default + Pod + Zeroable;

    /// Returns the dimensions of the matrix as (rows, columns).
    fn dims(&self) -> (usize, usize);

    /// Row-major view of the elements.
    fn as_slice(&self) -> &[Self::Value];

    /// Returns the number of rows.
    fn rows(&self) -> usize {
        self.dims().0
    }

    /// Returns the number of columns.
    fn cols(&self) -> usize {
        self.dims().1
    }

    /// Checks if the matrix is square.
    fn is_square(&self) -> bool {
        let (rows, cols) = self.dims();
        rows == cols
    }
}

/// Generic trait representing a dense vector.
pub trait VectorLike: Debug {
    type Value: Copy + Debug + Default + Pod + Zeroable;

    /// Returns the number of elements in the vector.
    fn len(&self) -> usize;

    fn as_slice(&self) -> &[Self::Value];

    /// Checks if the vector is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
