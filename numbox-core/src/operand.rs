//! Operand dispatch for the arithmetic operators.
//!
//! `Vector::apply` and `Matrix::apply` are the single entry points that inspect
//! the right-hand operand. The `std::ops` impls below all route through them and
//! return a `Result`, since shape errors are ordinary runtime failures here.

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use crate::error::{NumboxError, Result};
use crate::matrix::Matrix;
use crate::vector::Vector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        }
    }

    pub(crate) fn unsupported(&self, lhs: &str, rhs: &Operand<'_>) -> NumboxError {
        NumboxError::TypeError(format!(
            "unsupported operand types for {}: {} and {}",
            self.symbol(),
            lhs,
            rhs.kind()
        ))
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Borrowed right-hand side of an arithmetic operation.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    Scalar(f64),
    Vector(&'a Vector),
    Matrix(&'a Matrix),
}

impl Operand<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Operand::Scalar(_) => "Scalar",
            Operand::Vector(_) => "Vector",
            Operand::Matrix(_) => "Matrix",
        }
    }
}

macro_rules! scalar_operand {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Operand<'_> {
                fn from(value: $t) -> Self {
                    Operand::Scalar(value as f64)
                }
            }
        )*
    };
}

scalar_operand!(f64, f32, i32, i64, u32, u64, usize);

impl<'a> From<&'a Vector> for Operand<'a> {
    fn from(v: &'a Vector) -> Self {
        Operand::Vector(v)
    }
}

impl<'a> From<&'a Matrix> for Operand<'a> {
    fn from(m: &'a Matrix) -> Self {
        Operand::Matrix(m)
    }
}

/// Owned result of a dispatched operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f64),
    Vector(Vector),
    Matrix(Matrix),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "Scalar",
            Value::Vector(_) => "Vector",
            Value::Matrix(_) => "Matrix",
        }
    }

    pub fn into_vector(self) -> Result<Vector> {
        match self {
            Value::Vector(v) => Ok(v),
            other => Err(NumboxError::TypeError(format!(
                "expected Vector, found {}",
                other.kind()
            ))),
        }
    }

    pub fn into_matrix(self) -> Result<Matrix> {
        match self {
            Value::Matrix(m) => Ok(m),
            other => Err(NumboxError::TypeError(format!(
                "expected Matrix, found {}",
                other.kind()
            ))),
        }
    }

    pub fn as_scalar(&self) -> Result<f64> {
        match self {
            Value::Scalar(x) => Ok(*x),
            other => Err(NumboxError::TypeError(format!(
                "expected Scalar, found {}",
                other.kind()
            ))),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Scalar(x)
    }
}

impl From<Vector> for Value {
    fn from(v: Vector) -> Self {
        Value::Vector(v)
    }
}

impl From<Matrix> for Value {
    fn from(m: Matrix) -> Self {
        Value::Matrix(m)
    }
}

// Operators take a borrowed left-hand side so the inherent copy methods of the
// same name keep resolving first on owned values.
macro_rules! vector_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl $trait<&Vector> for &Vector {
            type Output = Result<Vector>;
            fn $method(self, rhs: &Vector) -> Self::Output {
                self.apply($op, rhs)
            }
        }

        impl $trait<f64> for &Vector {
            type Output = Result<Vector>;
            fn $method(self, rhs: f64) -> Self::Output {
                self.apply($op, rhs)
            }
        }
    };
}

vector_operator!(Add, add, ArithOp::Add);
vector_operator!(Sub, sub, ArithOp::Sub);
vector_operator!(Mul, mul, ArithOp::Mul);
vector_operator!(Div, div, ArithOp::Div);

macro_rules! matrix_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl $trait<&Matrix> for &Matrix {
            type Output = Result<Matrix>;
            fn $method(self, rhs: &Matrix) -> Self::Output {
                self.apply($op, rhs)?.into_matrix()
            }
        }

        impl $trait<f64> for &Matrix {
            type Output = Result<Matrix>;
            fn $method(self, rhs: f64) -> Self::Output {
                self.apply($op, rhs)?.into_matrix()
            }
        }
    };
}

matrix_operator!(Add, add, ArithOp::Add);
matrix_operator!(Sub, sub, ArithOp::Sub);
matrix_operator!(Mul, mul, ArithOp::Mul);
matrix_operator!(Div, div, ArithOp::Div);

impl Mul<&Vector> for &Matrix {
    type Output = Result<Vector>;
    fn mul(self, rhs: &Vector) -> Self::Output {
        self.apply(ArithOp::Mul, rhs)?.into_vector()
    }
}
