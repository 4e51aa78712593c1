use num_traits::ToPrimitive;

/// Test value that converts to `f64` only when it holds a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Opaque(pub Option<f64>);

impl Opaque {
    pub const NONE: Opaque = Opaque(None);

    pub fn num(v: f64) -> Self {
        Opaque(Some(v))
    }
}

impl ToPrimitive for Opaque {
    fn to_i64(&self) -> Option<i64> {
        self.0.and_then(|v| v.to_i64())
    }

    fn to_u64(&self) -> Option<u64> {
        self.0.and_then(|v| v.to_u64())
    }

    fn to_f64(&self) -> Option<f64> {
        self.0
    }
}
