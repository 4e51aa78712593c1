use std::fmt;

use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{NumboxError, Result};
use crate::format;
use crate::vector::Vector;

/// Fixed-capacity ring of `f64` over a [`Vector`] store.
///
/// `head` is the slot the next push writes to, and therefore the oldest value
/// once the ring is full. Logical index `i` maps to slot `(head + i) mod capacity`
/// for any `i`, negative or larger than the capacity, so reads never fail:
/// `get(0)` is the oldest value and `get(-1)` the newest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BufferState", into = "BufferState")]
pub struct CircularBuffer {
    store: Vector,
    head: usize,
}

/// Serialized form of a [`CircularBuffer`]: raw slot contents plus the head.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferState {
    pub values: Vec<f64>,
    pub head: usize,
}

impl CircularBuffer {
    /// Creates a zero-filled ring.
    ///
    /// # Errors
    /// `InvalidSize` for a zero capacity.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::try_from(Vector::new(capacity))
    }

    /// Ring whose storage starts as `values`, head at slot 0.
    pub fn from_values<T: ToPrimitive>(values: &[T]) -> Result<Self> {
        Self::try_from(Vector::from_values(values)?)
    }

    pub fn capacity(&self) -> usize {
        self.store.len()
    }

    pub fn head(&self) -> usize {
        self.head
    }

    // Physical slot of logical offset `i` from the head.
    fn slot(&self, i: isize) -> usize {
        let cap = self.capacity() as isize;
        let offset = i.rem_euclid(cap) as usize;
        (self.head + offset) % self.capacity()
    }

    /// Overwrites the oldest slot with `value` and advances the head.
    /// Returns the stored value.
    ///
    /// # Errors
    /// `TypeError` if `value` has no `f64` representation.
    pub fn push<T: ToPrimitive>(&mut self, value: T) -> Result<f64> {
        let value = value
            .to_f64()
            .ok_or_else(|| NumboxError::TypeError("Non-numeric value pushed".to_string()))?;
        let head = self.head;
        self.store.as_mut_slice()[head] = value;
        self.head = self.slot(1);
        Ok(value)
    }

    /// Value at logical index `i`, wrapping in both directions.
    pub fn get(&self, i: isize) -> f64 {
        self.store.as_slice()[self.slot(i)]
    }

    pub fn oldest(&self) -> f64 {
        self.get(0)
    }

    pub fn newest(&self) -> f64 {
        self.get(-1)
    }

    /// Values in logical order, oldest first. Each call starts over.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        (0..self.capacity()).map(move |i| self.get(i as isize))
    }

    /// Logical-order copy of the contents.
    pub fn to_vector(&self) -> Vector {
        self.iter().collect()
    }

    /// The backing store in physical slot order.
    pub fn as_vector(&self) -> &Vector {
        &self.store
    }

    pub fn set_format(&mut self, spec: &str) -> Result<&mut Self> {
        self.store.set_format(spec)?;
        Ok(self)
    }
}

impl TryFrom<Vector> for CircularBuffer {
    type Error = NumboxError;

    fn try_from(store: Vector) -> Result<Self> {
        if store.is_empty() {
            return Err(NumboxError::InvalidSize(
                "circular buffer capacity must be positive".to_string(),
            ));
        }
        Ok(Self { store, head: 0 })
    }
}

impl TryFrom<BufferState> for CircularBuffer {
    type Error = NumboxError;

    fn try_from(state: BufferState) -> Result<Self> {
        let mut buffer = Self::try_from(Vector::from(state.values))?;
        if state.head >= buffer.capacity() {
            return Err(NumboxError::index(state.head, buffer.capacity()));
        }
        buffer.head = state.head;
        Ok(buffer)
    }
}

impl From<CircularBuffer> for BufferState {
    fn from(buffer: CircularBuffer) -> Self {
        BufferState {
            values: buffer.store.into(),
            head: buffer.head,
        }
    }
}

impl fmt::Display for CircularBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt = self.store.format();
        let lines: Vec<String> = self.iter().map(|v| fmt.render(v)).collect();
        f.write_str(&format::boxed(&lines))
    }
}
