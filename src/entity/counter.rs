//! Increment-coalesce counters
//!
//! A counter holds the last value known to be stored (`resting`) and the
//! delta accumulated since (`pending`). Synthesis emits the pending delta
//! and folds it into the resting value.

use std::ops::Add;

use serde_json::Value;

/// An integer or float quantity. Integer plus float gives float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tally {
    Int(i64),
    Float(f64),
}

impl Tally {
    pub const ZERO: Tally = Tally::Int(0);

    /// Reads a JSON number. Unsigned values beyond `i64` become floats.
    pub fn from_value(value: &Value) -> Option<Tally> {
        let Value::Number(n) = value else {
            return None;
        };
        if let Some(i) = n.as_i64() {
            Some(Tally::Int(i))
        } else {
            n.as_f64().map(Tally::Float)
        }
    }

    pub fn to_value(self) -> Value {
        match self {
            Tally::Int(i) => Value::from(i),
            Tally::Float(f) => Value::from(f),
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Tally::Int(i) => i == 0,
            Tally::Float(f) => f == 0.0,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Tally::Int(i) => i as f64,
            Tally::Float(f) => f,
        }
    }
}

impl Default for Tally {
    fn default() -> Self {
        Tally::ZERO
    }
}

impl Add for Tally {
    type Output = Tally;

    fn add(self, rhs: Tally) -> Tally {
        match (self, rhs) {
            // Overflow degrades to float rather than wrapping
            (Tally::Int(a), Tally::Int(b)) => a
                .checked_add(b)
                .map(Tally::Int)
                .unwrap_or(Tally::Float(a as f64 + b as f64)),
            (a, b) => Tally::Float(a.as_f64() + b.as_f64()),
        }
    }
}

impl From<i64> for Tally {
    fn from(value: i64) -> Self {
        Tally::Int(value)
    }
}

impl From<i32> for Tally {
    fn from(value: i32) -> Self {
        Tally::Int(value as i64)
    }
}

impl From<f64> for Tally {
    fn from(value: f64) -> Self {
        Tally::Float(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Counter {
    resting: Tally,
    pending: Tally,
}

impl Counter {
    /// A counter at rest, as read from a stored document
    pub fn at_rest(resting: Tally) -> Self {
        Self {
            resting,
            pending: Tally::ZERO,
        }
    }

    pub fn resting(&self) -> Tally {
        self.resting
    }

    pub fn pending(&self) -> Tally {
        self.pending
    }

    /// Logical value: resting plus pending
    pub fn value(&self) -> Tally {
        self.resting + self.pending
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_zero()
    }

    pub fn increment(&mut self, delta: Tally) {
        self.pending = self.pending + delta;
    }

    /// Folds the pending delta into the resting value, returning the delta
    /// if it was nonzero
    pub fn collapse(&mut self) -> Option<Tally> {
        let delta = std::mem::take(&mut self.pending);
        if delta.is_zero() {
            return None;
        }
        self.resting = self.resting + delta;
        Some(delta)
    }
}
