//! Numeric cell values.
//!
//! A `Number` is either an exact integer or a real. Integer arithmetic stays
//! integer as long as it fits in `i64`; on overflow the operation falls back
//! to `f64`. Division always produces a real, even for whole quotients.

use serde::{Deserialize, Serialize};

/// Scalar value of a resolved cell.
///
/// Serialized as a plain JSON number: `Int` round-trips without a decimal
/// point, `Float` with one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Widen to `f64` (lossy above 2^53).
    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(x) => x,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(n) => n == 0,
            Number::Float(x) => x == 0.0,
        }
    }

    pub fn add(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => match a.checked_add(b) {
                Some(n) => Number::Int(n),
                None => Number::Float(a as f64 + b as f64),
            },
            _ => Number::Float(self.as_f64() + rhs.as_f64()),
        }
    }

    pub fn sub(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => match a.checked_sub(b) {
                Some(n) => Number::Int(n),
                None => Number::Float(a as f64 - b as f64),
            },
            _ => Number::Float(self.as_f64() - rhs.as_f64()),
        }
    }

    pub fn mul(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => match a.checked_mul(b) {
                Some(n) => Number::Int(n),
                None => Number::Float(a as f64 * b as f64),
            },
            _ => Number::Float(self.as_f64() * rhs.as_f64()),
        }
    }

    /// Real division. `None` when the divisor is exactly zero.
    pub fn checked_div(self, rhs: Number) -> Option<Number> {
        if rhs.is_zero() {
            return None;
        }
        Some(Number::Float(self.as_f64() / rhs.as_f64()))
    }
}

/// Numeric equality across variants: `Int(2) == Float(2.0)`.
impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{}", n),
            Number::Float(x) => {
                if x.fract() == 0.0 && x.abs() < 1e15 {
                    write!(f, "{}", *x as i64)
                } else {
                    write!(f, "{}", x)
                }
            }
        }
    }
}
