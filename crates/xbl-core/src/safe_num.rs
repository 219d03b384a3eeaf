// Numeric value with a contagious "missing" state.
//
// Box-score sheets have plenty of empty cells and most rate stats divide by
// something that can be zero. `SafeNum` keeps every formula a straight-line
// expression: any operation touching a missing value, and any division by
// zero, yields `Missing` instead of panicking or producing infinity.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A number that may be unknown.
///
/// Integers and reals are kept apart so that serialization reproduces the
/// literal it came from (`4` vs `4.0`). Integer `+ - *` stays integral; `/`
/// always produces a real.
#[derive(Debug, Clone, Copy, Default)]
pub enum SafeNum {
    Int(i64),
    Float(f64),
    #[default]
    Missing,
}

impl SafeNum {
    pub const ZERO: SafeNum = SafeNum::Int(0);

    /// Parse a spreadsheet cell. Integer literals stay integral, real
    /// literals become `Float`, anything else (including an empty cell) is
    /// `Missing`.
    pub fn parse(cell: &str) -> Self {
        let cell = cell.trim();
        if let Ok(v) = cell.parse::<i64>() {
            return SafeNum::Int(v);
        }
        match cell.parse::<f64>() {
            Ok(v) => SafeNum::from(v),
            Err(_) => SafeNum::Missing,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, SafeNum::Missing)
    }

    /// The value as an `f64`, or `None` when missing.
    pub fn value(&self) -> Option<f64> {
        match *self {
            SafeNum::Int(v) => Some(v as f64),
            SafeNum::Float(v) => Some(v),
            SafeNum::Missing => None,
        }
    }

    /// The value as a non-negative whole count. Reals qualify only when
    /// they have no fractional part.
    pub fn as_count(&self) -> Option<u32> {
        match *self {
            SafeNum::Int(v) => u32::try_from(v).ok(),
            SafeNum::Float(v) if v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => {
                Some(v as u32)
            }
            _ => None,
        }
    }

    fn is_zero(&self) -> bool {
        match *self {
            SafeNum::Int(v) => v == 0,
            SafeNum::Float(v) => v == 0.0,
            SafeNum::Missing => false,
        }
    }

    /// Round to `digits` fractional digits, half away from zero. Integers
    /// and missing values pass through unchanged, as do reals too large to
    /// scale. A result of zero is always `0.0`, never `-0.0`.
    pub fn round_to(self, digits: u32) -> SafeNum {
        match self {
            SafeNum::Float(v) => {
                let scale = 10f64.powi(digits as i32);
                let scaled = v * scale;
                if !scaled.is_finite() {
                    return self;
                }
                let rounded = scaled.round() / scale;
                // adding 0.0 turns -0.0 into 0.0
                SafeNum::Float(rounded + 0.0)
            }
            other => other,
        }
    }

    /// Three fractional digits, the precision every rate stat is reported at.
    pub fn round3(self) -> SafeNum {
        self.round_to(3)
    }

    /// Floor division. Two integers give an integer rounded toward negative
    /// infinity; anything involving a real gives a floored real.
    pub fn floor_div(self, rhs: impl Into<SafeNum>) -> SafeNum {
        let rhs = rhs.into();
        if rhs.is_zero() {
            return SafeNum::Missing;
        }
        match (self, rhs) {
            (SafeNum::Int(a), SafeNum::Int(b)) => match a.checked_div(b) {
                Some(q) if a % b != 0 && ((a < 0) != (b < 0)) => SafeNum::Int(q - 1),
                Some(q) => SafeNum::Int(q),
                None => SafeNum::from((a as f64 / b as f64).floor()),
            },
            _ => match (self.value(), rhs.value()) {
                (Some(a), Some(b)) => SafeNum::from((a / b).floor()),
                _ => SafeNum::Missing,
            },
        }
    }

    fn combine(
        self,
        rhs: SafeNum,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
    ) -> SafeNum {
        match (self, rhs) {
            (SafeNum::Int(a), SafeNum::Int(b)) => match int_op(a, b) {
                Some(v) => SafeNum::Int(v),
                None => SafeNum::from(float_op(a as f64, b as f64)),
            },
            _ => match (self.value(), rhs.value()) {
                (Some(a), Some(b)) => SafeNum::from(float_op(a, b)),
                _ => SafeNum::Missing,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<i64> for SafeNum {
    fn from(v: i64) -> Self {
        SafeNum::Int(v)
    }
}

impl From<i32> for SafeNum {
    fn from(v: i32) -> Self {
        SafeNum::Int(v.into())
    }
}

impl From<u32> for SafeNum {
    fn from(v: u32) -> Self {
        SafeNum::Int(v.into())
    }
}

impl From<u64> for SafeNum {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or(SafeNum::Float(v as f64), SafeNum::Int)
    }
}

impl From<usize> for SafeNum {
    fn from(v: usize) -> Self {
        i64::try_from(v).map_or(SafeNum::Float(v as f64), SafeNum::Int)
    }
}

/// Non-finite reals are not numbers we can report, so they become `Missing`.
impl From<f64> for SafeNum {
    fn from(v: f64) -> Self {
        if v.is_finite() {
            SafeNum::Float(v)
        } else {
            SafeNum::Missing
        }
    }
}

impl<T: Into<SafeNum>> From<Option<T>> for SafeNum {
    fn from(v: Option<T>) -> Self {
        v.map_or(SafeNum::Missing, Into::into)
    }
}

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

impl Add for SafeNum {
    type Output = SafeNum;

    fn add(self, rhs: SafeNum) -> SafeNum {
        self.combine(rhs, i64::checked_add, |a, b| a + b)
    }
}

impl Sub for SafeNum {
    type Output = SafeNum;

    fn sub(self, rhs: SafeNum) -> SafeNum {
        self.combine(rhs, i64::checked_sub, |a, b| a - b)
    }
}

impl Mul for SafeNum {
    type Output = SafeNum;

    fn mul(self, rhs: SafeNum) -> SafeNum {
        self.combine(rhs, i64::checked_mul, |a, b| a * b)
    }
}

impl Div for SafeNum {
    type Output = SafeNum;

    fn div(self, rhs: SafeNum) -> SafeNum {
        if rhs.is_zero() {
            return SafeNum::Missing;
        }
        match (self.value(), rhs.value()) {
            (Some(a), Some(b)) => SafeNum::from(a / b),
            _ => SafeNum::Missing,
        }
    }
}

impl Neg for SafeNum {
    type Output = SafeNum;

    fn neg(self) -> SafeNum {
        match self {
            SafeNum::Int(v) => v.checked_neg().map_or(SafeNum::Float(-(v as f64)), SafeNum::Int),
            SafeNum::Float(v) => SafeNum::Float(-v),
            SafeNum::Missing => SafeNum::Missing,
        }
    }
}

/// Mixed-operand forms so plain numbers can sit on either side.
macro_rules! impl_mixed_op {
    ($op:ident, $method:ident, $($prim:ty),+) => {$(
        impl $op<$prim> for SafeNum {
            type Output = SafeNum;

            fn $method(self, rhs: $prim) -> SafeNum {
                $op::$method(self, SafeNum::from(rhs))
            }
        }

        impl $op<SafeNum> for $prim {
            type Output = SafeNum;

            fn $method(self, rhs: SafeNum) -> SafeNum {
                $op::$method(SafeNum::from(self), rhs)
            }
        }
    )+};
}

impl_mixed_op!(Add, add, i64, f64);
impl_mixed_op!(Sub, sub, i64, f64);
impl_mixed_op!(Mul, mul, i64, f64);
impl_mixed_op!(Div, div, i64, f64);

macro_rules! impl_assign_op {
    ($op:ident, $method:ident, $binop:tt) => {
        impl<T: Into<SafeNum>> $op<T> for SafeNum {
            fn $method(&mut self, rhs: T) {
                let rhs: SafeNum = rhs.into();
                *self = *self $binop rhs;
            }
        }
    };
}

impl_assign_op!(AddAssign, add_assign, +);
impl_assign_op!(SubAssign, sub_assign, -);
impl_assign_op!(MulAssign, mul_assign, *);
impl_assign_op!(DivAssign, div_assign, /);

impl Sum for SafeNum {
    fn sum<I: Iterator<Item = SafeNum>>(iter: I) -> SafeNum {
        iter.fold(SafeNum::ZERO, |acc, v| acc + v)
    }
}

// ---------------------------------------------------------------------------
// Equality and display
// ---------------------------------------------------------------------------

/// Missing equals missing; an integer equals a real with the same value.
impl PartialEq for SafeNum {
    fn eq(&self, other: &SafeNum) -> bool {
        match (self, other) {
            (SafeNum::Missing, SafeNum::Missing) => true,
            (SafeNum::Int(a), SafeNum::Int(b)) => a == b,
            _ => match (self.value(), other.value()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl PartialEq<f64> for SafeNum {
    fn eq(&self, other: &f64) -> bool {
        self.value().is_some_and(|v| v == *other)
    }
}

impl PartialEq<i64> for SafeNum {
    fn eq(&self, other: &i64) -> bool {
        match *self {
            SafeNum::Int(v) => v == *other,
            SafeNum::Float(v) => v == *other as f64,
            SafeNum::Missing => false,
        }
    }
}

impl fmt::Display for SafeNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafeNum::Int(v) => write!(f, "{v}"),
            SafeNum::Float(v) => write!(f, "{v:?}"),
            SafeNum::Missing => f.write_str("null"),
        }
    }
}

// ---------------------------------------------------------------------------
// Serde
// ---------------------------------------------------------------------------

impl Serialize for SafeNum {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            SafeNum::Int(v) => serializer.serialize_i64(v),
            SafeNum::Float(v) => serializer.serialize_f64(v),
            SafeNum::Missing => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for SafeNum {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(i64),
            Float(f64),
        }

        Ok(match Option::<Repr>::deserialize(deserializer)? {
            Some(Repr::Int(v)) => SafeNum::Int(v),
            Some(Repr::Float(v)) => SafeNum::from(v),
            None => SafeNum::Missing,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
