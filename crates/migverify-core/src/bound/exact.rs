use crate::bound::Number;
use num_bigint::BigUint;
use std::cmp::Ordering;

/// decimal128 exponent bias.
const DECIMAL128_EXPONENT_BIAS: i32 = 6176;

/// Largest canonical decimal128 coefficient (34 decimal digits).
const DECIMAL128_MAX_COEFFICIENT: u128 = 10u128.pow(34) - 1;

///
/// Exact
///
/// Numeric value without rounding, used whenever a decimal128 takes part in
/// a comparison. Declaration order is the numeric order of the classes.
///

#[derive(Debug, Eq, Ord, PartialEq, PartialOrd)]
enum Exact {
    NaN,
    NegativeInfinity,
    Finite(Finite),
    PositiveInfinity,
}

///
/// Finite
///
/// `±magnitude × 2^pow2 × 10^pow10`. Zero ignores its sign.
///

#[derive(Debug)]
struct Finite {
    negative: bool,
    magnitude: BigUint,
    pow2: i32,
    pow10: i32,
}

impl Finite {
    fn integer(value: i64) -> Self {
        Self {
            negative: value < 0,
            magnitude: BigUint::from(value.unsigned_abs()),
            pow2: 0,
            pow10: 0,
        }
    }

    fn is_zero(&self) -> bool {
        self.magnitude.bits() == 0
    }

    fn signum(&self) -> i8 {
        match (self.is_zero(), self.negative) {
            (true, _) => 0,
            (false, true) => -1,
            (false, false) => 1,
        }
    }
}

impl PartialEq for Finite {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Finite {}

impl PartialOrd for Finite {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Finite {
    fn cmp(&self, other: &Self) -> Ordering {
        let sign = self.signum().cmp(&other.signum());
        if sign != Ordering::Equal || self.is_zero() {
            return sign;
        }

        // Move the smaller power of each base to the other side so both
        // sides are whole numbers.
        let pow2 = self.pow2 - other.pow2;
        let pow10 = self.pow10 - other.pow10;
        let left = scale(
            &self.magnitude,
            pow2.max(0).unsigned_abs(),
            pow10.max(0).unsigned_abs(),
        );
        let right = scale(
            &other.magnitude,
            pow2.min(0).unsigned_abs(),
            pow10.min(0).unsigned_abs(),
        );

        if self.negative {
            right.cmp(&left)
        } else {
            left.cmp(&right)
        }
    }
}

fn scale(magnitude: &BigUint, pow2: u32, pow10: u32) -> BigUint {
    (magnitude << pow2) * BigUint::from(10u8).pow(pow10)
}

impl From<Number> for Exact {
    fn from(value: Number) -> Self {
        match value {
            Number::Int32(v) => Self::Finite(Finite::integer(i64::from(v))),
            Number::Int64(v) => Self::Finite(Finite::integer(v)),
            Number::Double(v) => from_double(v),
            Number::Decimal128(bytes) => from_decimal128(bytes),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn from_double(value: f64) -> Exact {
    if value.is_nan() {
        return Exact::NaN;
    }
    if value.is_infinite() {
        return if value < 0.0 {
            Exact::NegativeInfinity
        } else {
            Exact::PositiveInfinity
        };
    }

    let bits = value.to_bits();
    let exponent = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1 << 52) - 1);
    let (mantissa, pow2) = if exponent == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1 << 52), exponent - 1075)
    };

    Exact::Finite(Finite {
        negative: bits >> 63 == 1,
        magnitude: BigUint::from(mantissa),
        pow2,
        pow10: 0,
    })
}

// BID encoding: sign bit, then either a 14-bit exponent and 113-bit
// coefficient, or (combination bits 11) the large-coefficient form, which is
// never canonical for decimal128 and reads as zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn from_decimal128(bytes: [u8; 16]) -> Exact {
    let bits = u128::from_le_bytes(bytes);
    let negative = bits >> 127 == 1;

    match (bits >> 122) & 0x1f {
        0x1f => return Exact::NaN,
        0x1e if negative => return Exact::NegativeInfinity,
        0x1e => return Exact::PositiveInfinity,
        _ => {}
    }

    let (exponent, coefficient) = if (bits >> 125) & 0b11 == 0b11 {
        ((bits >> 111) & 0x3fff, 0)
    } else {
        ((bits >> 113) & 0x3fff, bits & ((1u128 << 113) - 1))
    };
    let coefficient = if coefficient > DECIMAL128_MAX_COEFFICIENT {
        0
    } else {
        coefficient
    };

    Exact::Finite(Finite {
        negative,
        magnitude: BigUint::from(coefficient),
        pow2: 0,
        pow10: exponent as i32 - DECIMAL128_EXPONENT_BIAS,
    })
}

/// Exact numeric comparison for pairs that involve a decimal128.
pub(super) fn cmp_exact(left: Number, right: Number) -> Ordering {
    Exact::from(left).cmp(&Exact::from(right))
}
