//! 17.14 Fixed-Point Real Arithmetic
//!
//! Scaled-integer real numbers for kernel code that must not touch the FPU:
//! a [`Fixed`] value is an `i32` holding the real number times `2^14`
//! (17 integer bits, 14 fraction bits, 1 sign bit).
//!
//! All operations are pure functions over the raw representation. There is no
//! error channel beyond the host integer overflow/divide semantics; callers
//! keep operands inside the 17.14 representable range.

/// Number of fraction bits in the representation.
pub const FRACTION_BITS: u32 = 14;

/// The scale factor `f = 2^14`.
pub const SCALE: i32 = 1 << FRACTION_BITS;

/// A real number scaled by [`SCALE`]. Deliberately a bare `i32`, not a
/// wrapper type: fixed-point values live in scheduler arithmetic where the
/// representation is part of the contract.
pub type Fixed = i32;

/// Convert an integer to fixed point.
#[inline]
pub const fn from_int(n: i32) -> Fixed {
    n * SCALE
}

/// Convert to integer, truncating toward zero.
#[inline]
pub const fn to_int_trunc(x: Fixed) -> i32 {
    x / SCALE
}

/// Convert to integer, rounding to nearest. Ties round away from zero in
/// both directions (symmetric, not banker's rounding).
#[inline]
pub const fn to_int_round(x: Fixed) -> i32 {
    if x >= 0 {
        (x + SCALE / 2) / SCALE
    } else {
        (x - SCALE / 2) / SCALE
    }
}

/// Add an integer to a fixed-point value.
#[inline]
pub const fn add_int(x: Fixed, n: i32) -> Fixed {
    x + n * SCALE
}

/// Subtract an integer from a fixed-point value.
#[inline]
pub const fn sub_int(x: Fixed, n: i32) -> Fixed {
    x - n * SCALE
}

/// Add two fixed-point values.
#[inline]
pub const fn add(x: Fixed, y: Fixed) -> Fixed {
    x + y
}

/// Subtract one fixed-point value from another.
#[inline]
pub const fn sub(x: Fixed, y: Fixed) -> Fixed {
    x - y
}

/// Multiply a fixed-point value by an integer.
#[inline]
pub const fn mul_int(x: Fixed, n: i32) -> Fixed {
    x * n
}

/// Divide a fixed-point value by an integer.
#[inline]
pub const fn div_int(x: Fixed, n: i32) -> Fixed {
    x / n
}

/// Multiply two fixed-point values.
///
/// The product is computed in 64 bits and rescaled, so intermediate overflow
/// cannot corrupt an in-range result.
#[inline]
pub const fn mul(x: Fixed, y: Fixed) -> Fixed {
    ((x as i64 * y as i64) / SCALE as i64) as Fixed
}

/// Divide one fixed-point value by another.
///
/// The numerator is widened and scaled up before the division so the
/// fractional part survives.
#[inline]
pub const fn div(x: Fixed, y: Fixed) -> Fixed {
    ((x as i64 * SCALE as i64) / y as i64) as Fixed
}
