//! 24.8 fixed-point coordinates.
//!
//! Every coordinate the tessellator sees is an `i32` holding a real value
//! scaled by `2^8`. Valid coordinates lie in `[-MAX_COORD, MAX_COORD]`; the
//! sweeps compute differences in `i64` and products in `i128`, so no
//! arithmetic on valid coordinates can overflow.

use crate::Error;

/// A fixed-point coordinate with [`FRAC_BITS`] fractional bits.
pub type Fixed = i32;

/// The number of fractional bits.
pub const FRAC_BITS: u32 = 8;

/// The fixed-point representation of `1`.
pub const ONE: Fixed = 1 << FRAC_BITS;

/// The largest magnitude a coordinate may have.
pub const MAX_COORD: Fixed = 1 << 30;

/// Converts an integer to fixed point.
///
/// `i` must be within `MAX_COORD >> FRAC_BITS` in magnitude for the result to
/// be a valid coordinate.
pub const fn from_int(i: i32) -> Fixed {
    i << FRAC_BITS
}

/// Rounds a float to the nearest fixed-point value.
pub fn from_f64(v: f64) -> Result<Fixed, Error> {
    if v.is_nan() {
        return Err(Error::NaN);
    }
    let scaled = (v * f64::from(ONE)).round();
    if scaled.abs() > f64::from(MAX_COORD) {
        return Err(Error::OutOfRange);
    }
    Ok(scaled as Fixed)
}

/// Converts a fixed-point value to a float. This is exact.
pub fn to_f64(f: Fixed) -> f64 {
    f64::from(f) / f64::from(ONE)
}

/// The largest integer not greater than `f`.
pub const fn integer_floor(f: Fixed) -> i32 {
    f >> FRAC_BITS
}

/// Checks that `f` is a valid coordinate.
pub fn check(f: Fixed) -> Result<Fixed, Error> {
    if f.unsigned_abs() > MAX_COORD.unsigned_abs() {
        Err(Error::OutOfRange)
    } else {
        Ok(f)
    }
}

/// `a * b / c`, truncating toward zero.
pub(crate) fn mul_div(a: i64, b: i64, c: i64) -> i64 {
    // |a * b| < 2^63 for deltas of valid coordinates.
    (i128::from(a) * i128::from(b) / i128::from(c)) as i64
}
