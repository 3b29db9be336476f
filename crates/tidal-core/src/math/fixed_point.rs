//! # Fixed-Point Arithmetic
//!
//! 18-decimal ("wad") arithmetic. A wad value of 10^18 represents 1.0; a
//! multiply rescales by dividing once by the scale, a divide pre-scales the
//! numerator. All divisions truncate (floor).

use crate::constants::WAD;
use crate::errors::CoreResult;
use crate::math::big_int::{mul_div_u128, Rounding};

/// Multiply two wad values: `a * b / 1e18`
pub fn mul_wad(a: u128, b: u128) -> CoreResult<u128> {
    mul_div_u128(a, b, WAD, Rounding::Down)
}

/// Divide two wad values: `a * 1e18 / b`
pub fn div_wad(a: u128, b: u128) -> CoreResult<u128> {
    mul_div_u128(a, WAD, b, Rounding::Down)
}

/// Integer power of a wad base.
///
/// Evaluated by sequential truncating multiplication (`n` wad multiplies,
/// flooring at every step), not by squaring: the two accumulate truncation
/// differently and the step-wise form is the semantics the rebase target
/// schedule is defined against.
pub fn pow_wad(base: u128, exponent: u32) -> CoreResult<u128> {
    let mut result = WAD;
    for _ in 0..exponent {
        result = mul_wad(result, base)?;
    }
    Ok(result)
}

/// Convert a non-negative f64 into a wad value (config/display boundary only)
pub fn wad_from_f64(value: f64) -> Option<u128> {
    if !value.is_finite() || value < 0.0 || value >= 3.0e20 {
        return None;
    }
    Some((value * WAD as f64) as u128)
}

/// Approximate a wad value as f64 (display only)
pub fn wad_to_f64(value: u128) -> f64 {
    value as f64 / WAD as f64
}
