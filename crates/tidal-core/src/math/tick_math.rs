//! # Tick Math
//!
//! Converts a log-price tick into a linear price ratio. The oracle reports
//! ticks where `price = 1.0001^tick`; conversion goes through the square
//! root ratio (so each magic constant covers one bit of the tick) and the
//! final quote is rescaled to 18 decimals.

use crate::constants::{MAX_TICK, MIN_TICK, WAD};
use crate::errors::{CoreResult, TidalCoreError};
use crate::math::big_int::{mul_shift_128, mul_u128_to_u256, shr_64_round_up, U256};

/// Pre-computed values of `sqrt(1.0001)^-(2^i)` in Q128.128 format, one per
/// bit of the tick magnitude
const SQRT_RATIO_NEG_POW_2: [u128; 20] = [
    0xfffcb933bd6fad37aa2d162d1a594001, // 2^0
    0xfff97272373d413259a46990580e213a, // 2^1
    0xfff2e50f5f656932ef12357cf3c7fdcc, // 2^2
    0xffe5caca7e10e4e61c3624eaa0941cd0, // 2^3
    0xffcb9843d60f6159c9db58835c926644, // 2^4
    0xff973b41fa98c081472e6896dfb254c0, // 2^5
    0xff2ea16466c96a3843ec78b326b52861, // 2^6
    0xfe5dee046a99a2a811c461f1969c3053, // 2^7
    0xfcbe86c7900a88aedcffc83b479aa3a4, // 2^8
    0xf987a7253ac413176f2b074cf7815e54, // 2^9
    0xf3392b0822b70005940c7a398e4b70f3, // 2^10
    0xe7159475a2c29b7443b29c7fa6e889d9, // 2^11
    0xd097f3bdfd2022b8845ad8f792aa5825, // 2^12
    0xa9f746462d870fdf8a65dc1f90e061e5, // 2^13
    0x70d869a156d2a1b890bb3df62baf32f7, // 2^14
    0x31be135f97d08fd981231505542fcfa6, // 2^15
    0x9aa508b5b7a84e1c677de54f3e99bc9,  // 2^16
    0x5d6af8dedb81196699c329225ee604,   // 2^17
    0x2216e584f5fa1ea926041bedfe98,     // 2^18
    0x48a170391f7dc42444e8fa2,          // 2^19
];

/// Square-root price ratio at a tick, Q64.64: `sqrt(1.0001^tick) * 2^64`
pub fn sqrt_ratio_x64_at_tick(tick: i32) -> CoreResult<u128> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(TidalCoreError::InvalidTick(tick));
    }

    let abs_tick = tick.unsigned_abs();

    // Binary decomposition: multiply in sqrt(1.0001)^-(2^i) for each set bit,
    // accumulating in Q128.128
    let mut ratio = if abs_tick & 1 != 0 {
        U256::from_u128(SQRT_RATIO_NEG_POW_2[0])
    } else {
        U256::new(0, 1) // 1.0 in Q128.128
    };
    for (i, magic) in SQRT_RATIO_NEG_POW_2.iter().enumerate().skip(1) {
        if abs_tick & (1 << i) != 0 {
            ratio = mul_shift_128(ratio, *magic)?;
        }
    }

    // The table encodes negative powers; invert for positive ticks
    if tick > 0 {
        let divisor = ratio.to_u128().ok_or(TidalCoreError::Overflow)?;
        let (inverted, _) = U256::MAX
            .div_rem(&U256::from_u128(divisor))
            .ok_or(TidalCoreError::DivisionByZero)?;
        ratio = inverted;
    }

    // Narrow Q128.128 -> Q64.64, rounding up so round-tripping a tick does
    // not undershoot it
    shr_64_round_up(ratio)
}

/// Linear price ratio at a tick, 18 decimals: `1.0001^tick * 1e18`.
///
/// Ticks whose price exceeds the wad-scale u128 range fail with `Overflow`;
/// deeply negative ticks truncate toward zero.
pub fn price_wad_at_tick(tick: i32) -> CoreResult<u128> {
    let sqrt_x64 = sqrt_ratio_x64_at_tick(tick)?;
    // price_wad = sqrt^2 * 1e18 / 2^128
    let squared = mul_u128_to_u256(sqrt_x64, sqrt_x64);
    let scaled = mul_shift_128(squared, WAD)?;
    scaled.to_u128().ok_or(TidalCoreError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: u128, expected: u128, tolerance: u128) {
        let diff = actual.abs_diff(expected);
        assert!(
            diff <= tolerance,
            "actual {} vs expected {} (diff {} > tolerance {})",
            actual,
            expected,
            diff,
            tolerance
        );
    }

    #[test]
    fn test_price_at_tick_zero_is_one() {
        assert_eq!(price_wad_at_tick(0).unwrap(), WAD);
    }

    #[test]
    fn test_price_at_unit_ticks() {
        // 1.0001^1 = 1.0001
        assert_close(
            price_wad_at_tick(1).unwrap(),
            1_000_100_000_000_000_000,
            1_000_000,
        );
        // 1.0001^-1 = 0.99990000999...
        assert_close(
            price_wad_at_tick(-1).unwrap(),
            999_900_009_999_000_099,
            1_000_000,
        );
    }

    #[test]
    fn test_price_at_larger_ticks() {
        // 1.0001^6931 ~= 1.9998356 (one tick-doubling short of 2.0)
        let price = price_wad_at_tick(6931).unwrap();
        assert_close(price, 1_999_835_600_000_000_000, 2_000_000_000_000_000);

        // 1.0001^-6931 ~= 1 / 1.9998356 = 0.5000411
        let price = price_wad_at_tick(-6931).unwrap();
        assert_close(price, 500_041_100_000_000_000, 1_000_000_000_000_000);
    }

    #[test]
    fn test_price_monotone_in_tick() {
        let ticks = [-100_000, -5_000, -1, 0, 1, 5_000, 100_000];
        let prices: Vec<u128> = ticks
            .iter()
            .map(|t| price_wad_at_tick(*t).unwrap())
            .collect();
        for pair in prices.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_inverse_ticks_compose_to_one() {
        use crate::math::fixed_point::mul_wad;
        for tick in [1, 137, 6931, 50_000] {
            let up = price_wad_at_tick(tick).unwrap();
            let down = price_wad_at_tick(-tick).unwrap();
            let composed = mul_wad(up, down).unwrap();
            // Within a few parts per billion of 1.0
            assert_close(composed, WAD, 10_000_000_000);
        }
    }

    #[test]
    fn test_tick_out_of_range() {
        assert_eq!(
            price_wad_at_tick(MAX_TICK + 1),
            Err(TidalCoreError::InvalidTick(MAX_TICK + 1))
        );
        assert_eq!(
            price_wad_at_tick(MIN_TICK - 1),
            Err(TidalCoreError::InvalidTick(MIN_TICK - 1))
        );
    }

    #[test]
    fn test_unrepresentable_price_overflows() {
        // 1.0001^800000 ~= 5.5e34, beyond wad-scale u128
        assert_eq!(
            price_wad_at_tick(800_000),
            Err(TidalCoreError::Overflow)
        );
    }
}
