//! # Oracle Module
//!
//! The boundary to the external price oracle, the TWAP price adapter that
//! turns an averaged tick into an 18-decimal ratio, and the cross-pair
//! composer that chains two legs into one asset -> quote price.

pub mod buffer;

pub use buffer::{BufferOracle, ObservationBuffer};

use crate::constants::MIN_TWAP_WINDOW_SECS;
use crate::errors::{CoreResult, TidalCoreError};
use crate::math::fixed_point::mul_wad;
use crate::math::tick_math::price_wad_at_tick;
use crate::types::PoolId;

/// A TWAP query result from one pool. Only the averaged tick feeds the
/// rebase computation; liquidity is surfaced for callers that want to gauge
/// observation quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwapObservation {
    /// Time-weighted average tick over the requested window
    pub mean_tick: i32,
    /// Time-weighted harmonic mean liquidity over the window
    pub harmonic_mean_liquidity: u128,
}

/// The external price oracle consulted by the controller.
///
/// Implementations must be read-only and side-effect free: a query is
/// answered from already-accumulated history, never by triggering new
/// accumulation, and a failed query leaves nothing behind. `now` is passed
/// explicitly; the core has no ambient clock.
pub trait PriceOracle {
    /// Time-weighted observation for `pool` over the `window_secs` seconds
    /// trailing `now`
    fn consult(&self, pool: PoolId, window_secs: u32, now: i64) -> CoreResult<TwapObservation>;
}

/// TWAP price adapter: one pool leg as a wad ratio (units of quote per unit
/// of base).
///
/// Rejects windows under the manipulation-resistance floor and unset pool
/// identifiers before touching the oracle. Oracle failures propagate;
/// retrying is the external trigger's prerogative.
pub fn twap_price<O: PriceOracle + ?Sized>(
    oracle: &O,
    pool: PoolId,
    window_secs: u32,
    now: i64,
) -> CoreResult<u128> {
    if window_secs < MIN_TWAP_WINDOW_SECS {
        return Err(TidalCoreError::WindowTooShort {
            actual: window_secs,
            min: MIN_TWAP_WINDOW_SECS,
        });
    }
    if pool.is_zero() {
        return Err(TidalCoreError::InvalidPoolId);
    }

    let observation = oracle.consult(pool, window_secs, now)?;
    price_wad_at_tick(observation.mean_tick)
}

/// Cross-pair composer: chains an asset -> intermediate ratio with an
/// intermediate -> quote ratio, rescaling once
pub fn cross_pair_price(asset_leg: u128, quote_leg: u128) -> CoreResult<u128> {
    mul_wad(asset_leg, quote_leg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WAD;

    struct FixedOracle {
        tick: i32,
    }

    impl PriceOracle for FixedOracle {
        fn consult(
            &self,
            _pool: PoolId,
            _window_secs: u32,
            _now: i64,
        ) -> CoreResult<TwapObservation> {
            Ok(TwapObservation {
                mean_tick: self.tick,
                harmonic_mean_liquidity: WAD,
            })
        }
    }

    fn some_pool() -> PoolId {
        let mut bytes = [0u8; 32];
        bytes[0] = 7;
        PoolId::new(bytes)
    }

    #[test]
    fn test_window_floor_enforced() {
        let oracle = FixedOracle { tick: 0 };
        let err = twap_price(&oracle, some_pool(), 899, 0).unwrap_err();
        assert_eq!(
            err,
            TidalCoreError::WindowTooShort { actual: 899, min: 900 }
        );
        assert!(twap_price(&oracle, some_pool(), 900, 0).is_ok());
    }

    #[test]
    fn test_zero_pool_rejected() {
        let oracle = FixedOracle { tick: 0 };
        assert_eq!(
            twap_price(&oracle, PoolId::ZERO, 900, 0),
            Err(TidalCoreError::InvalidPoolId)
        );
    }

    #[test]
    fn test_tick_zero_is_unit_price() {
        let oracle = FixedOracle { tick: 0 };
        assert_eq!(twap_price(&oracle, some_pool(), 900, 0).unwrap(), WAD);
    }

    #[test]
    fn test_cross_pair_composition() {
        // 2.0 * 0.5 = 1.0
        assert_eq!(cross_pair_price(2 * WAD, WAD / 2).unwrap(), WAD);
        // 1.5 * 3.0 = 4.5
        assert_eq!(
            cross_pair_price(WAD * 3 / 2, 3 * WAD).unwrap(),
            WAD * 9 / 2
        );
    }
}
