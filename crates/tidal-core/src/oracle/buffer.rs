//! # Observation Buffer Oracle
//!
//! An in-memory tick accumulator: each pool keeps a bounded ring of
//! `(tick, liquidity, timestamp)` observations, and a consult answers with
//! the time-weighted average tick over a trailing window. The tick is
//! piecewise-constant between observations. Used by tests and the keeper;
//! production deployments substitute their own `PriceOracle`.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::constants::{DEFAULT_OBSERVATION_CAPACITY, MAX_TICK, MIN_TICK};
use crate::errors::{CoreResult, TidalCoreError};
use crate::math::safe_math::{safe_add_i128, safe_add_u128, safe_cast_i128_to_i32, safe_div_u128, safe_mul_i128};
use crate::oracle::{PriceOracle, TwapObservation};
use crate::types::PoolId;

/// One recorded pool state
#[derive(Debug, Clone, Copy)]
pub struct TickObservation {
    pub tick: i32,
    pub liquidity: u128,
    pub timestamp: i64,
}

/// Bounded ring of observations for a single pool
#[derive(Debug, Clone)]
pub struct ObservationBuffer {
    observations: VecDeque<TickObservation>,
    capacity: usize,
}

impl Default for ObservationBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_OBSERVATION_CAPACITY)
    }
}

impl ObservationBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            observations: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    /// Append an observation. Timestamps must be strictly increasing; the
    /// oldest observation is evicted once the ring is full.
    pub fn record(&mut self, tick: i32, liquidity: u128, timestamp: i64) -> CoreResult<()> {
        if !(MIN_TICK..=MAX_TICK).contains(&tick) {
            return Err(TidalCoreError::InvalidTick(tick));
        }
        if let Some(last) = self.observations.back() {
            if timestamp <= last.timestamp {
                return Err(TidalCoreError::StaleObservation);
            }
        }
        if self.observations.len() == self.capacity {
            self.observations.pop_front();
        }
        self.observations.push_back(TickObservation { tick, liquidity, timestamp });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Time-weighted average over the trailing window ending at `now`.
    ///
    /// Fails with `OracleUnavailable` unless the recorded history covers the
    /// whole window: some observation must be at or before `now - window`.
    /// The mean tick floors (rounds toward negative infinity).
    pub fn consult(&self, window_secs: u32, now: i64) -> CoreResult<TwapObservation> {
        let unavailable = TidalCoreError::OracleUnavailable { window: window_secs };
        if window_secs == 0 {
            return Err(unavailable);
        }
        let start = now - i64::from(window_secs);
        match self.observations.front() {
            Some(first) if first.timestamp <= start => {}
            _ => return Err(unavailable),
        }

        let mut weighted_ticks: i128 = 0;
        let mut covered: i64 = 0;
        // Q64-scaled sum of dt / liquidity; zero liquidity saturates
        let mut inverse_liquidity: u128 = 0;
        let mut zero_liquidity_seen = false;

        for (index, observation) in self.observations.iter().enumerate() {
            let segment_start = observation.timestamp.max(start);
            let segment_end = match self.observations.get(index + 1) {
                Some(next) => next.timestamp.min(now),
                None => now,
            };
            if segment_end <= segment_start {
                continue;
            }
            let dt = segment_end - segment_start;

            weighted_ticks = safe_add_i128(
                weighted_ticks,
                safe_mul_i128(i128::from(observation.tick), i128::from(dt))?,
            )?;
            covered += dt;

            if observation.liquidity == 0 {
                zero_liquidity_seen = true;
            } else {
                inverse_liquidity = safe_add_u128(
                    inverse_liquidity,
                    ((dt as u128) << 64) / observation.liquidity,
                )?;
            }
        }

        if covered <= 0 {
            return Err(unavailable);
        }

        // Floor division keeps negative means consistent with positive ones
        let mean_tick = safe_cast_i128_to_i32(weighted_ticks.div_euclid(i128::from(covered)))?;

        let harmonic_mean_liquidity = if zero_liquidity_seen {
            0
        } else if inverse_liquidity == 0 {
            // Liquidity too large for Q64 resolution; saturate
            u128::MAX
        } else {
            safe_div_u128((covered as u128) << 64, inverse_liquidity)?
        };

        Ok(TwapObservation { mean_tick, harmonic_mean_liquidity })
    }
}

/// Shared multi-pool oracle backed by per-pool observation buffers. Handles
/// are cheap clones over the same state, so a recorder (simulation, indexer)
/// and the controller can hold the same oracle.
#[derive(Debug, Clone, Default)]
pub struct BufferOracle {
    pools: Arc<RwLock<HashMap<PoolId, ObservationBuffer>>>,
}

impl BufferOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observation for `pool`, creating its buffer on first use
    pub fn record(
        &self,
        pool: PoolId,
        tick: i32,
        liquidity: u128,
        timestamp: i64,
    ) -> CoreResult<()> {
        self.pools
            .write()
            .entry(pool)
            .or_default()
            .record(tick, liquidity, timestamp)
    }
}

impl PriceOracle for BufferOracle {
    fn consult(&self, pool: PoolId, window_secs: u32, now: i64) -> CoreResult<TwapObservation> {
        let pools = self.pools.read();
        let buffer = pools
            .get(&pool)
            .ok_or(TidalCoreError::OracleUnavailable { window: window_secs })?;
        buffer.consult(window_secs, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIQ: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn test_record_requires_increasing_timestamps() {
        let mut buffer = ObservationBuffer::new(8);
        buffer.record(0, LIQ, 100).unwrap();
        assert_eq!(
            buffer.record(1, LIQ, 100),
            Err(TidalCoreError::StaleObservation)
        );
        assert_eq!(
            buffer.record(1, LIQ, 99),
            Err(TidalCoreError::StaleObservation)
        );
        buffer.record(1, LIQ, 101).unwrap();
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_record_rejects_out_of_range_tick() {
        let mut buffer = ObservationBuffer::new(8);
        assert_eq!(
            buffer.record(MAX_TICK + 1, LIQ, 1),
            Err(TidalCoreError::InvalidTick(MAX_TICK + 1))
        );
    }

    #[test]
    fn test_eviction_keeps_ring_bounded() {
        let mut buffer = ObservationBuffer::new(4);
        for ts in 1..=10 {
            buffer.record(ts as i32, LIQ, ts).unwrap();
        }
        assert_eq!(buffer.len(), 4);
    }

    #[test]
    fn test_constant_tick_mean() {
        let mut buffer = ObservationBuffer::new(8);
        buffer.record(500, LIQ, 0).unwrap();
        buffer.record(500, LIQ, 600).unwrap();

        let obs = buffer.consult(900, 1_000).unwrap();
        assert_eq!(obs.mean_tick, 500);
    }

    #[test]
    fn test_time_weighted_mean() {
        let mut buffer = ObservationBuffer::new(8);
        // Tick 100 for the first half of the window, 200 for the second
        buffer.record(100, LIQ, 0).unwrap();
        buffer.record(200, LIQ, 500).unwrap();

        let obs = buffer.consult(1_000, 1_000).unwrap();
        assert_eq!(obs.mean_tick, 150);
    }

    #[test]
    fn test_mean_floors_toward_negative_infinity() {
        let mut buffer = ObservationBuffer::new(8);
        // -100 for 999s, -101 for 1s: mean -100.001 floors to -101
        buffer.record(-100, LIQ, 0).unwrap();
        buffer.record(-101, LIQ, 999).unwrap();

        let obs = buffer.consult(1_000, 1_000).unwrap();
        assert_eq!(obs.mean_tick, -101);
    }

    #[test]
    fn test_insufficient_history() {
        let mut buffer = ObservationBuffer::new(8);
        assert!(matches!(
            buffer.consult(900, 1_000),
            Err(TidalCoreError::OracleUnavailable { .. })
        ));

        // First observation is newer than the window start
        buffer.record(0, LIQ, 200).unwrap();
        assert!(matches!(
            buffer.consult(900, 1_000),
            Err(TidalCoreError::OracleUnavailable { .. })
        ));

        // Once history reaches back far enough the query succeeds
        assert!(buffer.consult(800, 1_000).is_ok());
    }

    #[test]
    fn test_harmonic_mean_liquidity() {
        let mut buffer = ObservationBuffer::new(8);
        buffer.record(0, 4 * LIQ, 0).unwrap();
        buffer.record(0, 2 * LIQ, 500).unwrap();

        // Harmonic mean of 4L (half the time) and 2L (half the time):
        // 2 / (1/4L + 1/2L) = 8L/3
        let obs = buffer.consult(1_000, 1_000).unwrap();
        let expected = 8 * LIQ / 3;
        let diff = obs.harmonic_mean_liquidity.abs_diff(expected);
        assert!(diff < LIQ / 1_000, "harmonic {} vs {}", obs.harmonic_mean_liquidity, expected);
    }

    #[test]
    fn test_shared_oracle_handles() {
        let oracle = BufferOracle::new();
        let recorder = oracle.clone();
        let pool = PoolId::new([9u8; 32]);

        recorder.record(pool, 42, LIQ, 0).unwrap();
        recorder.record(pool, 42, LIQ, 500).unwrap();

        let obs = oracle.consult(pool, 900, 1_000).unwrap();
        assert_eq!(obs.mean_tick, 42);

        assert!(matches!(
            oracle.consult(PoolId::new([1u8; 32]), 900, 1_000),
            Err(TidalCoreError::OracleUnavailable { .. })
        ));
    }
}
