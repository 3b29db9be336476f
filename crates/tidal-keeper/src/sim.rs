//! Deterministic two-pool market simulation.
//!
//! Each pool's tick takes a bounded random walk; observations land in the
//! shared buffer oracle at a fixed cadence. A fixed seed replays the same
//! market, which keeps keeper runs reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tidal_core::errors::CoreResult;
use tidal_core::oracle::BufferOracle;
use tidal_core::types::PricePools;

use crate::config::SimConfig;

// Keep simulated prices in a sane band (~e^+-5 around 1.0)
const TICK_BAND: i32 = 50_000;

/// Bounded tick random walk over the two configured pools
pub struct MarketSim {
    rng: StdRng,
    pools: PricePools,
    asset_tick: i32,
    quote_tick: i32,
    max_step: i32,
    liquidity: u128,
    observation_interval: i64,
    next_observation: i64,
}

impl MarketSim {
    /// Simulation whose first observation lands at `start`
    pub fn new(config: &SimConfig, pools: PricePools, start: i64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            pools,
            asset_tick: config.initial_asset_tick.clamp(-TICK_BAND, TICK_BAND),
            quote_tick: config.initial_quote_tick.clamp(-TICK_BAND, TICK_BAND),
            max_step: config.max_tick_step as i32,
            liquidity: config.liquidity_wad(),
            observation_interval: config.observation_interval_secs,
            next_observation: start,
        }
    }

    /// Record every observation due up to and including `now`
    pub fn advance(&mut self, oracle: &BufferOracle, now: i64) -> CoreResult<()> {
        while self.next_observation <= now {
            let timestamp = self.next_observation;

            self.asset_tick = self.walk(self.asset_tick);
            self.quote_tick = self.walk(self.quote_tick);

            // Liquidity wobbles within +-10% of the baseline
            let asset_liquidity = self.jittered_liquidity();
            let quote_liquidity = self.jittered_liquidity();

            oracle.record(self.pools.asset_pool, self.asset_tick, asset_liquidity, timestamp)?;
            oracle.record(self.pools.quote_pool, self.quote_tick, quote_liquidity, timestamp)?;

            self.next_observation = timestamp + self.observation_interval;
        }
        Ok(())
    }

    fn walk(&mut self, tick: i32) -> i32 {
        let step = self.rng.gen_range(-self.max_step..=self.max_step);
        (tick + step).clamp(-TICK_BAND, TICK_BAND)
    }

    fn jittered_liquidity(&mut self) -> u128 {
        let percent = self.rng.gen_range(90u128..=110);
        self.liquidity / 100 * percent
    }
}
