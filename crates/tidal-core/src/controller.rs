//! # Rebase Controller
//!
//! The gate and supply mutator. Holds the configured pools, the epoch
//! marker, and the ledger behind one mutex, so the check-compute-mutate
//! sequence of a rebase is a single critical section: both oracle legs are
//! observed inside it and a concurrent or re-entrant trigger is rejected,
//! never double-applied.

use parking_lot::Mutex;

use crate::constants::WAD;
use crate::errors::{CoreResult, TidalCoreError};
use crate::events::{ControllerEvent, EventLog};
use crate::ledger::Ledger;
use crate::math::big_int::{mul_div_u128, Rounding};
use crate::math::fixed_point::wad_to_f64;
use crate::math::safe_math::safe_cast_u128_to_i128;
use crate::oracle::{cross_pair_price, twap_price, PriceOracle};
use crate::schedule::TargetPriceSchedule;
use crate::types::{Address, PoolId, PricePools, RebaseOutcome};

/// Static parameters of a controller instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Identity allowed to configure the price pools
    pub owner: Address,
    /// Holder minted to and burned from on rebases
    pub reserve: Address,
    /// Target price at the reference epoch, wad USD
    pub initial_target_price: u128,
    /// Compounding growth multiplier per interval, wad
    pub price_growth_rate: u128,
    /// Minimum duration between executed rebases, seconds
    pub rebase_interval_secs: i64,
    /// Per-rebase supply change bound, wad fraction of total supply
    pub max_rebase_rate: u128,
}

impl ControllerConfig {
    /// Config with the protocol's standard parameters
    pub fn standard(owner: Address, reserve: Address) -> Self {
        Self {
            owner,
            reserve,
            initial_target_price: crate::constants::INITIAL_TARGET_PRICE_WAD,
            price_growth_rate: crate::constants::PRICE_GROWTH_RATE_WAD,
            rebase_interval_secs: crate::constants::REBASE_INTERVAL_SECS,
            max_rebase_rate: crate::constants::MAX_REBASE_RATE_WAD,
        }
    }

    fn validate(&self) -> CoreResult<()> {
        if self.owner.is_zero() {
            return Err(TidalCoreError::InvalidConfig("owner must be non-zero"));
        }
        if self.reserve.is_zero() {
            return Err(TidalCoreError::InvalidConfig("reserve must be non-zero"));
        }
        if self.max_rebase_rate == 0 || self.max_rebase_rate > WAD {
            return Err(TidalCoreError::InvalidConfig(
                "max rebase rate must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

/// Raw-then-clamped supply adjustment from a price gap.
///
/// Zero when the prices agree exactly. Otherwise the raw delta is
/// `(target - current) * supply / target` - the denominator is the target
/// price, deliberately, so the delta is a fraction of where the price
/// should be rather than where it is - clamped to
/// `+- supply * max_rebase_rate`. Positive means the supply should grow.
pub fn compute_adjustment(
    current_price: u128,
    target_price: u128,
    total_supply: u128,
    max_rebase_rate: u128,
) -> CoreResult<i128> {
    if target_price == 0 {
        return Err(TidalCoreError::DivisionByZero);
    }
    if current_price == target_price {
        return Ok(0);
    }

    let gap = current_price.abs_diff(target_price);
    // A gap far above the clamp can push the 256-bit product past a 128-bit
    // quotient; the clamp discards the excess anyway, so saturate
    let raw_magnitude = match mul_div_u128(gap, total_supply, target_price, Rounding::Down) {
        Ok(value) => value,
        Err(TidalCoreError::Overflow) => u128::MAX,
        Err(error) => return Err(error),
    };

    let max_adjustment =
        mul_div_u128(total_supply, max_rebase_rate, WAD, Rounding::Down)?;
    let clamped = safe_cast_u128_to_i128(raw_magnitude.min(max_adjustment))?;

    Ok(if current_price < target_price { clamped } else { -clamped })
}

struct Inner<L> {
    ledger: L,
    pools: Option<PricePools>,
    last_rebase_time: i64,
    events: EventLog,
}

/// The rebasing supply controller
pub struct RebaseController<O, L> {
    config: ControllerConfig,
    schedule: TargetPriceSchedule,
    oracle: O,
    inner: Mutex<Inner<L>>,
}

impl<O: PriceOracle, L: Ledger> RebaseController<O, L> {
    /// Build a controller anchored at `genesis_time`. The first rebase
    /// becomes due one interval later.
    pub fn new(
        config: ControllerConfig,
        oracle: O,
        ledger: L,
        genesis_time: i64,
    ) -> CoreResult<Self> {
        config.validate()?;
        let schedule = TargetPriceSchedule::new(
            config.initial_target_price,
            config.price_growth_rate,
            config.rebase_interval_secs,
            genesis_time,
        )?;
        Ok(Self {
            config,
            schedule,
            oracle,
            inner: Mutex::new(Inner {
                ledger,
                pools: None,
                last_rebase_time: genesis_time,
                events: EventLog::new(),
            }),
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn schedule(&self) -> &TargetPriceSchedule {
        &self.schedule
    }

    /// Configure the two oracle pools. Owner-only; zero identifiers rejected.
    pub fn set_price_pools(
        &self,
        caller: &Address,
        asset_pool: PoolId,
        quote_pool: PoolId,
    ) -> CoreResult<()> {
        if *caller != self.config.owner {
            return Err(TidalCoreError::Unauthorized);
        }
        if asset_pool.is_zero() || quote_pool.is_zero() {
            return Err(TidalCoreError::InvalidPoolId);
        }

        let mut inner = self.inner.lock();
        inner.pools = Some(PricePools { asset_pool, quote_pool });
        inner
            .events
            .emit(ControllerEvent::PricePoolsChanged { asset_pool, quote_pool });
        log::info!("price pools configured: asset={} quote={}", asset_pool, quote_pool);
        Ok(())
    }

    pub fn price_pools(&self) -> Option<PricePools> {
        self.inner.lock().pools
    }

    pub fn total_supply(&self) -> u128 {
        self.inner.lock().ledger.total_supply()
    }

    pub fn last_rebase_time(&self) -> i64 {
        self.inner.lock().last_rebase_time
    }

    /// Drain buffered notification events, oldest first
    pub fn take_events(&self) -> Vec<ControllerEvent> {
        self.inner.lock().events.drain()
    }

    /// Target price currently due, wad USD
    pub fn target_price(&self, now: i64) -> CoreResult<u128> {
        self.schedule.target_price(now)
    }

    /// Composed asset -> USD price over the given TWAP window, wad
    pub fn current_price_usd(&self, now: i64, window_secs: u32) -> CoreResult<u128> {
        let inner = self.inner.lock();
        self.observed_price(&inner, now, window_secs)
    }

    /// Read-only probe: the clamped delta a rebase would apply right now.
    /// Pure function of state and oracle; no timing gate.
    pub fn calculate_rebase_amount(&self, now: i64, window_secs: u32) -> CoreResult<i128> {
        let inner = self.inner.lock();
        let current = self.observed_price(&inner, now, window_secs)?;
        let target = self.schedule.target_price(now)?;
        compute_adjustment(current, target, inner.ledger.total_supply(), self.config.max_rebase_rate)
    }

    /// The state-mutating entry point, callable by anyone.
    ///
    /// Rejects with `RebaseNotDue` until a whole interval has passed since
    /// the last executed rebase, and with `RebaseInProgress` if another
    /// trigger currently holds the critical section. On a non-zero delta the
    /// reserve is minted to or burned from, the epoch marker advances, and a
    /// `RebaseExecuted` event is emitted. A zero delta mutates nothing -
    /// including the epoch marker, so a flat-price call does not consume the
    /// interval.
    pub fn rebase(&self, now: i64, window_secs: u32) -> CoreResult<RebaseOutcome> {
        let mut inner = self
            .inner
            .try_lock()
            .ok_or(TidalCoreError::RebaseInProgress)?;

        let due = inner
            .last_rebase_time
            .checked_add(self.config.rebase_interval_secs)
            .ok_or(TidalCoreError::Overflow)?;
        if now < due {
            return Err(TidalCoreError::RebaseNotDue { due });
        }

        let current = self.observed_price(&inner, now, window_secs)?;
        let target = self.schedule.target_price(now)?;
        let supply = inner.ledger.total_supply();
        let delta = compute_adjustment(current, target, supply, self.config.max_rebase_rate)?;

        if delta == 0 {
            log::debug!("rebase no-op: price {} already at target", wad_to_f64(current));
            return Ok(RebaseOutcome {
                supply_delta: 0,
                new_total_supply: supply,
                epoch_advanced: false,
            });
        }

        if delta > 0 {
            inner.ledger.mint(&self.config.reserve, delta as u128)?;
        } else {
            inner.ledger.burn(&self.config.reserve, delta.unsigned_abs())?;
        }
        inner.last_rebase_time = now;

        let new_total_supply = inner.ledger.total_supply();
        inner.events.emit(ControllerEvent::RebaseExecuted {
            new_total_supply,
            supply_delta: delta,
            timestamp: now,
        });
        log::info!(
            "rebase executed: delta={} supply={} current={:.6} target={:.6}",
            delta,
            new_total_supply,
            wad_to_f64(current),
            wad_to_f64(target),
        );

        Ok(RebaseOutcome {
            supply_delta: delta,
            new_total_supply,
            epoch_advanced: true,
        })
    }

    fn observed_price(&self, inner: &Inner<L>, now: i64, window_secs: u32) -> CoreResult<u128> {
        let pools = inner.pools.ok_or(TidalCoreError::PoolsNotConfigured)?;
        // Both legs share the one caller-supplied window
        let asset_leg = twap_price(&self.oracle, pools.asset_pool, window_secs, now)?;
        let quote_leg = twap_price(&self.oracle, pools.quote_pool, window_secs, now)?;
        cross_pair_price(asset_leg, quote_leg)
    }
}
