//! Keeper configuration loaded from a TOML file

use std::fs;

use serde::{Deserialize, Serialize};

use tidal_core::constants::{MIN_TWAP_WINDOW_SECS, REBASE_INTERVAL_SECS, WAD};
use tidal_core::math::fixed_point::wad_from_f64;
use tidal_core::types::{Address, PoolId, PricePools};

use crate::error::KeeperError;

/// Top-level keeper configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeeperConfig {
    /// Seconds between trigger attempts
    pub poll_interval_secs: u64,

    /// TWAP window passed to every probe and rebase, seconds
    pub twap_window_secs: u32,

    /// Minimum duration between executed rebases, seconds
    #[serde(default = "default_rebase_interval")]
    pub rebase_interval_secs: i64,

    /// Supply seeded to the reserve at startup, whole units
    pub initial_supply_units: u64,

    /// Target price at the reference epoch, USD
    pub initial_target_price_usd: f64,

    /// Identity allowed to configure pools
    #[serde(with = "hex32")]
    pub owner: [u8; 32],

    /// Holder minted to and burned from on rebases
    #[serde(with = "hex32")]
    pub reserve: [u8; 32],

    /// Oracle pools composing the asset -> USD price
    pub pools: PoolsConfig,

    /// Simulated market feeding the observation buffers
    pub sim: SimConfig,
}

/// The two oracle pool identifiers
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PoolsConfig {
    #[serde(with = "hex32")]
    pub asset_pool: [u8; 32],

    #[serde(with = "hex32")]
    pub quote_pool: [u8; 32],
}

/// Parameters of the deterministic two-pool tick walk
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimConfig {
    /// RNG seed; identical seeds replay identical markets
    pub seed: u64,

    /// Seconds between recorded observations
    pub observation_interval_secs: i64,

    /// Starting tick of the asset -> intermediate pool
    pub initial_asset_tick: i32,

    /// Starting tick of the intermediate -> quote pool
    pub initial_quote_tick: i32,

    /// Largest per-observation tick move, either direction
    pub max_tick_step: u32,

    /// Baseline pool liquidity, whole units
    pub liquidity_units: u64,
}

fn default_rebase_interval() -> i64 {
    REBASE_INTERVAL_SECS
}

impl KeeperConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &str) -> Result<Self, KeeperError> {
        let content = fs::read_to_string(path)?;
        let config: KeeperConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &str) -> Result<(), KeeperError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), KeeperError> {
        if self.poll_interval_secs == 0 {
            return Err(KeeperError::InvalidConfig(
                "poll_interval_secs must be greater than 0".to_string(),
            ));
        }

        if self.twap_window_secs < MIN_TWAP_WINDOW_SECS {
            return Err(KeeperError::InvalidConfig(format!(
                "twap_window_secs must be at least {}",
                MIN_TWAP_WINDOW_SECS
            )));
        }

        if self.rebase_interval_secs <= 0 {
            return Err(KeeperError::InvalidConfig(
                "rebase_interval_secs must be greater than 0".to_string(),
            ));
        }

        if self.initial_supply_units == 0 {
            return Err(KeeperError::InvalidConfig(
                "initial_supply_units must be greater than 0".to_string(),
            ));
        }

        if !(self.initial_target_price_usd.is_finite() && self.initial_target_price_usd > 0.0) {
            return Err(KeeperError::InvalidConfig(
                "initial_target_price_usd must be a positive number".to_string(),
            ));
        }

        if self.owner == [0u8; 32] || self.reserve == [0u8; 32] {
            return Err(KeeperError::InvalidConfig(
                "owner and reserve must be non-zero".to_string(),
            ));
        }

        if self.pools.asset_pool == [0u8; 32] || self.pools.quote_pool == [0u8; 32] {
            return Err(KeeperError::InvalidConfig(
                "pool identifiers must be non-zero".to_string(),
            ));
        }

        self.sim.validate()
    }

    pub fn owner_address(&self) -> Address {
        Address::new(self.owner)
    }

    pub fn reserve_address(&self) -> Address {
        Address::new(self.reserve)
    }

    pub fn price_pools(&self) -> PricePools {
        PricePools {
            asset_pool: PoolId::new(self.pools.asset_pool),
            quote_pool: PoolId::new(self.pools.quote_pool),
        }
    }

    /// Seeded supply at wad scale
    pub fn initial_supply_wad(&self) -> u128 {
        u128::from(self.initial_supply_units) * WAD
    }

    /// Initial target price at wad scale
    pub fn initial_target_price_wad(&self) -> Result<u128, KeeperError> {
        wad_from_f64(self.initial_target_price_usd).ok_or_else(|| {
            KeeperError::InvalidConfig("initial_target_price_usd out of range".to_string())
        })
    }
}

impl SimConfig {
    fn validate(&self) -> Result<(), KeeperError> {
        if self.observation_interval_secs <= 0 {
            return Err(KeeperError::InvalidConfig(
                "sim.observation_interval_secs must be greater than 0".to_string(),
            ));
        }

        if self.max_tick_step == 0 || self.max_tick_step > 10_000 {
            return Err(KeeperError::InvalidConfig(
                "sim.max_tick_step must be in 1..=10000".to_string(),
            ));
        }

        if self.liquidity_units == 0 {
            return Err(KeeperError::InvalidConfig(
                "sim.liquidity_units must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Baseline liquidity at wad scale
    pub fn liquidity_wad(&self) -> u128 {
        u128::from(self.liquidity_units) * WAD
    }
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            twap_window_secs: 3_600,
            rebase_interval_secs: REBASE_INTERVAL_SECS,
            initial_supply_units: 10_000_000,
            initial_target_price_usd: 1.0,
            owner: {
                let mut bytes = [0u8; 32];
                bytes[31] = 1;
                bytes
            },
            reserve: {
                let mut bytes = [0u8; 32];
                bytes[31] = 2;
                bytes
            },
            pools: PoolsConfig {
                asset_pool: {
                    let mut bytes = [0u8; 32];
                    bytes[31] = 3;
                    bytes
                },
                quote_pool: {
                    let mut bytes = [0u8; 32];
                    bytes[31] = 4;
                    bytes
                },
            },
            sim: SimConfig::default(),
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            observation_interval_secs: 60,
            initial_asset_tick: 0,
            initial_quote_tick: 0,
            max_tick_step: 20,
            liquidity_units: 1_000_000,
        }
    }
}

/// Write an example configuration file
pub fn create_example_config(path: &str) -> Result<(), KeeperError> {
    KeeperConfig::default().save(path)
}

// Custom serde module for 32-byte hex identifiers
mod hex32 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let raw = hex::decode(&text).map_err(serde::de::Error::custom)?;
        raw.try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 hex-encoded bytes"))
    }
}
