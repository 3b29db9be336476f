//! # Protocol Constants
//!
//! Fundamental constants for the supply controller:
//! - Fixed-point scale factors
//! - Rebase mechanism parameters (interval, clamp rate, growth rate)
//! - Oracle and TWAP parameters
//! - Tick domain bounds

// ============================================================================
// Fixed-Point Constants
// ============================================================================

/// 18-decimal fixed-point scale factor ("wad"): one unit = 10^18
pub const WAD: u128 = 1_000_000_000_000_000_000;

// ============================================================================
// Rebase Mechanism Constants
// ============================================================================

/// Minimum duration between executed rebases (12 hours)
pub const REBASE_INTERVAL_SECS: i64 = 43_200;

/// Maximum supply change per rebase, as a wad fraction of total supply (15%)
pub const MAX_REBASE_RATE_WAD: u128 = 150_000_000_000_000_000;

/// Target price growth multiplier applied per whole interval (1.15x)
pub const PRICE_GROWTH_RATE_WAD: u128 = 1_150_000_000_000_000_000;

/// Target price at the reference epoch (1.00 USD)
pub const INITIAL_TARGET_PRICE_WAD: u128 = WAD;

// ============================================================================
// Oracle and TWAP Constants
// ============================================================================

/// Shortest TWAP window accepted by the price adapter (15 minutes);
/// shorter windows are cheap to manipulate
pub const MIN_TWAP_WINDOW_SECS: u32 = 900;

/// Default TWAP window used when the trigger does not choose one (1 hour)
pub const DEFAULT_TWAP_WINDOW_SECS: u32 = 3_600;

/// Default capacity of a per-pool observation ring buffer
pub const DEFAULT_OBSERVATION_CAPACITY: usize = 256;

// ============================================================================
// Tick Domain Constants
// ============================================================================

/// Minimum tick the price adapter converts
pub const MIN_TICK: i32 = -887_272;

/// Maximum tick the price adapter converts
pub const MAX_TICK: i32 = 887_272;
