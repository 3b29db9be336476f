//! # Tidal Core - Rebasing Supply Controller
//!
//! This crate contains the supply controller for the Tidal protocol: it
//! steers a token's total supply toward a compounding target price using a
//! manipulation-resistant price composed from two chained TWAP observations.
//! It provides:
//!
//! - Overflow-checked 18-decimal fixed-point arithmetic
//! - Tick-to-price conversion for oracle observations
//! - The TWAP price adapter and cross-pair composer
//! - The compounding target price schedule
//! - The rebase gate: timing invariant, bounded supply mutation, events
//!
//! The core is deterministic and clock-free: every operation takes `now`
//! explicitly, and the external trigger (see `tidal-keeper`) supplies wall
//! time. Shared state sits behind one mutex so the check-compute-mutate
//! sequence of a rebase is a single critical section.

pub mod constants;
pub mod controller;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod math;
pub mod oracle;
pub mod schedule;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use controller::{compute_adjustment, ControllerConfig, RebaseController};
pub use errors::{CoreResult, TidalCoreError};
pub use events::{ControllerEvent, EventLog};
pub use ledger::{Ledger, TokenLedger};
pub use oracle::{BufferOracle, ObservationBuffer, PriceOracle, TwapObservation};
pub use schedule::TargetPriceSchedule;
pub use types::*;
