//! # Tidal Keeper
//!
//! The external trigger for the Tidal rebase controller. The controller has
//! no scheduler of its own - anyone may call `rebase` and the 12h gate lives
//! inside it - so this service simply polls: it feeds the observation
//! buffers from a deterministic market simulation, probes the would-be
//! adjustment, and invokes the rebase, logging outcomes.

pub mod config;
pub mod error;
pub mod service;
pub mod sim;

pub use config::{create_example_config, KeeperConfig, PoolsConfig, SimConfig};
pub use error::KeeperError;
pub use service::Keeper;
pub use sim::MarketSim;
