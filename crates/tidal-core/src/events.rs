//! # Controller Events
//!
//! Notifications emitted by state-changing operations, buffered in-process
//! for indexers, UIs, or the keeper's logging to drain.

use crate::types::PoolId;

/// Everything the controller announces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    /// The oracle pool pair was (re)configured
    PricePoolsChanged {
        asset_pool: PoolId,
        quote_pool: PoolId,
    },
    /// A rebase executed with a non-zero delta
    RebaseExecuted {
        new_total_supply: u128,
        supply_delta: i128,
        timestamp: i64,
    },
}

/// Append-only event buffer; consumers drain it
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<ControllerEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: ControllerEvent) {
        self.entries.push(event);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return all buffered events, oldest first
    pub fn drain(&mut self) -> Vec<ControllerEvent> {
        std::mem::take(&mut self.entries)
    }
}
