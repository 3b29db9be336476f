//! # Core Error Types
//!
//! Every failure mode of the controller. All errors abort the operation that
//! raised them with no partial state change; `RebaseNotDue` is a clean
//! rejection that callers are expected to probe and retry past.

use thiserror::Error;

use crate::constants::{MAX_TICK, MIN_TICK};

/// Controller errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TidalCoreError {
    // ========================================================================
    // Arithmetic Errors
    // ========================================================================
    #[error("arithmetic overflow")]
    Overflow,

    #[error("arithmetic underflow")]
    Underflow,

    #[error("division by zero")]
    DivisionByZero,

    // ========================================================================
    // Oracle and Price Errors
    // ========================================================================
    #[error("tick {0} outside [{MIN_TICK}, {MAX_TICK}]")]
    InvalidTick(i32),

    #[error("twap window of {actual}s is below the {min}s minimum")]
    WindowTooShort { actual: u32, min: u32 },

    #[error("oracle has no observation history spanning {window}s")]
    OracleUnavailable { window: u32 },

    #[error("observation timestamps must be strictly increasing")]
    StaleObservation,

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    #[error("price pools are not configured")]
    PoolsNotConfigured,

    #[error("pool identifier must be non-zero")]
    InvalidPoolId,

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("caller is not the configured owner")]
    Unauthorized,

    // ========================================================================
    // Gating and Ledger Errors
    // ========================================================================
    #[error("rebase not due before {due}")]
    RebaseNotDue { due: i64 },

    #[error("another rebase is already executing")]
    RebaseInProgress,

    #[error("insufficient balance")]
    InsufficientBalance,
}

/// Result type using core errors
pub type CoreResult<T> = Result<T, TidalCoreError>;
