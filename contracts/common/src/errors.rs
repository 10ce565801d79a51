//! Error Types for the Stacking Pool
//!
//! A closed set of typed errors. Every failed call returns one of these and
//! leaves pool state untouched; none are retried internally.

use core::fmt;

/// Result type alias for pool operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Main error enum for all stacking pool errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    // ============ Authorization Errors ============
    /// Caller is not the pool owner
    NotAuthorized,

    // ============ Lifecycle Errors ============
    /// Pool is already active (cannot initialize twice)
    PoolActive,

    /// Pool is not active. Also returned when unlocking an already
    /// unlocked pool, matching the deployed contract's error code.
    PoolInactive,

    /// Stacking cycle has not finished, or the pool is not unlocked yet
    StillLocked,

    /// Pool still holds principal or fees and cannot be reset
    PoolNotEmpty { total_staked: u64, fees_collected: u64 },

    // ============ Amount Errors ============
    /// Deposit below the pool's participation minimum
    BelowMinimum { amount: u64, minimum: u64 },

    /// Zero amount, or an amount the pool cannot account for
    InvalidAmount { amount: u64 },

    /// Nothing owed to the caller (no deposit, no rewards, no fees)
    NoFundsToWithdraw,

    // ============ Reward Errors ============
    /// Rewards for this cycle were already claimed by the caller
    AlreadyClaimed { cycle_start: u64 },

    // ============ External Errors ============
    /// The external delegation mechanism rejected the stacking request
    DelegationFailed { code: u32 },

    // ============ Configuration Errors ============
    /// Pool configuration failed validation
    InvalidConfig { reason: &'static str },
}

impl PoolError {
    /// Returns the stable error code surfaced to callers
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAuthorized => "ERR-NOT-AUTHORIZED",
            Self::PoolActive => "ERR-POOL-ACTIVE",
            Self::PoolInactive => "ERR-POOL-INACTIVE",
            Self::StillLocked => "ERR-STILL-LOCKED",
            Self::PoolNotEmpty { .. } => "ERR-POOL-NOT-EMPTY",
            Self::BelowMinimum { .. } => "ERR-MIN-AMOUNT-REQUIRED",
            Self::InvalidAmount { .. } => "ERR-INVALID-AMOUNT",
            Self::NoFundsToWithdraw => "ERR-NO-FUNDS-TO-WITHDRAW",
            Self::AlreadyClaimed { .. } => "ERR-ALREADY-CLAIMED",
            Self::DelegationFailed { .. } => "ERR-DELEGATION-FAILED",
            Self::InvalidConfig { .. } => "ERR-INVALID-CONFIG",
        }
    }

    /// Returns true if this error is recoverable (caller can fix it)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::StillLocked => true,             // Wait for the cycle to end
            Self::BelowMinimum { .. } => true,     // Increase amount
            Self::InvalidAmount { .. } => true,    // Fix amount
            Self::DelegationFailed { .. } => true, // Retry delegation
            _ => false,
        }
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthorized => write!(f, "{}: caller is not the pool owner", self.code()),
            Self::PoolActive => write!(f, "{}: pool is already active", self.code()),
            Self::PoolInactive => write!(f, "{}: pool is not active", self.code()),
            Self::StillLocked => write!(f, "{}: stacking is still locked", self.code()),
            Self::PoolNotEmpty { total_staked, fees_collected } => write!(
                f,
                "{}: pool holds {} staked and {} in fees",
                self.code(),
                total_staked,
                fees_collected
            ),
            Self::BelowMinimum { amount, minimum } => {
                write!(f, "{}: amount {} below minimum {}", self.code(), amount, minimum)
            }
            Self::InvalidAmount { amount } => {
                write!(f, "{}: invalid amount {}", self.code(), amount)
            }
            Self::NoFundsToWithdraw => write!(f, "{}: nothing to withdraw", self.code()),
            Self::AlreadyClaimed { cycle_start } => {
                write!(f, "{}: rewards for cycle {} already claimed", self.code(), cycle_start)
            }
            Self::DelegationFailed { code } => {
                write!(f, "{}: delegation rejected with code {}", self.code(), code)
            }
            Self::InvalidConfig { reason } => write!(f, "{}: {}", self.code(), reason),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PoolError {}
