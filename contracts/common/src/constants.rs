//! Protocol Constants
//!
//! All magic numbers and configuration values for the stacking pool.
//!
//! # Network Configuration
//!
//! Use feature flags to compile for different networks:
//! - `mainnet` - Production values (higher participation minimum)
//! - Default (no feature) - Testnet values (lower minimum for testing)
//!
//! ```toml
//! # For mainnet deployment:
//! stacking-pool-common = { path = "...", features = ["mainnet"] }
//! ```

/// Token Metadata
pub mod token {
    /// Token symbol
    pub const SYMBOL: &str = "STX";
    /// Decimal places (micro-STX)
    pub const DECIMALS: u8 = 6;
    /// One unit with decimals (1 STX = 1_000_000 micro-STX)
    pub const ONE: u64 = 1_000_000;
}

/// Stacking Cycle Configuration
pub mod cycle {
    /// Length of one stacking cycle in blocks (~2 weeks of Bitcoin blocks)
    pub const CYCLE_LENGTH: u64 = 2_100;

    /// Number of reward cycles requested from the delegation mechanism
    pub const LOCK_PERIOD_CYCLES: u8 = 1;
}

/// Fee Configuration
pub mod fees {
    /// Platform fee taken from each claim, in percent (5 = 5%)
    pub const PLATFORM_FEE_PERCENT: u64 = 5;

    /// Percent denominator
    pub const PERCENT_DENOMINATOR: u64 = 100;

    /// Basis points denominator (10_000 = 100%)
    pub const BPS_DENOMINATOR: u64 = 10_000;
}

/// Participation Limits
///
/// Values differ between mainnet and testnet to allow easier testing.
pub mod limits {
    use super::token::ONE;

    /// Minimum single deposit accepted by the pool
    /// - Mainnet: 100 STX
    /// - Testnet: 50 STX
    #[cfg(feature = "mainnet")]
    pub const MIN_PARTICIPATION: u64 = 100 * ONE;
    #[cfg(not(feature = "mainnet"))]
    pub const MIN_PARTICIPATION: u64 = 50 * ONE;

    /// Helper to check if running in mainnet mode
    #[cfg(feature = "mainnet")]
    pub const IS_MAINNET: bool = true;
    #[cfg(not(feature = "mainnet"))]
    pub const IS_MAINNET: bool = false;
}
