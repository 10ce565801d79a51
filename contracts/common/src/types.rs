//! Core Types for the Stacking Pool
//!
//! This module defines the fundamental data structures shared between the
//! pool ledger and its hosts.

use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Type alias for addresses (32-byte principal hash)
pub type Address = [u8; 32];

/// Type alias for block heights on the external chain
pub type BlockHeight = u64;

/// Type alias for token amounts in micro-STX
pub type Amount = u64;

/// The all-zero address, never a valid owner
pub const ZERO_ADDRESS: Address = [0u8; 32];

// ============ Delegation Types ============

/// Bitcoin reward address handed to the stacking mechanism
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoxAddress {
    /// Address version byte (p2pkh, p2sh, ...)
    pub version: u8,
    /// Address hash bytes
    pub hashbytes: Vec<u8>,
}

impl PoxAddress {
    /// Create a PoX address from a version byte and hash bytes
    pub fn new(version: u8, hashbytes: Vec<u8>) -> Self {
        Self { version, hashbytes }
    }
}

// ============ Pool Views ============

/// Snapshot of pool-wide state, as returned by status queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolStatus {
    /// Pool accepts deposits and administration
    pub active: bool,
    /// Sum of all live deposits
    pub total_staked: Amount,
    /// First block of the current cycle
    pub cycle_start: BlockHeight,
    /// Block at which the cycle may be unlocked
    pub cycle_end: BlockHeight,
    /// Owner confirmed the lock window elapsed
    pub unlocked: bool,
    /// Cumulative reward payout for this cycle
    pub rewards_received: Amount,
    /// Platform fees not yet withdrawn
    pub fees_collected: Amount,
}

/// Full reward computation for one depositor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct RewardBreakdown {
    /// Depositor's pool share in basis points
    pub share_bps: u64,
    /// Share of rewards before fees
    pub gross: Amount,
    /// Platform fee taken from the gross amount
    pub fee: Amount,
    /// Amount paid to the depositor
    pub net: Amount,
}

impl RewardBreakdown {
    /// Returns true if nothing is owed
    pub fn is_empty(&self) -> bool {
        self.net == 0
    }
}

// ============ Action Types ============

/// Mutating operations on the pool ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolAction {
    /// Activate the pool and fix the cycle window (owner only)
    Initialize {
        start_block: BlockHeight,
        reward_address: Vec<u8>,
        min_participation: Amount,
    },
    /// Deposit STX into the pool
    Deposit { amount: Amount },
    /// Delegate the pooled position (owner only)
    StartStacking { pox_address: PoxAddress },
    /// Confirm the cycle elapsed (owner only)
    UnlockStacking,
    /// Announce reward payout (owner only)
    DepositRewards { amount: Amount },
    /// Claim this cycle's rewards
    ClaimRewards,
    /// Withdraw the caller's full deposit
    Withdraw,
    /// Withdraw accumulated platform fees (owner only)
    WithdrawFees,
    /// Deactivate the pool and open withdrawals (owner only)
    EmergencyShutdown,
    /// Return an empty, inactive pool to its initial state (owner only)
    Reset,
}

impl PoolAction {
    /// Returns true if only the pool owner may perform this action
    pub fn is_owner_only(&self) -> bool {
        !matches!(
            self,
            PoolAction::Deposit { .. } | PoolAction::ClaimRewards | PoolAction::Withdraw
        )
    }

    /// Short name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            PoolAction::Initialize { .. } => "initialize",
            PoolAction::Deposit { .. } => "deposit",
            PoolAction::StartStacking { .. } => "start_stacking",
            PoolAction::UnlockStacking => "unlock_stacking",
            PoolAction::DepositRewards { .. } => "deposit_rewards",
            PoolAction::ClaimRewards => "claim_rewards",
            PoolAction::Withdraw => "withdraw",
            PoolAction::WithdrawFees => "withdraw_fees",
            PoolAction::EmergencyShutdown => "emergency_shutdown",
            PoolAction::Reset => "reset",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_only_actions() {
        assert!(PoolAction::UnlockStacking.is_owner_only());
        assert!(PoolAction::WithdrawFees.is_owner_only());
        assert!(PoolAction::EmergencyShutdown.is_owner_only());
        assert!(PoolAction::Reset.is_owner_only());
        assert!(PoolAction::DepositRewards { amount: 1 }.is_owner_only());
        assert!(!PoolAction::Deposit { amount: 1 }.is_owner_only());
        assert!(!PoolAction::ClaimRewards.is_owner_only());
        assert!(!PoolAction::Withdraw.is_owner_only());
    }

    #[test]
    fn test_empty_breakdown() {
        assert!(RewardBreakdown::default().is_empty());
        let owed = RewardBreakdown { share_bps: 5000, gross: 100, fee: 5, net: 95 };
        assert!(!owed.is_empty());
    }
}
