//! Pool Events
//!
//! Events are emitted during pool execution and can be indexed off-chain
//! for building UIs, analytics, and notifications. A failed call never
//! emits an event.

use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use crate::types::{Address, Amount, BlockHeight, PoxAddress};

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Lifecycle Events (0x01 - 0x1F)
    PoolInitialized = 0x01,
    StackingStarted = 0x02,
    StackingUnlocked = 0x03,
    EmergencyShutdown = 0x04,
    PoolReset = 0x05,

    // Depositor Events (0x20 - 0x3F)
    Deposited = 0x20,
    Withdrawn = 0x21,
    RewardsClaimed = 0x22,

    // Treasury Events (0x40 - 0x5F)
    RewardsDeposited = 0x40,
    FeesWithdrawn = 0x41,
}

/// Main event enum containing all possible pool events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolEvent {
    // ============ Lifecycle Events ============

    /// Emitted when the owner activates the pool for a new cycle
    PoolInitialized {
        cycle_start: BlockHeight,
        cycle_end: BlockHeight,
        min_participation: Amount,
        block_height: BlockHeight,
    },

    /// Emitted when the pooled position was handed to the delegation mechanism
    StackingStarted {
        pox_address: PoxAddress,
        amount: Amount,
        block_height: BlockHeight,
    },

    /// Emitted when the owner confirms the cycle elapsed
    StackingUnlocked {
        cycle_end: BlockHeight,
        block_height: BlockHeight,
    },

    /// Emitted on emergency shutdown
    EmergencyShutdown {
        total_staked: Amount,
        block_height: BlockHeight,
    },

    /// Emitted when the owner clears an emptied pool
    PoolReset {
        block_height: BlockHeight,
    },

    // ============ Depositor Events ============

    /// Emitted when a depositor adds STX to the pool
    Deposited {
        depositor: Address,
        amount: Amount,
        new_deposit: Amount,
        pool_total: Amount,
        block_height: BlockHeight,
    },

    /// Emitted when a depositor withdraws their principal
    Withdrawn {
        depositor: Address,
        amount: Amount,
        pool_total: Amount,
        block_height: BlockHeight,
    },

    /// Emitted when a depositor claims this cycle's rewards
    RewardsClaimed {
        depositor: Address,
        cycle_start: BlockHeight,
        net_amount: Amount,
        fee: Amount,
        block_height: BlockHeight,
    },

    // ============ Treasury Events ============

    /// Emitted when the owner announces a reward payout
    RewardsDeposited {
        amount: Amount,
        rewards_total: Amount,
        block_height: BlockHeight,
    },

    /// Emitted when the owner withdraws platform fees
    FeesWithdrawn {
        amount: Amount,
        block_height: BlockHeight,
    },
}

impl PoolEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::PoolInitialized { .. } => EventType::PoolInitialized,
            Self::StackingStarted { .. } => EventType::StackingStarted,
            Self::StackingUnlocked { .. } => EventType::StackingUnlocked,
            Self::EmergencyShutdown { .. } => EventType::EmergencyShutdown,
            Self::PoolReset { .. } => EventType::PoolReset,
            Self::Deposited { .. } => EventType::Deposited,
            Self::Withdrawn { .. } => EventType::Withdrawn,
            Self::RewardsClaimed { .. } => EventType::RewardsClaimed,
            Self::RewardsDeposited { .. } => EventType::RewardsDeposited,
            Self::FeesWithdrawn { .. } => EventType::FeesWithdrawn,
        }
    }

    /// Get the block height when event occurred
    pub fn block_height(&self) -> BlockHeight {
        match self {
            Self::PoolInitialized { block_height, .. }
            | Self::StackingStarted { block_height, .. }
            | Self::StackingUnlocked { block_height, .. }
            | Self::EmergencyShutdown { block_height, .. }
            | Self::PoolReset { block_height }
            | Self::Deposited { block_height, .. }
            | Self::Withdrawn { block_height, .. }
            | Self::RewardsClaimed { block_height, .. }
            | Self::RewardsDeposited { block_height, .. }
            | Self::FeesWithdrawn { block_height, .. } => *block_height,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting events during execution
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<PoolEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: PoolEvent) {
        self.events.push(event);
    }

    /// Take ownership of all events
    pub fn into_events(self) -> Vec<PoolEvent> {
        self.events
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
