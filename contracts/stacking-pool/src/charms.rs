//! Charms SDK Integration for the Stacking Pool
//!
//! The whole pool ledger lives in a single state charm. A transaction spends
//! the current ledger and creates the next one; the witness names the
//! operation and its caller.
//!
//! ```text
//! Any operation:
//!   IN:  [PoolLedger state (current)]
//!   OUT: [PoolLedger state (next)]
//!
//! First Initialize:
//!   IN:  []
//!   OUT: [PoolLedger state (active)]
//! ```
//!
//! A transaction must spend exactly one ledger and create exactly one, except
//! the first Initialize which spends none. Validation replays the witnessed
//! action against the input ledger and accepts the transaction only if the
//! result equals the output ledger.
//! Stacking delegation happens outside the transaction, so the witness
//! carries the delegate's outcome as an attestation.

use charms_data::{App, Data, Transaction};
use crate::{CallContext, DelegationError, DelegationRequest, PoolLedger, StackingDelegate};
use stacking_pool_common::types::{Address, Amount, BlockHeight, PoolAction, PoxAddress};

// ============ Operation Codes ============

/// Operation codes for pool actions (encoded in witness)
pub mod op {
    /// Activate the pool for a cycle
    pub const INITIALIZE: u8 = 0x01;
    /// Hand the pooled STX to the stacking mechanism
    pub const START_STACKING: u8 = 0x02;
    /// Confirm the cycle has ended
    pub const UNLOCK_STACKING: u8 = 0x03;
    /// Shut the pool down and open withdrawals
    pub const EMERGENCY_SHUTDOWN: u8 = 0x04;
    /// Clear an emptied, inactive pool
    pub const RESET: u8 = 0x05;
    /// Deposit STX
    pub const DEPOSIT: u8 = 0x20;
    /// Withdraw principal
    pub const WITHDRAW: u8 = 0x21;
    /// Claim cycle rewards
    pub const CLAIM_REWARDS: u8 = 0x22;
    /// Announce a reward payout
    pub const DEPOSIT_REWARDS: u8 = 0x40;
    /// Withdraw platform fees
    pub const WITHDRAW_FEES: u8 = 0x41;
}

// ============ Witness ============

/// Witness data for pool operations
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PoolWitness {
    /// Operation type (see `op` module)
    pub op: u8,
    /// Identity invoking the operation
    pub caller: Address,
    /// Block height the operation executes at
    pub block_height: BlockHeight,
    /// Amount for deposit and reward operations
    pub amount: Option<Amount>,
    /// Cycle start for initialize
    pub start_block: Option<BlockHeight>,
    /// Reward address for initialize
    pub reward_address: Option<Vec<u8>>,
    /// Requested minimum for initialize
    pub min_participation: Option<Amount>,
    /// PoX address version for start stacking
    pub pox_version: Option<u8>,
    /// PoX address hash bytes for start stacking
    pub pox_hashbytes: Option<Vec<u8>>,
    /// Error code reported by the stacking mechanism, if it rejected the lock
    pub delegation_error: Option<u32>,
}

impl PoolWitness {
    fn bare(op: u8, caller: Address, block_height: BlockHeight) -> Self {
        Self {
            op,
            caller,
            block_height,
            amount: None,
            start_block: None,
            reward_address: None,
            min_participation: None,
            pox_version: None,
            pox_hashbytes: None,
            delegation_error: None,
        }
    }

    /// Create witness for initialize
    pub fn initialize(
        caller: Address,
        block_height: BlockHeight,
        start_block: BlockHeight,
        reward_address: Vec<u8>,
        min_participation: Amount,
    ) -> Self {
        Self {
            start_block: Some(start_block),
            reward_address: Some(reward_address),
            min_participation: Some(min_participation),
            ..Self::bare(op::INITIALIZE, caller, block_height)
        }
    }

    /// Create witness for start stacking with the delegate's outcome
    pub fn start_stacking(
        caller: Address,
        block_height: BlockHeight,
        pox_address: PoxAddress,
        delegation_error: Option<u32>,
    ) -> Self {
        Self {
            pox_version: Some(pox_address.version),
            pox_hashbytes: Some(pox_address.hashbytes),
            delegation_error,
            ..Self::bare(op::START_STACKING, caller, block_height)
        }
    }

    /// Create witness for deposit
    pub fn deposit(caller: Address, block_height: BlockHeight, amount: Amount) -> Self {
        Self {
            amount: Some(amount),
            ..Self::bare(op::DEPOSIT, caller, block_height)
        }
    }

    /// Create witness for deposit rewards
    pub fn deposit_rewards(caller: Address, block_height: BlockHeight, amount: Amount) -> Self {
        Self {
            amount: Some(amount),
            ..Self::bare(op::DEPOSIT_REWARDS, caller, block_height)
        }
    }

    /// Create witness for an operation without parameters
    pub fn simple(op: u8, caller: Address, block_height: BlockHeight) -> Self {
        Self::bare(op, caller, block_height)
    }
}

/// Delegate whose outcome was attested in the witness
pub struct AttestedDelegation {
    error: Option<u32>,
}

impl AttestedDelegation {
    pub fn new(error: Option<u32>) -> Self {
        Self { error }
    }
}

impl StackingDelegate for AttestedDelegation {
    fn delegate(&mut self, _request: &DelegationRequest) -> Result<(), DelegationError> {
        match self.error {
            Some(code) => Err(DelegationError { code }),
            None => Ok(()),
        }
    }
}

// ============ Main Validation Function ============

/// Validates a pool operation within a Charms transaction.
///
/// # Arguments
/// * `app` - The stacking pool app definition
/// * `tx` - The transaction being validated
/// * `_x` - Public inputs (unused)
/// * `w` - Witness data (operation details)
///
/// # Returns
/// `true` if replaying the witnessed action on the input ledger yields
/// exactly the output ledger
pub fn validate_pool_operation(app: &App, tx: &Transaction, _x: &Data, w: &Data) -> bool {
    let witness = match parse_witness(w) {
        Some(w) => w,
        None => return false,
    };

    let action = match witness_to_action(&witness) {
        Some(a) => a,
        None => return false,
    };

    let (mut inputs, mut outputs) = match extract_ledgers(app, tx) {
        Some(l) => l,
        None => return false,
    };

    // The pool is a single state charm: never duplicated, never merged
    if inputs.len() > 1 || outputs.len() != 1 {
        log::debug!(
            "rejected {}: {} input and {} output ledgers",
            action.name(),
            inputs.len(),
            outputs.len()
        );
        return false;
    }
    let output = match outputs.pop() {
        Some(l) => l,
        None => return false,
    };

    let mut ledger = match inputs.pop() {
        Some(l) => l,
        // Only the first initialize may create the ledger from nothing
        None if witness.op == op::INITIALIZE => match PoolLedger::new(output.config().clone()) {
            Ok(l) => l,
            Err(_) => return false,
        },
        None => return false,
    };

    if ledger.config().validate().is_err() {
        return false;
    }

    let mut ctx = CallContext::new(witness.caller, witness.block_height);
    let mut delegate = AttestedDelegation::new(witness.delegation_error);

    if ledger.apply(&mut ctx, &mut delegate, action).is_err() {
        return false;
    }

    ledger == output
}

// ============ Parsing Functions ============

/// Parse witness data into PoolWitness
fn parse_witness(w: &Data) -> Option<PoolWitness> {
    w.value::<PoolWitness>().ok()
}

/// Convert witness to internal action type
fn witness_to_action(w: &PoolWitness) -> Option<PoolAction> {
    match w.op {
        op::INITIALIZE => Some(PoolAction::Initialize {
            start_block: w.start_block?,
            reward_address: w.reward_address.clone().unwrap_or_default(),
            min_participation: w.min_participation?,
        }),
        op::START_STACKING => Some(PoolAction::StartStacking {
            pox_address: PoxAddress::new(w.pox_version?, w.pox_hashbytes.clone()?),
        }),
        op::UNLOCK_STACKING => Some(PoolAction::UnlockStacking),
        op::EMERGENCY_SHUTDOWN => Some(PoolAction::EmergencyShutdown),
        op::RESET => Some(PoolAction::Reset),
        op::DEPOSIT => Some(PoolAction::Deposit { amount: w.amount? }),
        op::WITHDRAW => Some(PoolAction::Withdraw),
        op::CLAIM_REWARDS => Some(PoolAction::ClaimRewards),
        op::DEPOSIT_REWARDS => Some(PoolAction::DepositRewards { amount: w.amount? }),
        op::WITHDRAW_FEES => Some(PoolAction::WithdrawFees),
        _ => None,
    }
}

// ============ State Extraction ============

/// Every ledger charm of this app on the spent and created sides
///
/// Returns `None` if any charm of this app does not decode as a ledger.
fn extract_ledgers(app: &App, tx: &Transaction) -> Option<(Vec<PoolLedger>, Vec<PoolLedger>)> {
    let inputs = tx
        .ins
        .iter()
        .filter_map(|(_, charms)| charms.get(app))
        .map(|data| data.value::<PoolLedger>().ok())
        .collect::<Option<Vec<_>>>()?;

    let outputs = tx
        .outs
        .iter()
        .filter_map(|charms| charms.get(app))
        .map(|data| data.value::<PoolLedger>().ok())
        .collect::<Option<Vec<_>>>()?;

    Some((inputs, outputs))
}

// ============ Tests ============
