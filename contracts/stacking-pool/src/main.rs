//! Stacking Pool - Charms App Entry Point
//!
//! Validates pool ledger transitions on Bitcoin using client-side validation.
//!
//! ## What This App Validates
//!
//! - **Lifecycle**: Initialize, StartStacking, UnlockStacking, EmergencyShutdown
//! - **Depositors**: Deposit, Withdraw, ClaimRewards
//! - **Treasury**: DepositRewards, WithdrawFees
//!
//! Each transaction spends the current ledger charm and creates the next
//! one. The transition is valid only if replaying the witnessed operation
//! on the spent ledger produces the created ledger exactly.

use charms_sdk::data::{App, Data, Transaction};

/// Main validation function for stacking pool operations.
///
/// # Arguments
/// * `app` - The stacking pool app definition
/// * `tx` - The transaction being validated
/// * `x` - Public inputs
/// * `w` - Witness data (operation details)
///
/// # Returns
/// `true` if the operation is valid, `false` otherwise
pub fn app_contract(app: &App, tx: &Transaction, x: &Data, w: &Data) -> bool {
    stacking_pool::charms::validate_pool_operation(app, tx, x, w)
}

// Use the Charms SDK main macro to generate the entry point
charms_sdk::main!(app_contract);
