//! Share and Fee Arithmetic
//!
//! Integer-only reward math. Every division truncates; the truncation
//! remainder stays in the pool and is never redistributed.

use crate::constants::fees::{BPS_DENOMINATOR, PERCENT_DENOMINATOR};
use crate::errors::{PoolError, PoolResult};
use crate::types::{Amount, RewardBreakdown};

/// Calculate a depositor's share of the pool in basis points
///
/// share = floor(deposit * 10_000 / total_staked)
///
/// # Returns
/// 0 when either the deposit or the pool total is zero
pub fn share_bps(deposit: Amount, total_staked: Amount) -> u64 {
    if deposit == 0 || total_staked == 0 {
        return 0;
    }

    let bps = (deposit as u128) * (BPS_DENOMINATOR as u128) / (total_staked as u128);
    bps.min(u64::MAX as u128) as u64
}

/// Split a reward pot for one share into gross, fee, and net amounts
///
/// gross = floor(rewards * share_bps / 10_000)
/// fee   = floor(gross * fee_percent / 100)
/// net   = gross - fee
///
/// # Arguments
/// * `rewards_received` - Total reward payout announced for the cycle
/// * `share_bps` - Depositor's share in basis points
/// * `fee_percent` - Platform fee in percent (0-100)
pub fn split_rewards(rewards_received: Amount, share_bps: u64, fee_percent: u64) -> RewardBreakdown {
    if share_bps == 0 {
        return RewardBreakdown::default();
    }

    let gross = ((rewards_received as u128) * (share_bps as u128) / (BPS_DENOMINATOR as u128))
        .min(u64::MAX as u128) as u64;
    let fee_percent = fee_percent.min(PERCENT_DENOMINATOR);
    let fee = ((gross as u128) * (fee_percent as u128) / (PERCENT_DENOMINATOR as u128)) as u64;

    RewardBreakdown {
        share_bps,
        gross,
        fee,
        net: gross - fee,
    }
}

/// Add two amounts, rejecting overflow as an invalid amount
pub fn checked_add_amount(current: Amount, amount: Amount) -> PoolResult<Amount> {
    current
        .checked_add(amount)
        .ok_or(PoolError::InvalidAmount { amount })
}
