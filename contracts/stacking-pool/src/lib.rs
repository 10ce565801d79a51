//! Stacking Pool Ledger
//!
//! Pools many depositors' STX into a single stacking position for one
//! fixed cycle and distributes the cycle's reward payout pro rata.
//!
//! ## Lifecycle
//!
//! ```text
//! new ──initialize──▶ active/locked ──unlock_stacking──▶ active/unlocked
//!                          │                                   │
//!                          └──────── emergency_shutdown ───────┴──▶ inactive/unlocked
//! ```
//!
//! - **Deposits** are accepted while the pool is active.
//! - **Rewards** are announced by the owner and claimed once per cycle per
//!   depositor, net of the platform fee.
//! - **Withdrawals** only open once the pool is unlocked, whether by the
//!   owner after the cycle ends or by an emergency shutdown.
//!
//! Every operation validates all of its preconditions before touching
//! state, so a rejected call is a no-op and emits no events.

use std::collections::{BTreeMap, BTreeSet};

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

// Charms SDK integration (conditional compilation)
#[cfg(feature = "charms")]
pub mod charms;

#[cfg(test)]
mod integration_tests;

use stacking_pool_common::{
    access_control::require_owner,
    constants::{cycle, fees, limits},
    errors::{PoolError, PoolResult},
    events::{EventLog, PoolEvent},
    math::{checked_add_amount, share_bps, split_rewards},
    types::{
        Address, Amount, BlockHeight, PoolAction, PoolStatus, PoxAddress, RewardBreakdown,
        ZERO_ADDRESS,
    },
};

// ============ Pool Config ============

/// Deploy-time configuration of the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolConfig {
    /// The only identity allowed to administer the pool
    pub owner: Address,
    /// Cycle length in blocks
    pub cycle_length: u64,
    /// Platform fee in percent (0-100)
    pub platform_fee_percent: u64,
    /// Minimum single deposit
    pub min_participation: Amount,
}

impl PoolConfig {
    /// Create a config with network defaults for the given owner
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            cycle_length: cycle::CYCLE_LENGTH,
            platform_fee_percent: fees::PLATFORM_FEE_PERCENT,
            min_participation: limits::MIN_PARTICIPATION,
        }
    }

    /// Override the cycle length
    pub fn with_cycle_length(mut self, cycle_length: u64) -> Self {
        self.cycle_length = cycle_length;
        self
    }

    /// Override the platform fee
    pub fn with_fee_percent(mut self, platform_fee_percent: u64) -> Self {
        self.platform_fee_percent = platform_fee_percent;
        self
    }

    /// Override the participation minimum
    pub fn with_min_participation(mut self, min_participation: Amount) -> Self {
        self.min_participation = min_participation;
        self
    }

    /// Validate configuration bounds
    pub fn validate(&self) -> PoolResult<()> {
        if self.owner == ZERO_ADDRESS {
            return Err(PoolError::InvalidConfig { reason: "owner cannot be the zero address" });
        }
        if self.cycle_length == 0 {
            return Err(PoolError::InvalidConfig { reason: "cycle length must be positive" });
        }
        if self.platform_fee_percent > fees::PERCENT_DENOMINATOR {
            return Err(PoolError::InvalidConfig { reason: "platform fee exceeds 100%" });
        }
        if self.min_participation == 0 {
            return Err(PoolError::InvalidConfig { reason: "minimum participation must be positive" });
        }
        Ok(())
    }
}

// ============ Call Context ============

/// Per-call environment supplied by the host
pub struct CallContext {
    /// Identity invoking the operation
    pub caller: Address,
    /// Current block height of the external chain
    pub block_height: BlockHeight,
    /// Event log
    pub events: EventLog,
}

impl CallContext {
    /// Create a context with an empty event log
    pub fn new(caller: Address, block_height: BlockHeight) -> Self {
        Self {
            caller,
            block_height,
            events: EventLog::new(),
        }
    }
}

// ============ Delegation Collaborator ============

/// Request handed to the external stacking mechanism
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct DelegationRequest {
    /// Reward address for the stacked position
    pub pox_address: PoxAddress,
    /// Amount to lock (the whole pool)
    pub amount: Amount,
    /// First block of the lock
    pub start_block: BlockHeight,
    /// Number of reward cycles to lock for
    pub lock_period: u8,
}

/// Rejection reported by the stacking mechanism
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelegationError {
    /// Mechanism-specific error code
    pub code: u32,
}

/// The external mechanism that actually locks the pooled STX
pub trait StackingDelegate {
    /// Lock the pooled position. Success means the lock was accepted.
    fn delegate(&mut self, request: &DelegationRequest) -> Result<(), DelegationError>;
}

impl<F> StackingDelegate for F
where
    F: FnMut(&DelegationRequest) -> Result<(), DelegationError>,
{
    fn delegate(&mut self, request: &DelegationRequest) -> Result<(), DelegationError> {
        self(request)
    }
}

// ============ Depositor Records ============

/// Per-depositor bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct DepositorRecord {
    /// Principal currently locked (0 once withdrawn)
    pub deposit: Amount,
    /// Reward shares, always equal to `deposit`
    pub shares: Amount,
    /// Most recent net reward paid out
    pub last_claimed_amount: Amount,
}

// ============ Pool Ledger ============

/// The pool's complete accounting state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolLedger {
    config: PoolConfig,
    active: bool,
    cycle_start: BlockHeight,
    cycle_end: BlockHeight,
    unlocked: bool,
    total_staked: Amount,
    rewards_received: Amount,
    fees_collected: Amount,
    reward_address: Vec<u8>,
    depositors: BTreeMap<Address, DepositorRecord>,
    /// `(depositor, cycle_start)` pairs that have claimed
    claims: BTreeSet<(Address, BlockHeight)>,
}

impl PoolLedger {
    /// Create an inactive, zeroed pool
    pub fn new(config: PoolConfig) -> PoolResult<Self> {
        config.validate()?;
        Ok(Self::empty(config))
    }

    fn empty(config: PoolConfig) -> Self {
        Self {
            config,
            active: false,
            cycle_start: 0,
            cycle_end: 0,
            unlocked: false,
            total_staked: 0,
            rewards_received: 0,
            fees_collected: 0,
            reward_address: Vec::new(),
            depositors: BTreeMap::new(),
            claims: BTreeSet::new(),
        }
    }

    // ============ Lifecycle ============

    /// Activate the pool and fix the cycle window
    ///
    /// Depositor records, `total_staked`, and claim flags from an earlier
    /// cycle are kept. Depositors who never withdrew carry their stake into
    /// the new cycle.
    pub fn initialize(
        &mut self,
        ctx: &mut CallContext,
        start_block: BlockHeight,
        reward_address: Vec<u8>,
        min_participation: Amount,
    ) -> PoolResult<()> {
        require_owner(&self.config.owner, &ctx.caller, "initialize")?;
        if self.active {
            return Err(PoolError::PoolActive);
        }
        let cycle_end = start_block
            .checked_add(self.config.cycle_length)
            .ok_or(PoolError::InvalidAmount { amount: start_block })?;

        self.active = true;
        self.cycle_start = start_block;
        self.cycle_end = cycle_end;
        self.unlocked = false;
        self.rewards_received = 0;
        self.reward_address = reward_address;

        log::debug!("pool initialized for cycle {}..{}", start_block, cycle_end);
        ctx.events.emit(PoolEvent::PoolInitialized {
            cycle_start: start_block,
            cycle_end,
            min_participation,
            block_height: ctx.block_height,
        });

        Ok(())
    }

    /// Hand the pooled position to the external stacking mechanism
    ///
    /// The ledger itself does not change; only the delegate's outcome is
    /// reported.
    pub fn start_stacking<D: StackingDelegate + ?Sized>(
        &mut self,
        ctx: &mut CallContext,
        delegate: &mut D,
        pox_address: PoxAddress,
    ) -> PoolResult<()> {
        require_owner(&self.config.owner, &ctx.caller, "start_stacking")?;
        if !self.active {
            return Err(PoolError::PoolInactive);
        }

        let request = DelegationRequest {
            pox_address,
            amount: self.total_staked,
            start_block: self.cycle_start,
            lock_period: cycle::LOCK_PERIOD_CYCLES,
        };
        delegate.delegate(&request).map_err(|e| {
            log::warn!("stacking delegation rejected with code {}", e.code);
            PoolError::DelegationFailed { code: e.code }
        })?;

        log::debug!("stacking started for {} micro-STX", request.amount);
        ctx.events.emit(PoolEvent::StackingStarted {
            pox_address: request.pox_address,
            amount: request.amount,
            block_height: ctx.block_height,
        });

        Ok(())
    }

    /// Confirm that the cycle window has elapsed
    pub fn unlock_stacking(&mut self, ctx: &mut CallContext) -> PoolResult<()> {
        require_owner(&self.config.owner, &ctx.caller, "unlock_stacking")?;
        if !self.active {
            return Err(PoolError::PoolInactive);
        }
        if ctx.block_height < self.cycle_end {
            return Err(PoolError::StillLocked);
        }
        if self.unlocked {
            // Deployed contracts report a repeated unlock as ERR-POOL-INACTIVE
            return Err(PoolError::PoolInactive);
        }

        self.unlocked = true;

        log::debug!("stacking unlocked at block {}", ctx.block_height);
        ctx.events.emit(PoolEvent::StackingUnlocked {
            cycle_end: self.cycle_end,
            block_height: ctx.block_height,
        });

        Ok(())
    }

    /// Deactivate the pool and open withdrawals regardless of cycle timing
    pub fn emergency_shutdown(&mut self, ctx: &mut CallContext) -> PoolResult<()> {
        require_owner(&self.config.owner, &ctx.caller, "emergency_shutdown")?;

        self.active = false;
        self.unlocked = true;

        log::warn!("emergency shutdown at block {}", ctx.block_height);
        ctx.events.emit(PoolEvent::EmergencyShutdown {
            total_staked: self.total_staked,
            block_height: ctx.block_height,
        });

        Ok(())
    }

    /// Return the ledger to its freshly-created state
    ///
    /// Only allowed once the pool is inactive and holds no principal or fees.
    /// Drops depositor records and claim flags.
    pub fn reset(&mut self, ctx: &mut CallContext) -> PoolResult<()> {
        require_owner(&self.config.owner, &ctx.caller, "reset")?;
        if self.active {
            return Err(PoolError::PoolActive);
        }
        if self.total_staked > 0 || self.fees_collected > 0 {
            return Err(PoolError::PoolNotEmpty {
                total_staked: self.total_staked,
                fees_collected: self.fees_collected,
            });
        }

        *self = Self::empty(self.config.clone());

        log::debug!("pool reset at block {}", ctx.block_height);
        ctx.events.emit(PoolEvent::PoolReset {
            block_height: ctx.block_height,
        });

        Ok(())
    }

    // ============ Deposits ============

    /// Deposit STX into the pool, returning the caller's cumulative deposit
    pub fn deposit(&mut self, ctx: &mut CallContext, amount: Amount) -> PoolResult<Amount> {
        if !self.active {
            return Err(PoolError::PoolInactive);
        }
        if amount < self.config.min_participation {
            return Err(PoolError::BelowMinimum {
                amount,
                minimum: self.config.min_participation,
            });
        }
        if amount == 0 {
            return Err(PoolError::InvalidAmount { amount });
        }

        let new_deposit = checked_add_amount(self.deposit_of(&ctx.caller), amount)?;
        let new_total = checked_add_amount(self.total_staked, amount)?;

        let record = self.depositors.entry(ctx.caller).or_default();
        record.deposit = new_deposit;
        record.shares = new_deposit;
        self.total_staked = new_total;

        ctx.events.emit(PoolEvent::Deposited {
            depositor: ctx.caller,
            amount,
            new_deposit,
            pool_total: new_total,
            block_height: ctx.block_height,
        });

        Ok(new_deposit)
    }

    /// Withdraw the caller's entire deposit once the pool is unlocked
    ///
    /// Does not require the pool to be active, so depositors can exit after
    /// an emergency shutdown.
    pub fn withdraw(&mut self, ctx: &mut CallContext) -> PoolResult<Amount> {
        if !self.unlocked {
            return Err(PoolError::StillLocked);
        }
        let amount = self.deposit_of(&ctx.caller);
        if amount == 0 {
            return Err(PoolError::NoFundsToWithdraw);
        }

        if let Some(record) = self.depositors.get_mut(&ctx.caller) {
            record.deposit = 0;
            record.shares = 0;
        }
        self.total_staked = self.total_staked.saturating_sub(amount);

        ctx.events.emit(PoolEvent::Withdrawn {
            depositor: ctx.caller,
            amount,
            pool_total: self.total_staked,
            block_height: ctx.block_height,
        });

        Ok(amount)
    }

    // ============ Rewards ============

    /// Announce an external reward payout. Repeated calls accumulate.
    pub fn deposit_rewards(&mut self, ctx: &mut CallContext, amount: Amount) -> PoolResult<Amount> {
        require_owner(&self.config.owner, &ctx.caller, "deposit_rewards")?;
        if !self.active {
            return Err(PoolError::PoolInactive);
        }
        if amount == 0 {
            return Err(PoolError::InvalidAmount { amount });
        }

        let rewards_total = checked_add_amount(self.rewards_received, amount)?;
        self.rewards_received = rewards_total;

        ctx.events.emit(PoolEvent::RewardsDeposited {
            amount,
            rewards_total,
            block_height: ctx.block_height,
        });

        Ok(amount)
    }

    /// Claim the caller's share of this cycle's rewards, net of fees
    ///
    /// The amount is computed from live totals at claim time; only the
    /// per-cycle claim flag prevents a second payout.
    pub fn claim_rewards(&mut self, ctx: &mut CallContext) -> PoolResult<Amount> {
        if !self.active {
            return Err(PoolError::PoolInactive);
        }
        let breakdown = self.reward_breakdown(&ctx.caller);
        if breakdown.is_empty() {
            return Err(PoolError::NoFundsToWithdraw);
        }
        let claim_key = (ctx.caller, self.cycle_start);
        if self.claims.contains(&claim_key) {
            return Err(PoolError::AlreadyClaimed {
                cycle_start: self.cycle_start,
            });
        }
        let fees_total = checked_add_amount(self.fees_collected, breakdown.fee)?;

        self.claims.insert(claim_key);
        self.fees_collected = fees_total;
        self.depositors.entry(ctx.caller).or_default().last_claimed_amount = breakdown.net;

        log::debug!(
            "claim for cycle {}: net {} fee {}",
            self.cycle_start,
            breakdown.net,
            breakdown.fee
        );
        ctx.events.emit(PoolEvent::RewardsClaimed {
            depositor: ctx.caller,
            cycle_start: self.cycle_start,
            net_amount: breakdown.net,
            fee: breakdown.fee,
            block_height: ctx.block_height,
        });

        Ok(breakdown.net)
    }

    /// Withdraw all accumulated platform fees
    pub fn withdraw_fees(&mut self, ctx: &mut CallContext) -> PoolResult<Amount> {
        require_owner(&self.config.owner, &ctx.caller, "withdraw_fees")?;
        if self.fees_collected == 0 {
            return Err(PoolError::NoFundsToWithdraw);
        }

        let amount = self.fees_collected;
        self.fees_collected = 0;

        ctx.events.emit(PoolEvent::FeesWithdrawn {
            amount,
            block_height: ctx.block_height,
        });

        Ok(amount)
    }

    // ============ Dispatch ============

    /// Apply an action, returning the operation's value if it has one
    pub fn apply<D: StackingDelegate + ?Sized>(
        &mut self,
        ctx: &mut CallContext,
        delegate: &mut D,
        action: PoolAction,
    ) -> PoolResult<Option<Amount>> {
        let name = action.name();
        let result = match action {
            PoolAction::Initialize {
                start_block,
                reward_address,
                min_participation,
            } => self
                .initialize(ctx, start_block, reward_address, min_participation)
                .map(|_| None),
            PoolAction::Deposit { amount } => self.deposit(ctx, amount).map(Some),
            PoolAction::StartStacking { pox_address } => {
                self.start_stacking(ctx, delegate, pox_address).map(|_| None)
            }
            PoolAction::UnlockStacking => self.unlock_stacking(ctx).map(|_| None),
            PoolAction::DepositRewards { amount } => self.deposit_rewards(ctx, amount).map(Some),
            PoolAction::ClaimRewards => self.claim_rewards(ctx).map(Some),
            PoolAction::Withdraw => self.withdraw(ctx).map(Some),
            PoolAction::WithdrawFees => self.withdraw_fees(ctx).map(Some),
            PoolAction::EmergencyShutdown => self.emergency_shutdown(ctx).map(|_| None),
            PoolAction::Reset => self.reset(ctx).map(|_| None),
        };

        if let Err(ref err) = result {
            log::debug!("{} rejected: {}", name, err);
        }
        result
    }

    // ============ Queries ============

    /// Pool-wide status
    pub fn pool_status(&self) -> PoolStatus {
        PoolStatus {
            active: self.active,
            total_staked: self.total_staked,
            cycle_start: self.cycle_start,
            cycle_end: self.cycle_end,
            unlocked: self.unlocked,
            rewards_received: self.rewards_received,
            fees_collected: self.fees_collected,
        }
    }

    /// Deploy-time configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Reward address recorded by the last `initialize`
    pub fn reward_address(&self) -> &[u8] {
        &self.reward_address
    }

    /// Depositor's locked principal
    pub fn deposit_of(&self, depositor: &Address) -> Amount {
        self.depositors.get(depositor).map(|r| r.deposit).unwrap_or(0)
    }

    /// Depositor's reward shares
    pub fn shares_of(&self, depositor: &Address) -> Amount {
        self.depositors.get(depositor).map(|r| r.shares).unwrap_or(0)
    }

    /// Most recent net reward paid to the depositor
    pub fn last_claimed_amount(&self, depositor: &Address) -> Amount {
        self.depositors
            .get(depositor)
            .map(|r| r.last_claimed_amount)
            .unwrap_or(0)
    }

    /// Whether the depositor already claimed for the current cycle
    pub fn has_claimed(&self, depositor: &Address) -> bool {
        self.claims.contains(&(*depositor, self.cycle_start))
    }

    /// Number of depositors with a live deposit
    pub fn depositor_count(&self) -> usize {
        self.depositors.values().filter(|r| r.deposit > 0).count()
    }

    /// Depositor's share of the pool in basis points
    pub fn share_percentage(&self, depositor: &Address) -> u64 {
        share_bps(self.deposit_of(depositor), self.total_staked)
    }

    /// Full reward computation for the depositor at current totals
    pub fn reward_breakdown(&self, depositor: &Address) -> RewardBreakdown {
        split_rewards(
            self.rewards_received,
            self.share_percentage(depositor),
            self.config.platform_fee_percent,
        )
    }

    /// Net reward the depositor would receive now. Ignores the claim flag.
    pub fn pending_rewards(&self, depositor: &Address) -> Amount {
        self.reward_breakdown(depositor).net
    }

    /// SHA-256 commitment over the ledger's borsh encoding
    pub fn commitment(&self) -> [u8; 32] {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(borsh::to_vec(self).unwrap_or_default());
        let result = hasher.finalize();
        let mut root = [0u8; 32];
        root.copy_from_slice(&result);
        root
    }
}

// ============ Tests ============
