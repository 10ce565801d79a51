//! Integration Tests for the Stacking Pool
//!
//! Full cycle scenarios driven through the public ledger API:
//! - Initialize → deposit → stack → unlock → rewards → claim → withdraw
//! - Fee accounting across several claims
//! - Emergency exit before the cycle ends
//! - Stale records carried across re-initialization
//! - Rejected calls leave no trace
//! - Conservation of `total_staked` under arbitrary deposit/withdraw sequences

use crate::*;
use proptest::prelude::*;
use stacking_pool_common::constants::token::ONE;
use stacking_pool_common::events::EventType;

const OWNER: Address = [0xA1; 32];
const USER1: Address = [0x01; 32];
const USER2: Address = [0x02; 32];
const USER3: Address = [0x03; 32];
const START_BLOCK: u64 = 10_000;
const CYCLE_LENGTH: u64 = 2_100;

fn stx(amount: u64) -> u64 {
    amount * ONE
}

fn accept_all(_: &DelegationRequest) -> Result<(), DelegationError> {
    Ok(())
}

/// Test harness holding the ledger and the simulated chain height
struct TestPool {
    ledger: PoolLedger,
    block: u64,
    events: Vec<PoolEvent>,
}

impl TestPool {
    fn new() -> Self {
        let config = PoolConfig::new(OWNER)
            .with_cycle_length(CYCLE_LENGTH)
            .with_fee_percent(5)
            .with_min_participation(stx(50));
        Self {
            ledger: PoolLedger::new(config).unwrap(),
            block: START_BLOCK,
            events: Vec::new(),
        }
    }

    fn initialized() -> Self {
        let mut pool = Self::new();
        pool.call(OWNER, PoolAction::Initialize {
            start_block: START_BLOCK,
            reward_address: b"0x0123456789abcdef".to_vec(),
            min_participation: stx(80_000),
        })
        .unwrap();
        pool
    }

    fn advance_blocks(&mut self, count: u64) {
        self.block += count;
    }

    fn call(&mut self, caller: Address, action: PoolAction) -> PoolResult<Option<Amount>> {
        let mut ctx = CallContext::new(caller, self.block);
        let result = self.ledger.apply(&mut ctx, &mut accept_all, action);
        self.events.extend(ctx.events.into_events());
        result
    }

    fn deposit(&mut self, caller: Address, amount: Amount) -> PoolResult<Option<Amount>> {
        self.call(caller, PoolAction::Deposit { amount })
    }

    fn start_stacking(&mut self) -> PoolResult<Option<Amount>> {
        self.call(OWNER, PoolAction::StartStacking {
            pox_address: PoxAddress::new(0x01, vec![0x12, 0x34, 0x56, 0x78, 0x90, 0xab, 0xcd, 0xef]),
        })
    }

    fn finish_cycle(&mut self) {
        self.advance_blocks(CYCLE_LENGTH + 1);
        self.call(OWNER, PoolAction::UnlockStacking).unwrap();
    }

    fn sum_of_deposits(&self, users: &[Address]) -> Amount {
        users.iter().map(|u| self.ledger.deposit_of(u)).sum()
    }
}

// ============ Full Cycle ============

#[test]
fn test_full_cycle_two_equal_depositors() {
    let mut pool = TestPool::initialized();
    pool.deposit(USER1, stx(50_000)).unwrap();
    pool.deposit(USER2, stx(50_000)).unwrap();
    pool.start_stacking().unwrap();

    // Withdrawal is gated until unlock
    assert_eq!(pool.call(USER1, PoolAction::Withdraw), Err(PoolError::StillLocked));

    pool.finish_cycle();
    pool.call(OWNER, PoolAction::DepositRewards { amount: stx(100) }).unwrap();

    // 50% share of 100 STX minus 5% fee
    assert_eq!(pool.ledger.pending_rewards(&USER1), 47_500_000);
    assert_eq!(pool.ledger.pending_rewards(&USER2), 47_500_000);

    assert_eq!(pool.call(USER1, PoolAction::ClaimRewards), Ok(Some(47_500_000)));
    assert_eq!(
        pool.call(USER1, PoolAction::ClaimRewards).unwrap_err().code(),
        "ERR-ALREADY-CLAIMED"
    );
    assert_eq!(pool.call(USER2, PoolAction::ClaimRewards), Ok(Some(47_500_000)));

    assert_eq!(pool.call(USER1, PoolAction::Withdraw), Ok(Some(stx(50_000))));
    assert_eq!(pool.call(USER2, PoolAction::Withdraw), Ok(Some(stx(50_000))));
    assert_eq!(pool.ledger.pool_status().total_staked, 0);

    assert_eq!(pool.call(OWNER, PoolAction::WithdrawFees), Ok(Some(stx(5))));
}

#[test]
fn test_share_percentages_three_depositors() {
    let mut pool = TestPool::initialized();
    pool.deposit(USER1, stx(100)).unwrap();
    pool.deposit(USER2, stx(200)).unwrap();
    pool.deposit(USER3, stx(300)).unwrap();

    assert_eq!(pool.ledger.pool_status().total_staked, stx(600));
    assert_eq!(pool.ledger.share_percentage(&USER1), 1666);
    assert_eq!(pool.ledger.share_percentage(&USER2), 3333);
    assert_eq!(pool.ledger.share_percentage(&USER3), 5000);

    // Floor rounding leaves one basis point unassigned
    let total: u64 = [USER1, USER2, USER3]
        .iter()
        .map(|u| pool.ledger.share_percentage(u))
        .sum();
    assert_eq!(total, 9_999);
}

#[test]
fn test_fee_scales_with_reward_amount() {
    let mut pool = TestPool::initialized();
    pool.deposit(USER1, stx(100_000)).unwrap();
    pool.start_stacking().unwrap();
    pool.finish_cycle();

    pool.call(OWNER, PoolAction::DepositRewards { amount: stx(100) }).unwrap();
    assert_eq!(pool.ledger.pending_rewards(&USER1), stx(95));

    pool.call(OWNER, PoolAction::DepositRewards { amount: stx(900) }).unwrap();
    assert_eq!(pool.ledger.pending_rewards(&USER1), stx(950));
}

#[test]
fn test_zero_state_is_safe() {
    let pool = TestPool::initialized();
    assert_eq!(pool.ledger.share_percentage(&USER1), 0);
    assert_eq!(pool.ledger.pending_rewards(&USER1), 0);

    let fresh = TestPool::new();
    assert_eq!(fresh.ledger.share_percentage(&USER1), 0);
    assert_eq!(fresh.ledger.pending_rewards(&USER1), 0);
}

// ============ Authorization ============

#[test]
fn test_every_owner_action_rejects_non_owner() {
    let mut pool = TestPool::initialized();
    pool.deposit(USER1, stx(100)).unwrap();
    pool.advance_blocks(CYCLE_LENGTH);

    let owner_actions = [
        PoolAction::Initialize {
            start_block: START_BLOCK,
            reward_address: Vec::new(),
            min_participation: stx(50),
        },
        PoolAction::StartStacking { pox_address: PoxAddress::new(0x00, vec![0x01]) },
        PoolAction::UnlockStacking,
        PoolAction::DepositRewards { amount: stx(10) },
        PoolAction::WithdrawFees,
        PoolAction::EmergencyShutdown,
        PoolAction::Reset,
    ];

    for action in owner_actions.iter() {
        assert!(action.is_owner_only());
        let before = pool.ledger.commitment();
        assert_eq!(
            pool.call(USER1, action.clone()),
            Err(PoolError::NotAuthorized),
            "{} should reject non-owner",
            action.name()
        );
        assert_eq!(pool.ledger.commitment(), before);
    }

    // Same actions succeed for the owner given valid state
    assert!(pool.start_stacking().is_ok());
    assert!(pool.call(OWNER, PoolAction::UnlockStacking).is_ok());
    assert!(pool.call(OWNER, PoolAction::DepositRewards { amount: stx(10) }).is_ok());
    pool.call(USER1, PoolAction::ClaimRewards).unwrap();
    assert!(pool.call(OWNER, PoolAction::WithdrawFees).is_ok());
    assert!(pool.call(OWNER, PoolAction::EmergencyShutdown).is_ok());
    pool.call(USER1, PoolAction::Withdraw).unwrap();
    assert!(pool.call(OWNER, PoolAction::Reset).is_ok());
    assert!(pool
        .call(OWNER, PoolAction::Initialize {
            start_block: START_BLOCK + 5_000,
            reward_address: Vec::new(),
            min_participation: stx(50),
        })
        .is_ok());
}

// ============ Emergency Exit ============

#[test]
fn test_emergency_exit_before_cycle_end() {
    let mut pool = TestPool::initialized();
    pool.deposit(USER1, stx(50_000)).unwrap();
    pool.start_stacking().unwrap();

    pool.call(OWNER, PoolAction::EmergencyShutdown).unwrap();
    let status = pool.ledger.pool_status();
    assert!(!status.active);
    assert!(status.unlocked);
    assert!(pool.block < status.cycle_end);

    assert_eq!(pool.call(USER1, PoolAction::Withdraw), Ok(Some(stx(50_000))));
    assert_eq!(pool.ledger.deposit_of(&USER1), 0);

    // Inactive pool refuses new deposits
    assert_eq!(pool.deposit(USER2, stx(100)), Err(PoolError::PoolInactive));
}

// ============ Re-initialization ============

#[test]
fn test_reinitialize_carries_stale_deposits_into_new_cycle() {
    let mut pool = TestPool::initialized();
    pool.deposit(USER1, stx(100)).unwrap();
    pool.call(OWNER, PoolAction::DepositRewards { amount: stx(10) }).unwrap();
    pool.call(USER1, PoolAction::ClaimRewards).unwrap();
    pool.call(OWNER, PoolAction::EmergencyShutdown).unwrap();

    let next_start = START_BLOCK + 5_000;
    pool.call(OWNER, PoolAction::Initialize {
        start_block: next_start,
        reward_address: Vec::new(),
        min_participation: stx(50),
    })
    .unwrap();

    let status = pool.ledger.pool_status();
    assert!(status.active);
    assert!(!status.unlocked);
    assert_eq!(status.rewards_received, 0);
    assert_eq!(status.cycle_end, next_start + CYCLE_LENGTH);

    // Principal from the previous cycle is still in the pool
    assert_eq!(pool.ledger.deposit_of(&USER1), stx(100));
    assert_eq!(status.total_staked, stx(100));

    // A new cycle start is a fresh claim key
    assert!(!pool.ledger.has_claimed(&USER1));
    pool.call(OWNER, PoolAction::DepositRewards { amount: stx(20) }).unwrap();
    assert_eq!(pool.call(USER1, PoolAction::ClaimRewards), Ok(Some(stx(19))));
}

// ============ Live Reward Totals ============

#[test]
fn test_claims_read_live_reward_totals() {
    let mut pool = TestPool::initialized();
    pool.deposit(USER1, stx(100)).unwrap();
    pool.deposit(USER2, stx(100)).unwrap();

    pool.call(OWNER, PoolAction::DepositRewards { amount: stx(10) }).unwrap();
    let first = pool.call(USER1, PoolAction::ClaimRewards).unwrap().unwrap();

    pool.call(OWNER, PoolAction::DepositRewards { amount: stx(10) }).unwrap();
    let second = pool.call(USER2, PoolAction::ClaimRewards).unwrap().unwrap();

    // Same share, different payout: totals are not snapshotted
    assert_eq!(first, 4_750_000);
    assert_eq!(second, 9_500_000);
    assert_eq!(pool.ledger.last_claimed_amount(&USER1), first);
    assert_eq!(pool.ledger.last_claimed_amount(&USER2), second);
}

// ============ Fee Accounting ============

#[test]
fn test_fees_equal_sum_of_claim_fees() {
    let mut pool = TestPool::initialized();
    pool.deposit(USER1, stx(123)).unwrap();
    pool.deposit(USER2, stx(456)).unwrap();
    pool.deposit(USER3, stx(789)).unwrap();
    pool.call(OWNER, PoolAction::DepositRewards { amount: stx(77) }).unwrap();

    for user in [USER1, USER2, USER3] {
        pool.call(user, PoolAction::ClaimRewards).unwrap();
    }

    let claimed_fees: u64 = pool
        .events
        .iter()
        .filter_map(|e| match e {
            PoolEvent::RewardsClaimed { fee, .. } => Some(*fee),
            _ => None,
        })
        .sum();
    assert_eq!(pool.ledger.pool_status().fees_collected, claimed_fees);
    assert_eq!(pool.call(OWNER, PoolAction::WithdrawFees), Ok(Some(claimed_fees)));
    assert_eq!(pool.ledger.pool_status().fees_collected, 0);
}

// ============ No-op Failures ============

#[test]
fn test_rejected_calls_change_nothing() {
    let mut pool = TestPool::initialized();
    pool.deposit(USER1, stx(100)).unwrap();
    pool.call(OWNER, PoolAction::DepositRewards { amount: stx(10) }).unwrap();
    pool.call(USER1, PoolAction::ClaimRewards).unwrap();

    let before = pool.ledger.commitment();
    let events_before = pool.events.len();

    assert!(pool.deposit(USER2, stx(10)).is_err());
    assert!(pool.deposit(USER2, 0).is_err());
    assert!(pool.call(USER1, PoolAction::ClaimRewards).is_err());
    assert!(pool.call(USER2, PoolAction::ClaimRewards).is_err());
    assert!(pool.call(USER1, PoolAction::Withdraw).is_err());
    assert!(pool.call(OWNER, PoolAction::UnlockStacking).is_err());
    assert!(pool.call(OWNER, PoolAction::DepositRewards { amount: 0 }).is_err());

    assert_eq!(pool.ledger.commitment(), before);
    assert_eq!(pool.events.len(), events_before);
}

#[test]
fn test_events_follow_lifecycle() {
    let mut pool = TestPool::initialized();
    pool.deposit(USER1, stx(100)).unwrap();
    pool.start_stacking().unwrap();
    pool.finish_cycle();
    pool.call(OWNER, PoolAction::DepositRewards { amount: stx(10) }).unwrap();
    pool.call(USER1, PoolAction::ClaimRewards).unwrap();
    pool.call(USER1, PoolAction::Withdraw).unwrap();
    pool.call(OWNER, PoolAction::WithdrawFees).unwrap();

    let types: Vec<EventType> = pool.events.iter().map(|e| e.event_type()).collect();
    assert_eq!(
        types,
        vec![
            EventType::PoolInitialized,
            EventType::Deposited,
            EventType::StackingStarted,
            EventType::StackingUnlocked,
            EventType::RewardsDeposited,
            EventType::RewardsClaimed,
            EventType::Withdrawn,
            EventType::FeesWithdrawn,
        ]
    );
    assert_eq!(pool.events[3].block_height(), START_BLOCK + CYCLE_LENGTH + 1);
}

// ============ Persistence ============

#[test]
fn test_ledger_restores_from_cbor() {
    let mut pool = TestPool::initialized();
    pool.deposit(USER1, stx(100)).unwrap();
    pool.call(OWNER, PoolAction::DepositRewards { amount: stx(10) }).unwrap();
    pool.call(USER1, PoolAction::ClaimRewards).unwrap();

    let mut bytes = Vec::new();
    ciborium::ser::into_writer(&pool.ledger, &mut bytes).unwrap();
    let mut restored: PoolLedger = ciborium::de::from_reader(bytes.as_slice()).unwrap();

    assert_eq!(restored, pool.ledger);
    assert_eq!(restored.commitment(), pool.ledger.commitment());

    // Claim flags survive the round trip
    let mut ctx = CallContext::new(USER1, pool.block);
    assert!(matches!(
        restored.claim_rewards(&mut ctx),
        Err(PoolError::AlreadyClaimed { .. })
    ));
}

// ============ Properties ============

#[derive(Debug, Clone)]
enum Step {
    Deposit(usize, u64),
    Withdraw(usize),
    Rewards(u64),
    Claim(usize),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0usize..4, 1u64..20_000).prop_map(|(u, a)| Step::Deposit(u, a)),
        (0usize..4).prop_map(Step::Withdraw),
        (1u64..1_000).prop_map(Step::Rewards),
        (0usize..4).prop_map(Step::Claim),
    ]
}

proptest! {
    #[test]
    fn total_staked_matches_live_deposits(steps in proptest::collection::vec(step_strategy(), 0..64)) {
        let users = [USER1, USER2, USER3, [0x04; 32]];
        let mut pool = TestPool::initialized();
        pool.advance_blocks(CYCLE_LENGTH);
        pool.call(OWNER, PoolAction::UnlockStacking).unwrap();

        for step in steps {
            let _ = match step {
                Step::Deposit(u, a) => pool.deposit(users[u], stx(a)),
                Step::Withdraw(u) => pool.call(users[u], PoolAction::Withdraw),
                Step::Rewards(a) => pool.call(OWNER, PoolAction::DepositRewards { amount: stx(a) }),
                Step::Claim(u) => pool.call(users[u], PoolAction::ClaimRewards),
            };

            let status = pool.ledger.pool_status();
            prop_assert_eq!(status.total_staked, pool.sum_of_deposits(&users));

            let share_total: u64 = users.iter().map(|u| pool.ledger.share_percentage(u)).sum();
            prop_assert!(share_total <= 10_000);
            for u in users.iter() {
                prop_assert_eq!(pool.ledger.shares_of(u), pool.ledger.deposit_of(u));
            }
        }
    }
}
