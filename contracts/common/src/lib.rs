//! Stacking Pool Common Library
//!
//! Shared types, constants, and utilities for the stacking pool contracts.
//!
//! ## Pooled Stacking in One Paragraph
//!
//! Many depositors lock STX into a single pooled position for one fixed
//! cycle of blocks. The pool owner delegates that position to the external
//! stacking mechanism, announces the reward payout once it arrives, and
//! every depositor claims a share of the payout proportional to their
//! deposit, net of the platform fee. Principal only leaves the pool after
//! the owner confirms the cycle has elapsed (or after an emergency
//! shutdown).
//!
//! ## Modules
//!
//! - **Constants**: Token units, cycle length, fee and minimum configuration
//! - **Errors**: Closed set of pool errors with stable wire codes
//! - **Types**: Addresses, PoX reward addresses, pool actions
//! - **Math**: Basis-point share and fee arithmetic
//! - **Events**: Structured, indexable events emitted by each operation
//! - **Access Control**: Flat owner capability check
//!
//! This crate is `no_std` compatible for WASM compilation when built
//! without the default `std` feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export Vec for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::vec::Vec;
#[cfg(feature = "std")]
pub use std::vec::Vec;

pub mod constants;
pub mod errors;
pub mod types;
pub mod math;
pub mod events;
pub mod access_control;

// Re-exports for convenience
pub use errors::*;
pub use types::*;
pub use math::*;
pub use events::*;
pub use access_control::*;
