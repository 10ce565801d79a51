//! Access Control Module
//!
//! The pool has exactly one privileged actor, the owner fixed at
//! deployment. Authorization is a flat identity comparison: no roles,
//! no delegation, no timelock.

use crate::{PoolError, PoolResult};
use crate::types::{Address, ZERO_ADDRESS};

/// Check that the caller is the pool owner
pub fn is_owner(owner: &Address, caller: &Address) -> bool {
    *owner != ZERO_ADDRESS && owner == caller
}

/// Require owner authorization for a privileged operation
///
/// # Errors
/// `NotAuthorized` if `caller` is not `owner`
pub fn require_owner(owner: &Address, caller: &Address, operation: &'static str) -> PoolResult<()> {
    if !is_owner(owner, caller) {
        log::warn!("rejected {} from non-owner caller", operation);
        return Err(PoolError::NotAuthorized);
    }
    Ok(())
}
