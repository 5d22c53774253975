//! Validation of headers, lock votes and ISLocks.

mod difficulty;
mod instantlock;
mod lock_vote;

pub use difficulty::{BlockValidator, DifficultyValidatorChain};
pub use instantlock::InstantLockValidator;
pub use lock_vote::{lock_quorum, LockVoteParams, LockVoteValidator};

pub use crate::storage::{HeaderKey, HeaderLookup};

use crate::error::ValidationResult;

pub trait Validator<T> {
    fn validate(&self, data: T) -> ValidationResult<()>;
}
