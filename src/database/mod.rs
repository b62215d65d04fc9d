//! PostgreSQL Database Module
//!
//! Repositories for users, creators, gigs, submissions, payments and squads,
//! plus the transactional `MarketplaceStore` implementation on top of them.
//! Unsigned counters are stored as BIGINT and checked on the way out.

pub mod creators;
pub mod gigs;
pub mod pool;
pub mod squads;
mod store;
pub mod submissions;

pub use creators::CreatorRepository;
pub use gigs::GigRepository;
pub use pool::DatabasePool;
pub use squads::SquadRepository;
pub use submissions::SubmissionRepository;

use crate::error::{GigletError, GigletResult};

pub(crate) fn to_u32(value: i64, column: &str) -> GigletResult<u32> {
    u32::try_from(value)
        .map_err(|_| GigletError::Store(format!("Column {} out of range: {}", column, value)))
}

pub(crate) fn to_u64(value: i64, column: &str) -> GigletResult<u64> {
    u64::try_from(value)
        .map_err(|_| GigletError::Store(format!("Column {} out of range: {}", column, value)))
}

/// Map a stored enum string, failing on values this build does not know.
pub(crate) fn parse_column<T>(
    value: &str,
    column: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> GigletResult<T> {
    parse(value).ok_or_else(|| GigletError::Store(format!("Unknown {} value: {}", column, value)))
}
