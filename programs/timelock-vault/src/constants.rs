//! Program-wide constants

/// Shortest lock a vault may be created with, in days
pub const MIN_LOCK_DAYS: u64 = 1;

/// Longest lock a vault may be created with, in days
pub const MAX_LOCK_DAYS: u64 = 365;

/// Seconds per lock day
pub const SECONDS_PER_DAY: i64 = 86_400;
