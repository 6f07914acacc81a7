//! Key/value store abstraction.
//!
//! Everything Murmur persists lives in one flat key namespace with three
//! value shapes: scalar strings, hash-maps and sorted sets. The [`KvStore`]
//! trait exposes exactly the operations the credential and social-graph
//! stores need, so Redis can be swapped for [`MemoryStore`] in tests and
//! local development.

pub mod keys;
pub mod memory;
pub mod redis;

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Key/value store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Wrong value type at key '{0}'")]
    WrongType(String),

    #[error("Corrupt value at key '{key}': {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Operation rejected: {0}")]
    Rejected(String),
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A bound for score range queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreBound {
    NegInf,
    PosInf,
    Inclusive(f64),
}

impl ScoreBound {
    /// Returns true when `score` is on the permitted side of this bound
    /// when used as a lower limit.
    pub fn admits_from_below(&self, score: f64) -> bool {
        match self {
            ScoreBound::NegInf => true,
            ScoreBound::PosInf => false,
            ScoreBound::Inclusive(min) => score >= *min,
        }
    }

    /// Returns true when `score` is on the permitted side of this bound
    /// when used as an upper limit.
    pub fn admits_from_above(&self, score: f64) -> bool {
        match self {
            ScoreBound::NegInf => false,
            ScoreBound::PosInf => true,
            ScoreBound::Inclusive(max) => score <= *max,
        }
    }
}

impl fmt::Display for ScoreBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreBound::NegInf => f.write_str("-inf"),
            ScoreBound::PosInf => f.write_str("+inf"),
            ScoreBound::Inclusive(v) => write!(f, "{v}"),
        }
    }
}

/// A counter moved alongside a toggled membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Counter {
    /// Score of `member` inside the sorted set `key`.
    ///
    /// Unlike a bare `ZINCRBY`, a member that is not already ranked is left
    /// alone instead of being inserted with the delta as its score. Replies
    /// are never in the ranked set, so liking one must not rank it.
    Ranking { key: String, member: String },
    /// Integer field `field` of the hash-map `key`.
    HashField { key: String, field: String },
}

/// Outcome of a membership toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

impl Toggle {
    /// Number of members the toggle removed (0 when it added one).
    pub fn removed_count(self) -> i64 {
        match self {
            Toggle::Added => 0,
            Toggle::Removed => 1,
        }
    }

    /// Counter delta applied by this toggle.
    pub fn delta(self) -> i64 {
        match self {
            Toggle::Added => 1,
            Toggle::Removed => -1,
        }
    }
}

/// Operations over the flat key namespace.
///
/// Sorted-set ranges follow Redis semantics: ascending by score, ties broken
/// by member bytes, and negative indices count from the end.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Set `key` only when it does not exist yet. Returns whether it was set.
    async fn set_nx(&self, key: &str, value: &str) -> StoreResult<bool>;

    async fn exists(&self, key: &str) -> StoreResult<bool>;

    async fn del(&self, key: &str) -> StoreResult<()>;

    /// Upsert the given fields, leaving other fields of the hash untouched.
    async fn hset(&self, key: &str, fields: &[(String, String)]) -> StoreResult<()>;

    /// All fields of a hash. A missing key yields an empty map.
    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, String>>;

    /// Add or re-score a member. Returns true if the member was new.
    async fn zadd(&self, key: &str, member: &str, score: f64) -> StoreResult<bool>;

    async fn zrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>>;

    async fn zrevrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>>;

    /// Members with `min <= score <= max`, highest score first.
    async fn zrevrange_by_score(
        &self,
        key: &str,
        min: ScoreBound,
        max: ScoreBound,
    ) -> StoreResult<Vec<String>>;

    /// Atomically toggle `member` in the sorted set `key`.
    ///
    /// The member is removed if present, otherwise added with `score`. Every
    /// counter is then moved by [`Toggle::delta`] in the same atomic step.
    async fn toggle_member(
        &self,
        key: &str,
        member: &str,
        score: f64,
        counters: &[Counter],
    ) -> StoreResult<Toggle>;

    /// Liveness check against the backend.
    async fn ping(&self) -> StoreResult<()>;
}

/// Resolve a Redis-style `[start, stop]` index pair against a length.
pub(crate) fn resolve_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}
