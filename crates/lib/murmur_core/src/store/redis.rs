//! Redis-backed [`KvStore`].
//!
//! Uses a multiplexed [`ConnectionManager`], which reconnects on its own.
//! Commands are not retried beyond the manager's single reconnect attempt;
//! an error goes straight back to the caller.

use std::collections::HashMap;
use std::time::Duration;

use ::redis::aio::{ConnectionManager, ConnectionManagerConfig};
use ::redis::{AsyncCommands, Client, Script};
use async_trait::async_trait;
use tracing::info;

use super::{Counter, KvStore, ScoreBound, StoreResult, Toggle};

/// How long one connection attempt may take.
const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// Toggle a sorted-set member and move its counters in one server-side step.
///
/// KEYS[1] is the membership set, KEYS[2..] the counter keys.
/// ARGV: member, add-score, counter count, then a (kind, target) pair per
/// counter where kind is `z` (ranking member) or `h` (hash field).
const TOGGLE_SCRIPT: &str = r"
local removed = redis.call('ZREM', KEYS[1], ARGV[1])
if removed == 0 then
  redis.call('ZADD', KEYS[1], ARGV[2], ARGV[1])
end
local delta = 1
if removed == 1 then delta = -1 end
local n = tonumber(ARGV[3])
for i = 1, n do
  local key = KEYS[i + 1]
  local kind = ARGV[2 + i * 2]
  local target = ARGV[3 + i * 2]
  if kind == 'z' then
    if redis.call('ZSCORE', key, target) then
      redis.call('ZINCRBY', key, delta, target)
    end
  else
    redis.call('HINCRBY', key, target, delta)
  end
end
return removed
";

/// Redis connection wrapper.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    toggle: Script,
}

impl RedisStore {
    /// Connect to `redis_url` (e.g. `redis://127.0.0.1:6379/2`).
    pub async fn connect(redis_url: &str) -> StoreResult<Self> {
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(CONNECT_TIMEOUT);

        let client = Client::open(redis_url)?;
        let conn = client.get_connection_manager_with_config(config).await?;
        info!(url = %redis_url, "connected to redis");

        Ok(Self {
            conn,
            toggle: Script::new(TOGGLE_SCRIPT),
        })
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        Ok(conn.set_nx(key, value).await?)
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        Ok(conn.exists(key).await?)
    }

    async fn del(&self, key: &str) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn hset(&self, key: &str, fields: &[(String, String)]) -> StoreResult<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        let _: () = conn.hset_multiple(key, fields).await?;
        Ok(())
    }

    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, String>> {
        let mut conn = self.conn.clone();
        Ok(conn.hgetall(key).await?)
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        let added: i64 = conn.zadd(key, member, score).await?;
        Ok(added > 0)
    }

    async fn zrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>> {
        let mut conn = self.conn.clone();
        Ok(conn.zrange(key, start, stop).await?)
    }

    async fn zrevrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>> {
        let mut conn = self.conn.clone();
        Ok(conn.zrevrange(key, start, stop).await?)
    }

    async fn zrevrange_by_score(
        &self,
        key: &str,
        min: ScoreBound,
        max: ScoreBound,
    ) -> StoreResult<Vec<String>> {
        let mut conn = self.conn.clone();
        Ok(conn
            .zrevrangebyscore(key, max.to_string(), min.to_string())
            .await?)
    }

    async fn toggle_member(
        &self,
        key: &str,
        member: &str,
        score: f64,
        counters: &[Counter],
    ) -> StoreResult<Toggle> {
        let mut invocation = self.toggle.key(key);
        invocation.arg(member).arg(score).arg(counters.len());
        for counter in counters {
            match counter {
                Counter::Ranking { key, member } => {
                    invocation.key(key).arg("z").arg(member);
                }
                Counter::HashField { key, field } => {
                    invocation.key(key).arg("h").arg(field);
                }
            }
        }

        let mut conn = self.conn.clone();
        let removed: i64 = invocation.invoke_async(&mut conn).await?;
        Ok(if removed == 0 {
            Toggle::Added
        } else {
            Toggle::Removed
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: String = ::redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
