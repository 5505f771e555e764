use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError};

use karma_core::{CounterStore, StoreError};

/// Redis implementation of CounterStore.
///
/// Each user's total lives under its own key, so an increment is a single
/// `INCRBY`.
#[derive(Clone)]
pub struct RedisCounterStore {
    conn: ConnectionManager,
}

impl RedisCounterStore {
    /// Connect to the Redis server at `url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;

        Ok(Self { conn })
    }

    /// Remove every key in the selected database.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("FLUSHDB")
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;

        tracing::warn!("Flushed counter store");
        Ok(())
    }
}

impl CounterStore for RedisCounterStore {
    async fn increment_by(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        let mut conn = self.conn.clone();
        conn.incr(key, delta).await.map_err(map_redis_error)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }
}

/// Connection-level failures are reported as `Unavailable`, everything else
/// as a failed command.
fn map_redis_error(e: RedisError) -> StoreError {
    if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout()
    {
        StoreError::Unavailable(e.to_string())
    } else {
        StoreError::Command(e.to_string())
    }
}
