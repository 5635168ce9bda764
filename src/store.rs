use crate::error::StoreError;
use crate::util::function;
use anyhow::Result;
use redis::Commands;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

pub type RedisPool = r2d2::Pool<redis::Client>;
pub type RedisConn = r2d2::PooledConnection<redis::Client>;

/// Key-value storage holding JSON documents.
///
/// Only plain get and overwrite are offered. There is no compare-and-swap, so
/// callers doing read-modify-write get last-write-wins semantics.
pub trait ScoreStore: Send + Sync {
    /// Parsed JSON stored at `key`, or `None` when nothing has been written yet.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Overwrites `key` with an already encoded JSON document.
    fn put(&self, key: &str, value: &str) -> Result<()>;
}

pub struct RedisStore {
    pool: RedisPool,
}

impl RedisStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    pub fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let pool = r2d2::Pool::builder().build(client)?;
        Ok(Self::new(pool))
    }
}

impl ScoreStore for RedisStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut conn: RedisConn = self.pool.get()?;
        let raw: Option<String> = conn.get(key).map_err(|err| StoreError {
            key: key.to_owned(),
            function: function!(),
            error: err.into(),
        })?;
        let value = raw
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(|err| StoreError {
                key: key.to_owned(),
                function: function!(),
                error: err.into(),
            })?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut conn: RedisConn = self.pool.get()?;
        conn.set::<_, _, ()>(key, value)
            .map_err(|err| StoreError {
                key: key.to_owned(),
                function: function!(),
                error: err.into(),
            })?;
        Ok(())
    }
}

/// In-process store for local runs without Redis.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        let value = values
            .get(key)
            .map(|raw| serde_json::from_str(raw))
            .transpose()
            .map_err(|err| StoreError {
                key: key.to_owned(),
                function: function!(),
                error: err.into(),
            })?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
