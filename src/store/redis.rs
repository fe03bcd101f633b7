use std::future::Future;
use std::time::Duration;

use redis::aio::MultiplexedConnection;
use redis::RedisResult;
use tracing::{debug, info};

use crate::config::service::RedisConfig;
use crate::error::{Error, Result};
use crate::store::{RemoteStore, StoreConnector};

/// Single multiplexed connection to Redis, DB 0.
pub struct RedisStore {
    addr: String,
    connection: Option<MultiplexedConnection>,
    timeout: Option<Duration>,
}

impl RedisStore {
    /// Connect, authenticate when a password is configured, then PING.
    pub async fn connect(cfg: &RedisConfig) -> Result<Self> {
        let addr = cfg.addr();
        let timeout = cfg.timeout_ms.map(Duration::from_millis);
        let connection_error = |reason: String| Error::Connection {
            addr: addr.clone(),
            reason,
        };

        let client = redis::Client::open(cfg.url()).map_err(|e| connection_error(e.to_string()))?;
        let mut connection = with_timeout(timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(&connection_error)?;

        if !cfg.password.is_empty() {
            let _: () = with_timeout(timeout, redis::cmd("AUTH").arg(&cfg.password).query_async(&mut connection))
                .await
                .map_err(|e| connection_error(format!("authentication failed: {}", e)))?;
        }

        let pong: String = with_timeout(timeout, redis::cmd("PING").query_async(&mut connection))
            .await
            .map_err(|e| connection_error(format!("ping failed: {}", e)))?;
        debug!("redis at {} answered {}", addr, pong);

        info!("connected to redis at {}", addr);
        Ok(Self {
            addr,
            connection: Some(connection),
            timeout,
        })
    }

    fn connection(&self, op: &'static str) -> Result<MultiplexedConnection> {
        self.connection
            .clone()
            .ok_or_else(|| Error::store(op, format!("connection to {} is closed", self.addr)))
    }
}

impl RemoteStore for RedisStore {
    async fn key_exists(&self, key: &str) -> Result<bool> {
        let mut connection = self.connection("EXISTS")?;
        let count: i64 = with_timeout(self.timeout, redis::cmd("EXISTS").arg(key).query_async(&mut connection))
            .await
            .map_err(|e| Error::store("EXISTS", e))?;
        Ok(count > 0)
    }

    async fn get_value(&self, key: &str) -> Result<String> {
        let mut connection = self.connection("GET")?;
        let value: Option<String> = with_timeout(self.timeout, redis::cmd("GET").arg(key).query_async(&mut connection))
            .await
            .map_err(|e| Error::store("GET", e))?;
        value.ok_or_else(|| Error::KeyNotFound(key.to_owned()))
    }

    async fn delete_key(&self, key: &str) -> Result<bool> {
        let mut connection = self.connection("DEL")?;
        let removed: i64 = with_timeout(self.timeout, redis::cmd("DEL").arg(key).query_async(&mut connection))
            .await
            .map_err(|e| Error::store("DEL", e))?;
        Ok(removed > 0)
    }

    fn close(&mut self) -> Result<()> {
        // dropping the last handle shuts the multiplexed connection down
        if self.connection.take().is_some() {
            debug!("closed redis connection to {}", self.addr);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RedisConnector;

impl StoreConnector for RedisConnector {
    type Store = RedisStore;

    async fn connect(&self, cfg: &RedisConfig) -> Result<RedisStore> {
        RedisStore::connect(cfg).await
    }
}

/// Bound a store round trip by `timeout` when one is configured.
async fn with_timeout<T, F>(timeout: Option<Duration>, operation: F) -> std::result::Result<T, String>
where
    F: Future<Output = RedisResult<T>>,
{
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, operation).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(_) => Err(format!("timed out after {} ms", limit.as_millis())),
        },
        None => operation.await.map_err(|e| e.to_string()),
    }
}
