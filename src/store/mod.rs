//! Remote key-value store access used to confirm the cached validation result.

use std::future::Future;

use crate::config::service::RedisConfig;
use crate::error::Result;

pub mod redis;

pub use self::redis::{RedisConnector, RedisStore};

/// Read side of the remote store.
pub trait RemoteStore: Send {
    /// Absence of the key is `Ok(false)`, not an error.
    fn key_exists(&self, key: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Fails with `KeyNotFound` when the key is absent at read time.
    fn get_value(&self, key: &str) -> impl Future<Output = Result<String>> + Send;

    /// Returns whether a key was removed.
    fn delete_key(&self, key: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Releases the connection. Calling it again is a no-op.
    fn close(&mut self) -> Result<()>;
}

/// Opens store connections; connecting includes a liveness probe.
pub trait StoreConnector {
    type Store: RemoteStore;

    fn connect(&self, cfg: &RedisConfig) -> impl Future<Output = Result<Self::Store>> + Send;
}
