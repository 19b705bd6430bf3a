use std::{collections::HashMap, fmt};

use async_trait::async_trait;
use lazy_static::lazy_static;
use redis::{
    aio::ConnectionManager, AsyncCommands, Client, ConnectionAddr, ConnectionInfo,
    RedisConnectionInfo, Script,
};
use thiserror::Error;
use tracing::debug;

use crate::{auth::repo_types::UserRecord, config::RedisConfig};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("corrupt user record: {0}")]
    Corrupt(String),
}

/// Key-value store holding one record per username.
///
/// `put` is an unconditional upsert. Create-only semantics live in the service,
/// which uses `put_if_absent` to make the final write atomic.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn exists(&self, username: &str) -> Result<bool, StoreError>;
    async fn put(&self, username: &str, record: &UserRecord) -> Result<(), StoreError>;
    async fn get(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;
    /// Writes the record only if the username is free. Returns whether it was written.
    async fn put_if_absent(&self, username: &str, record: &UserRecord)
        -> Result<bool, StoreError>;
}

lazy_static! {
    // EXISTS and HSET run as one script so no other client can slip in between.
    static ref CREATE_IF_ABSENT: Script = Script::new(
        r"
        if redis.call('EXISTS', KEYS[1]) == 1 then
            return 0
        end
        redis.call('HSET', KEYS[1], unpack(ARGV))
        return 1
        ",
    );
}

#[derive(Clone)]
pub struct RedisUserStore {
    connection: ConnectionManager,
}

impl fmt::Debug for RedisUserStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisUserStore")
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisUserStore {
    pub async fn connect(config: &RedisConfig) -> Result<Self, StoreError> {
        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(config.host.clone(), config.port),
            redis: RedisConnectionInfo {
                password: config.password.clone(),
                ..Default::default()
            },
        };
        let store = Self::with_client(Client::open(info)?).await?;
        debug!(host = %config.host, port = config.port, "redis connected");
        Ok(store)
    }

    /// Wraps an already configured client in a managed, reconnecting connection.
    pub async fn with_client(client: Client) -> Result<Self, StoreError> {
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }

    fn fields(record: &UserRecord) -> Result<Vec<(&'static str, String)>, StoreError> {
        record
            .to_fields()
            .map_err(|e| StoreError::Corrupt(e.to_string()))
    }
}

#[async_trait]
impl UserStore for RedisUserStore {
    async fn exists(&self, username: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection.clone();
        let exists: bool = conn.exists(UserRecord::key(username)).await?;
        Ok(exists)
    }

    async fn put(&self, username: &str, record: &UserRecord) -> Result<(), StoreError> {
        let fields = Self::fields(record)?;
        let mut conn = self.connection.clone();
        let _: () = conn
            .hset_multiple(UserRecord::key(username), fields.as_slice())
            .await?;
        Ok(())
    }

    async fn get(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let mut conn = self.connection.clone();
        let fields: HashMap<String, String> = conn.hgetall(UserRecord::key(username)).await?;
        UserRecord::from_fields(username, fields).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    async fn put_if_absent(
        &self,
        username: &str,
        record: &UserRecord,
    ) -> Result<bool, StoreError> {
        let fields = Self::fields(record)?;
        let mut conn = self.connection.clone();

        let mut invocation = CREATE_IF_ABSENT.prepare_invoke();
        invocation.key(UserRecord::key(username));
        for (field, value) in &fields {
            invocation.arg(*field).arg(value);
        }
        let created: i64 = invocation.invoke_async(&mut conn).await?;
        Ok(created == 1)
    }
}

/// In-process store used by tests and the fake app state.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    records: tokio::sync::RwLock<HashMap<String, UserRecord>>,
}

#[cfg(test)]
impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
#[async_trait]
impl UserStore for MemoryUserStore {
    async fn exists(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.records.read().await.contains_key(username))
    }

    async fn put(&self, username: &str, record: &UserRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(username.to_string(), record.clone());
        Ok(())
    }

    async fn get(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.records.read().await.get(username).cloned())
    }

    async fn put_if_absent(
        &self,
        username: &str,
        record: &UserRecord,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(username) {
            return Ok(false);
        }
        records.insert(username.to_string(), record.clone());
        Ok(true)
    }
}
