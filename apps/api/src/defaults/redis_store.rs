use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{debug, info};

use crate::defaults::{ArtifactKind, DefaultStore, SavedDefault, StoreError};

/// Redis-backed store: one string key per user and artifact kind, no TTL.
#[derive(Clone)]
pub struct RedisDefaultStore {
    connection: MultiplexedConnection,
}

impl RedisDefaultStore {
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        let connection = client.get_multiplexed_async_connection().await?;
        info!("Redis default store connected");
        Ok(Self { connection })
    }
}

#[async_trait]
impl DefaultStore for RedisDefaultStore {
    async fn save(&self, user_id: &str, saved: &SavedDefault) -> Result<(), StoreError> {
        saved.validate()?;
        let raw = saved.to_json()?;
        let key = saved.kind().storage_key(user_id);
        let mut con = self.connection.clone();
        con.set::<_, _, ()>(&key, raw).await?;
        debug!("Saved default {key}");
        Ok(())
    }

    async fn load(
        &self,
        user_id: &str,
        kind: ArtifactKind,
    ) -> Result<Option<SavedDefault>, StoreError> {
        let mut con = self.connection.clone();
        let raw: Option<String> = con.get(kind.storage_key(user_id)).await?;
        Ok(raw.and_then(|raw| SavedDefault::from_json(kind, &raw)))
    }

    async fn remove(&self, user_id: &str, kind: ArtifactKind) -> Result<(), StoreError> {
        let mut con = self.connection.clone();
        con.del::<_, ()>(kind.storage_key(user_id)).await?;
        Ok(())
    }
}
