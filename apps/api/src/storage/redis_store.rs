use anyhow::Result;
use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use crate::storage::RecordStore;

/// Record store backed by Redis string keys.
#[derive(Clone)]
pub struct RedisRecordStore {
    client: redis::Client,
}

impl RedisRecordStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

/// Escapes glob metacharacters so a key prefix matches literally in `SCAN MATCH`.
fn prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('*');
    pattern
}

/// SCAN may return a key more than once while the keyspace is rehashing.
fn unique_sorted(mut keys: Vec<String>) -> Vec<String> {
    keys.sort();
    keys.dedup();
    keys
}

#[async_trait]
impl RecordStore for RedisRecordStore {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(key, value).await?;
        debug!("SET {key} ({} bytes)", value.len());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        Ok(conn.get::<_, Option<String>>(key).await?)
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut conn = self.connection().await?;
        let mut keys = Vec::new();
        {
            let mut iter = conn.scan_match::<_, String>(prefix_pattern(prefix)).await?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }

        let mut values = Vec::with_capacity(keys.len());
        for key in unique_sorted(keys) {
            // A key may expire or vanish between SCAN and GET.
            if let Some(value) = conn.get::<_, Option<String>>(&key).await? {
                values.push(value);
            }
        }
        Ok(values)
    }
}
