//! Read-through cache for recommend responses.
//!
//! Cache failures are never allowed to fail a request: every operation here
//! swallows its own errors, logs a warning, and falls back to treating the
//! cache as empty or absent.

use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};

/// Build the versioned cache key for a recommend request.
///
/// Changing `engine_version` or `audio_model` naturally invalidates every
/// previously cached entry, since they're baked into the key.
pub fn make_recommend_cache_key(engine_version: &str, audio_model: &str, seed_id: i64, k: usize) -> String {
    format!("rec:{engine_version}:{audio_model}:seed:{seed_id}:k:{k}")
}

/// Thin wrapper over a Redis client that never lets a connection or
/// protocol error escape as an application error.
pub struct RecommendCache {
    client: Option<redis::Client>,
}

impl RecommendCache {
    /// Build a cache handle from a Redis URL. Connection is established
    /// lazily per-operation, so a temporarily unreachable Redis doesn't
    /// block startup.
    pub fn connect(redis_url: &str) -> Self {
        match redis::Client::open(redis_url) {
            Ok(client) => Self { client: Some(client) },
            Err(err) => {
                tracing::warn!(error = %err, "invalid redis url, caching disabled");
                Self { client: None }
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Fetch and deserialize a JSON value, or `None` on any failure
    /// (missing key, connection error, malformed payload).
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let client = self.client.as_ref()?;
        let mut conn = match client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(err) => {
                tracing::warn!(error = %err, "redis connection failed on cache read");
                return None;
            }
        };

        let raw: Option<String> = match conn.get(key).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(error = %err, key, "redis read failed");
                return None;
            }
        };

        raw.and_then(|raw| match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(error = %err, key, "cached payload was not valid json, ignoring");
                None
            }
        })
    }

    /// Serialize and write a JSON value with a TTL. Failures are logged and
    /// otherwise ignored: a cache write is an optimization, not a
    /// requirement for correctness.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_sec: u64) {
        let Some(client) = self.client.as_ref() else {
            return;
        };
        let mut conn = match client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(err) => {
                tracing::warn!(error = %err, "redis connection failed on cache write");
                return;
            }
        };

        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize cache payload");
                return;
            }
        };

        if let Err(err) = conn.set_ex::<_, _, ()>(key, payload, ttl_sec).await {
            tracing::warn!(error = %err, key, "redis write failed");
        }
    }

    /// Liveness probe for the health endpoint. Not used on the hot
    /// recommend path.
    pub async fn ping(&self) -> bool {
        let Some(client) = self.client.as_ref() else {
            return false;
        };
        let mut conn = match client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(_) => return false,
        };
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use vibecurator_test_utils::MockRedisStore;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct StubPayload {
        method: String,
        items: Vec<i64>,
    }

    /// `MockRedisStore` stands in for the wire connection here: it's fed the
    /// same key format and JSON payload shape `RecommendCache` actually
    /// produces, to check the round-trip independent of a live Redis server.
    #[test]
    fn mock_store_round_trips_cached_json_payload() {
        let store = MockRedisStore::new();
        let key = make_recommend_cache_key("v1", "myna", 42, 20);
        let payload = StubPayload { method: "hybrid".to_string(), items: vec![1, 2, 3] };

        store.setex(&key, 900, serde_json::to_string(&payload).unwrap());

        let raw = store.get(&key).unwrap();
        let restored: StubPayload = serde_json::from_str(&raw).unwrap();
        assert_eq!(restored, payload);
    }

    #[test]
    fn mock_store_honors_ttl_seconds() {
        let store = MockRedisStore::new();
        let key = make_recommend_cache_key("v1", "myna", 1, 10);
        store.setex(&key, 900, "{}".to_string());

        let ttl = store.ttl(&key).unwrap();
        assert!(ttl > 0 && ttl <= 900);
        assert!(store.exists(&key));
    }

    #[test]
    fn cache_key_embeds_version_and_model() {
        let key = make_recommend_cache_key("stage3_v1_myna", "myna", 42, 20);
        assert_eq!(key, "rec:stage3_v1_myna:myna:seed:42:k:20");
    }

    #[test]
    fn cache_key_changes_with_engine_version() {
        let a = make_recommend_cache_key("v1", "myna", 1, 10);
        let b = make_recommend_cache_key("v2", "myna", 1, 10);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn invalid_url_disables_caching_without_panicking() {
        let cache = RecommendCache::connect("not-a-valid-url");
        assert!(!cache.is_configured());
        assert!(cache.ping().await == false);
    }
}
