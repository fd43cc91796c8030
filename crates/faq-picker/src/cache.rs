/// Redis caching layer for the FAQ picker.
///
/// All operations degrade to no-ops when Redis is unavailable.
///
/// Key schema:
/// - `fqp:v1:fingerprint` — fingerprint of the last catalog built
/// - `fqp:v1:search:{sha256(fingerprint|query|category|limit)}` — JSON Vec<SearchHit> (TTL 3600s)
use sha2::{Digest, Sha256};
use tracing::warn;

use faq_common::picker_api::SearchHit;
use faq_common::redis::RedisCache;

const KEY_PREFIX: &str = "fqp:v1:";
const SEARCH_TTL_SECS: u64 = 3600;

pub struct PickerCache {
    redis: RedisCache,
}

impl PickerCache {
    pub fn new(redis: RedisCache) -> Self {
        Self { redis }
    }

    pub async fn get_fingerprint(&self) -> Option<String> {
        self.redis.get(&format!("{KEY_PREFIX}fingerprint")).await
    }

    pub async fn set_fingerprint(&self, fingerprint: &str) {
        self.redis
            .set(&format!("{KEY_PREFIX}fingerprint"), fingerprint)
            .await;
    }

    pub async fn get_search_results(&self, key: &SearchKey<'_>) -> Option<Vec<SearchHit>> {
        let key = key.redis_key();
        let json = self.redis.get(&key).await?;
        serde_json::from_str(&json)
            .inspect_err(|e| warn!(error = %e, key, "cache deserialization failed"))
            .ok()
    }

    pub async fn set_search_results(&self, key: &SearchKey<'_>, results: &[SearchHit]) {
        if let Ok(json) = serde_json::to_string(results) {
            self.redis
                .set_with_ttl(&key.redis_key(), &json, SEARCH_TTL_SECS)
                .await;
        }
    }

    pub async fn invalidate_searches(&self) {
        self.redis
            .delete_by_prefix(&format!("{KEY_PREFIX}search:"))
            .await;
    }
}

/// Everything a cached search result depends on. The catalog fingerprint is part of the
/// key so results from an older catalog are never served.
pub struct SearchKey<'a> {
    pub fingerprint: &'a str,
    pub query: &'a str,
    pub category: Option<&'a str>,
    pub limit: usize,
}

impl SearchKey<'_> {
    fn redis_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.fingerprint.as_bytes());
        hasher.update(b"|");
        hasher.update(self.query.as_bytes());
        hasher.update(b"|");
        hasher.update(self.category.unwrap_or("").as_bytes());
        hasher.update(b"|");
        hasher.update(self.limit.to_string().as_bytes());
        format!("{KEY_PREFIX}search:{:x}", hasher.finalize())
    }
}
