use std::sync::Arc;

use tracing::info;

use crate::cache::{PickerCache, SearchKey};
use crate::error::AppError;
use crate::model::Catalog;
use crate::normalize::normalize;
use faq_common::picker_api::SearchHit;

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

pub fn clamp_limit(limit: Option<u32>) -> usize {
    limit
        .map(|l| l as usize)
        .unwrap_or(DEFAULT_LIMIT)
        .clamp(1, MAX_LIMIT)
}

/// Substring search over the catalog, in catalog order.
///
/// A question matches when its lowercased original text contains the lowercased query,
/// or its normalized form contains the normalized query. There is no scoring.
pub fn search_catalog(
    catalog: &Catalog,
    query: &str,
    category: Option<&str>,
    limit: usize,
) -> Result<Vec<SearchHit>, AppError> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Err(AppError::InvalidQuery("query must not be empty".to_string()));
    }
    let normalized_needle = normalize(&needle);

    let buckets: Vec<_> = match category.map(str::trim).filter(|c| !c.is_empty()) {
        Some(name) => vec![catalog
            .find_bucket(name)
            .ok_or_else(|| AppError::UnknownCategory(name.to_string()))?],
        None => catalog.buckets.iter().collect(),
    };

    let hits = buckets
        .into_iter()
        .flat_map(|bucket| bucket.questions.iter().map(move |q| (bucket, q)))
        .filter(|(_, q)| {
            q.original.to_lowercase().contains(&needle)
                || (!normalized_needle.is_empty() && q.preprocessed.contains(&normalized_needle))
        })
        .take(limit)
        .map(|(bucket, q)| SearchHit {
            category: bucket.name.clone(),
            original: q.original.clone(),
            preprocessed: q.preprocessed.clone(),
            send_text: q.send_text().to_string(),
        })
        .collect();

    Ok(hits)
}

pub struct SearchEngine {
    cache: Arc<PickerCache>,
}

impl SearchEngine {
    pub fn new(cache: Arc<PickerCache>) -> Self {
        Self { cache }
    }

    pub async fn search(
        &self,
        catalog: &Catalog,
        query: &str,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SearchHit>, AppError> {
        let key = SearchKey {
            fingerprint: &catalog.fingerprint,
            query: query.trim(),
            category,
            limit,
        };
        if let Some(cached) = self.cache.get_search_results(&key).await {
            info!(query, "search cache hit");
            return Ok(cached);
        }

        let results = search_catalog(catalog, query, category, limit)?;
        self.cache.set_search_results(&key, &results).await;
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorize::{categorize, GENERAL, LOCATIONS};
    use crate::model::{Faq, Location};
    use faq_common::redis::RedisCache;

    fn catalog() -> Catalog {
        let locations = [Location {
            keywords: vec![
                vec!["library".to_string(), "main".to_string()],
                vec!["canteen".to_string()],
            ],
            ..Location::default()
        }];
        let faqs = [
            Faq {
                question: "Where can I pay tuition fees?".to_string(),
                answer: String::new(),
                user_type: None,
            },
            Faq {
                question: "Is the library open on Sunday?".to_string(),
                answer: String::new(),
                user_type: None,
            },
        ];
        Catalog {
            buckets: categorize(&[], &locations, &faqs),
            fingerprint: "test".to_string(),
        }
    }

    #[test]
    fn finds_questions_by_substring_across_buckets() {
        let hits = search_catalog(&catalog(), "Library", None, 10).unwrap();
        let found: Vec<(&str, &str)> = hits
            .iter()
            .map(|h| (h.category.as_str(), h.original.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                (LOCATIONS, "Where is library main?"),
                (GENERAL, "Is the library open on Sunday?"),
            ]
        );
    }

    #[test]
    fn normalized_query_matches_normalized_text() {
        let hits = search_catalog(&catalog(), "the tuition fees", None, 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].send_text, "where pay tuition fees?");
    }

    #[test]
    fn category_filter_and_limit() {
        let hits = search_catalog(&catalog(), "where", Some("locations"), 10).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.category == LOCATIONS));

        let hits = search_catalog(&catalog(), "where", None, 1).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn rejects_empty_query_and_unknown_category() {
        assert!(matches!(
            search_catalog(&catalog(), "   ", None, 10),
            Err(AppError::InvalidQuery(_))
        ));
        assert!(matches!(
            search_catalog(&catalog(), "library", Some("Sports"), 10),
            Err(AppError::UnknownCategory(_))
        ));
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(5_000)), MAX_LIMIT);
    }

    #[tokio::test]
    async fn engine_searches_without_redis() {
        let engine = SearchEngine::new(Arc::new(PickerCache::new(RedisCache::disabled())));
        let hits = engine.search(&catalog(), "canteen", None, 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].original, "Where is canteen?");
    }
}
