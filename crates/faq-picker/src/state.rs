use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::error::AppError;
use crate::loader::CatalogLoader;
use crate::model::Catalog;
use crate::search::SearchEngine;
use faq_common::picker_api::{
    CategoryListResponse, QuestionListResponse, RefreshCatalogResponse, SearchQuestionsResponse,
};

/// Catalog plus the services that read and rebuild it, shared by the MCP and HTTP
/// surfaces. A refresh swaps the whole catalog; readers holding the old `Arc` keep a
/// consistent snapshot.
#[derive(Clone)]
pub struct PickerState {
    catalog: Arc<RwLock<Arc<Catalog>>>,
    search_engine: Arc<SearchEngine>,
    loader: Arc<CatalogLoader>,
    /// Held across a rebuild and its swap so refreshes apply in call order.
    refresh_lock: Arc<Mutex<()>>,
}

impl PickerState {
    pub fn new(catalog: Catalog, search_engine: Arc<SearchEngine>, loader: Arc<CatalogLoader>) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(Arc::new(catalog))),
            search_engine,
            loader,
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&*self.catalog.read().await)
    }

    pub async fn list_categories(&self) -> CategoryListResponse {
        let catalog = self.catalog().await;
        CategoryListResponse {
            categories: catalog.summaries(),
            fingerprint: catalog.fingerprint.clone(),
        }
    }

    pub async fn list_questions(&self, category: &str) -> Result<QuestionListResponse, AppError> {
        let category = category.trim();
        if category.is_empty() {
            return Err(AppError::InvalidQuery("category must not be empty".to_string()));
        }

        let catalog = self.catalog().await;
        let bucket = catalog.find_bucket(category).ok_or_else(|| {
            let available: Vec<&str> = catalog.category_names().collect();
            AppError::UnknownCategory(format!(
                "'{category}'. Available categories: {}",
                available.join(", ")
            ))
        })?;

        Ok(QuestionListResponse {
            category: bucket.name.clone(),
            questions: bucket.questions.iter().map(|q| q.to_entry()).collect(),
        })
    }

    pub async fn search(
        &self,
        query: &str,
        category: Option<&str>,
        limit: usize,
    ) -> Result<SearchQuestionsResponse, AppError> {
        let catalog = self.catalog().await;
        let results = self
            .search_engine
            .search(&catalog, query, category, limit)
            .await?;
        Ok(SearchQuestionsResponse {
            query: query.trim().to_string(),
            results,
        })
    }

    /// Rebuild from the backend and swap the catalog in.
    pub async fn refresh(&self) -> RefreshCatalogResponse {
        let _guard = self.refresh_lock.lock().await;
        let outcome = self.loader.refresh().await;
        let failed_sources = outcome.failed_sources();
        let fingerprint = outcome.catalog.fingerprint.clone();
        let question_count = outcome.catalog.question_count();

        *self.catalog.write().await = Arc::new(outcome.catalog);
        info!(question_count, updated = outcome.updated, "in-memory catalog replaced");

        RefreshCatalogResponse {
            updated: outcome.updated,
            fingerprint,
            question_count,
            failed_sources,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::Duration;

    use super::*;
    use crate::cache::PickerCache;
    use crate::categorize::categorize;
    use crate::model::{Faq, Rule, RuleSet, UserType};
    use faq_common::redis::RedisCache;
    use faq_common::source_client::{SourceClient, SourceClientConfig};

    /// State over a small fixed catalog. The loader points at a closed port, so a
    /// refresh yields the empty catalog.
    pub(crate) fn fixture_state() -> PickerState {
        let cache = Arc::new(PickerCache::new(RedisCache::disabled()));
        let client = SourceClient::new(SourceClientConfig::new(
            "http://127.0.0.1:9",
            Duration::from_secs(1),
        ))
        .expect("client builds");

        let rules = RuleSet {
            user_type: Some(UserType::Guest),
            categories: vec![(
                "SOICT".to_string(),
                vec![Rule {
                    id: Some("r1".to_string()),
                    question: "Who is the dean of SOICT?".to_string(),
                    response: "Prof. Thuy".to_string(),
                    user_type: UserType::Guest,
                    category: "SOICT".to_string(),
                }],
            )],
        };
        let faqs = [Faq {
            question: "Who are you?".to_string(),
            answer: "A school assistant".to_string(),
            user_type: None,
        }];
        let catalog = Catalog {
            buckets: categorize(&[rules], &[], &faqs),
            fingerprint: "fixture".to_string(),
        };

        PickerState::new(
            catalog,
            Arc::new(SearchEngine::new(Arc::clone(&cache))),
            Arc::new(CatalogLoader::new(client, cache)),
        )
    }

    #[tokio::test]
    async fn lists_categories_in_catalog_order() {
        let response = fixture_state().list_categories().await;
        let names: Vec<&str> = response.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["SOICT", "Locations", "Faculties", "General"]);
        assert_eq!(response.categories[0].question_count, 1);
        assert_eq!(response.fingerprint, "fixture");
    }

    #[tokio::test]
    async fn list_questions_reports_send_text() {
        let state = fixture_state();
        let soict = state.list_questions("soict").await.unwrap();
        assert_eq!(soict.category, "SOICT");
        assert_eq!(soict.questions[0].send_text, "who dean soict?");

        // Stopwords only match whole tokens, so "you?" survives.
        let general = state.list_questions("General").await.unwrap();
        assert_eq!(general.questions[0].preprocessed, "who you?");
    }

    #[tokio::test]
    async fn unknown_category_lists_available_ones() {
        let err = fixture_state().list_questions("Sports").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Sports"));
        assert!(message.contains("SOICT, Locations, Faculties, General"));
    }

    #[tokio::test]
    async fn refresh_with_unreachable_backend_swaps_in_empty_catalog() {
        let state = fixture_state();
        let response = state.refresh().await;
        assert!(response.updated);
        assert_eq!(response.question_count, 0);
        assert_eq!(response.failed_sources.len(), 4);

        let names: Vec<String> = state
            .catalog()
            .await
            .category_names()
            .map(str::to_string)
            .collect();
        assert_eq!(names, vec!["Locations", "Faculties", "General"]);
    }

    #[tokio::test]
    async fn refresh_waits_for_an_in_flight_refresh() {
        let state = fixture_state();
        let guard = state.refresh_lock.lock().await;

        let pending = tokio::spawn({
            let state = state.clone();
            async move { state.refresh().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!pending.is_finished());
        assert_eq!(state.catalog().await.fingerprint, "fixture");

        drop(guard);
        let response = pending.await.expect("refresh task");
        assert_eq!(response.question_count, 0);
        assert_eq!(state.catalog().await.fingerprint, response.fingerprint);
    }

    #[tokio::test]
    async fn concurrent_refreshes_both_complete() {
        let state = fixture_state();
        let (a, b) = tokio::join!(state.refresh(), state.refresh());
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(state.catalog().await.fingerprint, a.fingerprint);
    }
}
