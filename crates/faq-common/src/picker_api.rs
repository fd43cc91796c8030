use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListQuestionsParams {
    /// Category name such as "SOICT", "Locations" or "General" (case-insensitive).
    pub category: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchQuestionsParams {
    /// Text to look for inside known questions (substring match, case-insensitive).
    pub query: String,
    /// Restrict results to one category.
    pub category: Option<String>,
    /// Maximum number of results to return (default: 20, max: 100).
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NormalizeQuestionParams {
    /// Raw question text.
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategorySummary {
    pub name: String,
    pub question_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategoryListResponse {
    pub categories: Vec<CategorySummary>,
    /// SHA-256 over the backend documents the catalog was built from.
    pub fingerprint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuestionEntry {
    pub original: String,
    pub preprocessed: String,
    /// Text to hand to the chat-send flow.
    pub send_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuestionListResponse {
    pub category: String,
    pub questions: Vec<QuestionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchHit {
    pub category: String,
    pub original: String,
    pub preprocessed: String,
    pub send_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchQuestionsResponse {
    pub query: String,
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NormalizeQuestionResponse {
    pub original: String,
    pub preprocessed: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RefreshCatalogResponse {
    /// False when the backend documents hash to the previously stored fingerprint.
    pub updated: bool,
    pub fingerprint: String,
    pub question_count: usize,
    /// Sources that could not be fetched or parsed and were treated as empty.
    pub failed_sources: Vec<String>,
}
