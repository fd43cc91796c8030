use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tracing::info;

use crate::normalize::normalize;
use crate::search::clamp_limit;
use crate::state::PickerState;
use faq_common::picker_api::{
    CategoryListResponse, ListQuestionsParams, NormalizeQuestionParams, NormalizeQuestionResponse,
    QuestionListResponse, RefreshCatalogResponse, SearchQuestionsParams, SearchQuestionsResponse,
};

#[derive(Clone)]
pub struct FaqPickerServer {
    state: PickerState,
    tool_router: ToolRouter<FaqPickerServer>,
}

impl FaqPickerServer {
    pub fn new(state: PickerState) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl FaqPickerServer {
    #[tool(description = "List the question categories in picker order, with question counts.")]
    async fn list_categories(&self) -> Result<Json<CategoryListResponse>, String> {
        Ok(Json(self.state.list_categories().await))
    }

    #[tool(description = "List the known questions filed under one category (e.g. 'SOICT', 'Locations', 'General'). Each entry carries the text to send to the chat.")]
    async fn list_questions(
        &self,
        Parameters(params): Parameters<ListQuestionsParams>,
    ) -> Result<Json<QuestionListResponse>, String> {
        self.state
            .list_questions(&params.category)
            .await
            .map(Json)
            .map_err(|e| e.to_string())
    }

    #[tool(description = "Find known questions containing the given text (case-insensitive substring match, no ranking).")]
    async fn search_questions(
        &self,
        Parameters(params): Parameters<SearchQuestionsParams>,
    ) -> Result<Json<SearchQuestionsResponse>, String> {
        let limit = clamp_limit(params.limit);
        self.state
            .search(&params.query, params.category.as_deref(), limit)
            .await
            .map(Json)
            .map_err(|e| format!("search failed: {e}"))
    }

    #[tool(description = "Normalize a question the way the picker does: lowercase, strip punctuation, drop stopwords.")]
    async fn normalize_question(
        &self,
        Parameters(params): Parameters<NormalizeQuestionParams>,
    ) -> Result<Json<NormalizeQuestionResponse>, String> {
        let preprocessed = normalize(&params.text);
        Ok(Json(NormalizeQuestionResponse {
            original: params.text,
            preprocessed,
        }))
    }

    #[tool(description = "Re-fetch rules, locations and FAQs from the backend and rebuild the catalog.")]
    async fn refresh_catalog(&self) -> Result<Json<RefreshCatalogResponse>, String> {
        info!("refresh_catalog tool invoked");
        Ok(Json(self.state.refresh().await))
    }
}

#[tool_handler]
impl ServerHandler for FaqPickerServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "faq-picker".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "School assistant FAQ picker. Use list_categories to see the category selector, \
                 list_questions to browse one category, search_questions for substring lookup, \
                 normalize_question to preview how a question is sent, and refresh_catalog to \
                 reload from the backend."
                    .to_string(),
            ),
        }
    }
}
