use faq_common::error::CommonError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid input: expected a string, found {found}")]
    InvalidInput { found: &'static str },

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}
