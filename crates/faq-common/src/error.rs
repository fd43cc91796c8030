/// Error types shared by the picker crates.
///
/// These cover infrastructure failures (backend source fetches, client setup) that
/// more than one binary can hit. Application-specific errors live in each crate and
/// wrap `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("source client error: {0}")]
    Source(#[from] crate::source_client::SourceClientError),
}
